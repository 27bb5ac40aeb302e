use std::path::PathBuf;

use clap::{Parser, Subcommand, ValueEnum};
use log::LevelFilter;

use cellbench::{analysis::SortColumn, netlist::Pipeline};

/// Spectre testbench generator and delay reader for standard-cell libraries
#[derive(Parser, Debug)]
#[command(name = "cellbench")]
#[command(author, version, about, long_about = None)]
pub struct Args {
    /// TOML file overriding the built-in simulation settings
    #[arg(short, long, global = true)]
    pub config: Option<String>,

    /// Increase log verbosity (-v info, -vv debug, -vvv trace)
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    pub verbose: u8,

    #[command(subcommand)]
    pub command: Command,
}

impl Args {
    pub fn level(&self) -> LevelFilter {
        match self.verbose {
            0 => LevelFilter::Warn,
            1 => LevelFilter::Info,
            2 => LevelFilter::Debug,
            _ => LevelFilter::Trace,
        }
    }
}

#[derive(Subcommand, Debug)]
pub enum Command {
    /// Write one netlist per stimulus for every cell of a liberty library
    Generate {
        /// Liberty (.lib) file
        library: String,

        /// Directory receiving the .scs files
        #[arg(short, long, default_value = "netlists")]
        output: PathBuf,

        /// Only cells whose name matches this glob
        #[arg(long)]
        cells: Option<String>,

        #[arg(long, value_enum, default_value = "auto")]
        kind: KindArg,
    },
    /// Print the sensitizing input vectors of a liberty function
    Vectors {
        /// e.g. "!(A*B)"
        expression: String,
    },
    /// Summarize propagation delays from exported waveform tables
    Analyze {
        /// Directory of {cell}_{index} waveform files
        results: PathBuf,

        /// Also write the summary as CSV
        #[arg(long)]
        csv: Option<PathBuf>,

        #[arg(long, value_enum, default_value = "cell")]
        sort: SortArg,
    },
}

/// Command-line wrapper for Pipeline
#[derive(Debug, Clone, Copy, ValueEnum)]
pub enum KindArg {
    /// Sequential testbench for cells with ff/latch groups
    #[value(name = "auto")]
    Auto,
    #[value(name = "combinational")]
    Combinational,
    #[value(name = "sequential")]
    Sequential,
}

impl From<KindArg> for Pipeline {
    fn from(arg: KindArg) -> Self {
        match arg {
            KindArg::Auto => Pipeline::Auto,
            KindArg::Combinational => Pipeline::Combinational,
            KindArg::Sequential => Pipeline::Sequential,
        }
    }
}

/// Command-line wrapper for SortColumn
#[derive(Debug, Clone, Copy, ValueEnum)]
pub enum SortArg {
    #[value(name = "cell")]
    Cell,
    #[value(name = "min")]
    Min,
    #[value(name = "max")]
    Max,
    #[value(name = "mean")]
    Mean,
}

impl From<SortArg> for SortColumn {
    fn from(arg: SortArg) -> Self {
        match arg {
            SortArg::Cell => SortColumn::Cell,
            SortArg::Min => SortColumn::Min,
            SortArg::Max => SortColumn::Max,
            SortArg::Mean => SortColumn::Mean,
        }
    }
}
