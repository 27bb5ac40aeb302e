mod format;

pub mod combinational;
pub mod sequential;
mod source;
mod template;

pub use format::eng_format;
pub use sequential::PinConventions;
pub use source::{PulseShape, SourceKind, SourceSpec, VoltageSource};
pub use template::Testbench;

use std::{
    fs,
    path::{Path, PathBuf},
};

use bytesize::ByteSize;
use color_eyre::{eyre::WrapErr, Result};
use globset::GlobMatcher;
use log::{info, warn};
use rayon::prelude::*;
use thiserror::Error;

use crate::{boolean::EvaluationError, config::Config, liberty::Library};

pub const SUPPLY_NODE: &str = "vdd!";
pub const GROUND_NODE: &str = "0";

#[derive(Debug, Error)]
pub enum TestbenchError {
    /// A source tag that neither pipeline knows how to render.
    #[error("unknown voltage source kind {0:?}")]
    UnknownSourceKind(String),
    #[error("invalid source on node {node}: {reason}")]
    InvalidSource { node: String, reason: String },
    #[error("cell {cell} has no pin matching {pin}")]
    MissingPin { cell: String, pin: String },
    #[error("pin {pin} of cell {cell} has no usable {attribute} attribute")]
    MissingAttribute {
        cell: String,
        pin: String,
        attribute: String,
    },
    #[error("cell {cell}: bad output function")]
    Function {
        cell: String,
        source: EvaluationError,
    },
}

/// Which testbench a cell gets.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Pipeline {
    /// Sequential for cells with `ff`/`latch` groups, combinational otherwise.
    Auto,
    Combinational,
    Sequential,
}

#[derive(Debug, Default)]
pub struct GenerationReport {
    /// Cell name and the netlists written for it, in library order.
    pub written: Vec<(String, Vec<PathBuf>)>,
    /// Cell name and the reason it was skipped.
    pub failed: Vec<(String, String)>,
    pub bytes: u64,
}

impl GenerationReport {
    pub fn netlist_count(&self) -> usize {
        self.written.iter().map(|(_, paths)| paths.len()).sum()
    }
}

/// Writes testbenches for every selected cell of `library` into `out_dir`.
/// A failing cell is logged and recorded; the others still get written.
pub fn generate_library(
    library: &Library,
    config: &Config,
    out_dir: &Path,
    pipeline: Pipeline,
    cell_filter: Option<&GlobMatcher>,
) -> Result<GenerationReport> {
    fs::create_dir_all(out_dir)
        .wrap_err_with(|| format!("cannot create output directory {}", out_dir.display()))?;
    let conventions = PinConventions::new(&config.sequential)
        .wrap_err("invalid sequential pin pattern in config")?;

    let cells: Vec<_> = library
        .cells()
        .filter(|c| cell_filter.map_or(true, |m| m.is_match(c.name())))
        .collect();
    info!(
        "generating testbenches for {} cells of {} into {}",
        cells.len(),
        library.file_path.as_deref().unwrap_or("<inline library>"),
        out_dir.display()
    );

    let results: Vec<(String, Result<Vec<PathBuf>>)> = cells
        .par_iter()
        .map(|cell| {
            let sequential = match pipeline {
                Pipeline::Auto => cell.is_sequential(),
                Pipeline::Combinational => false,
                Pipeline::Sequential => true,
            };
            let result = if sequential {
                sequential::write_ff_testbench(cell, config, &conventions, out_dir)
            } else {
                combinational::write_cell_testbenches(cell, config, out_dir)
            };
            (cell.name(), result)
        })
        .collect();

    let mut report = GenerationReport::default();
    for (cell, result) in results {
        match result {
            Ok(paths) => {
                for path in &paths {
                    match fs::metadata(path) {
                        Ok(meta) => report.bytes += meta.len(),
                        Err(err) => warn!("cannot stat {}: {err}", path.display()),
                    }
                }
                report.written.push((cell, paths));
            }
            Err(err) => {
                warn!("skipping cell {cell}: {err:#}");
                report.failed.push((cell, format!("{err:#}")));
            }
        }
    }

    info!(
        "wrote {} netlists for {} cells ({}), {} cells skipped",
        report.netlist_count(),
        report.written.len(),
        ByteSize(report.bytes),
        report.failed.len()
    );
    Ok(report)
}
