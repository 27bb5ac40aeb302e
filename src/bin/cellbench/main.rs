mod args;

use clap::Parser;
use color_eyre::{eyre::WrapErr, Result};
use globset::Glob;
use log::info;

use cellbench::{
    analysis::{read_results, DelayReport},
    boolean::generate_sensitive_vectors,
    config::Config,
    liberty::Library,
    netlist::generate_library,
};

use args::{Args, Command};

fn main() -> Result<()> {
    color_eyre::install()?;

    let args = Args::parse();
    env_logger::builder()
        .filter_level(args.level())
        .parse_default_env()
        .init();

    let config = Config::load(args.config.as_deref())?;

    match args.command {
        Command::Generate {
            library,
            output,
            cells,
            kind,
        } => {
            let filter = cells
                .as_deref()
                .map(|pattern| {
                    Glob::new(pattern)
                        .map(|g| g.compile_matcher())
                        .wrap_err_with(|| format!("invalid cell pattern {pattern}"))
                })
                .transpose()?;

            let lib = Library::load(&library)?;
            info!(
                "library {} from {library}",
                lib.name().unwrap_or_else(|| String::from("<unnamed>"))
            );

            let report = generate_library(&lib, &config, &output, kind.into(), filter.as_ref())?;
            println!(
                "{} netlists for {} cells in {}",
                report.netlist_count(),
                report.written.len(),
                output.display()
            );
            for (cell, reason) in &report.failed {
                println!("skipped {cell}: {reason}");
            }
        }
        Command::Vectors { expression } => {
            let vectors = generate_sensitive_vectors(&expression)?;
            for (i, vector) in vectors.iter().enumerate() {
                println!("{i:>3}  {vector}");
            }
        }
        Command::Analyze { results, csv, sort } => {
            let summaries = read_results(&results, &config.analysis)?;
            let mut report = DelayReport::new(&summaries);
            report.sort(sort.into());

            if report.is_empty() {
                println!("no delays found in {}", results.display());
            } else {
                print!("{}", report.render());
            }
            if let Some(path) = csv {
                report.write_csv(&path)?;
                info!("wrote {}", path.display());
            }
        }
    }

    Ok(())
}
