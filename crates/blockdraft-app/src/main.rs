//! Command-line entry point.
//!
//! Loads a design, reports what could be restored, and optionally writes it
//! back out in normalised form.

use blockdraft_app::{App, AppConfig, AppError, ShortcutRegistry};
use blockdraft_core::MemoryStorage;
use clap::Parser;
use std::path::{Path, PathBuf};
use std::process::ExitCode;

#[derive(Parser, Debug)]
#[command(author, version, about = "Check and normalise blockdraft design files")]
struct Cli {
    /// Application config file (JSON)
    #[arg(short, long, value_name = "CONFIG")]
    config: Option<PathBuf>,

    /// List keyboard shortcuts and exit
    #[arg(long)]
    shortcuts: bool,

    /// Design file to load
    #[arg(value_name = "DESIGN", required_unless_present = "shortcuts")]
    input: Option<PathBuf>,

    /// Where to write the loaded design back out
    #[arg(value_name = "OUT")]
    output: Option<PathBuf>,
}

fn run(cli: &Cli, input: &Path) -> Result<(), AppError> {
    let config = match &cli.config {
        Some(path) => AppConfig::from_file(path)?,
        None => AppConfig::default(),
    };
    // Files are addressed by path here; named storage is not touched.
    let mut app = App::with_storage(config, Box::new(MemoryStorage::new()));

    let report = app.import(input)?;
    println!(
        "{}: {} block(s), {} connection(s)",
        input.display(),
        report.blocks,
        report.connections
    );
    for unresolved in &report.unresolved {
        println!("  connection {} dropped: {}", unresolved.index, unresolved.reason);
    }

    if let Some(output) = &cli.output {
        app.export(output)?;
    }
    Ok(())
}

fn main() -> ExitCode {
    env_logger::init();
    let cli = Cli::parse();
    log::info!("Starting Blockdraft");

    if cli.shortcuts {
        ShortcutRegistry::print_all();
        return ExitCode::SUCCESS;
    }
    let Some(input) = &cli.input else {
        return ExitCode::from(2);
    };
    match run(&cli, input) {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            log::error!("{}", e);
            eprintln!("error: {}", e);
            ExitCode::FAILURE
        }
    }
}
