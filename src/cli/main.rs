//! CLI binary entry point for xlsx-splitter

use std::path::PathBuf;

use clap::Parser;
use tracing_subscriber::EnvFilter;
use xlsx_splitter::split::{SplitConfig, SplitError, run};

#[derive(Parser)]
#[command(name = "xlsx-splitter")]
#[command(about = "Split a large xlsx spreadsheet into fixed-size chunk files")]
#[command(version)]
struct Cli {
    /// Input spreadsheet (.xlsx)
    input: PathBuf,
}

fn main() {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn")),
        )
        .with_target(false)
        .init();

    let cli = Cli::parse();
    let config = SplitConfig::new(cli.input);

    match run(&config) {
        Ok(stats) => {
            println!("Total chunks: {}", stats.chunks_written);
            println!("Total rows: {}", stats.rows_kept);
            println!("Skipped {} rows", stats.rows_skipped);
        }
        // A missing input is reported as a normal termination, not a failure.
        Err(SplitError::InputNotFound(path)) => {
            println!("File not exists: {}", path.display());
        }
        Err(e) => {
            eprintln!("Error: {}", e);
            std::process::exit(1);
        }
    }
}
