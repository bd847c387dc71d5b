//! Event Log Ingest - load compressed XML event logs into SQLite

use anyhow::{Context, Result};
use clap::Parser;
use evlog_common::logging::{init_logging, LogConfig, LogLevel};
use evlog_ingest::{discover_files, run_parallel, run_sequential, IngestConfig, Store};
use std::path::PathBuf;
use std::process::ExitCode;
use tracing::{error, info};

#[derive(Parser, Debug)]
#[command(name = "evlog-ingest")]
#[command(author, version, about = "Ingest gzip XML event logs into a SQLite store")]
struct Cli {
    /// Directory containing .gz event log files
    #[arg(env = "EVLOG_INPUT_DIR")]
    input_dir: Option<PathBuf>,

    /// SQLite database file (created if missing)
    #[arg(short, long, env = "EVLOG_DATABASE")]
    database: Option<PathBuf>,

    /// Number of files processed at once
    #[arg(short, long, env = "EVLOG_WORKERS")]
    workers: Option<usize>,

    /// Only ingest files directly inside the input directory
    #[arg(long)]
    no_recursive: bool,

    /// Verbose output
    #[arg(short, long)]
    verbose: bool,
}

impl Cli {
    fn into_config(self) -> IngestConfig {
        let mut config = IngestConfig::from_env();
        if let Some(input_dir) = self.input_dir {
            config = config.with_input_dir(input_dir);
        }
        if let Some(database) = self.database {
            config = config.with_database_path(database);
        }
        if let Some(workers) = self.workers {
            config = config.with_workers(workers);
        }
        if self.no_recursive {
            config = config.with_recursive(false);
        }
        config
    }
}

#[tokio::main]
async fn main() -> Result<ExitCode> {
    dotenvy::dotenv().ok();
    let cli = Cli::parse();

    let log_level = if cli.verbose {
        LogLevel::Debug
    } else {
        LogLevel::Info
    };

    // Environment variables take precedence over the flag
    let log_config = LogConfig::builder()
        .level(log_level)
        .log_file_prefix("evlog-ingest")
        .build()
        .merge_env()?;
    let _guard = init_logging(&log_config)?;

    let config = cli.into_config();
    config.validate()?;

    info!(
        input_dir = %config.input_dir.display(),
        database = %config.database_path.display(),
        workers = config.workers,
        "Starting ingestion"
    );

    let mut store = Store::open(&config.database_path)
        .with_context(|| format!("Failed to open store {}", config.database_path.display()))?;
    let files = discover_files(&config.input_dir, config.recursive)?;

    let report = if config.is_parallel() {
        drop(store);
        run_parallel(&config.database_path, &files, config.workers).await
    } else {
        tokio::task::block_in_place(|| run_sequential(&mut store, &files))
    };

    report.log_summary();

    if report.has_failures() {
        error!(failed = report.files_failed(), "Some files could not be ingested");
        return Ok(ExitCode::FAILURE);
    }

    Ok(ExitCode::SUCCESS)
}
