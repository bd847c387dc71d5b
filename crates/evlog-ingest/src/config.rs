//! Ingestion run configuration

use serde::{Deserialize, Serialize};
use std::path::PathBuf;

/// Directory scanned when none is given.
pub const DEFAULT_INPUT_DIR: &str = "./data/";

/// Database file used when none is given.
pub const DEFAULT_DATABASE_PATH: &str = "EventLog.sqlite3.db";

/// Files processed at once by default (sequential).
pub const DEFAULT_WORKERS: usize = 1;

pub const ENV_INPUT_DIR: &str = "EVLOG_INPUT_DIR";
pub const ENV_DATABASE: &str = "EVLOG_DATABASE";
pub const ENV_WORKERS: &str = "EVLOG_WORKERS";
pub const ENV_RECURSIVE: &str = "EVLOG_RECURSIVE";

/// Settings for one ingestion run
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct IngestConfig {
    pub input_dir: PathBuf,
    pub database_path: PathBuf,
    pub workers: usize,
    pub recursive: bool,
}

impl Default for IngestConfig {
    fn default() -> Self {
        Self {
            input_dir: PathBuf::from(DEFAULT_INPUT_DIR),
            database_path: PathBuf::from(DEFAULT_DATABASE_PATH),
            workers: DEFAULT_WORKERS,
            recursive: true,
        }
    }
}

impl IngestConfig {
    /// Defaults overridden by `EVLOG_*` environment variables
    ///
    /// Unparseable numeric or boolean values fall back to the default.
    pub fn from_env() -> Self {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Self {
        let defaults = Self::default();

        Self {
            input_dir: lookup(ENV_INPUT_DIR)
                .map(PathBuf::from)
                .unwrap_or(defaults.input_dir),
            database_path: lookup(ENV_DATABASE)
                .map(PathBuf::from)
                .unwrap_or(defaults.database_path),
            workers: lookup(ENV_WORKERS)
                .and_then(|s| s.trim().parse().ok())
                .unwrap_or(defaults.workers),
            recursive: lookup(ENV_RECURSIVE)
                .and_then(|s| parse_bool(&s))
                .unwrap_or(defaults.recursive),
        }
    }

    pub fn with_input_dir(mut self, input_dir: impl Into<PathBuf>) -> Self {
        self.input_dir = input_dir.into();
        self
    }

    pub fn with_database_path(mut self, database_path: impl Into<PathBuf>) -> Self {
        self.database_path = database_path.into();
        self
    }

    pub fn with_workers(mut self, workers: usize) -> Self {
        self.workers = workers;
        self
    }

    pub fn with_recursive(mut self, recursive: bool) -> Self {
        self.recursive = recursive;
        self
    }

    pub fn is_parallel(&self) -> bool {
        self.workers > 1
    }

    /// Validate configuration
    pub fn validate(&self) -> anyhow::Result<()> {
        if self.workers == 0 {
            anyhow::bail!("Worker count must be greater than 0");
        }

        if self.database_path.as_os_str().is_empty() {
            anyhow::bail!("Database path cannot be empty");
        }

        Ok(())
    }
}

fn parse_bool(value: &str) -> Option<bool> {
    match value.trim().to_lowercase().as_str() {
        "1" | "true" | "yes" | "on" => Some(true),
        "0" | "false" | "no" | "off" => Some(false),
        _ => None,
    }
}
