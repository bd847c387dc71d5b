//! Event Log Ingest Library
#![deny(clippy::unwrap_used, clippy::expect_used)]
//!
//! Loads gzip-compressed XML event logs into a SQLite store. Each item group
//! of a log becomes one row in `event_logs`; each file is committed at most
//! once, keyed by the MD5 of its decompressed content in `file_hashes`.
//!
//! # Pipeline
//!
//! - **Decompressor** ([`decompress`]): gzip file to bytes
//! - **Fingerprint gate** ([`fingerprint`]): skip content seen before
//! - **Flattening parser** ([`parser`]): bytes to [`EventRecord`]s
//! - **Persistence writer** ([`writer`]): records plus fingerprint in one transaction
//!
//! # Example
//!
//! ```no_run
//! use evlog_ingest::{discover_files, run_sequential, Store};
//! use std::path::Path;
//!
//! fn main() -> anyhow::Result<()> {
//!     let mut store = Store::open("EventLog.sqlite3.db")?;
//!     let files = discover_files(Path::new("./data/"), true)?;
//!
//!     let report = run_sequential(&mut store, &files);
//!     report.log_summary();
//!     Ok(())
//! }
//! ```

pub mod config;
pub mod decompress;
pub mod discovery;
pub mod error;
pub mod fingerprint;
pub mod models;
pub mod parser;
pub mod pipeline;
pub mod store;
pub mod writer;

pub use config::IngestConfig;
pub use discovery::{discover_files, DiscoveryError};
pub use error::{FailureKind, IngestError};
pub use fingerprint::{Fingerprint, FingerprintGate, GateDecision};
pub use models::{EventField, EventRecord};
pub use pipeline::{ingest_file, run_parallel, run_sequential, FileFailure, FileOutcome, IngestReport};
pub use store::{Store, StoreError};
