//! Event Log Common Library
#![deny(clippy::unwrap_used, clippy::expect_used)]
//!
//! Shared utilities for the event log ingestion workspace.
//!
//! # Overview
//!
//! - **Checksums**: MD5 content fingerprints for deduplication
//! - **Logging**: Subscriber configuration for binaries
//!
//! # Example
//!
//! ```no_run
//! use evlog_common::checksum::compute_md5;
//!
//! let digest = compute_md5(b"<Log/>");
//! assert_eq!(digest.len(), 32);
//! ```

pub mod checksum;
pub mod logging;
