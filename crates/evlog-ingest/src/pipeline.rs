//! Per-file ingestion pipeline and run orchestration
//!
//! Each file goes through decompress -> fingerprint gate -> parse -> commit.
//! A file is the unit of failure: whatever goes wrong with one file is
//! recorded in the [`IngestReport`] and the run moves on to the next.

use crate::decompress::read_gzip_file;
use crate::error::{FailureKind, IngestError};
use crate::fingerprint::{Fingerprint, FingerprintGate, GateDecision};
use crate::parser::parse_all;
use crate::store::Store;
use crate::writer::{CommitOutcome, EventLogWriter};
use futures::stream::{self, StreamExt};
use std::path::{Path, PathBuf};
use tracing::{error, info, info_span};

/// What happened to a file whose pipeline completed without error
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FileOutcome {
    Written {
        fingerprint: Fingerprint,
        records: usize,
    },
    /// Content was committed by an earlier run (or earlier in this one)
    Duplicate { fingerprint: Fingerprint },
    /// Another worker committed the same content between gate and commit
    Rejected { fingerprint: Fingerprint },
}

impl FileOutcome {
    pub fn fingerprint(&self) -> &Fingerprint {
        match self {
            FileOutcome::Written { fingerprint, .. }
            | FileOutcome::Duplicate { fingerprint }
            | FileOutcome::Rejected { fingerprint } => fingerprint,
        }
    }
}

/// Run the full pipeline for one file against `store`
pub fn ingest_file(store: &mut Store, path: &Path) -> Result<FileOutcome, IngestError> {
    let _span = info_span!("ingest_file", path = %path.display()).entered();

    let bytes = read_gzip_file(path)?;

    let fingerprint = match FingerprintGate::new(store).check_and_reserve(&bytes)? {
        GateDecision::New(fingerprint) => fingerprint,
        GateDecision::Duplicate(fingerprint) => {
            info!(fingerprint = %fingerprint, "File already ingested, skipping");
            return Ok(FileOutcome::Duplicate { fingerprint });
        },
    };

    let records = parse_all(&bytes)?;

    match EventLogWriter::new(store).commit(&records, &fingerprint)? {
        CommitOutcome::Written { rows } => Ok(FileOutcome::Written {
            fingerprint,
            records: rows,
        }),
        CommitOutcome::Rejected => Ok(FileOutcome::Rejected { fingerprint }),
    }
}

/// A file that could not be ingested
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FileFailure {
    pub path: PathBuf,
    pub kind: FailureKind,
    pub message: String,
}

/// Totals for one run over a list of files
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct IngestReport {
    pub files_written: usize,
    pub files_duplicate: usize,
    pub files_rejected: usize,
    pub records_written: usize,
    /// Sorted by path once the run is finished
    pub failures: Vec<FileFailure>,
}

impl IngestReport {
    pub fn files_failed(&self) -> usize {
        self.failures.len()
    }

    pub fn files_seen(&self) -> usize {
        self.files_written + self.files_duplicate + self.files_rejected + self.files_failed()
    }

    pub fn has_failures(&self) -> bool {
        !self.failures.is_empty()
    }

    /// Fold one file's result into the totals
    pub fn record(&mut self, path: &Path, result: Result<FileOutcome, IngestError>) {
        match result {
            Ok(FileOutcome::Written { records, .. }) => {
                self.files_written += 1;
                self.records_written += records;
            },
            Ok(FileOutcome::Duplicate { .. }) => self.files_duplicate += 1,
            Ok(FileOutcome::Rejected { .. }) => self.files_rejected += 1,
            Err(err) => {
                error!(
                    path = %path.display(),
                    kind = %err.kind(),
                    error = %err,
                    "Failed to ingest file"
                );
                self.failures.push(FileFailure {
                    path: path.to_path_buf(),
                    kind: err.kind(),
                    message: err.to_string(),
                });
            },
        }
    }

    fn finish(mut self) -> Self {
        self.failures.sort_by(|a, b| a.path.cmp(&b.path));
        self
    }

    pub fn log_summary(&self) {
        info!(
            files = self.files_seen(),
            written = self.files_written,
            duplicate = self.files_duplicate,
            rejected = self.files_rejected,
            failed = self.files_failed(),
            records = self.records_written,
            "Ingestion run finished"
        );
    }
}

/// Ingest `paths` one after another through a single store handle
pub fn run_sequential(store: &mut Store, paths: &[PathBuf]) -> IngestReport {
    let mut report = IngestReport::default();
    for path in paths {
        let result = ingest_file(store, path);
        report.record(path, result);
    }
    report.finish()
}

/// Ingest `paths` with up to `workers` files in flight at once
///
/// Every file is processed on the blocking pool with its own connection to
/// the database at `database_path`. Two files with identical content race
/// on the fingerprint primary key; the loser reports
/// [`FileOutcome::Rejected`].
pub async fn run_parallel(database_path: &Path, paths: &[PathBuf], workers: usize) -> IngestReport {
    let workers = workers.max(1);
    info!(files = paths.len(), workers, "Processing files in parallel");

    let results: Vec<(PathBuf, Result<FileOutcome, IngestError>)> = stream::iter(paths.iter().cloned())
        .map(|path| {
            let database_path = database_path.to_path_buf();
            async move {
                let task_path = path.clone();
                let joined = tokio::task::spawn_blocking(move || -> Result<FileOutcome, IngestError> {
                    let mut store = Store::open(&database_path)?;
                    ingest_file(&mut store, &task_path)
                })
                .await;

                let result = joined.unwrap_or_else(|err| Err(IngestError::from(err)));
                (path, result)
            }
        })
        .buffer_unordered(workers)
        .collect()
        .await;

    let mut report = IngestReport::default();
    for (path, result) in results {
        report.record(&path, result);
    }
    report.finish()
}
