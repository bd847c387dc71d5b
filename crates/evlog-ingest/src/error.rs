//! Per-file failure taxonomy

use crate::decompress::ReadError;
use crate::parser::ParseError;
use crate::store::StoreError;
use crate::writer::WriteError;
use std::fmt;
use thiserror::Error;

/// Why one file's pipeline stopped
///
/// None of these abort the run; the file is reported and skipped.
#[derive(Debug, Error)]
pub enum IngestError {
    #[error(transparent)]
    Read(#[from] ReadError),

    #[error(transparent)]
    Parse(#[from] ParseError),

    #[error(transparent)]
    Store(#[from] StoreError),

    #[error(transparent)]
    Write(#[from] WriteError),

    #[error("Worker task failed: {0}")]
    Worker(#[from] tokio::task::JoinError),
}

impl IngestError {
    pub fn kind(&self) -> FailureKind {
        match self {
            IngestError::Read(_) => FailureKind::Read,
            IngestError::Parse(_) => FailureKind::Parse,
            IngestError::Store(_) => FailureKind::Store,
            IngestError::Write(_) => FailureKind::Write,
            IngestError::Worker(_) => FailureKind::Worker,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum FailureKind {
    Read,
    Parse,
    Store,
    Write,
    Worker,
}

impl FailureKind {
    pub fn as_str(self) -> &'static str {
        match self {
            FailureKind::Read => "read",
            FailureKind::Parse => "parse",
            FailureKind::Store => "store",
            FailureKind::Write => "write",
            FailureKind::Worker => "worker",
        }
    }
}

impl fmt::Display for FailureKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::expect_used)]
mod tests {
    use super::*;
    use std::path::PathBuf;

    #[test]
    fn test_kind_follows_source() {
        let read: IngestError = ReadError::Open {
            path: PathBuf::from("missing.gz"),
            source: std::io::Error::from(std::io::ErrorKind::NotFound),
        }
        .into();
        assert_eq!(read.kind(), FailureKind::Read);
        assert!(read.to_string().contains("missing.gz"));

        let parse: IngestError = ParseError::NoRootElement.into();
        assert_eq!(parse.kind(), FailureKind::Parse);

        let store: IngestError =
            StoreError::Query(rusqlite::Error::QueryReturnedNoRows).into();
        assert_eq!(store.kind(), FailureKind::Store);
    }

    #[test]
    fn test_kind_display() {
        assert_eq!(FailureKind::Write.to_string(), "write");
        assert_eq!(FailureKind::Worker.as_str(), "worker");
    }
}
