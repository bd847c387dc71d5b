//! Content fingerprints and the duplicate-file gate
//!
//! A fingerprint is the MD5 of the fully decompressed bytes of one input
//! file. The gate only reads: recording a fingerprint happens inside the
//! writer's commit, so a file that fails later in the pipeline can be
//! retried on the next run.

use crate::store::{Store, StoreError};
use evlog_common::checksum::compute_md5;
use std::fmt;
use tracing::debug;

/// Hex-encoded 128-bit content hash of one decompressed input file
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct Fingerprint(String);

impl Fingerprint {
    /// Fingerprint the exact byte sequence given
    pub fn of(bytes: &[u8]) -> Self {
        Self(compute_md5(bytes))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for Fingerprint {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Outcome of checking a file's content against the store
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum GateDecision {
    /// Never committed before; parse and write it
    New(Fingerprint),
    /// Already committed by an earlier run; skip entirely
    Duplicate(Fingerprint),
}

impl GateDecision {
    pub fn fingerprint(&self) -> &Fingerprint {
        match self {
            GateDecision::New(fp) | GateDecision::Duplicate(fp) => fp,
        }
    }
}

/// Decides whether decompressed content has been ingested before
pub struct FingerprintGate<'a> {
    store: &'a Store,
}

impl<'a> FingerprintGate<'a> {
    pub fn new(store: &'a Store) -> Self {
        Self { store }
    }

    /// Hash `bytes` and look the hash up in the store
    ///
    /// Nothing is persisted here. The returned fingerprint must be handed
    /// to the writer, whose commit records it atomically with the records.
    pub fn check_and_reserve(&self, bytes: &[u8]) -> Result<GateDecision, StoreError> {
        let fingerprint = Fingerprint::of(bytes);
        debug!(fingerprint = %fingerprint, bytes = bytes.len(), "Calculated fingerprint");

        if self.store.contains_fingerprint(&fingerprint)? {
            Ok(GateDecision::Duplicate(fingerprint))
        } else {
            Ok(GateDecision::New(fingerprint))
        }
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::expect_used)]
mod tests {
    use super::*;
    use rusqlite::params;

    #[test]
    fn test_fingerprint_is_md5_hex() {
        let fp = Fingerprint::of(b"Hello, world!");
        assert_eq!(fp.as_str(), "6cd3556deb0da54bca060b4c39479839");
        assert_eq!(fp.to_string(), fp.as_str());
    }

    #[test]
    fn test_fingerprint_determinism() {
        let bytes = b"<Log><Message><Items><Node>N1</Node></Items></Message></Log>";
        assert_eq!(Fingerprint::of(bytes), Fingerprint::of(bytes));

        let mut changed = bytes.to_vec();
        changed[20] ^= 0x01;
        assert_ne!(Fingerprint::of(bytes), Fingerprint::of(&changed));
    }

    #[test]
    fn test_fingerprint_is_lowercase_md5_hex() {
        let fp = Fingerprint::of(b"Hello, world!");
        assert_eq!(fp.as_str(), "6cd3556deb0da54bca060b4c39479839");
        assert_eq!(fp.to_string(), fp.as_str());
    }

    #[test]
    fn test_gate_new_then_duplicate() {
        let store = Store::open_in_memory().unwrap();
        let bytes = b"<Log/>";

        let decision = FingerprintGate::new(&store).check_and_reserve(bytes).unwrap();
        let fingerprint = match decision {
            GateDecision::New(fp) => fp,
            other => panic!("expected New, got {:?}", other),
        };

        // The gate itself never records anything
        assert_eq!(store.fingerprint_count().unwrap(), 0);
        assert_eq!(
            FingerprintGate::new(&store).check_and_reserve(bytes).unwrap(),
            GateDecision::New(fingerprint.clone())
        );

        store
            .connection()
            .execute(
                "INSERT INTO file_hashes (hash) VALUES (?1)",
                params![fingerprint.as_str()],
            )
            .unwrap();

        let decision = FingerprintGate::new(&store).check_and_reserve(bytes).unwrap();
        assert_eq!(decision, GateDecision::Duplicate(fingerprint.clone()));
        assert_eq!(decision.fingerprint(), &fingerprint);
    }

    #[test]
    fn test_gate_fails_without_schema() {
        let store = Store::open_in_memory().unwrap();
        store
            .connection()
            .execute_batch("DROP TABLE file_hashes;")
            .unwrap();

        let result = FingerprintGate::new(&store).check_and_reserve(b"<Log/>");
        assert!(matches!(result, Err(StoreError::Query(_))));
    }
}
