//! Atomic persistence of one file's records and fingerprint

use crate::fingerprint::Fingerprint;
use crate::models::EventRecord;
use crate::store::{schema, Store};
use rusqlite::{params, params_from_iter, ErrorCode, TransactionBehavior};
use thiserror::Error;
use tracing::{info, warn};

const INSERT_FINGERPRINT_SQL: &str = "INSERT INTO file_hashes (hash) VALUES (?1)";

const INSERT_EVENT_SQL: &str = r#"
    INSERT INTO event_logs (
        node, severity, datetime, id, message_id,
        component_name, component_id, message_text, type, assembly_name,
        process_name, process_id, thread_name, app_domain, cluster_id
    ) VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10, ?11, ?12, ?13, ?14, ?15)
"#;

/// Commit failed; the store was left exactly as before the call
#[derive(Debug, Error)]
pub enum WriteError {
    #[error("Failed to begin transaction: {0}")]
    Begin(#[source] rusqlite::Error),

    #[error("Failed to ensure schema: {0}")]
    Schema(#[source] rusqlite::Error),

    #[error("Failed to record fingerprint {fingerprint}: {source}")]
    Fingerprint {
        fingerprint: Fingerprint,
        #[source]
        source: rusqlite::Error,
    },

    #[error("Failed to prepare record insert: {0}")]
    Prepare(#[source] rusqlite::Error),

    #[error("Failed to insert record {index}: {source}")]
    Record {
        index: usize,
        #[source]
        source: rusqlite::Error,
    },

    #[error("Failed to commit transaction: {0}")]
    Commit(#[source] rusqlite::Error),
}

/// Result of a successful (non-erroring) commit
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CommitOutcome {
    /// Records and fingerprint are durably stored
    Written { rows: usize },
    /// Another writer recorded this fingerprint first; nothing was written
    Rejected,
}

/// Exclusive writer for event rows and file fingerprints
pub struct EventLogWriter<'a> {
    store: &'a mut Store,
}

impl<'a> EventLogWriter<'a> {
    pub fn new(store: &'a mut Store) -> Self {
        Self { store }
    }

    /// Write every record plus the fingerprint as one transaction
    ///
    /// The fingerprint goes in first so that a concurrent duplicate is
    /// detected by the primary key before any record is written. Any failure
    /// drops the transaction, which rolls it back.
    pub fn commit(
        &mut self,
        records: &[EventRecord],
        fingerprint: &Fingerprint,
    ) -> Result<CommitOutcome, WriteError> {
        let tx = self
            .store
            .connection_mut()
            .transaction_with_behavior(TransactionBehavior::Immediate)
            .map_err(WriteError::Begin)?;

        schema::init_schema(&tx).map_err(WriteError::Schema)?;

        if let Err(source) = tx.execute(INSERT_FINGERPRINT_SQL, params![fingerprint.as_str()]) {
            if is_constraint_violation(&source) {
                tx.rollback().map_err(WriteError::Commit)?;
                warn!(fingerprint = %fingerprint, "Fingerprint recorded concurrently, commit rejected");
                return Ok(CommitOutcome::Rejected);
            }
            return Err(WriteError::Fingerprint {
                fingerprint: fingerprint.clone(),
                source,
            });
        }

        {
            let mut stmt = tx
                .prepare_cached(INSERT_EVENT_SQL)
                .map_err(WriteError::Prepare)?;

            for (index, record) in records.iter().enumerate() {
                stmt.execute(params_from_iter(record.values()))
                    .map_err(|source| WriteError::Record { index, source })?;
            }
        }

        tx.commit().map_err(WriteError::Commit)?;

        info!(fingerprint = %fingerprint, rows = records.len(), "Insert records done");
        Ok(CommitOutcome::Written {
            rows: records.len(),
        })
    }
}

fn is_constraint_violation(err: &rusqlite::Error) -> bool {
    matches!(
        err,
        rusqlite::Error::SqliteFailure(failure, _) if failure.code == ErrorCode::ConstraintViolation
    )
}
