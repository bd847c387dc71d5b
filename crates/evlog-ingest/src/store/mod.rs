//! SQLite-backed store for event records and file fingerprints
//!
//! The store is a single database file shared by every run (and by every
//! worker inside a run). It is created on first open; later opens find the
//! tables already in place.

pub mod schema;

use crate::fingerprint::Fingerprint;
use rusqlite::{params, Connection, OptionalExtension};
use std::path::{Path, PathBuf};
use std::time::Duration;
use thiserror::Error;
use tracing::info;

/// How long a connection waits for another writer before giving up
pub const BUSY_TIMEOUT: Duration = Duration::from_secs(30);

/// Store could not be opened or queried
#[derive(Debug, Error)]
pub enum StoreError {
    #[error("Failed to create directory for store '{}': {source}", path.display())]
    CreateDir {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Failed to open store '{}': {source}", path.display())]
    Open {
        path: PathBuf,
        #[source]
        source: rusqlite::Error,
    },

    #[error("Failed to initialize store schema: {0}")]
    Schema(#[source] rusqlite::Error),

    #[error("Store query failed: {0}")]
    Query(#[from] rusqlite::Error),
}

/// Handle to the event log database
pub struct Store {
    conn: Connection,
    path: Option<PathBuf>,
}

impl Store {
    /// Open (creating if absent) the store at `path`
    pub fn open(path: impl AsRef<Path>) -> Result<Self, StoreError> {
        let path = path.as_ref();
        let existed = path.exists();

        if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
            std::fs::create_dir_all(parent).map_err(|source| StoreError::CreateDir {
                path: path.to_path_buf(),
                source,
            })?;
        }

        let conn = Connection::open(path).map_err(|source| StoreError::Open {
            path: path.to_path_buf(),
            source,
        })?;
        conn.busy_timeout(BUSY_TIMEOUT)?;
        conn.execute_batch("PRAGMA journal_mode=WAL; PRAGMA synchronous=NORMAL;")?;

        let store = Self {
            conn,
            path: Some(path.to_path_buf()),
        };
        store.ensure_schema()?;

        if existed {
            info!(path = %path.display(), "Database already exists");
        } else {
            info!(path = %path.display(), "Database created");
        }

        Ok(store)
    }

    /// Open a private in-memory store
    pub fn open_in_memory() -> Result<Self, StoreError> {
        let conn = Connection::open_in_memory().map_err(|source| StoreError::Open {
            path: PathBuf::from(":memory:"),
            source,
        })?;

        let store = Self { conn, path: None };
        store.ensure_schema()?;
        Ok(store)
    }

    /// Create the tables if they do not exist yet
    pub fn ensure_schema(&self) -> Result<(), StoreError> {
        schema::init_schema(&self.conn).map_err(StoreError::Schema)
    }

    /// Whether a file with this fingerprint has already been committed
    pub fn contains_fingerprint(&self, fingerprint: &Fingerprint) -> Result<bool, StoreError> {
        let found = self
            .conn
            .query_row(
                "SELECT 1 FROM file_hashes WHERE hash = ?1",
                params![fingerprint.as_str()],
                |_| Ok(()),
            )
            .optional()?;

        Ok(found.is_some())
    }

    /// Number of rows in `event_logs`
    pub fn event_count(&self) -> Result<u64, StoreError> {
        self.count("SELECT COUNT(*) FROM event_logs")
    }

    /// Number of rows in `file_hashes`
    pub fn fingerprint_count(&self) -> Result<u64, StoreError> {
        self.count("SELECT COUNT(*) FROM file_hashes")
    }

    fn count(&self, sql: &str) -> Result<u64, StoreError> {
        let count: i64 = self.conn.query_row(sql, [], |row| row.get(0))?;
        Ok(u64::try_from(count).unwrap_or_default())
    }

    pub(crate) fn connection(&self) -> &Connection {
        &self.conn
    }

    pub(crate) fn connection_mut(&mut self) -> &mut Connection {
        &mut self.conn
    }
}

impl std::fmt::Debug for Store {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Store").field("path", &self.path).finish()
    }
}
