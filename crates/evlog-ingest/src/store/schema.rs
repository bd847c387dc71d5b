//! SQLite schema for ingested event logs

use rusqlite::Connection;

/// Create both tables if they are missing
///
/// Safe to call on every open and inside every commit; existing tables and
/// their rows are left untouched.
pub fn init_schema(conn: &Connection) -> rusqlite::Result<()> {
    conn.execute_batch(
        r#"
        CREATE TABLE IF NOT EXISTS event_logs (
            uid INTEGER PRIMARY KEY AUTOINCREMENT,
            node TEXT,
            severity TEXT,
            datetime TEXT,
            id TEXT,
            message_id TEXT,
            component_name TEXT,
            component_id TEXT,
            message_text TEXT,
            type TEXT,
            assembly_name TEXT,
            process_name TEXT,
            process_id TEXT,
            thread_name TEXT,
            app_domain TEXT,
            cluster_id TEXT
        );

        CREATE TABLE IF NOT EXISTS file_hashes (
            hash TEXT PRIMARY KEY
        );
        "#,
    )
}
