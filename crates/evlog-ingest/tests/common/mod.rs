//! Shared fixtures for integration tests

#![allow(dead_code)]

use flate2::write::GzEncoder;
use flate2::Compression;
use rusqlite::Connection;
use std::io::Write;
use std::path::{Path, PathBuf};

/// One message, two item groups: (N1, Error) and (N2, boom)
pub const SCENARIO_XML: &str = "<?xml version=\"1.0\" encoding=\"utf-8\"?>\n\
<EventLog>\n\
  <Message>\n\
    <Item>\n\
      <Node>N1</Node>\n\
      <Severity>Error</Severity>\n\
    </Item>\n\
    <Item>\n\
      <Node>N2</Node>\n\
      <MessageText>boom</MessageText>\n\
    </Item>\n\
  </Message>\n\
</EventLog>\n";

/// Write `content` gzip-compressed to `dir/name`, creating parent directories
pub fn write_gzip(dir: &Path, name: &str, content: &[u8]) -> PathBuf {
    let path = dir.join(name);
    if let Some(parent) = path.parent() {
        std::fs::create_dir_all(parent).unwrap();
    }
    let mut encoder = GzEncoder::new(Vec::new(), Compression::default());
    encoder.write_all(content).unwrap();
    std::fs::write(&path, encoder.finish().unwrap()).unwrap();
    path
}

/// A log with `groups` item groups, each carrying a distinct `Id`
pub fn numbered_log(label: &str, groups: usize) -> String {
    let mut xml = String::from("<EventLog><Message>");
    for i in 0..groups {
        xml.push_str(&format!(
            "<Item><Node>{label}</Node><Id>{i}</Id><Severity>Info</Severity></Item>"
        ));
    }
    xml.push_str("</Message></EventLog>");
    xml
}

pub type Row = (Option<String>, Option<String>, Option<String>);

/// (node, severity, message_text) for every row, in uid order
pub fn rows(database: &Path) -> Vec<Row> {
    let conn = Connection::open(database).unwrap();
    let mut stmt = conn
        .prepare("SELECT node, severity, message_text FROM event_logs ORDER BY uid")
        .unwrap();
    stmt.query_map([], |row| Ok((row.get(0)?, row.get(1)?, row.get(2)?)))
        .unwrap()
        .collect::<Result<_, _>>()
        .unwrap()
}

pub fn hashes(database: &Path) -> Vec<String> {
    let conn = Connection::open(database).unwrap();
    let mut stmt = conn.prepare("SELECT hash FROM file_hashes ORDER BY hash").unwrap();
    stmt.query_map([], |row| row.get(0))
        .unwrap()
        .collect::<Result<_, _>>()
        .unwrap()
}

/// Every column other than node, severity and message_text is null
pub fn other_columns_null(database: &Path) -> bool {
    let conn = Connection::open(database).unwrap();
    conn.query_row(
        "SELECT COUNT(*) FROM event_logs WHERE \
         datetime IS NOT NULL OR id IS NOT NULL OR message_id IS NOT NULL OR \
         component_name IS NOT NULL OR component_id IS NOT NULL OR type IS NOT NULL OR \
         assembly_name IS NOT NULL OR process_name IS NOT NULL OR process_id IS NOT NULL OR \
         thread_name IS NOT NULL OR app_domain IS NOT NULL OR cluster_id IS NOT NULL",
        [],
        |row| row.get::<_, i64>(0),
    )
    .unwrap()
        == 0
}
