//! Input file discovery

use std::path::{Path, PathBuf};
use thiserror::Error;
use tracing::{debug, warn};
use walkdir::{DirEntry, WalkDir};

#[derive(Debug, Error)]
pub enum DiscoveryError {
    #[error("Input directory '{}' does not exist", path.display())]
    NotFound { path: PathBuf },

    #[error("Input path '{}' is not a directory", path.display())]
    NotADirectory { path: PathBuf },
}

/// List candidate input files under `dir`, sorted by path
///
/// Hidden files and directories are skipped. Entries that cannot be read
/// are logged and left out; every file that is returned is handed to the
/// pipeline as-is, so anything that is not a gzip log fails there.
pub fn discover_files(dir: &Path, recursive: bool) -> Result<Vec<PathBuf>, DiscoveryError> {
    if !dir.exists() {
        return Err(DiscoveryError::NotFound {
            path: dir.to_path_buf(),
        });
    }
    if !dir.is_dir() {
        return Err(DiscoveryError::NotADirectory {
            path: dir.to_path_buf(),
        });
    }

    let mut walker = WalkDir::new(dir).follow_links(true);
    if !recursive {
        walker = walker.max_depth(1);
    }

    let mut files = Vec::new();
    for entry in walker
        .into_iter()
        .filter_entry(|e| e.depth() == 0 || !is_hidden(e))
    {
        match entry {
            Ok(entry) if entry.file_type().is_file() => files.push(entry.into_path()),
            Ok(_) => {},
            Err(err) => warn!(error = %err, "Skipping unreadable entry"),
        }
    }

    files.sort();
    debug!(dir = %dir.display(), files = files.len(), recursive, "Discovered input files");
    Ok(files)
}

fn is_hidden(entry: &DirEntry) -> bool {
    entry
        .file_name()
        .to_str()
        .map(|name| name.starts_with('.'))
        .unwrap_or(false)
}
