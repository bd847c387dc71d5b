//! Gzip decompression of input files
//!
//! Decompression is all-or-nothing: the whole stream is inflated into memory
//! before anything downstream sees it.

use flate2::read::MultiGzDecoder;
use std::io::Read;
use std::path::{Path, PathBuf};
use thiserror::Error;
use tracing::debug;

/// Failure to turn a file on disk into decompressed bytes
#[derive(Debug, Error)]
pub enum ReadError {
    #[error("Failed to open '{}': {source}", path.display())]
    Open {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("'{}' is not a valid gzip stream: {source}", path.display())]
    Decompress {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
}

/// Read and fully decompress a gzip file
///
/// Every member of a multi-member stream is decoded, so concatenated
/// archives come back whole. The file handle is dropped on every return path.
pub fn read_gzip_file(path: &Path) -> Result<Vec<u8>, ReadError> {
    let file = std::fs::File::open(path).map_err(|source| ReadError::Open {
        path: path.to_path_buf(),
        source,
    })?;

    let compressed_len = file.metadata().map(|m| m.len()).unwrap_or_default();

    let mut decoder = MultiGzDecoder::new(file);
    let mut decompressed = Vec::new();
    decoder
        .read_to_end(&mut decompressed)
        .map_err(|source| ReadError::Decompress {
            path: path.to_path_buf(),
            source,
        })?;

    debug!(
        path = %path.display(),
        compressed_bytes = compressed_len,
        decompressed_bytes = decompressed.len(),
        "Decompressed input file"
    );
    Ok(decompressed)
}
