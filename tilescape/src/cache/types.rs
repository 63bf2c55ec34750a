//! Cache error types.

use std::io;
use std::path::PathBuf;

use thiserror::Error;

/// Errors that can occur during cache operations.
#[derive(Debug, Error)]
pub enum CacheError {
    /// Failed to create the cache directory.
    #[error("Failed to create cache directory {path}: {source}")]
    CreateDir {
        /// Directory that could not be created
        path: PathBuf,
        /// Underlying I/O error
        source: io::Error,
    },

    /// The cache index database could not be opened or queried.
    #[error("Cache index error: {0}")]
    Index(#[from] rusqlite::Error),

    /// Failed to write a tile blob file.
    #[error("Failed to write tile blob '{name}': {source}")]
    BlobWrite {
        /// Blob filename that failed to write
        name: String,
        /// Underlying I/O error
        source: io::Error,
    },
}
