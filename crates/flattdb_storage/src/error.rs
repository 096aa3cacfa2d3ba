//! Error types for storage operations.

use std::io;
use std::path::PathBuf;
use thiserror::Error;

/// Result type for storage operations.
pub type StorageResult<T> = Result<T, StorageError>;

/// Errors that can occur during storage operations.
#[derive(Debug, Error)]
pub enum StorageError {
    /// An I/O error occurred.
    #[error("I/O error: {0}")]
    Io(#[from] io::Error),

    /// The requested resource or directory does not exist.
    #[error("resource not found: {}", path.display())]
    NotFound {
        /// Path relative to the backend root.
        path: PathBuf,
    },

    /// The path escapes the backend root or is otherwise unusable.
    #[error("invalid resource path: {}", path.display())]
    InvalidPath {
        /// The offending path.
        path: PathBuf,
    },
}

impl StorageError {
    /// Creates a not found error.
    pub fn not_found(path: impl Into<PathBuf>) -> Self {
        Self::NotFound { path: path.into() }
    }

    /// Returns true if this error reports a missing resource.
    #[must_use]
    pub fn is_not_found(&self) -> bool {
        matches!(self, Self::NotFound { .. })
    }
}
