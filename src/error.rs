//! Error kinds surfaced by document generation and style storage.
//!
//! Storage misses are ordinary values (`ApiError::NotFound`) so callers can map
//! them to a missing-resource response without unwinding. `StorageIo` and
//! `Configuration` are fatal for the operation that produced them and are never
//! retried here.

use std::io;
use std::path::{Path, PathBuf};

/// Result alias used across the library surface.
pub type ApiResult<T> = Result<T, ApiError>;

#[derive(Debug, thiserror::Error)]
pub enum ApiError {
    #[error("not found: {0}")]
    NotFound(String),

    /// Raised only by a [`StylesAuthorizer`](crate::styles::StylesAuthorizer);
    /// nothing in generation or storage originates it.
    #[error("unauthorized")]
    Unauthorized,

    #[error("conflict: {0}")]
    Conflict(String),

    #[error("configuration error: {0}")]
    Configuration(String),

    #[error("storage I/O failure at {}: {source}", path.display())]
    StorageIo {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    #[error("malformed stored document at {}: {source}", path.display())]
    StorageFormat {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },
}

impl ApiError {
    pub fn not_found(what: impl Into<String>) -> Self {
        ApiError::NotFound(what.into())
    }

    pub fn configuration(message: impl Into<String>) -> Self {
        ApiError::Configuration(message.into())
    }

    pub(crate) fn io(path: &Path, source: io::Error) -> Self {
        ApiError::StorageIo {
            path: path.to_path_buf(),
            source,
        }
    }

    pub(crate) fn format(path: &Path, source: serde_json::Error) -> Self {
        ApiError::StorageFormat {
            path: path.to_path_buf(),
            source,
        }
    }

    /// True for misses that callers recover locally.
    pub fn is_not_found(&self) -> bool {
        matches!(self, ApiError::NotFound(_))
    }
}
