//! Store and export error types.

use std::path::PathBuf;

use crate::config::ConfigError;

/// Errors from a claim repository.
#[derive(Debug, thiserror::Error)]
pub enum StoreError {
    /// Filesystem failure.
    #[error("io error on {}: {source}", .path.display())]
    Io {
        path: PathBuf,
        source: std::io::Error,
    },
    /// A stored line is not a valid claim record.
    #[error("invalid claim record at {}:{line}: {source}", .path.display())]
    Parse {
        path: PathBuf,
        line: usize,
        source: serde_json::Error,
    },
    /// A claim could not be serialized.
    #[error("failed to serialize claim {index}: {source}")]
    Serialize {
        index: u64,
        source: serde_json::Error,
    },
    /// SQLite failure.
    #[error("database error on {}: {source}", .path.display())]
    Database {
        path: PathBuf,
        source: sqlx::Error,
    },
    /// A stored row does not decode to a claim record.
    #[error("invalid claim row {id} in {}: {reason}", .path.display())]
    Corrupt {
        path: PathBuf,
        id: i64,
        reason: String,
    },
    /// A claim index does not fit the store's key column.
    #[error("claim index {index} is out of range for the store")]
    IndexOutOfRange { index: u64 },
}

impl StoreError {
    pub(crate) fn io(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        Self::Io {
            path: path.into(),
            source,
        }
    }

    pub(crate) fn database(path: impl Into<PathBuf>, source: sqlx::Error) -> Self {
        Self::Database {
            path: path.into(),
            source,
        }
    }
}

/// Errors from a key-value export.
#[derive(Debug, thiserror::Error)]
pub enum ExportError {
    /// HTTP transport error.
    #[error("HTTP error calling {endpoint}: {source}")]
    Http {
        endpoint: String,
        source: reqwest::Error,
    },
    /// The service returned a non-2xx status.
    #[error("{endpoint} returned {status}: {body}")]
    Api {
        endpoint: String,
        status: u16,
        body: String,
    },
    /// The service answered 2xx but reported `success: false`.
    #[error("{endpoint} rejected the batch: {errors}")]
    Rejected { endpoint: String, errors: String },
    /// Configuration error.
    #[error("configuration error: {0}")]
    Config(#[from] ConfigError),
    /// A claim could not be encoded as a key-value pair.
    #[error("failed to encode claim: {0}")]
    Encode(#[from] serde_json::Error),
}
