//! Error types for STASH.

use thiserror::Error;

/// Common error type for STASH.
#[derive(Error, Debug)]
pub enum StashError {
    /// Upload payload was empty.
    #[error("cannot store an empty file")]
    EmptyInput,

    /// Upload payload exceeded the configured size limit.
    #[error("file size exceeds maximum allowed size of {0}")]
    TooLarge(String),

    /// Content type missing or not on the allow-list.
    #[error("file type not supported: {0}")]
    UnsupportedType(String),

    /// Filename or stored path contains a traversal sequence.
    #[error("invalid path sequence in {0}")]
    InvalidPath(String),

    /// Resource not found.
    #[error("{0} not found")]
    NotFound(String),

    /// I/O error from the blob store.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// Database error.
    ///
    /// This is a generic database error that wraps errors from the backing
    /// store. Errors from sqlx are automatically converted.
    #[error("database error: {0}")]
    Database(String),

    /// Configuration error.
    #[error("configuration error: {0}")]
    Config(String),
}

// Conversion from sqlx errors
impl From<sqlx::Error> for StashError {
    fn from(e: sqlx::Error) -> Self {
        StashError::Database(e.to_string())
    }
}

/// Result type alias for STASH operations.
pub type Result<T> = std::result::Result<T, StashError>;
