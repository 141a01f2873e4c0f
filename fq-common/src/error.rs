//! Common error types for fabquote

use thiserror::Error;

/// Common result type for fabquote operations
pub type Result<T> = std::result::Result<T, Error>;

/// Error taxonomy shared by the server, the client and the storage adapters
#[derive(Error, Debug)]
pub enum Error {
    /// Malformed or missing configuration fields; the request is rejected
    #[error("Validation error: {0}")]
    Validation(String),

    /// Unknown material, thickness or order id
    #[error("Not found: {0}")]
    NotFound(String),

    /// Network or storage unavailable during an authoritative evaluation.
    /// Recovered locally by the quote session, never shown to the customer.
    #[error("Transient error: {0}")]
    Transient(String),

    /// Persistence failure during order or parameter writes (wraps sqlx::Error)
    #[cfg(feature = "sqlx")]
    #[error("Storage error: {0}")]
    Storage(#[from] sqlx::Error),

    /// I/O operation error (wraps std::io::Error)
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// Configuration loading or validation error
    #[error("Configuration error: {0}")]
    Config(String),

    /// Internal error
    #[error("Internal error: {0}")]
    Internal(String),
}

impl Error {
    /// True for failures the quote session should absorb by falling back
    /// to its local evaluation
    pub fn is_transient(&self) -> bool {
        matches!(self, Error::Transient(_))
    }
}

impl From<serde_json::Error> for Error {
    fn from(e: serde_json::Error) -> Self {
        Error::Internal(format!("JSON error: {}", e))
    }
}
