//! Crate-wide error type.
//!
//! Stores return [`Result`] and propagate with `?`. The HTTP layer maps each
//! variant to a status code, the CLI prints it and exits non-zero.

use thiserror::Error;

pub type Result<T> = std::result::Result<T, Error>;

#[derive(Debug, Error)]
pub enum Error {
    /// Bad input from the caller (maps to 400).
    #[error("{0}")]
    Validation(String),

    /// Entity lookup failed (maps to 404).
    #[error("{0}")]
    NotFound(String),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

impl Error {
    pub fn validation(msg: impl Into<String>) -> Self {
        Error::Validation(msg.into())
    }

    pub fn not_found(msg: impl Into<String>) -> Self {
        Error::NotFound(msg.into())
    }
}
