//! Error types for Earth Engine operations.

use registry_common::RegistryError;
use storage::StorageError;
use thiserror::Error;

/// Result type alias using EeError.
pub type EeResult<T> = Result<T, EeError>;

#[derive(Debug, Error)]
pub enum EeError {
    /// The API answered with an error payload.
    #[error("Earth Engine API error {code} ({status}): {message}")]
    Api {
        code: u16,
        status: String,
        message: String,
    },

    #[error("HTTP error: {0}")]
    Http(String),

    #[error("Unexpected response: {0}")]
    UnexpectedResponse(String),

    #[error("Invalid export: {0}")]
    InvalidExport(String),

    #[error(transparent)]
    Storage(#[from] StorageError),

    #[error(transparent)]
    Config(#[from] RegistryError),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

impl From<reqwest::Error> for EeError {
    fn from(err: reqwest::Error) -> Self {
        EeError::Http(err.to_string())
    }
}

impl From<serde_json::Error> for EeError {
    fn from(err: serde_json::Error) -> Self {
        EeError::UnexpectedResponse(err.to_string())
    }
}
