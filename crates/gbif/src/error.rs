//! Error types for GBIF downloads.

use std::time::Duration;

use storage::StorageError;
use thiserror::Error;

use crate::status::DownloadStatus;

pub type GbifResult<T> = Result<T, GbifError>;

#[derive(Debug, Error)]
pub enum GbifError {
    /// The download job ended without producing a file.
    #[error("GBIF download {key} ended with status {status}")]
    DownloadFailed { key: String, status: DownloadStatus },

    #[error("GBIF download {key} not ready after {waited:?}")]
    Timeout { key: String, waited: Duration },

    #[error("Missing GBIF credential: set {0}")]
    MissingCredentials(&'static str),

    #[error("GBIF API returned {status}: {message}")]
    Api { status: u16, message: String },

    #[error("HTTP error: {0}")]
    Http(String),

    #[error("Invalid archive: {0}")]
    InvalidArchive(String),

    #[error(transparent)]
    Storage(#[from] StorageError),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

impl From<reqwest::Error> for GbifError {
    fn from(err: reqwest::Error) -> Self {
        GbifError::Http(err.to_string())
    }
}
