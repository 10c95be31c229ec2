//! Error types for storage and transfer operations.

use thiserror::Error;

/// Result type alias using StorageError.
pub type StorageResult<T> = Result<T, StorageError>;

#[derive(Debug, Error)]
pub enum StorageError {
    #[error("Object store error: {0}")]
    ObjectStore(String),

    #[error("Object not found: {0}")]
    NotFound(String),

    #[error("Access denied to bucket {0}, or the name is already taken")]
    Forbidden(String),

    #[error("Authentication failed: {0}")]
    Auth(String),

    #[error("HTTP error: {0}")]
    Http(String),

    #[error("HTTP status {status} from {url}")]
    Status { status: u16, url: String },

    #[error("Download failed after {attempts} attempts: {message}")]
    RetriesExhausted { attempts: u32, message: String },

    #[error("Download size mismatch: expected {expected} bytes, got {actual}")]
    SizeMismatch { expected: u64, actual: u64 },

    #[error("Archive error: {0}")]
    Archive(String),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

impl StorageError {
    /// Client errors other than timeouts and throttling will not succeed on retry.
    pub fn is_permanent(&self) -> bool {
        match self {
            StorageError::Status { status, .. } => {
                (400..500).contains(status) && *status != 408 && *status != 429
            }
            StorageError::Forbidden(_) | StorageError::NotFound(_) => true,
            _ => false,
        }
    }
}

impl From<object_store::Error> for StorageError {
    fn from(err: object_store::Error) -> Self {
        match err {
            object_store::Error::NotFound { path, .. } => StorageError::NotFound(path),
            other => StorageError::ObjectStore(other.to_string()),
        }
    }
}

impl From<reqwest::Error> for StorageError {
    fn from(err: reqwest::Error) -> Self {
        StorageError::Http(err.to_string())
    }
}

impl From<zip::result::ZipError> for StorageError {
    fn from(err: zip::result::ZipError) -> Self {
        StorageError::Archive(err.to_string())
    }
}
