//! Error types for the eo-registry fetchers.

use thiserror::Error;

/// Result type alias using RegistryError.
pub type RegistryResult<T> = Result<T, RegistryError>;

/// Primary error type for parameter handling and shared setup.
#[derive(Debug, Error)]
pub enum RegistryError {
    // === Parameter Errors ===
    #[error("Missing parameter section: {0}")]
    MissingSection(String),

    #[error("Missing required parameter: {0}")]
    MissingParameter(String),

    #[error("Invalid parameter value for '{param}': {message}")]
    InvalidParameter { param: String, message: String },

    #[error("Environment variable substitution failed: {0}")]
    EnvVar(String),

    // === File Errors ===
    #[error("Failed to read {path}: {message}")]
    ReadError { path: String, message: String },

    #[error("Failed to parse {path}: {message}")]
    ParseError { path: String, message: String },

    // === Infrastructure Errors ===
    #[error("Internal error: {0}")]
    InternalError(String),
}

impl RegistryError {
    /// Shorthand for an invalid parameter error.
    pub fn invalid(param: impl Into<String>, message: impl Into<String>) -> Self {
        RegistryError::InvalidParameter {
            param: param.into(),
            message: message.into(),
        }
    }
}

impl From<std::io::Error> for RegistryError {
    fn from(err: std::io::Error) -> Self {
        RegistryError::InternalError(err.to_string())
    }
}

impl From<serde_yaml::Error> for RegistryError {
    fn from(err: serde_yaml::Error) -> Self {
        RegistryError::InternalError(format!("YAML error: {}", err))
    }
}
