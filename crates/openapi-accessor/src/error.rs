//! Error types for the OpenAPI accessor

use thiserror::Error;

/// Result type alias for accessor queries
pub type AccessResult<T> = std::result::Result<T, AccessError>;

/// Accessor error types
#[derive(Error, Debug)]
pub enum AccessError {
    #[error("Not found in OpenAPI document: {0}")]
    NotFound(String),

    #[error("Unexpected value at {path}: expected {expected}")]
    InvalidType { path: String, expected: &'static str },

    #[error("Invalid $ref pointer: {0}")]
    InvalidReference(String),

    #[error("HTTP error: {0}")]
    HttpError(String),

    #[error("JSON error: {0}")]
    JsonError(#[from] serde_json::Error),

    #[error("IO error: {0}")]
    IoError(#[from] std::io::Error),
}

impl AccessError {
    pub(crate) fn invalid_type(path: impl Into<String>, expected: &'static str) -> Self {
        AccessError::InvalidType {
            path: path.into(),
            expected,
        }
    }
}
