use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Validation errors raised before any storage I/O happens
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ValidationError {
    #[error("Required field missing: {0}")]
    MissingField(String),

    #[error("Invalid value for field '{field}': {message}")]
    InvalidValue { field: String, message: String },
}

impl ValidationError {
    pub fn missing(field: impl Into<String>) -> Self {
        ValidationError::MissingField(field.into())
    }

    pub fn invalid(field: impl Into<String>, message: impl Into<String>) -> Self {
        ValidationError::InvalidValue {
            field: field.into(),
            message: message.into(),
        }
    }

    /// Name of the offending field
    pub fn field(&self) -> &str {
        match self {
            ValidationError::MissingField(field) => field,
            ValidationError::InvalidValue { field, .. } => field,
        }
    }
}

/// Failures from the backing object store or the local scratch space
#[derive(Debug, Error)]
pub enum StorageError {
    #[error("{operation} failed: {message}")]
    Backend {
        operation: &'static str,
        message: String,
    },

    #[error("Object not found: {bucket}/{key}")]
    NotFound { bucket: String, key: String },

    #[error("Scratch I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Archive error: {0}")]
    Archive(#[from] zip::result::ZipError),

    #[error("Presign error: {0}")]
    Presign(String),
}

impl StorageError {
    pub fn backend(operation: &'static str, err: impl std::fmt::Debug) -> Self {
        StorageError::Backend {
            operation,
            message: format!("{:?}", err),
        }
    }
}

/// Error returned by data lake operations
#[derive(Debug, Error)]
pub enum DataLakeError {
    #[error("Validation error: {0}")]
    Validation(#[from] ValidationError),

    #[error("Storage error: {0}")]
    Storage(#[from] StorageError),

    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),
}

/// Standard error response payload
/// Contains stable machine-readable error code, human-readable message, and request ID
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ErrorResponse {
    /// Stable machine-readable error code (e.g., "MISSING_FIELD", "NO_RECORDS")
    pub error: String,

    /// Human-readable error message
    pub message: String,

    /// Request ID for tracing and debugging
    pub request_id: String,
}

impl ErrorResponse {
    pub fn new(
        error: impl Into<String>,
        message: impl Into<String>,
        request_id: impl Into<String>,
    ) -> Self {
        Self {
            error: error.into(),
            message: message.into(),
            request_id: request_id.into(),
        }
    }

    pub fn to_json(&self) -> Result<String, serde_json::Error> {
        serde_json::to_string(self)
    }
}

/// Common error codes used across the API
pub mod error_codes {
    // Validation errors
    pub const MISSING_FIELD: &str = "MISSING_FIELD";
    pub const INVALID_VALUE: &str = "INVALID_VALUE";
    pub const INVALID_QUERY: &str = "INVALID_QUERY";

    // Not found errors
    pub const NO_RECORDS: &str = "NO_RECORDS";
    pub const NOT_FOUND: &str = "NOT_FOUND";

    // Storage errors
    pub const STORAGE_ERROR: &str = "STORAGE_ERROR";
    pub const INVALID_STORED_RECORD: &str = "INVALID_STORED_RECORD";

    // Internal errors
    pub const INTERNAL_ERROR: &str = "INTERNAL_ERROR";
}
