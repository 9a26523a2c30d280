use lambda_http::{Body, Response};
use thiserror::Error;

use energy_datalake::error::{error_codes, DataLakeError, ErrorResponse, StorageError};
use energy_datalake::ValidationError;

/// Main error type for the records API
#[derive(Debug, Error)]
pub enum ApiError {
    #[error("Validation error: {0}")]
    Validation(#[from] ValidationError),

    #[error("Invalid query parameter {name}: {message}")]
    InvalidQuery { name: String, message: String },

    #[error("Storage error: {0}")]
    Storage(#[from] StorageError),

    /// A record already in the bucket lacks a usable identifier
    #[error("Invalid stored record: {0}")]
    InvalidStoredRecord(ValidationError),

    #[error("No records under prefix {0}")]
    NoRecords(String),

    #[error("Route not found: {0}")]
    NotFound(String),

    #[error("Internal error: {0}")]
    Internal(String),
}

impl From<DataLakeError> for ApiError {
    fn from(err: DataLakeError) -> Self {
        match err {
            DataLakeError::Validation(e) => ApiError::Validation(e),
            DataLakeError::Storage(e) => ApiError::Storage(e),
            DataLakeError::Serialization(e) => ApiError::Internal(e.to_string()),
        }
    }
}

impl ApiError {
    pub fn invalid_query(name: impl Into<String>, message: impl Into<String>) -> Self {
        ApiError::InvalidQuery {
            name: name.into(),
            message: message.into(),
        }
    }

    pub fn status(&self) -> u16 {
        match self {
            ApiError::Validation(_) | ApiError::InvalidQuery { .. } => 400,
            ApiError::NoRecords(_) | ApiError::NotFound(_) => 404,
            ApiError::Storage(_) => 502,
            ApiError::InvalidStoredRecord(_) | ApiError::Internal(_) => 500,
        }
    }

    /// Convert error to HTTP response with appropriate status code and error payload
    pub fn to_http_response(&self, request_id: &str) -> Response<Body> {
        let (error_code, message): (&str, String) = match self {
            ApiError::Validation(ValidationError::MissingField(field)) => (
                error_codes::MISSING_FIELD,
                format!("Required field missing: {}", field),
            ),
            ApiError::Validation(err @ ValidationError::InvalidValue { .. }) => {
                (error_codes::INVALID_VALUE, err.to_string())
            }
            ApiError::InvalidQuery { .. } => (error_codes::INVALID_QUERY, self.to_string()),
            ApiError::NoRecords(prefix) => (
                error_codes::NO_RECORDS,
                format!("No records found under prefix {}", prefix),
            ),
            ApiError::NotFound(path) => (
                error_codes::NOT_FOUND,
                format!("No route for {}", path),
            ),
            // Backend details are logged, never returned
            ApiError::Storage(_) => (
                error_codes::STORAGE_ERROR,
                "Object storage request failed".to_string(),
            ),
            ApiError::InvalidStoredRecord(err) => (
                error_codes::INVALID_STORED_RECORD,
                format!("A stored record has an invalid {}", err.field()),
            ),
            ApiError::Internal(_) => (
                error_codes::INTERNAL_ERROR,
                "Internal server error occurred".to_string(),
            ),
        };

        let error_response = ErrorResponse::new(error_code, &message, request_id);

        let body = error_response
            .to_json()
            .unwrap_or_else(|_| r#"{"error":"INTERNAL_ERROR","message":"Failed to serialize error response","request_id":""}"#.to_string());

        Response::builder()
            .status(self.status())
            .header("content-type", "application/json")
            .body(Body::from(body))
            .unwrap_or_else(|_| {
                let mut response = Response::new(Body::from(
                    r#"{"error":"INTERNAL_ERROR","message":"Failed to build response"}"#,
                ));
                *response.status_mut() = lambda_http::http::StatusCode::INTERNAL_SERVER_ERROR;
                response
            })
    }
}
