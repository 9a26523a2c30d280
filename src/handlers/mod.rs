pub mod alerts;
pub mod export;
pub mod summary;

use lambda_http::{Body, Request, RequestExt, Response};
use serde::Serialize;

use crate::error::ApiError;
use energy_datalake::DEFAULT_LIST_PREFIX;

/// Upper bound for the `limit` query parameter
pub const MAX_LIST_LIMIT: usize = 1000;

/// `prefix` query parameter, defaulting to the raw records prefix
pub fn prefix_param(event: &Request) -> String {
    event
        .query_string_parameters()
        .first("prefix")
        .map(str::to_string)
        .unwrap_or_else(|| DEFAULT_LIST_PREFIX.to_string())
}

/// `limit` query parameter: at least 1, capped at [`MAX_LIST_LIMIT`]
pub fn limit_param(event: &Request, default: usize) -> Result<usize, ApiError> {
    let params = event.query_string_parameters();
    let Some(raw) = params.first("limit") else {
        return Ok(default.min(MAX_LIST_LIMIT));
    };

    let limit: usize = raw
        .parse()
        .map_err(|_| ApiError::invalid_query("limit", format!("'{}' is not an integer", raw)))?;

    if limit < 1 {
        return Err(ApiError::invalid_query("limit", "must be at least 1"));
    }

    Ok(limit.min(MAX_LIST_LIMIT))
}

/// 200 response with a JSON body
pub fn json_response<T: Serialize>(payload: &T) -> Result<Response<Body>, ApiError> {
    let body = serde_json::to_string(payload)
        .map_err(|e| ApiError::Internal(format!("Failed to serialize response: {}", e)))?;

    Response::builder()
        .status(200)
        .header("content-type", "application/json")
        .body(Body::from(body))
        .map_err(|e| ApiError::Internal(format!("Failed to build response: {}", e)))
}
