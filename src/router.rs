use lambda_http::http::Method;
use lambda_http::{Body, Request, Response};
use tracing::{info, warn};

use crate::config::Config;
use crate::error::ApiError;
use crate::handlers::alerts::handle_alerts;
use crate::handlers::export::handle_export;
use crate::handlers::summary::handle_summary;

/// Route a health check request (no config needed)
pub fn route_request_health(request_id: &str) -> Result<Response<Body>, ApiError> {
    handle_health(request_id)
}

/// Route an incoming request to the appropriate handler
///
/// Paths are normalized (trailing slashes removed) before matching on
/// (method, path); unknown routes return 404.
pub async fn route_request(
    event: Request,
    request_id: &str,
    config: &Config,
) -> Result<Response<Body>, ApiError> {
    let method = event.method().clone();
    let path = normalize_path(event.uri().path());

    info!(
        request_id = %request_id,
        method = %method,
        path = %path,
        "Routing request"
    );

    match (&method, path.as_str()) {
        (&Method::GET, "/health") => handle_health(request_id),

        // Latest records, newest first
        (&Method::GET, "/alerts") => handle_alerts(&event, request_id, config).await,

        // Overview counters over the latest records
        (&Method::GET, "/summary") => handle_summary(&event, request_id, config).await,

        // Zip export with a presigned download link
        (&Method::POST, "/export") => handle_export(&event, request_id, config).await,

        _ => {
            warn!(
                request_id = %request_id,
                method = %method,
                path = %path,
                "Unknown route"
            );
            Err(ApiError::NotFound(format!("{} {}", method, path)))
        }
    }
}

/// Normalize a path by removing trailing slashes
///
/// The root path "/" is preserved as-is.
fn normalize_path(path: &str) -> String {
    if path == "/" {
        return path.to_string();
    }

    path.trim_end_matches('/').to_string()
}

fn handle_health(request_id: &str) -> Result<Response<Body>, ApiError> {
    let body = serde_json::json!({
        "status": "healthy",
        "service": "energy-records-api",
        "request_id": request_id
    });

    Response::builder()
        .status(200)
        .header("content-type", "application/json")
        .body(Body::from(body.to_string()))
        .map_err(|e| ApiError::Internal(format!("Failed to build response: {}", e)))
}
