use lambda_http::{Body, Request, Response};
use serde::Serialize;
use tracing::info;

use crate::config::Config;
use crate::error::ApiError;
use crate::handlers::{json_response, limit_param, prefix_param};
use energy_datalake::Record;

/// Response payload for GET /alerts
#[derive(Debug, Serialize)]
pub struct AlertsResponse {
    /// Latest records, newest first, each with its `s3_key`
    pub items: Vec<Record>,
    pub count: usize,
    /// Objects under the prefix that were not JSON records
    pub skipped: usize,
}

/// Handle GET /alerts?prefix=&limit=
pub async fn handle_alerts(
    event: &Request,
    request_id: &str,
    config: &Config,
) -> Result<Response<Body>, ApiError> {
    let prefix = prefix_param(event);
    let limit = limit_param(event, config.list_limit)?;

    let listed = config
        .record_store
        .list_latest_details(&prefix, limit)
        .await?;

    info!(
        request_id = %request_id,
        prefix = %prefix,
        limit = limit,
        count = listed.records.len(),
        skipped = listed.skipped,
        "Returning latest records"
    );

    json_response(&AlertsResponse {
        count: listed.records.len(),
        skipped: listed.skipped,
        items: listed.records,
    })
}
