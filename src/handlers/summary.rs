use lambda_http::{Body, Request, Response};
use tracing::{error, info};

use crate::config::Config;
use crate::error::ApiError;
use crate::handlers::{json_response, prefix_param};

/// Handle GET /summary?prefix=
///
/// Summarizes the latest `LIST_LIMIT` records under the prefix; the limit is
/// what bounds the batch held in memory.
pub async fn handle_summary(
    event: &Request,
    request_id: &str,
    config: &Config,
) -> Result<Response<Body>, ApiError> {
    let prefix = prefix_param(event);

    let listed = config
        .record_store
        .list_latest_details(&prefix, config.list_limit)
        .await?;

    // Records come from the bucket; an unusable one is a server-side fault
    let result = config.summary.summarize(&listed.records).map_err(|e| {
        error!(
            request_id = %request_id,
            prefix = %prefix,
            field = %e.field(),
            "Stored record cannot be summarized"
        );
        ApiError::InvalidStoredRecord(e)
    })?;

    info!(
        request_id = %request_id,
        prefix = %prefix,
        total_records = result.total_records,
        device_count = result.device_count,
        alerts_total = result.alerts_total,
        "Summary computed"
    );

    json_response(&result)
}
