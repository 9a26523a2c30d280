use lambda_http::{Body, Request, Response};
use tracing::info;

use crate::config::Config;
use crate::error::ApiError;
use crate::handlers::{json_response, prefix_param};

/// Handle POST /export?prefix=
///
/// Zips every record under the prefix into the export bucket and returns
/// the archive's presigned URL. An empty prefix is a 404.
pub async fn handle_export(
    event: &Request,
    request_id: &str,
    config: &Config,
) -> Result<Response<Body>, ApiError> {
    let prefix = prefix_param(event);

    let archive = config
        .record_store
        .export_prefix_to_zip(&prefix, &config.export_prefix, &config.export_bucket)
        .await?
        .ok_or_else(|| ApiError::NoRecords(prefix.clone()))?;

    info!(
        request_id = %request_id,
        prefix = %prefix,
        export_key = %archive.key,
        object_count = archive.object_count,
        "Export ready"
    );

    json_response(&archive)
}
