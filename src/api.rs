// Records API binary entry point

mod config;
mod error;
mod handlers;
mod router;

use lambda_http::{run, service_fn, Body, Error, Request, RequestExt, Response};
use tracing::{error, info};

use config::Config;
use router::route_request;

async fn function_handler(event: Request) -> Result<Response<Body>, Error> {
    let request_id = event.lambda_context().request_id.clone();

    info!(
        request_id = %request_id,
        method = %event.method(),
        path = %event.uri().path(),
        "Records API Lambda invoked"
    );

    // Health checks answer without configuration
    if event.method() == lambda_http::http::Method::GET
        && (event.uri().path() == "/health" || event.uri().path() == "/health/")
    {
        return match router::route_request_health(&request_id) {
            Ok(response) => Ok(response),
            Err(api_error) => {
                error!(request_id = %request_id, error = %api_error, "Health check failed");
                Ok(api_error.to_http_response(&request_id))
            }
        };
    }

    let config = match Config::from_env().await {
        Ok(config) => config,
        Err(e) => {
            error!(
                request_id = %request_id,
                error = %e,
                "Failed to load configuration"
            );
            return Ok(
                error::ApiError::Internal(format!("Configuration error: {}", e))
                    .to_http_response(&request_id),
            );
        }
    };

    Ok(handle_with_config(event, &request_id, &config).await)
}

async fn handle_with_config(event: Request, request_id: &str, config: &Config) -> Response<Body> {
    match route_request(event, request_id, config).await {
        Ok(response) => {
            info!(
                request_id = %request_id,
                status = %response.status(),
                "Request completed successfully"
            );
            response
        }
        Err(api_error) => {
            error!(
                request_id = %request_id,
                error = %api_error,
                "Request failed"
            );
            api_error.to_http_response(request_id)
        }
    }
}

#[tokio::main]
async fn main() -> Result<(), Error> {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::from_default_env()
                .add_directive(tracing::Level::INFO.into()),
        )
        .with_target(false)
        .without_time()
        .init();

    info!("Records API Lambda starting");

    run(service_fn(function_handler)).await
}
