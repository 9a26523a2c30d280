use std::sync::Arc;
use std::time::Duration;

use energy_datalake::{
    ObjectStore, RecordStore, S3ObjectStore, SummaryReport, DEFAULT_ALERT_WINDOW_PERIODS,
    DEFAULT_EXPORT_URL_TTL, DEFAULT_LIST_LIMIT,
};

pub const DEFAULT_EXPORT_PREFIX: &str = "exports";

/// Configuration for the records API
#[derive(Debug, Clone)]
pub struct Config {
    /// Store over the records bucket
    pub record_store: RecordStore,
    /// Summary calculator with the configured alert window
    pub summary: SummaryReport,
    /// Destination bucket for zip exports
    pub export_bucket: String,
    /// Key prefix for zip exports
    pub export_prefix: String,
    /// Records loaded for /alerts and /summary
    pub list_limit: usize,
}

/// Settings read from the environment, independent of the storage client
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Settings {
    pub records_bucket: String,
    pub export_bucket: String,
    pub export_prefix: String,
    pub list_limit: usize,
    pub alert_window: u64,
    pub export_url_ttl: Duration,
}

impl Settings {
    /// Read settings through `lookup`, which returns a variable's value if set
    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let required = |name: &str| {
            lookup(name).ok_or_else(|| ConfigError::MissingEnvVar(name.to_string()))
        };

        let records_bucket = required("RECORDS_BUCKET")?;
        let export_bucket = required("EXPORT_BUCKET")?;
        let export_prefix =
            lookup("EXPORT_PREFIX").unwrap_or_else(|| DEFAULT_EXPORT_PREFIX.to_string());

        let list_limit = parse_number(&lookup, "LIST_LIMIT", DEFAULT_LIST_LIMIT as u64)? as usize;
        if list_limit == 0 {
            return Err(ConfigError::InvalidValue(
                "LIST_LIMIT".to_string(),
                "must be at least 1".to_string(),
            ));
        }

        let alert_window =
            parse_number(&lookup, "ALERT_WINDOW_PERIODS", DEFAULT_ALERT_WINDOW_PERIODS)?;
        let ttl_secs = parse_number(
            &lookup,
            "EXPORT_URL_TTL_SECONDS",
            DEFAULT_EXPORT_URL_TTL.as_secs(),
        )?;

        Ok(Settings {
            records_bucket,
            export_bucket,
            export_prefix,
            list_limit,
            alert_window,
            export_url_ttl: Duration::from_secs(ttl_secs),
        })
    }
}

fn parse_number<F>(lookup: &F, name: &str, default: u64) -> Result<u64, ConfigError>
where
    F: Fn(&str) -> Option<String>,
{
    match lookup(name) {
        None => Ok(default),
        Some(raw) => raw.trim().parse().map_err(|_| {
            ConfigError::InvalidValue(name.to_string(), format!("'{}' is not a number", raw))
        }),
    }
}

impl Config {
    /// Create a new Config instance from environment variables
    pub async fn from_env() -> Result<Self, ConfigError> {
        let settings = Settings::from_lookup(|name| std::env::var(name).ok())?;

        // Timeouts and retries stay at the SDK defaults
        let store = S3ObjectStore::from_env().await;

        Ok(Self::with_store(Arc::new(store), settings))
    }

    /// Build the configuration around any object store
    pub fn with_store(store: Arc<dyn ObjectStore>, settings: Settings) -> Self {
        let record_store =
            RecordStore::new(store, settings.records_bucket).with_url_ttl(settings.export_url_ttl);

        Config {
            record_store,
            summary: SummaryReport::with_window(settings.alert_window),
            export_bucket: settings.export_bucket,
            export_prefix: settings.export_prefix,
            list_limit: settings.list_limit,
        }
    }
}

/// Configuration errors
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("Missing required environment variable: {0}")]
    MissingEnvVar(String),

    #[error("Invalid value for environment variable {0}: {1}")]
    InvalidValue(String, String),
}
