use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use std::time::Duration;

use crate::error::ValidationError;

pub const DEVICE_ID_FIELD: &str = "device_id";
pub const PERIOD_NO_FIELD: &str = "period_no";
pub const ALERT_FLAG_FIELD: &str = "alert_flag";
/// Field injected into listed records naming the object they were read from
pub const S3_KEY_FIELD: &str = "s3_key";

/// Electricity reading record
///
/// A flat JSON object. Only `device_id`, `period_no` and `alert_flag` have
/// meaning here; every other field is carried through untouched and in its
/// original order.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Record(Map<String, Value>);

impl Record {
    pub fn new() -> Self {
        Self(Map::new())
    }

    /// Wrap a JSON value, which must be an object
    pub fn from_value(value: Value) -> Option<Self> {
        match value {
            Value::Object(map) => Some(Self(map)),
            _ => None,
        }
    }

    /// Builder-style field insertion
    pub fn with(mut self, field: impl Into<String>, value: impl Into<Value>) -> Self {
        self.0.insert(field.into(), value.into());
        self
    }

    pub fn insert(&mut self, field: impl Into<String>, value: impl Into<Value>) -> Option<Value> {
        self.0.insert(field.into(), value.into())
    }

    pub fn get(&self, field: &str) -> Option<&Value> {
        self.0.get(field)
    }

    pub fn remove(&mut self, field: &str) -> Option<Value> {
        self.0.remove(field)
    }

    /// Device identifier, which must be a non-empty string
    ///
    /// An empty id would produce a `device_id=/` partition segment that no
    /// device owns, so it is rejected as `InvalidValue` like a non-string.
    pub fn device_id(&self) -> Result<&str, ValidationError> {
        match self.0.get(DEVICE_ID_FIELD) {
            None | Some(Value::Null) => Err(ValidationError::missing(DEVICE_ID_FIELD)),
            Some(Value::String(id)) if !id.is_empty() => Ok(id.as_str()),
            Some(Value::String(_)) => Err(ValidationError::invalid(
                DEVICE_ID_FIELD,
                "must not be empty",
            )),
            Some(_) => Err(ValidationError::invalid(DEVICE_ID_FIELD, "must be a string")),
        }
    }

    /// Period number coerced to an integer
    ///
    /// Accepts unsigned JSON integers, floats without a fractional part, and
    /// strings holding a decimal integer.
    pub fn period_no(&self) -> Result<u64, ValidationError> {
        let value = match self.0.get(PERIOD_NO_FIELD) {
            None | Some(Value::Null) => return Err(ValidationError::missing(PERIOD_NO_FIELD)),
            Some(value) => value,
        };

        coerce_period(value).ok_or_else(|| {
            ValidationError::invalid(PERIOD_NO_FIELD, "must be a non-negative integer")
        })
    }

    /// True only when `alert_flag` is the JSON boolean `true`
    pub fn is_alert(&self) -> bool {
        matches!(self.0.get(ALERT_FLAG_FIELD), Some(Value::Bool(true)))
    }

    pub fn s3_key(&self) -> Option<&str> {
        self.0.get(S3_KEY_FIELD).and_then(Value::as_str)
    }

    /// Compact JSON with non-ASCII characters left unescaped
    pub fn to_compact_json(&self) -> Result<String, serde_json::Error> {
        serde_json::to_string(&self.0)
    }
}

impl From<Map<String, Value>> for Record {
    fn from(map: Map<String, Value>) -> Self {
        Self(map)
    }
}

fn coerce_period(value: &Value) -> Option<u64> {
    match value {
        Value::Number(n) => {
            if let Some(v) = n.as_u64() {
                return Some(v);
            }
            let f = n.as_f64()?;
            if f.is_finite() && f >= 0.0 && f.fract() == 0.0 && f <= u64::MAX as f64 {
                Some(f as u64)
            } else {
                None
            }
        }
        Value::String(s) => {
            let trimmed = s.trim();
            let digits = trimmed.strip_prefix('+').unwrap_or(trimmed);
            if digits.is_empty() || !digits.chars().all(|c| c.is_ascii_digit()) {
                return None;
            }
            digits.parse().ok()
        }
        _ => None,
    }
}

/// Listing entry for one stored object
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StoredObject {
    pub key: String,
    pub last_modified: DateTime<Utc>,
    pub size_bytes: u64,
}

/// Records decoded by a listing call
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct ListedRecords {
    pub records: Vec<Record>,
    /// Objects dropped because their body was not a JSON object
    pub skipped: usize,
}

/// A published zip export
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ExportArchive {
    pub bucket: String,
    pub key: String,
    pub url: String,
    pub object_count: usize,
    #[serde(serialize_with = "serialize_secs")]
    pub expires_in: Duration,
}

fn serialize_secs<S: serde::Serializer>(d: &Duration, s: S) -> Result<S::Ok, S::Error> {
    s.serialize_u64(d.as_secs())
}
