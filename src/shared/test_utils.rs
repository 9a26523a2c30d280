//! Test utilities for property-based testing
//!
//! Generators for device ids, period numbers and complete records, built
//! with the proptest framework.

pub mod generators {
    use proptest::prelude::*;

    use crate::domain::Record;

    /// Generate a device id like `dev-042`
    pub fn device_id() -> impl Strategy<Value = String> {
        prop::string::string_regex("dev-[0-9]{3}").expect("Valid regex for device_id")
    }

    /// Generate a period number, including ones wider than six digits
    pub fn period_no() -> impl Strategy<Value = u64> {
        prop_oneof![
            8 => 0u64..1_000_000,
            1 => 1_000_000u64..100_000_000,
        ]
    }

    /// Generate an alert flag: absent, false, or true
    pub fn alert_flag() -> impl Strategy<Value = Option<bool>> {
        prop::option::of(any::<bool>())
    }

    /// Generate a record with the identifying fields and a reading value
    pub fn record() -> impl Strategy<Value = Record> {
        (device_id(), period_no(), alert_flag(), 0.0f64..10_000.0).prop_map(
            |(device_id, period_no, alert, kwh)| {
                let record = Record::new()
                    .with("device_id", device_id)
                    .with("period_no", period_no)
                    .with("kwh", kwh);
                match alert {
                    Some(flag) => record.with("alert_flag", flag),
                    None => record,
                }
            },
        )
    }

    /// Generate a batch of records
    pub fn record_batch(size: std::ops::Range<usize>) -> impl Strategy<Value = Vec<Record>> {
        prop::collection::vec(record(), size)
    }
}

pub mod helpers {
    /// Check a key against `raw/YYYY/MM/DD/device_id=<id>/period_no=<nnnnnn>.json`
    pub fn is_record_key(key: &str) -> bool {
        let parts: Vec<&str> = key.split('/').collect();
        if parts.len() != 6 || parts[0] != "raw" {
            return false;
        }

        let all_digits = |s: &str, len: usize| s.len() == len && s.chars().all(|c| c.is_ascii_digit());
        if !all_digits(parts[1], 4) || !all_digits(parts[2], 2) || !all_digits(parts[3], 2) {
            return false;
        }

        let device_ok = parts[4]
            .strip_prefix("device_id=")
            .is_some_and(|id| !id.is_empty());

        let period_ok = parts[5]
            .strip_prefix("period_no=")
            .and_then(|rest| rest.strip_suffix(".json"))
            .is_some_and(|digits| digits.len() >= 6 && digits.chars().all(|c| c.is_ascii_digit()));

        device_ok && period_ok
    }
}
