//! Property Test: Partition key format
//!
//! This property test verifies that:
//! - Keys for valid records follow `raw/YYYY/MM/DD/device_id=<id>/period_no=<n>.json`
//! - Period numbers are zero-padded to at least six digits
//! - Records missing identifiers are rejected before any key is produced

use chrono::{DateTime, Datelike, TimeZone, Utc};
use energy_datalake::test_utils::{generators, helpers};
use energy_datalake::{build_record_key, Record, ValidationError};
use proptest::prelude::*;

fn date() -> impl Strategy<Value = DateTime<Utc>> {
    // 2000-01-01 to 2099-12-31
    (946684800i64..4102358400i64).prop_map(|secs| Utc.timestamp_opt(secs, 0).unwrap())
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(200))]

    /// Property: the key is fully determined by date, device and period
    #[test]
    fn prop_key_matches_pattern(
        id in generators::device_id(),
        period in generators::period_no(),
        when in date()
    ) {
        let record = Record::new().with("device_id", id.clone()).with("period_no", period);
        let key = build_record_key(&record, when).unwrap();
        prop_assert!(helpers::is_record_key(&key), "unexpected key shape: {}", key);

        let expected = format!(
            "raw/{:04}/{:02}/{:02}/device_id={}/period_no={:06}.json",
            when.year(), when.month(), when.day(), id, period
        );
        prop_assert_eq!(&key, &expected);

        let digits = key
            .rsplit("period_no=")
            .next()
            .and_then(|s| s.strip_suffix(".json"))
            .unwrap();
        prop_assert!(digits.len() >= 6);
        prop_assert_eq!(digits.parse::<u64>().unwrap(), period);
    }

    /// Property: a numeric string period gives the same key as the number
    #[test]
    fn prop_string_period_equivalent(
        id in generators::device_id(),
        period in generators::period_no(),
        when in date()
    ) {
        let numeric = Record::new().with("device_id", id.clone()).with("period_no", period);
        let textual = Record::new().with("device_id", id).with("period_no", period.to_string());

        prop_assert_eq!(
            build_record_key(&numeric, when).unwrap(),
            build_record_key(&textual, when).unwrap()
        );
    }

    /// Property: every generated record gets a well-formed key
    #[test]
    fn prop_generated_records_get_keys(record in generators::record(), when in date()) {
        let key = build_record_key(&record, when).unwrap();
        prop_assert!(helpers::is_record_key(&key), "unexpected key shape: {}", key);
        let device_segment = format!("device_id={}/", record.device_id().unwrap());
        prop_assert!(key.contains(&device_segment));
    }

    /// Property: records without a device id never get a key
    #[test]
    fn prop_missing_device_rejected(period in generators::period_no(), when in date()) {
        let record = Record::new().with("period_no", period);
        prop_assert_eq!(
            build_record_key(&record, when),
            Err(ValidationError::missing("device_id"))
        );
    }
}

#[cfg(test)]
mod additional_tests {
    use super::*;

    #[test]
    fn test_known_key() {
        let record = Record::new()
            .with("device_id", "dev-001")
            .with("period_no", 1);
        let when = Utc.with_ymd_and_hms(2025, 11, 9, 12, 0, 0).unwrap();

        assert_eq!(
            build_record_key(&record, when).unwrap(),
            "raw/2025/11/09/device_id=dev-001/period_no=000001.json"
        );
    }

    #[test]
    fn test_negative_period_rejected() {
        let record = Record::new()
            .with("device_id", "dev-001")
            .with("period_no", -1);
        let when = Utc.with_ymd_and_hms(2025, 11, 9, 12, 0, 0).unwrap();

        assert!(matches!(
            build_record_key(&record, when),
            Err(ValidationError::InvalidValue { .. })
        ));
    }
}
