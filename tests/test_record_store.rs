//! Integration tests for RecordStore against the in-memory object store
//!
//! Covers save/read round trips, same-day overwrites, latest-first listing,
//! and zip exports including scratch file cleanup.

use std::io::{Cursor, Read};
use std::sync::Arc;
use std::time::Duration;

use chrono::{TimeZone, Utc};
use energy_datalake::{
    DataLakeError, FixedClock, InMemoryObjectStore, ObjectStore, Record, RecordStore,
    StorageError, SummaryReport,
};
use serde_json::{json, Value};

const RECORDS: &str = "records";
const EXPORTS: &str = "exports-bucket";

fn clock_at(rfc3339: &str) -> Arc<FixedClock> {
    Arc::new(FixedClock::from_rfc3339(rfc3339).unwrap())
}

fn record_store(memory: &InMemoryObjectStore) -> RecordStore {
    RecordStore::new(Arc::new(memory.clone()), RECORDS)
        .with_clock(clock_at("2025-11-09T10:00:00Z"))
}

fn reading(device_id: &str, period_no: u64, kwh: f64) -> Record {
    Record::new()
        .with("device_id", device_id)
        .with("period_no", period_no)
        .with("kwh", kwh)
        .with("alert_flag", kwh > 5.0)
}

fn scratch_entries(dir: &std::path::Path) -> usize {
    std::fs::read_dir(dir).unwrap().count()
}

#[tokio::test]
async fn test_save_then_fetch_roundtrip() {
    let memory = InMemoryObjectStore::new();
    let store = record_store(&memory);

    let original = reading("dev-001", 12, 3.25).with("site", "Łódź substation");
    let key = store.save_record(&original, None).await.unwrap();

    let body = memory.get_object(RECORDS, &key).await.unwrap();
    let text = String::from_utf8(body).unwrap();

    // Compact, with non-ASCII characters left as-is
    assert!(!text.contains(": "));
    assert!(text.contains("Łódź"));

    let decoded: Record = serde_json::from_str(&text).unwrap();
    assert_eq!(decoded, original);
}

#[tokio::test]
async fn test_listing_roundtrip_ignores_injected_key() {
    let memory = InMemoryObjectStore::new();
    let store = record_store(&memory);

    let original = reading("dev-002", 99, 1.0);
    let key = store.save_record(&original, None).await.unwrap();

    let mut listed = store.list_latest_details("raw/", 10).await.unwrap();
    assert_eq!(listed.records.len(), 1);

    let mut fetched = listed.records.remove(0);
    assert_eq!(fetched.remove("s3_key"), Some(Value::String(key)));
    assert_eq!(fetched, original);
}

#[tokio::test]
async fn test_same_day_write_overwrites() {
    let memory = InMemoryObjectStore::new();
    let store = record_store(&memory);

    let first = store.save_record(&reading("dev-001", 5, 1.0), None).await.unwrap();
    let second = store.save_record(&reading("dev-001", 5, 9.0), None).await.unwrap();

    assert_eq!(first, second);
    assert_eq!(memory.object_count(RECORDS), 1);

    let body = memory.get_object(RECORDS, &first).await.unwrap();
    let stored: Value = serde_json::from_slice(&body).unwrap();
    assert_eq!(stored["kwh"], json!(9.0));
}

#[tokio::test]
async fn test_next_day_write_gets_new_key() {
    let memory = InMemoryObjectStore::new();
    let today = record_store(&memory);
    let tomorrow = RecordStore::new(Arc::new(memory.clone()), RECORDS)
        .with_clock(clock_at("2025-11-10T00:00:01Z"));

    let a = today.save_record(&reading("dev-001", 5, 1.0), None).await.unwrap();
    let b = tomorrow.save_record(&reading("dev-001", 5, 1.0), None).await.unwrap();

    assert_ne!(a, b);
    assert!(b.starts_with("raw/2025/11/10/"));
    assert_eq!(memory.object_count(RECORDS), 2);
}

#[tokio::test]
async fn test_list_latest_orders_by_modification_time() {
    let memory = InMemoryObjectStore::new();
    let base = Utc.with_ymd_and_hms(2025, 11, 9, 0, 0, 0).unwrap();

    // Key order and modification order disagree on purpose
    let layout = [("raw/a.json", 30), ("raw/b.json", 10), ("raw/c.json", 20)];
    for (key, minute) in layout {
        memory.insert_with_modified(
            RECORDS,
            key,
            json!({"device_id": key, "period_no": minute}).to_string(),
            base + chrono::Duration::minutes(minute),
        );
    }

    let listed = record_store(&memory)
        .list_latest_details("raw/", 200)
        .await
        .unwrap();

    let keys: Vec<&str> = listed.records.iter().filter_map(|r| r.s3_key()).collect();
    assert_eq!(keys, vec!["raw/a.json", "raw/c.json", "raw/b.json"]);
}

#[tokio::test]
async fn test_list_latest_respects_limit_and_prefix() {
    let memory = InMemoryObjectStore::new();
    let store = record_store(&memory);

    for period in 0..10 {
        store
            .save_record(&reading("dev-001", period, 1.0), None)
            .await
            .unwrap();
    }
    memory
        .put_object(RECORDS, "other/x.json", b"{}".to_vec(), "application/json")
        .await
        .unwrap();

    let listed = store.list_latest_details("raw/", 3).await.unwrap();
    assert_eq!(listed.records.len(), 3);

    let periods: Vec<u64> = listed
        .records
        .iter()
        .map(|r| r.period_no().unwrap())
        .collect();
    assert_eq!(periods, vec![9, 8, 7]);
    assert!(listed
        .records
        .iter()
        .all(|r| r.s3_key().unwrap().starts_with("raw/")));
}

#[tokio::test]
async fn test_listed_records_feed_summary() {
    let memory = InMemoryObjectStore::new();
    let store = record_store(&memory);

    for (device, period, kwh) in [("a", 1, 9.0), ("a", 2, 1.0), ("b", 3, 7.5)] {
        store
            .save_record(&reading(device, period, kwh), None)
            .await
            .unwrap();
    }
    memory.insert_with_modified(RECORDS, "raw/garbage.json", "\u{0}", Utc::now());

    let listed = store.list_latest_details("raw/", 200).await.unwrap();
    assert_eq!(listed.skipped, 1);

    let summary = SummaryReport::new().summarize(&listed.records).unwrap();
    assert_eq!(summary.total_records, 3);
    assert_eq!(summary.device_count, 2);
    assert_eq!(summary.latest_period, 3);
    assert_eq!(summary.alerts_total, 2);
    assert_eq!(summary.alerts_last_1440_period, 2);
}

#[tokio::test]
async fn test_export_archives_every_object() {
    let memory = InMemoryObjectStore::new();
    let scratch = tempfile::tempdir().unwrap();
    let store = record_store(&memory).with_scratch_dir(scratch.path());

    let mut keys = Vec::new();
    for period in 1..=3 {
        keys.push(
            store
                .save_record(&reading("dev-001", period, 2.0), None)
                .await
                .unwrap(),
        );
    }
    memory
        .put_object(RECORDS, "raw/notes.txt", b"plain text".to_vec(), "text/plain")
        .await
        .unwrap();

    let archive = store
        .export_prefix_to_zip("raw/", "exports/daily", EXPORTS)
        .await
        .unwrap()
        .expect("archive for non-empty prefix");

    assert_eq!(archive.key, "exports/daily/export-1762682400.zip");
    assert_eq!(archive.bucket, EXPORTS);
    assert_eq!(archive.object_count, 4);
    assert_eq!(archive.expires_in, Duration::from_secs(3600));
    assert!(archive.url.contains(&archive.key));

    let zip_bytes = memory.body(EXPORTS, &archive.key).unwrap();
    let mut zip = zip::ZipArchive::new(Cursor::new(zip_bytes)).unwrap();
    assert_eq!(zip.len(), 4);

    for key in &keys {
        let mut entry = zip.by_name(key).unwrap();
        let mut contents = Vec::new();
        entry.read_to_end(&mut contents).unwrap();
        assert_eq!(contents, memory.body(RECORDS, key).unwrap());
    }

    let mut notes = String::new();
    zip.by_name("raw/notes.txt")
        .unwrap()
        .read_to_string(&mut notes)
        .unwrap();
    assert_eq!(notes, "plain text");

    assert_eq!(scratch_entries(scratch.path()), 0);
}

#[tokio::test]
async fn test_export_empty_prefix_uploads_nothing() {
    let memory = InMemoryObjectStore::new();
    let scratch = tempfile::tempdir().unwrap();
    let store = record_store(&memory).with_scratch_dir(scratch.path());
    store.save_record(&reading("dev-001", 1, 1.0), None).await.unwrap();
    let puts_before = memory.put_count();

    let result = store
        .export_prefix_to_zip("raw/1999/", "exports", EXPORTS)
        .await
        .unwrap();

    assert!(result.is_none());
    assert_eq!(memory.put_count(), puts_before);
    assert_eq!(memory.object_count(EXPORTS), 0);
    assert_eq!(scratch_entries(scratch.path()), 0);
}

#[tokio::test]
async fn test_export_aborts_on_first_failed_fetch() {
    let memory = InMemoryObjectStore::new();
    let scratch = tempfile::tempdir().unwrap();
    let store = record_store(&memory).with_scratch_dir(scratch.path());

    let good = store.save_record(&reading("dev-001", 1, 1.0), None).await.unwrap();
    let bad = store.save_record(&reading("dev-001", 2, 1.0), None).await.unwrap();
    memory.fail_get(RECORDS, &bad);

    let err = store
        .export_prefix_to_zip("raw/", "exports", EXPORTS)
        .await
        .unwrap_err();

    assert!(matches!(err, DataLakeError::Storage(StorageError::Backend { .. })));
    assert_eq!(memory.object_count(EXPORTS), 0);
    assert_eq!(scratch_entries(scratch.path()), 0);
    assert!(memory.body(RECORDS, &good).is_some());
}

#[tokio::test]
async fn test_export_upload_failure_cleans_scratch() {
    let memory = InMemoryObjectStore::new();
    let scratch = tempfile::tempdir().unwrap();
    let store = record_store(&memory).with_scratch_dir(scratch.path());
    store.save_record(&reading("dev-001", 1, 1.0), None).await.unwrap();
    memory.fail_puts_to(EXPORTS);

    let err = store
        .export_prefix_to_zip("raw/", "exports", EXPORTS)
        .await
        .unwrap_err();

    assert!(matches!(err, DataLakeError::Storage(_)));
    assert_eq!(scratch_entries(scratch.path()), 0);
}
