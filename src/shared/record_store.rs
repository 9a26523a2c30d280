//! Record persistence in the data lake bucket
//!
//! Records land under `raw/YYYY/MM/DD/device_id=<id>/period_no=<nnnnnn>.json`.
//! The date comes from the injected clock at write time, so the same device
//! and period written twice on one UTC day share a key and the second write
//! wins.

use chrono::{DateTime, Datelike, Utc};
use serde_json::Value;
use std::io::Write;
use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;
use tracing::{debug, info};
use zip::write::FileOptions;
use zip::{CompressionMethod, ZipWriter};

use crate::domain::{ExportArchive, ListedRecords, Record, StoredObject, S3_KEY_FIELD};
use crate::error::{DataLakeError, StorageError, ValidationError};
use crate::object_store::{ObjectStore, JSON_CONTENT_TYPE, ZIP_CONTENT_TYPE};
use crate::time::{Clock, SystemClock};

pub const DEFAULT_LIST_PREFIX: &str = "raw/";
pub const DEFAULT_LIST_LIMIT: usize = 200;
pub const DEFAULT_EXPORT_URL_TTL: Duration = Duration::from_secs(3600);

/// Build the partition key for a record on the given date
pub fn build_record_key(detail: &Record, date: DateTime<Utc>) -> Result<String, ValidationError> {
    let device_id = detail.device_id()?;
    let period_no = detail.period_no()?;

    Ok(format!(
        "raw/{:04}/{:02}/{:02}/device_id={}/period_no={:06}.json",
        date.year(),
        date.month(),
        date.day(),
        device_id,
        period_no
    ))
}

/// Key of an export archive created at `epoch_seconds`
pub fn build_export_key(export_prefix: &str, epoch_seconds: i64) -> String {
    format!("{}/export-{}.zip", export_prefix, epoch_seconds)
}

/// Most recently modified first; equal timestamps keep listing order
fn sort_latest_first(objects: &mut [StoredObject]) {
    objects.sort_by(|a, b| b.last_modified.cmp(&a.last_modified));
}

fn decode_record(body: &[u8]) -> Option<Record> {
    let text = std::str::from_utf8(body).ok()?;
    let value: Value = serde_json::from_str(text).ok()?;
    Record::from_value(value)
}

/// Reads and writes electricity records in one bucket
#[derive(Clone)]
pub struct RecordStore {
    store: Arc<dyn ObjectStore>,
    bucket: String,
    clock: Arc<dyn Clock>,
    url_ttl: Duration,
    scratch_dir: Option<PathBuf>,
}

impl std::fmt::Debug for RecordStore {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("RecordStore")
            .field("bucket", &self.bucket)
            .field("url_ttl", &self.url_ttl)
            .field("scratch_dir", &self.scratch_dir)
            .finish()
    }
}

impl RecordStore {
    pub fn new(store: Arc<dyn ObjectStore>, bucket: impl Into<String>) -> Self {
        Self {
            store,
            bucket: bucket.into(),
            clock: Arc::new(SystemClock::new()),
            url_ttl: DEFAULT_EXPORT_URL_TTL,
            scratch_dir: None,
        }
    }

    pub fn with_clock(mut self, clock: Arc<dyn Clock>) -> Self {
        self.clock = clock;
        self
    }

    /// Validity of presigned export URLs
    pub fn with_url_ttl(mut self, ttl: Duration) -> Self {
        self.url_ttl = ttl;
        self
    }

    /// Directory for export scratch files (defaults to the system temp dir)
    pub fn with_scratch_dir(mut self, dir: impl Into<PathBuf>) -> Self {
        self.scratch_dir = Some(dir.into());
        self
    }

    pub fn bucket(&self) -> &str {
        &self.bucket
    }

    pub fn url_ttl(&self) -> Duration {
        self.url_ttl
    }

    /// Partition key for `detail` using today's UTC date
    pub fn build_key(&self, detail: &Record) -> Result<String, ValidationError> {
        build_record_key(detail, self.clock.now())
    }

    /// Write `detail` as compact JSON, returning the key used
    pub async fn save_record(
        &self,
        detail: &Record,
        key: Option<&str>,
    ) -> Result<String, DataLakeError> {
        let key = match key {
            Some(key) => key.to_string(),
            None => self.build_key(detail)?,
        };

        let body = detail.to_compact_json()?;
        self.store
            .put_object(&self.bucket, &key, body.into_bytes(), JSON_CONTENT_TYPE)
            .await?;

        info!(bucket = %self.bucket, key = %key, "Record saved");
        Ok(key)
    }

    /// Fetch the `limit` most recently modified records under `prefix`
    ///
    /// Objects whose body is not a UTF-8 JSON object are skipped and only
    /// counted in [`ListedRecords::skipped`]. Each returned record carries
    /// its object key in `s3_key`.
    pub async fn list_latest_details(
        &self,
        prefix: &str,
        limit: usize,
    ) -> Result<ListedRecords, DataLakeError> {
        let mut objects = self.store.list_objects(&self.bucket, prefix).await?;
        sort_latest_first(&mut objects);
        objects.truncate(limit);

        let mut listed = ListedRecords::default();
        for obj in objects {
            let body = self.store.get_object(&self.bucket, &obj.key).await?;

            match decode_record(&body) {
                Some(mut record) => {
                    record.insert(S3_KEY_FIELD, obj.key);
                    listed.records.push(record);
                }
                None => {
                    debug!(bucket = %self.bucket, key = %obj.key, "Skipping undecodable object");
                    listed.skipped += 1;
                }
            }
        }

        info!(
            bucket = %self.bucket,
            prefix = %prefix,
            returned = listed.records.len(),
            skipped = listed.skipped,
            "Listed latest records"
        );
        Ok(listed)
    }

    /// Zip every object under `prefix` and publish it to `export_bucket`
    ///
    /// Returns `None` when nothing matches; no archive is written then. The
    /// first failed fetch aborts the export. The scratch archive is removed
    /// on every exit path.
    pub async fn export_prefix_to_zip(
        &self,
        prefix: &str,
        export_prefix: &str,
        export_bucket: &str,
    ) -> Result<Option<ExportArchive>, DataLakeError> {
        let objects = self.store.list_objects(&self.bucket, prefix).await?;
        if objects.is_empty() {
            info!(bucket = %self.bucket, prefix = %prefix, "Nothing to export");
            return Ok(None);
        }

        let scratch = match &self.scratch_dir {
            Some(dir) => tempfile::Builder::new()
                .prefix("export-")
                .suffix(".zip")
                .tempfile_in(dir),
            None => tempfile::Builder::new()
                .prefix("export-")
                .suffix(".zip")
                .tempfile(),
        }
        .map_err(StorageError::from)?;

        {
            let mut zip = ZipWriter::new(scratch.as_file());
            let options = FileOptions::default().compression_method(CompressionMethod::Deflated);

            for obj in &objects {
                let data = self.store.get_object(&self.bucket, &obj.key).await?;
                zip.start_file(obj.key.as_str(), options)
                    .map_err(StorageError::from)?;
                zip.write_all(&data).map_err(StorageError::from)?;
            }

            zip.finish().map_err(StorageError::from)?;
        }

        let export_key = build_export_key(export_prefix, self.clock.now_epoch_seconds());
        self.store
            .upload_file(export_bucket, &export_key, scratch.path(), ZIP_CONTENT_TYPE)
            .await?;

        let url = self
            .store
            .presign_get(export_bucket, &export_key, self.url_ttl)
            .await?;

        info!(
            bucket = %self.bucket,
            prefix = %prefix,
            export_bucket = %export_bucket,
            export_key = %export_key,
            object_count = objects.len(),
            source_bytes = objects.iter().map(|o| o.size_bytes).sum::<u64>(),
            "Export published"
        );

        Ok(Some(ExportArchive {
            bucket: export_bucket.to_string(),
            key: export_key,
            url,
            object_count: objects.len(),
            expires_in: self.url_ttl,
        }))
    }
}
