//! S3 implementation of [`ObjectStore`]

use async_trait::async_trait;
use aws_sdk_s3::error::SdkError;
use aws_sdk_s3::operation::get_object::GetObjectError;
use aws_sdk_s3::operation::list_objects_v2::ListObjectsV2Output;
use aws_sdk_s3::presigning::PresigningConfig;
use aws_sdk_s3::primitives::ByteStream;
use aws_sdk_s3::Client as S3Client;
use chrono::{DateTime, Utc};
use std::path::Path;
use std::time::Duration;
use tracing::{debug, warn};

use crate::domain::StoredObject;
use crate::error::StorageError;
use crate::object_store::ObjectStore;

/// Object store backed by Amazon S3
///
/// Timeouts and retries are the SDK defaults of the supplied client.
#[derive(Debug, Clone)]
pub struct S3ObjectStore {
    client: S3Client,
}

impl S3ObjectStore {
    pub fn new(client: S3Client) -> Self {
        Self { client }
    }

    /// Build a client from the ambient AWS configuration
    pub async fn from_env() -> Self {
        let aws_config = aws_config::defaults(aws_config::BehaviorVersion::latest())
            .load()
            .await;
        Self::new(S3Client::new(&aws_config))
    }
}

fn to_chrono(dt: &aws_sdk_s3::primitives::DateTime) -> DateTime<Utc> {
    DateTime::from_timestamp(dt.secs(), dt.subsec_nanos()).unwrap_or_default()
}

/// Objects of one listing page; a truncated page is reported since the rest
/// of the prefix is not read
fn first_page_objects(
    bucket: &str,
    prefix: &str,
    output: &ListObjectsV2Output,
) -> Vec<StoredObject> {
    if output.is_truncated().unwrap_or(false) {
        warn!(
            bucket = %bucket,
            prefix = %prefix,
            returned = output.contents().len(),
            "Listing truncated, only the first page is used"
        );
    }

    output
        .contents()
        .iter()
        .filter_map(|obj| {
            let key = obj.key()?;
            Some(StoredObject {
                key: key.to_string(),
                last_modified: obj.last_modified().map(to_chrono).unwrap_or_default(),
                size_bytes: obj.size().unwrap_or(0).max(0) as u64,
            })
        })
        .collect()
}

fn map_get_error(bucket: &str, key: &str, err: SdkError<GetObjectError>) -> StorageError {
    if let SdkError::ServiceError(service_err) = &err {
        if matches!(service_err.err(), GetObjectError::NoSuchKey(_)) {
            return StorageError::NotFound {
                bucket: bucket.to_string(),
                key: key.to_string(),
            };
        }
    }
    StorageError::backend("GetObject", err)
}

#[async_trait]
impl ObjectStore for S3ObjectStore {
    async fn put_object(
        &self,
        bucket: &str,
        key: &str,
        body: Vec<u8>,
        content_type: &str,
    ) -> Result<(), StorageError> {
        self.client
            .put_object()
            .bucket(bucket)
            .key(key)
            .content_type(content_type)
            .body(ByteStream::from(body))
            .send()
            .await
            .map_err(|e| StorageError::backend("PutObject", e))?;

        debug!(bucket = %bucket, key = %key, "Object written");
        Ok(())
    }

    async fn get_object(&self, bucket: &str, key: &str) -> Result<Vec<u8>, StorageError> {
        let output = self
            .client
            .get_object()
            .bucket(bucket)
            .key(key)
            .send()
            .await
            .map_err(|e| map_get_error(bucket, key, e))?;

        let body = output
            .body
            .collect()
            .await
            .map_err(|e| StorageError::backend("GetObject", e))?;

        Ok(body.into_bytes().to_vec())
    }

    async fn list_objects(
        &self,
        bucket: &str,
        prefix: &str,
    ) -> Result<Vec<StoredObject>, StorageError> {
        let output = self
            .client
            .list_objects_v2()
            .bucket(bucket)
            .prefix(prefix)
            .send()
            .await
            .map_err(|e| StorageError::backend("ListObjectsV2", e))?;

        Ok(first_page_objects(bucket, prefix, &output))
    }

    async fn presign_get(
        &self,
        bucket: &str,
        key: &str,
        expires_in: Duration,
    ) -> Result<String, StorageError> {
        let presigning = PresigningConfig::expires_in(expires_in)
            .map_err(|e| StorageError::Presign(e.to_string()))?;

        let request = self
            .client
            .get_object()
            .bucket(bucket)
            .key(key)
            .presigned(presigning)
            .await
            .map_err(|e| StorageError::Presign(format!("{:?}", e)))?;

        Ok(request.uri().to_string())
    }

    async fn upload_file(
        &self,
        bucket: &str,
        key: &str,
        path: &Path,
        content_type: &str,
    ) -> Result<(), StorageError> {
        let body = ByteStream::from_path(path)
            .await
            .map_err(|e| StorageError::backend("PutObject", e))?;

        self.client
            .put_object()
            .bucket(bucket)
            .key(key)
            .content_type(content_type)
            .body(body)
            .send()
            .await
            .map_err(|e| StorageError::backend("PutObject", e))?;

        debug!(bucket = %bucket, key = %key, path = %path.display(), "File uploaded");
        Ok(())
    }
}
