//! Object store abstraction
//!
//! The four primitives the data lake needs, plus a file upload used by
//! exports. Components receive an `Arc<dyn ObjectStore>` at construction:
//!
//! - `S3ObjectStore`: production, over `aws-sdk-s3`
//! - `InMemoryObjectStore`: tests and local runs

use async_trait::async_trait;
use std::path::Path;
use std::time::Duration;

use crate::domain::StoredObject;
use crate::error::StorageError;

pub const JSON_CONTENT_TYPE: &str = "application/json";
pub const ZIP_CONTENT_TYPE: &str = "application/zip";

#[async_trait]
pub trait ObjectStore: Send + Sync {
    /// Create or overwrite an object
    async fn put_object(
        &self,
        bucket: &str,
        key: &str,
        body: Vec<u8>,
        content_type: &str,
    ) -> Result<(), StorageError>;

    /// Read an object's full body
    async fn get_object(&self, bucket: &str, key: &str) -> Result<Vec<u8>, StorageError>;

    /// List objects under a prefix
    ///
    /// Returns one page only, in the store's native order. Callers that need
    /// every object under very large prefixes are not served by this call.
    async fn list_objects(
        &self,
        bucket: &str,
        prefix: &str,
    ) -> Result<Vec<StoredObject>, StorageError>;

    /// Time-limited GET URL for an object
    async fn presign_get(
        &self,
        bucket: &str,
        key: &str,
        expires_in: Duration,
    ) -> Result<String, StorageError>;

    /// Upload a local file as an object
    async fn upload_file(
        &self,
        bucket: &str,
        key: &str,
        path: &Path,
        content_type: &str,
    ) -> Result<(), StorageError> {
        let body = tokio::fs::read(path).await?;
        self.put_object(bucket, key, body, content_type).await
    }
}
