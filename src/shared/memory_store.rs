//! In-memory implementation of [`ObjectStore`] for tests and local runs

use async_trait::async_trait;
use chrono::{DateTime, Duration as ChronoDuration, Utc};
use parking_lot::RwLock;
use std::collections::{BTreeMap, HashSet};
use std::sync::Arc;
use std::time::Duration;

use crate::domain::StoredObject;
use crate::error::StorageError;
use crate::object_store::ObjectStore;

#[derive(Debug, Clone)]
struct Entry {
    body: Vec<u8>,
    content_type: String,
    last_modified: DateTime<Utc>,
}

#[derive(Debug, Default)]
struct State {
    // Keyed by (bucket, key) so listings come back in key order like S3
    objects: BTreeMap<(String, String), Entry>,
    last_stamp: Option<DateTime<Utc>>,
    failing_gets: HashSet<(String, String)>,
    failing_put_buckets: HashSet<String>,
    put_count: usize,
}

/// Object store kept in process memory
///
/// Clones share the same contents. Modification times of regular puts are
/// strictly increasing, so "latest" ordering is deterministic.
#[derive(Debug, Clone, Default)]
pub struct InMemoryObjectStore {
    state: Arc<RwLock<State>>,
}

impl InMemoryObjectStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Insert an object with an explicit modification time
    pub fn insert_with_modified(
        &self,
        bucket: &str,
        key: &str,
        body: impl Into<Vec<u8>>,
        last_modified: DateTime<Utc>,
    ) {
        let mut state = self.state.write();
        state.objects.insert(
            (bucket.to_string(), key.to_string()),
            Entry {
                body: body.into(),
                content_type: "application/octet-stream".to_string(),
                last_modified,
            },
        );
    }

    /// Make every later `get_object` of this key fail
    pub fn fail_get(&self, bucket: &str, key: &str) {
        self.state
            .write()
            .failing_gets
            .insert((bucket.to_string(), key.to_string()));
    }

    /// Make every later put into this bucket fail
    pub fn fail_puts_to(&self, bucket: &str) {
        self.state
            .write()
            .failing_put_buckets
            .insert(bucket.to_string());
    }

    pub fn body(&self, bucket: &str, key: &str) -> Option<Vec<u8>> {
        self.state
            .read()
            .objects
            .get(&(bucket.to_string(), key.to_string()))
            .map(|e| e.body.clone())
    }

    pub fn content_type(&self, bucket: &str, key: &str) -> Option<String> {
        self.state
            .read()
            .objects
            .get(&(bucket.to_string(), key.to_string()))
            .map(|e| e.content_type.clone())
    }

    /// Keys stored in a bucket, in key order
    pub fn keys(&self, bucket: &str) -> Vec<String> {
        self.state
            .read()
            .objects
            .keys()
            .filter(|(b, _)| b == bucket)
            .map(|(_, k)| k.clone())
            .collect()
    }

    pub fn object_count(&self, bucket: &str) -> usize {
        self.keys(bucket).len()
    }

    /// Successful `put_object`/`upload_file` calls so far
    pub fn put_count(&self) -> usize {
        self.state.read().put_count
    }

    fn next_stamp(state: &mut State) -> DateTime<Utc> {
        let now = Utc::now();
        let stamp = match state.last_stamp {
            Some(last) if now <= last => last + ChronoDuration::milliseconds(1),
            _ => now,
        };
        state.last_stamp = Some(stamp);
        stamp
    }
}

#[async_trait]
impl ObjectStore for InMemoryObjectStore {
    async fn put_object(
        &self,
        bucket: &str,
        key: &str,
        body: Vec<u8>,
        content_type: &str,
    ) -> Result<(), StorageError> {
        let mut state = self.state.write();
        if state.failing_put_buckets.contains(bucket) {
            return Err(StorageError::Backend {
                operation: "PutObject",
                message: format!("AccessDenied: writes to {} are rejected", bucket),
            });
        }

        let last_modified = Self::next_stamp(&mut state);
        state.objects.insert(
            (bucket.to_string(), key.to_string()),
            Entry {
                body,
                content_type: content_type.to_string(),
                last_modified,
            },
        );
        state.put_count += 1;
        Ok(())
    }

    async fn get_object(&self, bucket: &str, key: &str) -> Result<Vec<u8>, StorageError> {
        let state = self.state.read();
        let id = (bucket.to_string(), key.to_string());

        if state.failing_gets.contains(&id) {
            return Err(StorageError::Backend {
                operation: "GetObject",
                message: format!("injected failure for {}/{}", bucket, key),
            });
        }

        state
            .objects
            .get(&id)
            .map(|e| e.body.clone())
            .ok_or_else(|| StorageError::NotFound {
                bucket: bucket.to_string(),
                key: key.to_string(),
            })
    }

    async fn list_objects(
        &self,
        bucket: &str,
        prefix: &str,
    ) -> Result<Vec<StoredObject>, StorageError> {
        let state = self.state.read();
        Ok(state
            .objects
            .iter()
            .filter(|((b, k), _)| b == bucket && k.starts_with(prefix))
            .map(|((_, k), e)| StoredObject {
                key: k.clone(),
                last_modified: e.last_modified,
                size_bytes: e.body.len() as u64,
            })
            .collect())
    }

    async fn presign_get(
        &self,
        bucket: &str,
        key: &str,
        expires_in: Duration,
    ) -> Result<String, StorageError> {
        Ok(format!(
            "memory://{}/{}?expires_in={}",
            bucket,
            key,
            expires_in.as_secs()
        ))
    }
}
