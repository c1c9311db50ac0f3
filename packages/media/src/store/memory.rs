// ABOUTME: In-process object store
// ABOUTME: Keeps uploaded objects in memory for local development and tests

use std::collections::HashMap;

use async_trait::async_trait;
use bytes::Bytes;
use tokio::sync::RwLock;
use tracing::debug;

use super::{object_url, ObjectStore, StoreResult};

const DEFAULT_BASE_URL: &str = "memory://objects";

#[derive(Debug, Clone, PartialEq)]
pub struct StoredObject {
    pub data: Bytes,
    pub content_type: String,
}

/// Object store backed by a map keyed on `bucket/object_name`
#[derive(Debug)]
pub struct MemoryObjectStore {
    base_url: String,
    objects: RwLock<HashMap<String, StoredObject>>,
}

impl Default for MemoryObjectStore {
    fn default() -> Self {
        Self::new(DEFAULT_BASE_URL)
    }
}

impl MemoryObjectStore {
    pub fn new(base_url: impl Into<String>) -> Self {
        Self {
            base_url: base_url.into(),
            objects: RwLock::new(HashMap::new()),
        }
    }

    pub async fn get(&self, bucket: &str, object_name: &str) -> Option<StoredObject> {
        self.objects
            .read()
            .await
            .get(&format!("{}/{}", bucket, object_name))
            .cloned()
    }

    /// Keys of every stored object, sorted
    pub async fn keys(&self) -> Vec<String> {
        let mut keys: Vec<String> = self.objects.read().await.keys().cloned().collect();
        keys.sort();
        keys
    }

    pub async fn len(&self) -> usize {
        self.objects.read().await.len()
    }

    pub async fn is_empty(&self) -> bool {
        self.objects.read().await.is_empty()
    }
}

#[async_trait]
impl ObjectStore for MemoryObjectStore {
    fn provider_name(&self) -> &'static str {
        "memory"
    }

    async fn store(
        &self,
        bucket: &str,
        object_name: &str,
        data: Bytes,
        length: usize,
        content_type: &str,
    ) -> StoreResult<String> {
        debug!(
            "Storing {} bytes in memory at {}/{}",
            length, bucket, object_name
        );

        self.objects.write().await.insert(
            format!("{}/{}", bucket, object_name),
            StoredObject {
                data,
                content_type: content_type.to_string(),
            },
        );

        Ok(object_url(&self.base_url, bucket, object_name))
    }
}
