// ABOUTME: Object storage abstraction for uploaded media
// ABOUTME: Defines the ObjectStore trait and its S3 and in-memory implementations

use async_trait::async_trait;
use bytes::Bytes;
use thiserror::Error;

pub mod memory;
pub mod s3;

pub use memory::{MemoryObjectStore, StoredObject};
pub use s3::S3ObjectStore;

/// Object storage errors
#[derive(Error, Debug)]
pub enum StoreError {
    #[error("Network error: {0}")]
    Network(String),
    #[error("Configuration error: {0}")]
    Configuration(String),
    #[error("Storage provider error: {0}")]
    Provider(String),
}

pub type StoreResult<T> = Result<T, StoreError>;

/// A bucket-addressed blob store that hands back a public URL for each object
#[async_trait]
pub trait ObjectStore: Send + Sync {
    /// Short identifier used in logs
    fn provider_name(&self) -> &'static str;

    /// Store `data` under `bucket/object_name` and return the object's URL
    async fn store(
        &self,
        bucket: &str,
        object_name: &str,
        data: Bytes,
        length: usize,
        content_type: &str,
    ) -> StoreResult<String>;
}

/// Join a base URL, bucket and object name without doubling slashes
pub(crate) fn object_url(base_url: &str, bucket: &str, object_name: &str) -> String {
    format!(
        "{}/{}/{}",
        base_url.trim_end_matches('/'),
        bucket,
        object_name.trim_start_matches('/')
    )
}
