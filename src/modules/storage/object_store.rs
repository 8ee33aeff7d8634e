use async_trait::async_trait;

use crate::core::error::Result;

/// Blob storage by bucket-scoped key.
///
/// The single production implementation is [`super::MinIOClient`]; services
/// depend on this trait so document handling can be exercised against an
/// in-memory store in tests.
#[async_trait]
pub trait ObjectStore: Send + Sync {
    /// Write bytes at `key`, overwriting any existing object.
    async fn put(&self, key: &str, data: Vec<u8>, content_type: &str) -> Result<()>;

    /// Read the full object at `key`.
    async fn get(&self, key: &str) -> Result<Vec<u8>>;

    /// Delete the object at `key`. Deleting a missing key is not an error.
    async fn delete(&self, key: &str) -> Result<()>;

    /// Check whether an object exists at `key`.
    async fn exists(&self, key: &str) -> Result<bool>;
}
