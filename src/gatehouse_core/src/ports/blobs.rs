use async_trait::async_trait;
use thiserror::Error;

#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum BlobStoreError {
    #[error("Blob store error: {0}")]
    Backend(String),
}

/// Object storage for user avatars. Keys are deterministic
/// (`avatars/{userId}.{ext}`), so re-uploads overwrite in place.
#[async_trait]
pub trait BlobStore: Send + Sync {
    /// Stores the object and returns its public URL.
    async fn put(
        &self,
        key: &str,
        bytes: Vec<u8>,
        content_type: &str,
    ) -> Result<String, BlobStoreError>;

    /// Deleting an absent object is success.
    async fn delete(&self, key: &str) -> Result<(), BlobStoreError>;
}
