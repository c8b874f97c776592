use std::collections::HashMap;
use std::sync::Arc;

use async_trait::async_trait;
use tokio::sync::RwLock;

use gatehouse_core::ports::blobs::{BlobStore, BlobStoreError};

#[derive(Debug, Clone)]
struct Blob {
    bytes: Vec<u8>,
    content_type: String,
}

/// Blob store held in process memory; URLs use a `memory://` scheme so tests
/// can tell them apart from anything real.
#[derive(Debug, Clone, Default)]
pub struct InMemoryBlobStore {
    blobs: Arc<RwLock<HashMap<String, Blob>>>,
}

impl InMemoryBlobStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub async fn contains(&self, key: &str) -> bool {
        self.blobs.read().await.contains_key(key)
    }
}

#[async_trait]
impl BlobStore for InMemoryBlobStore {
    async fn put(
        &self,
        key: &str,
        bytes: Vec<u8>,
        content_type: &str,
    ) -> Result<String, BlobStoreError> {
        self.blobs.write().await.insert(
            key.to_owned(),
            Blob {
                bytes,
                content_type: content_type.to_owned(),
            },
        );
        Ok(format!("memory://{key}"))
    }

    async fn delete(&self, key: &str) -> Result<(), BlobStoreError> {
        self.blobs.write().await.remove(key);
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn put_overwrites_in_place_and_delete_is_idempotent() {
        let store = InMemoryBlobStore::new();
        let url = store
            .put("avatars/x.png", vec![1, 2, 3], "image/png")
            .await
            .unwrap();
        assert_eq!(url, "memory://avatars/x.png");
        let same_url = store
            .put("avatars/x.png", vec![4, 5], "image/png")
            .await
            .unwrap();
        assert_eq!(url, same_url);
        assert!(store.contains("avatars/x.png").await);

        store.delete("avatars/x.png").await.unwrap();
        assert!(!store.contains("avatars/x.png").await);
        // Deleting an absent object is success.
        store.delete("avatars/x.png").await.unwrap();
    }

    #[tokio::test]
    async fn stored_bytes_keep_their_content_type() {
        let store = InMemoryBlobStore::new();
        store
            .put("avatars/y.jpg", vec![9], "image/jpeg")
            .await
            .unwrap();
        let blobs = store.blobs.read().await;
        let blob = blobs.get("avatars/y.jpg").unwrap();
        assert_eq!(blob.bytes, vec![9]);
        assert_eq!(blob.content_type, "image/jpeg");
    }
}
