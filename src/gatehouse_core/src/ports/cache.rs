use std::time::Duration;

use async_trait::async_trait;
use thiserror::Error;

#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum CacheError {
    /// Never crosses the service boundary; services map it per flow.
    #[error("Key not found")]
    NotFound,
    #[error("Cache error: {0}")]
    Backend(String),
}

/// Typed wrapper over the external key-value store. Implementations own key
/// namespacing discipline, honor TTLs within backend precision, scan in
/// bounded batches, and bound every call with a deadline.
#[async_trait]
pub trait SessionCache: Send + Sync {
    async fn set(&self, key: &str, value: Vec<u8>, ttl: Duration) -> Result<(), CacheError>;

    async fn get(&self, key: &str) -> Result<Vec<u8>, CacheError>;

    /// Deletes a single key, reporting whether it existed. The "existed"
    /// answer is the atomic primitive single-use token consumption relies on.
    async fn delete(&self, key: &str) -> Result<bool, CacheError>;

    async fn delete_by_prefix(&self, prefix: &str) -> Result<(), CacheError>;

    /// Atomically increments a counter, assigns the window TTL on first
    /// increment, and reads the remaining TTL back - observed as one step.
    /// Returns `(current, remaining_ttl_seconds)`.
    async fn incr_window(&self, key: &str, window: Duration) -> Result<(u64, u64), CacheError>;
}
