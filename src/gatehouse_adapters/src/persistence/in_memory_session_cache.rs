use std::collections::HashMap;
use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use tokio::sync::RwLock;

use gatehouse_core::ports::cache::{CacheError, SessionCache};
use gatehouse_core::ports::clock::Clock;

#[derive(Debug, Clone)]
struct Entry {
    value: Vec<u8>,
    expires_at: DateTime<Utc>,
}

#[derive(Debug, Clone)]
struct Counter {
    count: u64,
    expires_at: DateTime<Utc>,
}

/// Session cache held in process memory. TTLs are evaluated against the
/// injected clock, so expiry behaves the same under a manual test clock as
/// under the system clock.
#[derive(Clone)]
pub struct InMemorySessionCache<L> {
    clock: L,
    entries: Arc<RwLock<HashMap<String, Entry>>>,
    counters: Arc<RwLock<HashMap<String, Counter>>>,
}

impl<L> InMemorySessionCache<L>
where
    L: Clock,
{
    pub fn new(clock: L) -> Self {
        Self {
            clock,
            entries: Arc::new(RwLock::new(HashMap::new())),
            counters: Arc::new(RwLock::new(HashMap::new())),
        }
    }

    fn ttl_to_deadline(&self, ttl: Duration) -> DateTime<Utc> {
        self.clock.now() + chrono::Duration::seconds(ttl.as_secs() as i64)
    }
}

#[async_trait]
impl<L> SessionCache for InMemorySessionCache<L>
where
    L: Clock + Clone,
{
    async fn set(&self, key: &str, value: Vec<u8>, ttl: Duration) -> Result<(), CacheError> {
        let entry = Entry {
            value,
            expires_at: self.ttl_to_deadline(ttl),
        };
        self.entries.write().await.insert(key.to_owned(), entry);
        Ok(())
    }

    async fn get(&self, key: &str) -> Result<Vec<u8>, CacheError> {
        let now = self.clock.now();
        let mut entries = self.entries.write().await;
        match entries.get(key) {
            Some(entry) if entry.expires_at > now => Ok(entry.value.clone()),
            Some(_) => {
                entries.remove(key);
                Err(CacheError::NotFound)
            }
            None => Err(CacheError::NotFound),
        }
    }

    async fn delete(&self, key: &str) -> Result<bool, CacheError> {
        let now = self.clock.now();
        let removed = self.entries.write().await.remove(key);
        Ok(matches!(removed, Some(entry) if entry.expires_at > now))
    }

    async fn delete_by_prefix(&self, prefix: &str) -> Result<(), CacheError> {
        self.entries
            .write()
            .await
            .retain(|key, _| !key.starts_with(prefix));
        Ok(())
    }

    async fn incr_window(&self, key: &str, window: Duration) -> Result<(u64, u64), CacheError> {
        let now = self.clock.now();
        let mut counters = self.counters.write().await;
        let counter = match counters.get_mut(key) {
            Some(counter) if counter.expires_at > now => {
                counter.count += 1;
                counter.clone()
            }
            _ => {
                let fresh = Counter {
                    count: 1,
                    expires_at: self.ttl_to_deadline(window),
                };
                counters.insert(key.to_owned(), fresh.clone());
                fresh
            }
        };
        let remaining = (counter.expires_at - now).num_seconds().max(0) as u64;
        Ok((counter.count, remaining))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    use chrono::Utc;
    use gatehouse_core::ports::clock::ManualClock;

    fn cache() -> (InMemorySessionCache<ManualClock>, ManualClock) {
        let clock = ManualClock::new(Utc::now());
        (InMemorySessionCache::new(clock.clone()), clock)
    }

    #[tokio::test]
    async fn entries_expire_when_the_clock_passes_their_ttl() {
        let (cache, clock) = cache();
        cache
            .set("k", b"v".to_vec(), Duration::from_secs(60))
            .await
            .unwrap();
        assert_eq!(cache.get("k").await.unwrap(), b"v");

        clock.advance(chrono::Duration::seconds(61));
        assert_eq!(cache.get("k").await, Err(CacheError::NotFound));
    }

    #[tokio::test]
    async fn delete_reports_whether_a_live_entry_existed() {
        let (cache, clock) = cache();
        cache
            .set("k", b"v".to_vec(), Duration::from_secs(60))
            .await
            .unwrap();
        assert!(cache.delete("k").await.unwrap());
        assert!(!cache.delete("k").await.unwrap());

        cache
            .set("k", b"v".to_vec(), Duration::from_secs(60))
            .await
            .unwrap();
        clock.advance(chrono::Duration::seconds(61));
        // Expired entries count as absent.
        assert!(!cache.delete("k").await.unwrap());
    }

    #[tokio::test]
    async fn delete_by_prefix_only_touches_matching_keys() {
        let (cache, _clock) = cache();
        let ttl = Duration::from_secs(60);
        cache.set("a:1", b"1".to_vec(), ttl).await.unwrap();
        cache.set("a:2", b"2".to_vec(), ttl).await.unwrap();
        cache.set("b:1", b"3".to_vec(), ttl).await.unwrap();

        cache.delete_by_prefix("a:").await.unwrap();
        assert_eq!(cache.get("a:1").await, Err(CacheError::NotFound));
        assert_eq!(cache.get("a:2").await, Err(CacheError::NotFound));
        assert_eq!(cache.get("b:1").await.unwrap(), b"3");
    }

    #[tokio::test]
    async fn counter_windows_reset_after_expiry() {
        let (cache, clock) = cache();
        let window = Duration::from_secs(60);

        let (current, ttl) = cache.incr_window("rl", window).await.unwrap();
        assert_eq!(current, 1);
        assert_eq!(ttl, 60);
        let (current, _) = cache.incr_window("rl", window).await.unwrap();
        assert_eq!(current, 2);

        clock.advance(chrono::Duration::seconds(61));
        let (current, ttl) = cache.incr_window("rl", window).await.unwrap();
        assert_eq!(current, 1);
        assert_eq!(ttl, 60);
    }
}
