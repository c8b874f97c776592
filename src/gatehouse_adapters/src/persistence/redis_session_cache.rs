use std::future::Future;
use std::sync::LazyLock;
use std::time::Duration;

use async_trait::async_trait;
use redis::{AsyncCommands, Script, aio::MultiplexedConnection};

use gatehouse_core::ports::cache::{CacheError, SessionCache};

/// Upper bound on any single round trip to Redis.
const CALL_DEADLINE: Duration = Duration::from_secs(5);

/// Batch hint for SCAN so prefix deletes never block the server.
const SCAN_COUNT: usize = 100;

/// INCR, first-increment EXPIRE, and TTL readback as one atomic step. The
/// rate limiter depends on this being a single observation.
static INCR_WINDOW_SCRIPT: LazyLock<Script> = LazyLock::new(|| {
    Script::new(
        r#"
        local current = redis.call('INCR', KEYS[1])
        if current == 1 then
            redis.call('EXPIRE', KEYS[1], ARGV[1])
        end
        local ttl = redis.call('TTL', KEYS[1])
        return {current, ttl}
        "#,
    )
});

/// Session cache over a multiplexed Redis connection. The connection handle
/// is cheap to clone, so every call pipelines over the shared socket.
#[derive(Clone)]
pub struct RedisSessionCache {
    conn: MultiplexedConnection,
}

impl RedisSessionCache {
    pub fn new(conn: MultiplexedConnection) -> Self {
        Self { conn }
    }

    pub async fn connect(url: &str) -> Result<Self, CacheError> {
        let client = redis::Client::open(url).map_err(backend)?;
        let conn = client
            .get_multiplexed_async_connection()
            .await
            .map_err(backend)?;
        Ok(Self::new(conn))
    }
}

fn backend(e: redis::RedisError) -> CacheError {
    CacheError::Backend(e.to_string())
}

async fn bounded<T>(
    fut: impl Future<Output = Result<T, redis::RedisError>>,
) -> Result<T, CacheError> {
    tokio::time::timeout(CALL_DEADLINE, fut)
        .await
        .map_err(|_| CacheError::Backend("redis call exceeded deadline".to_owned()))?
        .map_err(backend)
}

#[async_trait]
impl SessionCache for RedisSessionCache {
    #[tracing::instrument(name = "RedisSessionCache::set", skip(self, value))]
    async fn set(&self, key: &str, value: Vec<u8>, ttl: Duration) -> Result<(), CacheError> {
        let mut conn = self.conn.clone();
        bounded(conn.set_ex::<_, _, ()>(key, value, ttl.as_secs())).await
    }

    #[tracing::instrument(name = "RedisSessionCache::get", skip(self))]
    async fn get(&self, key: &str) -> Result<Vec<u8>, CacheError> {
        let mut conn = self.conn.clone();
        let value: Option<Vec<u8>> = bounded(conn.get(key)).await?;
        value.ok_or(CacheError::NotFound)
    }

    #[tracing::instrument(name = "RedisSessionCache::delete", skip(self))]
    async fn delete(&self, key: &str) -> Result<bool, CacheError> {
        let mut conn = self.conn.clone();
        let removed: u64 = bounded(conn.del(key)).await?;
        Ok(removed > 0)
    }

    #[tracing::instrument(name = "RedisSessionCache::delete_by_prefix", skip(self))]
    async fn delete_by_prefix(&self, prefix: &str) -> Result<(), CacheError> {
        let mut conn = self.conn.clone();
        let pattern = format!("{prefix}*");
        let mut cursor: u64 = 0;
        loop {
            let (next, keys): (u64, Vec<String>) = bounded(
                redis::cmd("SCAN")
                    .arg(cursor)
                    .arg("MATCH")
                    .arg(&pattern)
                    .arg("COUNT")
                    .arg(SCAN_COUNT)
                    .query_async(&mut conn),
            )
            .await?;

            if !keys.is_empty() {
                let _: u64 = bounded(conn.del(&keys)).await?;
            }
            if next == 0 {
                return Ok(());
            }
            cursor = next;
        }
    }

    #[tracing::instrument(name = "RedisSessionCache::incr_window", skip(self))]
    async fn incr_window(&self, key: &str, window: Duration) -> Result<(u64, u64), CacheError> {
        let mut conn = self.conn.clone();
        let (current, ttl): (u64, i64) = bounded(
            INCR_WINDOW_SCRIPT
                .key(key)
                .arg(window.as_secs())
                .invoke_async(&mut conn),
        )
        .await?;
        Ok((current, ttl.max(0) as u64))
    }
}
