use std::time::Duration;

use gatehouse_core::error::AuthError;
use gatehouse_core::ports::cache::SessionCache;

use crate::keys;

/// Outcome of one rate-limit check.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RateLimitDecision {
    pub allowed: bool,
    pub current: u64,
    pub limit: u64,
    /// Remaining window; what a transport layer would put in `Retry-After`.
    pub retry_after: Duration,
}

/// Fixed-window counter over the cache's scripted increment. The increment,
/// conditional expiry, and TTL readback happen as one atomic step, so the
/// first `limit` arrivals at the cache are exactly the allowed ones.
#[derive(Debug, Clone)]
pub struct RateLimiter<C> {
    cache: C,
    scope: String,
    limit: u64,
    window: Duration,
}

impl<C> RateLimiter<C>
where
    C: SessionCache,
{
    pub fn new(cache: C, scope: impl Into<String>, limit: u64, window: Duration) -> Self {
        Self {
            cache,
            scope: scope.into(),
            limit,
            window,
        }
    }

    #[tracing::instrument(name = "RateLimiter::check", skip(self))]
    pub async fn check(&self, identifier: &str) -> Result<RateLimitDecision, AuthError> {
        let key = keys::rate_limit(&self.scope, identifier);
        let (current, ttl) = self
            .cache
            .incr_window(&key, self.window)
            .await
            .map_err(|_| AuthError::Internal)?;
        Ok(RateLimitDecision {
            allowed: current <= self.limit,
            current,
            limit: self.limit,
            retry_after: Duration::from_secs(ttl),
        })
    }
}
