use async_trait::async_trait;

use gatehouse_core::domain::password::{Password, PasswordHash};
use gatehouse_core::ports::hasher::{HasherError, PasswordHasher};

/// Bcrypt-backed password hashing. Both operations are CPU-bound, so they
/// run on the blocking pool with the current span carried across.
#[derive(Debug, Clone, Copy)]
pub struct BcryptHasher {
    cost: u32,
}

impl BcryptHasher {
    pub const DEFAULT_COST: u32 = 10;

    pub fn new(cost: u32) -> Self {
        Self { cost }
    }
}

impl Default for BcryptHasher {
    fn default() -> Self {
        Self::new(Self::DEFAULT_COST)
    }
}

#[async_trait]
impl PasswordHasher for BcryptHasher {
    #[tracing::instrument(name = "BcryptHasher::hash", skip_all)]
    async fn hash(&self, plain: &Password) -> Result<PasswordHash, HasherError> {
        let plain = plain.expose().to_owned();
        let cost = self.cost;
        let current_span = tracing::Span::current();

        let hash = tokio::task::spawn_blocking(move || {
            current_span.in_scope(|| bcrypt::hash(plain, cost))
        })
        .await
        .map_err(|e| HasherError::Backend(e.to_string()))?
        .map_err(|e| HasherError::Backend(e.to_string()))?;

        Ok(PasswordHash::new(hash))
    }

    #[tracing::instrument(name = "BcryptHasher::verify", skip_all)]
    async fn verify(&self, plain: &Password, hash: &PasswordHash) -> Result<bool, HasherError> {
        let plain = plain.expose().to_owned();
        let hash = hash.expose().to_owned();
        let current_span = tracing::Span::current();

        tokio::task::spawn_blocking(move || {
            current_span.in_scope(|| bcrypt::verify(plain, &hash))
        })
        .await
        .map_err(|e| HasherError::Backend(e.to_string()))?
        .map_err(|e| HasherError::Backend(e.to_string()))
    }
}
