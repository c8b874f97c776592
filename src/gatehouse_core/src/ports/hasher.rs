use async_trait::async_trait;
use thiserror::Error;

use crate::domain::password::{Password, PasswordHash};

#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum HasherError {
    #[error("Hashing error: {0}")]
    Backend(String),
}

/// One-way password hashing. Implementations are CPU-bound and must run the
/// work off the async executor; verification is constant-time.
#[async_trait]
pub trait PasswordHasher: Send + Sync {
    async fn hash(&self, plain: &Password) -> Result<PasswordHash, HasherError>;

    /// Returns whether the candidate matches. Callers collapse `false` into
    /// `InvalidCredentials`; only backend failures surface as errors.
    async fn verify(&self, plain: &Password, hash: &PasswordHash) -> Result<bool, HasherError>;
}
