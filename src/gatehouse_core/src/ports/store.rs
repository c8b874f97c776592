use async_trait::async_trait;
use thiserror::Error;

use crate::domain::password::PasswordHash;
use crate::domain::user::{User, UserId};

#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum UserStoreError {
    #[error("User not found")]
    NotFound,
    #[error("Username is already taken")]
    UsernameTaken,
    #[error("Email is already taken")]
    EmailTaken,
    #[error("Store error: {0}")]
    Backend(String),
}

/// Typed wrapper over the relational user store. Uniqueness constraints:
/// `username` always (case-insensitive), `email` among verified users only.
#[async_trait]
pub trait UserStore: Send + Sync {
    async fn get_by_id(&self, id: &UserId) -> Result<User, UserStoreError>;

    /// Case-insensitive username match; the stored casing is returned.
    async fn get_by_username(&self, username: &str) -> Result<User, UserStoreError>;

    async fn get_id_by_verified_email(&self, email: &str) -> Result<UserId, UserStoreError>;

    /// Fails `UsernameTaken` on the username unique-key violation.
    async fn create(&self, user: User) -> Result<(), UserStoreError>;

    async fn update_password(
        &self,
        id: &UserId,
        password_hash: PasswordHash,
    ) -> Result<(), UserStoreError>;

    /// Sets the verified flag; fails `EmailTaken` when a different user
    /// already owns the email in verified state.
    async fn set_email_verified(&self, id: &UserId) -> Result<(), UserStoreError>;

    async fn update_avatar(&self, id: &UserId, url: &str) -> Result<(), UserStoreError>;

    async fn delete_avatar(&self, id: &UserId) -> Result<(), UserStoreError>;
}
