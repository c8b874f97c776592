use std::collections::HashMap;
use std::sync::Arc;

use async_trait::async_trait;
use tokio::sync::RwLock;

use gatehouse_core::domain::password::PasswordHash;
use gatehouse_core::domain::user::{User, UserId};
use gatehouse_core::ports::clock::Clock;
use gatehouse_core::ports::store::{UserStore, UserStoreError};

/// User store held in process memory, enforcing the same uniqueness rules as
/// the Postgres schema: usernames case-insensitively, emails among verified
/// users only.
#[derive(Clone)]
pub struct InMemoryUserStore<L> {
    clock: L,
    users: Arc<RwLock<HashMap<UserId, User>>>,
}

impl<L> InMemoryUserStore<L>
where
    L: Clock,
{
    pub fn new(clock: L) -> Self {
        Self {
            clock,
            users: Arc::new(RwLock::new(HashMap::new())),
        }
    }
}

#[async_trait]
impl<L> UserStore for InMemoryUserStore<L>
where
    L: Clock + Clone,
{
    async fn get_by_id(&self, id: &UserId) -> Result<User, UserStoreError> {
        self.users
            .read()
            .await
            .get(id)
            .cloned()
            .ok_or(UserStoreError::NotFound)
    }

    async fn get_by_username(&self, username: &str) -> Result<User, UserStoreError> {
        let wanted = username.to_lowercase();
        self.users
            .read()
            .await
            .values()
            .find(|user| user.username.normalized() == wanted)
            .cloned()
            .ok_or(UserStoreError::NotFound)
    }

    async fn get_id_by_verified_email(&self, email: &str) -> Result<UserId, UserStoreError> {
        self.users
            .read()
            .await
            .values()
            .find(|user| user.is_email_verified && user.email.as_str() == email)
            .map(|user| user.id)
            .ok_or(UserStoreError::NotFound)
    }

    async fn create(&self, user: User) -> Result<(), UserStoreError> {
        let mut users = self.users.write().await;
        let username = user.username.normalized();
        if users.values().any(|u| u.username.normalized() == username) {
            return Err(UserStoreError::UsernameTaken);
        }
        users.insert(user.id, user);
        Ok(())
    }

    async fn update_password(
        &self,
        id: &UserId,
        password_hash: PasswordHash,
    ) -> Result<(), UserStoreError> {
        let now = self.clock.now();
        let mut users = self.users.write().await;
        let user = users.get_mut(id).ok_or(UserStoreError::NotFound)?;
        user.password_hash = password_hash;
        user.updated_at = now;
        Ok(())
    }

    async fn set_email_verified(&self, id: &UserId) -> Result<(), UserStoreError> {
        let now = self.clock.now();
        let mut users = self.users.write().await;
        let email = users
            .get(id)
            .ok_or(UserStoreError::NotFound)?
            .email
            .as_str()
            .to_owned();
        if users
            .values()
            .any(|u| u.id != *id && u.is_email_verified && u.email.as_str() == email)
        {
            return Err(UserStoreError::EmailTaken);
        }
        let user = users.get_mut(id).ok_or(UserStoreError::NotFound)?;
        user.is_email_verified = true;
        user.updated_at = now;
        Ok(())
    }

    async fn update_avatar(&self, id: &UserId, url: &str) -> Result<(), UserStoreError> {
        let now = self.clock.now();
        let mut users = self.users.write().await;
        let user = users.get_mut(id).ok_or(UserStoreError::NotFound)?;
        user.avatar_url = Some(url.to_owned());
        user.updated_at = now;
        Ok(())
    }

    async fn delete_avatar(&self, id: &UserId) -> Result<(), UserStoreError> {
        let now = self.clock.now();
        let mut users = self.users.write().await;
        let user = users.get_mut(id).ok_or(UserStoreError::NotFound)?;
        user.avatar_url = None;
        user.updated_at = now;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    use chrono::Utc;
    use gatehouse_core::domain::user::UserDraft;
    use gatehouse_core::ports::clock::{ManualClock, SystemClock};
    use secrecy::Secret;

    fn user(username: &str, email: &str) -> User {
        let draft = UserDraft::parse(
            "John Doe",
            username,
            email,
            Secret::new("secret123".to_owned()),
        )
        .unwrap();
        User::new(
            draft.name,
            draft.username,
            draft.email,
            PasswordHash::new("$2b$10$hash".to_owned()),
            Utc::now(),
        )
    }

    #[tokio::test]
    async fn username_conflicts_are_case_insensitive() {
        let store = InMemoryUserStore::new(SystemClock);
        store.create(user("John", "a@example.com")).await.unwrap();
        assert_eq!(
            store.create(user("john", "b@example.com")).await,
            Err(UserStoreError::UsernameTaken)
        );
    }

    #[tokio::test]
    async fn lookup_by_username_ignores_case_and_keeps_stored_casing() {
        let store = InMemoryUserStore::new(SystemClock);
        store.create(user("John", "a@example.com")).await.unwrap();
        let found = store.get_by_username("JOHN").await.unwrap();
        assert_eq!(found.username.as_str(), "John");
    }

    #[tokio::test]
    async fn only_one_user_may_verify_an_email() {
        let store = InMemoryUserStore::new(SystemClock);
        let first = user("john", "shared@example.com");
        let second = user("jane", "shared@example.com");
        let (first_id, second_id) = (first.id, second.id);
        store.create(first).await.unwrap();
        store.create(second).await.unwrap();

        store.set_email_verified(&first_id).await.unwrap();
        assert_eq!(
            store.set_email_verified(&second_id).await,
            Err(UserStoreError::EmailTaken)
        );
        assert_eq!(
            store
                .get_id_by_verified_email("shared@example.com")
                .await
                .unwrap(),
            first_id
        );
    }

    #[tokio::test]
    async fn mutations_bump_updated_at() {
        let clock = ManualClock::new(Utc::now());
        let store = InMemoryUserStore::new(clock.clone());
        let user = user("john", "a@example.com");
        let id = user.id;
        let created = user.updated_at;
        store.create(user).await.unwrap();

        clock.advance(chrono::Duration::minutes(5));
        store
            .update_password(&id, PasswordHash::new("$2b$10$other".to_owned()))
            .await
            .unwrap();
        let fetched = store.get_by_id(&id).await.unwrap();
        assert!(fetched.updated_at > created);
    }
}
