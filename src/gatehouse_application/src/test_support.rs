//! Hand-rolled port doubles shared by the service test modules.

use std::collections::HashMap;
use std::sync::Arc;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::time::Duration;

use tokio::sync::RwLock;
use uuid::Uuid;

use gatehouse_core::domain::email::EmailAddress;
use gatehouse_core::domain::password::{Password, PasswordHash};
use gatehouse_core::domain::token::{AccessTokenClaims, OneTimeToken};
use gatehouse_core::domain::user::{User, UserId};
use gatehouse_core::ports::blobs::{BlobStore, BlobStoreError};
use gatehouse_core::ports::cache::{CacheError, SessionCache};
use gatehouse_core::ports::codec::{TokenCodec, TokenCodecError};
use gatehouse_core::ports::hasher::{HasherError, PasswordHasher};
use gatehouse_core::ports::mailer::{MailTemplate, Mailer, MailerError};
use gatehouse_core::ports::store::{UserStore, UserStoreError};

/// Deterministic codec: claims as JSON, composite as `{userId}.{random}`,
/// digest as a marked copy of the input.
#[derive(Clone, Default)]
pub(crate) struct FakeCodec;

impl TokenCodec for FakeCodec {
    fn sign_access(&self, claims: &AccessTokenClaims) -> Result<String, TokenCodecError> {
        serde_json::to_string(claims).map_err(|e| TokenCodecError::Backend(e.to_string()))
    }

    fn decode_access(&self, token: &str) -> Result<AccessTokenClaims, TokenCodecError> {
        serde_json::from_str(token).map_err(|_| TokenCodecError::Malformed)
    }

    fn mint_one_time(&self, user_id: &UserId) -> OneTimeToken {
        OneTimeToken {
            user_id: *user_id,
            random_part: Uuid::new_v4().simple().to_string(),
        }
    }

    fn encode_one_time(&self, token: &OneTimeToken) -> String {
        format!("{}.{}", token.user_id, token.random_part)
    }

    fn parse_one_time(&self, raw: &str) -> Result<OneTimeToken, TokenCodecError> {
        let (user_id, random_part) = raw.split_once('.').ok_or(TokenCodecError::Malformed)?;
        let user_id = UserId::parse(user_id).map_err(|_| TokenCodecError::Malformed)?;
        Ok(OneTimeToken {
            user_id,
            random_part: random_part.to_owned(),
        })
    }

    fn digest(&self, raw: &str) -> String {
        format!("digest-{raw}")
    }
}

/// Cache double without TTL expiry; windowed counters never expire either.
#[derive(Clone, Default)]
pub(crate) struct MockCache {
    entries: Arc<RwLock<HashMap<String, Vec<u8>>>>,
    counters: Arc<RwLock<HashMap<String, u64>>>,
}

impl MockCache {
    pub(crate) async fn contains(&self, key: &str) -> bool {
        self.entries.read().await.contains_key(key)
    }

    pub(crate) async fn keys_with_prefix(&self, prefix: &str) -> Vec<String> {
        self.entries
            .read()
            .await
            .keys()
            .filter(|k| k.starts_with(prefix))
            .cloned()
            .collect()
    }
}

#[async_trait::async_trait]
impl SessionCache for MockCache {
    async fn set(&self, key: &str, value: Vec<u8>, _ttl: Duration) -> Result<(), CacheError> {
        self.entries.write().await.insert(key.to_owned(), value);
        Ok(())
    }

    async fn get(&self, key: &str) -> Result<Vec<u8>, CacheError> {
        self.entries
            .read()
            .await
            .get(key)
            .cloned()
            .ok_or(CacheError::NotFound)
    }

    async fn delete(&self, key: &str) -> Result<bool, CacheError> {
        Ok(self.entries.write().await.remove(key).is_some())
    }

    async fn delete_by_prefix(&self, prefix: &str) -> Result<(), CacheError> {
        self.entries
            .write()
            .await
            .retain(|key, _| !key.starts_with(prefix));
        Ok(())
    }

    async fn incr_window(&self, key: &str, window: Duration) -> Result<(u64, u64), CacheError> {
        let mut counters = self.counters.write().await;
        let current = counters.entry(key.to_owned()).or_insert(0);
        *current += 1;
        Ok((*current, window.as_secs()))
    }
}

/// User store double enforcing the real uniqueness rules: username always
/// (case-insensitive), email among verified users only.
#[derive(Clone, Default)]
pub(crate) struct MockUserStore {
    users: Arc<RwLock<HashMap<UserId, User>>>,
    pub(crate) get_by_id_calls: Arc<AtomicUsize>,
}

impl MockUserStore {
    pub(crate) async fn get(&self, id: &UserId) -> Option<User> {
        self.users.read().await.get(id).cloned()
    }
}

#[async_trait::async_trait]
impl UserStore for MockUserStore {
    async fn get_by_id(&self, id: &UserId) -> Result<User, UserStoreError> {
        self.get_by_id_calls.fetch_add(1, Ordering::SeqCst);
        self.users
            .read()
            .await
            .get(id)
            .cloned()
            .ok_or(UserStoreError::NotFound)
    }

    async fn get_by_username(&self, username: &str) -> Result<User, UserStoreError> {
        let wanted = username.trim().to_lowercase();
        self.users
            .read()
            .await
            .values()
            .find(|u| u.username.normalized() == wanted)
            .cloned()
            .ok_or(UserStoreError::NotFound)
    }

    async fn get_id_by_verified_email(&self, email: &str) -> Result<UserId, UserStoreError> {
        self.users
            .read()
            .await
            .values()
            .find(|u| u.is_email_verified && u.email.as_str() == email)
            .map(|u| u.id)
            .ok_or(UserStoreError::NotFound)
    }

    async fn create(&self, user: User) -> Result<(), UserStoreError> {
        let mut users = self.users.write().await;
        if users
            .values()
            .any(|u| u.username.normalized() == user.username.normalized())
        {
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
        let mut users = self.users.write().await;
        let user = users.get_mut(id).ok_or(UserStoreError::NotFound)?;
        user.password_hash = password_hash;
        Ok(())
    }

    async fn set_email_verified(&self, id: &UserId) -> Result<(), UserStoreError> {
        let mut users = self.users.write().await;
        let email = users
            .get(id)
            .map(|u| u.email.clone())
            .ok_or(UserStoreError::NotFound)?;
        if users
            .values()
            .any(|u| u.id != *id && u.is_email_verified && u.email == email)
        {
            return Err(UserStoreError::EmailTaken);
        }
        let user = users.get_mut(id).ok_or(UserStoreError::NotFound)?;
        user.is_email_verified = true;
        Ok(())
    }

    async fn update_avatar(&self, id: &UserId, url: &str) -> Result<(), UserStoreError> {
        let mut users = self.users.write().await;
        let user = users.get_mut(id).ok_or(UserStoreError::NotFound)?;
        user.avatar_url = Some(url.to_owned());
        Ok(())
    }

    async fn delete_avatar(&self, id: &UserId) -> Result<(), UserStoreError> {
        let mut users = self.users.write().await;
        let user = users.get_mut(id).ok_or(UserStoreError::NotFound)?;
        user.avatar_url = None;
        Ok(())
    }
}

/// Hasher double with visible hashes and a verify-call counter for the
/// timing-equalization assertion.
#[derive(Clone, Default)]
pub(crate) struct MockHasher {
    pub(crate) verify_calls: Arc<AtomicUsize>,
}

#[async_trait::async_trait]
impl PasswordHasher for MockHasher {
    async fn hash(&self, plain: &Password) -> Result<PasswordHash, HasherError> {
        Ok(PasswordHash::new(format!("hashed:{}", plain.expose())))
    }

    async fn verify(&self, plain: &Password, hash: &PasswordHash) -> Result<bool, HasherError> {
        self.verify_calls.fetch_add(1, Ordering::SeqCst);
        Ok(hash.expose() == format!("hashed:{}", plain.expose()))
    }
}

#[derive(Clone, Default)]
pub(crate) struct MockMailer {
    pub(crate) sent: Arc<RwLock<Vec<(EmailAddress, MailTemplate)>>>,
}

impl MockMailer {
    pub(crate) async fn sent_count(&self) -> usize {
        self.sent.read().await.len()
    }
}

#[async_trait::async_trait]
impl Mailer for MockMailer {
    async fn send(&self, to: &EmailAddress, template: MailTemplate) -> Result<(), MailerError> {
        self.sent.write().await.push((to.clone(), template));
        Ok(())
    }
}

#[derive(Clone, Default)]
pub(crate) struct MockBlobStore {
    pub(crate) objects: Arc<RwLock<HashMap<String, Vec<u8>>>>,
}

#[async_trait::async_trait]
impl BlobStore for MockBlobStore {
    async fn put(
        &self,
        key: &str,
        bytes: Vec<u8>,
        _content_type: &str,
    ) -> Result<String, BlobStoreError> {
        self.objects.write().await.insert(key.to_owned(), bytes);
        Ok(format!("blob://{key}"))
    }

    async fn delete(&self, key: &str) -> Result<(), BlobStoreError> {
        self.objects.write().await.remove(key);
        Ok(())
    }
}
