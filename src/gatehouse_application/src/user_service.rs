use std::fmt::Display;
use std::sync::Arc;
use std::time::Duration;

use secrecy::Secret;

use gatehouse_core::domain::password::Password;
use gatehouse_core::domain::token::OneTimeKind;
use gatehouse_core::domain::user::{User, UserDraft, UserId};
use gatehouse_core::error::AuthError;
use gatehouse_core::ports::blobs::BlobStore;
use gatehouse_core::ports::cache::{CacheError, SessionCache};
use gatehouse_core::ports::clock::Clock;
use gatehouse_core::ports::codec::TokenCodec;
use gatehouse_core::ports::hasher::PasswordHasher;
use gatehouse_core::ports::mailer::{MailTemplate, Mailer};
use gatehouse_core::ports::sink::ErrorSink;
use gatehouse_core::ports::store::{UserStore, UserStoreError};

use crate::keys;
use crate::token_service::TokenService;

/// TTL of the cache-aside user record under `user:{id}`.
const USER_CACHE_TTL: Duration = Duration::from_secs(5 * 60);

/// User lifecycle: creation with inline validation, cache-aside reads,
/// password and email-verification mutations, avatars.
#[derive(Clone)]
pub struct UserService<S, C, H, M, B, X, L> {
    store: S,
    cache: C,
    hasher: H,
    mailer: M,
    blobs: B,
    tokens: TokenService<X, C, L>,
    clock: L,
    sink: Arc<dyn ErrorSink>,
}

impl<S, C, H, M, B, X, L> UserService<S, C, H, M, B, X, L>
where
    S: UserStore,
    C: SessionCache,
    H: PasswordHasher,
    M: Mailer,
    B: BlobStore,
    X: TokenCodec,
    L: Clock,
{
    #[allow(clippy::too_many_arguments)]
    pub fn new(
        store: S,
        cache: C,
        hasher: H,
        mailer: M,
        blobs: B,
        tokens: TokenService<X, C, L>,
        clock: L,
        sink: Arc<dyn ErrorSink>,
    ) -> Self {
        Self {
            store,
            cache,
            hasher,
            mailer,
            blobs,
            tokens,
            clock,
            sink,
        }
    }

    fn internal(&self, context: &'static str, error: impl Display) -> AuthError {
        self.sink.capture(context, &error);
        AuthError::Internal
    }

    fn map_store(&self, error: UserStoreError) -> AuthError {
        match error {
            UserStoreError::NotFound => AuthError::UserNotFound,
            UserStoreError::UsernameTaken => AuthError::UsernameConflict,
            UserStoreError::EmailTaken => AuthError::EmailConflict,
            UserStoreError::Backend(message) => self.internal("user store", message),
        }
    }

    /// Cache-aside lookup. Cache trouble degrades to the store; a poisoned
    /// cache record is treated as a miss.
    #[tracing::instrument(name = "UserService::get_by_id", skip(self))]
    pub async fn get_by_id(&self, id: &UserId) -> Result<User, AuthError> {
        let key = keys::user(id);
        match self.cache.get(&key).await {
            Ok(bytes) => match serde_json::from_slice::<User>(&bytes) {
                Ok(user) => return Ok(user),
                Err(e) => self.sink.capture("decode cached user", &e),
            },
            Err(CacheError::NotFound) => {}
            Err(e) => self.sink.capture("read user cache", &e),
        }

        let user = self.store.get_by_id(id).await.map_err(|e| self.map_store(e))?;

        match serde_json::to_vec(&user) {
            Ok(bytes) => {
                if let Err(e) = self.cache.set(&key, bytes, USER_CACHE_TTL).await {
                    self.sink.capture("write user cache", &e);
                }
            }
            Err(e) => self.sink.capture("encode user for cache", &e),
        }
        Ok(user)
    }

    /// No cache on this path; username lookups back credential checks and
    /// must always see fresh data.
    #[tracing::instrument(name = "UserService::get_by_username", skip(self))]
    pub async fn get_by_username(&self, username: &str) -> Result<User, AuthError> {
        self.store
            .get_by_username(username.trim())
            .await
            .map_err(|e| self.map_store(e))
    }

    /// Create a user from a validated draft. Availability pre-checks give
    /// friendly errors; the store's unique constraint is the backstop for
    /// races with a concurrent create.
    #[tracing::instrument(name = "UserService::register", skip_all, fields(username = %draft.username))]
    pub async fn register(&self, draft: UserDraft) -> Result<User, AuthError> {
        match self.store.get_by_username(draft.username.as_str()).await {
            Ok(_) => return Err(AuthError::UsernameConflict),
            Err(UserStoreError::NotFound) => {}
            Err(e) => return Err(self.map_store(e)),
        }
        // Only a *verified* owner blocks the email; unverified duplicates
        // are allowed.
        match self
            .store
            .get_id_by_verified_email(draft.email.as_str())
            .await
        {
            Ok(_) => return Err(AuthError::EmailConflict),
            Err(UserStoreError::NotFound) => {}
            Err(e) => return Err(self.map_store(e)),
        }

        let password_hash = self
            .hasher
            .hash(&draft.password)
            .await
            .map_err(|e| self.internal("hash password", e))?;
        let user = User::new(
            draft.name,
            draft.username,
            draft.email,
            password_hash,
            self.clock.now(),
        );
        self.store
            .create(user.clone())
            .await
            .map_err(|e| self.map_store(e))?;

        self.send_registration_mail(&user).await;
        Ok(user)
    }

    /// Welcome and initial verification mail. Best-effort: a mail outage
    /// must not fail the registration.
    async fn send_registration_mail(&self, user: &User) {
        if let Err(e) = self
            .mailer
            .send(
                &user.email,
                MailTemplate::Hello {
                    name: user.name.to_string(),
                },
            )
            .await
        {
            self.sink.capture("send welcome mail", &e);
        }

        match self
            .tokens
            .generate_one_time(OneTimeKind::EmailVerification, &user.id)
            .await
        {
            Ok(token) => {
                if let Err(e) = self
                    .mailer
                    .send(
                        &user.email,
                        MailTemplate::VerifyEmail {
                            token,
                            ttl: self.tokens.one_time_ttl(OneTimeKind::EmailVerification),
                        },
                    )
                    .await
                {
                    self.sink.capture("send verification mail", &e);
                }
            }
            Err(e) => self.sink.capture("mint verification token", &e),
        }
    }

    /// Validate, then apply the new password. The user is loaded first for
    /// freshness and existence.
    #[tracing::instrument(name = "UserService::update_password", skip(self, password, confirmation))]
    pub async fn update_password(
        &self,
        id: &UserId,
        password: Secret<String>,
        confirmation: Secret<String>,
    ) -> Result<(), AuthError> {
        let password = Password::parse_with_confirmation(password, confirmation)?;
        self.store.get_by_id(id).await.map_err(|e| self.map_store(e))?;
        self.replace_password(id, password).await
    }

    /// Hash and persist an already-validated password, then invalidate the
    /// cached record and revoke every live session of the user. Password
    /// change logs the user out everywhere.
    pub async fn replace_password(&self, id: &UserId, password: Password) -> Result<(), AuthError> {
        let password_hash = self
            .hasher
            .hash(&password)
            .await
            .map_err(|e| self.internal("hash password", e))?;
        self.store
            .update_password(id, password_hash)
            .await
            .map_err(|e| self.map_store(e))?;
        self.cache
            .delete(&keys::user(id))
            .await
            .map_err(|e| self.internal("invalidate user cache", e))?;
        self.cache
            .delete_by_prefix(&keys::access_token_prefix(id))
            .await
            .map_err(|e| self.internal("revoke user sessions", e))?;
        Ok(())
    }

    #[tracing::instrument(name = "UserService::resend_email_verification", skip(self))]
    pub async fn resend_email_verification(&self, id: &UserId) -> Result<(), AuthError> {
        let user = self.store.get_by_id(id).await.map_err(|e| self.map_store(e))?;
        if user.is_email_verified {
            return Err(AuthError::EmailAlreadyVerified);
        }
        let token = self
            .tokens
            .generate_one_time(OneTimeKind::EmailVerification, &user.id)
            .await?;
        self.mailer
            .send(
                &user.email,
                MailTemplate::VerifyEmail {
                    token,
                    ttl: self.tokens.one_time_ttl(OneTimeKind::EmailVerification),
                },
            )
            .await
            .map_err(|e| self.internal("send verification mail", e))
    }

    /// Consume a verification token and flag the row. The token is burned
    /// even when the flag write fails; the user can request a fresh one.
    #[tracing::instrument(name = "UserService::verify_email", skip_all)]
    pub async fn verify_email(&self, token: &str) -> Result<UserId, AuthError> {
        let user_id = self
            .tokens
            .consume_one_time(OneTimeKind::EmailVerification, token)
            .await?;
        self.store
            .set_email_verified(&user_id)
            .await
            .map_err(|e| self.map_store(e))?;
        self.invalidate_cached(&user_id).await;
        Ok(user_id)
    }

    /// Store the avatar under a deterministic key and record its URL.
    #[tracing::instrument(name = "UserService::upload_avatar", skip(self, bytes))]
    pub async fn upload_avatar(
        &self,
        id: &UserId,
        bytes: Vec<u8>,
        extension: &str,
        content_type: &str,
    ) -> Result<String, AuthError> {
        self.store.get_by_id(id).await.map_err(|e| self.map_store(e))?;
        let key = avatar_key(id, extension);
        let url = self
            .blobs
            .put(&key, bytes, content_type)
            .await
            .map_err(|e| self.internal("upload avatar", e))?;
        self.store
            .update_avatar(id, &url)
            .await
            .map_err(|e| self.map_store(e))?;
        self.invalidate_cached(id).await;
        Ok(url)
    }

    #[tracing::instrument(name = "UserService::delete_avatar", skip(self))]
    pub async fn delete_avatar(&self, id: &UserId) -> Result<(), AuthError> {
        let user = self.store.get_by_id(id).await.map_err(|e| self.map_store(e))?;
        if let Some(url) = &user.avatar_url {
            if let Some(pos) = url.rfind("avatars/") {
                self.blobs
                    .delete(&url[pos..])
                    .await
                    .map_err(|e| self.internal("delete avatar object", e))?;
            }
        }
        self.store
            .delete_avatar(id)
            .await
            .map_err(|e| self.map_store(e))?;
        self.invalidate_cached(id).await;
        Ok(())
    }

    async fn invalidate_cached(&self, id: &UserId) {
        if let Err(e) = self.cache.delete(&keys::user(id)).await {
            self.sink.capture("invalidate user cache", &e);
        }
    }
}

fn avatar_key(id: &UserId, extension: &str) -> String {
    format!("avatars/{id}.{extension}")
}
