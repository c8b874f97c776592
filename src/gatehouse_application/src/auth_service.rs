use std::fmt::Display;
use std::sync::Arc;

use secrecy::Secret;

use gatehouse_core::domain::email::EmailAddress;
use gatehouse_core::domain::password::{Password, PasswordHash};
use gatehouse_core::domain::token::{AccessTokenClaims, OneTimeKind};
use gatehouse_core::domain::user::{User, UserDraft};
use gatehouse_core::error::AuthError;
use gatehouse_core::ports::blobs::BlobStore;
use gatehouse_core::ports::cache::SessionCache;
use gatehouse_core::ports::clock::Clock;
use gatehouse_core::ports::codec::TokenCodec;
use gatehouse_core::ports::hasher::PasswordHasher;
use gatehouse_core::ports::mailer::{MailTemplate, Mailer};
use gatehouse_core::ports::sink::ErrorSink;
use gatehouse_core::ports::store::{UserStore, UserStoreError};

use crate::token_service::TokenService;
use crate::user_service::UserService;

/// Fixed input for the precomputed fallback hash used to equalize login
/// timing between unknown-user and wrong-password.
const FALLBACK_PASSWORD: &str = "gatehouse-timing-equalizer";

#[derive(Debug, Clone)]
pub struct LoginResponse {
    pub user: User,
    pub access_token: String,
}

/// Orchestrates login, registration, logout, and the password-reset flow.
#[derive(Clone)]
pub struct AuthService<S, C, H, M, B, X, L> {
    users: UserService<S, C, H, M, B, X, L>,
    tokens: TokenService<X, C, L>,
    store: S,
    hasher: H,
    mailer: M,
    fallback_hash: PasswordHash,
    sink: Arc<dyn ErrorSink>,
}

impl<S, C, H, M, B, X, L> AuthService<S, C, H, M, B, X, L>
where
    S: UserStore,
    C: SessionCache,
    H: PasswordHasher,
    M: Mailer,
    B: BlobStore,
    X: TokenCodec,
    L: Clock,
{
    /// Precomputes the fallback hash so that a login against an unknown
    /// username still pays for one full verification.
    #[allow(clippy::too_many_arguments)]
    pub async fn new(
        users: UserService<S, C, H, M, B, X, L>,
        tokens: TokenService<X, C, L>,
        store: S,
        hasher: H,
        mailer: M,
        sink: Arc<dyn ErrorSink>,
    ) -> Result<Self, AuthError> {
        let fallback = Password::parse(Secret::new(FALLBACK_PASSWORD.to_owned()))
            .expect("fallback password is valid");
        let fallback_hash = hasher.hash(&fallback).await.map_err(|e| {
            sink.capture("precompute fallback hash", &e);
            AuthError::Internal
        })?;
        Ok(Self {
            users,
            tokens,
            store,
            hasher,
            mailer,
            fallback_hash,
            sink,
        })
    }

    pub fn users(&self) -> &UserService<S, C, H, M, B, X, L> {
        &self.users
    }

    pub fn tokens(&self) -> &TokenService<X, C, L> {
        &self.tokens
    }

    fn internal(&self, context: &'static str, error: impl Display) -> AuthError {
        self.sink.capture(context, &error);
        AuthError::Internal
    }

    /// Credential login. Unknown-user and wrong-password are deliberately
    /// indistinguishable: both fail `InvalidCredentials`, and the password
    /// verification runs in both cases.
    #[tracing::instrument(name = "AuthService::login", skip(self, password))]
    pub async fn login(
        &self,
        username: &str,
        password: Secret<String>,
    ) -> Result<LoginResponse, AuthError> {
        let password = Password::parse(password).map_err(|_| AuthError::InvalidCredentials)?;
        let user = match self.store.get_by_username(username.trim()).await {
            Ok(user) => Some(user),
            Err(UserStoreError::NotFound) => None,
            Err(e) => return Err(self.internal("look up user for login", e)),
        };

        let hash = user
            .as_ref()
            .map(|u| u.password_hash.clone())
            .unwrap_or_else(|| self.fallback_hash.clone());
        let matched = self
            .hasher
            .verify(&password, &hash)
            .await
            .map_err(|e| self.internal("verify password", e))?;

        match user {
            Some(user) if matched => {
                let access_token = self.tokens.generate_access(&user.id).await?;
                Ok(LoginResponse { user, access_token })
            }
            _ => Err(AuthError::InvalidCredentials),
        }
    }

    /// Register and immediately issue a session; same response shape as
    /// login.
    #[tracing::instrument(name = "AuthService::register", skip_all)]
    pub async fn register(&self, draft: UserDraft) -> Result<LoginResponse, AuthError> {
        let user = self.users.register(draft).await?;
        let access_token = self.tokens.generate_access(&user.id).await?;
        Ok(LoginResponse { user, access_token })
    }

    /// Revoke the session named by the bearer token. Idempotent.
    #[tracing::instrument(name = "AuthService::logout", skip_all)]
    pub async fn logout(&self, token: &str) -> Result<(), AuthError> {
        self.tokens.revoke_access(token).await
    }

    /// Bearer-token check for authenticated requests.
    pub async fn verify_access(&self, token: &str) -> Result<AccessTokenClaims, AuthError> {
        self.tokens.verify_access(token).await
    }

    /// The current user, resolved from a bearer token.
    pub async fn current_user(&self, token: &str) -> Result<User, AuthError> {
        let claims = self.tokens.verify_access(token).await?;
        self.users.get_by_id(&claims.sub).await
    }

    /// Initiate a password reset. Succeeds without disclosure when the email
    /// does not resolve to a verified account.
    #[tracing::instrument(name = "AuthService::send_password_reset_email", skip_all)]
    pub async fn send_password_reset_email(&self, email: &str) -> Result<(), AuthError> {
        let email = EmailAddress::parse(email)?;
        let user_id = match self.store.get_id_by_verified_email(email.as_str()).await {
            Ok(id) => id,
            Err(UserStoreError::NotFound) => return Ok(()),
            Err(e) => return Err(self.internal("resolve email for reset", e)),
        };
        let token = self
            .tokens
            .generate_one_time(OneTimeKind::PasswordReset, &user_id)
            .await?;
        self.mailer
            .send(
                &email,
                MailTemplate::ResetPassword {
                    token,
                    ttl: self.tokens.one_time_ttl(OneTimeKind::PasswordReset),
                },
            )
            .await
            .map_err(|e| self.internal("send reset mail", e))
    }

    /// Liveness probe for a reset link. Read-only; does not consume.
    pub async fn verify_password_reset_token(&self, token: &str) -> Result<(), AuthError> {
        self.tokens
            .verify_one_time(OneTimeKind::PasswordReset, token)
            .await
            .map(|_| ())
    }

    /// Execute a reset. The token is consumed *first*: if validation or the
    /// store write fails afterwards, the token stays burned and the caller
    /// must request a new one - single-use is stronger than retryability.
    #[tracing::instrument(name = "AuthService::reset_password", skip_all)]
    pub async fn reset_password(
        &self,
        token: &str,
        password: Secret<String>,
        confirmation: Secret<String>,
    ) -> Result<(), AuthError> {
        let user_id = self
            .tokens
            .consume_one_time(OneTimeKind::PasswordReset, token)
            .await?;
        let password = Password::parse_with_confirmation(password, confirmation)?;
        self.users.replace_password(&user_id, password).await
    }
}
