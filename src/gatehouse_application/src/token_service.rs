use std::fmt::Display;
use std::sync::Arc;
use std::time::Duration;

use chrono::Duration as ChronoDuration;
use uuid::Uuid;

use gatehouse_core::domain::token::{AccessTokenClaims, OneTimeKind, TokenKind};
use gatehouse_core::domain::user::UserId;
use gatehouse_core::error::AuthError;
use gatehouse_core::ports::cache::{CacheError, SessionCache};
use gatehouse_core::ports::clock::Clock;
use gatehouse_core::ports::codec::TokenCodec;
use gatehouse_core::ports::sink::ErrorSink;

use crate::config::TokenConfig;
use crate::keys;

/// Mints, verifies, consumes, and revokes tokens. The cache is the source of
/// truth for liveness: signatures give tamper-evidence and a cheap expiry
/// check, the cache entry gives revocation.
#[derive(Clone)]
pub struct TokenService<X, C, L> {
    codec: X,
    cache: C,
    clock: L,
    config: TokenConfig,
    sink: Arc<dyn ErrorSink>,
}

impl<X, C, L> TokenService<X, C, L>
where
    X: TokenCodec,
    C: SessionCache,
    L: Clock,
{
    pub fn new(codec: X, cache: C, clock: L, config: TokenConfig, sink: Arc<dyn ErrorSink>) -> Self {
        Self {
            codec,
            cache,
            clock,
            config,
            sink,
        }
    }

    pub fn config(&self) -> &TokenConfig {
        &self.config
    }

    pub fn one_time_ttl(&self, kind: OneTimeKind) -> Duration {
        self.config.one_time_ttl(kind)
    }

    fn internal(&self, context: &'static str, error: impl Display) -> AuthError {
        self.sink.capture(context, &error);
        AuthError::Internal
    }

    /// Mint a signed access token and store its cache entry under
    /// `access_token:{userId}:{tokenId}` with TTL = access duration.
    #[tracing::instrument(name = "TokenService::generate_access", skip(self))]
    pub async fn generate_access(&self, user_id: &UserId) -> Result<String, AuthError> {
        let now = self.clock.now();
        let ttl = self.config.access_ttl;
        let lifetime = ChronoDuration::from_std(ttl)
            .map_err(|e| self.internal("access token lifetime out of range", e))?;
        let claims = AccessTokenClaims {
            id: Uuid::new_v4(),
            sub: *user_id,
            iat: now.timestamp(),
            exp: (now + lifetime).timestamp(),
            kind: TokenKind::Access,
        };
        let token = self
            .codec
            .sign_access(&claims)
            .map_err(|e| self.internal("sign access token", e))?;
        self.cache
            .set(
                &keys::access_token(user_id, &claims.id),
                token.clone().into_bytes(),
                ttl,
            )
            .await
            .map_err(|e| self.internal("store access token", e))?;
        Ok(token)
    }

    /// A token passes only if the signature validates, `exp` is in the
    /// future, and the cache entry still exists.
    #[tracing::instrument(name = "TokenService::verify_access", skip_all)]
    pub async fn verify_access(&self, token: &str) -> Result<AccessTokenClaims, AuthError> {
        let claims = self
            .codec
            .decode_access(token)
            .map_err(|_| AuthError::InvalidToken)?;
        if claims.exp <= self.clock.now().timestamp() {
            return Err(AuthError::InvalidToken);
        }
        match self
            .cache
            .get(&keys::access_token(&claims.sub, &claims.id))
            .await
        {
            Ok(_) => Ok(claims),
            Err(CacheError::NotFound) => Err(AuthError::InvalidToken),
            Err(e) => Err(self.internal("load access token", e)),
        }
    }

    /// Deletes the cache entry named by the token's claims. Deleting an
    /// already-absent key is success; an expired token is `InvalidToken`.
    #[tracing::instrument(name = "TokenService::revoke_access", skip_all)]
    pub async fn revoke_access(&self, token: &str) -> Result<(), AuthError> {
        let claims = self
            .codec
            .decode_access(token)
            .map_err(|_| AuthError::InvalidToken)?;
        if claims.exp <= self.clock.now().timestamp() {
            return Err(AuthError::InvalidToken);
        }
        self.cache
            .delete(&keys::access_token(&claims.sub, &claims.id))
            .await
            .map_err(|e| self.internal("revoke access token", e))?;
        Ok(())
    }

    /// Mint a one-time token, superseding any prior live token of the same
    /// kind for this user. Only the digest of the plaintext is stored.
    #[tracing::instrument(name = "TokenService::generate_one_time", skip(self))]
    pub async fn generate_one_time(
        &self,
        kind: OneTimeKind,
        user_id: &UserId,
    ) -> Result<String, AuthError> {
        let token = self.codec.mint_one_time(user_id);
        let raw = self.codec.encode_one_time(&token);
        let digest = self.codec.digest(&raw);
        let ttl = self.config.one_time_ttl(kind);

        // At-most-one live token per (user, kind): drop the previous record
        // through the owner index before storing the new one.
        let owner_key = keys::one_time_owner(kind, user_id);
        match self.cache.get(&owner_key).await {
            Ok(prev) => {
                let prev_digest = String::from_utf8_lossy(&prev).into_owned();
                self.cache
                    .delete(&keys::one_time(kind, &prev_digest))
                    .await
                    .map_err(|e| self.internal("supersede one-time token", e))?;
            }
            Err(CacheError::NotFound) => {}
            Err(e) => return Err(self.internal("read one-time owner index", e)),
        }

        self.cache
            .set(
                &keys::one_time(kind, &digest),
                user_id.to_string().into_bytes(),
                ttl,
            )
            .await
            .map_err(|e| self.internal("store one-time token", e))?;
        self.cache
            .set(&owner_key, digest.into_bytes(), ttl)
            .await
            .map_err(|e| self.internal("store one-time owner index", e))?;

        Ok(raw)
    }

    /// Read-only liveness check; does not consume.
    #[tracing::instrument(name = "TokenService::verify_one_time", skip_all)]
    pub async fn verify_one_time(
        &self,
        kind: OneTimeKind,
        raw: &str,
    ) -> Result<UserId, AuthError> {
        let token = self
            .codec
            .parse_one_time(raw)
            .map_err(|_| AuthError::InvalidToken)?;
        let digest = self.codec.digest(raw);
        match self.cache.get(&keys::one_time(kind, &digest)).await {
            Ok(stored) => {
                // The record must decode to the same user the token names.
                if stored == token.user_id.to_string().into_bytes() {
                    Ok(token.user_id)
                } else {
                    Err(AuthError::InvalidToken)
                }
            }
            Err(CacheError::NotFound) => Err(AuthError::InvalidToken),
            Err(e) => Err(self.internal("load one-time token", e)),
        }
    }

    /// Single-use consumption: delete-then-act. The deletion result (did the
    /// record exist?) is the verification; concurrent consumers racing on
    /// the same token observe at most one success.
    #[tracing::instrument(name = "TokenService::consume_one_time", skip_all)]
    pub async fn consume_one_time(
        &self,
        kind: OneTimeKind,
        raw: &str,
    ) -> Result<UserId, AuthError> {
        let token = self
            .codec
            .parse_one_time(raw)
            .map_err(|_| AuthError::InvalidToken)?;
        let digest = self.codec.digest(raw);
        let existed = self
            .cache
            .delete(&keys::one_time(kind, &digest))
            .await
            .map_err(|e| self.internal("consume one-time token", e))?;
        if !existed {
            return Err(AuthError::InvalidToken);
        }
        // Owner index cleanup is best-effort; a stale index entry only makes
        // the next issuance delete an absent key.
        let _ = self
            .cache
            .delete(&keys::one_time_owner(kind, &token.user_id))
            .await;
        Ok(token.user_id)
    }
}
