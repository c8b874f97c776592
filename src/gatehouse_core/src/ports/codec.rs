use thiserror::Error;

use crate::domain::token::{AccessTokenClaims, OneTimeToken};
use crate::domain::user::UserId;

#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum TokenCodecError {
    /// Bad signature, wrong kind, or broken structure - callers surface all
    /// of these as `InvalidToken`.
    #[error("Malformed token")]
    Malformed,
    #[error("Codec error: {0}")]
    Backend(String),
}

/// Signs and parses compact claim tokens and one-time composite tokens.
/// Non-blocking by contract; expiry is *not* checked here - the token
/// service compares `exp` against the injected clock.
pub trait TokenCodec: Send + Sync {
    fn sign_access(&self, claims: &AccessTokenClaims) -> Result<String, TokenCodecError>;

    /// Validates the signature and the `type` tag, then returns the claims.
    fn decode_access(&self, token: &str) -> Result<AccessTokenClaims, TokenCodecError>;

    /// Draws 16 bytes from a cryptographically secure source.
    fn mint_one_time(&self, user_id: &UserId) -> OneTimeToken;

    /// `base64url(userId "." randomPart)` - the user-visible opaque string.
    fn encode_one_time(&self, token: &OneTimeToken) -> String;

    fn parse_one_time(&self, raw: &str) -> Result<OneTimeToken, TokenCodecError>;

    /// Digest of the user-visible token, used as the cache record key so a
    /// stolen read of the cache never reveals the plaintext.
    fn digest(&self, raw: &str) -> String;
}
