use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::domain::user::UserId;

/// Kind tag carried inside signed compact tokens. Parsing refuses a token
/// whose kind does not match the expected one even when the signature checks
/// out.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TokenKind {
    Access,
}

/// Claims of a signed access token. A token is live only while its cache
/// entry exists, its signature validates and `exp` is in the future.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AccessTokenClaims {
    /// Token identifier (jti); names the cache entry together with `sub`.
    pub id: Uuid,
    pub sub: UserId,
    pub iat: i64,
    pub exp: i64,
    #[serde(rename = "type")]
    pub kind: TokenKind,
}

/// The two one-time token kinds, each with its own TTL.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OneTimeKind {
    PasswordReset,
    EmailVerification,
}

impl OneTimeKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::PasswordReset => "password_reset",
            Self::EmailVerification => "email_verification",
        }
    }
}

/// Decoded form of a one-time token: the owning user plus 128 bits of
/// entropy, base64url-encoded. The wire form is produced by the token codec;
/// the plaintext is never stored server-side, only its digest.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OneTimeToken {
    pub user_id: UserId,
    pub random_part: String,
}
