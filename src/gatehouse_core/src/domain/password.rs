use secrecy::{ExposeSecret, Secret};
use serde::Deserialize;

use crate::error::AuthError;

const PASSWORD_MIN_BYTES: usize = 8;

/// A validated plaintext password. Passwords are never trimmed and never
/// leave the process unhashed.
#[derive(Debug, Clone)]
pub struct Password(Secret<String>);

impl Password {
    pub fn parse(input: Secret<String>) -> Result<Self, AuthError> {
        if input.expose_secret().is_empty() {
            return Err(AuthError::PasswordRequired);
        }
        if input.expose_secret().len() < PASSWORD_MIN_BYTES {
            return Err(AuthError::PasswordTooShort);
        }
        Ok(Self(input))
    }

    /// Parse a password/confirmation pair as used by change and reset flows.
    pub fn parse_with_confirmation(
        input: Secret<String>,
        confirmation: Secret<String>,
    ) -> Result<Self, AuthError> {
        if confirmation.expose_secret().is_empty() {
            return Err(AuthError::PasswordConfirmationRequired);
        }
        if input.expose_secret() != confirmation.expose_secret() {
            return Err(AuthError::PasswordsNotMatch);
        }
        Self::parse(input)
    }

    pub fn expose(&self) -> &str {
        self.0.expose_secret()
    }
}

/// A stored one-way password hash. Treated as a secret so it never shows up
/// in debug output or logs.
#[derive(Debug, Clone, Deserialize)]
#[serde(transparent)]
pub struct PasswordHash(Secret<String>);

impl PasswordHash {
    pub fn new(hash: String) -> Self {
        Self(Secret::new(hash))
    }

    pub fn expose(&self) -> &str {
        self.0.expose_secret()
    }
}
