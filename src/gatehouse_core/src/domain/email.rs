use std::fmt;
use std::sync::LazyLock;

use regex::Regex;
use serde::{Deserialize, Serialize};

use crate::error::AuthError;

static EMAIL_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^[A-Za-z0-9.+_-]+@[A-Za-z0-9.+_-]+$").expect("email regex is valid"));

const EMAIL_MAX_LEN: usize = 254;

/// A validated email address (`local@domain`, at most 254 characters).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct EmailAddress(String);

impl EmailAddress {
    pub fn parse(input: &str) -> Result<Self, AuthError> {
        let trimmed = input.trim();
        if trimmed.is_empty() {
            return Err(AuthError::EmailRequired);
        }
        if trimmed.len() > EMAIL_MAX_LEN || !EMAIL_RE.is_match(trimmed) {
            return Err(AuthError::EmailInvalid);
        }
        Ok(Self(trimmed.to_owned()))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for EmailAddress {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn accepts_common_shapes() {
        for email in [
            "john@example.com",
            "j.doe+tag@sub.example.co",
            "under_score@host",
        ] {
            assert!(EmailAddress::parse(email).is_ok(), "{email} should parse");
        }
    }

    #[test]
    fn rejects_empty() {
        assert_eq!(EmailAddress::parse(""), Err(AuthError::EmailRequired));
    }

    #[test]
    fn rejects_malformed() {
        for email in ["plain", "two@@at", "spaces in@example.com", "@nodomain"] {
            assert_eq!(EmailAddress::parse(email), Err(AuthError::EmailInvalid));
        }
    }

    #[test]
    fn rejects_overlong() {
        let email = format!("{}@example.com", "a".repeat(250));
        assert_eq!(EmailAddress::parse(&email), Err(AuthError::EmailInvalid));
    }
}
