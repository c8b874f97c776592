use std::fmt;
use std::sync::LazyLock;

use regex::Regex;
use serde::{Deserialize, Serialize};

use crate::error::AuthError;

static USERNAME_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^[A-Za-z0-9_]+$").expect("username regex is valid"));

const USERNAME_MIN: usize = 4;
const USERNAME_MAX: usize = 15;

/// A validated username. Surrounding whitespace is trimmed, the original
/// casing is preserved, and uniqueness comparisons use [`Username::normalized`].
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Username(String);

impl Username {
    pub fn parse(input: &str) -> Result<Self, AuthError> {
        let trimmed = input.trim();
        if trimmed.is_empty() {
            return Err(AuthError::UsernameRequired);
        }
        if trimmed.chars().count() < USERNAME_MIN {
            return Err(AuthError::UsernameTooShort);
        }
        if trimmed.chars().count() > USERNAME_MAX {
            return Err(AuthError::UsernameTooLong);
        }
        if !USERNAME_RE.is_match(trimmed) {
            return Err(AuthError::UsernameInvalid);
        }
        Ok(Self(trimmed.to_owned()))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Case-folded form used for uniqueness checks and lookups.
    pub fn normalized(&self) -> String {
        self.0.to_lowercase()
    }
}

impl fmt::Display for Username {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use quickcheck_macros::quickcheck;

    #[test]
    fn accepts_valid_usernames() {
        for name in ["john", "John_Doe", "user1234", "a_b_c_d"] {
            assert!(Username::parse(name).is_ok(), "{name} should parse");
        }
    }

    #[test]
    fn trims_surrounding_whitespace() {
        let username = Username::parse("  john \t").unwrap();
        assert_eq!(username.as_str(), "john");
    }

    #[test]
    fn rejects_empty() {
        assert_eq!(Username::parse("   "), Err(AuthError::UsernameRequired));
    }

    #[test]
    fn rejects_out_of_bounds_lengths() {
        assert_eq!(Username::parse("abc"), Err(AuthError::UsernameTooShort));
        assert_eq!(
            Username::parse("abcdefghijklmnop"),
            Err(AuthError::UsernameTooLong)
        );
    }

    #[test]
    fn rejects_illegal_characters() {
        for name in ["john doe", "john-doe", "jöhn", "john!"] {
            assert_eq!(Username::parse(name), Err(AuthError::UsernameInvalid));
        }
    }

    #[test]
    fn normalization_is_case_insensitive_but_storage_preserves_case() {
        let a = Username::parse("John").unwrap();
        let b = Username::parse("jOHN").unwrap();
        assert_eq!(a.normalized(), b.normalized());
        assert_eq!(a.as_str(), "John");
    }

    #[quickcheck]
    fn parsed_usernames_match_the_charset(input: String) -> bool {
        match Username::parse(&input) {
            Ok(username) => username
                .as_str()
                .chars()
                .all(|c| c.is_ascii_alphanumeric() || c == '_'),
            Err(_) => true,
        }
    }
}
