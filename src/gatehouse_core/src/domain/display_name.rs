use std::fmt;

use serde::{Deserialize, Serialize};

use crate::error::AuthError;

const NAME_MAX_CODE_POINTS: usize = 50;

/// A validated display name: 1 to 50 Unicode code points after trimming.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct DisplayName(String);

impl DisplayName {
    pub fn parse(input: &str) -> Result<Self, AuthError> {
        let trimmed = input.trim();
        if trimmed.is_empty() {
            return Err(AuthError::NameRequired);
        }
        if trimmed.chars().count() > NAME_MAX_CODE_POINTS {
            return Err(AuthError::NameTooLong);
        }
        Ok(Self(trimmed.to_owned()))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for DisplayName {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}
