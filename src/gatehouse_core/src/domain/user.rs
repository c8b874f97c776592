use std::fmt;

use chrono::{DateTime, Utc};
use secrecy::Secret;
use serde::ser::SerializeStruct;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::domain::display_name::DisplayName;
use crate::domain::email::EmailAddress;
use crate::domain::password::{Password, PasswordHash};
use crate::domain::username::Username;
use crate::error::AuthError;

/// Unique user identifier (UUID v4), never reassigned.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct UserId(Uuid);

impl UserId {
    pub fn new() -> Self {
        Self(Uuid::new_v4())
    }

    pub fn parse(input: &str) -> Result<Self, AuthError> {
        Uuid::parse_str(input)
            .map(Self)
            .map_err(|_| AuthError::InvalidUserId)
    }

    pub fn as_uuid(&self) -> &Uuid {
        &self.0
    }
}

impl Default for UserId {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Display for UserId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        self.0.fmt(f)
    }
}

/// Two-valued role consulted by callers for coarse authorization.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    Admin,
    User,
}

impl Role {
    pub fn is_admin(&self) -> bool {
        matches!(self, Self::Admin)
    }
}

/// A validated registration draft. Construction enforces every field rule,
/// so alternative entry points (seeding, admin tooling) cannot bypass them.
#[derive(Debug, Clone)]
pub struct UserDraft {
    pub name: DisplayName,
    pub username: Username,
    pub email: EmailAddress,
    pub password: Password,
}

impl UserDraft {
    pub fn parse(
        name: &str,
        username: &str,
        email: &str,
        password: Secret<String>,
    ) -> Result<Self, AuthError> {
        Ok(Self {
            name: DisplayName::parse(name)?,
            username: Username::parse(username)?,
            email: EmailAddress::parse(email)?,
            password: Password::parse(password)?,
        })
    }
}

/// A persisted user record. Serializes to the JSON shape cached under
/// `user:{id}`; the password hash crosses that boundary, so serialization is
/// implemented by hand to expose the secret deliberately.
#[derive(Debug, Clone, Deserialize)]
pub struct User {
    pub id: UserId,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
    pub name: DisplayName,
    pub username: Username,
    pub email: EmailAddress,
    pub password_hash: PasswordHash,
    pub is_email_verified: bool,
    pub role: Role,
    pub avatar_url: Option<String>,
}

impl User {
    /// Build a fresh, unverified user with the `user` role.
    pub fn new(
        name: DisplayName,
        username: Username,
        email: EmailAddress,
        password_hash: PasswordHash,
        now: DateTime<Utc>,
    ) -> Self {
        Self {
            id: UserId::new(),
            created_at: now,
            updated_at: now,
            name,
            username,
            email,
            password_hash,
            is_email_verified: false,
            role: Role::User,
            avatar_url: None,
        }
    }
}

impl Serialize for User {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: serde::Serializer,
    {
        let mut state = serializer.serialize_struct("User", 10)?;
        state.serialize_field("id", &self.id)?;
        state.serialize_field("created_at", &self.created_at)?;
        state.serialize_field("updated_at", &self.updated_at)?;
        state.serialize_field("name", &self.name)?;
        state.serialize_field("username", &self.username)?;
        state.serialize_field("email", &self.email)?;
        state.serialize_field("password_hash", self.password_hash.expose())?;
        state.serialize_field("is_email_verified", &self.is_email_verified)?;
        state.serialize_field("role", &self.role)?;
        state.serialize_field("avatar_url", &self.avatar_url)?;
        state.end()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn draft() -> UserDraft {
        UserDraft::parse(
            "John Doe",
            "john",
            "john@example.com",
            Secret::new("secret123".to_owned()),
        )
        .unwrap()
    }

    #[test]
    fn draft_parse_validates_every_field() {
        let password = Secret::new("secret123".to_owned());
        assert_eq!(
            UserDraft::parse("", "john", "john@example.com", password.clone()).unwrap_err(),
            AuthError::NameRequired
        );
        assert_eq!(
            UserDraft::parse("John", "jo", "john@example.com", password.clone()).unwrap_err(),
            AuthError::UsernameTooShort
        );
        assert_eq!(
            UserDraft::parse("John", "john", "not-an-email", password).unwrap_err(),
            AuthError::EmailInvalid
        );
        assert_eq!(
            UserDraft::parse(
                "John",
                "john",
                "john@example.com",
                Secret::new("short".to_owned())
            )
            .unwrap_err(),
            AuthError::PasswordTooShort
        );
    }

    #[test]
    fn new_users_start_unverified_with_user_role() {
        let d = draft();
        let user = User::new(
            d.name,
            d.username,
            d.email,
            PasswordHash::new("$2b$10$hash".to_owned()),
            Utc::now(),
        );
        assert!(!user.is_email_verified);
        assert_eq!(user.role, Role::User);
        assert!(user.avatar_url.is_none());
    }

    #[test]
    fn user_json_round_trips_through_the_cache_encoding() {
        let d = draft();
        let user = User::new(
            d.name,
            d.username,
            d.email,
            PasswordHash::new("$2b$10$hash".to_owned()),
            Utc::now(),
        );
        let json = serde_json::to_string(&user).unwrap();
        let decoded: User = serde_json::from_str(&json).unwrap();
        assert_eq!(decoded.id, user.id);
        assert_eq!(decoded.username, user.username);
        assert_eq!(decoded.password_hash.expose(), user.password_hash.expose());
        assert_eq!(decoded.role, user.role);
    }

    #[test]
    fn invalid_user_id_strings_are_rejected() {
        assert_eq!(UserId::parse("not-a-uuid"), Err(AuthError::InvalidUserId));
        let id = UserId::new();
        assert_eq!(UserId::parse(&id.to_string()), Ok(id));
    }
}
