//! Cache key schema. Keys are built here and nowhere else so that every
//! namespace stays greppable and prefix deletes cannot drift out of sync
//! with the writers.

use gatehouse_core::domain::token::OneTimeKind;
use gatehouse_core::domain::user::UserId;
use uuid::Uuid;

pub fn access_token(user_id: &UserId, token_id: &Uuid) -> String {
    format!("access_token:{user_id}:{token_id}")
}

/// Prefix covering every live session of one user; used by
/// logout-everywhere on password change.
pub fn access_token_prefix(user_id: &UserId) -> String {
    format!("access_token:{user_id}:")
}

pub fn one_time(kind: OneTimeKind, digest: &str) -> String {
    format!("one_time:{}:{}", kind.as_str(), digest)
}

/// Secondary index from owner to the digest of their live token, so that a
/// new issuance can supersede the previous record.
pub fn one_time_owner(kind: OneTimeKind, user_id: &UserId) -> String {
    format!("one_time:{}:owner:{}", kind.as_str(), user_id)
}

pub fn user(id: &UserId) -> String {
    format!("user:{id}")
}

pub fn rate_limit(scope: &str, identifier: &str) -> String {
    format!("rate_limit:{scope}:{identifier}")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn access_token_keys_nest_under_the_user_prefix() {
        let user_id = UserId::new();
        let token_id = Uuid::new_v4();
        let key = access_token(&user_id, &token_id);
        assert!(key.starts_with(&access_token_prefix(&user_id)));
        assert!(key.ends_with(&token_id.to_string()));
    }

    #[test]
    fn one_time_keys_embed_the_kind() {
        assert_eq!(
            one_time(OneTimeKind::PasswordReset, "abc"),
            "one_time:password_reset:abc"
        );
        assert_eq!(
            one_time(OneTimeKind::EmailVerification, "abc"),
            "one_time:email_verification:abc"
        );
    }

    #[test]
    fn owner_index_does_not_collide_with_digest_records() {
        let user_id = UserId::new();
        let owner = one_time_owner(OneTimeKind::PasswordReset, &user_id);
        assert!(owner.starts_with("one_time:password_reset:owner:"));
    }

    #[test]
    fn rate_limit_keys_are_scoped() {
        assert_eq!(rate_limit("global", "10.0.0.1"), "rate_limit:global:10.0.0.1");
    }
}
