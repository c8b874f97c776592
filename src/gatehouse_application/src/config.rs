use std::time::Duration;

use gatehouse_core::domain::token::OneTimeKind;

/// Token lifetimes consumed by the token service. The signing secret lives
/// with the codec adapter, not here.
#[derive(Debug, Clone)]
pub struct TokenConfig {
    pub access_ttl: Duration,
    pub password_reset_ttl: Duration,
    pub email_verification_ttl: Duration,
}

impl TokenConfig {
    pub fn one_time_ttl(&self, kind: OneTimeKind) -> Duration {
        match kind {
            OneTimeKind::PasswordReset => self.password_reset_ttl,
            OneTimeKind::EmailVerification => self.email_verification_ttl,
        }
    }
}

impl Default for TokenConfig {
    fn default() -> Self {
        Self {
            access_ttl: Duration::from_secs(60 * 60),
            password_reset_ttl: Duration::from_secs(15 * 60),
            email_verification_ttl: Duration::from_secs(24 * 60 * 60),
        }
    }
}
