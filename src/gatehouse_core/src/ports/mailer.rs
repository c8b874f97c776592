use std::time::Duration;

use async_trait::async_trait;
use thiserror::Error;

use crate::domain::email::EmailAddress;

#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum MailerError {
    #[error("Mailer error: {0}")]
    Backend(String),
}

/// Templated outbound mail. Rendering (subjects, bodies, link base URL) and
/// the non-production debug redirect live in the adapter.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum MailTemplate {
    Hello { name: String },
    VerifyEmail { token: String, ttl: Duration },
    ResetPassword { token: String, ttl: Duration },
}

#[async_trait]
pub trait Mailer: Send + Sync {
    async fn send(&self, to: &EmailAddress, template: MailTemplate) -> Result<(), MailerError>;
}
