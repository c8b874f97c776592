use std::sync::Arc;

use async_trait::async_trait;
use tokio::sync::RwLock;

use gatehouse_core::domain::email::EmailAddress;
use gatehouse_core::ports::mailer::{MailTemplate, Mailer, MailerError};

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SentMail {
    pub to: EmailAddress,
    pub template: MailTemplate,
}

/// Mailer that records instead of sending, for tests and local runs that
/// need to pull the one-time token back out of "delivered" mail.
#[derive(Debug, Clone, Default)]
pub struct RecordingMailer {
    sent: Arc<RwLock<Vec<SentMail>>>,
}

impl RecordingMailer {
    pub fn new() -> Self {
        Self::default()
    }

    pub async fn sent(&self) -> Vec<SentMail> {
        self.sent.read().await.clone()
    }

    pub async fn sent_count(&self) -> usize {
        self.sent.read().await.len()
    }

    /// The token carried by the most recent verification or reset mail.
    pub async fn last_token(&self) -> Option<String> {
        self.sent
            .read()
            .await
            .iter()
            .rev()
            .find_map(|mail| match &mail.template {
                MailTemplate::VerifyEmail { token, .. }
                | MailTemplate::ResetPassword { token, .. } => Some(token.clone()),
                MailTemplate::Hello { .. } => None,
            })
    }
}

#[async_trait]
impl Mailer for RecordingMailer {
    async fn send(&self, to: &EmailAddress, template: MailTemplate) -> Result<(), MailerError> {
        self.sent.write().await.push(SentMail {
            to: to.clone(),
            template,
        });
        Ok(())
    }
}
