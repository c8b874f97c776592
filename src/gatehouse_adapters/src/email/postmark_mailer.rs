use async_trait::async_trait;
use reqwest::{Client, Url};
use secrecy::{ExposeSecret, Secret};

use gatehouse_core::domain::email::EmailAddress;
use gatehouse_core::ports::mailer::{MailTemplate, Mailer, MailerError};

use super::templates;

const MESSAGE_STREAM: &str = "outbound";
const POSTMARK_AUTH_HEADER: &str = "X-Postmark-Server-Token";

/// Mailer over the Postmark transactional API. Outside production, a debug
/// redirect address captures every mail with a marked subject so real
/// recipients are never contacted from test environments.
pub struct PostmarkMailer {
    http_client: Client,
    server_url: String,
    auth_token: Secret<String>,
    sender: EmailAddress,
    link_base_url: String,
    debug_redirect: Option<EmailAddress>,
}

impl PostmarkMailer {
    pub fn new(
        http_client: Client,
        server_url: String,
        auth_token: Secret<String>,
        sender: EmailAddress,
        link_base_url: String,
        debug_redirect: Option<EmailAddress>,
    ) -> Self {
        Self {
            http_client,
            server_url,
            auth_token,
            sender,
            link_base_url,
            debug_redirect,
        }
    }
}

#[async_trait]
impl Mailer for PostmarkMailer {
    #[tracing::instrument(name = "PostmarkMailer::send", skip_all)]
    async fn send(&self, to: &EmailAddress, template: MailTemplate) -> Result<(), MailerError> {
        let rendered = templates::render(&template, &self.link_base_url);

        let (recipient, subject) = match &self.debug_redirect {
            Some(debug) => (debug.clone(), format!("[DEBUG] {}", rendered.subject)),
            None => (to.clone(), rendered.subject),
        };

        let base = Url::parse(&self.server_url).map_err(|e| MailerError::Backend(e.to_string()))?;
        let url = base
            .join("/email")
            .map_err(|e| MailerError::Backend(e.to_string()))?;

        let request_body = SendEmailRequest {
            from: self.sender.as_str(),
            to: recipient.as_str(),
            subject: &subject,
            html_body: &rendered.body,
            text_body: &rendered.body,
            message_stream: MESSAGE_STREAM,
        };

        self.http_client
            .post(url)
            .header(POSTMARK_AUTH_HEADER, self.auth_token.expose_secret())
            .json(&request_body)
            .send()
            .await
            .map_err(|e| MailerError::Backend(e.to_string()))?
            .error_for_status()
            .map_err(|e| MailerError::Backend(e.to_string()))?;

        Ok(())
    }
}

#[derive(serde::Serialize, Debug)]
#[serde(rename_all = "PascalCase")]
struct SendEmailRequest<'a> {
    from: &'a str,
    to: &'a str,
    subject: &'a str,
    html_body: &'a str,
    text_body: &'a str,
    message_stream: &'a str,
}
