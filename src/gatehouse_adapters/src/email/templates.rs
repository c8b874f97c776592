use std::time::Duration;

use gatehouse_core::ports::mailer::MailTemplate;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RenderedMail {
    pub subject: String,
    pub body: String,
}

pub const HELLO_SUBJECT: &str = "Welcome to Gatehouse";
pub const VERIFY_EMAIL_SUBJECT: &str = "Verify your email address";
pub const RESET_PASSWORD_SUBJECT: &str = "Reset your password";

/// Renders a mail template into a subject and body. `base_url` is the
/// user-facing application origin the action links point at.
pub fn render(template: &MailTemplate, base_url: &str) -> RenderedMail {
    match template {
        MailTemplate::Hello { name } => RenderedMail {
            subject: HELLO_SUBJECT.to_owned(),
            body: format!(
                "Hello {name},\n\n\
                 Your account has been created. Welcome aboard!\n"
            ),
        },
        MailTemplate::VerifyEmail { token, ttl } => RenderedMail {
            subject: VERIFY_EMAIL_SUBJECT.to_owned(),
            body: format!(
                "Please confirm your email address by following this link:\n\n\
                 {base_url}/verify-email?token={token}\n\n\
                 The link expires in {}.\n",
                humanize(*ttl)
            ),
        },
        MailTemplate::ResetPassword { token, ttl } => RenderedMail {
            subject: RESET_PASSWORD_SUBJECT.to_owned(),
            body: format!(
                "A password reset was requested for your account. To choose a \
                 new password, follow this link:\n\n\
                 {base_url}/reset-password?token={token}\n\n\
                 The link expires in {}. If you did not request this, you can \
                 ignore this mail.\n",
                humanize(*ttl)
            ),
        },
    }
}

fn humanize(ttl: Duration) -> String {
    let secs = ttl.as_secs();
    if secs >= 3600 && secs % 3600 == 0 {
        let hours = secs / 3600;
        if hours == 1 {
            "1 hour".to_owned()
        } else {
            format!("{hours} hours")
        }
    } else {
        let minutes = secs.div_ceil(60).max(1);
        if minutes == 1 {
            "1 minute".to_owned()
        } else {
            format!("{minutes} minutes")
        }
    }
}
