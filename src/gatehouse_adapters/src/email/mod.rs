mod postmark_mailer;
mod recording_mailer;
mod templates;

pub use postmark_mailer::PostmarkMailer;
pub use recording_mailer::{RecordingMailer, SentMail};
pub use templates::{RenderedMail, render};
