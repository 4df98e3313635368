//! Outbound email transports

use async_trait::async_trait;
use lettre::{
    message::{header::ContentType, Mailbox, Message, MultiPart, SinglePart},
    transport::smtp::authentication::Credentials,
    SmtpTransport, Transport,
};
use std::str::FromStr;

use crate::{
    config::EmailConfig,
    error::{AppError, AppResult},
};

/// A composed plain-text message
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OutgoingEmail {
    pub to: String,
    pub subject: String,
    pub body: String,
}

/// Escape text for inclusion in HTML element content or attribute values
fn escape_html(text: &str) -> String {
    let mut escaped = String::with_capacity(text.len());
    for c in text.chars() {
        match c {
            '&' => escaped.push_str("&amp;"),
            '<' => escaped.push_str("&lt;"),
            '>' => escaped.push_str("&gt;"),
            '"' => escaped.push_str("&quot;"),
            '\'' => escaped.push_str("&#39;"),
            _ => escaped.push(c),
        }
    }
    escaped
}

/// HTML alternative of a plain-text body. Message bodies carry user input
/// (ticket descriptions, names), so everything is escaped.
fn html_body(text: &str) -> String {
    format!(
        "<html><body><pre>{}</pre></body></html>",
        escape_html(text).replace('\n', "<br>")
    )
}

/// Something that can hand a message to a mail relay
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait MailTransport: Send + Sync {
    async fn send(&self, email: OutgoingEmail) -> AppResult<()>;
}

/// SMTP delivery through lettre
#[derive(Clone)]
pub struct SmtpMailer {
    config: EmailConfig,
}

impl SmtpMailer {
    pub fn new(config: EmailConfig) -> Self {
        Self { config }
    }

    fn build_message(&self, email: &OutgoingEmail) -> AppResult<Message> {
        let from_name = self
            .config
            .smtp_from_name
            .as_deref()
            .unwrap_or("ReConectaTec");
        let from_mailbox = Mailbox::from_str(&format!("{} <{}>", from_name, self.config.smtp_from))
            .map_err(|e| AppError::Internal(format!("Invalid from address: {}", e)))?;

        let to_mailbox = Mailbox::from_str(&email.to)
            .map_err(|e| AppError::Internal(format!("Invalid to address: {}", e)))?;

        Message::builder()
            .from(from_mailbox)
            .to(to_mailbox)
            .subject(email.subject.as_str())
            .multipart(
                MultiPart::alternative()
                    .singlepart(
                        SinglePart::builder()
                            .header(ContentType::TEXT_PLAIN)
                            .body(email.body.clone()),
                    )
                    .singlepart(
                        SinglePart::builder()
                            .header(ContentType::TEXT_HTML)
                            .body(html_body(&email.body)),
                    ),
            )
            .map_err(|e| AppError::Internal(format!("Failed to build email: {}", e)))
    }

    fn transport(&self) -> AppResult<SmtpTransport> {
        let builder = if self.config.smtp_use_tls {
            SmtpTransport::starttls_relay(&self.config.smtp_host)
                .map_err(|e| AppError::Internal(format!("Failed to create SMTP transport: {}", e)))?
        } else {
            SmtpTransport::builder_dangerous(&self.config.smtp_host)
        }
        .port(self.config.smtp_port);

        let builder = if let (Some(username), Some(password)) =
            (&self.config.smtp_username, &self.config.smtp_password)
        {
            builder.credentials(Credentials::new(username.clone(), password.clone()))
        } else {
            builder
        };

        Ok(builder.build())
    }
}

#[async_trait]
impl MailTransport for SmtpMailer {
    async fn send(&self, email: OutgoingEmail) -> AppResult<()> {
        let message = self.build_message(&email)?;
        let mailer = self.transport()?;

        // lettre's SmtpTransport is blocking
        tokio::task::spawn_blocking(move || mailer.send(&message))
            .await
            .map_err(|e| AppError::Internal(format!("Email task failed: {}", e)))?
            .map_err(|e| AppError::Internal(format!("Failed to send email: {}", e)))?;

        Ok(())
    }
}

/// Used when email delivery is disabled: messages are only logged
#[derive(Clone, Default)]
pub struct LogMailer;

#[async_trait]
impl MailTransport for LogMailer {
    async fn send(&self, email: OutgoingEmail) -> AppResult<()> {
        tracing::info!(to = %email.to, subject = %email.subject, "Email delivery disabled, message not sent");
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn email() -> OutgoingEmail {
        OutgoingEmail {
            to: "ana@example.cl".into(),
            subject: "Hello".into(),
            body: "line one\nline two".into(),
        }
    }

    #[test]
    fn smtp_message_builds_for_valid_addresses() {
        let mailer = SmtpMailer::new(EmailConfig::default());
        assert!(mailer.build_message(&email()).is_ok());
    }

    #[test]
    fn invalid_recipient_is_an_error() {
        let mailer = SmtpMailer::new(EmailConfig::default());
        let mut bad = email();
        bad.to = "not an address".into();
        assert!(matches!(mailer.build_message(&bad), Err(AppError::Internal(_))));
    }

    #[test]
    fn html_special_characters_are_escaped() {
        assert_eq!(
            escape_html(r#"<b>"Tom" & 'Ana'</b>"#),
            "&lt;b&gt;&quot;Tom&quot; &amp; &#39;Ana&#39;&lt;/b&gt;"
        );
        assert_eq!(escape_html("plain text"), "plain text");
    }

    #[test]
    fn html_part_does_not_render_user_markup() {
        let body = html_body("Pantalla rota\n<a href=\"http://evil.example\">click</a>");
        assert!(!body.contains("<a href"));
        assert!(body.contains("&lt;a href=&quot;http://evil.example&quot;&gt;click&lt;/a&gt;"));
        assert!(body.contains("Pantalla rota<br>"));
    }

    #[test]
    fn built_message_carries_escaped_html() {
        let mailer = SmtpMailer::new(EmailConfig::default());
        let mut hostile = email();
        hostile.body = "see <a href".into();
        let message = mailer.build_message(&hostile).unwrap();
        let raw = String::from_utf8(message.formatted()).unwrap();
        assert!(raw.contains("&lt;a href"));
        assert!(!raw.contains("<pre>see <a href"));
    }

    #[tokio::test]
    async fn log_mailer_always_succeeds() {
        tokio_test::assert_ok!(LogMailer.send(email()).await);
    }
}
