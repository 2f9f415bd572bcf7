//! SMTP email sender

use async_trait::async_trait;
use lettre::message::header::ContentType;
use lettre::message::Mailbox;
use lettre::transport::smtp::authentication::Credentials;
use lettre::{AsyncSmtpTransport, AsyncTransport, Message, Tokio1Executor};
use tracing::info;

use crate::domain::email::{EmailMessage, EmailSender};
use crate::domain::DomainError;

#[derive(Debug, Clone)]
pub struct SmtpConfig {
    pub host: String,
    pub port: u16,
    pub user: String,
    pub pass: String,
    pub from_name: String,
    pub from_email: String,
}

pub struct SmtpEmailSender {
    transport: AsyncSmtpTransport<Tokio1Executor>,
    from: Mailbox,
}

impl std::fmt::Debug for SmtpEmailSender {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SmtpEmailSender")
            .field("from", &self.from.to_string())
            .finish_non_exhaustive()
    }
}

impl SmtpEmailSender {
    pub fn new(config: &SmtpConfig) -> Result<Self, DomainError> {
        let from = format!("{} <{}>", config.from_name, config.from_email)
            .parse::<Mailbox>()
            .map_err(|e| DomainError::configuration(format!("Invalid sender address: {}", e)))?;

        let transport = AsyncSmtpTransport::<Tokio1Executor>::starttls_relay(&config.host)
            .map_err(|e| DomainError::configuration(format!("Invalid SMTP relay: {}", e)))?
            .port(config.port)
            .credentials(Credentials::new(config.user.clone(), config.pass.clone()))
            .build();

        Ok(Self { transport, from })
    }

    fn build(&self, message: &EmailMessage) -> Result<Message, DomainError> {
        let to = message
            .to
            .parse::<Mailbox>()
            .map_err(|e| DomainError::email_delivery(format!("Invalid recipient: {}", e)))?;

        Message::builder()
            .from(self.from.clone())
            .to(to)
            .subject(message.subject.clone())
            .header(ContentType::TEXT_PLAIN)
            .body(message.body.clone())
            .map_err(|e| DomainError::email_delivery(format!("Failed to build email: {}", e)))
    }
}

#[async_trait]
impl EmailSender for SmtpEmailSender {
    async fn send(&self, message: EmailMessage) -> Result<(), DomainError> {
        let email = self.build(&message)?;

        self.transport
            .send(email)
            .await
            .map_err(|e| DomainError::email_delivery(format!("SMTP send failed: {}", e)))?;

        info!(to = %message.to, subject = %message.subject, "Email sent");
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn config() -> SmtpConfig {
        SmtpConfig {
            host: "smtp.example.com".to_string(),
            port: 2525,
            user: "user".to_string(),
            pass: "pass".to_string(),
            from_name: "Jobee".to_string(),
            from_email: "noreply@jobee.com".to_string(),
        }
    }

    #[tokio::test]
    async fn test_builds_plain_text_message() {
        let sender = SmtpEmailSender::new(&config()).unwrap();
        let message = sender
            .build(&EmailMessage {
                to: "ada@example.com".to_string(),
                subject: "Hello".to_string(),
                body: "line one\nline two".to_string(),
            })
            .unwrap();

        let raw = String::from_utf8(message.formatted()).unwrap();
        assert!(raw.contains("Subject: Hello"));
        assert!(raw.contains("To: ada@example.com"));
        assert!(raw.contains("Jobee <noreply@jobee.com>"));
    }

    #[tokio::test]
    async fn test_rejects_bad_addresses() {
        let mut bad = config();
        bad.from_email = "not an address".to_string();
        assert!(SmtpEmailSender::new(&bad).is_err());

        let sender = SmtpEmailSender::new(&config()).unwrap();
        let result = sender.build(&EmailMessage {
            to: "nobody".to_string(),
            subject: "x".to_string(),
            body: "x".to_string(),
        });
        assert!(matches!(result, Err(DomainError::EmailDeliveryFailed { .. })));
    }
}
