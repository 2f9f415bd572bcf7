//! Email sender that only logs, for development

use async_trait::async_trait;
use tracing::{debug, info};

use crate::domain::email::{EmailMessage, EmailSender};
use crate::domain::DomainError;

#[derive(Debug, Clone, Default)]
pub struct LogEmailSender;

impl LogEmailSender {
    pub fn new() -> Self {
        Self
    }
}

#[async_trait]
impl EmailSender for LogEmailSender {
    async fn send(&self, message: EmailMessage) -> Result<(), DomainError> {
        info!(to = %message.to, subject = %message.subject, "Email not delivered (log sender)");
        debug!(body = %message.body, "Email body");
        Ok(())
    }
}
