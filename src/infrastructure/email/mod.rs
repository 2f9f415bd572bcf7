//! Email delivery

mod console;
mod smtp;

use std::sync::Arc;

pub use console::LogEmailSender;
pub use smtp::{SmtpConfig, SmtpEmailSender};

use crate::domain::email::EmailSender;
use crate::domain::DomainError;

/// Build the configured sender (`smtp` or `log`)
pub fn create_email_sender(
    provider: &str,
    smtp: &SmtpConfig,
) -> Result<Arc<dyn EmailSender>, DomainError> {
    match provider.to_lowercase().as_str() {
        "smtp" => Ok(Arc::new(SmtpEmailSender::new(smtp)?)),
        "log" => Ok(Arc::new(LogEmailSender::new())),
        other => Err(DomainError::configuration(format!(
            "Unknown email provider '{}'",
            other
        ))),
    }
}
