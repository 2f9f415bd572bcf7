//! Outbound email collaborator

use async_trait::async_trait;

use super::DomainError;

#[cfg(test)]
use mockall::automock;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EmailMessage {
    pub to: String,
    pub subject: String,
    pub body: String,
}

#[cfg_attr(test, automock)]
#[async_trait]
pub trait EmailSender: Send + Sync + std::fmt::Debug {
    async fn send(&self, message: EmailMessage) -> Result<(), DomainError>;
}
