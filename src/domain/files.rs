//! Uploaded file storage collaborator

use async_trait::async_trait;
use bytes::Bytes;

use super::DomainError;

#[cfg(test)]
use mockall::automock;

/// Stores uploaded files under flat names
#[cfg_attr(test, automock)]
#[async_trait]
pub trait FileStorage: Send + Sync + std::fmt::Debug {
    /// Write `contents` under `name`, replacing any existing file
    async fn save(&self, name: &str, contents: Bytes) -> Result<(), DomainError>;

    /// Remove the named file
    async fn remove(&self, name: &str) -> Result<(), DomainError>;
}
