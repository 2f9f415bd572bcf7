//! Storage-backed user repository

use async_trait::async_trait;
use chrono::Utc;
use std::sync::Arc;

use crate::domain::query::{DocumentQuery, FilterCondition};
use crate::domain::storage::Storage;
use crate::domain::user::{User, UserId, UserRepository};
use crate::domain::DomainError;

/// Storage-backed implementation of UserRepository
///
/// Emails are compared lowercased; callers store them lowercased.
#[derive(Debug)]
pub struct StorageUserRepository {
    storage: Arc<dyn Storage<User>>,
}

impl StorageUserRepository {
    pub fn new(storage: Arc<dyn Storage<User>>) -> Self {
        Self { storage }
    }

    async fn ensure_email_free(&self, user: &User) -> Result<(), DomainError> {
        match self.get_by_email(user.email()).await? {
            Some(existing) if existing.id() != user.id() => {
                Err(DomainError::duplicate_key("email"))
            }
            _ => Ok(()),
        }
    }
}

#[async_trait]
impl UserRepository for StorageUserRepository {
    async fn get(&self, id: &UserId) -> Result<Option<User>, DomainError> {
        self.storage.get(id).await
    }

    async fn get_by_email(&self, email: &str) -> Result<Option<User>, DomainError> {
        let query = DocumentQuery::new()
            .filter(FilterCondition::eq("email", email.trim().to_lowercase()))
            .paginate(0, 1);

        Ok(self.storage.find(&query).await?.into_iter().next())
    }

    async fn get_by_reset_token(&self, token_hash: &str) -> Result<Option<User>, DomainError> {
        let query =
            DocumentQuery::new().filter(FilterCondition::eq("resetPasswordToken", token_hash));
        let now = Utc::now();

        Ok(self
            .storage
            .find(&query)
            .await?
            .into_iter()
            .find(|user| user.reset_token_valid(token_hash, now)))
    }

    async fn create(&self, user: User) -> Result<User, DomainError> {
        self.ensure_email_free(&user).await?;
        self.storage.create(user).await
    }

    async fn update(&self, user: &User) -> Result<User, DomainError> {
        self.ensure_email_free(user).await?;
        self.storage.update(user.clone()).await
    }

    async fn delete(&self, id: &UserId) -> Result<bool, DomainError> {
        self.storage.delete(id).await
    }

    async fn find(&self, query: &DocumentQuery) -> Result<Vec<User>, DomainError> {
        self.storage.find(query).await
    }
}
