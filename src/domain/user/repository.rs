//! User repository trait

use async_trait::async_trait;
use std::fmt::Debug;

use super::entity::{User, UserId};
use crate::domain::query::DocumentQuery;
use crate::domain::DomainError;

/// Repository trait for user storage
///
/// Implementations enforce case-insensitive email uniqueness and report
/// violations as `DomainError::DuplicateKey { field: "email" }`.
#[async_trait]
pub trait UserRepository: Send + Sync + Debug {
    async fn get(&self, id: &UserId) -> Result<Option<User>, DomainError>;

    async fn get_by_email(&self, email: &str) -> Result<Option<User>, DomainError>;

    /// User holding an unexpired reset token with this hash
    async fn get_by_reset_token(&self, token_hash: &str) -> Result<Option<User>, DomainError>;

    async fn create(&self, user: User) -> Result<User, DomainError>;

    async fn update(&self, user: &User) -> Result<User, DomainError>;

    async fn delete(&self, id: &UserId) -> Result<bool, DomainError>;

    async fn find(&self, query: &DocumentQuery) -> Result<Vec<User>, DomainError>;
}
