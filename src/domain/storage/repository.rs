//! Storage trait definition

use std::fmt::Debug;

use async_trait::async_trait;

use crate::domain::query::DocumentQuery;
use crate::domain::DomainError;

use super::entity::StorageEntity;

/// Document store for one collection
#[async_trait]
pub trait Storage<E>: Send + Sync + Debug
where
    E: StorageEntity + 'static,
{
    /// Retrieves an entity by its key
    async fn get(&self, key: &E::Key) -> Result<Option<E>, DomainError>;

    /// Retrieves all entities
    async fn list(&self) -> Result<Vec<E>, DomainError>;

    /// Executes a query: filter, then sort, then skip/take
    ///
    /// Projections are not applied here; entities always come back whole.
    async fn find(&self, query: &DocumentQuery) -> Result<Vec<E>, DomainError>;

    /// Creates a new entity, returns error if the key is taken
    async fn create(&self, entity: E) -> Result<E, DomainError>;

    /// Updates an existing entity, returns error if not found
    async fn update(&self, entity: E) -> Result<E, DomainError>;

    /// Deletes an entity by its key, returns true if deleted
    async fn delete(&self, key: &E::Key) -> Result<bool, DomainError>;

    /// Deletes every entity matching the query's conditions
    ///
    /// Sort and pagination are ignored.
    async fn delete_many(&self, query: &DocumentQuery) -> Result<usize, DomainError>;

    async fn exists(&self, key: &E::Key) -> Result<bool, DomainError> {
        Ok(self.get(key).await?.is_some())
    }

    async fn count(&self) -> Result<usize, DomainError> {
        Ok(self.list().await?.len())
    }

    /// Clears all entities
    async fn clear(&self) -> Result<(), DomainError>;
}
