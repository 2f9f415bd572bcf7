//! In-memory storage implementation

use std::collections::HashMap;
use std::fmt::Debug;
use std::sync::RwLock;

use async_trait::async_trait;
use serde_json::Value;

use crate::domain::query::DocumentQuery;
use crate::domain::storage::{Storage, StorageEntity, StorageKey};
use crate::domain::DomainError;

use super::evaluator;

/// Thread-safe in-memory document collection
///
/// Useful for testing and development. Data is lost when the process terminates.
#[derive(Debug)]
pub struct InMemoryStorage<E>
where
    E: StorageEntity,
{
    entities: RwLock<HashMap<String, E>>,
}

impl<E> Default for InMemoryStorage<E>
where
    E: StorageEntity,
{
    fn default() -> Self {
        Self::new()
    }
}

impl<E> InMemoryStorage<E>
where
    E: StorageEntity,
{
    pub fn new() -> Self {
        Self {
            entities: RwLock::new(HashMap::new()),
        }
    }

    fn read_lock(
        &self,
    ) -> Result<std::sync::RwLockReadGuard<'_, HashMap<String, E>>, DomainError> {
        self.entities
            .read()
            .map_err(|e| DomainError::storage(format!("Failed to acquire read lock: {}", e)))
    }

    fn write_lock(
        &self,
    ) -> Result<std::sync::RwLockWriteGuard<'_, HashMap<String, E>>, DomainError> {
        self.entities
            .write()
            .map_err(|e| DomainError::storage(format!("Failed to acquire write lock: {}", e)))
    }

    fn documents(entities: &HashMap<String, E>) -> Result<Vec<(E, Value)>, DomainError> {
        entities
            .values()
            .map(|entity| {
                serde_json::to_value(entity)
                    .map(|document| (entity.clone(), document))
                    .map_err(|e| {
                        DomainError::storage(format!("Failed to serialize entity: {}", e))
                    })
            })
            .collect()
    }
}

#[async_trait]
impl<E> Storage<E> for InMemoryStorage<E>
where
    E: StorageEntity + 'static,
{
    async fn get(&self, key: &E::Key) -> Result<Option<E>, DomainError> {
        Ok(self.read_lock()?.get(key.as_str()).cloned())
    }

    async fn list(&self) -> Result<Vec<E>, DomainError> {
        Ok(self.read_lock()?.values().cloned().collect())
    }

    async fn find(&self, query: &DocumentQuery) -> Result<Vec<E>, DomainError> {
        let rows = Self::documents(&*self.read_lock()?)?;
        Ok(evaluator::execute(rows, query))
    }

    async fn create(&self, entity: E) -> Result<E, DomainError> {
        let key = entity.key().as_str().to_string();
        let mut entities = self.write_lock()?;

        if entities.contains_key(&key) {
            return Err(DomainError::duplicate_key("id"));
        }

        entities.insert(key, entity.clone());
        Ok(entity)
    }

    async fn update(&self, entity: E) -> Result<E, DomainError> {
        let key = entity.key().as_str().to_string();
        let mut entities = self.write_lock()?;

        if !entities.contains_key(&key) {
            return Err(DomainError::not_found(format!(
                "Entity with key '{}' not found",
                key
            )));
        }

        entities.insert(key, entity.clone());
        Ok(entity)
    }

    async fn delete(&self, key: &E::Key) -> Result<bool, DomainError> {
        Ok(self.write_lock()?.remove(key.as_str()).is_some())
    }

    async fn delete_many(&self, query: &DocumentQuery) -> Result<usize, DomainError> {
        let mut entities = self.write_lock()?;

        let mut doomed = Vec::new();
        for (key, entity) in entities.iter() {
            let document = serde_json::to_value(entity).map_err(|e| {
                DomainError::storage(format!("Failed to serialize entity: {}", e))
            })?;

            if evaluator::matches(&document, query.conditions()) {
                doomed.push(key.clone());
            }
        }

        for key in &doomed {
            entities.remove(key);
        }

        Ok(doomed.len())
    }

    async fn exists(&self, key: &E::Key) -> Result<bool, DomainError> {
        Ok(self.read_lock()?.contains_key(key.as_str()))
    }

    async fn count(&self) -> Result<usize, DomainError> {
        Ok(self.read_lock()?.len())
    }

    async fn clear(&self) -> Result<(), DomainError> {
        self.write_lock()?.clear();
        Ok(())
    }
}
