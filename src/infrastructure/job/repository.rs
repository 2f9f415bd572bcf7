//! Storage-backed job repository

use async_trait::async_trait;
use std::sync::Arc;

use crate::domain::job::{Job, JobId, JobRepository};
use crate::domain::query::DocumentQuery;
use crate::domain::storage::Storage;
use crate::domain::DomainError;

/// Storage-backed implementation of JobRepository
#[derive(Debug)]
pub struct StorageJobRepository {
    storage: Arc<dyn Storage<Job>>,
}

impl StorageJobRepository {
    pub fn new(storage: Arc<dyn Storage<Job>>) -> Self {
        Self { storage }
    }
}

#[async_trait]
impl JobRepository for StorageJobRepository {
    async fn get(&self, id: &JobId) -> Result<Option<Job>, DomainError> {
        self.storage.get(id).await
    }

    async fn create(&self, job: Job) -> Result<Job, DomainError> {
        self.storage.create(job).await
    }

    async fn update(&self, job: &Job) -> Result<Job, DomainError> {
        if !self.storage.exists(job.id()).await? {
            return Err(DomainError::not_found(format!(
                "Job not found with id: {}",
                job.id()
            )));
        }

        self.storage.update(job.clone()).await
    }

    async fn delete(&self, id: &JobId) -> Result<bool, DomainError> {
        self.storage.delete(id).await
    }

    async fn find(&self, query: &DocumentQuery) -> Result<Vec<Job>, DomainError> {
        self.storage.find(query).await
    }

    async fn delete_many(&self, query: &DocumentQuery) -> Result<usize, DomainError> {
        self.storage.delete_many(query).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::job::fixtures;
    use crate::domain::query::FilterCondition;
    use crate::infrastructure::storage::InMemoryStorage;

    fn repository() -> StorageJobRepository {
        StorageJobRepository::new(Arc::new(InMemoryStorage::new()))
    }

    #[tokio::test]
    async fn test_create_get_update() {
        let repo = repository();
        let mut job = repo
            .create(fixtures::job("job-1", "emp-1", "Rust Developer"))
            .await
            .unwrap();

        let mut fields = job.fields();
        fields.salary = 90000.0;
        let location = job.location().clone();
        job.apply_fields(fields, "rust-developer".to_string(), location);
        repo.update(&job).await.unwrap();

        let stored = repo.get(&JobId::new("job-1")).await.unwrap().unwrap();
        assert_eq!(stored.salary(), 90000.0);
    }

    #[tokio::test]
    async fn test_update_missing_job() {
        let repo = repository();
        let job = fixtures::job("job-9", "emp-1", "Ghost");
        assert!(matches!(
            repo.update(&job).await,
            Err(DomainError::NotFound { .. })
        ));
    }

    #[tokio::test]
    async fn test_delete_many_by_owner() {
        let repo = repository();
        for (id, owner) in [("j1", "emp-1"), ("j2", "emp-2"), ("j3", "emp-1")] {
            repo.create(fixtures::job(id, owner, "Engineer")).await.unwrap();
        }

        let by_owner = DocumentQuery::new().filter(FilterCondition::eq("user", "emp-1"));
        assert_eq!(repo.delete_many(&by_owner).await.unwrap(), 2);
        assert_eq!(repo.find(&DocumentQuery::new()).await.unwrap().len(), 1);
    }
}
