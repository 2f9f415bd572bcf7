//! Job repository trait

use async_trait::async_trait;
use std::fmt::Debug;

use super::entity::{Job, JobId};
use crate::domain::query::DocumentQuery;
use crate::domain::DomainError;

#[async_trait]
pub trait JobRepository: Send + Sync + Debug {
    async fn get(&self, id: &JobId) -> Result<Option<Job>, DomainError>;

    async fn create(&self, job: Job) -> Result<Job, DomainError>;

    async fn update(&self, job: &Job) -> Result<Job, DomainError>;

    async fn delete(&self, id: &JobId) -> Result<bool, DomainError>;

    async fn find(&self, query: &DocumentQuery) -> Result<Vec<Job>, DomainError>;

    async fn delete_many(&self, query: &DocumentQuery) -> Result<usize, DomainError>;
}
