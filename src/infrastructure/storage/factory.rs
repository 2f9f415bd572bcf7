//! Storage factory for runtime backend selection

use std::sync::Arc;

use sqlx::postgres::PgPool;

use crate::domain::storage::{Storage, StorageEntity};
use crate::domain::DomainError;

use super::in_memory::InMemoryStorage;
use super::postgres::{connect_pool, PostgresConfig, PostgresStorage};

/// Supported storage backends
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum StorageType {
    InMemory,
    Postgres,
}

impl StorageType {
    pub fn parse(s: &str) -> Option<Self> {
        match s.to_lowercase().as_str() {
            "memory" | "inmemory" | "in-memory" | "in_memory" => Some(Self::InMemory),
            "postgres" | "postgresql" | "pg" => Some(Self::Postgres),
            _ => None,
        }
    }
}

#[derive(Debug, Clone)]
pub enum StorageConfig {
    InMemory,
    Postgres(PostgresConfig),
}

impl StorageConfig {
    /// Build from the `storage.backend` / `storage.database_url` settings
    pub fn from_settings(backend: &str, database_url: Option<&str>) -> Result<Self, DomainError> {
        match StorageType::parse(backend) {
            Some(StorageType::InMemory) => Ok(Self::InMemory),
            Some(StorageType::Postgres) => {
                let url = database_url.filter(|url| !url.is_empty()).ok_or_else(|| {
                    DomainError::configuration("storage.database_url is required for postgres")
                })?;
                Ok(Self::Postgres(PostgresConfig::new(url)))
            }
            None => Err(DomainError::configuration(format!(
                "Unknown storage backend '{}'",
                backend
            ))),
        }
    }

    pub fn storage_type(&self) -> StorageType {
        match self {
            Self::InMemory => StorageType::InMemory,
            Self::Postgres(_) => StorageType::Postgres,
        }
    }
}

/// Opens collections on the configured backend
///
/// Postgres collections share one connection pool.
#[derive(Debug, Clone)]
pub struct StorageFactory {
    pool: Option<PgPool>,
}

impl StorageFactory {
    pub async fn connect(config: &StorageConfig) -> Result<Self, DomainError> {
        let pool = match config {
            StorageConfig::InMemory => None,
            StorageConfig::Postgres(pg_config) => {
                Some(connect_pool(pg_config).await?)
            }
        };

        Ok(Self { pool })
    }

    pub fn in_memory() -> Self {
        Self { pool: None }
    }

    /// Opens (creating if needed) a collection with case-insensitive unique fields
    pub async fn collection<E>(
        &self,
        table_name: &str,
        unique_fields: &[&str],
    ) -> Result<Arc<dyn Storage<E>>, DomainError>
    where
        E: StorageEntity + 'static,
    {
        match &self.pool {
            None => Ok(Arc::new(InMemoryStorage::<E>::new())),
            Some(pool) => {
                let storage = PostgresStorage::<E>::new(pool.clone(), table_name);
                storage.ensure_table().await?;
                for field in unique_fields {
                    storage.ensure_unique(field).await?;
                }
                Ok(Arc::new(storage))
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_storage_type_parse() {
        assert_eq!(StorageType::parse("memory"), Some(StorageType::InMemory));
        assert_eq!(StorageType::parse("In-Memory"), Some(StorageType::InMemory));
        assert_eq!(StorageType::parse("postgresql"), Some(StorageType::Postgres));
        assert_eq!(StorageType::parse("mongo"), None);
    }

    #[test]
    fn test_config_from_settings() {
        let config = StorageConfig::from_settings("memory", None).unwrap();
        assert_eq!(config.storage_type(), StorageType::InMemory);

        let config =
            StorageConfig::from_settings("postgres", Some("postgres://localhost/jobs")).unwrap();
        assert_eq!(config.storage_type(), StorageType::Postgres);

        assert!(StorageConfig::from_settings("postgres", None).is_err());
        assert!(StorageConfig::from_settings("mongo", None).is_err());
    }
}
