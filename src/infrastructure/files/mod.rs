//! Uploaded file storage on the local filesystem

use std::path::{Path, PathBuf};

use async_trait::async_trait;
use bytes::Bytes;
use tracing::debug;

use crate::domain::files::FileStorage;
use crate::domain::DomainError;

/// Stores files directly under one directory
#[derive(Debug, Clone)]
pub struct LocalFileStorage {
    root: PathBuf,
}

impl LocalFileStorage {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    /// Path for a flat file name; anything that could leave the root is refused
    fn path_for(&self, name: &str) -> Result<PathBuf, DomainError> {
        let flat = Path::new(name)
            .file_name()
            .is_some_and(|file_name| file_name == name);

        if !flat || name.starts_with('.') {
            return Err(DomainError::bad_request(format!("Invalid file name: {}", name)));
        }

        Ok(self.root.join(name))
    }
}

#[async_trait]
impl FileStorage for LocalFileStorage {
    async fn save(&self, name: &str, contents: Bytes) -> Result<(), DomainError> {
        let path = self.path_for(name)?;

        tokio::fs::create_dir_all(&self.root).await.map_err(|e| {
            DomainError::storage(format!("Failed to create upload directory: {}", e))
        })?;
        tokio::fs::write(&path, &contents)
            .await
            .map_err(|e| DomainError::storage(format!("Failed to write {}: {}", name, e)))?;

        debug!(file = %path.display(), bytes = contents.len(), "Stored upload");
        Ok(())
    }

    async fn remove(&self, name: &str) -> Result<(), DomainError> {
        let path = self.path_for(name)?;

        tokio::fs::remove_file(&path)
            .await
            .map_err(|e| DomainError::storage(format!("Failed to remove {}: {}", name, e)))
    }
}
