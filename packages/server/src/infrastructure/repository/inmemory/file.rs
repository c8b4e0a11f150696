//! インメモリ File Repository 実装

use std::collections::HashMap;

use async_trait::async_trait;
use tokio::sync::RwLock;

use crate::domain::{FileId, FileRepository, RepositoryError, StoredFile};

/// インメモリ File Repository 実装
#[derive(Debug, Default)]
pub struct InMemoryFileRepository {
    files: RwLock<HashMap<FileId, StoredFile>>,
}

impl InMemoryFileRepository {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl FileRepository for InMemoryFileRepository {
    async fn insert(&self, file: StoredFile) -> Result<(), RepositoryError> {
        let mut files = self.files.write().await;
        if files.contains_key(&file.id) {
            return Err(RepositoryError::AlreadyExists(file.id.into_string()));
        }
        files.insert(file.id.clone(), file);
        Ok(())
    }

    async fn find_by_id(&self, id: &FileId) -> Result<Option<StoredFile>, RepositoryError> {
        Ok(self.files.read().await.get(id).cloned())
    }
}
