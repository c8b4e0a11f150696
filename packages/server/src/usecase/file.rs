//! UseCase: ファイルのアップロードと取得
//!
//! Hub とは無関係な、単発のリクエスト／レスポンス処理です。

use std::sync::Arc;

use crate::domain::{FileId, FileIdFactory, FileRepository, StoredFile, UserId};

use super::error::FileError;

/// ファイルアップロードのユースケース
pub struct UploadFileUseCase {
    files: Arc<dyn FileRepository>,
}

impl UploadFileUseCase {
    pub fn new(files: Arc<dyn FileRepository>) -> Self {
        Self { files }
    }

    /// ファイルを保存し、新しいファイル ID を返す
    pub async fn execute(
        &self,
        owner_id: UserId,
        name: String,
        content_type: String,
        data: Vec<u8>,
    ) -> Result<FileId, FileError> {
        let file = StoredFile {
            id: FileIdFactory::generate(),
            owner_id,
            name,
            content_type,
            data,
        };
        let id = file.id.clone();
        tracing::info!(
            "Storing file '{}' ({} bytes) for '{}'",
            file.name,
            file.size(),
            file.owner_id
        );

        self.files
            .insert(file)
            .await
            .map_err(|e| FileError::Repository(e.to_string()))?;

        Ok(id)
    }
}

/// ファイル取得のユースケース
pub struct GetFileUseCase {
    files: Arc<dyn FileRepository>,
}

impl GetFileUseCase {
    pub fn new(files: Arc<dyn FileRepository>) -> Self {
        Self { files }
    }

    pub async fn execute(&self, file_id: &FileId) -> Result<StoredFile, FileError> {
        self.files
            .find_by_id(file_id)
            .await
            .map_err(|e| FileError::Repository(e.to_string()))?
            .ok_or_else(|| FileError::NotFound(file_id.as_str().to_string()))
    }
}
