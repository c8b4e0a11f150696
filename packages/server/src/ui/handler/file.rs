//! File upload and download handlers.
//!
//! These endpoints never touch the hub.

use std::sync::Arc;

use axum::{
    Json,
    extract::{Multipart, Path, State},
    http::{HeaderMap, StatusCode, header},
    response::IntoResponse,
};

use crate::{
    domain::{FileId, StoredFile},
    infrastructure::dto::http::FileInfoDto,
    ui::state::AppState,
    usecase::{AuthError, FileError},
};

use super::token_from_headers;

/// Multipart field that carries the uploaded file
const FILE_FIELD: &str = "file";
const DEFAULT_CONTENT_TYPE: &str = "application/octet-stream";

/// Store the `file` field of a multipart body and return its id as plain text
pub async fn upload_file(
    State(state): State<Arc<AppState>>,
    headers: HeaderMap,
    mut multipart: Multipart,
) -> Result<String, StatusCode> {
    let token = token_from_headers(&headers).ok_or(StatusCode::UNAUTHORIZED)?;
    let owner_id = match state.authenticate_usecase.execute(&token).await {
        Ok(user_id) => user_id,
        Err(AuthError::Unauthorized) => return Err(StatusCode::UNAUTHORIZED),
        Err(e) => {
            tracing::error!("Session lookup failed: {}", e);
            return Err(StatusCode::INTERNAL_SERVER_ERROR);
        }
    };

    while let Some(field) = multipart.next_field().await.map_err(|e| {
        tracing::warn!("Invalid multipart body from '{}': {}", owner_id, e);
        StatusCode::BAD_REQUEST
    })? {
        if field.name() != Some(FILE_FIELD) {
            continue;
        }

        let name = field.file_name().unwrap_or(FILE_FIELD).to_string();
        let content_type = field
            .content_type()
            .unwrap_or(DEFAULT_CONTENT_TYPE)
            .to_string();
        let data = field.bytes().await.map_err(|e| {
            tracing::warn!("Failed to read upload from '{}': {}", owner_id, e);
            StatusCode::BAD_REQUEST
        })?;

        return match state
            .upload_file_usecase
            .execute(owner_id, name, content_type, data.to_vec())
            .await
        {
            Ok(id) => Ok(id.into_string()),
            Err(e) => {
                tracing::error!("Failed to store upload: {}", e);
                Err(StatusCode::INTERNAL_SERVER_ERROR)
            }
        };
    }

    tracing::warn!("Upload from '{}' has no '{}' field", owner_id, FILE_FIELD);
    Err(StatusCode::BAD_REQUEST)
}

/// Return the stored bytes with their original content type
pub async fn download_file(
    State(state): State<Arc<AppState>>,
    Path(file_id): Path<String>,
) -> Result<impl IntoResponse, StatusCode> {
    let file = find_file(&state, file_id).await?;
    Ok(([(header::CONTENT_TYPE, file.content_type)], file.data))
}

/// Return `[name, size]` of a stored file
pub async fn file_info(
    State(state): State<Arc<AppState>>,
    Path(file_id): Path<String>,
) -> Result<Json<FileInfoDto>, StatusCode> {
    let file = find_file(&state, file_id).await?;
    Ok(Json(FileInfoDto::from(&file)))
}

async fn find_file(state: &AppState, file_id: String) -> Result<StoredFile, StatusCode> {
    let file_id = FileId::try_from(file_id).map_err(|_| StatusCode::NOT_FOUND)?;
    match state.get_file_usecase.execute(&file_id).await {
        Ok(file) => Ok(file),
        Err(FileError::NotFound(_)) => Err(StatusCode::NOT_FOUND),
        Err(e) => {
            tracing::error!("Failed to load file '{}': {}", file_id, e);
            Err(StatusCode::INTERNAL_SERVER_ERROR)
        }
    }
}
