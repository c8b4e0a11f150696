//! HTTP API response DTOs.

use serde::{Deserialize, Serialize};

/// Response of `GET /api/users/online`
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct OnlineUsersDto {
    pub user_ids: Vec<String>,
}

/// Response of `GET /api/files/{id}/info`, serialized as `[name, size]`
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FileInfoDto(pub String, pub String);
