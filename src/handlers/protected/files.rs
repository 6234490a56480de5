use axum::extract::{Multipart, Path, State};
use serde_json::{json, Value};

use crate::auth::extract::{Admin, Authenticated};
use crate::error::ApiError;
use crate::middleware::response::{ApiResponse, ApiResult};
use crate::state::AppState;

/// POST /files/upload - store a file and return its retrievable URL, admin only
pub async fn upload(
    State(state): State<AppState>,
    Admin(_): Admin,
    mut multipart: Multipart,
) -> ApiResult<Value> {
    while let Some(field) = multipart
        .next_field()
        .await
        .map_err(|e| ApiError::bad_request(format!("invalid multipart body: {}", e)))?
    {
        if field.name() != Some("file") {
            continue;
        }

        let name = field
            .file_name()
            .map(str::to_string)
            .ok_or_else(|| ApiError::bad_request("file field needs a filename"))?;
        validate_object_name(&name)?;

        let content_type = field.content_type().map(str::to_string);
        let bytes = field
            .bytes()
            .await
            .map_err(|e| ApiError::bad_request(format!("failed to read file field: {}", e)))?;

        let url = state
            .storage
            .upload(&name, content_type.as_deref(), bytes.to_vec())
            .await?;
        return Ok(ApiResponse::success(json!({ "url": url })));
    }

    Err(ApiError::bad_request("multipart body is missing a 'file' field"))
}

/// GET /files/download/:file_id - resolve a stored file to its retrievable URL,
/// any authenticated caller
pub async fn download(
    State(state): State<AppState>,
    Authenticated(_): Authenticated,
    Path(file_id): Path<String>,
) -> ApiResult<Value> {
    validate_object_name(&file_id)?;
    let url = state.storage.public_url(&file_id);
    Ok(ApiResponse::success(json!({ "download_url": url })))
}

// Object names become URL path segments; separators would escape the bucket
// namespace.
fn validate_object_name(name: &str) -> Result<(), ApiError> {
    if name.is_empty() || name.contains('/') || name.contains('\\') || name.contains("..") {
        return Err(ApiError::bad_request("invalid file name"));
    }
    Ok(())
}
