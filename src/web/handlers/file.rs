//! File handlers for Web API.

use axum::{
    body::Body,
    extract::{Path, State},
    http::header,
    response::Response,
    Json,
};
use std::sync::Arc;

use crate::file::FolderStore;
use crate::web::dto::{ApiResponse, MessageResponse};
use crate::web::error::ApiError;
use crate::web::handlers::AppState;
use crate::web::middleware::AuthUser;

/// Build a `Content-Disposition` value that cannot break out of the header.
///
/// Control characters are dropped and quotes and backslashes replaced in
/// the plain `filename`. Non-ASCII names also get an RFC 5987 `filename*`.
fn content_disposition_header(filename: &str) -> String {
    let plain = filename
        .chars()
        .all(|c| c.is_ascii() && !c.is_control() && c != '"' && c != '\\');
    if plain {
        return format!("attachment; filename=\"{}\"", filename);
    }

    let sanitized: String = filename
        .chars()
        .filter(|c| !c.is_control())
        .map(|c| match c {
            '"' | '\\' => '_',
            c if !c.is_ascii() => '_',
            c => c,
        })
        .collect();

    format!(
        "attachment; filename=\"{}\"; filename*=UTF-8''{}",
        sanitized,
        urlencoding::encode(filename)
    )
}

/// GET /api/files/:id/download - Download a file the caller owns.
pub async fn download_file(
    State(state): State<Arc<AppState>>,
    AuthUser(principal): AuthUser,
    Path(file_id): Path<i64>,
) -> Result<Response, ApiError> {
    let download = FolderStore::new(state.db.pool(), &state.layout)
        .download(principal.id, file_id)
        .await?;

    let file = download.metadata;
    let content = download.content;

    tracing::debug!(
        user_id = principal.id,
        file_id = file.id,
        size = content.len(),
        "File downloaded"
    );

    Response::builder()
        .header(header::CONTENT_TYPE, file.content_type.as_str())
        .header(
            header::CONTENT_DISPOSITION,
            content_disposition_header(&file.filename),
        )
        .header(header::CONTENT_LENGTH, content.len())
        .header(header::CACHE_CONTROL, "private, no-store")
        .body(Body::from(content))
        .map_err(|e| {
            tracing::error!("Failed to build response: {}", e);
            ApiError::internal("Failed to build response")
        })
}

/// DELETE /api/files/:id - Delete a file the caller owns.
pub async fn delete_file(
    State(state): State<Arc<AppState>>,
    AuthUser(principal): AuthUser,
    Path(file_id): Path<i64>,
) -> Result<Json<ApiResponse<MessageResponse>>, ApiError> {
    FolderStore::new(state.db.pool(), &state.layout)
        .delete_file(principal.id, file_id)
        .await?;

    Ok(Json(ApiResponse::new(MessageResponse::new("File deleted"))))
}
