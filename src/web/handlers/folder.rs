//! Folder handlers for Web API.

use axum::{
    extract::{Multipart, Path, State},
    http::StatusCode,
    Json,
};
use std::sync::Arc;

use crate::file::{FolderStore, UploadPipeline, UploadRequest};
use crate::web::dto::{
    ApiResponse, CreateFolderRequest, FileResponse, FolderResponse, MessageResponse,
    ValidatedJson,
};
use crate::web::error::ApiError;
use crate::web::handlers::AppState;
use crate::web::middleware::AuthUser;

/// Multipart field carrying the upload.
const FILE_FIELD: &str = "file";

/// GET /api/folders - List the caller's folders with their files.
pub async fn list_folders(
    State(state): State<Arc<AppState>>,
    AuthUser(principal): AuthUser,
) -> Result<Json<ApiResponse<Vec<FolderResponse>>>, ApiError> {
    let folders = FolderStore::new(state.db.pool(), &state.layout)
        .list(principal.id)
        .await?;

    let response = folders.into_iter().map(FolderResponse::from).collect();
    Ok(Json(ApiResponse::new(response)))
}

/// POST /api/folders - Create a folder.
pub async fn create_folder(
    State(state): State<Arc<AppState>>,
    AuthUser(principal): AuthUser,
    ValidatedJson(req): ValidatedJson<CreateFolderRequest>,
) -> Result<(StatusCode, Json<ApiResponse<FolderResponse>>), ApiError> {
    let folder = FolderStore::new(state.db.pool(), &state.layout)
        .create(principal.id, &req.name)
        .await?;

    Ok((
        StatusCode::CREATED,
        Json(ApiResponse::new(FolderResponse::from(folder))),
    ))
}

/// GET /api/folders/:id - Get a folder.
pub async fn get_folder(
    State(state): State<Arc<AppState>>,
    AuthUser(principal): AuthUser,
    Path(folder_id): Path<i64>,
) -> Result<Json<ApiResponse<FolderResponse>>, ApiError> {
    let folder = FolderStore::new(state.db.pool(), &state.layout)
        .get(principal.id, folder_id)
        .await?;

    Ok(Json(ApiResponse::new(FolderResponse::from(folder))))
}

/// DELETE /api/folders/:id - Delete a folder, its files and its directory.
pub async fn delete_folder(
    State(state): State<Arc<AppState>>,
    AuthUser(principal): AuthUser,
    Path(folder_id): Path<i64>,
) -> Result<Json<ApiResponse<MessageResponse>>, ApiError> {
    FolderStore::new(state.db.pool(), &state.layout)
        .delete(principal.id, folder_id)
        .await?;

    Ok(Json(ApiResponse::new(MessageResponse::new("Folder deleted"))))
}

/// GET /api/folders/:id/files - List files in a folder.
pub async fn list_files(
    State(state): State<Arc<AppState>>,
    AuthUser(principal): AuthUser,
    Path(folder_id): Path<i64>,
) -> Result<Json<ApiResponse<Vec<FileResponse>>>, ApiError> {
    let files = FolderStore::new(state.db.pool(), &state.layout)
        .list_files(principal.id, folder_id)
        .await?;

    let response = files.into_iter().map(FileResponse::from).collect();
    Ok(Json(ApiResponse::new(response)))
}

/// POST /api/folders/:id/files - Upload a file (multipart field `file`).
pub async fn upload_file(
    State(state): State<Arc<AppState>>,
    AuthUser(principal): AuthUser,
    Path(folder_id): Path<i64>,
    mut multipart: Multipart,
) -> Result<(StatusCode, Json<ApiResponse<FileResponse>>), ApiError> {
    let mut request: Option<UploadRequest> = None;

    while let Some(field) = multipart.next_field().await.map_err(ApiError::from_multipart)? {
        if field.name() != Some(FILE_FIELD) {
            continue;
        }

        let filename = field.file_name().unwrap_or_default().to_string();
        let content_type = field
            .content_type()
            .map(str::to_string)
            .unwrap_or_else(|| {
                mime_guess::from_path(&filename)
                    .first_or_octet_stream()
                    .to_string()
            });
        let content = field.bytes().await.map_err(ApiError::from_multipart)?;

        request = Some(UploadRequest::new(filename, content_type, content.to_vec()));
        break;
    }

    let request = request.ok_or_else(|| ApiError::bad_request("No file provided"))?;

    let metadata = UploadPipeline::new(state.db.pool(), &state.layout)
        .upload(principal.id, folder_id, request)
        .await?;

    Ok((
        StatusCode::CREATED,
        Json(ApiResponse::new(FileResponse::from(metadata))),
    ))
}
