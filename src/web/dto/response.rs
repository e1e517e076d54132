//! Response DTOs for Web API.

use chrono::{DateTime, SecondsFormat, Utc};
use serde::Serialize;

use crate::datetime::to_rfc3339;
use crate::db::Principal;
use crate::file::{FileMetadata, Folder, FolderWithFiles};

// ============================================================================
// Generic Response Wrappers
// ============================================================================

/// Generic API response wrapper.
#[derive(Debug, Serialize)]
pub struct ApiResponse<T: Serialize> {
    /// Response data.
    pub data: T,
}

impl<T: Serialize> ApiResponse<T> {
    /// Create a new API response.
    pub fn new(data: T) -> Self {
        Self { data }
    }
}

/// Plain acknowledgement.
#[derive(Debug, Serialize)]
pub struct MessageResponse {
    /// Human-readable message.
    pub message: String,
}

impl MessageResponse {
    /// Create a new message response.
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
        }
    }
}

// ============================================================================
// Auth
// ============================================================================

/// Public view of a user.
#[derive(Debug, Serialize)]
pub struct UserResponse {
    /// User ID.
    pub id: i64,
    /// Login email.
    pub email: String,
}

impl From<Principal> for UserResponse {
    fn from(principal: Principal) -> Self {
        Self {
            id: principal.id,
            email: principal.email,
        }
    }
}

/// Signup and login response.
#[derive(Debug, Serialize)]
pub struct AuthResponse {
    /// Human-readable message.
    pub message: String,
    /// The authenticated user.
    pub user: UserResponse,
    /// Session token, also set as a cookie.
    pub token: String,
    /// Session expiry (RFC3339).
    pub expires_at: String,
}

impl AuthResponse {
    /// Create a new auth response.
    pub fn new(
        message: impl Into<String>,
        user: UserResponse,
        token: String,
        expires_at: DateTime<Utc>,
    ) -> Self {
        Self {
            message: message.into(),
            user,
            token,
            expires_at: expires_at.to_rfc3339_opts(SecondsFormat::Secs, true),
        }
    }
}

// ============================================================================
// Folders and files
// ============================================================================

/// File metadata as returned by the API.
///
/// Storage paths stay server-side.
#[derive(Debug, Serialize)]
pub struct FileResponse {
    /// File ID.
    pub id: i64,
    /// Owning folder ID.
    pub folder_id: i64,
    /// Original filename.
    pub filename: String,
    /// MIME type.
    pub content_type: String,
    /// Size in bytes.
    pub size: i64,
    /// Upload time (RFC3339).
    pub created_at: String,
}

impl From<FileMetadata> for FileResponse {
    fn from(file: FileMetadata) -> Self {
        Self {
            id: file.id,
            folder_id: file.folder_id,
            filename: file.filename,
            content_type: file.content_type,
            size: file.size,
            created_at: to_rfc3339(&file.created_at),
        }
    }
}

/// Folder as returned by the API.
#[derive(Debug, Serialize)]
pub struct FolderResponse {
    /// Folder ID.
    pub id: i64,
    /// Folder name.
    pub name: String,
    /// Creation time (RFC3339).
    pub created_at: String,
    /// Contained files, present on listings.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub files: Option<Vec<FileResponse>>,
}

impl From<Folder> for FolderResponse {
    fn from(folder: Folder) -> Self {
        Self {
            id: folder.id,
            name: folder.name,
            created_at: to_rfc3339(&folder.created_at),
            files: None,
        }
    }
}

impl From<FolderWithFiles> for FolderResponse {
    fn from(entry: FolderWithFiles) -> Self {
        let files = entry.files.into_iter().map(FileResponse::from).collect();
        Self {
            files: Some(files),
            ..FolderResponse::from(entry.folder)
        }
    }
}
