//! File management module for Cabinet.
//!
//! This module provides:
//! - Folder and file metadata repositories
//! - The on-disk layout under the upload root
//! - Ownership-scoped folder operations
//! - The upload pipeline with compensating cleanup

mod folder;
mod layout;
mod metadata;
mod store;
mod upload;

pub use folder::{Folder, FolderRepository, NewFolder};
pub use layout::FilesystemLayout;
pub use metadata::{FileMetadata, FileRepository, NewFile};
pub use store::{Download, FolderStore, FolderWithFiles};
pub use upload::{
    normalize_content_type, sanitize_filename, validate, StoredRef, UploadPipeline,
    UploadRequest, UploadStage,
};

/// Content types accepted for upload.
pub const ALLOWED_CONTENT_TYPES: &[&str] = &["image/jpeg", "image/png", "image/gif", "application/pdf"];

/// Maximum upload size (5 MiB).
pub const MAX_UPLOAD_SIZE: u64 = 5 * 1024 * 1024;

/// Maximum length for folder names (in characters).
pub const MAX_FOLDER_NAME_LENGTH: usize = 100;

/// Maximum length for filenames (in characters).
pub const MAX_FILENAME_LENGTH: usize = 255;
