//! On-disk layout for uploaded files.
//!
//! Every folder gets its own directory under the upload root:
//! ```text
//! {upload_root}/
//! └── {owner_id}/
//!     └── {folder_id}/
//!         └── 1718000000000-3f2a9c...e1.pdf
//! ```
//! Stored names never reuse the client's filename, only its extension.

use std::io;
use std::path::{Component, Path, PathBuf};

use chrono::Utc;
use uuid::Uuid;

use crate::{CabinetError, Result};

/// Longest extension kept from an uploaded filename.
const MAX_EXTENSION_LENGTH: usize = 8;

/// Maps owners and folders to directories and performs file I/O.
#[derive(Debug, Clone)]
pub struct FilesystemLayout {
    root: PathBuf,
}

impl FilesystemLayout {
    /// Create a layout rooted at `root`. No I/O happens until [`init`](Self::init).
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    /// Create the upload root if missing.
    pub async fn init(&self) -> Result<()> {
        self.ensure_dir(&self.root).await
    }

    /// Directory holding a folder's files.
    pub fn folder_dir(&self, owner_id: i64, folder_id: i64) -> PathBuf {
        self.root
            .join(owner_id.to_string())
            .join(folder_id.to_string())
    }

    /// Storage path of a file relative to the upload root.
    pub fn relative_path(owner_id: i64, folder_id: i64, stored_name: &str) -> String {
        format!("{owner_id}/{folder_id}/{stored_name}")
    }

    /// Generate a collision-resistant stored name.
    ///
    /// The extension comes from the original name when it is short and
    /// alphanumeric, otherwise from the content type, otherwise `bin`.
    pub fn unique_name(original_name: &str, content_type: &str) -> String {
        format!(
            "{}-{}.{}",
            Utc::now().timestamp_millis(),
            Uuid::new_v4().simple(),
            Self::extension_for(original_name, content_type)
        )
    }

    fn extension_for(original_name: &str, content_type: &str) -> String {
        let from_name = Path::new(original_name)
            .extension()
            .and_then(|ext| ext.to_str())
            .filter(|ext| {
                !ext.is_empty()
                    && ext.len() <= MAX_EXTENSION_LENGTH
                    && ext.chars().all(|c| c.is_ascii_alphanumeric())
            });

        if let Some(ext) = from_name {
            return ext.to_ascii_lowercase();
        }

        mime_guess::get_mime_extensions_str(content_type)
            .and_then(|exts| exts.first())
            .map(|ext| ext.to_string())
            .unwrap_or_else(|| "bin".to_string())
    }

    /// Resolve a stored relative path to an absolute one.
    ///
    /// Only plain path components are accepted, so the result always stays
    /// under the upload root.
    pub fn resolve(&self, relative: &str) -> Result<PathBuf> {
        let path = Path::new(relative);
        let mut components = path.components().peekable();
        if components.peek().is_none() {
            return Err(CabinetError::Validation("empty storage path".to_string()));
        }
        if !components.all(|c| matches!(c, Component::Normal(_))) {
            return Err(CabinetError::Validation(format!(
                "invalid storage path: {relative}"
            )));
        }
        Ok(self.root.join(path))
    }

    /// Create a directory and its parents.
    ///
    /// Succeeds if the directory already exists, including when another
    /// task creates it concurrently.
    pub async fn ensure_dir(&self, path: &Path) -> Result<()> {
        match tokio::fs::create_dir_all(path).await {
            Ok(()) => Ok(()),
            Err(e) if e.kind() == io::ErrorKind::AlreadyExists => {
                match tokio::fs::metadata(path).await {
                    Ok(meta) if meta.is_dir() => Ok(()),
                    _ => Err(e.into()),
                }
            }
            Err(e) => Err(e.into()),
        }
    }

    /// Write `content` to `dir/name`, returning the full path.
    pub async fn write(&self, dir: &Path, name: &str, content: &[u8]) -> Result<PathBuf> {
        let path = dir.join(name);
        tokio::fs::write(&path, content).await?;
        Ok(path)
    }

    /// Read a stored file by its relative path.
    pub async fn read(&self, relative: &str) -> Result<Vec<u8>> {
        let path = self.resolve(relative)?;
        match tokio::fs::read(&path).await {
            Ok(content) => Ok(content),
            Err(e) if e.kind() == io::ErrorKind::NotFound => {
                Err(CabinetError::NotFound("file".to_string()))
            }
            Err(e) => Err(e.into()),
        }
    }

    /// Remove a single file.
    ///
    /// Returns `false` if it did not exist.
    pub async fn remove_file(&self, path: &Path) -> Result<bool> {
        match tokio::fs::remove_file(path).await {
            Ok(()) => Ok(true),
            Err(e) if e.kind() == io::ErrorKind::NotFound => Ok(false),
            Err(e) => Err(e.into()),
        }
    }

    /// Remove a directory and everything under it.
    ///
    /// Returns `false` if it did not exist.
    pub async fn remove_tree(&self, path: &Path) -> Result<bool> {
        match tokio::fs::remove_dir_all(path).await {
            Ok(()) => Ok(true),
            Err(e) if e.kind() == io::ErrorKind::NotFound => Ok(false),
            Err(e) => Err(e.into()),
        }
    }
}
