//! Ownership-scoped folder and file operations.
//!
//! Every operation takes the acting user's ID and re-checks ownership
//! against the database on each call. A folder or file owned by someone
//! else is reported exactly like one that does not exist.

use std::collections::HashMap;

use sqlx::SqlitePool;
use tracing::{info, warn};

use super::folder::{Folder, FolderRepository, NewFolder};
use super::layout::FilesystemLayout;
use super::metadata::{FileMetadata, FileRepository};
use super::MAX_FOLDER_NAME_LENGTH;
use crate::{CabinetError, Result};

/// A folder with its files attached.
#[derive(Debug, Clone)]
pub struct FolderWithFiles {
    /// The folder.
    pub folder: Folder,
    /// Its files in upload order.
    pub files: Vec<FileMetadata>,
}

/// Result of a file download.
#[derive(Debug)]
pub struct Download {
    /// File metadata.
    pub metadata: FileMetadata,
    /// File content.
    pub content: Vec<u8>,
}

/// Folder and file operations for a single owner at a time.
pub struct FolderStore<'a> {
    pool: &'a SqlitePool,
    layout: &'a FilesystemLayout,
}

impl<'a> FolderStore<'a> {
    /// Create a new FolderStore.
    pub fn new(pool: &'a SqlitePool, layout: &'a FilesystemLayout) -> Self {
        Self { pool, layout }
    }

    /// Create a folder. Names are trimmed and need not be unique.
    pub async fn create(&self, owner_id: i64, name: &str) -> Result<Folder> {
        let name = name.trim();
        if name.is_empty() {
            return Err(CabinetError::Validation(
                "folder name must not be empty".to_string(),
            ));
        }
        if name.chars().count() > MAX_FOLDER_NAME_LENGTH {
            return Err(CabinetError::Validation(format!(
                "folder name must be at most {MAX_FOLDER_NAME_LENGTH} characters"
            )));
        }

        let folder = FolderRepository::new(self.pool)
            .create(&NewFolder::new(name, owner_id))
            .await?;

        info!(owner_id = owner_id, folder_id = folder.id, "Folder created");
        Ok(folder)
    }

    /// List the owner's folders in creation order, files attached.
    pub async fn list(&self, owner_id: i64) -> Result<Vec<FolderWithFiles>> {
        let folders = FolderRepository::new(self.pool)
            .list_by_owner(owner_id)
            .await?;

        let mut files_by_folder: HashMap<i64, Vec<FileMetadata>> = HashMap::new();
        for file in FileRepository::new(self.pool)
            .list_by_owner(owner_id)
            .await?
        {
            files_by_folder.entry(file.folder_id).or_default().push(file);
        }

        Ok(folders
            .into_iter()
            .map(|folder| {
                let files = files_by_folder.remove(&folder.id).unwrap_or_default();
                FolderWithFiles { folder, files }
            })
            .collect())
    }

    /// Get a folder owned by `owner_id`.
    pub async fn get(&self, owner_id: i64, folder_id: i64) -> Result<Folder> {
        FolderRepository::new(self.pool)
            .get_for_owner(folder_id, owner_id)
            .await?
            .ok_or_else(|| CabinetError::NotFound("folder".to_string()))
    }

    /// Delete a folder, its directory and its file rows.
    ///
    /// The directory goes first. If removing it fails, no rows are deleted.
    pub async fn delete(&self, owner_id: i64, folder_id: i64) -> Result<()> {
        let folder = self.get(owner_id, folder_id).await?;

        let dir = self.layout.folder_dir(owner_id, folder.id);
        self.layout.remove_tree(&dir).await.inspect_err(|e| {
            warn!(folder_id = folder.id, error = %e, "Failed to remove folder directory");
        })?;

        FolderRepository::new(self.pool).delete(folder.id).await?;

        info!(owner_id = owner_id, folder_id = folder.id, "Folder deleted");
        Ok(())
    }

    /// List files in a folder owned by `owner_id`.
    pub async fn list_files(&self, owner_id: i64, folder_id: i64) -> Result<Vec<FileMetadata>> {
        let folder = self.get(owner_id, folder_id).await?;
        FileRepository::new(self.pool).list_by_folder(folder.id).await
    }

    /// Get a file whose folder is owned by `owner_id`.
    pub async fn get_file(&self, owner_id: i64, file_id: i64) -> Result<FileMetadata> {
        FileRepository::new(self.pool)
            .get_for_owner(file_id, owner_id)
            .await?
            .ok_or_else(|| CabinetError::NotFound("file".to_string()))
    }

    /// Read a file's content.
    pub async fn download(&self, owner_id: i64, file_id: i64) -> Result<Download> {
        let metadata = self.get_file(owner_id, file_id).await?;
        let content = self.layout.read(&metadata.storage_path).await?;
        Ok(Download { metadata, content })
    }

    /// Delete a single file, disk first.
    pub async fn delete_file(&self, owner_id: i64, file_id: i64) -> Result<()> {
        let metadata = self.get_file(owner_id, file_id).await?;

        let path = self.layout.resolve(&metadata.storage_path)?;
        self.layout.remove_file(&path).await?;
        FileRepository::new(self.pool).delete(metadata.id).await?;

        info!(owner_id = owner_id, file_id = metadata.id, "File deleted");
        Ok(())
    }
}
