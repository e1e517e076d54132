//! File metadata types and repository.

use sqlx::SqlitePool;

use crate::{CabinetError, Result};

/// Metadata of a stored file.
#[derive(Debug, Clone, PartialEq, Eq, sqlx::FromRow)]
pub struct FileMetadata {
    /// Unique file ID.
    pub id: i64,
    /// Containing folder ID.
    pub folder_id: i64,
    /// Filename as uploaded.
    pub filename: String,
    /// Name on disk.
    pub stored_name: String,
    /// Path relative to the upload root.
    pub storage_path: String,
    /// Declared content type.
    pub content_type: String,
    /// Size in bytes.
    pub size: i64,
    /// When the file was uploaded.
    pub created_at: String,
}

/// Data for recording a new file.
#[derive(Debug, Clone)]
pub struct NewFile {
    /// Containing folder ID.
    pub folder_id: i64,
    /// Filename as uploaded.
    pub filename: String,
    /// Name on disk.
    pub stored_name: String,
    /// Path relative to the upload root.
    pub storage_path: String,
    /// Declared content type.
    pub content_type: String,
    /// Size in bytes.
    pub size: i64,
}

const FILE_COLUMNS: &str =
    "f.id, f.folder_id, f.filename, f.stored_name, f.storage_path, f.content_type, f.size, f.created_at";

/// Repository for file rows.
pub struct FileRepository<'a> {
    pool: &'a SqlitePool,
}

impl<'a> FileRepository<'a> {
    /// Create a new FileRepository with the given pool reference.
    pub fn new(pool: &'a SqlitePool) -> Self {
        Self { pool }
    }

    /// Record a new file.
    pub async fn create(&self, file: &NewFile) -> Result<FileMetadata> {
        let result = sqlx::query(
            "INSERT INTO files (folder_id, filename, stored_name, storage_path, content_type, size)
             VALUES (?, ?, ?, ?, ?, ?)",
        )
        .bind(file.folder_id)
        .bind(&file.filename)
        .bind(&file.stored_name)
        .bind(&file.storage_path)
        .bind(&file.content_type)
        .bind(file.size)
        .execute(self.pool)
        .await
        .map_err(|e| CabinetError::Database(e.to_string()))?;

        let id = result.last_insert_rowid();
        self.get_by_id(id)
            .await?
            .ok_or_else(|| CabinetError::NotFound("file".to_string()))
    }

    /// Get a file by ID regardless of owner.
    pub async fn get_by_id(&self, id: i64) -> Result<Option<FileMetadata>> {
        let sql = format!("SELECT {FILE_COLUMNS} FROM files f WHERE f.id = ?");
        let file = sqlx::query_as::<_, FileMetadata>(&sql)
            .bind(id)
            .fetch_optional(self.pool)
            .await
            .map_err(|e| CabinetError::Database(e.to_string()))?;

        Ok(file)
    }

    /// Get a file only if its folder is owned by `owner_id`.
    pub async fn get_for_owner(&self, id: i64, owner_id: i64) -> Result<Option<FileMetadata>> {
        let sql = format!(
            "SELECT {FILE_COLUMNS} FROM files f
             JOIN folders d ON d.id = f.folder_id
             WHERE f.id = ? AND d.owner_id = ?"
        );
        let file = sqlx::query_as::<_, FileMetadata>(&sql)
            .bind(id)
            .bind(owner_id)
            .fetch_optional(self.pool)
            .await
            .map_err(|e| CabinetError::Database(e.to_string()))?;

        Ok(file)
    }

    /// List files in a folder in upload order.
    pub async fn list_by_folder(&self, folder_id: i64) -> Result<Vec<FileMetadata>> {
        let sql = format!("SELECT {FILE_COLUMNS} FROM files f WHERE f.folder_id = ? ORDER BY f.id");
        let files = sqlx::query_as::<_, FileMetadata>(&sql)
            .bind(folder_id)
            .fetch_all(self.pool)
            .await
            .map_err(|e| CabinetError::Database(e.to_string()))?;

        Ok(files)
    }

    /// List every file in every folder owned by `owner_id`.
    pub async fn list_by_owner(&self, owner_id: i64) -> Result<Vec<FileMetadata>> {
        let sql = format!(
            "SELECT {FILE_COLUMNS} FROM files f
             JOIN folders d ON d.id = f.folder_id
             WHERE d.owner_id = ?
             ORDER BY f.folder_id, f.id"
        );
        let files = sqlx::query_as::<_, FileMetadata>(&sql)
            .bind(owner_id)
            .fetch_all(self.pool)
            .await
            .map_err(|e| CabinetError::Database(e.to_string()))?;

        Ok(files)
    }

    /// Delete a file row.
    pub async fn delete(&self, id: i64) -> Result<bool> {
        let result = sqlx::query("DELETE FROM files WHERE id = ?")
            .bind(id)
            .execute(self.pool)
            .await
            .map_err(|e| CabinetError::Database(e.to_string()))?;

        Ok(result.rows_affected() > 0)
    }
}
