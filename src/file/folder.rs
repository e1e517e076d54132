//! Folder types and repository.

use sqlx::SqlitePool;

use crate::{CabinetError, Result};

/// A folder owned by exactly one user.
#[derive(Debug, Clone, PartialEq, Eq, sqlx::FromRow)]
pub struct Folder {
    /// Unique folder ID.
    pub id: i64,
    /// Folder name.
    pub name: String,
    /// Owning user ID.
    pub owner_id: i64,
    /// When the folder was created.
    pub created_at: String,
}

/// Data for creating a new folder.
#[derive(Debug, Clone)]
pub struct NewFolder {
    /// Folder name, already trimmed.
    pub name: String,
    /// Owning user ID.
    pub owner_id: i64,
}

impl NewFolder {
    /// Create a new folder description.
    pub fn new(name: impl Into<String>, owner_id: i64) -> Self {
        Self {
            name: name.into(),
            owner_id,
        }
    }
}

/// Repository for folder rows.
///
/// Lookups here are raw. Ownership is enforced by passing `owner_id`
/// into the `*_for_owner` queries.
pub struct FolderRepository<'a> {
    pool: &'a SqlitePool,
}

impl<'a> FolderRepository<'a> {
    /// Create a new FolderRepository with the given pool reference.
    pub fn new(pool: &'a SqlitePool) -> Self {
        Self { pool }
    }

    /// Create a new folder.
    pub async fn create(&self, folder: &NewFolder) -> Result<Folder> {
        let result = sqlx::query("INSERT INTO folders (name, owner_id) VALUES (?, ?)")
            .bind(&folder.name)
            .bind(folder.owner_id)
            .execute(self.pool)
            .await
            .map_err(|e| CabinetError::Database(e.to_string()))?;

        let id = result.last_insert_rowid();
        self.get_by_id(id)
            .await?
            .ok_or_else(|| CabinetError::NotFound("folder".to_string()))
    }

    /// Get a folder by ID regardless of owner.
    pub async fn get_by_id(&self, id: i64) -> Result<Option<Folder>> {
        let folder = sqlx::query_as::<_, Folder>(
            "SELECT id, name, owner_id, created_at FROM folders WHERE id = ?",
        )
        .bind(id)
        .fetch_optional(self.pool)
        .await
        .map_err(|e| CabinetError::Database(e.to_string()))?;

        Ok(folder)
    }

    /// Get a folder only if `owner_id` owns it.
    pub async fn get_for_owner(&self, id: i64, owner_id: i64) -> Result<Option<Folder>> {
        let folder = sqlx::query_as::<_, Folder>(
            "SELECT id, name, owner_id, created_at FROM folders WHERE id = ? AND owner_id = ?",
        )
        .bind(id)
        .bind(owner_id)
        .fetch_optional(self.pool)
        .await
        .map_err(|e| CabinetError::Database(e.to_string()))?;

        Ok(folder)
    }

    /// List a user's folders in creation order.
    pub async fn list_by_owner(&self, owner_id: i64) -> Result<Vec<Folder>> {
        let folders = sqlx::query_as::<_, Folder>(
            "SELECT id, name, owner_id, created_at FROM folders WHERE owner_id = ? ORDER BY id",
        )
        .bind(owner_id)
        .fetch_all(self.pool)
        .await
        .map_err(|e| CabinetError::Database(e.to_string()))?;

        Ok(folders)
    }

    /// Delete a folder and its file rows in one transaction.
    pub async fn delete(&self, id: i64) -> Result<bool> {
        let mut tx = self
            .pool
            .begin()
            .await
            .map_err(|e| CabinetError::Database(e.to_string()))?;

        sqlx::query("DELETE FROM files WHERE folder_id = ?")
            .bind(id)
            .execute(&mut *tx)
            .await
            .map_err(|e| CabinetError::Database(e.to_string()))?;

        let result = sqlx::query("DELETE FROM folders WHERE id = ?")
            .bind(id)
            .execute(&mut *tx)
            .await
            .map_err(|e| CabinetError::Database(e.to_string()))?;

        tx.commit()
            .await
            .map_err(|e| CabinetError::Database(e.to_string()))?;

        Ok(result.rows_affected() > 0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::db::{NewUser, UserRepository};
    use crate::Database;

    async fn setup_db() -> Database {
        let db = Database::open_in_memory().await.unwrap();
        let users = UserRepository::new(db.pool());
        users.create(&NewUser::new("a@x.com", "h")).await.unwrap();
        users.create(&NewUser::new("b@x.com", "h")).await.unwrap();
        db
    }

    #[tokio::test]
    async fn test_create_folder() {
        let db = setup_db().await;
        let repo = FolderRepository::new(db.pool());

        let folder = repo.create(&NewFolder::new("docs", 1)).await.unwrap();

        assert_eq!(folder.name, "docs");
        assert_eq!(folder.owner_id, 1);
        assert!(!folder.created_at.is_empty());
    }

    #[tokio::test]
    async fn test_get_for_owner() {
        let db = setup_db().await;
        let repo = FolderRepository::new(db.pool());

        let folder = repo.create(&NewFolder::new("docs", 1)).await.unwrap();

        assert!(repo.get_for_owner(folder.id, 1).await.unwrap().is_some());
        assert!(repo.get_for_owner(folder.id, 2).await.unwrap().is_none());
        assert!(repo.get_by_id(folder.id).await.unwrap().is_some());
    }

    #[tokio::test]
    async fn test_list_by_owner_in_creation_order() {
        let db = setup_db().await;
        let repo = FolderRepository::new(db.pool());

        repo.create(&NewFolder::new("z", 1)).await.unwrap();
        repo.create(&NewFolder::new("other", 2)).await.unwrap();
        repo.create(&NewFolder::new("a", 1)).await.unwrap();
        repo.create(&NewFolder::new("a", 1)).await.unwrap();

        let names: Vec<String> = repo
            .list_by_owner(1)
            .await
            .unwrap()
            .into_iter()
            .map(|f| f.name)
            .collect();
        assert_eq!(names, vec!["z", "a", "a"]);
    }

    #[tokio::test]
    async fn test_delete_removes_file_rows() {
        let db = setup_db().await;
        let repo = FolderRepository::new(db.pool());

        let folder = repo.create(&NewFolder::new("docs", 1)).await.unwrap();
        sqlx::query(
            "INSERT INTO files (folder_id, filename, stored_name, storage_path, content_type, size)
             VALUES (?, 'a.pdf', 's.pdf', '1/1/s.pdf', 'application/pdf', 3)",
        )
        .bind(folder.id)
        .execute(db.pool())
        .await
        .unwrap();

        assert!(repo.delete(folder.id).await.unwrap());
        assert!(repo.get_by_id(folder.id).await.unwrap().is_none());

        let remaining: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM files")
            .fetch_one(db.pool())
            .await
            .unwrap();
        assert_eq!(remaining, 0);

        assert!(!repo.delete(folder.id).await.unwrap());
    }
}
