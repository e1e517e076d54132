//! Persistent session storage backed by SQLite.

use sqlx::SqlitePool;

use super::user::Principal;
use crate::auth::SessionStore;
use crate::{CabinetError, Result};

/// A stored session joined with its owner.
#[derive(Debug, Clone, PartialEq, Eq, sqlx::FromRow)]
pub struct SessionRecord {
    /// Owning user ID.
    pub user_id: i64,
    /// Owning user's email.
    pub email: String,
    /// Expiry as unix seconds.
    pub expires_at: i64,
}

impl SessionRecord {
    /// Project the session's owner.
    pub fn principal(&self) -> Principal {
        Principal {
            id: self.user_id,
            email: self.email.clone(),
        }
    }
}

/// SQLite implementation of [`SessionStore`].
///
/// Holds its own handle to the pool so it can live inside shared state.
#[derive(Debug, Clone)]
pub struct SessionRepository {
    pool: SqlitePool,
}

impl SessionRepository {
    /// Create a repository over the given pool.
    pub fn new(pool: SqlitePool) -> Self {
        Self { pool }
    }

    /// Count sessions belonging to a user.
    pub async fn count_for_user(&self, user_id: i64) -> Result<i64> {
        let count: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM sessions WHERE user_id = ?")
            .bind(user_id)
            .fetch_one(&self.pool)
            .await
            .map_err(|e| CabinetError::Database(e.to_string()))?;

        Ok(count)
    }
}

impl SessionStore for SessionRepository {
    async fn insert(&self, token_hash: &str, principal: &Principal, expires_at: i64) -> Result<()> {
        sqlx::query("INSERT INTO sessions (token_hash, user_id, expires_at) VALUES (?, ?, ?)")
            .bind(token_hash)
            .bind(principal.id)
            .bind(expires_at)
            .execute(&self.pool)
            .await
            .map_err(|e| CabinetError::Database(e.to_string()))?;

        Ok(())
    }

    async fn load(&self, token_hash: &str) -> Result<Option<SessionRecord>> {
        let record = sqlx::query_as::<_, SessionRecord>(
            "SELECT s.user_id, u.email, s.expires_at
             FROM sessions s JOIN users u ON u.id = s.user_id
             WHERE s.token_hash = ?",
        )
        .bind(token_hash)
        .fetch_optional(&self.pool)
        .await
        .map_err(|e| CabinetError::Database(e.to_string()))?;

        Ok(record)
    }

    async fn extend(&self, token_hash: &str, expires_at: i64) -> Result<()> {
        sqlx::query("UPDATE sessions SET expires_at = ? WHERE token_hash = ?")
            .bind(expires_at)
            .bind(token_hash)
            .execute(&self.pool)
            .await
            .map_err(|e| CabinetError::Database(e.to_string()))?;

        Ok(())
    }

    async fn remove(&self, token_hash: &str) -> Result<bool> {
        let result = sqlx::query("DELETE FROM sessions WHERE token_hash = ?")
            .bind(token_hash)
            .execute(&self.pool)
            .await
            .map_err(|e| CabinetError::Database(e.to_string()))?;

        Ok(result.rows_affected() > 0)
    }

    async fn remove_expired(&self, now: i64) -> Result<u64> {
        let result = sqlx::query("DELETE FROM sessions WHERE expires_at <= ?")
            .bind(now)
            .execute(&self.pool)
            .await
            .map_err(|e| CabinetError::Database(e.to_string()))?;

        Ok(result.rows_affected())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::db::{NewUser, UserRepository};
    use crate::Database;

    async fn setup() -> (Database, Principal) {
        let db = Database::open_in_memory().await.unwrap();
        let user = UserRepository::new(db.pool())
            .create(&NewUser::new("a@x.com", "hashed"))
            .await
            .unwrap();
        let principal = Principal::from(&user);
        (db, principal)
    }

    #[tokio::test]
    async fn test_insert_and_load() {
        let (db, principal) = setup().await;
        let repo = SessionRepository::new(db.pool().clone());

        repo.insert("hash-1", &principal, 2_000_000_000).await.unwrap();

        let record = repo.load("hash-1").await.unwrap().unwrap();
        assert_eq!(record.user_id, principal.id);
        assert_eq!(record.email, "a@x.com");
        assert_eq!(record.expires_at, 2_000_000_000);
        assert_eq!(record.principal(), principal);

        assert!(repo.load("missing").await.unwrap().is_none());
    }

    #[tokio::test]
    async fn test_extend() {
        let (db, principal) = setup().await;
        let repo = SessionRepository::new(db.pool().clone());

        repo.insert("hash-1", &principal, 100).await.unwrap();
        repo.extend("hash-1", 500).await.unwrap();

        assert_eq!(repo.load("hash-1").await.unwrap().unwrap().expires_at, 500);
    }

    #[tokio::test]
    async fn test_remove_is_idempotent() {
        let (db, principal) = setup().await;
        let repo = SessionRepository::new(db.pool().clone());

        repo.insert("hash-1", &principal, 100).await.unwrap();
        assert!(repo.remove("hash-1").await.unwrap());
        assert!(!repo.remove("hash-1").await.unwrap());
    }

    #[tokio::test]
    async fn test_remove_expired() {
        let (db, principal) = setup().await;
        let repo = SessionRepository::new(db.pool().clone());

        repo.insert("old", &principal, 100).await.unwrap();
        repo.insert("edge", &principal, 200).await.unwrap();
        repo.insert("fresh", &principal, 300).await.unwrap();

        let removed = repo.remove_expired(200).await.unwrap();
        assert_eq!(removed, 2);
        assert!(repo.load("fresh").await.unwrap().is_some());
        assert_eq!(repo.count_for_user(principal.id).await.unwrap(), 1);
    }
}
