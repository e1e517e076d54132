//! In-process session store.
//!
//! Sessions live only as long as the process. Useful for tests and for
//! running without persisted sessions.

use std::collections::HashMap;

use tokio::sync::RwLock;

use super::session::SessionStore;
use crate::db::{Principal, SessionRecord};
use crate::Result;

/// [`SessionStore`] backed by a map keyed by token hash.
#[derive(Debug, Default)]
pub struct MemorySessionStore {
    sessions: RwLock<HashMap<String, SessionRecord>>,
}

impl MemorySessionStore {
    /// Create an empty store.
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of stored sessions, expired ones included.
    pub async fn len(&self) -> usize {
        self.sessions.read().await.len()
    }

    /// Whether no sessions are stored.
    pub async fn is_empty(&self) -> bool {
        self.sessions.read().await.is_empty()
    }
}

impl SessionStore for MemorySessionStore {
    async fn insert(&self, token_hash: &str, principal: &Principal, expires_at: i64) -> Result<()> {
        let record = SessionRecord {
            user_id: principal.id,
            email: principal.email.clone(),
            expires_at,
        };
        self.sessions
            .write()
            .await
            .insert(token_hash.to_string(), record);
        Ok(())
    }

    async fn load(&self, token_hash: &str) -> Result<Option<SessionRecord>> {
        Ok(self.sessions.read().await.get(token_hash).cloned())
    }

    async fn extend(&self, token_hash: &str, expires_at: i64) -> Result<()> {
        if let Some(record) = self.sessions.write().await.get_mut(token_hash) {
            record.expires_at = expires_at;
        }
        Ok(())
    }

    async fn remove(&self, token_hash: &str) -> Result<bool> {
        Ok(self.sessions.write().await.remove(token_hash).is_some())
    }

    async fn remove_expired(&self, now: i64) -> Result<u64> {
        let mut sessions = self.sessions.write().await;
        let before = sessions.len();
        sessions.retain(|_, record| record.expires_at > now);
        Ok((before - sessions.len()) as u64)
    }
}
