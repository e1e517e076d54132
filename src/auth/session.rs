//! Authentication session management for Cabinet.
//!
//! A session is an opaque random token handed to the client. Only the
//! SHA-256 of the token is stored. Sessions slide: every successful
//! resolve pushes the expiry out by the configured TTL.

use std::future::Future;
use std::time::Duration;

use chrono::{DateTime, TimeZone, Utc};
use rand_core::{OsRng, RngCore};
use sha2::{Digest, Sha256};
use thiserror::Error;
use tracing::{debug, info, warn};

use super::password::verify_password_blocking;
use crate::db::{Principal, SessionRecord, User};
use crate::Result;

/// Session-related errors.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum SessionError {
    /// Unknown email or wrong password. Which one is never disclosed.
    #[error("invalid credentials")]
    InvalidCredentials,
}

/// Default session lifetime (24 hours).
pub const DEFAULT_SESSION_TTL_SECS: u64 = 24 * 60 * 60;

/// Random bytes in a session token.
const TOKEN_BYTES: usize = 32;

/// Storage backend for sessions.
///
/// Keys are token hashes, never raw tokens.
pub trait SessionStore: Send + Sync {
    /// Store a new session.
    fn insert(
        &self,
        token_hash: &str,
        principal: &Principal,
        expires_at: i64,
    ) -> impl Future<Output = Result<()>> + Send;

    /// Load a session with its owner.
    fn load(&self, token_hash: &str) -> impl Future<Output = Result<Option<SessionRecord>>> + Send;

    /// Move a session's expiry.
    fn extend(&self, token_hash: &str, expires_at: i64) -> impl Future<Output = Result<()>> + Send;

    /// Remove a session. Returns whether one existed.
    fn remove(&self, token_hash: &str) -> impl Future<Output = Result<bool>> + Send;

    /// Remove every session expiring at or before `now`.
    fn remove_expired(&self, now: i64) -> impl Future<Output = Result<u64>> + Send;
}

/// A freshly issued session.
#[derive(Debug, Clone)]
pub struct AuthSession {
    /// Opaque bearer token. Only the client holds it in clear.
    pub token: String,
    /// User ID associated with this session.
    pub user_id: i64,
    /// When the session expires unless renewed.
    pub expires_at: DateTime<Utc>,
}

/// Hash a token for storage.
pub fn hash_token(token: &str) -> String {
    format!("{:x}", Sha256::digest(token.as_bytes()))
}

fn generate_token() -> String {
    let mut bytes = [0u8; TOKEN_BYTES];
    OsRng.fill_bytes(&mut bytes);
    bytes.iter().map(|b| format!("{b:02x}")).collect()
}

/// Session manager over an injected [`SessionStore`].
#[derive(Debug, Clone)]
pub struct SessionManager<S> {
    store: S,
    ttl: Duration,
}

impl<S: SessionStore> SessionManager<S> {
    /// Create a session manager with the given lifetime.
    pub fn new(store: S, ttl: Duration) -> Self {
        Self { store, ttl }
    }

    /// Session lifetime.
    pub fn ttl(&self) -> Duration {
        self.ttl
    }

    /// The underlying store.
    pub fn store(&self) -> &S {
        &self.store
    }

    fn expiry_from(&self, now: i64) -> i64 {
        now.saturating_add(i64::try_from(self.ttl.as_secs()).unwrap_or(i64::MAX))
    }

    /// Attempt to log in a user.
    ///
    /// `user` is the account looked up by `email`, if any. An unknown
    /// account and a wrong password produce the same error and take the
    /// same time.
    pub async fn login(
        &self,
        email: &str,
        password: &str,
        user: Option<&User>,
    ) -> Result<AuthSession> {
        let digest = user.map(|u| u.password.clone());
        let matched = verify_password_blocking(password.to_string(), digest).await;

        let user = match user {
            Some(u) if matched => u,
            Some(_) => {
                warn!(email = %email, "Login failed: wrong password");
                return Err(SessionError::InvalidCredentials.into());
            }
            None => {
                warn!(email = %email, "Login failed: user not found");
                return Err(SessionError::InvalidCredentials.into());
            }
        };

        let session = self.issue(user).await?;
        info!(email = %email, user_id = user.id, "Login successful");
        Ok(session)
    }

    /// Issue a new session for a user.
    ///
    /// Existing sessions for the same user stay valid.
    pub async fn issue(&self, user: &User) -> Result<AuthSession> {
        let token = generate_token();
        let now = Utc::now().timestamp();
        let expires_at = self.expiry_from(now);

        self.store
            .insert(&hash_token(&token), &Principal::from(user), expires_at)
            .await?;

        debug!(user_id = user.id, expires_at = expires_at, "Session issued");

        Ok(AuthSession {
            token,
            user_id: user.id,
            expires_at: Utc
                .timestamp_opt(expires_at, 0)
                .single()
                .unwrap_or(DateTime::<Utc>::MAX_UTC),
        })
    }

    /// Resolve a token to its principal.
    ///
    /// Returns `None` for unknown or expired tokens. Expired sessions are
    /// removed on sight. A live session has its expiry renewed.
    pub async fn resolve(&self, token: &str) -> Result<Option<Principal>> {
        if token.is_empty() {
            return Ok(None);
        }

        let token_hash = hash_token(token);
        let Some(record) = self.store.load(&token_hash).await? else {
            debug!("Session not found");
            return Ok(None);
        };

        let now = Utc::now().timestamp();
        if record.expires_at <= now {
            self.store.remove(&token_hash).await?;
            debug!(user_id = record.user_id, "Session expired");
            return Ok(None);
        }

        self.store.extend(&token_hash, self.expiry_from(now)).await?;
        Ok(Some(record.principal()))
    }

    /// Invalidate a session. Unknown tokens are a no-op.
    pub async fn invalidate(&self, token: &str) -> Result<bool> {
        let removed = self.store.remove(&hash_token(token)).await?;
        if removed {
            info!("Session logged out");
        } else {
            debug!("Logout: session not found");
        }
        Ok(removed)
    }

    /// Remove all expired sessions.
    pub async fn sweep_expired(&self) -> Result<u64> {
        let removed = self.store.remove_expired(Utc::now().timestamp()).await?;
        if removed > 0 {
            debug!(removed = removed, "Cleaned up expired sessions");
        }
        Ok(removed)
    }
}
