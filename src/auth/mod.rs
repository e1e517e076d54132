//! Authentication module for Cabinet.
//!
//! This module provides password hashing, session management with a
//! SQLite or in-process store, and the authorization guard.

mod guard;
mod password;
mod session;
mod store;

pub use guard::require;
pub use password::{
    burn_verification, hash_password, hash_password_blocking, validate_password, verify_password,
    verify_password_blocking, PasswordError, MAX_PASSWORD_LENGTH,
};
pub use session::{
    hash_token, AuthSession, SessionError, SessionManager, SessionStore, DEFAULT_SESSION_TTL_SECS,
};
pub use store::MemorySessionStore;
