//! User model for Cabinet.

use serde::Serialize;

/// User entity representing a registered account.
///
/// Deliberately not `Serialize`: the password digest must never leave the
/// process. Use [`Principal`] for anything outward-facing.
#[derive(Debug, Clone, sqlx::FromRow)]
pub struct User {
    /// Unique user ID.
    pub id: i64,
    /// Login email, unique as stored.
    pub email: String,
    /// Argon2 password digest.
    pub password: String,
    /// Account creation timestamp.
    pub created_at: String,
}

/// New user for insertion.
#[derive(Debug, Clone)]
pub struct NewUser {
    /// Login email.
    pub email: String,
    /// Argon2 password digest (already hashed).
    pub password: String,
}

impl NewUser {
    /// Create a new user with an already hashed password.
    pub fn new(email: impl Into<String>, password: impl Into<String>) -> Self {
        Self {
            email: email.into(),
            password: password.into(),
        }
    }
}

/// The identity attached to an authenticated request.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, sqlx::FromRow)]
pub struct Principal {
    /// User ID.
    pub id: i64,
    /// Login email.
    pub email: String,
}

impl From<&User> for Principal {
    fn from(user: &User) -> Self {
        Self {
            id: user.id,
            email: user.email.clone(),
        }
    }
}
