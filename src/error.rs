//! Error types for Cabinet.

use thiserror::Error;

use crate::auth::{PasswordError, SessionError};

/// Common error type for Cabinet.
#[derive(Error, Debug)]
pub enum CabinetError {
    /// Database error.
    ///
    /// Errors from sqlx are converted into this variant.
    #[error("database error: {0}")]
    Database(String),

    /// I/O error.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// Login failed. The inner error never says which credential was wrong.
    #[error("authentication error: {0}")]
    Auth(#[from] SessionError),

    /// The request carried no valid session.
    #[error("not authenticated")]
    Unauthenticated,

    /// Password hashing failed.
    #[error("password error: {0}")]
    Password(#[from] PasswordError),

    /// Validation error for user input.
    #[error("validation error: {0}")]
    Validation(String),

    /// Uploaded content type is not on the allow-list.
    #[error("unsupported content type: {0}")]
    UnsupportedType(String),

    /// Uploaded payload exceeds the size limit.
    #[error("payload of {size} bytes exceeds the {max} byte limit")]
    TooLarge { size: u64, max: u64 },

    /// Resource not found, or not owned by the caller.
    #[error("{0} not found")]
    NotFound(String),

    /// Resource already exists.
    #[error("conflict: {0}")]
    Conflict(String),

    /// Configuration error.
    #[error("configuration error: {0}")]
    Config(String),
}

impl From<sqlx::Error> for CabinetError {
    fn from(e: sqlx::Error) -> Self {
        CabinetError::Database(e.to_string())
    }
}

/// Result type alias for Cabinet operations.
pub type Result<T> = std::result::Result<T, CabinetError>;
