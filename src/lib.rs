//! Cabinet - session-authenticated file storage
//!
//! Users sign up, log in and keep files in folders they own. Every folder
//! and file operation is scoped to the caller's account.

pub mod auth;
pub mod config;
pub mod datetime;
pub mod db;
pub mod error;
pub mod file;
pub mod logging;
pub mod web;

pub use auth::{
    hash_password, require, validate_password, verify_password, AuthSession, PasswordError,
    SessionError, SessionManager, SessionStore,
};
pub use config::Config;
pub use db::{Database, NewUser, Principal, SessionRepository, User, UserRepository};
pub use error::{CabinetError, Result};
pub use file::{FilesystemLayout, FolderStore, UploadPipeline};
pub use web::{create_router, AppState, WebServer};
