//! Middleware for Web API.

pub mod auth;
pub mod cors;
pub mod security;

pub use auth::{cookie_token, refresh_session_cookie, session_token, AuthUser, SessionRefresh};
pub use cors::create_cors_layer;
pub use security::security_headers;
