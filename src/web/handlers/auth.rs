//! Authentication handlers.

use axum::{extract::State, http::HeaderMap, http::StatusCode, Json};
use axum_extra::extract::cookie::{Cookie, CookieJar, SameSite};
use std::sync::Arc;
use std::time::Duration;

use crate::auth::{hash_password_blocking, PasswordError, SessionManager};
use crate::config::SessionConfig;
use crate::db::{NewUser, SessionRepository, UserRepository};
use crate::file::FilesystemLayout;
use crate::web::dto::{
    ApiResponse, AuthResponse, LoginRequest, MessageResponse, SignupRequest, UserResponse,
    ValidatedJson,
};
use crate::web::error::ApiError;
use crate::web::middleware::{session_token, AuthUser};
use crate::{CabinetError, Database};

/// Application state shared across handlers.
pub struct AppState {
    /// Database pool.
    pub db: Database,
    /// On-disk upload layout.
    pub layout: FilesystemLayout,
    /// Session manager backed by the database.
    pub sessions: SessionManager<SessionRepository>,
    cookie_name: String,
    cookie_secure: bool,
}

impl AppState {
    /// Create a new application state.
    pub fn new(db: Database, layout: FilesystemLayout, config: &SessionConfig) -> Self {
        let sessions = SessionManager::new(
            SessionRepository::new(db.pool().clone()),
            Duration::from_secs(config.ttl_secs),
        );

        Self {
            db,
            layout,
            sessions,
            cookie_name: config.cookie_name.clone(),
            cookie_secure: config.cookie_secure,
        }
    }

    /// Name of the session cookie.
    pub fn cookie_name(&self) -> &str {
        &self.cookie_name
    }

    /// Build the session cookie for a token.
    pub fn session_cookie(&self, token: String) -> Cookie<'static> {
        let max_age = i64::try_from(self.sessions.ttl().as_secs()).unwrap_or(i64::MAX);
        Cookie::build((self.cookie_name.clone(), token))
            .path("/")
            .http_only(true)
            .secure(self.cookie_secure)
            .same_site(SameSite::Lax)
            .max_age(cookie::time::Duration::seconds(max_age))
            .build()
    }

    /// Build an expired, empty session cookie that clears the client's copy.
    pub fn removal_cookie(&self) -> Cookie<'static> {
        Cookie::build((self.cookie_name.clone(), ""))
            .path("/")
            .http_only(true)
            .secure(self.cookie_secure)
            .same_site(SameSite::Lax)
            .max_age(cookie::time::Duration::ZERO)
            .build()
    }
}

/// POST /api/auth/signup - Create an account and log it in.
pub async fn signup(
    State(state): State<Arc<AppState>>,
    jar: CookieJar,
    ValidatedJson(req): ValidatedJson<SignupRequest>,
) -> Result<(StatusCode, CookieJar, Json<ApiResponse<AuthResponse>>), ApiError> {
    let repo = UserRepository::new(state.db.pool());

    if repo.email_exists(&req.email).await? {
        return Err(ApiError::conflict("Email already registered"));
    }

    let digest = hash_password_blocking(req.password)
        .await
        .map_err(|e| match e {
            PasswordError::HashError(_) => CabinetError::Password(e),
            other => CabinetError::Validation(other.to_string()),
        })?;

    let user = repo.create(&NewUser::new(req.email, digest)).await?;
    let session = state.sessions.issue(&user).await?;

    tracing::info!(user_id = user.id, email = %user.email, "User signed up");

    let jar = jar.add(state.session_cookie(session.token.clone()));
    let response = AuthResponse::new(
        "User created successfully",
        UserResponse {
            id: user.id,
            email: user.email,
        },
        session.token,
        session.expires_at,
    );

    Ok((StatusCode::CREATED, jar, Json(ApiResponse::new(response))))
}

/// POST /api/auth/login - Log in with email and password.
pub async fn login(
    State(state): State<Arc<AppState>>,
    jar: CookieJar,
    ValidatedJson(req): ValidatedJson<LoginRequest>,
) -> Result<(CookieJar, Json<ApiResponse<AuthResponse>>), ApiError> {
    let user = UserRepository::new(state.db.pool())
        .get_by_email(&req.email)
        .await?;

    let session = state
        .sessions
        .login(&req.email, &req.password, user.as_ref())
        .await?;

    let jar = jar.add(state.session_cookie(session.token.clone()));
    let response = AuthResponse::new(
        "Logged in successfully",
        UserResponse {
            id: session.user_id,
            email: req.email,
        },
        session.token,
        session.expires_at,
    );

    Ok((jar, Json(ApiResponse::new(response))))
}

/// POST /api/auth/logout - End the current session.
///
/// Succeeds whether or not a session was presented.
pub async fn logout(
    State(state): State<Arc<AppState>>,
    headers: HeaderMap,
    jar: CookieJar,
) -> Result<(CookieJar, Json<ApiResponse<MessageResponse>>), ApiError> {
    if let Some(token) = session_token(&headers, state.cookie_name()) {
        state.sessions.invalidate(&token).await?;
    }

    // Always sent, even for bearer-only callers.
    let jar = jar.add(state.removal_cookie());
    Ok((
        jar,
        Json(ApiResponse::new(MessageResponse::new("Logged out successfully"))),
    ))
}

/// GET /api/auth/me - Current user.
pub async fn me(AuthUser(principal): AuthUser) -> Json<ApiResponse<UserResponse>> {
    Json(ApiResponse::new(UserResponse::from(principal)))
}
