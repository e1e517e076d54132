//! Session authentication extractor.

use axum::{
    async_trait,
    body::Body,
    extract::{FromRequestParts, State},
    http::{
        header::{AUTHORIZATION, SET_COOKIE},
        request::Parts,
        HeaderMap, HeaderValue, Request,
    },
    middleware::Next,
    response::Response,
};
use axum_extra::extract::cookie::CookieJar;
use std::sync::{Arc, OnceLock};

use crate::auth;
use crate::db::Principal;
use crate::web::error::ApiError;
use crate::web::handlers::AppState;

/// Session token carried in the session cookie, if any.
pub fn cookie_token(headers: &HeaderMap, cookie_name: &str) -> Option<String> {
    CookieJar::from_headers(headers)
        .get(cookie_name)
        .map(|cookie| cookie.value().to_string())
        .filter(|token| !token.is_empty())
}

/// Extract the session token from a request.
///
/// The session cookie wins over an `Authorization: Bearer` header.
pub fn session_token(headers: &HeaderMap, cookie_name: &str) -> Option<String> {
    if let Some(token) = cookie_token(headers, cookie_name) {
        return Some(token);
    }

    headers
        .get(AUTHORIZATION)
        .and_then(|value| value.to_str().ok())
        .and_then(|value| value.strip_prefix("Bearer "))
        .map(|token| token.trim().to_string())
        .filter(|token| !token.is_empty())
}

/// Extractor for authenticated users.
///
/// Rejects with 401 before the handler runs when no live session is
/// presented.
#[derive(Debug, Clone)]
pub struct AuthUser(pub Principal);

#[async_trait]
impl FromRequestParts<Arc<AppState>> for AuthUser {
    type Rejection = ApiError;

    async fn from_request_parts(
        parts: &mut Parts,
        state: &Arc<AppState>,
    ) -> Result<Self, Self::Rejection> {
        let token = session_token(&parts.headers, state.cookie_name());
        let principal = match &token {
            Some(token) => state.sessions.resolve(token).await?,
            None => None,
        };

        let principal = auth::require(principal)?;

        if let (Some(token), Some(refresh)) = (token, parts.extensions.get::<SessionRefresh>()) {
            refresh.mark(token);
        }

        Ok(AuthUser(principal))
    }
}

/// Request marker set when a cookie session was resolved, so the
/// response can re-issue the cookie with a fresh `Max-Age`.
#[derive(Debug, Clone, Default)]
pub struct SessionRefresh(Arc<OnceLock<String>>);

impl SessionRefresh {
    fn mark(&self, token: String) {
        let _ = self.0.set(token);
    }

    fn token(&self) -> Option<&str> {
        self.0.get().map(String::as_str)
    }
}

/// Re-send the session cookie after a request authenticated by it.
///
/// Keeps the browser's cookie lifetime in step with the sliding server
/// expiry. Bearer-only requests and responses that already set a cookie
/// are left alone.
pub async fn refresh_session_cookie(
    State(state): State<Arc<AppState>>,
    mut req: Request<Body>,
    next: Next,
) -> Response {
    let refresh = cookie_token(req.headers(), state.cookie_name()).map(|_| {
        let refresh = SessionRefresh::default();
        req.extensions_mut().insert(refresh.clone());
        refresh
    });

    let mut response = next.run(req).await;

    let Some(token) = refresh.as_ref().and_then(SessionRefresh::token) else {
        return response;
    };
    if response.headers().contains_key(SET_COOKIE) {
        return response;
    }

    let cookie = state.session_cookie(token.to_string());
    match HeaderValue::from_str(&cookie.to_string()) {
        Ok(value) => {
            response.headers_mut().append(SET_COOKIE, value);
        }
        Err(e) => tracing::warn!("Failed to encode session cookie: {}", e),
    }

    response
}
