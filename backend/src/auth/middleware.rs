//! Middleware for protecting authenticated routes.
//!
//! Accepts the session JWT from the `clinic_session` cookie (browser
//! clients) or an `Authorization: Bearer` header (API clients), verifies
//! it, and injects the admin identity into request extensions. Applied as a
//! `route_layer`, so unknown paths still 404 instead of 401.

use axum::extract::{Request, State};
use axum::http::header::AUTHORIZATION;
use axum::http::HeaderMap;
use axum::middleware::Next;
use axum::response::Response;
use axum_extra::extract::cookie::CookieJar;

use crate::auth::models::CurrentAdmin;
use crate::auth::SESSION_COOKIE;
use crate::errors::ApiError;
use crate::state::AppState;

pub async fn require_auth(
    State(state): State<AppState>,
    jar: CookieJar,
    mut request: Request,
    next: Next,
) -> Result<Response, ApiError> {
    let token = session_token(request.headers(), &jar)
        .ok_or_else(|| ApiError::Unauthorized("authentication required".into()))?;

    let claims = state.auth.verify(&token)?;
    request
        .extensions_mut()
        .insert(CurrentAdmin { id: claims.sub, email: claims.email });

    Ok(next.run(request).await)
}

/// Bearer header wins over the cookie, so API clients can act on behalf of a
/// different session than the browser holds.
fn session_token(headers: &HeaderMap, jar: &CookieJar) -> Option<String> {
    if let Some(value) = headers.get(AUTHORIZATION).and_then(|v| v.to_str().ok()) {
        if let Some(token) = value.strip_prefix("Bearer ") {
            if !token.is_empty() {
                return Some(token.to_string());
            }
        }
    }
    jar.get(SESSION_COOKIE).map(|cookie| cookie.value().to_string())
}
