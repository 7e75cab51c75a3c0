//! Handler functions for authentication-related API endpoints.

use axum::extract::State;
use axum::Json;
use axum_extra::extract::cookie::{Cookie, CookieJar, SameSite};
use serde_json::{json, Value};
use tracing::info;

use crate::auth::models::{AdminProfile, CurrentAdmin, LoginRequest, LoginResponse};
use crate::auth::SESSION_COOKIE;
use crate::errors::ApiError;
use crate::state::AppState;

pub async fn login(
    State(state): State<AppState>,
    jar: CookieJar,
    Json(request): Json<LoginRequest>,
) -> Result<(CookieJar, Json<LoginResponse>), ApiError> {
    let email = request.email.trim().to_ascii_lowercase();
    if email.is_empty() || request.password.is_empty() {
        return Err(ApiError::BadRequest("VALIDATION_ERROR", "email and password are required".into()));
    }

    let (admin, token, expires_at) = state.auth.login(&email, &request.password).await?;
    info!(admin = %admin.email, "admin logged in");

    let cookie = Cookie::build((SESSION_COOKIE, token.clone()))
        .path("/")
        .http_only(true)
        .same_site(SameSite::Lax)
        .build();

    Ok((
        jar.add(cookie),
        Json(LoginResponse {
            token,
            expires_at,
            admin: AdminProfile { id: admin.id, email: admin.email },
        }),
    ))
}

pub async fn logout(jar: CookieJar) -> (CookieJar, Json<Value>) {
    let removal = Cookie::build((SESSION_COOKIE, "")).path("/").build();
    (jar.remove(removal), Json(json!({ "ok": true })))
}

pub async fn me(admin: CurrentAdmin) -> Json<AdminProfile> {
    Json(AdminProfile { id: admin.id, email: admin.email })
}
