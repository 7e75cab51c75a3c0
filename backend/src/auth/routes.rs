//! Defines the HTTP routes specifically for authentication.
//!
//! Login is public; logout and the identity probe sit behind the auth
//! middleware with the rest of the protected surface.

use axum::routing::{get, post};
use axum::Router;

use crate::auth::handlers;
use crate::state::AppState;

pub fn public_router() -> Router<AppState> {
    Router::new().route("/auth/login", post(handlers::login))
}

pub fn protected_router() -> Router<AppState> {
    Router::new()
        .route("/auth/logout", post(handlers::logout))
        .route("/auth/me", get(handlers::me))
}
