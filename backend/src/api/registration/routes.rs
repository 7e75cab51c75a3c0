//! Defines the HTTP routes for registration tokens.
//!
//! The admin router manages tokens; the public router is what the QR link
//! lands on and carries no session.

use axum::routing::{get, post};
use axum::Router;

use crate::api::registration::handlers;
use crate::state::AppState;

pub fn admin_router() -> Router<AppState> {
    Router::new()
        .route("/", get(handlers::list_tokens).post(handlers::issue_token))
        .route("/:id", axum::routing::delete(handlers::revoke_token))
}

pub fn public_router() -> Router<AppState> {
    Router::new()
        .route("/register/validate", get(handlers::validate_token))
        .route("/register", post(handlers::register_patient))
}
