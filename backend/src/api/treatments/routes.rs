//! Defines the HTTP routes for treatment tracking.

use axum::routing::{get, post};
use axum::Router;

use crate::api::treatments::handlers;
use crate::state::AppState;

pub fn router() -> Router<AppState> {
    Router::new()
        .route("/", get(handlers::list_treatments).post(handlers::create_treatment))
        .route("/:id", get(handlers::get_treatment).patch(handlers::update_treatment))
        .route("/:id/start", post(handlers::start_treatment))
        .route("/:id/complete", post(handlers::complete_treatment))
        .route("/:id/cancel", post(handlers::cancel_treatment))
}
