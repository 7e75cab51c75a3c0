//! Defines the HTTP routes for dashboard analytics.

use axum::routing::get;
use axum::Router;

use crate::api::dashboard::handlers;
use crate::state::AppState;

pub fn router() -> Router<AppState> {
    Router::new().route("/stats", get(handlers::stats))
}
