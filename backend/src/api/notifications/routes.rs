//! Defines the HTTP routes for notification history.

use axum::routing::get;
use axum::Router;

use crate::api::notifications::handlers;
use crate::state::AppState;

pub fn router() -> Router<AppState> {
    Router::new().route("/", get(handlers::list_notifications))
}
