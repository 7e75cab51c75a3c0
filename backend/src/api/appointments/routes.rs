//! Defines the HTTP routes for appointment scheduling.

use axum::routing::{get, post};
use axum::Router;

use crate::api::appointments::handlers;
use crate::state::AppState;

pub fn router() -> Router<AppState> {
    Router::new()
        // calendar views
        .route("/", get(handlers::list_appointments).post(handlers::create_appointment))
        .route("/day", get(handlers::day_appointments))
        .route("/upcoming", get(handlers::upcoming_appointments))
        // single appointment
        .route("/:id", get(handlers::get_appointment).patch(handlers::update_appointment))
        // status transitions
        .route("/:id/confirm", post(handlers::confirm_appointment))
        .route("/:id/complete", post(handlers::complete_appointment))
        .route("/:id/cancel", post(handlers::cancel_appointment))
        .route("/:id/no-show", post(handlers::no_show_appointment))
        // reminder email
        .route("/:id/notify", post(handlers::notify_appointment))
}
