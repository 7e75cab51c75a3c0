//! Defines the HTTP routes for patient management.

use axum::routing::{get, post};
use axum::Router;

use crate::api::patients::handlers;
use crate::state::AppState;

pub fn router() -> Router<AppState> {
    Router::new()
        .route("/", get(handlers::list_patients).post(handlers::create_patient))
        .route(
            "/:id",
            get(handlers::get_patient)
                .patch(handlers::update_patient)
                .delete(handlers::delete_patient),
        )
        .route("/:id/approve", post(handlers::approve_patient))
        .route("/:id/deny", post(handlers::deny_patient))
}
