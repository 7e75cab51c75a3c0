//! Defines the HTTP routes for the procedure catalog.

use axum::routing::get;
use axum::Router;

use crate::api::procedures::handlers;
use crate::state::AppState;

pub fn router() -> Router<AppState> {
    Router::new()
        .route("/", get(handlers::list_procedures).post(handlers::create_procedure))
        .route(
            "/:id",
            get(handlers::get_procedure)
                .patch(handlers::update_procedure)
                .delete(handlers::delete_procedure),
        )
}
