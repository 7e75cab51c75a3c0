//! Central module for organizing the application's main API endpoints.
//!
//! One submodule per resource, each with its own routes, handlers and wire
//! models. The split into public and protected routers happens here; the
//! auth middleware is layered on in `main`.

pub mod appointments;
pub mod dashboard;
pub mod notifications;
pub mod patients;
pub mod procedures;
pub mod registration;
pub mod treatments;

use axum::routing::get;
use axum::{Json, Router};
use serde_json::{json, Value};

use crate::state::AppState;

/// Routes reachable without a session: health probe and the patient-facing
/// self-registration flow.
pub fn public_router() -> Router<AppState> {
    Router::new()
        .route("/health", get(health))
        .merge(registration::routes::public_router())
}

pub fn protected_router() -> Router<AppState> {
    Router::new()
        .nest("/patients", patients::routes::router())
        .nest("/appointments", appointments::routes::router())
        .nest("/treatments", treatments::routes::router())
        .nest("/procedures", procedures::routes::router())
        .nest("/registration-tokens", registration::routes::admin_router())
        .nest("/notifications", notifications::routes::router())
        .nest("/dashboard", dashboard::routes::router())
}

async fn health() -> Json<Value> {
    Json(json!({ "status": "ok", "version": env!("CARGO_PKG_VERSION") }))
}

/// Normalizes client paging: limit 1..=200 (default 50), offset >= 0.
pub(crate) fn clamp_paging(limit: Option<i64>, offset: Option<i64>) -> (i64, i64) {
    (limit.unwrap_or(50).clamp(1, 200), offset.unwrap_or(0).max(0))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn paging_defaults_and_bounds() {
        assert_eq!(clamp_paging(None, None), (50, 0));
        assert_eq!(clamp_paging(Some(0), Some(-5)), (1, 0));
        assert_eq!(clamp_paging(Some(500), Some(20)), (200, 20));
        assert_eq!(clamp_paging(Some(25), None), (25, 0));
    }
}
