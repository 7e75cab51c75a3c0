//! Handler functions for dashboard analytics.
//!
//! Fetches narrow row sets and hands them to the pure aggregation in
//! `services::stats`. Window fetches are bounded; a clinic calendar does not
//! approach the cap.

use axum::extract::State;
use axum::Json;
use chrono::{Duration, Utc};

use crate::database::queries::{self, AppointmentFilter};
use crate::errors::ApiError;
use crate::services::stats::{aggregate, start_of_day, DashboardStats};
use crate::state::AppState;

pub async fn stats(State(state): State<AppState>) -> Result<Json<DashboardStats>, ApiError> {
    let now = Utc::now();
    let today = start_of_day(now);

    let patient_statuses = queries::patient_statuses(&state.db).await?;
    let appointments = queries::list_appointments(
        &state.db,
        &AppointmentFilter {
            from: Some(today),
            to: Some(today + Duration::days(8)),
            limit: 1000,
            ..Default::default()
        },
    )
    .await?;
    let tokens = queries::list_tokens(&state.db).await?;
    let treatments_in_progress = queries::count_treatments_in_progress(&state.db).await?;
    let notifications_sent =
        queries::count_notifications_sent_since(&state.db, now - Duration::days(7)).await?;

    Ok(Json(aggregate(
        &patient_statuses,
        &appointments,
        &tokens,
        treatments_in_progress,
        notifications_sent,
        now,
    )))
}
