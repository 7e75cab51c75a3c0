//! Handler functions for the notification history API.

use axum::extract::{Query, State};
use axum::Json;
use serde::Deserialize;
use uuid::Uuid;

use crate::api::clamp_paging;
use crate::database::models::{Notification, NotificationStatus};
use crate::database::queries::{self, NotificationFilter};
use crate::errors::ApiError;
use crate::state::AppState;

#[derive(Debug, Deserialize)]
pub struct ListNotificationsQuery {
    pub patient_id: Option<Uuid>,
    pub status: Option<NotificationStatus>,
    pub limit: Option<i64>,
    pub offset: Option<i64>,
}

pub async fn list_notifications(
    State(state): State<AppState>,
    Query(query): Query<ListNotificationsQuery>,
) -> Result<Json<Vec<Notification>>, ApiError> {
    let (limit, offset) = clamp_paging(query.limit, query.offset);
    let filter = NotificationFilter {
        patient_id: query.patient_id,
        status: query.status,
        limit,
        offset,
    };
    Ok(Json(queries::list_notifications(&state.db, &filter).await?))
}
