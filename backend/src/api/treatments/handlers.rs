//! Handler functions for treatment tracking.

use axum::extract::{Path, Query, State};
use axum::http::StatusCode;
use axum::Json;
use chrono::Utc;
use serde_json::{json, Value};
use tracing::info;
use uuid::Uuid;

use crate::api::clamp_paging;
use crate::api::treatments::models::{
    CreateTreatmentRequest, ListTreatmentsQuery, UpdateTreatmentRequest,
};
use crate::database::models::{Treatment, TreatmentStatus};
use crate::database::queries::{self, NewTreatment, TreatmentFilter};
use crate::errors::ApiError;
use crate::services::lifecycle::TreatmentAction;
use crate::state::AppState;

pub async fn list_treatments(
    State(state): State<AppState>,
    Query(query): Query<ListTreatmentsQuery>,
) -> Result<Json<Vec<Treatment>>, ApiError> {
    let (limit, offset) = clamp_paging(query.limit, query.offset);
    let filter = TreatmentFilter {
        patient_id: query.patient_id,
        status: query.status,
        limit,
        offset,
    };
    Ok(Json(queries::list_treatments(&state.db, &filter).await?))
}

pub async fn get_treatment(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> Result<Json<Treatment>, ApiError> {
    let treatment = queries::get_treatment(&state.db, id)
        .await?
        .ok_or(ApiError::NotFound("treatment"))?;
    Ok(Json(treatment))
}

pub async fn create_treatment(
    State(state): State<AppState>,
    Json(request): Json<CreateTreatmentRequest>,
) -> Result<(StatusCode, Json<Treatment>), ApiError> {
    queries::get_patient(&state.db, request.patient_id)
        .await?
        .ok_or(ApiError::NotFound("patient"))?;
    queries::get_procedure(&state.db, request.procedure_id)
        .await?
        .ok_or(ApiError::NotFound("procedure"))?;
    if let Some(appointment_id) = request.appointment_id {
        queries::get_appointment(&state.db, appointment_id)
            .await?
            .ok_or(ApiError::NotFound("appointment"))?;
    }

    let new = NewTreatment {
        patient_id: request.patient_id,
        procedure_id: request.procedure_id,
        appointment_id: request.appointment_id,
        status: TreatmentStatus::Planned,
        notes: request.notes,
    };
    let treatment = queries::insert_treatment(&state.db, &new).await?;
    info!(treatment = %treatment.id, patient = %treatment.patient_id, "treatment planned");
    Ok((StatusCode::CREATED, Json(treatment)))
}

pub async fn update_treatment(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
    Json(request): Json<UpdateTreatmentRequest>,
) -> Result<Json<Treatment>, ApiError> {
    let Some(notes) = request.notes else {
        return Err(ApiError::BadRequest("VALIDATION_ERROR", "no fields to update".into()));
    };
    let trimmed = notes.trim();
    let notes_value = if trimmed.is_empty() { Value::Null } else { json!(trimmed) };
    let patch = json!({ "notes": notes_value });
    let treatment = queries::update_treatment(&state.db, id, patch)
        .await?
        .ok_or(ApiError::NotFound("treatment"))?;
    Ok(Json(treatment))
}

pub async fn start_treatment(
    state: State<AppState>,
    id: Path<Uuid>,
) -> Result<Json<Treatment>, ApiError> {
    transition(state, id, TreatmentAction::Start).await
}

pub async fn complete_treatment(
    state: State<AppState>,
    id: Path<Uuid>,
) -> Result<Json<Treatment>, ApiError> {
    transition(state, id, TreatmentAction::Complete).await
}

pub async fn cancel_treatment(
    state: State<AppState>,
    id: Path<Uuid>,
) -> Result<Json<Treatment>, ApiError> {
    transition(state, id, TreatmentAction::Cancel).await
}

async fn transition(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
    action: TreatmentAction,
) -> Result<Json<Treatment>, ApiError> {
    let current = queries::get_treatment(&state.db, id)
        .await?
        .ok_or(ApiError::NotFound("treatment"))?;
    if !action.permits(current.status) {
        return Err(ApiError::Conflict(
            "INVALID_TRANSITION",
            format!("cannot move a {} treatment to {}", current.status, action.target()),
        ));
    }
    let updated = queries::set_treatment_status(
        &state.db,
        id,
        action.allowed_from(),
        action.target(),
        action.stamp(Utc::now()),
    )
    .await?
    .ok_or_else(|| {
        ApiError::Conflict("INVALID_TRANSITION", "treatment status changed concurrently".into())
    })?;
    info!(treatment = %updated.id, status = %updated.status, "treatment transitioned");
    Ok(Json(updated))
}
