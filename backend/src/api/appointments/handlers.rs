//! Handler functions for the appointment scheduling API.

use axum::extract::{Path, Query, State};
use axum::http::StatusCode;
use axum::Json;
use chrono::{DateTime, Duration, NaiveDate, TimeZone, Utc};
use serde_json::{json, Map, Value};
use tracing::info;
use uuid::Uuid;

use crate::api::appointments::models::{
    CreateAppointmentRequest, DayQuery, ListAppointmentsQuery, UpdateAppointmentRequest,
};
use crate::api::clamp_paging;
use crate::database::models::{
    Appointment, AppointmentStatus, Notification, NotificationStatus, RegistrationStatus,
};
use crate::database::queries::{self, AppointmentFilter, NewAppointment};
use crate::errors::ApiError;
use crate::services::lifecycle::AppointmentAction;
use crate::services::notify::NotificationService;
use crate::services::scheduling;
use crate::state::AppState;

pub async fn list_appointments(
    State(state): State<AppState>,
    Query(query): Query<ListAppointmentsQuery>,
) -> Result<Json<Vec<Appointment>>, ApiError> {
    if let (Some(from), Some(to)) = (query.from, query.to) {
        if to <= from {
            return Err(ApiError::BadRequest("VALIDATION_ERROR", "to must be after from".into()));
        }
    }
    let (limit, offset) = clamp_paging(query.limit, query.offset);
    let filter = AppointmentFilter {
        patient_id: query.patient_id,
        status: query.status,
        from: query.from,
        to: query.to,
        limit,
        offset,
    };
    Ok(Json(queries::list_appointments(&state.db, &filter).await?))
}

pub async fn day_appointments(
    State(state): State<AppState>,
    Query(query): Query<DayQuery>,
) -> Result<Json<Vec<Appointment>>, ApiError> {
    let start = day_start(query.date);
    let filter = AppointmentFilter {
        from: Some(start),
        to: Some(start + Duration::days(1)),
        limit: 200,
        ..Default::default()
    };
    Ok(Json(queries::list_appointments(&state.db, &filter).await?))
}

/// Active appointments in the next seven days.
pub async fn upcoming_appointments(
    State(state): State<AppState>,
) -> Result<Json<Vec<Appointment>>, ApiError> {
    let now = Utc::now();
    let filter = AppointmentFilter {
        from: Some(now),
        to: Some(now + Duration::days(7)),
        limit: 200,
        ..Default::default()
    };
    let mut appointments = queries::list_appointments(&state.db, &filter).await?;
    appointments.retain(|appointment| appointment.status.is_active());
    Ok(Json(appointments))
}

pub async fn get_appointment(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> Result<Json<Appointment>, ApiError> {
    let appointment = queries::get_appointment(&state.db, id)
        .await?
        .ok_or(ApiError::NotFound("appointment"))?;
    Ok(Json(appointment))
}

pub async fn create_appointment(
    State(state): State<AppState>,
    Json(request): Json<CreateAppointmentRequest>,
) -> Result<(StatusCode, Json<Appointment>), ApiError> {
    let patient = queries::get_patient(&state.db, request.patient_id)
        .await?
        .ok_or(ApiError::NotFound("patient"))?;
    if patient.registration_status != RegistrationStatus::Approved {
        return Err(ApiError::Conflict(
            "PATIENT_NOT_APPROVED",
            "appointments can only be booked for approved patients".into(),
        ));
    }

    let procedure_default = match request.procedure_id {
        None => None,
        Some(procedure_id) => {
            let procedure = queries::get_procedure(&state.db, procedure_id)
                .await?
                .ok_or(ApiError::NotFound("procedure"))?;
            if !procedure.active {
                return Err(ApiError::BadRequest(
                    "PROCEDURE_INACTIVE",
                    "the selected procedure is no longer offered".into(),
                ));
            }
            Some(procedure.default_duration_minutes)
        }
    };

    let duration = scheduling::resolve_duration(request.duration_minutes, procedure_default)?;
    scheduling::ensure_future(request.scheduled_at, Utc::now())?;
    ensure_slot_free(&state, request.scheduled_at, duration, None).await?;

    let new = NewAppointment {
        patient_id: request.patient_id,
        procedure_id: request.procedure_id,
        scheduled_at: request.scheduled_at,
        duration_minutes: duration,
        status: AppointmentStatus::Scheduled,
        notes: request.notes,
    };
    let appointment = queries::insert_appointment(&state.db, &new).await?;
    info!(appointment = %appointment.id, patient = %patient.id, "appointment booked");
    Ok((StatusCode::CREATED, Json(appointment)))
}

pub async fn update_appointment(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
    Json(request): Json<UpdateAppointmentRequest>,
) -> Result<Json<Appointment>, ApiError> {
    if request.is_empty() {
        return Err(ApiError::BadRequest("VALIDATION_ERROR", "no fields to update".into()));
    }

    let current = queries::get_appointment(&state.db, id)
        .await?
        .ok_or(ApiError::NotFound("appointment"))?;

    let mut patch = Map::new();
    if request.reschedules() {
        if !current.status.is_active() {
            return Err(ApiError::Conflict(
                "INVALID_TRANSITION",
                format!("a {} appointment cannot be rescheduled", current.status),
            ));
        }
        let scheduled_at = request.scheduled_at.unwrap_or(current.scheduled_at);
        let duration =
            scheduling::resolve_duration(request.duration_minutes, Some(current.duration_minutes))?;
        scheduling::ensure_future(scheduled_at, Utc::now())?;
        ensure_slot_free(&state, scheduled_at, duration, Some(id)).await?;
        patch.insert("scheduled_at".into(), json!(scheduled_at));
        patch.insert("duration_minutes".into(), json!(duration));
    }
    if let Some(notes) = request.notes {
        let trimmed = notes.trim();
        patch.insert("notes".into(), if trimmed.is_empty() { Value::Null } else { json!(trimmed) });
    }

    let appointment = queries::update_appointment(&state.db, id, Value::Object(patch))
        .await?
        .ok_or(ApiError::NotFound("appointment"))?;
    Ok(Json(appointment))
}

pub async fn confirm_appointment(
    state: State<AppState>,
    id: Path<Uuid>,
) -> Result<Json<Appointment>, ApiError> {
    transition(state, id, AppointmentAction::Confirm).await
}

pub async fn complete_appointment(
    state: State<AppState>,
    id: Path<Uuid>,
) -> Result<Json<Appointment>, ApiError> {
    transition(state, id, AppointmentAction::Complete).await
}

pub async fn cancel_appointment(
    state: State<AppState>,
    id: Path<Uuid>,
) -> Result<Json<Appointment>, ApiError> {
    transition(state, id, AppointmentAction::Cancel).await
}

pub async fn no_show_appointment(
    state: State<AppState>,
    id: Path<Uuid>,
) -> Result<Json<Appointment>, ApiError> {
    transition(state, id, AppointmentAction::NoShow).await
}

/// Sends the reminder email and records it; a provider failure is recorded
/// too but reported as an upstream error.
pub async fn notify_appointment(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> Result<Json<Notification>, ApiError> {
    let appointment = queries::get_appointment(&state.db, id)
        .await?
        .ok_or(ApiError::NotFound("appointment"))?;
    if !appointment.status.is_active() {
        return Err(ApiError::Conflict(
            "INVALID_TRANSITION",
            format!("a {} appointment cannot be notified", appointment.status),
        ));
    }
    let patient = queries::get_patient(&state.db, appointment.patient_id)
        .await?
        .ok_or(ApiError::NotFound("patient"))?;

    let notifier = NotificationService::new(state.db.clone(), state.mailer.clone());
    let notification = notifier.send_appointment_reminder(&patient, &appointment).await?;

    if notification.status == NotificationStatus::Failed {
        return Err(ApiError::UpstreamFailed("reminder email could not be delivered".into()));
    }
    queries::stamp_reminder_sent(&state.db, appointment.id, Utc::now()).await?;
    Ok(Json(notification))
}

async fn transition(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
    action: AppointmentAction,
) -> Result<Json<Appointment>, ApiError> {
    let current = queries::get_appointment(&state.db, id)
        .await?
        .ok_or(ApiError::NotFound("appointment"))?;
    if !action.permits(current.status) {
        return Err(ApiError::Conflict(
            "INVALID_TRANSITION",
            format!("cannot move a {} appointment to {}", current.status, action.target()),
        ));
    }
    let updated =
        queries::set_appointment_status(&state.db, id, action.allowed_from(), action.target())
            .await?
            .ok_or_else(|| {
                ApiError::Conflict("INVALID_TRANSITION", "appointment status changed concurrently".into())
            })?;
    info!(appointment = %updated.id, status = %updated.status, "appointment transitioned");
    Ok(Json(updated))
}

async fn ensure_slot_free(
    state: &AppState,
    start: DateTime<Utc>,
    duration_minutes: i32,
    exclude: Option<Uuid>,
) -> Result<(), ApiError> {
    let end = start + Duration::minutes(i64::from(duration_minutes));
    let nearby = queries::appointments_near_window(&state.db, start, end).await?;
    if let Some(conflict) = scheduling::find_conflict(&nearby, start, duration_minutes, exclude) {
        return Err(ApiError::Conflict(
            "SLOT_CONFLICT",
            format!("the slot overlaps appointment {}", conflict.id),
        ));
    }
    Ok(())
}

fn day_start(date: NaiveDate) -> DateTime<Utc> {
    Utc.from_utc_datetime(&date.and_hms_opt(0, 0, 0).expect("midnight is always valid"))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn day_start_is_utc_midnight() {
        let date = NaiveDate::from_ymd_opt(2026, 8, 10).unwrap();
        assert_eq!(day_start(date).to_rfc3339(), "2026-08-10T00:00:00+00:00");
    }
}
