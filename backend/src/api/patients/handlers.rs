//! Handler functions for the patient management API.

use axum::extract::{Path, Query, State};
use axum::http::StatusCode;
use axum::Json;
use serde_json::{json, Map, Value};
use tracing::info;
use uuid::Uuid;

use crate::api::clamp_paging;
use crate::api::patients::models::{CreatePatientRequest, ListPatientsQuery, UpdatePatientRequest};
use crate::database::models::{Patient, RegistrationStatus};
use crate::database::queries::{self, NewPatient, PatientFilter};
use crate::errors::ApiError;
use crate::services::lifecycle::registration_decision_allowed;
use crate::services::notify::NotificationService;
use crate::state::AppState;
use crate::utils::looks_like_email;

pub async fn list_patients(
    State(state): State<AppState>,
    Query(query): Query<ListPatientsQuery>,
) -> Result<Json<Vec<Patient>>, ApiError> {
    let (limit, offset) = clamp_paging(query.limit, query.offset);
    let filter = PatientFilter { status: query.status, search: query.search, limit, offset };
    let patients = queries::list_patients(&state.db, &filter).await?;
    Ok(Json(patients))
}

pub async fn get_patient(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> Result<Json<Patient>, ApiError> {
    let patient = queries::get_patient(&state.db, id)
        .await?
        .ok_or(ApiError::NotFound("patient"))?;
    Ok(Json(patient))
}

/// Admin-side creation skips the review queue: the record starts `approved`.
pub async fn create_patient(
    State(state): State<AppState>,
    Json(request): Json<CreatePatientRequest>,
) -> Result<(StatusCode, Json<Patient>), ApiError> {
    let details = request.details.validated()?;

    if queries::find_patient_by_email(&state.db, &details.email).await?.is_some() {
        return Err(ApiError::Conflict("EMAIL_EXISTS", "email is already registered".into()));
    }

    let new = NewPatient {
        first_name: details.first_name,
        last_name: details.last_name,
        email: details.email,
        phone: details.phone,
        date_of_birth: details.date_of_birth,
        address: details.address,
        notes: details.notes,
        registration_status: RegistrationStatus::Approved,
        registration_token_id: None,
    };
    let patient = queries::insert_patient(&state.db, &new).await?;
    info!(patient = %patient.id, "patient created by admin");
    Ok((StatusCode::CREATED, Json(patient)))
}

pub async fn update_patient(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
    Json(request): Json<UpdatePatientRequest>,
) -> Result<Json<Patient>, ApiError> {
    if request.is_empty() {
        return Err(ApiError::BadRequest("VALIDATION_ERROR", "no fields to update".into()));
    }

    let mut patch = Map::new();
    if let Some(first_name) = trimmed_required(request.first_name, "first_name")? {
        patch.insert("first_name".into(), json!(first_name));
    }
    if let Some(last_name) = trimmed_required(request.last_name, "last_name")? {
        patch.insert("last_name".into(), json!(last_name));
    }
    if let Some(phone) = trimmed_required(request.phone, "phone")? {
        patch.insert("phone".into(), json!(phone));
    }
    if let Some(email) = request.email {
        let email = email.trim().to_ascii_lowercase();
        if !looks_like_email(&email) {
            return Err(ApiError::BadRequest("VALIDATION_ERROR", "email is not a valid address".into()));
        }
        match queries::find_patient_by_email(&state.db, &email).await? {
            Some(existing) if existing.id != id => {
                return Err(ApiError::Conflict("EMAIL_EXISTS", "email is already registered".into()));
            }
            _ => {}
        }
        patch.insert("email".into(), json!(email));
    }
    if let Some(date_of_birth) = request.date_of_birth {
        patch.insert("date_of_birth".into(), json!(date_of_birth));
    }
    if let Some(address) = request.address {
        patch.insert("address".into(), nullable(address));
    }
    if let Some(notes) = request.notes {
        patch.insert("notes".into(), nullable(notes));
    }

    let patient = queries::update_patient(&state.db, id, Value::Object(patch))
        .await?
        .ok_or(ApiError::NotFound("patient"))?;
    Ok(Json(patient))
}

pub async fn approve_patient(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> Result<Json<Patient>, ApiError> {
    let patient = decide(&state, id, RegistrationStatus::Approved).await?;
    // Welcome email is best-effort; the approval already happened.
    NotificationService::new(state.db.clone(), state.mailer.clone())
        .send_welcome(&patient)
        .await;
    Ok(Json(patient))
}

pub async fn deny_patient(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> Result<Json<Patient>, ApiError> {
    let patient = decide(&state, id, RegistrationStatus::Denied).await?;
    Ok(Json(patient))
}

pub async fn delete_patient(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> Result<StatusCode, ApiError> {
    queries::get_patient(&state.db, id).await?.ok_or(ApiError::NotFound("patient"))?;
    queries::delete_patient(&state.db, id).await?;
    info!(patient = %id, "patient deleted");
    Ok(StatusCode::NO_CONTENT)
}

async fn decide(
    state: &AppState,
    id: Uuid,
    decision: RegistrationStatus,
) -> Result<Patient, ApiError> {
    let current = queries::get_patient(&state.db, id).await?.ok_or(ApiError::NotFound("patient"))?;
    if !registration_decision_allowed(current.registration_status, decision) {
        return Err(ApiError::Conflict(
            "INVALID_STATUS",
            format!("patient is {}, only pending registrations can be decided", current.registration_status),
        ));
    }
    // The guard re-checks `pending`; losing the race surfaces as a conflict.
    queries::set_patient_status(&state.db, id, RegistrationStatus::Pending, decision)
        .await?
        .ok_or_else(|| {
            ApiError::Conflict("INVALID_STATUS", "registration was already decided".into())
        })
        .map(|patient| {
            info!(patient = %patient.id, decision = %decision, "registration decided");
            patient
        })
}

fn trimmed_required(
    value: Option<String>,
    field: &'static str,
) -> Result<Option<String>, ApiError> {
    match value {
        None => Ok(None),
        Some(raw) => {
            let trimmed = raw.trim().to_string();
            if trimmed.is_empty() {
                return Err(ApiError::BadRequest(
                    "VALIDATION_ERROR",
                    format!("{field} cannot be blank"),
                ));
            }
            Ok(Some(trimmed))
        }
    }
}

fn nullable(value: String) -> Value {
    let trimmed = value.trim();
    if trimmed.is_empty() {
        Value::Null
    } else {
        json!(trimmed)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn trimmed_required_rejects_blank_updates() {
        assert!(trimmed_required(Some("  ".into()), "phone").is_err());
        assert_eq!(trimmed_required(Some(" x ".into()), "phone").unwrap().as_deref(), Some("x"));
        assert_eq!(trimmed_required(None, "phone").unwrap(), None);
    }

    #[test]
    fn nullable_maps_empty_to_null() {
        assert_eq!(nullable("".into()), Value::Null);
        assert_eq!(nullable(" note ".into()), json!("note"));
    }
}
