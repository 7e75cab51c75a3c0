//! Database query functions (Data Access Objects).
//!
//! This module centralizes all PostgREST operations, providing typed
//! functions for interacting with the hosted tables and keeping filter
//! syntax out of handlers and services. Conditional updates encode their
//! precondition in the filter, so a stale precondition shows up as an empty
//! result instead of a lost update.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::json;
use uuid::Uuid;

use crate::database::models::{
    Appointment, AppointmentStatus, Notification, NotificationStatus, Patient, Procedure,
    RegistrationStatus, RegistrationToken, TokenKind, Treatment, TreatmentStatus,
};
use crate::database::Db;
use crate::errors::ApiError;

/// Longest bookable appointment; bounds the window prefetch for overlap checks.
pub const MAX_APPOINTMENT_MINUTES: i64 = 240;

fn eq(id: Uuid) -> (&'static str, String) {
    ("id", format!("eq.{id}"))
}

fn paging(limit: i64, offset: i64) -> [(&'static str, String); 2] {
    [("limit", limit.to_string()), ("offset", offset.to_string())]
}

// PostgREST `or=` groups are comma/paren delimited; strip anything that could
// splice extra clauses into the filter.
fn scrub_pattern(raw: &str) -> String {
    raw.chars().filter(|c| !matches!(c, ',' | '(' | ')' | '*' | '%' | '\\')).collect()
}

// ---------------------------------------------------------------------------
// Patients

#[derive(Debug, Default)]
pub struct PatientFilter {
    pub status: Option<RegistrationStatus>,
    pub search: Option<String>,
    pub limit: i64,
    pub offset: i64,
}

#[derive(Debug, Serialize)]
pub struct NewPatient {
    pub first_name: String,
    pub last_name: String,
    pub email: String,
    pub phone: String,
    pub date_of_birth: Option<chrono::NaiveDate>,
    pub address: Option<String>,
    pub notes: Option<String>,
    pub registration_status: RegistrationStatus,
    pub registration_token_id: Option<Uuid>,
}

pub async fn list_patients(db: &Db, filter: &PatientFilter) -> Result<Vec<Patient>, ApiError> {
    let mut query: Vec<(&str, String)> = vec![("order", "created_at.desc".into())];
    query.extend(paging(filter.limit, filter.offset));
    if let Some(status) = filter.status {
        query.push(("registration_status", format!("eq.{status}")));
    }
    if let Some(search) = &filter.search {
        let pattern = scrub_pattern(search);
        if !pattern.is_empty() {
            query.push((
                "or",
                format!(
                    "(first_name.ilike.*{pattern}*,last_name.ilike.*{pattern}*,email.ilike.*{pattern}*)"
                ),
            ));
        }
    }
    Ok(db.supabase.select("patients", &query).await?)
}

pub async fn get_patient(db: &Db, id: Uuid) -> Result<Option<Patient>, ApiError> {
    let mut rows: Vec<Patient> = db.supabase.select("patients", &[eq(id)]).await?;
    Ok(rows.pop())
}

pub async fn find_patient_by_email(db: &Db, email: &str) -> Result<Option<Patient>, ApiError> {
    let mut rows: Vec<Patient> = db
        .supabase
        .select("patients", &[("email", format!("eq.{}", email.to_ascii_lowercase()))])
        .await?;
    Ok(rows.pop())
}

pub async fn insert_patient(db: &Db, new: &NewPatient) -> Result<Patient, ApiError> {
    let row = serde_json::to_value(new).map_err(|e| ApiError::Internal(e.to_string()))?;
    Ok(db.supabase.insert("patients", &row).await?)
}

pub async fn update_patient(
    db: &Db,
    id: Uuid,
    patch: serde_json::Value,
) -> Result<Option<Patient>, ApiError> {
    let mut patch = patch;
    patch["updated_at"] = json!(Utc::now());
    let mut rows: Vec<Patient> = db.supabase.update("patients", &[eq(id)], &patch).await?;
    Ok(rows.pop())
}

/// Transitions a patient's registration status, guarded by the expected
/// current status. Returns `None` when the patient is missing or the guard
/// no longer holds.
pub async fn set_patient_status(
    db: &Db,
    id: Uuid,
    from: RegistrationStatus,
    to: RegistrationStatus,
) -> Result<Option<Patient>, ApiError> {
    let patch = json!({ "registration_status": to, "updated_at": Utc::now() });
    let mut rows: Vec<Patient> = db
        .supabase
        .update(
            "patients",
            &[eq(id), ("registration_status", format!("eq.{from}"))],
            &patch,
        )
        .await?;
    Ok(rows.pop())
}

pub async fn delete_patient(db: &Db, id: Uuid) -> Result<(), ApiError> {
    Ok(db.supabase.delete("patients", &[eq(id)]).await?)
}

// ---------------------------------------------------------------------------
// Appointments

#[derive(Debug, Default)]
pub struct AppointmentFilter {
    pub patient_id: Option<Uuid>,
    pub status: Option<AppointmentStatus>,
    pub from: Option<DateTime<Utc>>,
    pub to: Option<DateTime<Utc>>,
    pub limit: i64,
    pub offset: i64,
}

#[derive(Debug, Serialize)]
pub struct NewAppointment {
    pub patient_id: Uuid,
    pub procedure_id: Option<Uuid>,
    pub scheduled_at: DateTime<Utc>,
    pub duration_minutes: i32,
    pub status: AppointmentStatus,
    pub notes: Option<String>,
}

pub async fn list_appointments(
    db: &Db,
    filter: &AppointmentFilter,
) -> Result<Vec<Appointment>, ApiError> {
    let mut query: Vec<(&str, String)> = vec![("order", "scheduled_at.asc".into())];
    query.extend(paging(filter.limit, filter.offset));
    if let Some(patient_id) = filter.patient_id {
        query.push(("patient_id", format!("eq.{patient_id}")));
    }
    if let Some(status) = filter.status {
        query.push(("status", format!("eq.{status}")));
    }
    if let Some(from) = filter.from {
        query.push(("scheduled_at", format!("gte.{}", from.to_rfc3339())));
    }
    if let Some(to) = filter.to {
        query.push(("scheduled_at", format!("lt.{}", to.to_rfc3339())));
    }
    Ok(db.supabase.select("appointments", &query).await?)
}

/// Active appointments whose interval could intersect `[start, end)`.
///
/// PostgREST cannot compute `scheduled_at + duration`, so the fetch widens
/// the window by the maximum duration and the exact interval check happens
/// in the scheduling service.
pub async fn appointments_near_window(
    db: &Db,
    start: DateTime<Utc>,
    end: DateTime<Utc>,
) -> Result<Vec<Appointment>, ApiError> {
    let earliest = start - chrono::Duration::minutes(MAX_APPOINTMENT_MINUTES);
    let query = [
        ("status", "in.(scheduled,confirmed)".to_string()),
        ("scheduled_at", format!("gte.{}", earliest.to_rfc3339())),
        ("scheduled_at", format!("lt.{}", end.to_rfc3339())),
    ];
    Ok(db.supabase.select("appointments", &query).await?)
}

pub async fn get_appointment(db: &Db, id: Uuid) -> Result<Option<Appointment>, ApiError> {
    let mut rows: Vec<Appointment> = db.supabase.select("appointments", &[eq(id)]).await?;
    Ok(rows.pop())
}

pub async fn insert_appointment(db: &Db, new: &NewAppointment) -> Result<Appointment, ApiError> {
    let row = serde_json::to_value(new).map_err(|e| ApiError::Internal(e.to_string()))?;
    Ok(db.supabase.insert("appointments", &row).await?)
}

pub async fn update_appointment(
    db: &Db,
    id: Uuid,
    patch: serde_json::Value,
) -> Result<Option<Appointment>, ApiError> {
    let mut patch = patch;
    patch["updated_at"] = json!(Utc::now());
    let mut rows: Vec<Appointment> = db.supabase.update("appointments", &[eq(id)], &patch).await?;
    Ok(rows.pop())
}

/// Transitions an appointment guarded by its allowed source statuses.
pub async fn set_appointment_status(
    db: &Db,
    id: Uuid,
    allowed_from: &[AppointmentStatus],
    to: AppointmentStatus,
) -> Result<Option<Appointment>, ApiError> {
    let from_list = allowed_from
        .iter()
        .map(AppointmentStatus::as_str)
        .collect::<Vec<_>>()
        .join(",");
    let patch = json!({ "status": to, "updated_at": Utc::now() });
    let mut rows: Vec<Appointment> = db
        .supabase
        .update("appointments", &[eq(id), ("status", format!("in.({from_list})"))], &patch)
        .await?;
    Ok(rows.pop())
}

pub async fn stamp_reminder_sent(db: &Db, id: Uuid, when: DateTime<Utc>) -> Result<(), ApiError> {
    let patch = json!({ "reminder_sent_at": when, "updated_at": Utc::now() });
    let _: Vec<Appointment> = db.supabase.update("appointments", &[eq(id)], &patch).await?;
    Ok(())
}

// ---------------------------------------------------------------------------
// Procedures

#[derive(Debug, Serialize)]
pub struct NewProcedure {
    pub code: String,
    pub name: String,
    pub description: Option<String>,
    pub default_duration_minutes: i32,
    pub price_cents: i64,
    pub active: bool,
}

pub async fn list_procedures(db: &Db, active_only: bool) -> Result<Vec<Procedure>, ApiError> {
    let mut query: Vec<(&str, String)> = vec![("order", "code.asc".into())];
    if active_only {
        query.push(("active", "is.true".into()));
    }
    Ok(db.supabase.select("procedures", &query).await?)
}

pub async fn find_procedure_by_code(db: &Db, code: &str) -> Result<Option<Procedure>, ApiError> {
    let mut rows: Vec<Procedure> = db
        .supabase
        .select("procedures", &[("code", format!("eq.{}", scrub_pattern(code)))])
        .await?;
    Ok(rows.pop())
}

pub async fn get_procedure(db: &Db, id: Uuid) -> Result<Option<Procedure>, ApiError> {
    let mut rows: Vec<Procedure> = db.supabase.select("procedures", &[eq(id)]).await?;
    Ok(rows.pop())
}

pub async fn insert_procedure(db: &Db, new: &NewProcedure) -> Result<Procedure, ApiError> {
    let row = serde_json::to_value(new).map_err(|e| ApiError::Internal(e.to_string()))?;
    Ok(db.supabase.insert("procedures", &row).await?)
}

pub async fn update_procedure(
    db: &Db,
    id: Uuid,
    patch: serde_json::Value,
) -> Result<Option<Procedure>, ApiError> {
    let mut rows: Vec<Procedure> = db.supabase.update("procedures", &[eq(id)], &patch).await?;
    Ok(rows.pop())
}

pub async fn delete_procedure(db: &Db, id: Uuid) -> Result<(), ApiError> {
    Ok(db.supabase.delete("procedures", &[eq(id)]).await?)
}

/// True when at least one treatment references the procedure.
pub async fn procedure_in_use(db: &Db, procedure_id: Uuid) -> Result<bool, ApiError> {
    let rows: Vec<IdRow> = db
        .supabase
        .select(
            "treatments",
            &[
                ("procedure_id", format!("eq.{procedure_id}")),
                ("select", "id".into()),
                ("limit", "1".into()),
            ],
        )
        .await?;
    Ok(!rows.is_empty())
}

// ---------------------------------------------------------------------------
// Treatments

#[derive(Debug, Default)]
pub struct TreatmentFilter {
    pub patient_id: Option<Uuid>,
    pub status: Option<TreatmentStatus>,
    pub limit: i64,
    pub offset: i64,
}

#[derive(Debug, Serialize)]
pub struct NewTreatment {
    pub patient_id: Uuid,
    pub procedure_id: Uuid,
    pub appointment_id: Option<Uuid>,
    pub status: TreatmentStatus,
    pub notes: Option<String>,
}

pub async fn list_treatments(db: &Db, filter: &TreatmentFilter) -> Result<Vec<Treatment>, ApiError> {
    let mut query: Vec<(&str, String)> = vec![("order", "created_at.desc".into())];
    query.extend(paging(filter.limit, filter.offset));
    if let Some(patient_id) = filter.patient_id {
        query.push(("patient_id", format!("eq.{patient_id}")));
    }
    if let Some(status) = filter.status {
        query.push(("status", format!("eq.{status}")));
    }
    Ok(db.supabase.select("treatments", &query).await?)
}

pub async fn get_treatment(db: &Db, id: Uuid) -> Result<Option<Treatment>, ApiError> {
    let mut rows: Vec<Treatment> = db.supabase.select("treatments", &[eq(id)]).await?;
    Ok(rows.pop())
}

pub async fn insert_treatment(db: &Db, new: &NewTreatment) -> Result<Treatment, ApiError> {
    let row = serde_json::to_value(new).map_err(|e| ApiError::Internal(e.to_string()))?;
    Ok(db.supabase.insert("treatments", &row).await?)
}

pub async fn update_treatment(
    db: &Db,
    id: Uuid,
    patch: serde_json::Value,
) -> Result<Option<Treatment>, ApiError> {
    let mut patch = patch;
    patch["updated_at"] = json!(Utc::now());
    let mut rows: Vec<Treatment> = db.supabase.update("treatments", &[eq(id)], &patch).await?;
    Ok(rows.pop())
}

/// Guarded status transition; `extra` carries the timestamps the transition
/// stamps (`started_at`, `completed_at`).
pub async fn set_treatment_status(
    db: &Db,
    id: Uuid,
    allowed_from: &[TreatmentStatus],
    to: TreatmentStatus,
    extra: serde_json::Value,
) -> Result<Option<Treatment>, ApiError> {
    let from_list = allowed_from
        .iter()
        .map(TreatmentStatus::as_str)
        .collect::<Vec<_>>()
        .join(",");
    let mut patch = extra;
    patch["status"] = json!(to);
    patch["updated_at"] = json!(Utc::now());
    let mut rows: Vec<Treatment> = db
        .supabase
        .update("treatments", &[eq(id), ("status", format!("in.({from_list})"))], &patch)
        .await?;
    Ok(rows.pop())
}

// ---------------------------------------------------------------------------
// Registration tokens

#[derive(Debug, Serialize)]
pub struct NewRegistrationToken {
    pub token: String,
    pub kind: TokenKind,
    pub label: Option<String>,
    pub expires_at: DateTime<Utc>,
}

pub async fn list_tokens(db: &Db) -> Result<Vec<RegistrationToken>, ApiError> {
    Ok(db
        .supabase
        .select("registration_tokens", &[("order", "created_at.desc".into())])
        .await?)
}

pub async fn find_token_by_value(
    db: &Db,
    token: &str,
) -> Result<Option<RegistrationToken>, ApiError> {
    let mut rows: Vec<RegistrationToken> = db
        .supabase
        .select("registration_tokens", &[("token", format!("eq.{}", scrub_pattern(token)))])
        .await?;
    Ok(rows.pop())
}

pub async fn insert_token(
    db: &Db,
    new: &NewRegistrationToken,
) -> Result<RegistrationToken, ApiError> {
    let row = serde_json::to_value(new).map_err(|e| ApiError::Internal(e.to_string()))?;
    Ok(db.supabase.insert("registration_tokens", &row).await?)
}

/// Marks a single-use token consumed. The `used_at=is.null` guard makes the
/// consume idempotent under races: only one caller sees `true`.
pub async fn consume_token(db: &Db, id: Uuid) -> Result<bool, ApiError> {
    let patch = json!({ "used_at": Utc::now() });
    let rows: Vec<RegistrationToken> = db
        .supabase
        .update("registration_tokens", &[eq(id), ("used_at", "is.null".into())], &patch)
        .await?;
    Ok(!rows.is_empty())
}

pub async fn delete_token(db: &Db, id: Uuid) -> Result<(), ApiError> {
    Ok(db.supabase.delete("registration_tokens", &[eq(id)]).await?)
}

// ---------------------------------------------------------------------------
// Notifications

#[derive(Debug, Default)]
pub struct NotificationFilter {
    pub patient_id: Option<Uuid>,
    pub status: Option<NotificationStatus>,
    pub limit: i64,
    pub offset: i64,
}

#[derive(Debug, Serialize)]
pub struct NewNotification {
    pub patient_id: Uuid,
    pub appointment_id: Option<Uuid>,
    pub channel: String,
    pub recipient: String,
    pub subject: String,
    pub body: String,
    pub status: NotificationStatus,
    pub error: Option<String>,
    pub sent_at: Option<DateTime<Utc>>,
}

pub async fn list_notifications(
    db: &Db,
    filter: &NotificationFilter,
) -> Result<Vec<Notification>, ApiError> {
    let mut query: Vec<(&str, String)> = vec![("order", "created_at.desc".into())];
    query.extend(paging(filter.limit, filter.offset));
    if let Some(patient_id) = filter.patient_id {
        query.push(("patient_id", format!("eq.{patient_id}")));
    }
    if let Some(status) = filter.status {
        query.push(("status", format!("eq.{status}")));
    }
    Ok(db.supabase.select("notifications", &query).await?)
}

pub async fn insert_notification(
    db: &Db,
    new: &NewNotification,
) -> Result<Notification, ApiError> {
    let row = serde_json::to_value(new).map_err(|e| ApiError::Internal(e.to_string()))?;
    Ok(db.supabase.insert("notifications", &row).await?)
}

// ---------------------------------------------------------------------------
// Narrow projections for the dashboard

#[derive(Deserialize)]
struct IdRow {
    #[allow(dead_code)]
    id: Uuid,
}

pub async fn patient_statuses(db: &Db) -> Result<Vec<RegistrationStatus>, ApiError> {
    #[derive(Deserialize)]
    struct Row {
        registration_status: RegistrationStatus,
    }
    let rows: Vec<Row> = db
        .supabase
        .select("patients", &[("select", "registration_status".into())])
        .await?;
    Ok(rows.into_iter().map(|row| row.registration_status).collect())
}

pub async fn count_treatments_in_progress(db: &Db) -> Result<u64, ApiError> {
    let rows: Vec<IdRow> = db
        .supabase
        .select(
            "treatments",
            &[("select", "id".into()), ("status", "eq.in_progress".into())],
        )
        .await?;
    Ok(rows.len() as u64)
}

pub async fn count_notifications_sent_since(
    db: &Db,
    since: DateTime<Utc>,
) -> Result<u64, ApiError> {
    let rows: Vec<IdRow> = db
        .supabase
        .select(
            "notifications",
            &[
                ("select", "id".into()),
                ("status", "eq.sent".into()),
                ("created_at", format!("gte.{}", since.to_rfc3339())),
            ],
        )
        .await?;
    Ok(rows.len() as u64)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn scrub_pattern_strips_filter_metacharacters() {
        assert_eq!(scrub_pattern("ada,lovelace"), "adalovelace");
        assert_eq!(scrub_pattern("(or.true)"), "or.true");
        assert_eq!(scrub_pattern("plain"), "plain");
    }

    #[test]
    fn new_patient_serializes_without_generated_columns() {
        let new = NewPatient {
            first_name: "Ada".into(),
            last_name: "Lovelace".into(),
            email: "ada@clinic.example".into(),
            phone: "+44".into(),
            date_of_birth: None,
            address: None,
            notes: None,
            registration_status: RegistrationStatus::Pending,
            registration_token_id: None,
        };
        let value = serde_json::to_value(&new).unwrap();
        assert_eq!(value["registration_status"], "pending");
        assert!(value.get("id").is_none());
        assert!(value.get("created_at").is_none());
    }
}
