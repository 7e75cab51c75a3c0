//! Rust structs that represent database table mappings.
//!
//! These models mirror the rows stored in the hosted platform and are
//! (de)serialized straight from its PostgREST JSON. Status enums use the
//! lowercase snake_case strings the tables store. API-facing request DTOs
//! live with their handlers, not here.

use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use std::fmt;

// ---------------------------------------------------------------------------
// Patients

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RegistrationStatus {
    Pending,
    Approved,
    Denied,
}

impl RegistrationStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            RegistrationStatus::Pending => "pending",
            RegistrationStatus::Approved => "approved",
            RegistrationStatus::Denied => "denied",
        }
    }
}

impl fmt::Display for RegistrationStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Patient {
    pub id: Uuid,
    pub first_name: String,
    pub last_name: String,
    pub email: String,
    pub phone: String,
    pub date_of_birth: Option<NaiveDate>,
    pub address: Option<String>,
    pub notes: Option<String>,
    pub registration_status: RegistrationStatus,
    pub registration_token_id: Option<Uuid>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Patient {
    pub fn full_name(&self) -> String {
        format!("{} {}", self.first_name, self.last_name)
    }
}

// ---------------------------------------------------------------------------
// Appointments

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AppointmentStatus {
    Scheduled,
    Confirmed,
    Completed,
    Cancelled,
    NoShow,
}

impl AppointmentStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            AppointmentStatus::Scheduled => "scheduled",
            AppointmentStatus::Confirmed => "confirmed",
            AppointmentStatus::Completed => "completed",
            AppointmentStatus::Cancelled => "cancelled",
            AppointmentStatus::NoShow => "no_show",
        }
    }

    /// Statuses that still occupy their slot on the calendar.
    pub fn is_active(&self) -> bool {
        matches!(self, AppointmentStatus::Scheduled | AppointmentStatus::Confirmed)
    }
}

impl fmt::Display for AppointmentStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Appointment {
    pub id: Uuid,
    pub patient_id: Uuid,
    pub procedure_id: Option<Uuid>,
    pub scheduled_at: DateTime<Utc>,
    pub duration_minutes: i32,
    pub status: AppointmentStatus,
    pub notes: Option<String>,
    pub reminder_sent_at: Option<DateTime<Utc>>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Appointment {
    pub fn end_time(&self) -> DateTime<Utc> {
        self.scheduled_at + chrono::Duration::minutes(i64::from(self.duration_minutes))
    }
}

// ---------------------------------------------------------------------------
// Procedures & treatments

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Procedure {
    pub id: Uuid,
    pub code: String,
    pub name: String,
    pub description: Option<String>,
    pub default_duration_minutes: i32,
    pub price_cents: i64,
    pub active: bool,
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TreatmentStatus {
    Planned,
    InProgress,
    Completed,
    Cancelled,
}

impl TreatmentStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            TreatmentStatus::Planned => "planned",
            TreatmentStatus::InProgress => "in_progress",
            TreatmentStatus::Completed => "completed",
            TreatmentStatus::Cancelled => "cancelled",
        }
    }
}

impl fmt::Display for TreatmentStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Treatment {
    pub id: Uuid,
    pub patient_id: Uuid,
    pub procedure_id: Uuid,
    pub appointment_id: Option<Uuid>,
    pub status: TreatmentStatus,
    pub notes: Option<String>,
    pub started_at: Option<DateTime<Utc>>,
    pub completed_at: Option<DateTime<Utc>>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

// ---------------------------------------------------------------------------
// Registration tokens

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TokenKind {
    SingleUse,
    Reusable,
}

impl TokenKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            TokenKind::SingleUse => "single_use",
            TokenKind::Reusable => "reusable",
        }
    }
}

impl fmt::Display for TokenKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RegistrationToken {
    pub id: Uuid,
    pub token: String,
    pub kind: TokenKind,
    pub label: Option<String>,
    pub expires_at: DateTime<Utc>,
    pub used_at: Option<DateTime<Utc>>,
    pub created_at: DateTime<Utc>,
}

// ---------------------------------------------------------------------------
// Notifications

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum NotificationStatus {
    Sent,
    Failed,
}

impl NotificationStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            NotificationStatus::Sent => "sent",
            NotificationStatus::Failed => "failed",
        }
    }
}

impl fmt::Display for NotificationStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Notification {
    pub id: Uuid,
    pub patient_id: Uuid,
    pub appointment_id: Option<Uuid>,
    pub channel: String,
    pub recipient: String,
    pub subject: String,
    pub body: String,
    pub status: NotificationStatus,
    pub error: Option<String>,
    pub created_at: DateTime<Utc>,
    pub sent_at: Option<DateTime<Utc>>,
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    #[test]
    fn status_enums_use_wire_strings() {
        assert_eq!(serde_json::to_string(&AppointmentStatus::NoShow).unwrap(), r#""no_show""#);
        assert_eq!(serde_json::to_string(&TreatmentStatus::InProgress).unwrap(), r#""in_progress""#);
        assert_eq!(serde_json::to_string(&TokenKind::SingleUse).unwrap(), r#""single_use""#);
        let status: RegistrationStatus = serde_json::from_str(r#""denied""#).unwrap();
        assert_eq!(status, RegistrationStatus::Denied);
    }

    #[test]
    fn display_matches_serde_encoding() {
        assert_eq!(AppointmentStatus::NoShow.to_string(), "no_show");
        assert_eq!(RegistrationStatus::Pending.to_string(), "pending");
        assert_eq!(TokenKind::Reusable.to_string(), "reusable");
    }

    #[test]
    fn patient_row_decodes_from_rest_payload() {
        let raw = r#"{
            "id": "7c9e6679-7425-40de-944b-e07fc1f90ae7",
            "first_name": "Ada",
            "last_name": "Lovelace",
            "email": "ada@clinic.example",
            "phone": "+44 20 7946 0000",
            "date_of_birth": "1815-12-10",
            "address": null,
            "notes": null,
            "registration_status": "pending",
            "registration_token_id": null,
            "created_at": "2026-08-01T09:00:00Z",
            "updated_at": "2026-08-01T09:00:00Z"
        }"#;
        let patient: Patient = serde_json::from_str(raw).unwrap();
        assert_eq!(patient.full_name(), "Ada Lovelace");
        assert_eq!(patient.registration_status, RegistrationStatus::Pending);
        assert_eq!(patient.date_of_birth.unwrap().to_string(), "1815-12-10");
    }

    #[test]
    fn appointment_end_time_adds_duration() {
        let raw = r#"{
            "id": "7c9e6679-7425-40de-944b-e07fc1f90ae7",
            "patient_id": "7c9e6679-7425-40de-944b-e07fc1f90ae8",
            "procedure_id": null,
            "scheduled_at": "2026-08-10T10:00:00Z",
            "duration_minutes": 45,
            "status": "scheduled",
            "notes": null,
            "reminder_sent_at": null,
            "created_at": "2026-08-01T09:00:00Z",
            "updated_at": "2026-08-01T09:00:00Z"
        }"#;
        let appointment: Appointment = serde_json::from_str(raw).unwrap();
        let expected = Utc.with_ymd_and_hms(2026, 8, 10, 10, 45, 0).unwrap();
        assert_eq!(appointment.end_time(), expected);
        assert!(appointment.status.is_active());
    }
}
