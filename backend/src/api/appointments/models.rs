//! Wire models for the appointment endpoints.

use chrono::{DateTime, NaiveDate, Utc};
use serde::Deserialize;
use uuid::Uuid;

use crate::database::models::AppointmentStatus;
use crate::utils::serde_trimmed_opt;

#[derive(Debug, Deserialize)]
pub struct ListAppointmentsQuery {
    pub patient_id: Option<Uuid>,
    pub status: Option<AppointmentStatus>,
    pub from: Option<DateTime<Utc>>,
    pub to: Option<DateTime<Utc>>,
    pub limit: Option<i64>,
    pub offset: Option<i64>,
}

#[derive(Debug, Deserialize)]
pub struct DayQuery {
    pub date: NaiveDate,
}

#[derive(Debug, Deserialize)]
pub struct CreateAppointmentRequest {
    pub patient_id: Uuid,
    pub scheduled_at: DateTime<Utc>,
    pub duration_minutes: Option<i32>,
    pub procedure_id: Option<Uuid>,
    #[serde(default, with = "serde_trimmed_opt")]
    pub notes: Option<String>,
}

/// Reschedule and annotation patch; status changes go through the dedicated
/// action endpoints.
#[derive(Debug, Default, Deserialize)]
pub struct UpdateAppointmentRequest {
    pub scheduled_at: Option<DateTime<Utc>>,
    pub duration_minutes: Option<i32>,
    pub notes: Option<String>,
}

impl UpdateAppointmentRequest {
    pub fn is_empty(&self) -> bool {
        self.scheduled_at.is_none() && self.duration_minutes.is_none() && self.notes.is_none()
    }

    pub fn reschedules(&self) -> bool {
        self.scheduled_at.is_some() || self.duration_minutes.is_some()
    }
}
