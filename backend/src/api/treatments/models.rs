//! Wire models for the treatment endpoints.

use serde::Deserialize;
use uuid::Uuid;

use crate::database::models::TreatmentStatus;
use crate::utils::serde_trimmed_opt;

#[derive(Debug, Deserialize)]
pub struct ListTreatmentsQuery {
    pub patient_id: Option<Uuid>,
    pub status: Option<TreatmentStatus>,
    pub limit: Option<i64>,
    pub offset: Option<i64>,
}

#[derive(Debug, Deserialize)]
pub struct CreateTreatmentRequest {
    pub patient_id: Uuid,
    pub procedure_id: Uuid,
    pub appointment_id: Option<Uuid>,
    #[serde(default, with = "serde_trimmed_opt")]
    pub notes: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct UpdateTreatmentRequest {
    pub notes: Option<String>,
}
