//! Wire models for the patient endpoints.
//!
//! `PatientDetails` is shared with the public self-registration flow, which
//! accepts the same contact fields.

use chrono::NaiveDate;
use serde::Deserialize;

use crate::database::models::RegistrationStatus;
use crate::errors::ApiError;
use crate::utils::{looks_like_email, serde_trimmed_opt};

#[derive(Debug, Deserialize)]
pub struct ListPatientsQuery {
    pub status: Option<RegistrationStatus>,
    pub search: Option<String>,
    pub limit: Option<i64>,
    pub offset: Option<i64>,
}

/// Contact fields common to admin-side creation and self-registration.
#[derive(Debug, Deserialize)]
pub struct PatientDetails {
    pub first_name: String,
    pub last_name: String,
    pub email: String,
    pub phone: String,
    pub date_of_birth: Option<NaiveDate>,
    #[serde(default, with = "serde_trimmed_opt")]
    pub address: Option<String>,
    #[serde(default, with = "serde_trimmed_opt")]
    pub notes: Option<String>,
}

impl PatientDetails {
    /// Trims and checks the required fields; lowercases the email so the
    /// unique index is case-insensitive in practice.
    pub fn validated(mut self) -> Result<Self, ApiError> {
        self.first_name = self.first_name.trim().to_string();
        self.last_name = self.last_name.trim().to_string();
        self.phone = self.phone.trim().to_string();
        self.email = self.email.trim().to_ascii_lowercase();

        if self.first_name.is_empty() || self.last_name.is_empty() {
            return Err(ApiError::BadRequest(
                "VALIDATION_ERROR",
                "first_name and last_name are required".into(),
            ));
        }
        if self.phone.is_empty() {
            return Err(ApiError::BadRequest("VALIDATION_ERROR", "phone is required".into()));
        }
        if !looks_like_email(&self.email) {
            return Err(ApiError::BadRequest(
                "VALIDATION_ERROR",
                "email is not a valid address".into(),
            ));
        }
        Ok(self)
    }
}

#[derive(Debug, Deserialize)]
pub struct CreatePatientRequest {
    #[serde(flatten)]
    pub details: PatientDetails,
}

/// Partial update; absent fields are left untouched. Empty `address`/`notes`
/// clear the column.
#[derive(Debug, Default, Deserialize)]
pub struct UpdatePatientRequest {
    pub first_name: Option<String>,
    pub last_name: Option<String>,
    pub email: Option<String>,
    pub phone: Option<String>,
    pub date_of_birth: Option<NaiveDate>,
    pub address: Option<String>,
    pub notes: Option<String>,
}

impl UpdatePatientRequest {
    pub fn is_empty(&self) -> bool {
        self.first_name.is_none()
            && self.last_name.is_none()
            && self.email.is_none()
            && self.phone.is_none()
            && self.date_of_birth.is_none()
            && self.address.is_none()
            && self.notes.is_none()
    }
}
