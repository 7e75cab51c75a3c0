//! Wire models for the procedure catalog.

use serde::Deserialize;

use crate::errors::ApiError;
use crate::services::scheduling::{MAX_DURATION_MINUTES, MIN_DURATION_MINUTES};
use crate::utils::serde_trimmed_opt;

#[derive(Debug, Deserialize)]
pub struct ListProceduresQuery {
    /// When true, inactive catalog entries are omitted.
    #[serde(default)]
    pub active: bool,
}

#[derive(Debug, Deserialize)]
pub struct CreateProcedureRequest {
    pub code: String,
    pub name: String,
    #[serde(default, with = "serde_trimmed_opt")]
    pub description: Option<String>,
    pub default_duration_minutes: Option<i32>,
    pub price_cents: Option<i64>,
}

impl CreateProcedureRequest {
    pub fn validated(mut self) -> Result<Self, ApiError> {
        self.code = self.code.trim().to_ascii_uppercase();
        self.name = self.name.trim().to_string();
        if self.code.is_empty() || self.name.is_empty() {
            return Err(ApiError::BadRequest("VALIDATION_ERROR", "code and name are required".into()));
        }
        if let Some(minutes) = self.default_duration_minutes {
            validate_duration_bounds(minutes)?;
        }
        if self.price_cents.is_some_and(|price| price < 0) {
            return Err(ApiError::BadRequest("VALIDATION_ERROR", "price_cents cannot be negative".into()));
        }
        Ok(self)
    }
}

#[derive(Debug, Default, Deserialize)]
pub struct UpdateProcedureRequest {
    pub name: Option<String>,
    pub description: Option<String>,
    pub default_duration_minutes: Option<i32>,
    pub price_cents: Option<i64>,
    pub active: Option<bool>,
}

impl UpdateProcedureRequest {
    pub fn is_empty(&self) -> bool {
        self.name.is_none()
            && self.description.is_none()
            && self.default_duration_minutes.is_none()
            && self.price_cents.is_none()
            && self.active.is_none()
    }
}

pub fn validate_duration_bounds(minutes: i32) -> Result<(), ApiError> {
    if !(MIN_DURATION_MINUTES..=MAX_DURATION_MINUTES).contains(&minutes) {
        return Err(ApiError::BadRequest(
            "VALIDATION_ERROR",
            format!(
                "default_duration_minutes must be between {MIN_DURATION_MINUTES} and {MAX_DURATION_MINUTES}"
            ),
        ));
    }
    Ok(())
}
