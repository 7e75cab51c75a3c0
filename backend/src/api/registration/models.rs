//! Wire models for registration tokens and the public registration flow.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::api::patients::models::PatientDetails;
use crate::database::models::{RegistrationToken, TokenKind};
use crate::services::registration::{token_standing, TokenStanding};
use crate::utils::serde_trimmed_opt;

#[derive(Debug, Deserialize)]
pub struct IssueTokenRequest {
    pub kind: TokenKind,
    pub ttl_minutes: Option<i64>,
    #[serde(default, with = "serde_trimmed_opt")]
    pub label: Option<String>,
}

/// Token row plus its computed standing and the link to encode as a QR code.
#[derive(Debug, Serialize)]
pub struct TokenSummary {
    pub id: Uuid,
    pub token: String,
    pub kind: TokenKind,
    pub label: Option<String>,
    pub expires_at: DateTime<Utc>,
    pub used_at: Option<DateTime<Utc>>,
    pub created_at: DateTime<Utc>,
    pub standing: TokenStanding,
    pub join_url: String,
}

impl TokenSummary {
    pub fn from_row(row: RegistrationToken, public_base_url: &str, now: DateTime<Utc>) -> Self {
        let standing = token_standing(&row, now);
        let join_url = crate::services::registration::join_url(public_base_url, &row.token);
        TokenSummary {
            id: row.id,
            token: row.token,
            kind: row.kind,
            label: row.label,
            expires_at: row.expires_at,
            used_at: row.used_at,
            created_at: row.created_at,
            standing,
            join_url,
        }
    }
}

#[derive(Debug, Deserialize)]
pub struct ValidateQuery {
    pub token: String,
}

#[derive(Debug, Serialize)]
pub struct ValidateResponse {
    pub valid: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub reason: Option<&'static str>,
}

#[derive(Debug, Deserialize)]
pub struct RegisterRequest {
    pub token: String,
    #[serde(flatten)]
    pub details: PatientDetails,
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Duration;

    #[test]
    fn token_summary_carries_standing_and_link() {
        let now = Utc::now();
        let row = RegistrationToken {
            id: Uuid::new_v4(),
            token: "cafe01".into(),
            kind: TokenKind::Reusable,
            label: Some("front desk".into()),
            expires_at: now + Duration::hours(1),
            used_at: None,
            created_at: now,
        };
        let summary = TokenSummary::from_row(row, "https://admin.clinic.example", now);
        assert_eq!(summary.standing, TokenStanding::Usable);
        assert_eq!(summary.join_url, "https://admin.clinic.example/register?token=cafe01");
    }

    #[test]
    fn validate_response_omits_reason_when_valid() {
        let body = serde_json::to_string(&ValidateResponse { valid: true, reason: None }).unwrap();
        assert_eq!(body, r#"{"valid":true}"#);
        let body =
            serde_json::to_string(&ValidateResponse { valid: false, reason: Some("expired") })
                .unwrap();
        assert_eq!(body, r#"{"valid":false,"reason":"expired"}"#);
    }

    #[test]
    fn register_request_flattens_patient_details() {
        let raw = r#"{
            "token": "cafe01",
            "first_name": "Grace",
            "last_name": "Hopper",
            "email": "grace@clinic.example",
            "phone": "+1 555 0100"
        }"#;
        let request: RegisterRequest = serde_json::from_str(raw).unwrap();
        assert_eq!(request.token, "cafe01");
        assert_eq!(request.details.last_name, "Hopper");
    }
}
