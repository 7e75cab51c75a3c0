//! Handler functions for QR registration tokens and public self-registration.

use axum::extract::{Path, Query, State};
use axum::http::StatusCode;
use axum::Json;
use chrono::Utc;
use tracing::info;
use uuid::Uuid;

use crate::api::registration::models::{
    IssueTokenRequest, RegisterRequest, TokenSummary, ValidateQuery, ValidateResponse,
};
use crate::database::models::{Patient, RegistrationStatus, TokenKind};
use crate::database::queries::{self, NewPatient, NewRegistrationToken};
use crate::errors::ApiError;
use crate::services::registration::{token_standing, validate_ttl, TokenStanding};
use crate::state::AppState;
use crate::utils::new_opaque_token;

// --- admin surface ---------------------------------------------------------

pub async fn issue_token(
    State(state): State<AppState>,
    Json(request): Json<IssueTokenRequest>,
) -> Result<(StatusCode, Json<TokenSummary>), ApiError> {
    let ttl = validate_ttl(request.ttl_minutes)?;
    let now = Utc::now();

    let new = NewRegistrationToken {
        token: new_opaque_token(),
        kind: request.kind,
        label: request.label,
        expires_at: now + ttl,
    };
    let row = queries::insert_token(&state.db, &new).await?;
    info!(token = %row.id, kind = %row.kind, "registration token issued");

    let summary = TokenSummary::from_row(row, &state.config.public_base_url, now);
    Ok((StatusCode::CREATED, Json(summary)))
}

pub async fn list_tokens(
    State(state): State<AppState>,
) -> Result<Json<Vec<TokenSummary>>, ApiError> {
    let now = Utc::now();
    let rows = queries::list_tokens(&state.db).await?;
    let summaries = rows
        .into_iter()
        .map(|row| TokenSummary::from_row(row, &state.config.public_base_url, now))
        .collect();
    Ok(Json(summaries))
}

pub async fn revoke_token(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> Result<StatusCode, ApiError> {
    queries::delete_token(&state.db, id).await?;
    info!(token = %id, "registration token revoked");
    Ok(StatusCode::NO_CONTENT)
}

// --- public surface --------------------------------------------------------

/// Token probe for the registration page. Always 200; invalid tokens carry a
/// reason and nothing else, so the endpoint leaks no token metadata.
pub async fn validate_token(
    State(state): State<AppState>,
    Query(query): Query<ValidateQuery>,
) -> Result<Json<ValidateResponse>, ApiError> {
    let response = match queries::find_token_by_value(&state.db, query.token.trim()).await? {
        None => ValidateResponse { valid: false, reason: Some("not_found") },
        Some(row) => {
            let standing = token_standing(&row, Utc::now());
            ValidateResponse { valid: standing == TokenStanding::Usable, reason: standing.reason() }
        }
    };
    Ok(Json(response))
}

/// Public self-registration: a usable token plus contact details creates a
/// `pending` patient awaiting the admin decision.
pub async fn register_patient(
    State(state): State<AppState>,
    Json(request): Json<RegisterRequest>,
) -> Result<(StatusCode, Json<Patient>), ApiError> {
    let token = queries::find_token_by_value(&state.db, request.token.trim())
        .await?
        .ok_or(ApiError::BadRequest("TOKEN_INVALID", "registration token not found".into()))?;

    match token_standing(&token, Utc::now()) {
        TokenStanding::Usable => {}
        TokenStanding::Expired => {
            return Err(ApiError::BadRequest("TOKEN_INVALID", "registration token expired".into()));
        }
        TokenStanding::AlreadyUsed => {
            return Err(ApiError::BadRequest(
                "TOKEN_INVALID",
                "registration token already used".into(),
            ));
        }
    }

    let details = request.details.validated()?;
    if queries::find_patient_by_email(&state.db, &details.email).await?.is_some() {
        return Err(ApiError::Conflict("EMAIL_EXISTS", "email is already registered".into()));
    }

    // Claim the token before creating the patient; of two concurrent uses of
    // a single-use token exactly one passes the guarded update.
    if token.kind == TokenKind::SingleUse && !queries::consume_token(&state.db, token.id).await? {
        return Err(ApiError::BadRequest("TOKEN_INVALID", "registration token already used".into()));
    }

    let new = NewPatient {
        first_name: details.first_name,
        last_name: details.last_name,
        email: details.email,
        phone: details.phone,
        date_of_birth: details.date_of_birth,
        address: details.address,
        notes: details.notes,
        registration_status: RegistrationStatus::Pending,
        registration_token_id: Some(token.id),
    };
    let patient = queries::insert_patient(&state.db, &new).await?;
    info!(patient = %patient.id, token = %token.id, "patient self-registered");
    Ok((StatusCode::CREATED, Json(patient)))
}
