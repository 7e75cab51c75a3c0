//! Handler functions for the procedure catalog.

use axum::extract::{Path, Query, State};
use axum::http::StatusCode;
use axum::Json;
use serde_json::{json, Map, Value};
use tracing::info;
use uuid::Uuid;

use crate::api::procedures::models::{
    validate_duration_bounds, CreateProcedureRequest, ListProceduresQuery, UpdateProcedureRequest,
};
use crate::database::models::Procedure;
use crate::database::queries::{self, NewProcedure};
use crate::errors::ApiError;
use crate::services::scheduling::DEFAULT_DURATION_MINUTES;
use crate::state::AppState;

pub async fn list_procedures(
    State(state): State<AppState>,
    Query(query): Query<ListProceduresQuery>,
) -> Result<Json<Vec<Procedure>>, ApiError> {
    Ok(Json(queries::list_procedures(&state.db, query.active).await?))
}

pub async fn get_procedure(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> Result<Json<Procedure>, ApiError> {
    let procedure = queries::get_procedure(&state.db, id)
        .await?
        .ok_or(ApiError::NotFound("procedure"))?;
    Ok(Json(procedure))
}

pub async fn create_procedure(
    State(state): State<AppState>,
    Json(request): Json<CreateProcedureRequest>,
) -> Result<(StatusCode, Json<Procedure>), ApiError> {
    let request = request.validated()?;

    if queries::find_procedure_by_code(&state.db, &request.code).await?.is_some() {
        return Err(ApiError::Conflict("CODE_EXISTS", "procedure code is already in use".into()));
    }

    let new = NewProcedure {
        code: request.code,
        name: request.name,
        description: request.description,
        default_duration_minutes: request.default_duration_minutes.unwrap_or(DEFAULT_DURATION_MINUTES),
        price_cents: request.price_cents.unwrap_or(0),
        active: true,
    };
    let procedure = queries::insert_procedure(&state.db, &new).await?;
    info!(procedure = %procedure.id, code = %procedure.code, "procedure created");
    Ok((StatusCode::CREATED, Json(procedure)))
}

pub async fn update_procedure(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
    Json(request): Json<UpdateProcedureRequest>,
) -> Result<Json<Procedure>, ApiError> {
    if request.is_empty() {
        return Err(ApiError::BadRequest("VALIDATION_ERROR", "no fields to update".into()));
    }

    let mut patch = Map::new();
    if let Some(name) = request.name {
        let name = name.trim().to_string();
        if name.is_empty() {
            return Err(ApiError::BadRequest("VALIDATION_ERROR", "name cannot be blank".into()));
        }
        patch.insert("name".into(), json!(name));
    }
    if let Some(description) = request.description {
        let trimmed = description.trim();
        patch.insert(
            "description".into(),
            if trimmed.is_empty() { Value::Null } else { json!(trimmed) },
        );
    }
    if let Some(minutes) = request.default_duration_minutes {
        validate_duration_bounds(minutes)?;
        patch.insert("default_duration_minutes".into(), json!(minutes));
    }
    if let Some(price_cents) = request.price_cents {
        if price_cents < 0 {
            return Err(ApiError::BadRequest("VALIDATION_ERROR", "price_cents cannot be negative".into()));
        }
        patch.insert("price_cents".into(), json!(price_cents));
    }
    if let Some(active) = request.active {
        patch.insert("active".into(), json!(active));
    }

    let procedure = queries::update_procedure(&state.db, id, Value::Object(patch))
        .await?
        .ok_or(ApiError::NotFound("procedure"))?;
    Ok(Json(procedure))
}

/// Deleting a procedure that treatments still reference is refused; the
/// catalog entry should be deactivated instead.
pub async fn delete_procedure(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> Result<StatusCode, ApiError> {
    queries::get_procedure(&state.db, id).await?.ok_or(ApiError::NotFound("procedure"))?;
    if queries::procedure_in_use(&state.db, id).await? {
        return Err(ApiError::Conflict(
            "PROCEDURE_IN_USE",
            "treatments reference this procedure; deactivate it instead".into(),
        ));
    }
    queries::delete_procedure(&state.db, id).await?;
    info!(procedure = %id, "procedure deleted");
    Ok(StatusCode::NO_CONTENT)
}
