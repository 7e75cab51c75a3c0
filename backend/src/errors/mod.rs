//! Global application error types and handlers.
//!
//! Every handler returns `Result<_, ApiError>`. The single `IntoResponse`
//! impl renders the JSON error body, so status-code mapping lives in one
//! place instead of in each handler.

use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use serde_json::json;
use thiserror::Error;
use tracing::error;

use adapters::AdapterError;

#[derive(Debug, Error)]
pub enum ApiError {
    /// Client sent something unusable; `code` is a stable machine-readable tag.
    #[error("{1}")]
    BadRequest(&'static str, String),

    #[error("{0}")]
    Unauthorized(String),

    #[error("{0}")]
    Forbidden(String),

    /// `resource` names what was looked up ("patient", "appointment", ...).
    #[error("{0} not found")]
    NotFound(&'static str),

    /// State conflict: duplicate unique value or illegal lifecycle transition.
    #[error("{1}")]
    Conflict(&'static str, String),

    /// An outbound dependency (data platform, mail provider) failed.
    #[error("{0}")]
    UpstreamFailed(String),

    #[error("{0}")]
    Internal(String),
}

impl ApiError {
    fn status(&self) -> StatusCode {
        match self {
            ApiError::BadRequest(..) => StatusCode::BAD_REQUEST,
            ApiError::Unauthorized(_) => StatusCode::UNAUTHORIZED,
            ApiError::Forbidden(_) => StatusCode::FORBIDDEN,
            ApiError::NotFound(_) => StatusCode::NOT_FOUND,
            ApiError::Conflict(..) => StatusCode::CONFLICT,
            ApiError::UpstreamFailed(_) => StatusCode::BAD_GATEWAY,
            ApiError::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    fn code(&self) -> &'static str {
        match self {
            ApiError::BadRequest(code, _) | ApiError::Conflict(code, _) => code,
            ApiError::Unauthorized(_) => "UNAUTHORIZED",
            ApiError::Forbidden(_) => "FORBIDDEN",
            ApiError::NotFound(_) => "NOT_FOUND",
            ApiError::UpstreamFailed(_) => "UPSTREAM_FAILED",
            ApiError::Internal(_) => "INTERNAL",
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status = self.status();
        if status.is_server_error() {
            error!(code = self.code(), "request failed: {self}");
        }
        // 5xx details stay in the logs; clients get a generic message.
        let message = if status.is_server_error() {
            "internal error".to_string()
        } else {
            self.to_string()
        };
        let body = Json(json!({ "error": message, "code": self.code() }));
        (status, body).into_response()
    }
}

impl From<AdapterError> for ApiError {
    fn from(err: AdapterError) -> Self {
        match err.status_code() {
            // The service key is rejected upstream: our deployment is broken,
            // not the client's request.
            Some(401) | Some(403) => ApiError::UpstreamFailed("data service rejected credentials".into()),
            Some(404) => ApiError::NotFound("resource"),
            Some(409) => ApiError::Conflict("DUPLICATE", "value already exists".into()),
            Some(code) if (400..500).contains(&code) => {
                ApiError::BadRequest("UPSTREAM_REJECTED", format!("request rejected upstream ({code})"))
            }
            Some(_) => ApiError::UpstreamFailed(err.to_string()),
            None => match err {
                AdapterError::Http(msg) => ApiError::UpstreamFailed(msg),
                other => ApiError::Internal(other.to_string()),
            },
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::body::to_bytes;

    async fn body_json(err: ApiError) -> (StatusCode, serde_json::Value) {
        let response = err.into_response();
        let status = response.status();
        let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
        (status, serde_json::from_slice(&bytes).unwrap())
    }

    #[tokio::test]
    async fn status_mapping_per_variant() {
        let cases = [
            (ApiError::BadRequest("VALIDATION_ERROR", "bad".into()), 400),
            (ApiError::Unauthorized("no".into()), 401),
            (ApiError::Forbidden("no".into()), 403),
            (ApiError::NotFound("patient"), 404),
            (ApiError::Conflict("DUPLICATE", "dup".into()), 409),
            (ApiError::UpstreamFailed("down".into()), 502),
            (ApiError::Internal("boom".into()), 500),
        ];
        for (err, expected) in cases {
            let (status, _) = body_json(err).await;
            assert_eq!(status.as_u16(), expected);
        }
    }

    #[tokio::test]
    async fn client_errors_expose_message_and_code() {
        let (_, body) = body_json(ApiError::Conflict("EMAIL_EXISTS", "email already registered".into())).await;
        assert_eq!(body["error"], "email already registered");
        assert_eq!(body["code"], "EMAIL_EXISTS");
    }

    #[tokio::test]
    async fn server_errors_hide_details() {
        let (_, body) = body_json(ApiError::Internal("connection string leaked".into())).await;
        assert_eq!(body["error"], "internal error");
    }

    #[tokio::test]
    async fn not_found_names_the_resource() {
        let (_, body) = body_json(ApiError::NotFound("appointment")).await;
        assert_eq!(body["error"], "appointment not found");
    }

    #[test]
    fn adapter_conflict_maps_to_conflict() {
        let err = ApiError::from(AdapterError::Status { code: 409, body: "unique".into() });
        assert!(matches!(err, ApiError::Conflict(..)));
    }

    #[test]
    fn adapter_auth_failure_is_upstream_not_client() {
        let err = ApiError::from(AdapterError::Status { code: 401, body: "bad key".into() });
        assert!(matches!(err, ApiError::UpstreamFailed(_)));
    }

    #[test]
    fn adapter_transport_failure_is_bad_gateway() {
        let err = ApiError::from(AdapterError::Http("connect timeout".into()));
        assert!(matches!(err, ApiError::UpstreamFailed(_)));
    }
}
