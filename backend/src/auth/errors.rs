//! Custom error types specific to authentication failures.

use thiserror::Error;

use adapters::AdapterError;

use crate::errors::ApiError;

#[derive(Debug, Error)]
pub enum AuthError {
    #[error("invalid email or password")]
    InvalidCredentials,

    /// Malformed, tampered or unverifiable session token.
    #[error("invalid session token")]
    InvalidToken,

    #[error("session expired")]
    Expired,

    #[error("token signing failed: {0}")]
    Signing(String),

    /// The auth service itself failed (not a credential problem).
    #[error(transparent)]
    Upstream(AdapterError),
}

impl From<AuthError> for ApiError {
    fn from(err: AuthError) -> Self {
        match err {
            AuthError::InvalidCredentials | AuthError::InvalidToken | AuthError::Expired => {
                ApiError::Unauthorized(err.to_string())
            }
            AuthError::Signing(msg) => ApiError::Internal(msg),
            AuthError::Upstream(inner) => inner.into(),
        }
    }
}
