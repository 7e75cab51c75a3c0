//! Custom error types specific to the `adapters` crate.
//!
//! This module defines errors that can occur while talking to the hosted
//! data platform or the email provider, providing a unified error handling
//! mechanism for all outbound calls.

use thiserror::Error;

#[derive(Debug, Error)]
pub enum AdapterError {
    /// The adapter was constructed with unusable settings (bad URL, empty key).
    #[error("adapter configuration error: {0}")]
    Configuration(String),

    /// Transport-level failure: DNS, TLS, connect or read timeout.
    #[error("http transport error: {0}")]
    Http(String),

    /// The upstream service answered with a non-success status.
    #[error("upstream returned {code}: {body}")]
    Status { code: u16, body: String },

    /// The upstream answered 2xx but the payload did not match the expected shape.
    #[error("failed to decode upstream response: {0}")]
    Decode(String),
}

impl AdapterError {
    /// Status code of the upstream response, when there was one.
    pub fn status_code(&self) -> Option<u16> {
        match self {
            AdapterError::Status { code, .. } => Some(*code),
            _ => None,
        }
    }
}

impl From<reqwest::Error> for AdapterError {
    fn from(err: reqwest::Error) -> Self {
        if err.is_decode() {
            AdapterError::Decode(err.to_string())
        } else {
            AdapterError::Http(err.to_string())
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn status_code_only_for_status_variant() {
        let err = AdapterError::Status { code: 409, body: "duplicate".into() };
        assert_eq!(err.status_code(), Some(409));
        assert_eq!(AdapterError::Http("timed out".into()).status_code(), None);
    }

    #[test]
    fn display_includes_code_and_body() {
        let err = AdapterError::Status { code: 404, body: "missing".into() };
        assert_eq!(err.to_string(), "upstream returned 404: missing");
    }
}
