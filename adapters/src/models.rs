//! Generic data models for the `adapters` crate.
//!
//! These models define the wire shapes exchanged with the hosted auth
//! service and the email provider, kept separate from the backend's own
//! API and database models.

use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Identity record returned by the auth service together with a session.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AuthUser {
    pub id: Uuid,
    pub email: String,
}

/// Session issued by the auth service after a successful password grant.
///
/// The `access_token` is the platform's own JWT; the backend does not forward
/// it and only uses the verified identity to mint its session token.
#[derive(Debug, Clone, Deserialize)]
pub struct AuthSession {
    pub access_token: String,
    pub expires_in: i64,
    pub user: AuthUser,
}

/// A single outbound transactional email.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct EmailMessage {
    pub to: String,
    pub subject: String,
    pub text: String,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn auth_session_decodes_password_grant_response() {
        let raw = r#"{
            "access_token": "header.claims.sig",
            "token_type": "bearer",
            "expires_in": 3600,
            "user": { "id": "7c9e6679-7425-40de-944b-e07fc1f90ae7", "email": "admin@clinic.test" }
        }"#;
        let session: AuthSession = serde_json::from_str(raw).unwrap();
        assert_eq!(session.expires_in, 3600);
        assert_eq!(session.user.email, "admin@clinic.test");
    }
}
