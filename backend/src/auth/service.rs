//! Core business logic for the authentication system.
//!
//! This service verifies admin credentials against the platform's auth
//! endpoint and handles issuance and validation of the backend's own HS256
//! session tokens. Verification is a single pass: split, recompute the MAC,
//! decode, check expiry.

use base64::engine::general_purpose::URL_SAFE_NO_PAD;
use base64::Engine as _;
use chrono::{DateTime, Duration, Utc};
use hmac::{Hmac, Mac};
use serde::{Deserialize, Serialize};
use sha2::Sha256;
use tracing::warn;

use adapters::SupabaseClient;

use crate::auth::errors::AuthError;
use crate::auth::models::{Claims, CurrentAdmin};

type HmacSha256 = Hmac<Sha256>;

#[derive(Serialize, Deserialize)]
struct JwtHeader {
    alg: &'static str,
    typ: &'static str,
}

#[derive(Clone)]
pub struct AuthService {
    supabase: SupabaseClient,
    secret: Vec<u8>,
    ttl: Duration,
}

impl AuthService {
    pub fn new(supabase: SupabaseClient, secret: &str, ttl_hours: i64) -> Self {
        Self {
            supabase,
            secret: secret.as_bytes().to_vec(),
            ttl: Duration::hours(ttl_hours),
        }
    }

    /// Verifies credentials upstream and mints a session token.
    pub async fn login(
        &self,
        email: &str,
        password: &str,
    ) -> Result<(CurrentAdmin, String, DateTime<Utc>), AuthError> {
        let session = self
            .supabase
            .sign_in_with_password(email, password)
            .await
            .map_err(|err| match err.status_code() {
                Some(400) | Some(401) | Some(403) => {
                    warn!(email, "login rejected by auth service");
                    AuthError::InvalidCredentials
                }
                _ => AuthError::Upstream(err),
            })?;

        let admin = CurrentAdmin { id: session.user.id, email: session.user.email };
        let (token, expires_at) = self.issue(&admin)?;
        Ok((admin, token, expires_at))
    }

    /// Signs a session token for a verified identity.
    pub fn issue(&self, admin: &CurrentAdmin) -> Result<(String, DateTime<Utc>), AuthError> {
        let now = Utc::now();
        let expires_at = now + self.ttl;
        let claims = Claims {
            sub: admin.id,
            email: admin.email.clone(),
            iat: now.timestamp(),
            exp: expires_at.timestamp(),
        };

        let header = serde_json::to_vec(&JwtHeader { alg: "HS256", typ: "JWT" })
            .map_err(|err| AuthError::Signing(err.to_string()))?;
        let claims_json =
            serde_json::to_vec(&claims).map_err(|err| AuthError::Signing(err.to_string()))?;

        let message = format!(
            "{}.{}",
            URL_SAFE_NO_PAD.encode(header),
            URL_SAFE_NO_PAD.encode(claims_json)
        );
        let signature = self.mac(&message)?.finalize().into_bytes();
        let token = format!("{message}.{}", URL_SAFE_NO_PAD.encode(signature));
        Ok((token, expires_at))
    }

    /// Validates a session token and returns its claims.
    pub fn verify(&self, token: &str) -> Result<Claims, AuthError> {
        self.verify_at(token, Utc::now())
    }

    fn verify_at(&self, token: &str, now: DateTime<Utc>) -> Result<Claims, AuthError> {
        let mut parts = token.split('.');
        let (Some(header), Some(claims), Some(signature), None) =
            (parts.next(), parts.next(), parts.next(), parts.next())
        else {
            return Err(AuthError::InvalidToken);
        };

        let signature = URL_SAFE_NO_PAD.decode(signature).map_err(|_| AuthError::InvalidToken)?;
        let message = format!("{header}.{claims}");
        self.mac(&message)?
            .verify_slice(&signature)
            .map_err(|_| AuthError::InvalidToken)?;

        let claims = URL_SAFE_NO_PAD.decode(claims).map_err(|_| AuthError::InvalidToken)?;
        let claims: Claims = serde_json::from_slice(&claims).map_err(|_| AuthError::InvalidToken)?;

        if claims.exp <= now.timestamp() {
            return Err(AuthError::Expired);
        }
        Ok(claims)
    }

    fn mac(&self, message: &str) -> Result<HmacSha256, AuthError> {
        let mut mac = HmacSha256::new_from_slice(&self.secret)
            .map_err(|err| AuthError::Signing(err.to_string()))?;
        mac.update(message.as_bytes());
        Ok(mac)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use uuid::Uuid;

    fn service(secret: &str) -> AuthService {
        let supabase = SupabaseClient::new("https://example.supabase.co", "key").unwrap();
        AuthService::new(supabase, secret, 12)
    }

    fn admin() -> CurrentAdmin {
        CurrentAdmin { id: Uuid::new_v4(), email: "admin@clinic.test".into() }
    }

    #[test]
    fn issued_token_verifies() {
        let service = service("0123456789abcdef0123456789abcdef");
        let admin = admin();
        let (token, expires_at) = service.issue(&admin).unwrap();

        let claims = service.verify(&token).unwrap();
        assert_eq!(claims.sub, admin.id);
        assert_eq!(claims.email, admin.email);
        assert_eq!(claims.exp, expires_at.timestamp());
    }

    #[test]
    fn expired_token_is_rejected() {
        let service = service("0123456789abcdef0123456789abcdef");
        let (token, expires_at) = service.issue(&admin()).unwrap();

        let after_expiry = expires_at + Duration::seconds(1);
        assert!(matches!(service.verify_at(&token, after_expiry), Err(AuthError::Expired)));
        // Expiry is exclusive: a token is dead exactly at `exp`.
        assert!(matches!(service.verify_at(&token, expires_at), Err(AuthError::Expired)));
    }

    #[test]
    fn tampered_signature_is_rejected() {
        let service = service("0123456789abcdef0123456789abcdef");
        let (token, _) = service.issue(&admin()).unwrap();

        let mut forged = token[..token.len() - 2].to_string();
        forged.push_str("xx");
        assert!(matches!(service.verify(&forged), Err(AuthError::InvalidToken)));
    }

    #[test]
    fn token_signed_with_other_secret_is_rejected() {
        let issuer = service("0123456789abcdef0123456789abcdef");
        let verifier = service("ffffffffffffffffffffffffffffffff");
        let (token, _) = issuer.issue(&admin()).unwrap();
        assert!(matches!(verifier.verify(&token), Err(AuthError::InvalidToken)));
    }

    #[test]
    fn malformed_tokens_are_rejected() {
        let service = service("0123456789abcdef0123456789abcdef");
        for bad in ["", "a.b", "a.b.c.d", "not-a-token", "a.b.!!!"] {
            assert!(matches!(service.verify(bad), Err(AuthError::InvalidToken)), "{bad:?}");
        }
    }

    #[test]
    fn forged_claims_do_not_verify() {
        let service = service("0123456789abcdef0123456789abcdef");
        let (token, _) = service.issue(&admin()).unwrap();
        let parts: Vec<&str> = token.split('.').collect();

        let other = Claims {
            sub: Uuid::new_v4(),
            email: "intruder@clinic.test".into(),
            iat: 0,
            exp: i64::MAX,
        };
        let forged_claims = URL_SAFE_NO_PAD.encode(serde_json::to_vec(&other).unwrap());
        let forged = format!("{}.{forged_claims}.{}", parts[0], parts[2]);
        assert!(matches!(service.verify(&forged), Err(AuthError::InvalidToken)));
    }
}
