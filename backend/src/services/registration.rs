//! Registration token rules: issuance bounds and standing evaluation.
//!
//! A token's standing is a pure function of its row and the current time.
//! Single-use tokens die on first consumption; reusable tokens live until
//! expiry or revocation.

use chrono::{DateTime, Duration, Utc};
use serde::Serialize;

use crate::database::models::{RegistrationToken, TokenKind};
use crate::errors::ApiError;

pub const DEFAULT_TTL_MINUTES: i64 = 7 * 24 * 60;
pub const MIN_TTL_MINUTES: i64 = 5;
pub const MAX_TTL_MINUTES: i64 = 90 * 24 * 60;

/// Why a token can or cannot be used right now.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum TokenStanding {
    Usable,
    Expired,
    AlreadyUsed,
}

impl TokenStanding {
    pub fn reason(&self) -> Option<&'static str> {
        match self {
            TokenStanding::Usable => None,
            TokenStanding::Expired => Some("expired"),
            TokenStanding::AlreadyUsed => Some("already_used"),
        }
    }
}

/// Evaluates a token at `now`. Expiry wins over consumption so a revived
/// clock cannot resurrect a stale token; the boundary instant itself is
/// expired.
pub fn token_standing(token: &RegistrationToken, now: DateTime<Utc>) -> TokenStanding {
    if token.expires_at <= now {
        return TokenStanding::Expired;
    }
    if token.kind == TokenKind::SingleUse && token.used_at.is_some() {
        return TokenStanding::AlreadyUsed;
    }
    TokenStanding::Usable
}

/// Validates a requested TTL, applying the default when absent.
pub fn validate_ttl(requested: Option<i64>) -> Result<Duration, ApiError> {
    let minutes = requested.unwrap_or(DEFAULT_TTL_MINUTES);
    if !(MIN_TTL_MINUTES..=MAX_TTL_MINUTES).contains(&minutes) {
        return Err(ApiError::BadRequest(
            "VALIDATION_ERROR",
            format!("ttl_minutes must be between {MIN_TTL_MINUTES} and {MAX_TTL_MINUTES}"),
        ));
    }
    Ok(Duration::minutes(minutes))
}

/// The self-registration link encoded into the QR code shown to patients.
pub fn join_url(public_base_url: &str, token: &str) -> String {
    format!("{public_base_url}/register?token={token}")
}

#[cfg(test)]
mod tests {
    use super::*;
    use uuid::Uuid;

    fn token(kind: TokenKind, expires_in: Duration, used: bool) -> RegistrationToken {
        let now = Utc::now();
        RegistrationToken {
            id: Uuid::new_v4(),
            token: "deadbeef".into(),
            kind,
            label: None,
            expires_at: now + expires_in,
            used_at: used.then_some(now - Duration::minutes(1)),
            created_at: now - Duration::hours(1),
        }
    }

    #[test]
    fn fresh_token_is_usable() {
        let t = token(TokenKind::SingleUse, Duration::hours(1), false);
        assert_eq!(token_standing(&t, Utc::now()), TokenStanding::Usable);
    }

    #[test]
    fn expired_token_is_expired_even_when_unused() {
        let t = token(TokenKind::Reusable, Duration::hours(-1), false);
        assert_eq!(token_standing(&t, Utc::now()), TokenStanding::Expired);
    }

    #[test]
    fn expiry_boundary_instant_is_expired() {
        let t = token(TokenKind::SingleUse, Duration::zero(), false);
        assert_eq!(token_standing(&t, t.expires_at), TokenStanding::Expired);
    }

    #[test]
    fn consumed_single_use_token_is_dead() {
        let t = token(TokenKind::SingleUse, Duration::hours(1), true);
        assert_eq!(token_standing(&t, Utc::now()), TokenStanding::AlreadyUsed);
    }

    #[test]
    fn consumed_reusable_token_stays_usable() {
        let t = token(TokenKind::Reusable, Duration::hours(1), true);
        assert_eq!(token_standing(&t, Utc::now()), TokenStanding::Usable);
    }

    #[test]
    fn expired_and_used_reports_expired() {
        let t = token(TokenKind::SingleUse, Duration::hours(-1), true);
        assert_eq!(token_standing(&t, Utc::now()), TokenStanding::Expired);
    }

    #[test]
    fn ttl_bounds_are_enforced() {
        assert!(validate_ttl(Some(MIN_TTL_MINUTES - 1)).is_err());
        assert!(validate_ttl(Some(MAX_TTL_MINUTES + 1)).is_err());
        assert_eq!(validate_ttl(None).unwrap(), Duration::minutes(DEFAULT_TTL_MINUTES));
        assert_eq!(validate_ttl(Some(60)).unwrap(), Duration::minutes(60));
    }

    #[test]
    fn join_url_embeds_the_token() {
        assert_eq!(
            join_url("https://admin.clinic.example", "cafe01"),
            "https://admin.clinic.example/register?token=cafe01"
        );
    }
}
