//! Small shared helpers: token material and serde adapters.

use uuid::Uuid;

/// 32-character lowercase hex token, 128 bits of randomness.
///
/// Used as the opaque value embedded in QR registration links.
pub fn new_opaque_token() -> String {
    hex::encode(Uuid::new_v4().into_bytes())
}

/// Deserializes an optional string, trimming whitespace and mapping empty
/// input to `None`. Web forms routinely submit `""` for untouched fields.
pub mod serde_trimmed_opt {
    use serde::{Deserialize, Deserializer};

    pub fn deserialize<'de, D>(deserializer: D) -> Result<Option<String>, D::Error>
    where
        D: Deserializer<'de>,
    {
        let value = Option::<String>::deserialize(deserializer)?;
        Ok(value.and_then(|s| {
            let trimmed = s.trim();
            if trimmed.is_empty() {
                None
            } else {
                Some(trimmed.to_string())
            }
        }))
    }
}

/// Minimal syntactic email check: one `@` with non-empty local part and a
/// dotted domain. Full validation is the mail provider's job.
pub fn looks_like_email(value: &str) -> bool {
    let Some((local, domain)) = value.split_once('@') else {
        return false;
    };
    if local.is_empty() || domain.len() < 3 || value.contains(char::is_whitespace) {
        return false;
    }
    match domain.rsplit_once('.') {
        Some((host, tld)) => !host.is_empty() && tld.len() >= 2,
        None => false,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde::Deserialize;

    #[derive(Deserialize)]
    struct Form {
        #[serde(default, with = "serde_trimmed_opt")]
        note: Option<String>,
    }

    #[test]
    fn opaque_tokens_are_hex_and_unique() {
        let a = new_opaque_token();
        let b = new_opaque_token();
        assert_eq!(a.len(), 32);
        assert!(a.chars().all(|c| c.is_ascii_hexdigit()));
        assert_ne!(a, b);
    }

    #[test]
    fn trimmed_opt_scrubs_empty_strings() {
        let form: Form = serde_json::from_str(r#"{"note": "  "}"#).unwrap();
        assert_eq!(form.note, None);
        let form: Form = serde_json::from_str(r#"{"note": " keep "}"#).unwrap();
        assert_eq!(form.note.as_deref(), Some("keep"));
        let form: Form = serde_json::from_str(r#"{}"#).unwrap();
        assert_eq!(form.note, None);
    }

    #[test]
    fn email_check_accepts_plausible_addresses() {
        assert!(looks_like_email("ada@clinic.example"));
        assert!(looks_like_email("a.b+c@sub.clinic.example"));
    }

    #[test]
    fn email_check_rejects_malformed_addresses() {
        for bad in ["", "no-at", "@clinic.example", "x@", "x@nodot", "a b@c.de", "x@.io"] {
            assert!(!looks_like_email(bad), "{bad:?} should be rejected");
        }
    }
}
