//! Central module for application-wide configuration settings.
//!
//! Configuration comes entirely from the environment. `Config::from_env`
//! is called once at startup; handlers receive the parsed result through
//! application state and never read the environment themselves.

use std::env;
use std::net::SocketAddr;

use thiserror::Error;

const DEFAULT_BIND_ADDR: &str = "127.0.0.1:8080";
const DEFAULT_SESSION_TTL_HOURS: i64 = 12;
const DEFAULT_EMAIL_FROM: &str = "no-reply@clinic.localhost";

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("missing required environment variable {0}")]
    Missing(&'static str),
    #[error("invalid value for {name}: {value}")]
    Invalid { name: &'static str, value: String },
}

#[derive(Debug, Clone)]
pub struct Config {
    pub bind_addr: SocketAddr,
    pub supabase_url: String,
    pub supabase_service_key: String,
    pub jwt_secret: String,
    pub session_ttl_hours: i64,
    /// Base URL the QR registration links point at (the admin frontend).
    pub public_base_url: String,
    /// Provider key; absent means the in-memory mailer is used.
    pub email_api_key: Option<String>,
    pub email_from: String,
    /// Origin allowed by the CORS layer; absent means same-origin only.
    pub allowed_origin: Option<String>,
}

impl Config {
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|name| env::var(name).ok())
    }

    /// Builds the config from an arbitrary lookup, so tests can supply a map.
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self, ConfigError> {
        let bind_addr = lookup("BIND_ADDR").unwrap_or_else(|| DEFAULT_BIND_ADDR.to_string());
        let bind_addr: SocketAddr = bind_addr
            .parse()
            .map_err(|_| ConfigError::Invalid { name: "BIND_ADDR", value: bind_addr.clone() })?;

        let supabase_url = require(&lookup, "SUPABASE_URL")?;
        let supabase_service_key = require(&lookup, "SUPABASE_SERVICE_KEY")?;
        let jwt_secret = require(&lookup, "JWT_SECRET")?;
        if jwt_secret.len() < 32 {
            return Err(ConfigError::Invalid {
                name: "JWT_SECRET",
                value: "(too short, need at least 32 bytes)".into(),
            });
        }

        let session_ttl_hours = match lookup("SESSION_TTL_HOURS") {
            None => DEFAULT_SESSION_TTL_HOURS,
            Some(raw) => raw
                .parse::<i64>()
                .ok()
                .filter(|ttl| (1..=168).contains(ttl))
                .ok_or(ConfigError::Invalid { name: "SESSION_TTL_HOURS", value: raw })?,
        };

        let public_base_url = lookup("PUBLIC_BASE_URL")
            .unwrap_or_else(|| supabase_url.clone())
            .trim_end_matches('/')
            .to_string();

        Ok(Config {
            bind_addr,
            supabase_url,
            supabase_service_key,
            jwt_secret,
            session_ttl_hours,
            public_base_url,
            email_api_key: lookup("EMAIL_API_KEY").filter(|key| !key.trim().is_empty()),
            email_from: lookup("EMAIL_FROM").unwrap_or_else(|| DEFAULT_EMAIL_FROM.to_string()),
            allowed_origin: lookup("ALLOWED_ORIGIN").filter(|origin| !origin.trim().is_empty()),
        })
    }
}

fn require(lookup: &impl Fn(&str) -> Option<String>, name: &'static str) -> Result<String, ConfigError> {
    lookup(name)
        .map(|value| value.trim().to_string())
        .filter(|value| !value.is_empty())
        .ok_or(ConfigError::Missing(name))
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn base_env() -> HashMap<&'static str, &'static str> {
        HashMap::from([
            ("SUPABASE_URL", "https://example.supabase.co"),
            ("SUPABASE_SERVICE_KEY", "service-key"),
            ("JWT_SECRET", "0123456789abcdef0123456789abcdef"),
        ])
    }

    fn config_from(env: &HashMap<&'static str, &'static str>) -> Result<Config, ConfigError> {
        Config::from_lookup(|name| env.get(name).map(|v| v.to_string()))
    }

    #[test]
    fn minimal_env_uses_defaults() {
        let config = config_from(&base_env()).unwrap();
        assert_eq!(config.bind_addr.port(), 8080);
        assert_eq!(config.session_ttl_hours, DEFAULT_SESSION_TTL_HOURS);
        assert_eq!(config.public_base_url, "https://example.supabase.co");
        assert!(config.email_api_key.is_none());
    }

    #[test]
    fn missing_secret_is_an_error() {
        let mut env = base_env();
        env.remove("JWT_SECRET");
        assert!(matches!(config_from(&env), Err(ConfigError::Missing("JWT_SECRET"))));
    }

    #[test]
    fn short_secret_is_rejected() {
        let mut env = base_env();
        env.insert("JWT_SECRET", "short");
        assert!(matches!(config_from(&env), Err(ConfigError::Invalid { name: "JWT_SECRET", .. })));
    }

    #[test]
    fn ttl_must_be_within_bounds() {
        let mut env = base_env();
        env.insert("SESSION_TTL_HOURS", "0");
        assert!(config_from(&env).is_err());
        env.insert("SESSION_TTL_HOURS", "24");
        assert_eq!(config_from(&env).unwrap().session_ttl_hours, 24);
    }

    #[test]
    fn public_base_url_trailing_slash_is_stripped() {
        let mut env = base_env();
        env.insert("PUBLIC_BASE_URL", "https://admin.clinic.example/");
        assert_eq!(config_from(&env).unwrap().public_base_url, "https://admin.clinic.example");
    }
}
