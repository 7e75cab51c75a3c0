//! Supabase adapter: PostgREST data access and GoTrue password sign-in.
//!
//! All database reads and writes go through the platform's `/rest/v1`
//! interface; the backend never opens a SQL connection. The client carries
//! the service key, so row-level security applies to anonymous traffic only
//! and the backend acts as the trusted party.

use std::time::Duration;

use reqwest::header::{HeaderMap, HeaderValue, AUTHORIZATION};
use reqwest::{Client, Method};
use serde::de::DeserializeOwned;
use serde_json::{json, Value};
use tracing::debug;

use crate::errors::AdapterError;
use crate::models::AuthSession;

const CONNECT_TIMEOUT: Duration = Duration::from_secs(5);
const REQUEST_TIMEOUT: Duration = Duration::from_secs(15);

/// Thin client over the hosted platform's REST interfaces.
///
/// Cloning is cheap: the underlying `reqwest::Client` is a handle to a
/// shared connection pool.
#[derive(Debug, Clone)]
pub struct SupabaseClient {
    http: Client,
    base_url: String,
    service_key: String,
}

impl SupabaseClient {
    pub fn new(base_url: &str, service_key: &str) -> Result<Self, AdapterError> {
        if service_key.trim().is_empty() {
            return Err(AdapterError::Configuration("service key is empty".into()));
        }
        let base_url = base_url.trim_end_matches('/');
        if !base_url.starts_with("http://") && !base_url.starts_with("https://") {
            return Err(AdapterError::Configuration(format!(
                "base url must be http(s): {base_url}"
            )));
        }

        let http = Client::builder()
            .connect_timeout(CONNECT_TIMEOUT)
            .timeout(REQUEST_TIMEOUT)
            .build()
            .map_err(|err| AdapterError::Configuration(err.to_string()))?;

        Ok(Self {
            http,
            base_url: base_url.to_string(),
            service_key: service_key.to_string(),
        })
    }

    /// Rows matching the PostgREST filter pairs, e.g. `("status", "eq.pending")`.
    pub async fn select<T: DeserializeOwned>(
        &self,
        table: &str,
        query: &[(&str, String)],
    ) -> Result<Vec<T>, AdapterError> {
        self.rest(Method::GET, table, query, None, None).await
    }

    /// Inserts one row and returns the stored representation.
    pub async fn insert<T: DeserializeOwned>(
        &self,
        table: &str,
        row: &Value,
    ) -> Result<T, AdapterError> {
        let mut rows: Vec<T> = self
            .rest(Method::POST, table, &[], Some(row), Some("return=representation"))
            .await?;
        if rows.is_empty() {
            return Err(AdapterError::Decode(format!(
                "insert into {table} returned no representation"
            )));
        }
        Ok(rows.remove(0))
    }

    /// Patches all rows matching the filter and returns the updated rows.
    ///
    /// An empty result is not an error here: conditional updates (e.g.
    /// `used_at=is.null`) use it to detect that the precondition no longer
    /// held.
    pub async fn update<T: DeserializeOwned>(
        &self,
        table: &str,
        query: &[(&str, String)],
        patch: &Value,
    ) -> Result<Vec<T>, AdapterError> {
        self.rest(Method::PATCH, table, query, Some(patch), Some("return=representation"))
            .await
    }

    /// Deletes all rows matching the filter.
    pub async fn delete(&self, table: &str, query: &[(&str, String)]) -> Result<(), AdapterError> {
        let url = format!("{}/rest/v1/{table}", self.base_url);
        let response = self
            .http
            .delete(&url)
            .headers(self.rest_headers(None))
            .query(query)
            .send()
            .await?;
        Self::expect_success(response).await?;
        Ok(())
    }

    /// Verifies admin credentials against the platform's auth service.
    pub async fn sign_in_with_password(
        &self,
        email: &str,
        password: &str,
    ) -> Result<AuthSession, AdapterError> {
        let url = format!("{}/auth/v1/token", self.base_url);
        let response = self
            .http
            .post(&url)
            .headers(self.rest_headers(None))
            .query(&[("grant_type", "password")])
            .json(&json!({ "email": email, "password": password }))
            .send()
            .await?;
        let response = Self::expect_success(response).await?;
        let session = response.json::<AuthSession>().await.map_err(decode_err)?;
        Ok(session)
    }

    async fn rest<T: DeserializeOwned>(
        &self,
        method: Method,
        table: &str,
        query: &[(&str, String)],
        body: Option<&Value>,
        prefer: Option<&'static str>,
    ) -> Result<T, AdapterError> {
        let url = format!("{}/rest/v1/{table}", self.base_url);
        debug!(%method, table, "supabase request");

        let mut request = self
            .http
            .request(method, &url)
            .headers(self.rest_headers(prefer))
            .query(query);
        if let Some(body) = body {
            request = request.json(body);
        }

        let response = request.send().await?;
        let response = Self::expect_success(response).await?;
        response.json::<T>().await.map_err(decode_err)
    }

    fn rest_headers(&self, prefer: Option<&'static str>) -> HeaderMap {
        let mut headers = HeaderMap::new();
        // Both headers carry the service key; GoTrue reads `apikey`, PostgREST
        // reads the bearer token.
        if let Ok(value) = HeaderValue::from_str(&self.service_key) {
            headers.insert("apikey", value);
        }
        if let Ok(value) = HeaderValue::from_str(&format!("Bearer {}", self.service_key)) {
            headers.insert(AUTHORIZATION, value);
        }
        if let Some(prefer) = prefer {
            headers.insert("Prefer", HeaderValue::from_static(prefer));
        }
        headers
    }

    async fn expect_success(response: reqwest::Response) -> Result<reqwest::Response, AdapterError> {
        let status = response.status();
        if status.is_success() {
            return Ok(response);
        }
        let body = response.text().await.unwrap_or_default();
        Err(AdapterError::Status { code: status.as_u16(), body: truncate(&body) })
    }
}

fn decode_err(err: reqwest::Error) -> AdapterError {
    AdapterError::Decode(err.to_string())
}

// Upstream error bodies can embed whole statements; keep logs bounded.
fn truncate(body: &str) -> String {
    const MAX: usize = 512;
    if body.len() <= MAX {
        body.to_string()
    } else {
        let mut end = MAX;
        while !body.is_char_boundary(end) {
            end -= 1;
        }
        format!("{}…", &body[..end])
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn rejects_empty_service_key() {
        let err = SupabaseClient::new("https://example.supabase.co", "  ").unwrap_err();
        assert!(matches!(err, AdapterError::Configuration(_)));
    }

    #[test]
    fn rejects_non_http_base_url() {
        let err = SupabaseClient::new("ftp://example", "key").unwrap_err();
        assert!(matches!(err, AdapterError::Configuration(_)));
    }

    #[test]
    fn strips_trailing_slash_from_base_url() {
        let client = SupabaseClient::new("https://example.supabase.co/", "key").unwrap();
        assert_eq!(client.base_url, "https://example.supabase.co");
    }

    #[test]
    fn truncate_keeps_short_bodies_intact() {
        assert_eq!(truncate("short"), "short");
        let long = "x".repeat(600);
        assert_eq!(truncate(&long).chars().count(), 513);
    }
}
