//! Transactional email adapter.
//!
//! The `Mailer` trait is the seam between the notification service and the
//! provider. `ResendMailer` talks to the provider's REST API; `MemoryMailer`
//! records messages for tests and keyless local development.

use std::sync::Mutex;
use std::time::Duration;

use async_trait::async_trait;
use reqwest::Client;
use serde_json::json;
use tracing::info;

use crate::errors::AdapterError;
use crate::models::EmailMessage;

const SEND_TIMEOUT: Duration = Duration::from_secs(10);

#[async_trait]
pub trait Mailer: Send + Sync {
    async fn send(&self, message: &EmailMessage) -> Result<(), AdapterError>;
}

/// Mailer backed by the Resend HTTP API.
#[derive(Debug)]
pub struct ResendMailer {
    http: Client,
    api_base: String,
    api_key: String,
    from: String,
}

impl ResendMailer {
    pub fn new(api_key: &str, from: &str) -> Result<Self, AdapterError> {
        Self::with_api_base("https://api.resend.com", api_key, from)
    }

    pub fn with_api_base(api_base: &str, api_key: &str, from: &str) -> Result<Self, AdapterError> {
        if api_key.trim().is_empty() {
            return Err(AdapterError::Configuration("email api key is empty".into()));
        }
        if !from.contains('@') {
            return Err(AdapterError::Configuration(format!(
                "sender address is not an email: {from}"
            )));
        }
        let http = Client::builder()
            .timeout(SEND_TIMEOUT)
            .build()
            .map_err(|err| AdapterError::Configuration(err.to_string()))?;
        Ok(Self {
            http,
            api_base: api_base.trim_end_matches('/').to_string(),
            api_key: api_key.to_string(),
            from: from.to_string(),
        })
    }
}

#[async_trait]
impl Mailer for ResendMailer {
    async fn send(&self, message: &EmailMessage) -> Result<(), AdapterError> {
        let response = self
            .http
            .post(format!("{}/emails", self.api_base))
            .bearer_auth(&self.api_key)
            .json(&json!({
                "from": self.from,
                "to": [message.to],
                "subject": message.subject,
                "text": message.text,
            }))
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(AdapterError::Status { code: status.as_u16(), body });
        }
        info!(to = %message.to, subject = %message.subject, "email sent");
        Ok(())
    }
}

/// In-memory mailer that records every message instead of sending it.
///
/// Used by the backend when no provider key is configured, and by tests to
/// assert on outbound traffic. `fail_next` makes the next send report a
/// provider failure.
#[derive(Default)]
pub struct MemoryMailer {
    sent: Mutex<Vec<EmailMessage>>,
    fail_next: Mutex<bool>,
}

impl MemoryMailer {
    pub fn sent(&self) -> Vec<EmailMessage> {
        self.sent.lock().expect("mailer lock").clone()
    }

    pub fn fail_next(&self) {
        *self.fail_next.lock().expect("mailer lock") = true;
    }
}

#[async_trait]
impl Mailer for MemoryMailer {
    async fn send(&self, message: &EmailMessage) -> Result<(), AdapterError> {
        let mut fail = self.fail_next.lock().expect("mailer lock");
        if *fail {
            *fail = false;
            return Err(AdapterError::Status { code: 500, body: "simulated failure".into() });
        }
        drop(fail);
        info!(to = %message.to, subject = %message.subject, "email recorded (memory mailer)");
        self.sent.lock().expect("mailer lock").push(message.clone());
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn message() -> EmailMessage {
        EmailMessage {
            to: "patient@clinic.test".into(),
            subject: "Appointment reminder".into(),
            text: "See you tomorrow.".into(),
        }
    }

    #[tokio::test]
    async fn memory_mailer_records_messages() {
        let mailer = MemoryMailer::default();
        mailer.send(&message()).await.unwrap();
        let sent = mailer.sent();
        assert_eq!(sent.len(), 1);
        assert_eq!(sent[0].to, "patient@clinic.test");
    }

    #[tokio::test]
    async fn memory_mailer_fail_next_fails_once() {
        let mailer = MemoryMailer::default();
        mailer.fail_next();
        assert!(mailer.send(&message()).await.is_err());
        assert!(mailer.send(&message()).await.is_ok());
        assert_eq!(mailer.sent().len(), 1);
    }

    #[test]
    fn resend_mailer_rejects_bad_sender() {
        let err = ResendMailer::new("key", "not-an-address").unwrap_err();
        assert!(matches!(err, AdapterError::Configuration(_)));
    }
}
