//! # Email Transport Port
//!
//! Production: `EmailLabsTransport` (form-encoded HTTP API, basic auth).
//! Testing: `RecordingTransport` (in-memory, optional scripted failures).

use async_trait::async_trait;
use parking_lot::Mutex;
use reqwest::Client;
use std::sync::atomic::{AtomicU32, Ordering};
use std::time::{SystemTime, UNIX_EPOCH};
use thiserror::Error;

use crate::config::EmailConfig;
use crate::message::EmailMessage;

/// Errors that can occur when handing a message to the provider.
#[derive(Debug, Error)]
pub enum TransportError {
    /// HTTP client could not be built or the request failed.
    #[error("HTTP request failed: {0}")]
    Http(#[from] reqwest::Error),
    /// Provider answered with a non-success status.
    #[error("Provider rejected message to {to}: status {status}")]
    Rejected {
        /// Recipient.
        to: String,
        /// HTTP status code.
        status: u16,
    },
    /// Transport refused the message locally.
    #[error("Transport unavailable: {0}")]
    Unavailable(String),
}

/// Outbound email port.
#[async_trait]
pub trait EmailTransport: Send + Sync {
    /// Deliver one message.
    async fn send(&self, message: &EmailMessage) -> Result<(), TransportError>;
}

// =============================================================================
// HTTP ADAPTER
// =============================================================================

/// EmailLabs-style HTTP API client.
pub struct EmailLabsTransport {
    client: Client,
    config: EmailConfig,
}

impl EmailLabsTransport {
    /// Create a client for `config`.
    pub fn new(config: EmailConfig) -> Result<Self, TransportError> {
        let client = Client::builder()
            .timeout(config.timeout())
            .build()
            .map_err(TransportError::Http)?;
        Ok(Self { client, config })
    }

    /// Form fields of the send call.
    fn form_fields(&self, message: &EmailMessage, message_id: u128) -> Vec<(String, String)> {
        vec![
            ("smtp_account".to_string(), self.config.smtp_account.clone()),
            ("subject".to_string(), message.subject.clone()),
            ("text".to_string(), message.body.clone()),
            ("from".to_string(), self.config.from.clone()),
            (
                format!("to[{}][reciver_name]", message.to),
                message.to.clone(),
            ),
            (
                format!("to[{}][message_id]", message.to),
                message_id.to_string(),
            ),
        ]
    }
}

#[async_trait]
impl EmailTransport for EmailLabsTransport {
    async fn send(&self, message: &EmailMessage) -> Result<(), TransportError> {
        let message_id = SystemTime::now()
            .duration_since(UNIX_EPOCH)
            .map(|d| d.as_millis())
            .unwrap_or_default();

        let response = self
            .client
            .post(&self.config.api_url)
            .basic_auth(&self.config.api_key, Some(&self.config.api_secret))
            .form(&self.form_fields(message, message_id))
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            return Err(TransportError::Rejected {
                to: message.to.clone(),
                status: status.as_u16(),
            });
        }
        Ok(())
    }
}

// =============================================================================
// RECORDING ADAPTER
// =============================================================================

/// In-memory transport that records every delivered message.
#[derive(Default)]
pub struct RecordingTransport {
    sent: Mutex<Vec<EmailMessage>>,
    failures_left: AtomicU32,
    attempts: AtomicU32,
}

impl RecordingTransport {
    /// Transport that always succeeds.
    pub fn new() -> Self {
        Self::default()
    }

    /// Transport whose first `failures` calls fail.
    pub fn failing(failures: u32) -> Self {
        Self {
            failures_left: AtomicU32::new(failures),
            ..Self::default()
        }
    }

    /// Messages delivered so far.
    pub fn sent(&self) -> Vec<EmailMessage> {
        self.sent.lock().clone()
    }

    /// Calls made so far, failed ones included.
    pub fn attempts(&self) -> u32 {
        self.attempts.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl EmailTransport for RecordingTransport {
    async fn send(&self, message: &EmailMessage) -> Result<(), TransportError> {
        self.attempts.fetch_add(1, Ordering::SeqCst);
        let failing = self
            .failures_left
            .fetch_update(Ordering::SeqCst, Ordering::SeqCst, |n| n.checked_sub(1))
            .is_ok();
        if failing {
            return Err(TransportError::Unavailable(format!(
                "scripted failure for {}",
                message.to
            )));
        }
        self.sent.lock().push(message.clone());
        Ok(())
    }
}
