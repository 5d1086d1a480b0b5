//! Webhook delivery for fired alerts.
//!
//! [`WebhookDelivery`] POSTs a fixed JSON body to a rule's webhook URL.
//! Exactly one attempt is made per notification, bounded by a 10 second
//! timeout. Only the response status is inspected; the body is ignored.

use std::time::Duration;

use chrono::SecondsFormat;
use lightwatch_core::alerting::status::EventStatus;
use lightwatch_core::types::DbId;
use lightwatch_db::models::alert_event::CreateAlertEvent;
use serde::Serialize;

/// HTTP request timeout for a single delivery attempt.
pub const REQUEST_TIMEOUT: Duration = Duration::from_secs(10);

// ---------------------------------------------------------------------------
// Error
// ---------------------------------------------------------------------------

/// Error type for webhook delivery failures.
#[derive(Debug, thiserror::Error)]
pub enum WebhookError {
    /// The underlying HTTP request failed (network, DNS, timeout, etc.).
    #[error("HTTP request failed: {0}")]
    Request(#[from] reqwest::Error),

    /// The remote server returned a non-2xx status code.
    #[error("Webhook returned HTTP {0}")]
    HttpStatus(u16),
}

// ---------------------------------------------------------------------------
// Payload
// ---------------------------------------------------------------------------

/// The JSON body sent to webhook endpoints.
///
/// The field set is a published contract; receivers parse it literally.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct WebhookPayload {
    pub alert_name: String,
    pub service: String,
    pub value: f64,
    pub threshold: f64,
    pub status: EventStatus,
    /// RFC 3339, second precision, UTC (`2025-03-01T12:00:00Z`).
    pub triggered_at: String,
}

impl From<&CreateAlertEvent> for WebhookPayload {
    fn from(event: &CreateAlertEvent) -> Self {
        Self {
            alert_name: event.rule_name.clone(),
            service: event.service.clone(),
            value: event.value,
            threshold: event.threshold,
            status: event.status,
            triggered_at: event
                .triggered_at
                .to_rfc3339_opts(SecondsFormat::Secs, true),
        }
    }
}

/// A payload addressed to one endpoint.
#[derive(Debug, Clone)]
pub struct WebhookNotification {
    /// Rule that fired, for log context.
    pub rule_id: DbId,
    /// Persisted event this notification announces.
    pub event_id: DbId,
    pub url: String,
    pub payload: WebhookPayload,
}

// ---------------------------------------------------------------------------
// WebhookDelivery
// ---------------------------------------------------------------------------

/// Delivers alert notifications to external webhook endpoints.
#[derive(Debug, Clone)]
pub struct WebhookDelivery {
    client: reqwest::Client,
}

impl WebhookDelivery {
    /// Create a delivery service with the standard 10 second timeout.
    pub fn new() -> Result<Self, WebhookError> {
        Self::with_timeout(REQUEST_TIMEOUT)
    }

    /// Create a delivery service whose requests give up after `timeout`.
    pub fn with_timeout(timeout: Duration) -> Result<Self, WebhookError> {
        let client = reqwest::Client::builder().timeout(timeout).build()?;
        Ok(Self { client })
    }

    /// Deliver a notification with a single POST.
    ///
    /// Returns the response status code on 2xx. The outcome is logged
    /// here; callers only need the result for bookkeeping.
    pub async fn deliver(&self, notification: &WebhookNotification) -> Result<u16, WebhookError> {
        match self.try_send(&notification.url, &notification.payload).await {
            Ok(status) => {
                tracing::info!(
                    url = %notification.url,
                    status,
                    rule_id = notification.rule_id,
                    event_id = notification.event_id,
                    "Webhook delivered"
                );
                Ok(status)
            }
            Err(e) => {
                tracing::error!(
                    url = %notification.url,
                    rule_id = notification.rule_id,
                    event_id = notification.event_id,
                    error = %e,
                    "Webhook delivery failed"
                );
                Err(e)
            }
        }
    }

    /// Execute a single POST request and check the response status.
    async fn try_send(&self, url: &str, payload: &WebhookPayload) -> Result<u16, WebhookError> {
        // `.json()` sets `Content-Type: application/json`.
        let response = self.client.post(url).json(payload).send().await?;
        let status = response.status();
        if !status.is_success() {
            return Err(WebhookError::HttpStatus(status.as_u16()));
        }
        Ok(status.as_u16())
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
