//! HTTP client implementing the create-then-update tracking protocol.

use std::time::Duration;

use async_trait::async_trait;
use serde::{Deserialize, Serialize};

use crate::status::TrackingStatus;

/// HTTP request timeout for a single tracking call. Each call is attempted
/// exactly once; there is no retry.
const REQUEST_TIMEOUT: Duration = Duration::from_secs(10);

/// Longest message forwarded in an update before truncation.
const MAX_MESSAGE_CHARS: usize = 1024;

/// Marker appended to a truncated message.
const TRUNCATION_MARKER: &str = "... [truncated]";

/// Errors from the tracking service client.
#[derive(Debug, thiserror::Error)]
pub enum TrackingError {
    /// The HTTP request itself failed (network, DNS, timeout, etc.).
    #[error("HTTP request failed: {0}")]
    Request(#[from] reqwest::Error),

    /// The tracking service returned a non-2xx status code.
    #[error("Tracking service returned HTTP {status}: {body}")]
    HttpStatus {
        /// HTTP status code.
        status: u16,
        /// Raw response body for debugging.
        body: String,
    },

    /// A success response arrived without a usable numeric identifier.
    #[error("Tracking service response is missing a nonzero processId")]
    MissingProcessId,
}

/// Side channel correlating an execution with an external lifecycle record.
#[async_trait]
pub trait Tracker: Send + Sync {
    /// Create the tracking record for one execution.
    ///
    /// Returns `Ok(None)` without any call when tracking is unconfigured,
    /// `Ok(Some(id))` with the service-assigned numeric identifier, or an
    /// error when no identifier could be obtained. A failed creation must
    /// never be followed by an update attempt.
    async fn create(
        &self,
        name: &str,
        correlation_id: &str,
        stage: &str,
        group: &str,
    ) -> Result<Option<i64>, TrackingError>;

    /// Report a status transition for the record `process_id`.
    ///
    /// Silent no-op when tracking is unconfigured or `process_id` is
    /// absent. Failures are logged, never returned.
    async fn update(
        &self,
        process_id: Option<i64>,
        status: TrackingStatus,
        message: Option<&str>,
    );
}

#[derive(Debug, Serialize)]
struct CreatePayload<'a> {
    name: &'a str,
    stage: &'a str,
    group: &'a str,
    label: &'a str,
    #[serde(rename = "trackingId")]
    tracking_id: &'a str,
}

#[derive(Debug, Deserialize)]
struct CreateResponse {
    #[serde(rename = "processId", default)]
    process_id: i64,
}

#[derive(Debug, Serialize)]
struct UpdatePayload<'a> {
    status: &'a str,
    #[serde(rename = "messageLevel")]
    message_level: &'a str,
    #[serde(skip_serializing_if = "Option::is_none")]
    message: Option<String>,
}

/// [`Tracker`] backed by the tracking service's HTTP API.
///
/// Constructed with `None` as base URL when tracking is unconfigured, in
/// which case every operation is a no-op.
pub struct TrackingClient {
    client: reqwest::Client,
    base_url: Option<String>,
}

impl TrackingClient {
    /// Create a client for `base_url`, or a disabled client when `None`.
    pub fn new(base_url: Option<String>) -> Self {
        let client = reqwest::Client::builder()
            .timeout(REQUEST_TIMEOUT)
            .build()
            .expect("Failed to build reqwest HTTP client");
        Self { client, base_url }
    }
}

#[async_trait]
impl Tracker for TrackingClient {
    async fn create(
        &self,
        name: &str,
        correlation_id: &str,
        stage: &str,
        group: &str,
    ) -> Result<Option<i64>, TrackingError> {
        let Some(base_url) = &self.base_url else {
            tracing::debug!(correlation_id, "Tracking unconfigured, skipping record creation");
            return Ok(None);
        };

        let payload = CreatePayload {
            name,
            stage,
            group,
            label: name,
            tracking_id: correlation_id,
        };

        let response = self.client.post(base_url).json(&payload).send().await?;

        let status = response.status();
        if !status.is_success() {
            let body = response
                .text()
                .await
                .unwrap_or_else(|_| "<unreadable body>".to_string());
            return Err(TrackingError::HttpStatus {
                status: status.as_u16(),
                body,
            });
        }

        let created: CreateResponse = response.json().await?;
        if created.process_id == 0 {
            return Err(TrackingError::MissingProcessId);
        }

        tracing::info!(
            correlation_id,
            process_id = created.process_id,
            "Created tracking record"
        );
        Ok(Some(created.process_id))
    }

    async fn update(
        &self,
        process_id: Option<i64>,
        status: TrackingStatus,
        message: Option<&str>,
    ) {
        let (Some(base_url), Some(process_id)) = (&self.base_url, process_id) else {
            tracing::debug!("Tracking unconfigured or record absent, skipping update");
            return;
        };

        let payload = UpdatePayload {
            status: status.as_str(),
            message_level: status.level(),
            message: message.map(truncate_message),
        };
        let url = update_url(base_url, process_id);

        match self.client.post(&url).json(&payload).send().await {
            Ok(response) if response.status().is_success() => {
                tracing::info!(process_id, status = %status, "Tracking update sent");
            }
            Ok(response) => {
                let code = response.status().as_u16();
                let body = response.text().await.unwrap_or_default();
                tracing::warn!(process_id, code, body = %body, "Tracking update rejected");
            }
            Err(e) => {
                tracing::warn!(process_id, error = %e, "Tracking update failed");
            }
        }
    }
}

/// Update endpoint: the numeric id appended to the creation endpoint.
fn update_url(base_url: &str, process_id: i64) -> String {
    format!("{}/{process_id}", base_url.trim_end_matches('/'))
}

/// Bound `message` to [`MAX_MESSAGE_CHARS`], appending a marker when cut.
fn truncate_message(message: &str) -> String {
    if message.chars().count() <= MAX_MESSAGE_CHARS {
        return message.to_string();
    }
    let head: String = message.chars().take(MAX_MESSAGE_CHARS).collect();
    format!("{head}{TRUNCATION_MARKER}")
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
