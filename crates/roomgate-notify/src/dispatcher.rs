//! Notification dispatcher — delivers DM handoffs to the adapter.
//!
//! One handoff is one `POST` to `<adapter>/_matrix/app/alkemio/dm-request`.
//! Failed attempts are retried with exponential backoff; after the last
//! attempt the failure is logged and reported, never raised.

use std::sync::Arc;

use roomgate_core::{NotificationEvent, ServiceAccountConfig, SharedSecret, Timestamp};
use tokio::time::Instant;

use crate::error::{NotifyError, NotifyResult};
use crate::transport::WebhookTransport;
use crate::types::{DeliveryAttempt, DeliveryOutcome, DeliveryReport, EndpointConfig, RetryPolicy};

/// Path of the adapter's DM request webhook, relative to its base URL.
pub const DM_REQUEST_PATH: &str = "/_matrix/app/alkemio/dm-request";

/// The notification dispatcher.
///
/// Immutable after construction; share it behind an `Arc`.
pub struct NotificationDispatcher {
    webhook_url: String,
    secret: Option<SharedSecret>,
    retry_policy: RetryPolicy,
    transport: Arc<dyn WebhookTransport>,
}

impl NotificationDispatcher {
    /// Create a new dispatcher for the given endpoint.
    pub fn new(
        endpoint: EndpointConfig,
        retry_policy: RetryPolicy,
        transport: Arc<dyn WebhookTransport>,
    ) -> NotifyResult<Self> {
        endpoint
            .validate()
            .map_err(|_| NotifyError::ConfigurationError)?;
        retry_policy
            .validate()
            .map_err(|_| NotifyError::ConfigurationError)?;

        let webhook_url = format!("{}{}", endpoint.base_url.trim_end_matches('/'), DM_REQUEST_PATH);
        let secret = endpoint.secret.filter(|s| !s.is_empty());
        Ok(Self {
            webhook_url,
            secret,
            retry_policy,
            transport,
        })
    }

    /// Dispatcher targeting the resolved adapter, with the default policy.
    pub fn from_service_account(
        config: &ServiceAccountConfig,
        transport: Arc<dyn WebhookTransport>,
    ) -> NotifyResult<Self> {
        Self::new(
            EndpointConfig::from_service_account(config),
            RetryPolicy::default(),
            transport,
        )
    }

    pub fn webhook_url(&self) -> &str {
        &self.webhook_url
    }

    pub fn retry_policy(&self) -> &RetryPolicy {
        &self.retry_policy
    }

    pub fn is_authenticated(&self) -> bool {
        self.secret.is_some()
    }

    /// Deliver `event`; true once any attempt gets a 2xx.
    pub async fn dispatch(&self, event: &NotificationEvent) -> bool {
        self.dispatch_with_report(event).await.delivered()
    }

    /// Deliver `event` and return the record of every attempt made.
    pub async fn dispatch_with_report(&self, event: &NotificationEvent) -> DeliveryReport {
        let body = serde_json::json!({
            "inviter": event.inviter,
            "invitee": event.invitee,
        });
        let bearer = self.secret.as_ref().map(|s| s.expose());

        let started = Instant::now();
        let mut attempts = Vec::with_capacity(self.retry_policy.max_attempts as usize);
        let mut final_outcome = DeliveryOutcome::ConnectionError;

        for attempt in 0..self.retry_policy.max_attempts {
            if attempt > 0 {
                tokio::time::sleep(self.retry_policy.delay_for_retry(attempt - 1)).await;
            }

            let attempted_at = Timestamp::now();
            let attempt_start = Instant::now();
            let result = self
                .transport
                .post_json(&self.webhook_url, &body, bearer)
                .await;

            let (outcome, http_status) = match result {
                Ok(status) if (200..300).contains(&status) => {
                    (DeliveryOutcome::Success, Some(status))
                }
                Ok(status) => (DeliveryOutcome::HttpError, Some(status)),
                Err(NotifyError::Timeout) => (DeliveryOutcome::Timeout, None),
                Err(_) => (DeliveryOutcome::ConnectionError, None),
            };

            attempts.push(DeliveryAttempt {
                attempt_number: attempt + 1,
                attempted_at,
                outcome,
                http_status,
                latency_ms: attempt_start.elapsed().as_millis() as u64,
            });
            final_outcome = outcome;

            if outcome == DeliveryOutcome::Success {
                tracing::info!(
                    inviter = %event.inviter,
                    invitee = %event.invitee,
                    attempt = attempt + 1,
                    "DM request notification sent"
                );
                break;
            }

            tracing::debug!(
                attempt = attempt + 1,
                outcome = ?outcome,
                http_status = ?http_status,
                "DM request delivery attempt failed"
            );
        }

        if final_outcome != DeliveryOutcome::Success {
            tracing::error!(
                inviter = %event.inviter,
                invitee = %event.invitee,
                attempts = attempts.len(),
                outcome = ?final_outcome,
                "failed to notify adapter about DM request"
            );
        }

        DeliveryReport {
            event: event.clone(),
            final_outcome,
            attempts,
            total_duration_ms: started.elapsed().as_millis() as u64,
        }
    }
}
