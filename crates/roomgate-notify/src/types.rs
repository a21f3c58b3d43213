use roomgate_core::{NotificationEvent, ServiceAccountConfig, SharedSecret, Timestamp};
use serde::{Deserialize, Serialize};
use std::time::Duration;

// ---------------------------------------------------------------------------
// EndpointConfig — adapter webhook endpoint
// ---------------------------------------------------------------------------

#[derive(Debug, Clone)]
pub struct EndpointConfig {
    /// Adapter base URL; the handoff path is appended to it.
    pub base_url: String,
    /// Bearer token; `None` sends the request unauthenticated.
    pub secret: Option<SharedSecret>,
}

impl EndpointConfig {
    pub fn from_service_account(config: &ServiceAccountConfig) -> Self {
        Self {
            base_url: config.adapter_endpoint.clone(),
            secret: config.shared_secret.clone(),
        }
    }

    pub fn validate(&self) -> Result<(), &'static str> {
        if !(self.base_url.starts_with("http://") || self.base_url.starts_with("https://")) {
            return Err("Adapter endpoint must be an http or https URL");
        }
        if self.base_url.len() < 8 || self.base_url.len() > 2048 {
            return Err("Adapter endpoint must be between 8 and 2048 characters");
        }
        Ok(())
    }
}

// ---------------------------------------------------------------------------
// RetryPolicy — exponential backoff configuration
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RetryPolicy {
    pub max_attempts: u32,
    pub initial_delay_seconds: u64,
    pub backoff_factor: u32,
}

impl RetryPolicy {
    pub fn validate(&self) -> Result<(), &'static str> {
        if !(1..=10).contains(&self.max_attempts) {
            return Err("Max attempts must be between 1 and 10");
        }
        if !(1..=10).contains(&self.backoff_factor) {
            return Err("Backoff factor must be between 1 and 10");
        }
        Ok(())
    }

    /// Delay before retry number `retry` (0-indexed, so the wait before the
    /// second attempt is `delay_for_retry(0)`).
    pub fn delay_for_retry(&self, retry: u32) -> Duration {
        let factor = u64::from(self.backoff_factor).saturating_pow(retry);
        Duration::from_secs(self.initial_delay_seconds.saturating_mul(factor))
    }
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self {
            max_attempts: 3,
            initial_delay_seconds: 1,
            backoff_factor: 2,
        }
    }
}

// ---------------------------------------------------------------------------
// DeliveryOutcome — outcome of a webhook delivery attempt
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum DeliveryOutcome {
    Success,
    HttpError,
    Timeout,
    ConnectionError,
}

// ---------------------------------------------------------------------------
// DeliveryAttempt — record of a single delivery attempt
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DeliveryAttempt {
    pub attempt_number: u32,
    pub attempted_at: Timestamp,
    pub outcome: DeliveryOutcome,
    pub http_status: Option<u16>,
    pub latency_ms: u64,
}

// ---------------------------------------------------------------------------
// DeliveryReport — full report aggregating all attempts
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DeliveryReport {
    pub event: NotificationEvent,
    pub final_outcome: DeliveryOutcome,
    pub attempts: Vec<DeliveryAttempt>,
    pub total_duration_ms: u64,
}

impl DeliveryReport {
    pub fn delivered(&self) -> bool {
        self.final_outcome == DeliveryOutcome::Success
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_retry_policy_default() {
        let policy = RetryPolicy::default();
        assert!(policy.validate().is_ok());
        assert_eq!(policy.max_attempts, 3);
        assert_eq!(policy.initial_delay_seconds, 1);
    }

    #[test]
    fn test_retry_policy_delay_calculation() {
        let policy = RetryPolicy::default();
        assert_eq!(policy.delay_for_retry(0), Duration::from_secs(1));
        assert_eq!(policy.delay_for_retry(1), Duration::from_secs(2));
        assert_eq!(policy.delay_for_retry(2), Duration::from_secs(4));
    }

    #[test]
    fn test_retry_policy_validation() {
        let mut policy = RetryPolicy::default();
        policy.max_attempts = 0;
        assert!(policy.validate().is_err());

        let mut policy = RetryPolicy::default();
        policy.backoff_factor = 11;
        assert!(policy.validate().is_err());
    }

    #[test]
    fn test_endpoint_validation() {
        let endpoint = EndpointConfig {
            base_url: "http://localhost:8080".into(),
            secret: None,
        };
        assert!(endpoint.validate().is_ok());

        let endpoint = EndpointConfig {
            base_url: "localhost:8080".into(),
            secret: None,
        };
        assert!(endpoint.validate().is_err());
    }

    #[test]
    fn test_endpoint_from_service_account() {
        let mut config = ServiceAccountConfig::fallback("example.org");
        config.shared_secret = Some(SharedSecret::new("hs"));
        let endpoint = EndpointConfig::from_service_account(&config);
        assert_eq!(endpoint.base_url, "http://localhost:8080");
        assert_eq!(endpoint.secret.unwrap().expose(), "hs");
    }
}
