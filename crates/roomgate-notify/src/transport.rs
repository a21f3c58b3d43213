//! Outbound HTTP transport for webhook delivery.

use async_trait::async_trait;
use std::time::Duration;

use crate::error::{NotifyError, NotifyResult};

/// Performs one JSON `POST`.
///
/// Returns the response status for any response that arrived, including
/// non-2xx ones; only transport-level failures are errors.
#[async_trait]
pub trait WebhookTransport: Send + Sync {
    async fn post_json(
        &self,
        url: &str,
        body: &serde_json::Value,
        bearer: Option<&str>,
    ) -> NotifyResult<u16>;
}

/// reqwest-backed transport. Built once and shared by every delivery.
#[derive(Debug, Clone)]
pub struct HttpTransport {
    client: reqwest::Client,
}

impl HttpTransport {
    pub fn new(timeout: Duration) -> NotifyResult<Self> {
        let client = reqwest::Client::builder()
            .timeout(timeout)
            .build()
            .map_err(|_| NotifyError::ConfigurationError)?;
        Ok(Self { client })
    }
}

#[async_trait]
impl WebhookTransport for HttpTransport {
    async fn post_json(
        &self,
        url: &str,
        body: &serde_json::Value,
        bearer: Option<&str>,
    ) -> NotifyResult<u16> {
        let mut request = self.client.post(url).json(body);
        if let Some(token) = bearer {
            request = request.bearer_auth(token);
        }

        match request.send().await {
            Ok(response) => Ok(response.status().as_u16()),
            Err(e) if e.is_timeout() => Err(NotifyError::Timeout),
            Err(e) => {
                tracing::debug!(error = %e, "webhook transport error");
                Err(NotifyError::ConnectionError)
            }
        }
    }
}
