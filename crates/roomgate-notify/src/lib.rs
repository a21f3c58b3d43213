//! Roomgate Notification Channel
//!
//! Best-effort webhook delivery of direct-message handoffs to the adapter
//! service. A handoff is a single JSON `POST` carrying the inviter and the
//! invitee; the adapter then asks the platform to create the room through
//! the service account.
//!
//! Key features:
//! - Bounded retries with exponential backoff (1s, 2s) between attempts
//! - Optional bearer authentication with the shared registry token
//! - Never raises: callers get a `bool` or a `DeliveryReport`
//! - Pluggable `WebhookTransport`; `HttpTransport` wraps one reqwest client
//! - `SpawningHandoff` runs each delivery as its own tokio task so the
//!   decision path never waits on the network

pub mod dispatcher;
pub mod error;
pub mod handoff;
pub mod transport;
pub mod types;

pub use dispatcher::{NotificationDispatcher, DM_REQUEST_PATH};
pub use error::{NotifyError, NotifyResult};
pub use handoff::SpawningHandoff;
pub use transport::{HttpTransport, WebhookTransport};
pub use types::{DeliveryAttempt, DeliveryOutcome, DeliveryReport, EndpointConfig, RetryPolicy};
