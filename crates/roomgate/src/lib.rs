//! Roomgate Root Library
//!
//! Wires the room-creation gate together: resolves the adapter's service
//! account from the host's application-service registrations, builds the
//! notification dispatcher and decision engine, and exposes them to the
//! host through `RoomGate::on_create_room` and the HTTP adapter in `http`.
//!
//! # Architecture
//!
//! The root crate is a thin orchestrator. `initialize_gate` runs the
//! registry lookup exactly once; everything it produces is immutable and
//! shared for the life of the process. Direct-message handoffs leave the
//! request path through a `SpawningHandoff` and are delivered on their own
//! tokio tasks.

pub mod config;
pub mod error;
pub mod http;
pub mod registry;

pub use config::{DispatchConfig, HttpConfig, RootConfig};
pub use error::{RootError, RootResult};
pub use registry::{
    lookup_adapter_service, resolve_service_account, DetectedService,
    RegistrationFileRegistry, StaticRegistry,
};

use roomgate_core::{ServiceAccountConfig, ServiceAccountRegistry};
use roomgate_notify::{
    EndpointConfig, HttpTransport, NotificationDispatcher, SpawningHandoff, WebhookTransport,
};
use roomgate_policy::{
    AccessDecisionEngine, Denial, ErrorCode, RoomCreationContent, RoomCreationRequest, Verdict,
};
use std::sync::Arc;
use thiserror::Error;
use tracing::info;

// ---------------------------------------------------------------------------
// GateError — a denial as the host sees it
// ---------------------------------------------------------------------------

/// Error handed back to the host when room creation is refused.
///
/// Carries the HTTP status and Matrix error code the host should return to
/// the client along with the user-facing message.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("{errcode}: {message}")]
pub struct GateError {
    pub status: u16,
    pub errcode: ErrorCode,
    pub message: String,
}

impl GateError {
    /// Matrix standard error body.
    pub fn to_json(&self) -> serde_json::Value {
        serde_json::json!({
            "errcode": self.errcode.as_str(),
            "error": self.message,
        })
    }
}

impl From<Denial> for GateError {
    fn from(denial: Denial) -> Self {
        Self {
            status: denial.status,
            errcode: denial.errcode,
            message: denial.message,
        }
    }
}

// ---------------------------------------------------------------------------
// RoomGate — initialized gate
// ---------------------------------------------------------------------------

/// The initialized gate. Created by `initialize_gate`.
pub struct RoomGate {
    pub config: RootConfig,
    service_account: Arc<ServiceAccountConfig>,
    dispatcher: Arc<NotificationDispatcher>,
    engine: AccessDecisionEngine,
}

impl RoomGate {
    pub fn service_account(&self) -> &ServiceAccountConfig {
        &self.service_account
    }

    pub fn dispatcher(&self) -> &NotificationDispatcher {
        &self.dispatcher
    }

    pub fn engine(&self) -> &AccessDecisionEngine {
        &self.engine
    }

    pub fn decide(&self, request: &RoomCreationRequest) -> Verdict {
        self.engine.decide(request)
    }

    /// Host callback for a room-creation attempt.
    ///
    /// `Ok(())` lets the host proceed. Must be called from within a tokio
    /// runtime for direct-message handoffs to be delivered.
    pub fn on_create_room(
        &self,
        requester: &str,
        content: &RoomCreationContent,
        is_admin: bool,
    ) -> Result<(), GateError> {
        let request = RoomCreationRequest::from_content(requester, content, is_admin);
        match self.engine.decide(&request) {
            Verdict::Allow => Ok(()),
            Verdict::Deny(denial) => Err(denial.into()),
        }
    }
}

/// Initialize the gate from configuration.
///
/// Reads the registration files listed in `config` and delivers handoffs
/// over HTTP.
pub fn initialize_gate(config: RootConfig) -> RootResult<RoomGate> {
    let registry = RegistrationFileRegistry::new(config.registration_files.clone());
    let transport = HttpTransport::new(config.dispatch.request_timeout())?;
    initialize_gate_with(config, &registry, Arc::new(transport))
}

/// Initialize the gate against an explicit registry and transport.
pub fn initialize_gate_with(
    config: RootConfig,
    registry: &dyn ServiceAccountRegistry,
    transport: Arc<dyn WebhookTransport>,
) -> RootResult<RoomGate> {
    config.validate()?;

    info!(
        server_name = %config.server_name,
        registration_files = config.registration_files.len(),
        "initializing room gate"
    );

    let service_account = Arc::new(resolve_service_account(registry, &config.server_name));

    let dispatcher = Arc::new(NotificationDispatcher::new(
        EndpointConfig::from_service_account(&service_account),
        config.dispatch.retry_policy(),
        transport,
    )?);

    let handoff = Arc::new(SpawningHandoff::new(dispatcher.clone()));
    let engine = AccessDecisionEngine::new(service_account.clone(), handoff)?
        .with_platform_name(config.platform_name.clone())?;

    Ok(RoomGate {
        config,
        service_account,
        dispatcher,
        engine,
    })
}
