use std::sync::Arc;

use roomgate_core::{NotificationEvent, ServiceAccountConfig};

use crate::error::{PolicyError, PolicyResult};
use crate::identity::IdentityClassifier;
use crate::types::{Denial, RoomCreationRequest, Verdict, DEFAULT_PLATFORM_NAME};

// ---------------------------------------------------------------------------
// HandoffSink trait — where redirected DM requests go
// ---------------------------------------------------------------------------

/// Receives direct-message handoffs produced by the engine.
///
/// `submit` is called on the decision path and must return without waiting
/// for delivery. An `Err` is logged by the engine and otherwise ignored.
pub trait HandoffSink: Send + Sync {
    fn submit(&self, event: NotificationEvent) -> PolicyResult<()>;
}

/// Sink that drops every handoff. Used for offline checks.
#[derive(Debug, Default, Clone, Copy)]
pub struct DiscardHandoff;

impl HandoffSink for DiscardHandoff {
    fn submit(&self, event: NotificationEvent) -> PolicyResult<()> {
        tracing::debug!(
            inviter = %event.inviter,
            invitee = %event.invitee,
            "handoff discarded"
        );
        Ok(())
    }
}

// ---------------------------------------------------------------------------
// AccessDecisionEngine — the host's room-creation callback
// ---------------------------------------------------------------------------

/// Room-creation access decision engine.
///
/// Stateless across invocations; the only shared data is the immutable
/// service-account configuration and the handoff sink.
pub struct AccessDecisionEngine {
    service_account: Arc<ServiceAccountConfig>,
    classifier: IdentityClassifier,
    handoff: Arc<dyn HandoffSink>,
    platform_name: String,
}

impl AccessDecisionEngine {
    pub fn new(
        service_account: Arc<ServiceAccountConfig>,
        handoff: Arc<dyn HandoffSink>,
    ) -> PolicyResult<Self> {
        let classifier = IdentityClassifier::new(service_account.service_localpart.clone())?;
        Ok(Self {
            service_account,
            classifier,
            handoff,
            platform_name: DEFAULT_PLATFORM_NAME.to_string(),
        })
    }

    /// Override the platform name shown in denial messages.
    pub fn with_platform_name(mut self, platform_name: impl Into<String>) -> PolicyResult<Self> {
        let platform_name = platform_name.into();
        if platform_name.trim().is_empty() {
            return Err(PolicyError::ValidationError(
                "platform name must not be empty".to_string(),
            ));
        }
        self.platform_name = platform_name;
        Ok(self)
    }

    pub fn service_account(&self) -> &ServiceAccountConfig {
        &self.service_account
    }

    pub fn platform_name(&self) -> &str {
        &self.platform_name
    }

    /// Evaluate one room-creation attempt.
    ///
    /// Admins and the service account are allowed. A direct message with
    /// exactly one invitee is denied and handed off to the adapter. Every
    /// other shape is denied outright.
    pub fn decide(&self, request: &RoomCreationRequest) -> Verdict {
        if request.is_admin_requester || self.classifier.is_service_account(&request.requester_id)
        {
            return Verdict::Allow;
        }

        if request.is_direct && request.invite_targets.len() == 1 {
            let target = &request.invite_targets[0];
            tracing::info!(
                requester = %request.requester_id,
                target = %target,
                "direct message creation blocked"
            );

            let event = NotificationEvent::new(request.requester_id.clone(), target.clone());
            if let Err(e) = self.handoff.submit(event) {
                tracing::warn!(
                    requester = %request.requester_id,
                    target = %target,
                    error = %e,
                    "failed to hand off direct message request"
                );
            }

            return Verdict::Deny(Denial::direct_message(&self.platform_name));
        }

        tracing::info!(
            requester = %request.requester_id,
            is_direct = request.is_direct,
            invites = request.invite_targets.len(),
            "room creation blocked"
        );
        Verdict::Deny(Denial::room_creation(&self.platform_name))
    }
}
