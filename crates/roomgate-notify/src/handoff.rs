//! Fire-and-forget bridge between the decision engine and the dispatcher.

use std::sync::Arc;

use roomgate_core::NotificationEvent;
use roomgate_policy::{HandoffSink, PolicyError, PolicyResult};
use tokio::runtime::Handle;
use tokio::task::JoinHandle;

use crate::dispatcher::NotificationDispatcher;

/// Runs every handoff as an independent tokio task.
///
/// The task owns its event and reports nothing back; its outcome is only
/// logged. `submit` returns as soon as the task is spawned.
pub struct SpawningHandoff {
    dispatcher: Arc<NotificationDispatcher>,
}

impl SpawningHandoff {
    /// Spawn onto whichever runtime is current when `submit` is called.
    pub fn new(dispatcher: Arc<NotificationDispatcher>) -> Self {
        Self { dispatcher }
    }

    /// Start delivery of `event` and return the task handle.
    pub fn spawn(&self, event: NotificationEvent) -> PolicyResult<JoinHandle<bool>> {
        let runtime = Handle::try_current()
            .map_err(|e| PolicyError::HandoffUnavailable(format!("no tokio runtime: {e}")))?;

        let dispatcher = self.dispatcher.clone();
        Ok(runtime.spawn(async move {
            let delivered = dispatcher.dispatch(&event).await;
            tracing::debug!(
                inviter = %event.inviter,
                invitee = %event.invitee,
                delivered,
                "DM handoff finished"
            );
            delivered
        }))
    }
}

impl HandoffSink for SpawningHandoff {
    fn submit(&self, event: NotificationEvent) -> PolicyResult<()> {
        self.spawn(event).map(|_| ())
    }
}
