//! Roomgate Policy Engine
//!
//! Decides, before the host commits it, whether a room may be created.
//! Every attempt is evaluated as Requester + Request shape = Verdict,
//! producing ALLOW or a user-facing DENY.
//!
//! Key features:
//! - Privilege bypass for server admins and the adapter service account
//! - Direct-message redirect: single-invitee DMs are denied and handed off
//!   to the adapter so the service account can create the room instead
//! - Default deny for every other room shape
//! - Handoffs go through a non-blocking `HandoffSink`, so delivery can never
//!   delay or change a verdict

pub mod engine;
pub mod error;
pub mod identity;
pub mod types;

pub use engine::{AccessDecisionEngine, DiscardHandoff, HandoffSink};
pub use error::{PolicyError, PolicyResult};
pub use identity::{is_service_account, IdentityClassifier, RequesterClass};
pub use types::{
    Denial, DenialReason, ErrorCode, RoomCreationContent, RoomCreationRequest, Verdict,
    DEFAULT_PLATFORM_NAME, FORBIDDEN_STATUS,
};
