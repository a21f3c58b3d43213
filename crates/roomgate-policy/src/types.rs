use serde::{Deserialize, Serialize};
use std::fmt;

/// HTTP status carried by every denial.
pub const FORBIDDEN_STATUS: u16 = 403;

/// Display name substituted into denial messages unless configured otherwise.
pub const DEFAULT_PLATFORM_NAME: &str = "Alkemio";

// ---------------------------------------------------------------------------
// RoomCreationContent — the subset of the create-room body we inspect
// ---------------------------------------------------------------------------

/// Room creation request body as received from the client.
///
/// Only `is_direct` and `invite` matter here; everything else the client
/// sent is ignored. Absent fields default to "not direct" / "no invites".
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct RoomCreationContent {
    #[serde(default)]
    pub is_direct: bool,
    #[serde(default)]
    pub invite: Vec<String>,
}

// ---------------------------------------------------------------------------
// RoomCreationRequest — one host callback invocation
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RoomCreationRequest {
    pub requester_id: String,
    pub is_admin_requester: bool,
    pub is_direct: bool,
    pub invite_targets: Vec<String>,
}

impl RoomCreationRequest {
    pub fn new(requester_id: impl Into<String>) -> Self {
        Self {
            requester_id: requester_id.into(),
            is_admin_requester: false,
            is_direct: false,
            invite_targets: Vec::new(),
        }
    }

    /// Build from the host's callback arguments.
    pub fn from_content(
        requester_id: impl Into<String>,
        content: &RoomCreationContent,
        is_admin_requester: bool,
    ) -> Self {
        Self {
            requester_id: requester_id.into(),
            is_admin_requester,
            is_direct: content.is_direct,
            invite_targets: content.invite.clone(),
        }
    }

    pub fn admin(mut self, is_admin: bool) -> Self {
        self.is_admin_requester = is_admin;
        self
    }

    pub fn direct(mut self, is_direct: bool) -> Self {
        self.is_direct = is_direct;
        self
    }

    pub fn invite(mut self, target: impl Into<String>) -> Self {
        self.invite_targets.push(target.into());
        self
    }
}

// ---------------------------------------------------------------------------
// ErrorCode — machine-readable error code surfaced to the client
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ErrorCode {
    #[serde(rename = "M_FORBIDDEN")]
    Forbidden,
}

impl ErrorCode {
    pub fn as_str(&self) -> &'static str {
        match self {
            ErrorCode::Forbidden => "M_FORBIDDEN",
        }
    }
}

impl fmt::Display for ErrorCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

// ---------------------------------------------------------------------------
// DenialReason — which policy branch produced a denial
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DenialReason {
    /// Single-invitee DM; forwarded to the adapter.
    DirectMessageRedirected,
    /// Any other room shape.
    RoomCreationManaged,
}

impl fmt::Display for DenialReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            DenialReason::DirectMessageRedirected => write!(f, "direct_message_redirected"),
            DenialReason::RoomCreationManaged => write!(f, "room_creation_managed"),
        }
    }
}

// ---------------------------------------------------------------------------
// Denial / Verdict
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Denial {
    pub status: u16,
    pub errcode: ErrorCode,
    pub message: String,
    pub reason: DenialReason,
}

impl Denial {
    pub fn direct_message(platform: &str) -> Self {
        Self {
            status: FORBIDDEN_STATUS,
            errcode: ErrorCode::Forbidden,
            message: format!(
                "Direct messages must be initiated through {platform}. \
                 Your request has been forwarded for processing."
            ),
            reason: DenialReason::DirectMessageRedirected,
        }
    }

    pub fn room_creation(platform: &str) -> Self {
        Self {
            status: FORBIDDEN_STATUS,
            errcode: ErrorCode::Forbidden,
            message: format!(
                "Room creation is managed by {platform}. \
                 Please use the {platform} platform to create spaces and rooms."
            ),
            reason: DenialReason::RoomCreationManaged,
        }
    }
}

/// Outcome of one room-creation check.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Verdict {
    Allow,
    Deny(Denial),
}

impl Verdict {
    pub fn is_allowed(&self) -> bool {
        matches!(self, Verdict::Allow)
    }

    pub fn is_denied(&self) -> bool {
        matches!(self, Verdict::Deny(_))
    }

    pub fn denial(&self) -> Option<&Denial> {
        match self {
            Verdict::Allow => None,
            Verdict::Deny(denial) => Some(denial),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_content_defaults_when_fields_missing() {
        let content: RoomCreationContent = serde_json::from_str("{}").unwrap();
        assert!(!content.is_direct);
        assert!(content.invite.is_empty());
    }

    #[test]
    fn test_content_ignores_unrelated_fields() {
        let content: RoomCreationContent = serde_json::from_str(
            r#"{"preset":"trusted_private_chat","is_direct":true,"invite":["@bob:example.org"],"name":"x"}"#,
        )
        .unwrap();
        assert!(content.is_direct);
        assert_eq!(content.invite, vec!["@bob:example.org".to_string()]);
    }

    #[test]
    fn test_request_from_content() {
        let content = RoomCreationContent {
            is_direct: true,
            invite: vec!["@bob:example.org".into()],
        };
        let request = RoomCreationRequest::from_content("@alice:example.org", &content, false);
        assert_eq!(request.requester_id, "@alice:example.org");
        assert!(request.is_direct);
        assert!(!request.is_admin_requester);
        assert_eq!(request.invite_targets.len(), 1);
    }

    #[test]
    fn test_error_code_serializes_as_matrix_code() {
        let json = serde_json::to_string(&ErrorCode::Forbidden).unwrap();
        assert_eq!(json, "\"M_FORBIDDEN\"");
        assert_eq!(ErrorCode::Forbidden.to_string(), "M_FORBIDDEN");
    }

    #[test]
    fn test_denial_messages_use_platform_name() {
        let dm = Denial::direct_message("Acme");
        assert_eq!(dm.status, 403);
        assert_eq!(
            dm.message,
            "Direct messages must be initiated through Acme. \
             Your request has been forwarded for processing."
        );

        let room = Denial::room_creation("Acme");
        assert_eq!(
            room.message,
            "Room creation is managed by Acme. \
             Please use the Acme platform to create spaces and rooms."
        );
        assert_eq!(room.reason, DenialReason::RoomCreationManaged);
    }

    #[test]
    fn test_verdict_accessors() {
        assert!(Verdict::Allow.is_allowed());
        assert!(Verdict::Allow.denial().is_none());
        let verdict = Verdict::Deny(Denial::room_creation(DEFAULT_PLATFORM_NAME));
        assert!(verdict.is_denied());
        assert_eq!(verdict.denial().unwrap().errcode, ErrorCode::Forbidden);
    }
}
