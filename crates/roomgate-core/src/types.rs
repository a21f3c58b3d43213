use serde::{Deserialize, Serialize};
use std::fmt;
use zeroize::Zeroize;

use crate::error::{CoreError, CoreResult};

/// Registration id of the adapter application service.
pub const ADAPTER_SERVICE_ID: &str = "alkemio-matrix-adapter";

/// Localpart used when the registry does not name a sender.
pub const DEFAULT_SERVICE_LOCALPART: &str = "matrix-adapter";

/// Adapter base URL used when the registry does not name one.
pub const DEFAULT_ADAPTER_ENDPOINT: &str = "http://localhost:8080";

// ---------------------------------------------------------------------------
// Timestamp — canonical time representation (seconds + nanoseconds)
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct Timestamp {
    pub seconds_since_epoch: u64,
    pub nanoseconds: u32,
}

impl Timestamp {
    pub fn now() -> Self {
        let now = chrono::Utc::now();
        Self {
            seconds_since_epoch: now.timestamp() as u64,
            nanoseconds: now.timestamp_subsec_nanos(),
        }
    }
}

// ---------------------------------------------------------------------------
// UserId — fully qualified `@localpart:server_name` identifier
// ---------------------------------------------------------------------------

/// A fully qualified user identifier of the form `@localpart:server_name`.
///
/// The localpart is everything between the leading `@` and the first `:`;
/// the server name is everything after that colon (it may itself contain a
/// port, e.g. `example.org:8448`).
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct UserId {
    value: String,
    colon: usize,
}

impl UserId {
    pub fn parse(value: impl Into<String>) -> CoreResult<Self> {
        let value = value.into();
        let rest = value
            .strip_prefix('@')
            .ok_or_else(|| CoreError::InvalidUserId("missing leading '@'".to_string()))?;
        let colon = rest
            .find(':')
            .ok_or_else(|| CoreError::InvalidUserId("missing ':' separator".to_string()))?;
        if colon == 0 {
            return Err(CoreError::InvalidUserId("empty localpart".to_string()));
        }
        if colon + 1 == rest.len() {
            return Err(CoreError::InvalidUserId("empty server name".to_string()));
        }
        Ok(Self {
            // offset by the sigil
            colon: colon + 1,
            value,
        })
    }

    pub fn localpart(&self) -> &str {
        &self.value[1..self.colon]
    }

    pub fn server_name(&self) -> &str {
        &self.value[self.colon + 1..]
    }

    pub fn as_str(&self) -> &str {
        &self.value
    }
}

impl TryFrom<String> for UserId {
    type Error = CoreError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        Self::parse(value)
    }
}

impl From<UserId> for String {
    fn from(id: UserId) -> Self {
        id.value
    }
}

impl fmt::Display for UserId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.value)
    }
}

// ---------------------------------------------------------------------------
// SharedSecret — token shared between the host and the adapter
// ---------------------------------------------------------------------------

/// Opaque token presented to the adapter as a bearer credential.
///
/// Never printed; the backing string is zeroized on drop.
#[derive(Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct SharedSecret(String);

impl SharedSecret {
    pub fn new(value: impl Into<String>) -> Self {
        Self(value.into())
    }

    pub fn expose(&self) -> &str {
        &self.0
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

impl fmt::Debug for SharedSecret {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "SharedSecret([REDACTED])")
    }
}

impl Drop for SharedSecret {
    fn drop(&mut self) {
        self.0.zeroize();
    }
}

// ---------------------------------------------------------------------------
// Sender — the many shapes a registered sender identity arrives in
// ---------------------------------------------------------------------------

/// Sender identity of a registered service account.
///
/// Registries hand this out either as a parsed user id or as a plain string
/// which may be a bare localpart or a fully qualified id.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum Sender {
    User(UserId),
    Name(String),
}

impl Sender {
    /// Normalize to the un-prefixed localpart.
    pub fn localpart(&self) -> String {
        match self {
            Sender::User(user) => user.localpart().to_string(),
            Sender::Name(name) => {
                if name.starts_with('@') && name.contains(':') {
                    let head = name.split(':').next().unwrap_or_default();
                    head[1..].to_string()
                } else {
                    name.clone()
                }
            }
        }
    }
}

// ---------------------------------------------------------------------------
// RegisteredService — one entry of the host's service-account registry
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RegisteredService {
    pub id: String,
    pub sender: Option<Sender>,
    pub url: Option<String>,
    pub hs_token: Option<SharedSecret>,
}

// ---------------------------------------------------------------------------
// ServiceAccountConfig — resolved once at startup
// ---------------------------------------------------------------------------

/// Identity and endpoint of the privileged service account.
///
/// Built once during initialization and shared read-only afterwards.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ServiceAccountConfig {
    pub server_domain: String,
    pub service_localpart: String,
    pub adapter_endpoint: String,
    pub shared_secret: Option<SharedSecret>,
}

impl ServiceAccountConfig {
    /// Configuration used when nothing could be discovered.
    pub fn fallback(server_domain: impl Into<String>) -> Self {
        Self {
            server_domain: server_domain.into(),
            service_localpart: DEFAULT_SERVICE_LOCALPART.to_string(),
            adapter_endpoint: DEFAULT_ADAPTER_ENDPOINT.to_string(),
            shared_secret: None,
        }
    }

    /// Full user id of the service account on this server.
    pub fn service_user_id(&self) -> String {
        format!("@{}:{}", self.service_localpart, self.server_domain)
    }

    pub fn has_secret(&self) -> bool {
        self.shared_secret.as_ref().is_some_and(|s| !s.is_empty())
    }
}

// ---------------------------------------------------------------------------
// NotificationEvent — direct-message handoff sent to the adapter
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NotificationEvent {
    pub inviter: String,
    pub invitee: String,
}

impl NotificationEvent {
    pub fn new(inviter: impl Into<String>, invitee: impl Into<String>) -> Self {
        Self {
            inviter: inviter.into(),
            invitee: invitee.into(),
        }
    }
}
