use roomgate_core::UserId;

use crate::error::{PolicyError, PolicyResult};

/// Trust class of a room-creation requester.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RequesterClass {
    ServiceAccount,
    Regular,
}

/// Returns true iff `user_id` is `@<service_localpart>:<any server>`.
///
/// Malformed identifiers never match.
pub fn is_service_account(user_id: &str, service_localpart: &str) -> bool {
    UserId::parse(user_id)
        .map(|id| id.localpart() == service_localpart)
        .unwrap_or(false)
}

/// Classifies requesters against the resolved service-account localpart.
#[derive(Debug, Clone)]
pub struct IdentityClassifier {
    service_localpart: String,
}

impl IdentityClassifier {
    pub fn new(service_localpart: impl Into<String>) -> PolicyResult<Self> {
        let service_localpart = service_localpart.into();
        if service_localpart.is_empty() {
            return Err(PolicyError::ValidationError(
                "service account localpart must not be empty".to_string(),
            ));
        }
        Ok(Self { service_localpart })
    }

    pub fn service_localpart(&self) -> &str {
        &self.service_localpart
    }

    pub fn classify(&self, user_id: &str) -> RequesterClass {
        if is_service_account(user_id, &self.service_localpart) {
            RequesterClass::ServiceAccount
        } else {
            RequesterClass::Regular
        }
    }

    pub fn is_service_account(&self, user_id: &str) -> bool {
        self.classify(user_id) == RequesterClass::ServiceAccount
    }
}
