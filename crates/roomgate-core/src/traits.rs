use crate::error::CoreResult;
use crate::types::RegisteredService;

// ---------------------------------------------------------------------------
// ServiceAccountRegistry — the host's list of registered service accounts
//
// Read-only. An Err means the registry could not be reached at all, which
// callers treat the same as "no matching entry".
// ---------------------------------------------------------------------------

pub trait ServiceAccountRegistry: Send + Sync {
    fn registered_services(&self) -> CoreResult<Vec<RegisteredService>>;
}
