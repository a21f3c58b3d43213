use thiserror::Error;

/// Error enum for policy engine construction.
///
/// Evaluation itself never fails: every request yields a `Verdict`.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum PolicyError {
    #[error("validation error: {0}")]
    ValidationError(String),

    #[error("handoff unavailable: {0}")]
    HandoffUnavailable(String),
}

pub type PolicyResult<T> = Result<T, PolicyError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_policy_error_display() {
        let err = PolicyError::ValidationError("platform name is empty".into());
        assert_eq!(err.to_string(), "validation error: platform name is empty");
    }

    #[test]
    fn test_policy_result_type_alias() {
        fn test_err() -> PolicyResult<u32> {
            Err(PolicyError::HandoffUnavailable("no runtime".into()))
        }
        assert_eq!(
            test_err().unwrap_err().to_string(),
            "handoff unavailable: no runtime"
        );
    }
}
