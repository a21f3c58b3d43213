use thiserror::Error;

/// Error type for the roomgate-notify crate.
///
/// Messages are generic so that endpoint URLs and tokens never end up in
/// logs or error responses.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum NotifyError {
    #[error("request timed out")]
    Timeout,

    #[error("connection error")]
    ConnectionError,

    #[error("configuration error")]
    ConfigurationError,
}

/// Result type alias for roomgate-notify operations.
pub type NotifyResult<T> = Result<T, NotifyError>;
