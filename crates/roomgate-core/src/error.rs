use thiserror::Error;

#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum CoreError {
    #[error("invalid user id: {0}")]
    InvalidUserId(String),

    #[error("registry unavailable: {0}")]
    RegistryUnavailable(String),
}

pub type CoreResult<T> = Result<T, CoreError>;
