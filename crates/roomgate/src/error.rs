use thiserror::Error;

/// Error type for the roomgate service, aggregating errors from the
/// workspace crates.
#[derive(Debug, Error)]
pub enum RootError {
    #[error("policy error: {0}")]
    Policy(#[from] roomgate_policy::PolicyError),

    #[error("notification error: {0}")]
    Notify(#[from] roomgate_notify::NotifyError),

    #[error("configuration error: {0}")]
    Config(String),

    #[error("io error: {0}")]
    Io(#[from] std::io::Error),
}

impl From<toml::de::Error> for RootError {
    fn from(e: toml::de::Error) -> Self {
        RootError::Config(format!("TOML parse error: {}", e))
    }
}

pub type RootResult<T> = Result<T, RootError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_root_error_config() {
        let err = RootError::Config("server_name is empty".into());
        assert_eq!(err.to_string(), "configuration error: server_name is empty");
    }

    #[test]
    fn test_root_error_from_policy() {
        let policy_err = roomgate_policy::PolicyError::ValidationError("bad platform".into());
        let root_err: RootError = policy_err.into();
        assert!(root_err.to_string().contains("bad platform"));
    }

    #[test]
    fn test_root_error_from_notify() {
        let root_err: RootError = roomgate_notify::NotifyError::ConfigurationError.into();
        assert_eq!(root_err.to_string(), "notification error: configuration error");
    }

    #[test]
    fn test_root_error_from_toml() {
        let toml_err = toml::from_str::<toml::Value>("= invalid").unwrap_err();
        let root_err: RootError = toml_err.into();
        assert!(matches!(root_err, RootError::Config(_)));
    }
}
