use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use std::time::Duration;

use roomgate_notify::RetryPolicy;
use roomgate_policy::DEFAULT_PLATFORM_NAME;

use crate::error::{RootError, RootResult};

/// Listener settings for the host adapter.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct HttpConfig {
    #[serde(default = "default_bind")]
    pub bind: String,

    #[serde(default = "default_port")]
    pub port: u16,
}

fn default_bind() -> String {
    "127.0.0.1".to_string()
}

fn default_port() -> u16 {
    9105
}

impl Default for HttpConfig {
    fn default() -> Self {
        Self {
            bind: default_bind(),
            port: default_port(),
        }
    }
}

/// Configuration for the DM-request notification dispatcher.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct DispatchConfig {
    /// Per-request timeout in seconds for the outbound webhook call.
    #[serde(default = "default_request_timeout")]
    pub request_timeout_secs: u64,

    /// Total attempts per notification, including the first.
    #[serde(default = "default_max_attempts")]
    pub max_attempts: u32,

    /// Wait before the first retry; doubled before each later one.
    #[serde(default = "default_initial_delay")]
    pub initial_delay_secs: u64,
}

fn default_request_timeout() -> u64 {
    10
}

fn default_max_attempts() -> u32 {
    3
}

fn default_initial_delay() -> u64 {
    1
}

impl Default for DispatchConfig {
    fn default() -> Self {
        Self {
            request_timeout_secs: default_request_timeout(),
            max_attempts: default_max_attempts(),
            initial_delay_secs: default_initial_delay(),
        }
    }
}

impl DispatchConfig {
    pub fn request_timeout(&self) -> Duration {
        Duration::from_secs(self.request_timeout_secs)
    }

    pub fn retry_policy(&self) -> RetryPolicy {
        RetryPolicy {
            max_attempts: self.max_attempts,
            initial_delay_seconds: self.initial_delay_secs,
            ..RetryPolicy::default()
        }
    }
}

/// Top-level configuration for the roomgate binary.
///
/// Loaded from a TOML file (typically `~/.roomgate/config.toml`).
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RootConfig {
    /// The homeserver's domain, used to build the service account user id.
    #[serde(default = "default_server_name")]
    pub server_name: String,

    /// Platform name shown to users in denial messages.
    #[serde(default = "default_platform_name")]
    pub platform_name: String,

    /// Application-service registration files searched for the adapter.
    #[serde(default)]
    pub registration_files: Vec<PathBuf>,

    #[serde(default)]
    pub http: HttpConfig,

    #[serde(default)]
    pub dispatch: DispatchConfig,
}

fn default_server_name() -> String {
    "localhost".to_string()
}

fn default_platform_name() -> String {
    DEFAULT_PLATFORM_NAME.to_string()
}

/// Returns `$HOME/<suffix>` if HOME is available, otherwise `./<suffix>`.
fn dirs_or_default(suffix: &str) -> PathBuf {
    std::env::var("HOME")
        .map(|h| PathBuf::from(h).join(suffix))
        .unwrap_or_else(|_| PathBuf::from(suffix))
}

impl Default for RootConfig {
    fn default() -> Self {
        Self {
            server_name: default_server_name(),
            platform_name: default_platform_name(),
            registration_files: Vec::new(),
            http: HttpConfig::default(),
            dispatch: DispatchConfig::default(),
        }
    }
}

impl RootConfig {
    /// Load configuration from a TOML file. If the file does not exist,
    /// returns a default configuration.
    pub fn load(path: &Path) -> RootResult<Self> {
        if !path.exists() {
            return Ok(Self::default());
        }
        let contents = std::fs::read_to_string(path).map_err(RootError::Io)?;
        let config: RootConfig = toml::from_str(&contents)?;
        config.validate()?;
        Ok(config)
    }

    /// Write the current configuration to a TOML file.
    pub fn save(&self, path: &Path) -> RootResult<()> {
        let contents = toml::to_string_pretty(self)
            .map_err(|e| RootError::Config(format!("TOML serialize error: {}", e)))?;
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent).map_err(RootError::Io)?;
        }
        std::fs::write(path, contents).map_err(RootError::Io)?;
        Ok(())
    }

    /// Validate configuration values.
    pub fn validate(&self) -> RootResult<()> {
        if self.server_name.trim().is_empty() {
            return Err(RootError::Config("server_name must not be empty".into()));
        }
        if self.server_name.starts_with('@') {
            return Err(RootError::Config(format!(
                "server_name must be a domain, got '{}'",
                self.server_name
            )));
        }
        if self.platform_name.trim().is_empty() {
            return Err(RootError::Config("platform_name must not be empty".into()));
        }
        if self.dispatch.request_timeout_secs == 0 {
            return Err(RootError::Config(
                "request_timeout_secs must be > 0".into(),
            ));
        }
        if !(1..=10).contains(&self.dispatch.max_attempts) {
            return Err(RootError::Config(format!(
                "max_attempts must be between 1 and 10, got {}",
                self.dispatch.max_attempts
            )));
        }
        Ok(())
    }

    /// Return the path to the default config file location.
    pub fn default_config_path() -> PathBuf {
        dirs_or_default(".roomgate/config.toml")
    }
}
