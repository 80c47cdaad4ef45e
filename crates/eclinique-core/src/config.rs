//! Client configuration.
//!
//! Nothing here is global: a [`ClientConfig`] is built once by the host app
//! and passed to the constructors that need it.

use std::path::PathBuf;

use thiserror::Error;

/// Application-level constants
pub const APP_NAME: &str = "eClinique";
pub const APP_VERSION: &str = env!("CARGO_PKG_VERSION");

pub const DEFAULT_TIMEOUT_SECS: u64 = 30;
pub const DEFAULT_LOG_FILTER: &str = "eclinique_core=info";

pub const ENV_API_URL: &str = "ECLINIQUE_API_URL";
pub const ENV_TIMEOUT_SECS: &str = "ECLINIQUE_TIMEOUT_SECS";
pub const ENV_DB_PATH: &str = "ECLINIQUE_DB_PATH";
pub const ENV_LOG: &str = "ECLINIQUE_LOG";

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ConfigError {
    #[error("Configuration missing: {0} is not set")]
    MissingApiUrl(&'static str),

    #[error("Invalid API URL: {0}")]
    InvalidApiUrl(String),

    #[error("Invalid timeout: {0}")]
    InvalidTimeout(String),
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ClientConfig {
    /// Backend base URL, e.g. `https://api.eclinique.fr`
    pub api_base_url: String,
    /// Per-request timeout
    pub timeout_secs: u64,
    /// Session database; `None` keeps the session in memory
    pub database_path: Option<PathBuf>,
    /// `tracing` filter used when `RUST_LOG` is not set
    pub log_filter: String,
}

impl ClientConfig {
    pub fn new(api_base_url: impl Into<String>) -> Self {
        Self {
            api_base_url: api_base_url.into(),
            timeout_secs: DEFAULT_TIMEOUT_SECS,
            database_path: None,
            log_filter: DEFAULT_LOG_FILTER.to_string(),
        }
    }

    pub fn with_database_path(mut self, path: impl Into<PathBuf>) -> Self {
        self.database_path = Some(path.into());
        self
    }

    pub fn with_timeout_secs(mut self, secs: u64) -> Self {
        self.timeout_secs = secs;
        self
    }

    /// Read the configuration from the process environment.
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Build from any key lookup (the environment, a settings bundle, a test map).
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self, ConfigError> {
        let api_base_url = lookup(ENV_API_URL)
            .filter(|v| !v.trim().is_empty())
            .ok_or(ConfigError::MissingApiUrl(ENV_API_URL))?;

        let mut config = Self::new(api_base_url.trim());

        if let Some(raw) = lookup(ENV_TIMEOUT_SECS) {
            config.timeout_secs = raw
                .trim()
                .parse()
                .ok()
                .filter(|secs| *secs > 0)
                .ok_or(ConfigError::InvalidTimeout(raw))?;
        }
        if let Some(path) = lookup(ENV_DB_PATH).filter(|v| !v.trim().is_empty()) {
            config.database_path = Some(PathBuf::from(path));
        }
        if let Some(filter) = lookup(ENV_LOG).filter(|v| !v.trim().is_empty()) {
            config.log_filter = filter;
        }

        config.validate()?;
        Ok(config)
    }

    /// The base URL must be absolute http(s).
    pub fn validate(&self) -> Result<(), ConfigError> {
        let url = self.api_base_url.trim();
        if url.starts_with("http://") || url.starts_with("https://") {
            Ok(())
        } else {
            Err(ConfigError::InvalidApiUrl(self.api_base_url.clone()))
        }
    }
}
