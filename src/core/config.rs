use crate::core::kernel::rest::{
    RestClientConfig, DEFAULT_API_VERSION, DEFAULT_BASE_URL, DEFAULT_TIMEOUT, DEFAULT_USER_AGENT,
};
use crate::core::kernel::signer::SignatureMode;
use secrecy::{ExposeSecret, Secret};
use serde::{Deserialize, Deserializer, Serialize, Serializer};
use std::env;
use std::time::Duration;

pub const ENV_PUBLIC_KEY: &str = "NEXO_PUBLIC_KEY";
pub const ENV_SECRET_KEY: &str = "NEXO_SECRET_KEY";
pub const ENV_BASE_URL: &str = "NEXO_BASE_URL";
pub const ENV_API_VERSION: &str = "NEXO_API_VERSION";
pub const ENV_TIMESTAMP_OFFSET: &str = "NEXO_TIMESTAMP_OFFSET";

/// Everything a client needs, fixed at construction
#[derive(Debug, Clone)]
pub struct NexoConfig {
    pub api_key: Secret<String>,
    pub api_secret: Secret<String>,
    pub base_url: String,
    pub api_version: String,
    pub timeout: Duration,
    /// Milliseconds added to the wall clock when issuing nonces
    pub timestamp_offset: i64,
    pub signature_mode: SignatureMode,
    pub user_agent: String,
}

// Custom Serialize implementation - never expose secrets in serialization
impl Serialize for NexoConfig {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        use serde::ser::SerializeStruct;
        let mut state = serializer.serialize_struct("NexoConfig", 8)?;
        state.serialize_field("api_key", "[REDACTED]")?;
        state.serialize_field("api_secret", "[REDACTED]")?;
        state.serialize_field("base_url", &self.base_url)?;
        state.serialize_field("api_version", &self.api_version)?;
        state.serialize_field("timeout_ms", &(self.timeout.as_millis() as u64))?;
        state.serialize_field("timestamp_offset", &self.timestamp_offset)?;
        state.serialize_field("signature_mode", &self.signature_mode)?;
        state.serialize_field("user_agent", &self.user_agent)?;
        state.end()
    }
}

impl<'de> Deserialize<'de> for NexoConfig {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        #[derive(Deserialize)]
        struct NexoConfigHelper {
            api_key: String,
            api_secret: String,
            base_url: Option<String>,
            api_version: Option<String>,
            timeout_ms: Option<u64>,
            #[serde(default)]
            timestamp_offset: i64,
            #[serde(default)]
            signature_mode: SignatureMode,
            user_agent: Option<String>,
        }

        let helper = NexoConfigHelper::deserialize(deserializer)?;
        Ok(Self {
            api_key: Secret::new(helper.api_key),
            api_secret: Secret::new(helper.api_secret),
            base_url: helper
                .base_url
                .unwrap_or_else(|| DEFAULT_BASE_URL.to_string()),
            api_version: helper
                .api_version
                .unwrap_or_else(|| DEFAULT_API_VERSION.to_string()),
            timeout: helper
                .timeout_ms
                .map_or(DEFAULT_TIMEOUT, Duration::from_millis),
            timestamp_offset: helper.timestamp_offset,
            signature_mode: helper.signature_mode,
            user_agent: helper
                .user_agent
                .unwrap_or_else(|| DEFAULT_USER_AGENT.to_string()),
        })
    }
}

impl NexoConfig {
    /// Create a new configuration with API credentials and production defaults
    #[must_use]
    pub fn new(api_key: String, api_secret: String) -> Self {
        Self {
            api_key: Secret::new(api_key),
            api_secret: Secret::new(api_secret),
            base_url: DEFAULT_BASE_URL.to_string(),
            api_version: DEFAULT_API_VERSION.to_string(),
            timeout: DEFAULT_TIMEOUT,
            timestamp_offset: 0,
            signature_mode: SignatureMode::default(),
            user_agent: DEFAULT_USER_AGENT.to_string(),
        }
    }

    /// Create configuration from environment variables
    ///
    /// Expected environment variables:
    /// - `NEXO_PUBLIC_KEY`
    /// - `NEXO_SECRET_KEY`
    /// - `NEXO_BASE_URL` (optional)
    /// - `NEXO_API_VERSION` (optional, defaults to `v1`)
    /// - `NEXO_TIMESTAMP_OFFSET` (optional, milliseconds)
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|name| env::var(name).ok())
    }

    fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let api_key = lookup(ENV_PUBLIC_KEY)
            .ok_or_else(|| ConfigError::MissingEnvironmentVariable(ENV_PUBLIC_KEY.to_string()))?;
        let api_secret = lookup(ENV_SECRET_KEY)
            .ok_or_else(|| ConfigError::MissingEnvironmentVariable(ENV_SECRET_KEY.to_string()))?;

        let mut config = Self::new(api_key, api_secret);

        if let Some(base_url) = lookup(ENV_BASE_URL) {
            config.base_url = base_url;
        }
        if let Some(api_version) = lookup(ENV_API_VERSION) {
            config.api_version = api_version;
        }
        if let Some(offset) = lookup(ENV_TIMESTAMP_OFFSET) {
            config.timestamp_offset = offset.trim().parse().map_err(|e| {
                ConfigError::InvalidConfiguration(format!(
                    "{} must be an integer number of milliseconds, got '{}': {}",
                    ENV_TIMESTAMP_OFFSET, offset, e
                ))
            })?;
        }

        Ok(config)
    }

    /// Create configuration from .env file and environment variables
    ///
    /// **Security Warning**: Never commit .env files to version control!
    #[cfg(feature = "env-file")]
    pub fn from_env_file() -> Result<Self, ConfigError> {
        Self::from_env_file_with_path(".env")
    }

    /// Create configuration from a specific .env file path
    ///
    /// A missing file is not an error; system environment variables are used.
    #[cfg(feature = "env-file")]
    pub fn from_env_file_with_path(env_file_path: &str) -> Result<Self, ConfigError> {
        match dotenv::from_path(env_file_path) {
            Ok(()) => {}
            Err(dotenv::Error::Io(io_err)) if io_err.kind() == std::io::ErrorKind::NotFound => {}
            Err(e) => {
                return Err(ConfigError::InvalidConfiguration(format!(
                    "Failed to load .env file '{}': {}",
                    env_file_path, e
                )));
            }
        }

        Self::from_env()
    }

    /// Check if this configuration has credentials to sign with
    #[must_use]
    pub fn has_credentials(&self) -> bool {
        !self.api_key.expose_secret().is_empty() && !self.api_secret.expose_secret().is_empty()
    }

    /// Set custom base URL
    #[must_use]
    pub fn base_url(mut self, base_url: impl Into<String>) -> Self {
        self.base_url = base_url.into();
        self
    }

    #[must_use]
    pub fn api_version(mut self, api_version: impl Into<String>) -> Self {
        self.api_version = api_version.into();
        self
    }

    #[must_use]
    pub const fn timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    #[must_use]
    pub const fn timestamp_offset(mut self, offset_ms: i64) -> Self {
        self.timestamp_offset = offset_ms;
        self
    }

    #[must_use]
    pub const fn signature_mode(mut self, mode: SignatureMode) -> Self {
        self.signature_mode = mode;
        self
    }

    #[must_use]
    pub fn user_agent(mut self, user_agent: impl Into<String>) -> Self {
        self.user_agent = user_agent.into();
        self
    }

    /// Transport settings for the dispatcher
    pub fn rest_config(&self) -> RestClientConfig {
        RestClientConfig::new(self.base_url.clone())
            .with_api_version(self.api_version.clone())
            .with_timeout(self.timeout)
            .with_user_agent(self.user_agent.clone())
    }
}

#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("Missing environment variable: {0}")]
    MissingEnvironmentVariable(String),

    #[error("Invalid configuration: {0}")]
    InvalidConfiguration(String),
}
