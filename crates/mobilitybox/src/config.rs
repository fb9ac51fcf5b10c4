//! Mobilitybox client configuration

use secrecy::{ExposeSecret, SecretString};
use serde::{Deserialize, Serialize};

use crate::error::MobilityboxError;

/// Production endpoint of the Mobilitybox API
pub const DEFAULT_BASE_URL: &str = "https://api.themobilitybox.com/v1";

/// Configuration for the Mobilitybox API client
#[derive(Clone, Serialize, Deserialize)]
pub struct MobilityboxConfig {
    /// Bearer token sent as `Authorization` header (sensitive - uses SecretString)
    #[serde(default, skip_serializing)]
    pub access_token: Option<SecretString>,

    /// Base URL of the API, without trailing slash
    #[serde(default = "default_base_url")]
    pub base_url: String,

    /// Transport timeout in seconds (None = no timeout)
    #[serde(default)]
    pub timeout_secs: Option<u64>,

    /// User agent sent with every request
    #[serde(default = "default_user_agent")]
    pub user_agent: String,
}

impl std::fmt::Debug for MobilityboxConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("MobilityboxConfig")
            .field(
                "access_token",
                &if self.access_token.is_some() {
                    Some("[REDACTED]")
                } else {
                    None
                },
            )
            .field("base_url", &self.base_url)
            .field("timeout_secs", &self.timeout_secs)
            .field("user_agent", &self.user_agent)
            .finish()
    }
}

fn default_base_url() -> String {
    DEFAULT_BASE_URL.to_string()
}

fn default_user_agent() -> String {
    format!("mobilitybox-rs/{}", env!("CARGO_PKG_VERSION"))
}

impl Default for MobilityboxConfig {
    fn default() -> Self {
        Self {
            access_token: None,
            base_url: default_base_url(),
            timeout_secs: None,
            user_agent: default_user_agent(),
        }
    }
}

impl MobilityboxConfig {
    /// Create a configuration with the given access token and the default endpoint
    #[must_use]
    pub fn new(access_token: Option<String>) -> Self {
        Self {
            access_token: access_token.map(SecretString::from),
            ..Default::default()
        }
    }

    /// Create a configuration pointing at a mock server
    #[must_use]
    pub fn for_testing(base_url: &str) -> Self {
        Self {
            access_token: Some(SecretString::from("test-token")),
            base_url: base_url.to_string(),
            timeout_secs: Some(5),
            ..Default::default()
        }
    }

    /// Set the base URL
    #[must_use]
    pub fn with_base_url(mut self, base_url: impl Into<String>) -> Self {
        self.base_url = base_url.into();
        self
    }

    /// Set the access token
    #[must_use]
    pub fn with_access_token(mut self, access_token: impl Into<String>) -> Self {
        self.access_token = Some(SecretString::from(access_token.into()));
        self
    }

    /// The access token in plain text, if configured
    #[must_use]
    pub fn access_token(&self) -> Option<&str> {
        self.access_token
            .as_ref()
            .map(|token| token.expose_secret())
            .filter(|token| !token.is_empty())
    }

    /// Base URL with any trailing slash removed
    #[must_use]
    pub fn normalized_base_url(&self) -> &str {
        self.base_url.trim_end_matches('/')
    }

    /// Load configuration from `mobilitybox.toml` (optional) and the environment
    ///
    /// Environment variables use the `MOBILITYBOX__` prefix, e.g.
    /// `MOBILITYBOX__ACCESS_TOKEN` or `MOBILITYBOX__BASE_URL`.
    pub fn load() -> Result<Self, config::ConfigError> {
        let builder = config::Config::builder()
            .add_source(config::File::with_name("mobilitybox").required(false))
            .add_source(
                config::Environment::with_prefix("MOBILITYBOX")
                    .prefix_separator("__")
                    .separator("__")
                    .try_parsing(true),
            );

        let config = builder.build()?;
        config.try_deserialize()
    }

    /// Validate the configuration
    ///
    /// # Errors
    ///
    /// Returns an error if the base URL is empty or not http(s), or the timeout is zero.
    pub fn validate(&self) -> Result<(), MobilityboxError> {
        let base_url = self.normalized_base_url();
        if base_url.is_empty() {
            return Err(MobilityboxError::Configuration(
                "base_url must not be empty".to_string(),
            ));
        }

        let parsed = url::Url::parse(base_url)
            .map_err(|e| MobilityboxError::Configuration(format!("invalid base_url: {e}")))?;
        if !matches!(parsed.scheme(), "http" | "https") {
            return Err(MobilityboxError::Configuration(format!(
                "base_url must use http or https, got {}",
                parsed.scheme()
            )));
        }

        if self.timeout_secs == Some(0) {
            return Err(MobilityboxError::Configuration(
                "timeout_secs must be greater than 0".to_string(),
            ));
        }

        Ok(())
    }
}
