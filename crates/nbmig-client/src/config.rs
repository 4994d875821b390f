//! Connection settings for one NetBox instance

use crate::error::ClientError;
use serde::{Deserialize, Serialize};

fn default_timeout_secs() -> u64 {
    30
}

fn default_verify_tls() -> bool {
    true
}

/// Where an instance lives and how to authenticate to it
#[derive(Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ClientConfig {
    /// Base URL, e.g. `https://netbox.example.com`
    pub url: String,
    /// API token sent as `Authorization: Token <token>`
    pub token: String,
    /// Per-request timeout in seconds
    #[serde(default = "default_timeout_secs")]
    pub timeout_secs: u64,
    /// Whether to verify the server certificate
    #[serde(default = "default_verify_tls")]
    pub verify_tls: bool,
}

impl ClientConfig {
    /// Create configuration with default timeout and TLS verification
    #[must_use]
    pub fn new(url: impl Into<String>, token: impl Into<String>) -> Self {
        Self {
            url: url.into(),
            token: token.into(),
            timeout_secs: default_timeout_secs(),
            verify_tls: default_verify_tls(),
        }
    }

    /// With request timeout
    #[inline]
    #[must_use]
    pub fn with_timeout(mut self, secs: u64) -> Self {
        self.timeout_secs = secs;
        self
    }

    /// Skip certificate verification
    #[inline]
    #[must_use]
    pub fn with_insecure_tls(mut self) -> Self {
        self.verify_tls = false;
        self
    }

    /// Base URL without trailing slash
    #[must_use]
    pub fn base_url(&self) -> &str {
        self.url.trim_end_matches('/')
    }

    /// Check the configuration is usable
    pub fn validate(&self) -> Result<(), ClientError> {
        if !(self.url.starts_with("http://") || self.url.starts_with("https://")) {
            return Err(ClientError::InvalidConfig(format!(
                "url must start with http:// or https://, got '{}'",
                self.url
            )));
        }
        if self.token.trim().is_empty() {
            return Err(ClientError::InvalidConfig(format!(
                "empty token for {}",
                self.url
            )));
        }
        if self.timeout_secs == 0 {
            return Err(ClientError::InvalidConfig("timeout must be positive".to_string()));
        }
        Ok(())
    }
}

impl std::fmt::Debug for ClientConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ClientConfig")
            .field("url", &self.url)
            .field("token", &"***")
            .field("timeout_secs", &self.timeout_secs)
            .field("verify_tls", &self.verify_tls)
            .finish()
    }
}
