//! Migration configuration
//!
//! Loaded from a TOML file; every field is optional and command line flags
//! are applied on top with the `with_*` builders.
//!
//! ```toml
//! page_size = 500
//! include_devices = true
//! id_fallback = "refuse"
//!
//! [source]
//! url = "https://netbox-old.example.com"
//! token = "0123456789abcdef"
//!
//! [destination]
//! url = "https://netbox.example.com"
//! token = "fedcba9876543210"
//! timeout_secs = 60
//! ```

use crate::error::MigrateError;
use crate::reconcile::IdFallback;
use nbmig_client::ClientConfig;
use serde::{Deserialize, Serialize};
use std::path::Path;

/// Migration configuration
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct MigrationConfig {
    /// Instance to read from
    pub source: Option<ClientConfig>,
    /// Instance to write to
    pub destination: Option<ClientConfig>,
    /// `limit` used when listing objects for local context collection
    pub page_size: u32,
    /// Collect local context from devices as well as virtual machines
    pub include_devices: bool,
    /// Policy when a local context target is not found by name
    pub id_fallback: IdFallback,
    /// Reference lookup cache entries, 0 disables the cache
    pub lookup_cache_capacity: u64,
}

impl MigrationConfig {
    /// Create default configuration
    #[inline]
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// With source instance
    #[inline]
    #[must_use]
    pub fn with_source(mut self, source: ClientConfig) -> Self {
        self.source = Some(source);
        self
    }

    /// With destination instance
    #[inline]
    #[must_use]
    pub fn with_destination(mut self, destination: ClientConfig) -> Self {
        self.destination = Some(destination);
        self
    }

    /// With listing page size
    #[inline]
    #[must_use]
    pub fn with_page_size(mut self, page_size: u32) -> Self {
        self.page_size = page_size;
        self
    }

    /// With device collection switched on or off
    #[inline]
    #[must_use]
    pub fn with_include_devices(mut self, include: bool) -> Self {
        self.include_devices = include;
        self
    }

    /// With id fallback policy
    #[inline]
    #[must_use]
    pub fn with_id_fallback(mut self, policy: IdFallback) -> Self {
        self.id_fallback = policy;
        self
    }

    /// With lookup cache capacity
    #[inline]
    #[must_use]
    pub fn with_lookup_cache_capacity(mut self, capacity: u64) -> Self {
        self.lookup_cache_capacity = capacity;
        self
    }

    /// Parse TOML text
    pub fn from_toml_str(text: &str) -> Result<Self, MigrateError> {
        toml::from_str(text).map_err(|e| MigrateError::config(format!("invalid config: {e}")))
    }

    /// Read and parse a TOML file
    pub async fn load(path: impl AsRef<Path>) -> Result<Self, MigrateError> {
        let path = path.as_ref();
        let text = tokio::fs::read_to_string(path).await.map_err(|e| {
            MigrateError::config(format!("cannot read {}: {e}", path.display()))
        })?;
        let config = Self::from_toml_str(&text)?;
        tracing::debug!("Loaded configuration from {}", path.display());
        Ok(config)
    }

    /// Source settings, or a configuration error
    pub fn require_source(&self) -> Result<&ClientConfig, MigrateError> {
        self.source
            .as_ref()
            .ok_or_else(|| MigrateError::config("source url and token are required"))
    }

    /// Destination settings, or a configuration error
    pub fn require_destination(&self) -> Result<&ClientConfig, MigrateError> {
        self.destination
            .as_ref()
            .ok_or_else(|| MigrateError::config("destination url and token are required"))
    }
}

impl Default for MigrationConfig {
    fn default() -> Self {
        Self {
            source: None,
            destination: None,
            page_size: 1000,
            include_devices: false,
            id_fallback: IdFallback::SameId,
            lookup_cache_capacity: 10_000,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn empty_file_gives_defaults() {
        let config = MigrationConfig::from_toml_str("").unwrap();
        assert_eq!(config, MigrationConfig::default());
        assert_eq!(config.page_size, 1000);
        assert_eq!(config.lookup_cache_capacity, 10_000);
        assert_eq!(config.id_fallback, IdFallback::SameId);
    }

    #[test]
    fn full_file_parses() {
        let config = MigrationConfig::from_toml_str(
            r#"
            page_size = 250
            include_devices = true
            id_fallback = "refuse"
            lookup_cache_capacity = 0

            [source]
            url = "https://old.example.com/"
            token = "abc"

            [destination]
            url = "https://new.example.com"
            token = "def"
            timeout_secs = 60
            verify_tls = false
            "#,
        )
        .unwrap();

        assert_eq!(config.page_size, 250);
        assert!(config.include_devices);
        assert_eq!(config.id_fallback, IdFallback::Refuse);
        assert_eq!(config.lookup_cache_capacity, 0);

        let source = config.require_source().unwrap();
        assert_eq!(source.base_url(), "https://old.example.com");
        assert_eq!(source.timeout_secs, 30);
        assert!(source.verify_tls);

        let destination = config.require_destination().unwrap();
        assert_eq!(destination.timeout_secs, 60);
        assert!(!destination.verify_tls);
    }

    #[test]
    fn unknown_policy_is_config_error() {
        let err = MigrationConfig::from_toml_str(r#"id_fallback = "guess""#).unwrap_err();
        assert!(matches!(err, MigrateError::Config(_)));
    }

    #[test]
    fn missing_endpoints_are_reported() {
        let config = MigrationConfig::new();
        assert!(matches!(config.require_source(), Err(MigrateError::Config(_))));
        assert!(matches!(
            config.require_destination(),
            Err(MigrateError::Config(_))
        ));
    }

    #[test]
    fn builders_override_file_values() {
        let config = MigrationConfig::from_toml_str("page_size = 10")
            .unwrap()
            .with_page_size(20)
            .with_include_devices(true)
            .with_id_fallback(IdFallback::Refuse)
            .with_destination(ClientConfig::new("http://dest", "t"));

        assert_eq!(config.page_size, 20);
        assert!(config.include_devices);
        assert_eq!(config.id_fallback, IdFallback::Refuse);
        assert_eq!(config.require_destination().unwrap().url, "http://dest");
    }

    #[tokio::test]
    async fn load_reads_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("nbmig.toml");
        std::fs::write(&path, "include_devices = true\n").unwrap();

        let config = MigrationConfig::load(&path).await.unwrap();
        assert!(config.include_devices);

        let missing = MigrationConfig::load(dir.path().join("absent.toml")).await;
        assert!(matches!(missing, Err(MigrateError::Config(_))));
    }
}
