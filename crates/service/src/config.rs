//! Service configuration management and validation
//!
//! One JSON file with a section per concern. A missing file is created with
//! defaults on first start, and command-line flags override what it holds.

use std::net::SocketAddr;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use ridersaid_emergency::{DEFAULT_MAX_ATTEMPTS, Language};
use serde::{Deserialize, Serialize};
use tracing::{debug, info, warn};

use crate::identity::{DEFAULT_KDF_ROUNDS, DEFAULT_SESSION_TTL_HOURS};

/// Schema version written into new configuration files.
pub const SCHEMA_VERSION: &str = "ridersaid.config/1";

/// Upper bound for token generation attempts.
pub const MAX_TOKEN_ATTEMPTS: u32 = 32;

/// Lower bound for password key derivation rounds.
pub const MIN_KDF_ROUNDS: u32 = 10_000;

/// Complete service configuration
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ServiceConfig {
    /// Configuration schema version
    pub schema_version: String,
    /// HTTP listener configuration
    pub http: HttpConfig,
    /// Record store configuration
    pub store: StoreConfig,
    /// Access token configuration
    pub tokens: TokenConfig,
    /// Account and session configuration
    #[serde(default)]
    pub identity: IdentityConfig,
    /// Localization configuration
    pub i18n: I18nConfig,
    /// Logging configuration
    pub logging: LoggingConfig,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct HttpConfig {
    /// Listen address
    pub bind: SocketAddr,
    /// Origin used to build emergency links, e.g. `https://ridersaid.example`
    pub public_origin: String,
}

#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct StoreConfig {
    /// JSON snapshot file. Without one the store lives in memory only.
    pub snapshot_path: Option<PathBuf>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TokenConfig {
    /// Candidates generated before a token write gives up with a conflict
    pub max_attempts: u32,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct IdentityConfig {
    /// Hours a session stays valid after sign-in
    pub session_ttl_hours: u32,
    /// PBKDF2 rounds for new password digests
    pub kdf_rounds: u32,
}

#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct I18nConfig {
    /// Language used when the request carries no usable `Accept-Language`
    pub default_language: Language,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LoggingConfig {
    /// Level filter used when `RUST_LOG` is not set
    pub level: String,
    /// Emit JSON lines instead of human-readable output
    pub json: bool,
}

impl Default for ServiceConfig {
    fn default() -> Self {
        Self {
            schema_version: SCHEMA_VERSION.to_string(),
            http: HttpConfig::default(),
            store: StoreConfig::default(),
            tokens: TokenConfig::default(),
            identity: IdentityConfig::default(),
            i18n: I18nConfig::default(),
            logging: LoggingConfig::default(),
        }
    }
}

impl Default for HttpConfig {
    fn default() -> Self {
        Self {
            bind: SocketAddr::from(([127, 0, 0, 1], 8080)),
            public_origin: "http://localhost:8080".to_string(),
        }
    }
}

impl Default for TokenConfig {
    fn default() -> Self {
        Self {
            max_attempts: DEFAULT_MAX_ATTEMPTS,
        }
    }
}

impl Default for IdentityConfig {
    fn default() -> Self {
        Self {
            session_ttl_hours: DEFAULT_SESSION_TTL_HOURS,
            kdf_rounds: DEFAULT_KDF_ROUNDS,
        }
    }
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: "info".to_string(),
            json: false,
        }
    }
}

impl ServiceConfig {
    /// Load configuration from the default location
    pub async fn load() -> Result<Self> {
        let config_path = Self::default_config_path()?;
        Self::load_from_path(&config_path).await
    }

    /// Load configuration from a specific path, writing defaults there if
    /// the file does not exist yet.
    pub async fn load_from_path<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref();

        if !path.exists() {
            info!("Config file not found at {:?}, creating default", path);
            let config = Self::default();
            config.save_to_path(path).await?;
            return Ok(config);
        }

        let content = tokio::fs::read_to_string(path)
            .await
            .with_context(|| format!("Failed to read config file: {path:?}"))?;

        let config: ServiceConfig = serde_json::from_str(&content)
            .with_context(|| format!("Failed to parse config file: {path:?}"))?;

        debug!("Loaded config from {:?}", path);
        Ok(config)
    }

    /// Save configuration to a specific path
    pub async fn save_to_path<P: AsRef<Path>>(&self, path: P) -> Result<()> {
        let path = path.as_ref();

        if let Some(parent) = path.parent()
            && !parent.as_os_str().is_empty()
        {
            tokio::fs::create_dir_all(parent)
                .await
                .context("Failed to create config directory")?;
        }

        let content = serde_json::to_string_pretty(self).context("Failed to serialize config")?;

        tokio::fs::write(path, content)
            .await
            .with_context(|| format!("Failed to write config file: {path:?}"))?;

        debug!("Saved config to {:?}", path);
        Ok(())
    }

    /// `$HOME/.config/ridersaid/service.json`, or under `%LOCALAPPDATA%` on
    /// Windows.
    pub fn default_config_path() -> Result<PathBuf> {
        let config_dir = if cfg!(windows) {
            std::env::var("LOCALAPPDATA").context("LOCALAPPDATA environment variable not set")?
        } else {
            format!(
                "{}/.config",
                std::env::var("HOME").context("HOME environment variable not set")?
            )
        };

        Ok(PathBuf::from(config_dir)
            .join("ridersaid")
            .join("service.json"))
    }

    /// Validate configuration
    pub fn validate(&self) -> Result<()> {
        if !self.schema_version.starts_with("ridersaid.config/") {
            anyhow::bail!("Invalid schema version: {}", self.schema_version);
        }

        let origin = self.http.public_origin.as_str();
        if !(origin.starts_with("http://") || origin.starts_with("https://")) {
            anyhow::bail!("Invalid public origin: {origin}");
        }

        if self.tokens.max_attempts == 0 || self.tokens.max_attempts > MAX_TOKEN_ATTEMPTS {
            anyhow::bail!("Invalid token max attempts: {}", self.tokens.max_attempts);
        }

        if self.identity.session_ttl_hours == 0 {
            anyhow::bail!("Invalid session TTL: {} hours", self.identity.session_ttl_hours);
        }

        if self.identity.kdf_rounds < MIN_KDF_ROUNDS {
            anyhow::bail!(
                "Invalid KDF rounds: {} (min: {MIN_KDF_ROUNDS})",
                self.identity.kdf_rounds
            );
        }

        if self.logging.level.parse::<tracing::Level>().is_err() {
            anyhow::bail!("Invalid log level: {}", self.logging.level);
        }

        if self.store.snapshot_path.is_none() {
            warn!("No snapshot path configured, profiles and accounts are lost on restart");
        }

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use ridersaid_test_helpers::{must, must_err};
    use tempfile::TempDir;

    #[test]
    fn test_default_config_is_valid() {
        must(ServiceConfig::default().validate());
    }

    #[tokio::test]
    async fn test_missing_file_is_created_with_defaults() {
        let dir = must(TempDir::new());
        let path = dir.path().join("nested").join("service.json");

        let config = must(ServiceConfig::load_from_path(&path).await);

        assert_eq!(config, ServiceConfig::default());
        assert!(path.exists());
    }

    #[tokio::test]
    async fn test_save_then_load_keeps_changes() {
        let dir = must(TempDir::new());
        let path = dir.path().join("service.json");

        let mut config = ServiceConfig::default();
        config.i18n.default_language = Language::En;
        config.store.snapshot_path = Some(dir.path().join("store.json"));
        must(config.save_to_path(&path).await);

        let loaded = must(ServiceConfig::load_from_path(&path).await);
        assert_eq!(loaded, config);
    }

    #[tokio::test]
    async fn test_file_without_identity_section_gets_defaults() {
        let dir = must(TempDir::new());
        let path = dir.path().join("service.json");
        let mut raw = must(serde_json::to_value(ServiceConfig::default()));
        if let Some(object) = raw.as_object_mut() {
            object.remove("identity");
        }
        must(tokio::fs::write(&path, raw.to_string()).await);

        let loaded = must(ServiceConfig::load_from_path(&path).await);
        assert_eq!(loaded.identity, IdentityConfig::default());
    }

    #[tokio::test]
    async fn test_malformed_file_is_an_error() {
        let dir = must(TempDir::new());
        let path = dir.path().join("service.json");
        must(tokio::fs::write(&path, "{ not json").await);

        let err = must_err(ServiceConfig::load_from_path(&path).await);
        assert!(err.to_string().contains("Failed to parse config file"));
    }

    #[test]
    fn test_validate_rejects_bad_values() {
        let mut config = ServiceConfig::default();
        config.tokens.max_attempts = 0;
        let err = must_err(config.validate());
        assert!(err.to_string().contains("max attempts"));

        let mut config = ServiceConfig::default();
        config.http.public_origin = "ridersaid.example".into();
        let err = must_err(config.validate());
        assert!(err.to_string().contains("public origin"));

        let mut config = ServiceConfig::default();
        config.identity.session_ttl_hours = 0;
        let err = must_err(config.validate());
        assert!(err.to_string().contains("session TTL"));

        let mut config = ServiceConfig::default();
        config.identity.kdf_rounds = 1;
        let err = must_err(config.validate());
        assert!(err.to_string().contains("KDF rounds"));

        let mut config = ServiceConfig::default();
        config.logging.level = "chatty".into();
        let err = must_err(config.validate());
        assert!(err.to_string().contains("log level"));

        let mut config = ServiceConfig::default();
        config.schema_version = "wheel.config/1".into();
        let err = must_err(config.validate());
        assert!(err.to_string().contains("schema version"));
    }
}
