//! Configuration management for Newsdesk

use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use std::time::Duration;

use crate::error::{ConfigError, Result};

pub const DEFAULT_SLOT: &str = "newsItems";
pub const DEFAULT_SETTINGS_FILE: &str = "supabase_config.json";
pub const DEFAULT_TIMEOUT_SECS: u64 = 15;
pub const DEFAULT_USER_LIMIT: usize = 5;

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    pub remote: RemoteConfig,
    pub roles: RolesConfig,
    pub storage: StorageConfig,
    pub quota: QuotaConfig,
}

/// Public remote-store configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct RemoteConfig {
    pub url: Option<String>,
    pub anon_key: Option<String>,
    pub timeout_secs: u64,
}

impl Default for RemoteConfig {
    fn default() -> Self {
        Self {
            url: None,
            anon_key: None,
            timeout_secs: DEFAULT_TIMEOUT_SECS,
        }
    }
}

/// Reference digests (lowercase SHA-256 hex) for each publisher role
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct RolesConfig {
    pub admin_digest: Option<String>,
    pub user_digest: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct StorageConfig {
    pub data_dir: Option<String>,
    pub slot: String,
    pub settings_file: String,
}

impl Default for StorageConfig {
    fn default() -> Self {
        Self {
            data_dir: None,
            slot: DEFAULT_SLOT.to_string(),
            settings_file: DEFAULT_SETTINGS_FILE.to_string(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct QuotaConfig {
    pub user_limit: usize,
    /// Serialize quota check and save behind a per-role lock
    pub serialize_publish: bool,
}

impl Default for QuotaConfig {
    fn default() -> Self {
        Self {
            user_limit: DEFAULT_USER_LIMIT,
            serialize_publish: false,
        }
    }
}

impl Config {
    /// Load configuration from `path`
    ///
    /// A missing file yields the default configuration.
    pub fn load_or_default(path: &Path) -> Result<Self> {
        if !path.exists() {
            tracing::debug!("No config file at {}, using defaults", path.display());
            return Ok(Self::default());
        }
        Self::load_from_path(path)
    }

    /// Load configuration from a specific path
    pub fn load_from_path(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path).map_err(ConfigError::ReadError)?;
        let config: Config = toml::from_str(&content).map_err(ConfigError::ParseError)?;
        Ok(config)
    }

    /// Directory holding the local slot and the persisted settings blob
    pub fn data_dir(&self) -> Result<PathBuf> {
        match &self.storage.data_dir {
            Some(dir) => Ok(PathBuf::from(shellexpand::tilde(dir).to_string())),
            None => resolve_data_path(),
        }
    }

    pub fn settings_path(&self) -> Result<PathBuf> {
        Ok(self.data_dir()?.join(&self.storage.settings_file))
    }

    pub fn request_timeout(&self) -> Duration {
        Duration::from_secs(self.remote.timeout_secs.max(1))
    }
}

/// Resolve the configuration file path following XDG Base Directory spec
pub fn resolve_config_path() -> Result<PathBuf> {
    if let Ok(path) = std::env::var("NEWSDESK_CONFIG") {
        return Ok(PathBuf::from(shellexpand::tilde(&path).to_string()));
    }

    let config_dir = dirs::config_dir()
        .ok_or_else(|| ConfigError::MissingField("config directory".to_string()))?;

    Ok(config_dir.join("newsdesk").join("config.toml"))
}

/// Resolve the data directory path following XDG Base Directory spec
pub fn resolve_data_path() -> Result<PathBuf> {
    let data_dir = dirs::data_dir()
        .ok_or_else(|| ConfigError::MissingField("data directory".to_string()))?;

    Ok(data_dir.join("newsdesk"))
}
