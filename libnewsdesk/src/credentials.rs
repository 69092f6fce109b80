//! Remote-store credential discovery
//!
//! Credentials are looked up through an ordered list of sources, first match
//! wins:
//!
//! 1. Injected process globals (`SUPABASE_URL` / `SUPABASE_ANON_KEY`)
//! 2. The public configuration object (`[remote] url` / `anon_key`)
//! 3. The persisted settings blob (`{"url": ..., "key": ...}` JSON text)
//!
//! A source only matches when both endpoint and key are present and non-empty.
//! When nothing matches the store runs in local-fallback mode. Resolution has
//! no side effects and is repeated on every store operation so configuration
//! edits are picked up without a restart.

use std::fmt;
use std::path::PathBuf;

use secrecy::{ExposeSecret, SecretString};
use serde::Deserialize;

use crate::config::{Config, RemoteConfig};

pub const ENV_URL: &str = "SUPABASE_URL";
pub const ENV_KEY: &str = "SUPABASE_ANON_KEY";

/// Endpoint and access key for the remote store
pub struct StoreCredentials {
    endpoint: String,
    access_key: SecretString,
}

impl StoreCredentials {
    /// Build credentials, or `None` unless both parts are non-empty
    pub fn new(endpoint: &str, access_key: &str) -> Option<Self> {
        let endpoint = endpoint.trim().trim_end_matches('/');
        let access_key = access_key.trim();
        if endpoint.is_empty() || access_key.is_empty() {
            return None;
        }
        Some(Self {
            endpoint: endpoint.to_string(),
            access_key: SecretString::from(access_key.to_string()),
        })
    }

    fn from_parts(endpoint: Option<&str>, access_key: Option<&str>) -> Option<Self> {
        Self::new(endpoint?, access_key?)
    }

    /// Base URL without a trailing slash
    pub fn endpoint(&self) -> &str {
        &self.endpoint
    }

    pub fn access_key(&self) -> &SecretString {
        &self.access_key
    }
}

impl Clone for StoreCredentials {
    fn clone(&self) -> Self {
        Self {
            endpoint: self.endpoint.clone(),
            access_key: SecretString::from(self.access_key.expose_secret().to_string()),
        }
    }
}

impl fmt::Debug for StoreCredentials {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("StoreCredentials")
            .field("endpoint", &self.endpoint)
            .field("access_key", &"[REDACTED]")
            .finish()
    }
}

/// Backend selected for a single store operation
#[derive(Debug, Clone)]
pub enum StoreMode {
    Remote(StoreCredentials),
    LocalFallback,
}

impl StoreMode {
    pub fn is_remote(&self) -> bool {
        matches!(self, StoreMode::Remote(_))
    }
}

/// One tier of credential lookup
pub trait CredentialSource: Send + Sync {
    fn name(&self) -> &str;

    fn lookup(&self) -> Option<StoreCredentials>;
}

/// Tier (a): credentials injected through the process environment
pub struct EnvSource {
    url_var: String,
    key_var: String,
}

impl EnvSource {
    pub fn new(url_var: impl Into<String>, key_var: impl Into<String>) -> Self {
        Self {
            url_var: url_var.into(),
            key_var: key_var.into(),
        }
    }
}

impl Default for EnvSource {
    fn default() -> Self {
        Self::new(ENV_URL, ENV_KEY)
    }
}

impl CredentialSource for EnvSource {
    fn name(&self) -> &str {
        "environment"
    }

    fn lookup(&self) -> Option<StoreCredentials> {
        let url = std::env::var(&self.url_var).ok();
        let key = std::env::var(&self.key_var).ok();
        StoreCredentials::from_parts(url.as_deref(), key.as_deref())
    }
}

/// Tier (b): the `[remote]` section of the configuration file
///
/// The file is re-read on each lookup. An unreadable or malformed file is
/// treated as carrying no credentials.
pub struct PublicConfigSource {
    path: PathBuf,
}

impl PublicConfigSource {
    pub fn new(path: PathBuf) -> Self {
        Self { path }
    }
}

impl CredentialSource for PublicConfigSource {
    fn name(&self) -> &str {
        "config file"
    }

    fn lookup(&self) -> Option<StoreCredentials> {
        let config = Config::load_from_path(&self.path).ok()?;
        StoreCredentials::from_parts(
            config.remote.url.as_deref(),
            config.remote.anon_key.as_deref(),
        )
    }
}

/// Tier (b) for an in-memory configuration that has no backing file
pub struct StaticSource {
    remote: RemoteConfig,
}

impl StaticSource {
    pub fn new(remote: RemoteConfig) -> Self {
        Self { remote }
    }
}

impl CredentialSource for StaticSource {
    fn name(&self) -> &str {
        "static config"
    }

    fn lookup(&self) -> Option<StoreCredentials> {
        StoreCredentials::from_parts(self.remote.url.as_deref(), self.remote.anon_key.as_deref())
    }
}

#[derive(Deserialize)]
struct SettingsBlob {
    url: Option<String>,
    key: Option<String>,
}

/// Tier (c): persisted settings blob stored as JSON text
pub struct SettingsBlobSource {
    path: PathBuf,
}

impl SettingsBlobSource {
    pub fn new(path: PathBuf) -> Self {
        Self { path }
    }
}

impl CredentialSource for SettingsBlobSource {
    fn name(&self) -> &str {
        "settings blob"
    }

    fn lookup(&self) -> Option<StoreCredentials> {
        let text = std::fs::read_to_string(&self.path).ok()?;
        let blob: SettingsBlob = match serde_json::from_str(&text) {
            Ok(blob) => blob,
            Err(e) => {
                tracing::debug!("Ignoring malformed settings blob {}: {}", self.path.display(), e);
                return None;
            }
        };
        StoreCredentials::from_parts(blob.url.as_deref(), blob.key.as_deref())
    }
}

/// Ordered credential lookup across all configured sources
pub struct CredentialResolver {
    sources: Vec<Box<dyn CredentialSource>>,
}

impl CredentialResolver {
    pub fn new(sources: Vec<Box<dyn CredentialSource>>) -> Self {
        Self { sources }
    }

    /// Resolver that never finds credentials (always local fallback)
    pub fn local_only() -> Self {
        Self::new(Vec::new())
    }

    /// Standard three-tier resolver
    ///
    /// `config_path` is re-read on every resolution and may not exist yet.
    pub fn standard(config: &Config, config_path: PathBuf) -> crate::Result<Self> {
        Ok(Self::new(vec![
            Box::new(EnvSource::default()),
            Box::new(PublicConfigSource::new(config_path)),
            Box::new(SettingsBlobSource::new(config.settings_path()?)),
        ]))
    }

    /// Resolve the backend for one operation
    pub fn resolve(&self) -> StoreMode {
        for source in &self.sources {
            if let Some(credentials) = source.lookup() {
                tracing::debug!("Remote credentials resolved from {}", source.name());
                return StoreMode::Remote(credentials);
            }
        }
        tracing::debug!("No remote credentials found, using local fallback");
        StoreMode::LocalFallback
    }
}
