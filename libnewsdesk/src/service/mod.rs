//! Service layer for Newsdesk
//!
//! `NewsService` is the single entry point consumed by the CLI tools. It owns
//! the shared [`ContentStore`] and exposes the collaborator interface:
//! `publish`, `list`, `delete_one` and `clear_all`.
//!
//! - `PublicationPipeline`: validation, authentication, quota, media, persistence
//! - `validation`: draft checks and link normalization
//! - `EventBus`: progress and failure events
//!
//! # Example
//!
//! ```no_run
//! use libnewsdesk::service::NewsService;
//! use libnewsdesk::types::{Draft, MediaAttachments};
//! use secrecy::SecretString;
//!
//! # async fn example() -> libnewsdesk::Result<()> {
//! let service = NewsService::new()?;
//! let pin = SecretString::from("1234".to_string());
//!
//! let result = service
//!     .publish(Draft::new("Hello", "First post"), &pin, MediaAttachments::none())
//!     .await;
//! println!("Published: {}", result.is_published());
//! # Ok(())
//! # }
//! ```

pub mod events;
pub mod publishing;
pub mod validation;

use std::path::PathBuf;
use std::sync::Arc;

use secrecy::SecretString;

use self::events::EventBus;
use self::publishing::{PublicationPipeline, PublicationResult};
use crate::auth::RoleAuthenticator;
use crate::credentials::CredentialResolver;
use crate::quota::QuotaPolicy;
use crate::store::local::FileSlot;
use crate::store::rest::RestStore;
use crate::store::{ContentStore, LocalSlot, RemoteStore};
use crate::types::{Draft, ItemId, MediaAttachments, NewsItem};
use crate::{Config, Result};

/// Main service facade
pub struct NewsService {
    pipeline: PublicationPipeline,
    event_bus: EventBus,
}

impl NewsService {
    /// Create a service from the default configuration file
    pub fn new() -> Result<Self> {
        Self::from_config_file(crate::config::resolve_config_path()?)
    }

    /// Create a service from a configuration file
    ///
    /// The `[remote]` section is re-read on every store operation, so
    /// credential edits take effect without a restart. That includes a file
    /// created after startup.
    pub fn from_config_file(path: PathBuf) -> Result<Self> {
        let config = Config::load_or_default(&path)?;
        let resolver = CredentialResolver::standard(&config, path)?;
        let remote = RestStore::new(config.request_timeout())?;
        let local = FileSlot::new(&config.data_dir()?, &config.storage.slot);
        Ok(Self::with_backends(
            &config,
            resolver,
            Arc::new(remote),
            Arc::new(local),
        ))
    }

    /// Create a service over explicit backends
    pub fn with_backends(
        config: &Config,
        resolver: CredentialResolver,
        remote: Arc<dyn RemoteStore>,
        local: Arc<dyn LocalSlot>,
    ) -> Self {
        let event_bus = EventBus::new(100);
        let store = Arc::new(ContentStore::new(
            Arc::new(resolver),
            remote,
            local,
            event_bus.clone(),
        ));
        let auth = Arc::new(RoleAuthenticator::from_config(&config.roles));
        let mut pipeline = PublicationPipeline::new(
            Arc::clone(&store),
            auth,
            QuotaPolicy::new(config.quota.user_limit),
            event_bus.clone(),
        );
        if config.quota.serialize_publish {
            pipeline = pipeline.with_serialized_quota();
        }

        Self {
            pipeline,
            event_bus,
        }
    }

    /// Subscribe to store and pipeline events
    pub fn subscribe(&self) -> events::EventReceiver {
        self.event_bus.subscribe()
    }

    pub async fn publish(
        &self,
        draft: Draft,
        secret: &SecretString,
        media: MediaAttachments,
    ) -> PublicationResult {
        self.pipeline.publish(draft, secret, media).await
    }

    pub async fn list(&self) -> Vec<NewsItem> {
        self.pipeline.list().await
    }

    pub async fn delete_one(&self, id: &ItemId) -> Result<()> {
        self.pipeline.delete_one(id).await
    }

    pub async fn clear_all(&self, secret: &SecretString) -> Result<()> {
        self.pipeline.clear_all(secret).await
    }
}
