//! Dual-backend content store
//!
//! Every operation resolves a [`StoreMode`] once and then runs against either
//! the remote store or the local slot:
//!
//! - `list` serves the local sequence when the remote read fails, so readers
//!   are never blocked by a transport problem.
//! - `save`, `delete_one` and `delete_all` surface remote failures and never
//!   write to the local slot instead.
//! - `upload_media` exists only in remote mode.
//!
//! # Example
//!
//! ```no_run
//! use std::sync::Arc;
//! use libnewsdesk::credentials::CredentialResolver;
//! use libnewsdesk::service::events::EventBus;
//! use libnewsdesk::store::{ContentStore, local::MemorySlot, rest::RestStore};
//!
//! # async fn example() -> libnewsdesk::Result<()> {
//! let store = ContentStore::new(
//!     Arc::new(CredentialResolver::local_only()),
//!     Arc::new(RestStore::new(std::time::Duration::from_secs(15))?),
//!     Arc::new(MemorySlot::default()),
//!     EventBus::default(),
//! );
//!
//! for item in store.list().await {
//!     println!("{}: {}", item.date, item.title);
//! }
//! # Ok(())
//! # }
//! ```

use std::sync::Arc;

use async_trait::async_trait;
use rand::distributions::Alphanumeric;
use rand::Rng;
use tokio::sync::Mutex;
use tracing::{debug, info, warn};

use crate::credentials::{CredentialResolver, StoreCredentials, StoreMode};
use crate::error::StoreError;
use crate::service::events::{Event, EventBus};
use crate::types::{ItemId, MediaFile, NewsItem};

pub mod local;
pub mod rest;

// Mock remote is available for all builds to support integration tests
pub mod mock;

pub type StoreResult<T> = std::result::Result<T, StoreError>;

/// Networked persistence backend
///
/// Credentials are passed per call because they are re-resolved for every
/// operation.
#[async_trait]
pub trait RemoteStore: Send + Sync {
    /// All items ordered by `date`, newest first
    async fn list(&self, credentials: &StoreCredentials) -> StoreResult<Vec<NewsItem>>;

    /// Insert one item without echoing the created row
    async fn insert(&self, credentials: &StoreCredentials, item: &NewsItem) -> StoreResult<()>;

    /// Delete the item whose id matches exactly
    async fn delete_by_id(&self, credentials: &StoreCredentials, id: &ItemId) -> StoreResult<()>;

    /// Delete every item in the collection
    async fn delete_all(&self, credentials: &StoreCredentials) -> StoreResult<()>;

    /// Upload (overwriting) a media object and return its public URL
    async fn upload(
        &self,
        credentials: &StoreCredentials,
        object_name: &str,
        file: &MediaFile,
    ) -> StoreResult<String>;
}

/// On-device persistence holding the whole item sequence in one slot
///
/// Reads and writes are all-or-nothing.
#[async_trait]
pub trait LocalSlot: Send + Sync {
    /// Stored sequence; missing or malformed data reads as empty
    async fn load(&self) -> Vec<NewsItem>;

    /// Replace the stored sequence
    async fn store(&self, items: &[NewsItem]) -> StoreResult<()>;
}

/// Content store with automatic remote/local selection
pub struct ContentStore {
    resolver: Arc<CredentialResolver>,
    remote: Arc<dyn RemoteStore>,
    local: Arc<dyn LocalSlot>,
    events: EventBus,
    // Guards local read-modify-write cycles within this process
    local_lock: Mutex<()>,
}

impl ContentStore {
    pub fn new(
        resolver: Arc<CredentialResolver>,
        remote: Arc<dyn RemoteStore>,
        local: Arc<dyn LocalSlot>,
        events: EventBus,
    ) -> Self {
        Self {
            resolver,
            remote,
            local,
            events,
            local_lock: Mutex::new(()),
        }
    }

    /// Backend that the next operation would use
    pub fn mode(&self) -> StoreMode {
        self.resolver.resolve()
    }

    /// List items newest first, falling back to the local sequence on
    /// remote failure
    pub async fn list(&self) -> Vec<NewsItem> {
        match self.mode() {
            StoreMode::LocalFallback => self.local.load().await,
            StoreMode::Remote(credentials) => match self.remote.list(&credentials).await {
                Ok(items) => items,
                Err(e) => {
                    warn!("Remote listing failed, serving local items: {}", e);
                    self.events.emit(Event::RemoteFallback {
                        error: e.to_string(),
                    });
                    self.local.load().await
                }
            },
        }
    }

    /// Persist a finished item
    ///
    /// Local mode assigns an id and appends. Remote failures are returned and
    /// are not retried or redirected to the local slot.
    pub async fn save(&self, mut item: NewsItem) -> StoreResult<NewsItem> {
        let result = match self.mode() {
            StoreMode::LocalFallback => {
                let _guard = self.local_lock.lock().await;
                if item.id.is_none() {
                    item.id = Some(ItemId::Text(uuid::Uuid::new_v4().to_string()));
                }
                let mut items = self.local.load().await;
                items.push(item.clone());
                self.local.store(&items).await.map(|_| item)
            }
            StoreMode::Remote(credentials) => {
                self.remote.insert(&credentials, &item).await.map(|_| item)
            }
        };

        if let Err(e) = &result {
            warn!("Failed to save news item: {}", e);
        }
        result
    }

    /// Delete one item by id
    ///
    /// Local ids are compared by their textual form. Deleting an unknown local
    /// id is not an error and emits no event.
    pub async fn delete_one(&self, id: &ItemId) -> StoreResult<()> {
        match self.mode() {
            StoreMode::LocalFallback => {
                let _guard = self.local_lock.lock().await;
                let mut items = self.local.load().await;
                let before = items.len();
                items.retain(|item| item.id.as_ref().map(ItemId::as_text) != Some(id.as_text()));
                if items.len() == before {
                    debug!("No local news item with id {}", id);
                    return Ok(());
                }
                self.local.store(&items).await?;
            }
            StoreMode::Remote(credentials) => {
                self.remote.delete_by_id(&credentials, id).await?;
            }
        }
        info!("Deleted news item {}", id);
        self.events.emit(Event::ItemDeleted { id: id.as_text() });
        Ok(())
    }

    /// Delete every item
    ///
    /// Callers must have authenticated as admin immediately beforehand.
    pub async fn delete_all(&self) -> StoreResult<()> {
        match self.mode() {
            StoreMode::LocalFallback => {
                let _guard = self.local_lock.lock().await;
                self.local.store(&[]).await?;
            }
            StoreMode::Remote(credentials) => {
                self.remote.delete_all(&credentials).await?;
            }
        }
        info!("Cleared all news items");
        self.events.emit(Event::StoreCleared);
        Ok(())
    }

    /// Upload a media file and return its public URL
    ///
    /// Returns `None` on any failure or when no remote store is configured.
    pub async fn upload_media(&self, file: &MediaFile) -> Option<String> {
        let credentials = match self.mode() {
            StoreMode::Remote(credentials) => credentials,
            StoreMode::LocalFallback => {
                warn!("Media upload unavailable without a remote store: {}", file.file_name);
                self.events.emit(Event::MediaUploadFailed {
                    file_name: file.file_name.clone(),
                    error: "no remote store configured".to_string(),
                });
                return None;
            }
        };

        let object_name = media_object_name(file, chrono::Utc::now().timestamp_millis());
        match self.remote.upload(&credentials, &object_name, file).await {
            Ok(url) => {
                debug!("Uploaded {} as {}", file.file_name, object_name);
                Some(url)
            }
            Err(e) => {
                warn!("Failed to upload {}: {}", file.file_name, e);
                self.events.emit(Event::MediaUploadFailed {
                    file_name: file.file_name.clone(),
                    error: e.to_string(),
                });
                None
            }
        }
    }
}

/// Collision-resistant object name: `<millis>-<6 random chars>.<ext>`
pub fn media_object_name(file: &MediaFile, millis: i64) -> String {
    let suffix: String = rand::thread_rng()
        .sample_iter(&Alphanumeric)
        .take(6)
        .map(|b| char::from(b).to_ascii_lowercase())
        .collect();
    match file.original_extension() {
        Some(ext) => format!("{}-{}.{}", millis, suffix, ext),
        None => format!("{}-{}", millis, suffix),
    }
}
