//! Publication pipeline
//!
//! `publish` runs validate → authenticate → quota → media upload → normalize →
//! persist. Validation, authentication and quota failures reject the draft
//! before any write. A failed media upload only drops that one field. A failed
//! save hands the draft back so the caller can retry.
//!
//! Quota check and save are not atomic: concurrent user-role publishes can
//! both pass the check. Setting `[quota] serialize_publish = true` closes that
//! window for this process by holding a lock from the check through the save.

use std::sync::Arc;

use chrono::{SubsecRound, Utc};
use secrecy::SecretString;
use tokio::sync::Mutex;
use tracing::{info, warn};

use super::events::{Event, EventBus};
use super::validation::{normalize_link, validate_draft};
use crate::auth::{AuthOutcome, RoleAuthenticator};
use crate::error::{NewsError, Result, StoreError};
use crate::quota::{QuotaDecision, QuotaPolicy};
use crate::store::ContentStore;
use crate::types::{Draft, ItemId, MediaAttachments, NewsItem, Role};

/// Terminal state of a publish attempt
#[derive(Debug)]
pub enum PublicationResult {
    /// Save succeeded
    Published(NewsItem),
    /// Validation, authentication or quota failure; nothing was written
    Rejected(NewsError),
    /// Save was attempted and failed; the untouched draft is returned
    PersistFailed { draft: Draft, error: StoreError },
}

impl PublicationResult {
    pub fn is_published(&self) -> bool {
        matches!(self, PublicationResult::Published(_))
    }

    /// Convert into a `Result`, mapping persist failures to store errors
    pub fn into_result(self) -> Result<NewsItem> {
        match self {
            PublicationResult::Published(item) => Ok(item),
            PublicationResult::Rejected(err) => Err(err),
            PublicationResult::PersistFailed { error, .. } => Err(error.into()),
        }
    }
}

/// Orchestrates publishing and deletion
#[derive(Clone)]
pub struct PublicationPipeline {
    store: Arc<ContentStore>,
    auth: Arc<RoleAuthenticator>,
    quota: QuotaPolicy,
    event_bus: EventBus,
    user_publish_lock: Option<Arc<Mutex<()>>>,
}

impl PublicationPipeline {
    pub fn new(
        store: Arc<ContentStore>,
        auth: Arc<RoleAuthenticator>,
        quota: QuotaPolicy,
        event_bus: EventBus,
    ) -> Self {
        Self {
            store,
            auth,
            quota,
            event_bus,
            user_publish_lock: None,
        }
    }

    /// Serialize user-role quota check and save within this process
    pub fn with_serialized_quota(mut self) -> Self {
        self.user_publish_lock = Some(Arc::new(Mutex::new(())));
        self
    }

    /// Publish a draft under the role granted by `secret`
    pub async fn publish(
        &self,
        draft: Draft,
        secret: &SecretString,
        media: MediaAttachments,
    ) -> PublicationResult {
        if let Err(err) = validate_draft(&draft, secret) {
            return self.reject(err);
        }

        let role = match self.auth.authenticate(secret) {
            AuthOutcome::Authenticated(role) => role,
            AuthOutcome::Unauthenticated => {
                return self.reject(NewsError::Authentication(
                    "PIN does not match any publisher role".to_string(),
                ));
            }
        };

        self.event_bus.emit(Event::PublishStarted {
            role,
            title: draft.title.trim().to_string(),
        });

        let _quota_guard = match (&self.user_publish_lock, role) {
            (Some(lock), Role::User) => Some(lock.lock().await),
            _ => None,
        };

        let existing = self.store.list().await;
        if let QuotaDecision::Exceeded { current, limit } = self.quota.check(role, &existing) {
            return self.reject(NewsError::QuotaExceeded { current, limit });
        }

        let (image_url, video_url) = self.upload_media(&media).await;

        let item = NewsItem {
            id: None,
            title: draft.title.trim().to_string(),
            content: draft.content.trim().to_string(),
            author: role.display_name().to_string(),
            date: Utc::now().trunc_subsecs(3),
            image_url,
            video_url,
            link_url: normalize_link(draft.link_url.as_deref()),
            publisher_role: role,
        };

        match self.store.save(item).await {
            Ok(saved) => {
                info!("Published \"{}\" as {}", saved.title, role);
                self.event_bus.emit(Event::PublishCompleted {
                    id: saved.id.as_ref().map(ItemId::as_text),
                    title: saved.title.clone(),
                });
                PublicationResult::Published(saved)
            }
            Err(error) => {
                self.event_bus.emit(Event::PersistFailed {
                    error: error.to_string(),
                });
                PublicationResult::PersistFailed { draft, error }
            }
        }
    }

    /// Upload image then video; a failed upload leaves that field empty
    async fn upload_media(&self, media: &MediaAttachments) -> (Option<String>, Option<String>) {
        let image_url = match &media.image {
            Some(file) => self.store.upload_media(file).await,
            None => None,
        };
        let video_url = match &media.video {
            Some(file) => self.store.upload_media(file).await,
            None => None,
        };
        (image_url, video_url)
    }

    fn reject(&self, err: NewsError) -> PublicationResult {
        warn!("Publish rejected: {}", err);
        self.event_bus.emit(Event::PublishRejected {
            reason: err.to_string(),
        });
        PublicationResult::Rejected(err)
    }

    /// Items newest first
    pub async fn list(&self) -> Vec<NewsItem> {
        self.store.list().await
    }

    /// Delete one item; confirmation is the caller's responsibility
    pub async fn delete_one(&self, id: &ItemId) -> Result<()> {
        self.store.delete_one(id).await?;
        Ok(())
    }

    /// Remove every item after a fresh admin authentication
    pub async fn clear_all(&self, secret: &SecretString) -> Result<()> {
        if !self.auth.is_admin(secret) {
            warn!("Bulk clear refused: PIN is not an admin PIN");
            return Err(NewsError::Authentication(
                "Clearing all posts requires the admin PIN".to_string(),
            ));
        }
        self.store.delete_all().await?;
        Ok(())
    }
}
