//! Mock remote store for testing
//!
//! A configurable in-memory remote that can simulate failures and latency.
//! It keeps rows ordered newest first, assigns numeric ids like a database
//! sequence and counts calls so tests can assert which paths were taken.

use std::sync::{Arc, Mutex};
use std::time::Duration;

use async_trait::async_trait;
use tokio::time::sleep;

use super::{RemoteStore, StoreResult};
use crate::credentials::StoreCredentials;
use crate::error::StoreError;
use crate::types::{ItemId, MediaFile, NewsItem};

/// Configuration for mock remote behavior
#[derive(Debug, Clone)]
pub struct MockRemoteConfig {
    pub list_succeeds: bool,
    pub insert_succeeds: bool,
    pub delete_succeeds: bool,
    /// Uploads of files with this extension fail
    pub failing_upload_extension: Option<String>,
    /// Delay before completing operations (simulates network latency)
    pub delay: Duration,
}

impl Default for MockRemoteConfig {
    fn default() -> Self {
        Self {
            list_succeeds: true,
            insert_succeeds: true,
            delete_succeeds: true,
            failing_upload_extension: None,
            delay: Duration::from_millis(0),
        }
    }
}

#[derive(Debug, Default)]
struct MockState {
    rows: Vec<NewsItem>,
    next_id: i64,
    list_calls: usize,
    insert_calls: usize,
    delete_calls: usize,
    uploads: Vec<String>,
}

/// Mock remote store
#[derive(Debug, Clone, Default)]
pub struct MockRemote {
    config: MockRemoteConfig,
    state: Arc<Mutex<MockState>>,
}

impl MockRemote {
    pub fn new(config: MockRemoteConfig) -> Self {
        Self {
            config,
            state: Arc::new(Mutex::new(MockState::default())),
        }
    }

    /// Remote that always succeeds
    pub fn success() -> Self {
        Self::default()
    }

    /// Remote whose listing fails with HTTP 500
    pub fn list_failure() -> Self {
        Self::new(MockRemoteConfig {
            list_succeeds: false,
            ..Default::default()
        })
    }

    /// Remote whose inserts fail with HTTP 500
    pub fn insert_failure() -> Self {
        Self::new(MockRemoteConfig {
            insert_succeeds: false,
            ..Default::default()
        })
    }

    /// Remote that rejects uploads with the given extension
    pub fn upload_failure_for(extension: &str) -> Self {
        Self::new(MockRemoteConfig {
            failing_upload_extension: Some(extension.to_lowercase()),
            ..Default::default()
        })
    }

    pub fn with_delay(delay: Duration) -> Self {
        Self::new(MockRemoteConfig {
            delay,
            ..Default::default()
        })
    }

    fn state(&self) -> std::sync::MutexGuard<'_, MockState> {
        self.state.lock().unwrap_or_else(|e| e.into_inner())
    }

    /// Seed rows as if they had been inserted earlier
    pub fn seed(&self, items: Vec<NewsItem>) {
        let mut state = self.state();
        for mut item in items {
            state.next_id += 1;
            if item.id.is_none() {
                item.id = Some(ItemId::Number(state.next_id));
            }
            state.rows.push(item);
        }
        state.rows.sort_by(|a, b| b.date.cmp(&a.date));
    }

    pub fn rows(&self) -> Vec<NewsItem> {
        self.state().rows.clone()
    }

    pub fn list_call_count(&self) -> usize {
        self.state().list_calls
    }

    pub fn insert_call_count(&self) -> usize {
        self.state().insert_calls
    }

    pub fn delete_call_count(&self) -> usize {
        self.state().delete_calls
    }

    /// Object names that were uploaded successfully
    pub fn uploads(&self) -> Vec<String> {
        self.state().uploads.clone()
    }

    async fn simulate_latency(&self) {
        if !self.config.delay.is_zero() {
            sleep(self.config.delay).await;
        }
    }
}

fn server_error() -> StoreError {
    StoreError::HttpStatus(500, "Mock remote failure".to_string())
}

#[async_trait]
impl RemoteStore for MockRemote {
    async fn list(&self, _credentials: &StoreCredentials) -> StoreResult<Vec<NewsItem>> {
        self.state().list_calls += 1;
        self.simulate_latency().await;

        if !self.config.list_succeeds {
            return Err(server_error());
        }
        Ok(self.rows())
    }

    async fn insert(&self, _credentials: &StoreCredentials, item: &NewsItem) -> StoreResult<()> {
        self.state().insert_calls += 1;
        self.simulate_latency().await;

        if !self.config.insert_succeeds {
            return Err(server_error());
        }
        self.seed(vec![NewsItem {
            id: None,
            ..item.clone()
        }]);
        Ok(())
    }

    async fn delete_by_id(&self, _credentials: &StoreCredentials, id: &ItemId) -> StoreResult<()> {
        self.state().delete_calls += 1;
        self.simulate_latency().await;

        if !self.config.delete_succeeds {
            return Err(server_error());
        }
        self.state().rows.retain(|row| row.id.as_ref() != Some(id));
        Ok(())
    }

    async fn delete_all(&self, _credentials: &StoreCredentials) -> StoreResult<()> {
        self.state().delete_calls += 1;
        self.simulate_latency().await;

        if !self.config.delete_succeeds {
            return Err(server_error());
        }
        self.state().rows.clear();
        Ok(())
    }

    async fn upload(
        &self,
        credentials: &StoreCredentials,
        object_name: &str,
        file: &MediaFile,
    ) -> StoreResult<String> {
        self.simulate_latency().await;

        if let Some(failing) = &self.config.failing_upload_extension {
            if file.extension().as_deref() == Some(failing.as_str()) {
                return Err(StoreError::HttpStatus(400, "Mock upload rejected".to_string()));
            }
        }
        self.state().uploads.push(object_name.to_string());
        Ok(super::rest::public_object_url(credentials, object_name))
    }
}
