//! HTTP backend for the remote store
//!
//! Talks to a PostgREST-style table at `{endpoint}/rest/v1/news` and an object
//! bucket at `{endpoint}/storage/v1/object/news-images`. Every request carries
//! the access key in both the `apikey` and `Authorization` headers. Success is
//! decided purely on the HTTP status; only list responses are parsed.

use std::time::Duration;

use async_trait::async_trait;
use reqwest::header::{AUTHORIZATION, CONTENT_TYPE};
use reqwest::{Client, RequestBuilder, Response};
use secrecy::ExposeSecret;
use url::Url;

use super::{RemoteStore, StoreResult};
use crate::credentials::StoreCredentials;
use crate::error::StoreError;
use crate::types::{ItemId, MediaFile, NewsItem};

const TABLE_PATH: &str = "rest/v1/news";
const BUCKET: &str = "news-images";

/// reqwest-based remote store
#[derive(Debug, Clone)]
pub struct RestStore {
    client: Client,
}

impl RestStore {
    /// Create a client whose requests fail after `timeout`
    pub fn new(timeout: Duration) -> crate::Result<Self> {
        let client = Client::builder()
            .timeout(timeout)
            .build()
            .map_err(StoreError::from)?;
        Ok(Self { client })
    }

    fn table_url(credentials: &StoreCredentials) -> StoreResult<Url> {
        join(credentials, TABLE_PATH)
    }

    fn object_url(credentials: &StoreCredentials, object_name: &str) -> StoreResult<Url> {
        join(
            credentials,
            &format!("storage/v1/object/{}/{}", BUCKET, object_name),
        )
    }

    fn authorized(builder: RequestBuilder, credentials: &StoreCredentials) -> RequestBuilder {
        let key = credentials.access_key().expose_secret();
        builder
            .header("apikey", key)
            .header(AUTHORIZATION, format!("Bearer {}", key))
    }
}

/// Public URL for an uploaded object
pub fn public_object_url(credentials: &StoreCredentials, object_name: &str) -> String {
    format!(
        "{}/storage/v1/object/public/{}/{}",
        credentials.endpoint(),
        BUCKET,
        object_name
    )
}

fn join(credentials: &StoreCredentials, path: &str) -> StoreResult<Url> {
    let base = format!("{}/{}", credentials.endpoint(), path);
    Url::parse(&base).map_err(|e| StoreError::Transport(format!("Invalid endpoint URL: {}", e)))
}

async fn ensure_success(response: Response) -> StoreResult<Response> {
    let status = response.status();
    if status.is_success() {
        Ok(response)
    } else {
        let body = response.text().await.unwrap_or_default();
        Err(StoreError::HttpStatus(status.as_u16(), body))
    }
}

#[async_trait]
impl RemoteStore for RestStore {
    async fn list(&self, credentials: &StoreCredentials) -> StoreResult<Vec<NewsItem>> {
        let request = self
            .client
            .get(Self::table_url(credentials)?)
            .query(&[("select", "*"), ("order", "date.desc")]);
        let response = Self::authorized(request, credentials).send().await?;
        let items = ensure_success(response).await?.json::<Vec<NewsItem>>().await?;
        Ok(items)
    }

    async fn insert(&self, credentials: &StoreCredentials, item: &NewsItem) -> StoreResult<()> {
        let request = self
            .client
            .post(Self::table_url(credentials)?)
            .header("Prefer", "return=minimal")
            .json(item);
        let response = Self::authorized(request, credentials).send().await?;
        ensure_success(response).await?;
        Ok(())
    }

    async fn delete_by_id(&self, credentials: &StoreCredentials, id: &ItemId) -> StoreResult<()> {
        let filter = format!("eq.{}", id);
        let request = self
            .client
            .delete(Self::table_url(credentials)?)
            .query(&[("id", filter.as_str())]);
        let response = Self::authorized(request, credentials).send().await?;
        ensure_success(response).await?;
        Ok(())
    }

    async fn delete_all(&self, credentials: &StoreCredentials) -> StoreResult<()> {
        // PostgREST refuses unfiltered deletes, so match every row
        let request = self
            .client
            .delete(Self::table_url(credentials)?)
            .query(&[("id", "not.is.null")]);
        let response = Self::authorized(request, credentials).send().await?;
        ensure_success(response).await?;
        Ok(())
    }

    async fn upload(
        &self,
        credentials: &StoreCredentials,
        object_name: &str,
        file: &MediaFile,
    ) -> StoreResult<String> {
        let request = self
            .client
            .post(Self::object_url(credentials, object_name)?)
            .header(CONTENT_TYPE, file.mime_type().as_str())
            .header("x-upsert", "true")
            .body(file.bytes.clone());
        let response = Self::authorized(request, credentials).send().await?;
        ensure_success(response).await?;
        Ok(public_object_url(credentials, object_name))
    }
}
