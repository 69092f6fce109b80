//! Newsdesk - publish, list and retire short news posts
//!
//! Posts are persisted to a remote HTTP store when credentials resolve and to
//! an on-device slot otherwise. Publishing is gated by PIN-derived roles and a
//! per-role quota.

pub mod auth;
pub mod config;
pub mod credentials;
pub mod error;
pub mod logging;
pub mod quota;
pub mod service;
pub mod store;
pub mod types;

// Re-export commonly used types
pub use config::Config;
pub use error::{NewsError, Result, StoreError};
pub use service::publishing::PublicationResult;
pub use service::NewsService;
pub use types::{Draft, ItemId, MediaAttachments, MediaFile, NewsItem, Role};
