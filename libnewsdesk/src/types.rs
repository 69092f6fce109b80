//! Core types for Newsdesk

use std::fmt;
use std::path::Path;
use std::str::FromStr;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::error::{NewsError, Result};

/// Publisher role resolved from a PIN
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    Admin,
    User,
}

impl Role {
    /// Fixed author name stamped on every item published under this role
    pub fn display_name(&self) -> &'static str {
        match self {
            Role::Admin => "Admin",
            Role::User => "User",
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Role::Admin => "admin",
            Role::User => "user",
        }
    }
}

impl fmt::Display for Role {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Store-assigned item identifier
///
/// Remote rows carry numeric ids while locally stored items carry text ids,
/// so both shapes are accepted and equality is decided on the textual form.
#[derive(Debug, Clone, Serialize, Deserialize, Eq)]
#[serde(untagged)]
pub enum ItemId {
    Number(i64),
    Text(String),
}

impl ItemId {
    pub fn as_text(&self) -> String {
        self.to_string()
    }
}

impl PartialEq for ItemId {
    fn eq(&self, other: &Self) -> bool {
        self.as_text() == other.as_text()
    }
}

impl fmt::Display for ItemId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ItemId::Number(n) => write!(f, "{}", n),
            ItemId::Text(s) => f.write_str(s),
        }
    }
}

impl From<i64> for ItemId {
    fn from(n: i64) -> Self {
        ItemId::Number(n)
    }
}

impl From<String> for ItemId {
    fn from(s: String) -> Self {
        ItemId::Text(s)
    }
}

impl From<&str> for ItemId {
    fn from(s: &str) -> Self {
        ItemId::Text(s.to_string())
    }
}

impl FromStr for ItemId {
    type Err = NewsError;

    fn from_str(s: &str) -> Result<Self> {
        let trimmed = s.trim();
        if trimmed.is_empty() {
            return Err(NewsError::InvalidInput("Item id cannot be empty".to_string()));
        }
        // Kept verbatim: "007" must not collapse to 7
        Ok(ItemId::Text(trimmed.to_string()))
    }
}

/// A published news post
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct NewsItem {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub id: Option<ItemId>,
    pub title: String,
    pub content: String,
    pub author: String,
    pub date: DateTime<Utc>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub image_url: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub video_url: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub link_url: Option<String>,
    pub publisher_role: Role,
}

/// Caller-supplied post awaiting validation, authentication and persistence
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Draft {
    pub title: String,
    pub content: String,
    pub link_url: Option<String>,
}

impl Draft {
    pub fn new(title: impl Into<String>, content: impl Into<String>) -> Self {
        Self {
            title: title.into(),
            content: content.into(),
            link_url: None,
        }
    }

    pub fn with_link(mut self, link: impl Into<String>) -> Self {
        self.link_url = Some(link.into());
        self
    }
}

// ============================================================================
// Media Types
// ============================================================================

/// Media MIME types recognised for uploads
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
pub enum MediaMimeType {
    Jpeg,
    Png,
    Gif,
    WebP,
    Mp4,
    WebM,
    QuickTime,
    Unknown,
}

impl MediaMimeType {
    /// Detect MIME type from file extension
    pub fn from_extension(ext: &str) -> Self {
        match ext.to_lowercase().as_str() {
            "jpg" | "jpeg" => Self::Jpeg,
            "png" => Self::Png,
            "gif" => Self::Gif,
            "webp" => Self::WebP,
            "mp4" => Self::Mp4,
            "webm" => Self::WebM,
            "mov" => Self::QuickTime,
            _ => Self::Unknown,
        }
    }

    /// Get the MIME type string representation
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Jpeg => "image/jpeg",
            Self::Png => "image/png",
            Self::Gif => "image/gif",
            Self::WebP => "image/webp",
            Self::Mp4 => "video/mp4",
            Self::WebM => "video/webm",
            Self::QuickTime => "video/quicktime",
            Self::Unknown => "application/octet-stream",
        }
    }

    pub fn is_video(&self) -> bool {
        matches!(self, Self::Mp4 | Self::WebM | Self::QuickTime)
    }
}

impl fmt::Display for MediaMimeType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// A media file selected for upload alongside a post
#[derive(Clone, PartialEq)]
pub struct MediaFile {
    /// Original file name, used only for its extension
    pub file_name: String,
    pub bytes: Vec<u8>,
}

impl fmt::Debug for MediaFile {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("MediaFile")
            .field("file_name", &self.file_name)
            .field("len", &self.bytes.len())
            .finish()
    }
}

impl MediaFile {
    pub fn new(file_name: impl Into<String>, bytes: Vec<u8>) -> Self {
        Self {
            file_name: file_name.into(),
            bytes,
        }
    }

    /// Read a media file from disk
    pub async fn from_path(path: &Path) -> Result<Self> {
        let bytes = tokio::fs::read(path).await.map_err(|e| {
            NewsError::InvalidInput(format!("Failed to read media file {}: {}", path.display(), e))
        })?;
        let file_name = path
            .file_name()
            .map(|n| n.to_string_lossy().into_owned())
            .ok_or_else(|| {
                NewsError::InvalidInput(format!("Not a file path: {}", path.display()))
            })?;
        Ok(Self { file_name, bytes })
    }

    /// Extension exactly as written in the original file name
    pub fn original_extension(&self) -> Option<&str> {
        Path::new(&self.file_name)
            .extension()
            .and_then(|e| e.to_str())
            .filter(|e| !e.is_empty())
    }

    /// Lowercased extension, for type detection
    pub fn extension(&self) -> Option<String> {
        self.original_extension().map(str::to_lowercase)
    }

    pub fn mime_type(&self) -> MediaMimeType {
        self.extension()
            .map(|ext| MediaMimeType::from_extension(&ext))
            .unwrap_or(MediaMimeType::Unknown)
    }
}

/// Optional media accompanying a draft
#[derive(Debug, Clone, Default)]
pub struct MediaAttachments {
    pub image: Option<MediaFile>,
    pub video: Option<MediaFile>,
}

impl MediaAttachments {
    pub fn none() -> Self {
        Self::default()
    }

    pub fn is_empty(&self) -> bool {
        self.image.is_none() && self.video.is_none()
    }
}
