//! Draft validation and normalization
//!
//! Runs before any I/O: a draft that fails here never reaches the store.

use secrecy::{ExposeSecret, SecretString};

use crate::error::{NewsError, Result};
use crate::types::Draft;

/// Reject drafts with an empty title, content or PIN (after trimming)
pub fn validate_draft(draft: &Draft, secret: &SecretString) -> Result<()> {
    let mut missing = Vec::new();
    if draft.title.trim().is_empty() {
        missing.push("title");
    }
    if draft.content.trim().is_empty() {
        missing.push("content");
    }
    if secret.expose_secret().trim().is_empty() {
        missing.push("PIN");
    }

    if missing.is_empty() {
        Ok(())
    } else {
        Err(NewsError::Validation(format!(
            "Required field(s) empty: {}",
            missing.join(", ")
        )))
    }
}

/// Normalize an optional link so it always carries an explicit scheme
///
/// Blank links become `None`; links without `http://` or `https://` get
/// `https://` prepended.
pub fn normalize_link(link: Option<&str>) -> Option<String> {
    let link = link?.trim();
    if link.is_empty() {
        return None;
    }
    let lower = link.to_ascii_lowercase();
    if lower.starts_with("http://") || lower.starts_with("https://") {
        Some(link.to_string())
    } else {
        Some(format!("https://{}", link))
    }
}
