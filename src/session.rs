//! Per-session cache of extracted text.
//!
//! Extraction is the slow step of the pipeline, and the interface lets a
//! user convert the same upload several times (preview, pick MP3, then
//! pick DOCX). The cache holds the text of the most recent upload, keyed
//! by the caller's notion of file identity, so repeated conversions skip
//! re-extraction. Uploading a different file replaces the entry; there is
//! exactly one entry and no cross-session sharing.

use crate::config::ConversionConfig;
use crate::pipeline::extract;
use tracing::debug;

/// Holds the most recently extracted text for one user session.
#[derive(Debug, Default)]
pub struct SessionCache {
    entry: Option<(String, String)>,
}

impl SessionCache {
    pub fn new() -> Self {
        Self::default()
    }

    /// Cached text for `key`, if it is the current entry.
    pub fn get(&self, key: &str) -> Option<&str> {
        match &self.entry {
            Some((k, text)) if k == key => Some(text),
            _ => None,
        }
    }

    /// Replace the cache with a new entry.
    pub fn store(&mut self, key: impl Into<String>, text: impl Into<String>) {
        self.entry = Some((key.into(), text.into()));
    }

    /// Drop the current entry.
    pub fn invalidate(&mut self) {
        self.entry = None;
    }
}

/// Extract text from `bytes`, answering from `cache` when `key` matches
/// the current entry.
///
/// The extraction result is cached whatever it is — including the empty
/// string a failed extraction degrades to — matching the original
/// behaviour of caching per upload, not per outcome. Returns the text and
/// whether the cache answered.
pub fn extract_cached(
    cache: &mut SessionCache,
    key: &str,
    bytes: &[u8],
    config: &ConversionConfig,
) -> (String, bool) {
    if let Some(text) = cache.get(key) {
        debug!(key, "extraction answered from session cache");
        return (text.to_string(), true);
    }
    let text = extract::extract_text(bytes, config);
    cache.store(key, text.clone());
    (text, false)
}
