//! Resource locators for songs and album art.
//!
//! A locator is a URI-like string made of a base collection plus a numeric
//! id, e.g. `media://external/audio/media/42`.

use std::fmt;

/// Base collection used to build playable song locators.
pub const SONGS_BASE: &str = "media://external/audio/media";
/// Base collection used to build album-art locators.
pub const ALBUM_ART_BASE: &str = "media://external/audio/albumart";

#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct Locator(String);

impl Locator {
    pub fn new(raw: impl Into<String>) -> Self {
        Self(raw.into())
    }

    /// Append a numeric id as the last path segment.
    pub fn with_appended_id(base: &str, id: u64) -> Self {
        Self(format!("{}/{}", base.trim_end_matches('/'), id))
    }

    /// Split into `(base, id)` when the last segment is numeric.
    pub fn split_id(&self) -> Option<(&str, u64)> {
        let (base, id) = self.0.rsplit_once('/')?;
        let id = id.parse().ok()?;
        Some((base, id))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for Locator {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Collection the catalog query runs against.
///
/// With a storage volume configured the collection is scoped to that volume;
/// otherwise the legacy fixed collection is used.
pub fn audio_collection(volume: Option<&str>) -> Locator {
    match volume.map(str::trim).filter(|v| !v.is_empty()) {
        Some(v) => Locator::new(format!("media://{v}/audio/media")),
        None => Locator::new(SONGS_BASE),
    }
}
