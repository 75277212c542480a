use crate::library::Locator;

/// Opaque numeric key assigned by the media index.
pub type MediaId = u64;

/// A playable song as shown in the library.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Track {
    pub id: MediaId,
    pub locator: Locator,
    /// Display name with its file-name suffix removed.
    pub title: String,
    pub duration_ms: u64,
    pub size: u64,
    pub album_id: u64,
    pub artwork: Locator,
}

/// Ordered list of tracks, newest-added first.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Catalog {
    tracks: Vec<Track>,
}

impl Catalog {
    pub fn new(tracks: Vec<Track>) -> Self {
        Self { tracks }
    }

    pub fn get(&self, index: usize) -> Option<&Track> {
        self.tracks.get(index)
    }

    pub fn len(&self) -> usize {
        self.tracks.len()
    }

    pub fn is_empty(&self) -> bool {
        self.tracks.is_empty()
    }

    pub fn iter(&self) -> std::slice::Iter<'_, Track> {
        self.tracks.iter()
    }
}
