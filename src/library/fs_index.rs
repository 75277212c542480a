use std::collections::HashMap;
use std::fs;
use std::path::{Path, PathBuf};
use std::sync::Mutex;
use std::time::UNIX_EPOCH;

use lofty::prelude::*;
use lofty::probe::Probe;
use tracing::{debug, trace, warn};
use walkdir::WalkDir;

use crate::config::LibrarySettings;

use super::index::{Column, Cursor, IndexError, IndexQuery, MediaIndex, Value, VecCursor};
use super::locator::{ALBUM_ART_BASE, Locator, SONGS_BASE, audio_collection};

const COVER_STEMS: [&str; 4] = ["cover", "folder", "front", "album"];
const COVER_EXTS: [&str; 3] = ["jpg", "jpeg", "png"];

/// Media index over a music directory.
///
/// Every query rescans the tree; ids are assigned in path order so they stay
/// stable while the tree is unchanged.
pub struct FsMediaIndex {
    root: PathBuf,
    settings: LibrarySettings,
    collection: Locator,
    resolved: Mutex<Resolved>,
}

#[derive(Default)]
struct Resolved {
    songs: HashMap<u64, PathBuf>,
    album_dirs: HashMap<u64, PathBuf>,
}

struct IndexedFile {
    id: u64,
    path: PathBuf,
    display_name: String,
    duration_ms: u64,
    size: u64,
    album_id: u64,
    date_added: i64,
}

impl IndexedFile {
    fn value(&self, column: Column) -> Value {
        match column {
            Column::Id => Value::Integer(self.id as i64),
            Column::DisplayName => Value::Text(self.display_name.clone()),
            Column::Duration => Value::Integer(self.duration_ms as i64),
            Column::Size => Value::Integer(self.size as i64),
            Column::AlbumId => Value::Integer(self.album_id as i64),
            Column::DateAdded => Value::Integer(self.date_added),
        }
    }
}

fn is_hidden(path: &Path) -> bool {
    path.file_name()
        .and_then(|s| s.to_str())
        .map(|name| name.starts_with('.'))
        .unwrap_or(false)
}

fn has_listed_extension(path: &Path, settings: &LibrarySettings) -> bool {
    let Some(ext) = path.extension().and_then(|s| s.to_str()) else {
        return false;
    };
    let ext = ext.to_ascii_lowercase();
    settings
        .extensions
        .iter()
        .map(|e| e.trim().trim_start_matches('.').to_ascii_lowercase())
        .any(|e| !e.is_empty() && e == ext)
}

/// Files without a listed extension are still indexed when lofty recognizes
/// their content.
fn is_audio_file(path: &Path, settings: &LibrarySettings) -> bool {
    if has_listed_extension(path, settings) {
        return true;
    }
    Probe::open(path)
        .ok()
        .and_then(|p| p.guess_file_type().ok())
        .and_then(|p| p.file_type())
        .is_some()
}

fn date_added(meta: &fs::Metadata) -> i64 {
    meta.created()
        .or_else(|_| meta.modified())
        .ok()
        .and_then(|t| t.duration_since(UNIX_EPOCH).ok())
        .map(|d| d.as_secs() as i64)
        .unwrap_or(0)
}

fn read_tags(path: &Path) -> (u64, Option<String>) {
    match lofty::read_from_path(path) {
        Ok(tagged) => {
            let duration_ms = tagged.properties().duration().as_millis() as u64;
            let album = tagged
                .primary_tag()
                .or_else(|| tagged.first_tag())
                .and_then(|tag| tag.album().map(|a| a.trim().to_string()))
                .filter(|a| !a.is_empty());
            (duration_ms, album)
        }
        Err(e) => {
            debug!(path = %path.display(), error = %e, "no readable tags");
            (0, None)
        }
    }
}

/// Look for a conventional cover image next to the album's files.
fn find_cover(dir: &Path) -> Option<PathBuf> {
    let entries = fs::read_dir(dir).ok()?;
    let mut candidates: Vec<PathBuf> = entries
        .filter_map(Result::ok)
        .map(|e| e.path())
        .filter(|p| p.is_file())
        .filter(|p| {
            let stem = p
                .file_stem()
                .and_then(|s| s.to_str())
                .map(str::to_ascii_lowercase);
            let ext = p
                .extension()
                .and_then(|s| s.to_str())
                .map(str::to_ascii_lowercase);
            matches!((stem, ext), (Some(s), Some(e))
                if COVER_STEMS.contains(&s.as_str()) && COVER_EXTS.contains(&e.as_str()))
        })
        .collect();
    candidates.sort();
    candidates.into_iter().next()
}

impl FsMediaIndex {
    pub fn new(root: impl Into<PathBuf>, settings: LibrarySettings) -> Self {
        let collection = audio_collection(settings.volume.as_deref());
        Self {
            root: root.into(),
            settings,
            collection,
            resolved: Mutex::new(Resolved::default()),
        }
    }

    /// Collection locator this index answers queries for.
    pub fn collection(&self) -> &Locator {
        &self.collection
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    fn scan(&self) -> Result<Vec<IndexedFile>, IndexError> {
        fs::read_dir(&self.root).map_err(|source| IndexError::Unreadable {
            path: self.root.clone(),
            source,
        })?;

        let settings = &self.settings;
        let mut walker = WalkDir::new(&self.root)
            .follow_links(settings.follow_links)
            .sort_by_file_name();
        if let Some(d) = settings.max_depth {
            walker = walker.max_depth(d);
        }

        let mut files = Vec::new();
        let mut albums: HashMap<String, u64> = HashMap::new();

        for entry in walker
            .into_iter()
            .filter_entry(|e| settings.include_hidden || e.depth() == 0 || !is_hidden(e.path()))
            .filter_map(Result::ok)
        {
            let path = entry.path();
            if !path.is_file() || !is_audio_file(path, settings) {
                continue;
            }
            let meta = match entry.metadata() {
                Ok(m) => m,
                Err(e) => {
                    warn!(path = %path.display(), error = %e, "skipping unreadable file");
                    continue;
                }
            };

            let (duration_ms, album) = read_tags(path);
            let album_key = album.unwrap_or_else(|| {
                path.parent()
                    .map(|p| p.display().to_string())
                    .unwrap_or_default()
            });
            let next_album = albums.len() as u64 + 1;
            let album_id = *albums.entry(album_key).or_insert(next_album);

            files.push(IndexedFile {
                id: files.len() as u64 + 1,
                path: path.to_path_buf(),
                display_name: entry.file_name().to_string_lossy().into_owned(),
                duration_ms,
                size: meta.len(),
                album_id,
                date_added: date_added(&meta),
            });
        }

        Ok(files)
    }

    fn remember(&self, files: &[IndexedFile]) {
        let mut resolved = match self.resolved.lock() {
            Ok(r) => r,
            Err(poisoned) => poisoned.into_inner(),
        };
        resolved.songs = files.iter().map(|f| (f.id, f.path.clone())).collect();
        resolved.album_dirs.clear();
        for f in files {
            if let Some(dir) = f.path.parent() {
                resolved
                    .album_dirs
                    .entry(f.album_id)
                    .or_insert_with(|| dir.to_path_buf());
            }
        }
    }
}

impl MediaIndex for FsMediaIndex {
    fn query(&self, query: &IndexQuery) -> Result<Box<dyn Cursor + '_>, IndexError> {
        if query.collection != self.collection {
            return Err(IndexError::UnknownCollection(query.collection.clone()));
        }

        let mut files = self.scan()?;
        if let Some(order) = query.sort {
            // Stable: equal keys keep path order.
            files.sort_by(|a, b| {
                let (a, b) = if order.descending { (b, a) } else { (a, b) };
                a.value(order.column)
                    .as_i64()
                    .cmp(&b.value(order.column).as_i64())
            });
        }
        self.remember(&files);
        debug!(root = %self.root.display(), rows = files.len(), "media index query");

        let rows = files
            .iter()
            .map(|f| query.projection.iter().map(|c| f.value(*c)).collect())
            .collect();
        let root = self.root.display().to_string();
        Ok(Box::new(
            VecCursor::new(query.projection.clone(), rows)
                .on_release(move || trace!(root = %root, "cursor released")),
        ))
    }

    fn resolve(&self, locator: &Locator) -> Option<PathBuf> {
        let (base, id) = locator.split_id()?;
        let resolved = self.resolved.lock().ok()?;
        match base {
            SONGS_BASE => resolved.songs.get(&id).cloned(),
            ALBUM_ART_BASE => resolved.album_dirs.get(&id).and_then(|d| find_cover(d)),
            _ => None,
        }
    }
}
