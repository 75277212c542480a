//! The media index seam: queries, cursors and artwork resolution.
//!
//! A `MediaIndex` answers a projection + sort query with a forward-only
//! `Cursor`. Cursors hold index resources until dropped, so callers keep them
//! scoped to the read loop.

use std::path::PathBuf;

use thiserror::Error;

use super::locator::{ALBUM_ART_BASE, Locator};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Column {
    Id,
    DisplayName,
    Duration,
    Size,
    AlbumId,
    DateAdded,
}

impl Column {
    pub const fn name(self) -> &'static str {
        match self {
            Column::Id => "_id",
            Column::DisplayName => "_display_name",
            Column::Duration => "duration",
            Column::Size => "_size",
            Column::AlbumId => "album_id",
            Column::DateAdded => "date_added",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Value {
    Null,
    Integer(i64),
    Text(String),
}

impl Value {
    /// Numeric view of the value. `Null` reads as 0.
    pub fn as_i64(&self) -> Option<i64> {
        match self {
            Value::Null => Some(0),
            Value::Integer(v) => Some(*v),
            Value::Text(s) => s.trim().parse().ok(),
        }
    }

    pub fn as_text(&self) -> Option<&str> {
        match self {
            Value::Text(s) => Some(s),
            _ => None,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SortOrder {
    pub column: Column,
    pub descending: bool,
}

impl SortOrder {
    pub fn descending(column: Column) -> Self {
        Self {
            column,
            descending: true,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct IndexQuery {
    pub collection: Locator,
    pub projection: Vec<Column>,
    pub sort: Option<SortOrder>,
}

#[derive(Debug, Error)]
pub enum IndexError {
    #[error("unknown media collection `{0}`")]
    UnknownCollection(Locator),
    #[error("media root {} is not readable: {source}", path.display())]
    Unreadable {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
}

/// Forward-only view over query results.
pub trait Cursor {
    /// Columns present in each row, in row order.
    fn columns(&self) -> &[Column];

    /// Advance to the next row.
    fn next_row(&mut self) -> Option<&[Value]>;

    fn column_index(&self, column: Column) -> Option<usize> {
        self.columns().iter().position(|c| *c == column)
    }
}

pub trait MediaIndex: Send + Sync {
    fn query(&self, query: &IndexQuery) -> Result<Box<dyn Cursor + '_>, IndexError>;

    /// Map a song or album-art locator to a file on disk.
    fn resolve(&self, locator: &Locator) -> Option<PathBuf>;
}

/// Cursor over materialized rows. Runs its release hook on drop.
pub struct VecCursor {
    columns: Vec<Column>,
    rows: std::vec::IntoIter<Vec<Value>>,
    current: Option<Vec<Value>>,
    on_release: Option<Box<dyn FnOnce() + Send>>,
}

impl VecCursor {
    pub fn new(columns: Vec<Column>, rows: Vec<Vec<Value>>) -> Self {
        Self {
            columns,
            rows: rows.into_iter(),
            current: None,
            on_release: None,
        }
    }

    pub fn on_release(mut self, hook: impl FnOnce() + Send + 'static) -> Self {
        self.on_release = Some(Box::new(hook));
        self
    }
}

impl Cursor for VecCursor {
    fn columns(&self) -> &[Column] {
        &self.columns
    }

    fn next_row(&mut self) -> Option<&[Value]> {
        self.current = self.rows.next();
        self.current.as_deref()
    }
}

impl Drop for VecCursor {
    fn drop(&mut self) {
        if let Some(hook) = self.on_release.take() {
            hook();
        }
    }
}

/// What the now-playing view can show for an album-art locator.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Artwork {
    Image(PathBuf),
    Placeholder,
}

impl Artwork {
    pub fn label(&self) -> String {
        match self {
            Artwork::Image(path) => path
                .file_name()
                .map(|n| n.to_string_lossy().into_owned())
                .unwrap_or_else(|| path.display().to_string()),
            Artwork::Placeholder => "default album art".to_string(),
        }
    }
}

/// Resolve album art, falling back to the placeholder.
pub fn artwork_for(index: &dyn MediaIndex, locator: &Locator) -> Artwork {
    let is_art = locator
        .split_id()
        .map(|(base, _)| base == ALBUM_ART_BASE)
        .unwrap_or(false);
    if !is_art {
        return Artwork::Placeholder;
    }
    match index.resolve(locator) {
        Some(path) if path.is_file() => Artwork::Image(path),
        _ => Artwork::Placeholder,
    }
}
