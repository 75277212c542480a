//! In-memory media index used by tests.

use std::collections::HashSet;
use std::path::PathBuf;
use std::sync::Arc;
use std::sync::atomic::{AtomicUsize, Ordering};

use super::index::{Column, Cursor, IndexError, IndexQuery, MediaIndex, Value, VecCursor};
use super::locator::{ALBUM_ART_BASE, Locator, SONGS_BASE, audio_collection};

#[derive(Debug, Clone)]
pub(crate) struct MemoryRow {
    pub id: i64,
    pub name: String,
    pub duration: i64,
    pub size: i64,
    pub album_id: i64,
    pub date_added: i64,
}

impl MemoryRow {
    fn value(&self, column: Column) -> Value {
        match column {
            Column::Id => Value::Integer(self.id),
            Column::DisplayName => Value::Text(self.name.clone()),
            Column::Duration => Value::Integer(self.duration),
            Column::Size => Value::Integer(self.size),
            Column::AlbumId => Value::Integer(self.album_id),
            Column::DateAdded => Value::Integer(self.date_added),
        }
    }
}

/// Row with defaults derived from the id.
pub(crate) fn row(id: i64, name: &str, date_added: i64) -> MemoryRow {
    MemoryRow {
        id,
        name: name.to_string(),
        duration: 60_000 * id,
        size: 1024 * id,
        album_id: id % 3 + 1,
        date_added,
    }
}

pub(crate) struct MemoryIndex {
    rows: Vec<MemoryRow>,
    missing: Vec<Column>,
    overrides: Vec<(usize, Column, Value)>,
    covers: HashSet<u64>,
    released: Arc<AtomicUsize>,
    queries: AtomicUsize,
}

impl MemoryIndex {
    pub fn new(rows: Vec<MemoryRow>) -> Self {
        Self {
            rows,
            missing: Vec::new(),
            overrides: Vec::new(),
            covers: HashSet::new(),
            released: Arc::new(AtomicUsize::new(0)),
            queries: AtomicUsize::new(0),
        }
    }

    /// Pretend the index does not provide `column`.
    pub fn without_column(mut self, column: Column) -> Self {
        self.missing.push(column);
        self
    }

    /// Replace one cell of the row at `position` in query order.
    pub fn with_value(mut self, position: usize, column: Column, value: Value) -> Self {
        self.overrides.push((position, column, value));
        self
    }

    pub fn with_cover(mut self, album_id: u64) -> Self {
        self.covers.insert(album_id);
        self
    }

    pub fn released(&self) -> usize {
        self.released.load(Ordering::SeqCst)
    }

    pub fn queries(&self) -> usize {
        self.queries.load(Ordering::SeqCst)
    }
}

impl MediaIndex for MemoryIndex {
    fn query(&self, query: &IndexQuery) -> Result<Box<dyn Cursor + '_>, IndexError> {
        if query.collection != audio_collection(None) {
            return Err(IndexError::UnknownCollection(query.collection.clone()));
        }
        self.queries.fetch_add(1, Ordering::SeqCst);

        let mut rows = self.rows.clone();
        if let Some(order) = query.sort {
            rows.sort_by_key(|r| r.value(order.column).as_i64());
            if order.descending {
                rows.reverse();
            }
        }

        let columns: Vec<Column> = query
            .projection
            .iter()
            .copied()
            .filter(|c| !self.missing.contains(c))
            .collect();
        let values = rows
            .iter()
            .enumerate()
            .map(|(pos, r)| {
                columns
                    .iter()
                    .map(|c| {
                        self.overrides
                            .iter()
                            .find(|(p, col, _)| *p == pos && col == c)
                            .map(|(_, _, v)| v.clone())
                            .unwrap_or_else(|| r.value(*c))
                    })
                    .collect()
            })
            .collect();

        let released = self.released.clone();
        Ok(Box::new(VecCursor::new(columns, values).on_release(move || {
            released.fetch_add(1, Ordering::SeqCst);
        })))
    }

    fn resolve(&self, locator: &Locator) -> Option<PathBuf> {
        let (base, id) = locator.split_id()?;
        match base {
            SONGS_BASE => Some(PathBuf::from(format!("/music/{id}.mp3"))),
            ALBUM_ART_BASE if self.covers.contains(&id) => {
                Some(PathBuf::from(format!("/music/covers/{id}.jpg")))
            }
            _ => None,
        }
    }
}
