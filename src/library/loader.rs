use thiserror::Error;
use tracing::{debug, info};

use super::index::{Column, IndexError, IndexQuery, MediaIndex, SortOrder, Value};
use super::locator::{ALBUM_ART_BASE, Locator, SONGS_BASE};
use super::model::{Catalog, Track};

const PROJECTION: [Column; 5] = [
    Column::Id,
    Column::DisplayName,
    Column::Duration,
    Column::Size,
    Column::AlbumId,
];

#[derive(Debug, Error)]
pub enum CatalogError {
    #[error(transparent)]
    Index(#[from] IndexError),
    #[error("media index has no `{0}` column")]
    MissingColumn(&'static str),
    #[error("row {row}: column `{column}` holds an unexpected value")]
    InvalidValue { row: usize, column: &'static str },
}

/// The catalog query: id, name, duration, size and album, newest first.
pub fn catalog_query(collection: Locator) -> IndexQuery {
    IndexQuery {
        collection,
        projection: PROJECTION.to_vec(),
        sort: Some(SortOrder::descending(Column::DateAdded)),
    }
}

/// Display title for a file name, or `None` when it has no suffix to strip.
///
/// A leading dot does not count as a suffix separator.
pub(crate) fn strip_suffix(name: &str) -> Option<&str> {
    match name.rfind('.') {
        Some(i) if i > 0 => Some(&name[..i]),
        _ => None,
    }
}

struct Columns {
    id: usize,
    name: usize,
    duration: usize,
    size: usize,
    album_id: usize,
}

fn integer(row: &[Value], col: usize, column: Column, row_no: usize) -> Result<i64, CatalogError> {
    row.get(col)
        .and_then(Value::as_i64)
        .ok_or(CatalogError::InvalidValue {
            row: row_no,
            column: column.name(),
        })
}

fn text(row: &[Value], col: usize, column: Column, row_no: usize) -> Result<&str, CatalogError> {
    row.get(col)
        .and_then(Value::as_text)
        .ok_or(CatalogError::InvalidValue {
            row: row_no,
            column: column.name(),
        })
}

/// Query the index and build a fresh catalog.
///
/// Any missing column or malformed value aborts the whole load. Rows whose
/// display name has no suffix are skipped.
pub fn load_catalog(index: &dyn MediaIndex, collection: &Locator) -> Result<Catalog, CatalogError> {
    let mut cursor = index.query(&catalog_query(collection.clone()))?;

    let lookup = |column: Column| {
        cursor
            .column_index(column)
            .ok_or(CatalogError::MissingColumn(column.name()))
    };
    let cols = Columns {
        id: lookup(Column::Id)?,
        name: lookup(Column::DisplayName)?,
        duration: lookup(Column::Duration)?,
        size: lookup(Column::Size)?,
        album_id: lookup(Column::AlbumId)?,
    };

    let mut tracks = Vec::new();
    let mut skipped = 0usize;
    let mut row_no = 0usize;

    while let Some(row) = cursor.next_row() {
        let id = integer(row, cols.id, Column::Id, row_no)?.max(0) as u64;
        let name = text(row, cols.name, Column::DisplayName, row_no)?;
        let duration_ms = integer(row, cols.duration, Column::Duration, row_no)?.max(0) as u64;
        let size = integer(row, cols.size, Column::Size, row_no)?.max(0) as u64;
        let album_id = integer(row, cols.album_id, Column::AlbumId, row_no)?.max(0) as u64;
        row_no += 1;

        let Some(title) = strip_suffix(name) else {
            debug!(name, "skipping entry without a file suffix");
            skipped += 1;
            continue;
        };

        tracks.push(Track {
            id,
            locator: Locator::with_appended_id(SONGS_BASE, id),
            title: title.to_string(),
            duration_ms,
            size,
            album_id,
            artwork: Locator::with_appended_id(ALBUM_ART_BASE, album_id),
        });
    }

    info!(tracks = tracks.len(), skipped, "catalog loaded");
    Ok(Catalog::new(tracks))
}
