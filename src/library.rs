//! Media library: the media index, locators and the track catalog loader.
//!
//! The index is queried once per load and the resulting rows are turned into
//! an ordered `Catalog` of `Track`s by `load_catalog`.

mod fs_index;
mod index;
mod loader;
mod locator;
#[cfg(test)]
pub(crate) mod memory;
mod model;

pub use fs_index::FsMediaIndex;
pub use index::*;
pub use loader::{CatalogError, load_catalog};
pub use locator::*;
pub use model::*;
