//! Application module: the single-threaded actor behind the TUI.
//!
//! `App` (in `app::model`) owns the catalog, the screen stack, both transport
//! surfaces and the shared playback slot. Every state change goes through
//! `App::handle`, fed from one ordered `UiEvent` queue.

mod dispatch;
mod event;
mod model;

pub use event::*;
pub use model::*;
