//! Transport surfaces: play/pause/seek/skip driven from the UI and mirrored
//! back from the engine.

mod controller;
mod format;
mod view;

pub use controller::{TransportController, TransportCtx};
pub use format::readable_time;
pub use view::{TransportIcon, TransportView};
