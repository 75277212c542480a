//! Playback engine: the capability surface the UI drives, and its rodio
//! implementation running on a dedicated audio thread.

mod queue;
mod rodio_engine;
mod sink;
mod types;
mod worker;

#[cfg(test)]
pub(crate) mod fake;

pub use rodio_engine::RodioEngine;
pub use types::*;

#[cfg(test)]
mod tests;
