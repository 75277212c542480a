//! Engine-facing types: queue items, events, the engine trait and errors.

use std::path::PathBuf;

use thiserror::Error;

use crate::library::{Locator, Track};

/// `seek_to_previous` restarts the current item past this position.
pub const RESTART_THRESHOLD_MS: u64 = 3000;

/// A queue entry with the metadata the views display.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MediaItem {
    pub locator: Locator,
    pub title: String,
    pub artwork: Locator,
    pub duration_ms: u64,
}

impl From<&Track> for MediaItem {
    fn from(track: &Track) -> Self {
        Self {
            locator: track.locator.clone(),
            title: track.title.clone(),
            artwork: track.artwork.clone(),
            duration_ms: track.duration_ms,
        }
    }
}

/// Why the current item changed.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TransitionReason {
    /// The previous item finished.
    Auto,
    /// The single queued item finished and started over.
    Repeat,
    /// Explicit next/previous.
    Seek,
    /// A new queue was loaded.
    PlaylistChanged,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum EngineState {
    #[default]
    Idle,
    Buffering,
    Ready,
    Ended,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum EngineEvent {
    ItemTransitioned {
        item: MediaItem,
        reason: TransitionReason,
    },
    StateChanged {
        state: EngineState,
    },
}

/// Transport capability consumed by the UI.
///
/// The queue always repeats (wraps around at both ends). Positions and
/// durations are in milliseconds; an unknown duration reads as 0.
pub trait PlaybackEngine {
    /// Replace the queue and make `start_index` current.
    fn load(&mut self, items: Vec<MediaItem>, start_index: usize);
    fn play(&mut self);
    fn pause(&mut self);
    fn stop(&mut self);
    fn seek_to(&mut self, position_ms: u64);
    fn seek_to_next(&mut self);
    fn seek_to_previous(&mut self);
    fn has_next(&self) -> bool;
    fn has_previous(&self) -> bool;
    fn is_playing(&self) -> bool;
    fn current_position(&self) -> u64;
    fn duration(&self) -> u64;
    fn current_item(&self) -> Option<MediaItem>;
    fn item_count(&self) -> usize;
    /// Free every resource. Further calls are no-ops.
    fn release(&mut self);
}

#[derive(Debug, Error)]
pub enum EngineError {
    #[error("no audio output device: {0}")]
    NoOutputDevice(String),
    #[error("failed to start the audio thread: {0}")]
    Spawn(#[source] std::io::Error),
    #[error("audio thread exited")]
    WorkerGone,
    #[error("failed to open {}: {source}", path.display())]
    Open {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("failed to decode {}: {message}", path.display())]
    Decode { path: PathBuf, message: String },
    #[error("no file behind {0}")]
    Unresolved(Locator),
}
