//! Queue bookkeeping with repeat-all wrapping.

use super::types::{MediaItem, RESTART_THRESHOLD_MS};

#[derive(Debug, Clone, Default)]
pub(crate) struct PlayQueue {
    items: Vec<MediaItem>,
    index: Option<usize>,
}

/// What `seek_to_previous` should do.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum Previous {
    Restart,
    Move(usize),
}

impl PlayQueue {
    /// Replace the items; `start` is clamped into range.
    pub fn replace(&mut self, items: Vec<MediaItem>, start: usize) -> Option<usize> {
        self.index = if items.is_empty() {
            None
        } else {
            Some(start.min(items.len() - 1))
        };
        self.items = items;
        self.index
    }

    pub fn len(&self) -> usize {
        self.items.len()
    }

    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    pub fn index(&self) -> Option<usize> {
        self.index
    }

    pub fn set_index(&mut self, index: usize) {
        if index < self.items.len() {
            self.index = Some(index);
        }
    }

    pub fn current(&self) -> Option<&MediaItem> {
        self.index.and_then(|i| self.items.get(i))
    }

    pub fn next_index(&self) -> Option<usize> {
        if self.items.is_empty() {
            return None;
        }
        Some(match self.index {
            Some(i) => (i + 1) % self.items.len(),
            None => 0,
        })
    }

    pub fn previous_index(&self) -> Option<usize> {
        if self.items.is_empty() {
            return None;
        }
        Some(match self.index {
            Some(0) | None => self.items.len() - 1,
            Some(i) => i - 1,
        })
    }

    /// Past the restart threshold the current item starts over instead.
    pub fn previous_target(&self, position_ms: u64) -> Option<Previous> {
        if self.index.is_some() && position_ms > RESTART_THRESHOLD_MS {
            return Some(Previous::Restart);
        }
        self.previous_index().map(Previous::Move)
    }
}
