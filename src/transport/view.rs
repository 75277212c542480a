//! Widget model mirrored by a transport surface.

use std::time::{Duration, Instant};

use crate::library::Artwork;

use super::format::readable_time;

/// The glyph on the play/pause control. `Play` is shown while paused.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum TransportIcon {
    #[default]
    Play,
    Pause,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct SeekBar {
    pub progress: u64,
    pub max: u64,
}

impl SeekBar {
    pub fn ratio(&self) -> f64 {
        if self.max == 0 {
            0.0
        } else {
            (self.progress.min(self.max) as f64) / (self.max as f64)
        }
    }
}

/// Artwork rotation: running since `since`, plus what was accumulated
/// before the last pause.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Spin {
    since: Option<Instant>,
    carried: Duration,
}

impl Spin {
    pub fn is_spinning(&self) -> bool {
        self.since.is_some()
    }

    pub fn start(&mut self) {
        if self.since.is_none() {
            self.since = Some(Instant::now());
        }
    }

    pub fn restart(&mut self) {
        self.carried = Duration::ZERO;
        self.since = Some(Instant::now());
    }

    pub fn stop(&mut self) {
        if let Some(since) = self.since.take() {
            self.carried += since.elapsed();
        }
    }

    /// Fraction of a revolution in `[0, 1)` for the given period.
    pub fn phase(&self, period: Duration) -> f64 {
        let period_ms = period.as_millis().max(1);
        let turned = self.carried + self.since.map_or(Duration::ZERO, |s| s.elapsed());
        (turned.as_millis() % period_ms) as f64 / period_ms as f64
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct TransportView {
    pub title: String,
    pub artwork: Artwork,
    pub position_label: String,
    pub duration_label: String,
    pub seek: SeekBar,
    pub icon: TransportIcon,
    pub spin: Spin,
}

impl Default for TransportView {
    fn default() -> Self {
        Self {
            title: String::new(),
            artwork: Artwork::Placeholder,
            position_label: readable_time(0),
            duration_label: readable_time(0),
            seek: SeekBar::default(),
            icon: TransportIcon::Play,
            spin: Spin::default(),
        }
    }
}

impl TransportView {
    pub fn set_position(&mut self, position_ms: u64) {
        self.position_label = readable_time(position_ms);
        self.seek.progress = position_ms;
    }

    pub fn set_duration(&mut self, duration_ms: u64) {
        self.duration_label = readable_time(duration_ms);
        self.seek.max = duration_ms;
    }
}
