//! The shared playback slot: one active engine for the whole app, observed by
//! every transport surface.

use tracing::{debug, info};

use crate::engine::PlaybackEngine;

/// A view that mirrors transport state.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum Surface {
    MiniBar,
    Player,
}

/// Holds the active engine. The app owns it and hands it to surfaces on each
/// call; there is exactly one writer.
#[derive(Default)]
pub struct SharedPlayback {
    engine: Option<Box<dyn PlaybackEngine>>,
    subscribers: Vec<Surface>,
}

impl SharedPlayback {
    pub fn new() -> Self {
        Self::default()
    }

    /// Install `engine` as the active one, releasing any previous engine.
    pub fn publish(&mut self, engine: Box<dyn PlaybackEngine>) {
        self.release();
        self.engine = Some(engine);
        info!("playback engine published");
    }

    pub fn engine(&self) -> Option<&dyn PlaybackEngine> {
        self.engine.as_deref()
    }

    pub fn engine_mut(&mut self) -> Option<&mut (dyn PlaybackEngine + 'static)> {
        self.engine.as_deref_mut()
    }

    pub fn is_playing(&self) -> bool {
        self.engine().is_some_and(|e| e.is_playing())
    }

    pub fn subscribe(&mut self, surface: Surface) {
        if !self.subscribers.contains(&surface) {
            debug!(?surface, "surface subscribed");
            self.subscribers.push(surface);
        }
    }

    pub fn unsubscribe(&mut self, surface: Surface) {
        self.subscribers.retain(|s| *s != surface);
    }

    pub fn subscribers(&self) -> &[Surface] {
        &self.subscribers
    }

    /// Stop if playing, then release the engine. Returns whether an engine was
    /// released; later calls do nothing.
    pub fn release(&mut self) -> bool {
        let Some(mut engine) = self.engine.take() else {
            return false;
        };
        if engine.is_playing() {
            engine.stop();
        }
        engine.release();
        info!("playback engine released");
        true
    }
}

impl Drop for SharedPlayback {
    fn drop(&mut self) {
        self.release();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::engine::fake::{Call, FakeEngine};
    use crate::engine::{MediaItem, PlaybackEngine};
    use crate::library::Locator;

    fn one_item() -> Vec<MediaItem> {
        vec![MediaItem {
            locator: Locator::new("media://external/audio/media/1"),
            title: "one".into(),
            artwork: Locator::new("media://external/audio/albumart/1"),
            duration_ms: 1000,
        }]
    }

    #[test]
    fn release_stops_a_playing_engine_first_and_runs_once() {
        let fake = FakeEngine::new();
        let mut engine = fake.clone();
        engine.load(one_item(), 0);
        engine.play();
        fake.clear_calls();

        let mut shared = SharedPlayback::new();
        shared.publish(Box::new(engine));
        assert!(shared.release());
        assert!(!shared.release());
        drop(shared);

        assert_eq!(fake.calls(), vec![Call::Stop, Call::Release]);
    }

    #[test]
    fn release_skips_stop_when_idle() {
        let fake = FakeEngine::new();
        let mut shared = SharedPlayback::new();
        shared.publish(Box::new(fake.clone()));
        drop(shared);
        assert_eq!(fake.calls(), vec![Call::Release]);
    }

    #[test]
    fn republishing_releases_the_previous_engine() {
        let first = FakeEngine::new();
        let mut shared = SharedPlayback::new();
        shared.publish(Box::new(first.clone()));
        shared.publish(Box::new(FakeEngine::new()));
        assert!(first.released());
    }

    #[test]
    fn subscribers_are_unique() {
        let mut shared = SharedPlayback::new();
        shared.subscribe(Surface::Player);
        shared.subscribe(Surface::Player);
        shared.subscribe(Surface::MiniBar);
        shared.unsubscribe(Surface::Player);
        assert_eq!(shared.subscribers(), &[Surface::MiniBar]);
    }
}
