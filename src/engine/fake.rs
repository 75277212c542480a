//! In-memory engine for tests. Mirrors the audio thread's queue and event
//! ordering without touching an output device.

use std::cell::RefCell;
use std::rc::Rc;

use super::queue::{PlayQueue, Previous};
use super::types::{EngineEvent, EngineState, MediaItem, PlaybackEngine, TransitionReason};

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Call {
    Load { len: usize, start: usize },
    Play,
    Pause,
    Stop,
    SeekTo(u64),
    Next,
    Previous,
    Release,
}

#[derive(Debug, Default)]
pub struct FakeState {
    queue: PlayQueue,
    playing: bool,
    position_ms: u64,
    state: EngineState,
    released: bool,
    calls: Vec<Call>,
    events: Vec<EngineEvent>,
}

impl FakeState {
    fn set_state(&mut self, state: EngineState) {
        if self.state != state {
            self.state = state;
            self.events.push(EngineEvent::StateChanged { state });
        }
    }

    fn transition(&mut self, index: usize, reason: TransitionReason) {
        self.queue.set_index(index);
        self.position_ms = 0;
        if let Some(item) = self.queue.current().cloned() {
            self.events.push(EngineEvent::ItemTransitioned { item, reason });
        }
        self.set_state(EngineState::Buffering);
        self.set_state(EngineState::Ready);
    }

    fn duration(&self) -> u64 {
        self.queue.current().map_or(0, |i| i.duration_ms)
    }
}

/// Cloning shares state, so a test can keep a handle after boxing the engine.
#[derive(Debug, Clone, Default)]
pub struct FakeEngine {
    state: Rc<RefCell<FakeState>>,
}

impl FakeEngine {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn calls(&self) -> Vec<Call> {
        self.state.borrow().calls.clone()
    }

    pub fn clear_calls(&self) {
        self.state.borrow_mut().calls.clear();
    }

    pub fn take_events(&self) -> Vec<EngineEvent> {
        std::mem::take(&mut self.state.borrow_mut().events)
    }

    pub fn set_position(&self, position_ms: u64) {
        self.state.borrow_mut().position_ms = position_ms;
    }

    pub fn released(&self) -> bool {
        self.state.borrow().released
    }

    /// Simulate the current item running out.
    pub fn finish_current(&self) {
        let mut s = self.state.borrow_mut();
        match s.queue.next_index() {
            Some(i) => {
                let reason = if Some(i) == s.queue.index() {
                    TransitionReason::Repeat
                } else {
                    TransitionReason::Auto
                };
                s.transition(i, reason);
            }
            None => {
                s.playing = false;
                s.set_state(EngineState::Ended);
            }
        }
    }

    fn record(&self, call: Call) {
        self.state.borrow_mut().calls.push(call);
    }
}

impl PlaybackEngine for FakeEngine {
    fn load(&mut self, items: Vec<MediaItem>, start_index: usize) {
        self.record(Call::Load {
            len: items.len(),
            start: start_index,
        });
        let mut s = self.state.borrow_mut();
        match s.queue.replace(items, start_index) {
            Some(i) => s.transition(i, TransitionReason::PlaylistChanged),
            None => {
                s.playing = false;
                s.position_ms = 0;
                s.set_state(EngineState::Ended);
            }
        }
    }

    fn play(&mut self) {
        self.record(Call::Play);
        let mut s = self.state.borrow_mut();
        if s.queue.is_empty() || s.playing {
            return;
        }
        s.playing = true;
        if s.state != EngineState::Ready {
            s.set_state(EngineState::Buffering);
            s.set_state(EngineState::Ready);
        }
    }

    fn pause(&mut self) {
        self.record(Call::Pause);
        self.state.borrow_mut().playing = false;
    }

    fn stop(&mut self) {
        self.record(Call::Stop);
        let mut s = self.state.borrow_mut();
        s.playing = false;
        s.position_ms = 0;
        s.set_state(EngineState::Idle);
    }

    fn seek_to(&mut self, position_ms: u64) {
        self.record(Call::SeekTo(position_ms));
        let mut s = self.state.borrow_mut();
        if s.queue.current().is_some() {
            let total = s.duration();
            s.position_ms = position_ms.min(total);
        }
    }

    fn seek_to_next(&mut self) {
        self.record(Call::Next);
        let mut s = self.state.borrow_mut();
        if let Some(i) = s.queue.next_index() {
            s.transition(i, TransitionReason::Seek);
        }
    }

    fn seek_to_previous(&mut self) {
        self.record(Call::Previous);
        let mut s = self.state.borrow_mut();
        let position_ms = s.position_ms;
        match s.queue.previous_target(position_ms) {
            Some(Previous::Restart) => s.position_ms = 0,
            Some(Previous::Move(i)) => s.transition(i, TransitionReason::Seek),
            None => {}
        }
    }

    fn has_next(&self) -> bool {
        !self.state.borrow().queue.is_empty()
    }

    fn has_previous(&self) -> bool {
        !self.state.borrow().queue.is_empty()
    }

    fn is_playing(&self) -> bool {
        self.state.borrow().playing
    }

    fn current_position(&self) -> u64 {
        self.state.borrow().position_ms
    }

    fn duration(&self) -> u64 {
        self.state.borrow().duration()
    }

    fn current_item(&self) -> Option<MediaItem> {
        self.state.borrow().queue.current().cloned()
    }

    fn item_count(&self) -> usize {
        self.state.borrow().queue.len()
    }

    fn release(&mut self) {
        let mut s = self.state.borrow_mut();
        if s.released {
            return;
        }
        s.released = true;
        s.calls.push(Call::Release);
        s.playing = false;
    }
}
