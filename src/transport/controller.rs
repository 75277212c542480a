use std::time::Duration;

use tracing::debug;

use crate::bridge::{SharedPlayback, Surface};
use crate::engine::{EngineEvent, EngineState};
use crate::library::{MediaIndex, artwork_for};
use crate::poller::{PositionPoller, Scheduler, Tick};

use super::format::readable_time;
use super::view::{TransportIcon, TransportView};

/// What a controller call needs besides its own state.
pub struct TransportCtx<'a> {
    pub shared: &'a mut SharedPlayback,
    pub scheduler: &'a dyn Scheduler,
    pub index: &'a dyn MediaIndex,
}

/// Drives the engine from one surface and mirrors its state into a view.
#[derive(Debug)]
pub struct TransportController {
    surface: Surface,
    view: TransportView,
    poller: PositionPoller,
    /// Seek value held locally while the user drags.
    drag: Option<u64>,
}

impl TransportController {
    pub fn new(surface: Surface, poll_interval: Duration) -> Self {
        Self {
            surface,
            view: TransportView::default(),
            poller: PositionPoller::new(surface, poll_interval),
            drag: None,
        }
    }

    pub fn view(&self) -> &TransportView {
        &self.view
    }

    #[cfg(test)]
    pub fn is_polling(&self) -> bool {
        self.poller.is_running()
    }

    pub fn is_dragging(&self) -> bool {
        self.drag.is_some()
    }

    /// Subscribe and rebuild the view from the engine.
    pub fn activate(&mut self, ctx: &mut TransportCtx<'_>) {
        ctx.shared.subscribe(self.surface);
        self.resync(ctx);
        let playing = ctx.shared.is_playing();
        self.show_playing(playing, ctx.scheduler);
    }

    pub fn deactivate(&mut self, shared: &mut SharedPlayback) {
        shared.unsubscribe(self.surface);
        self.poller.cancel();
        self.view.spin.stop();
        self.drag = None;
    }

    pub fn toggle_play(&mut self, ctx: &mut TransportCtx<'_>) {
        let Some(engine) = ctx.shared.engine_mut() else {
            return;
        };
        if engine.is_playing() {
            engine.pause();
            self.show_playing(false, ctx.scheduler);
        } else if engine.item_count() > 0 {
            engine.play();
            self.show_playing(true, ctx.scheduler);
        }
    }

    /// Skip forward. Returns false, leaving everything untouched, when the
    /// engine has nowhere to go.
    pub fn next(&mut self, ctx: &mut TransportCtx<'_>) -> bool {
        match ctx.shared.engine_mut() {
            Some(engine) if engine.has_next() => engine.seek_to_next(),
            _ => return false,
        }
        self.resync(ctx);
        true
    }

    pub fn previous(&mut self, ctx: &mut TransportCtx<'_>) -> bool {
        match ctx.shared.engine_mut() {
            Some(engine) if engine.has_previous() => engine.seek_to_previous(),
            _ => return false,
        }
        self.resync(ctx);
        true
    }

    pub fn on_event(&mut self, event: &EngineEvent, ctx: &mut TransportCtx<'_>) {
        match event {
            EngineEvent::ItemTransitioned { item, reason } => {
                debug!(surface = ?self.surface, ?reason, title = %item.title, "transition");
                self.resync(ctx);
                self.view.spin.restart();
                self.show_playing(true, ctx.scheduler);
                if let Some(engine) = ctx.shared.engine_mut() {
                    if !engine.is_playing() {
                        engine.play();
                    }
                }
            }
            EngineEvent::StateChanged {
                state: EngineState::Ready,
            } => {
                self.resync(ctx);
                self.show_playing(true, ctx.scheduler);
            }
            EngineEvent::StateChanged { .. } => self.show_playing(false, ctx.scheduler),
        }
    }

    /// Handle a poll tick. Stale ticks are dropped without re-arming.
    pub fn on_tick(&mut self, tick: Tick, ctx: &mut TransportCtx<'_>) {
        if !self.poller.accepts(tick) {
            return;
        }
        if let Some(engine) = ctx.shared.engine() {
            if engine.is_playing() && self.drag.is_none() {
                self.view.set_position(engine.current_position());
            }
        }
        self.poller.reschedule(ctx.scheduler);
    }

    /// Move the local seek value while dragging. Clamped to the seek range.
    pub fn drag_to(&mut self, position_ms: u64) {
        let value = position_ms.min(self.view.seek.max);
        self.drag = Some(value);
        self.view.seek.progress = value;
    }

    /// Nudge the local seek value, starting a drag if none is active.
    pub fn drag_by(&mut self, delta_ms: i64) {
        let from = self.drag.unwrap_or(self.view.seek.progress);
        self.drag_to(from.saturating_add_signed(delta_ms));
    }

    pub fn cancel_drag(&mut self) {
        self.drag = None;
    }

    /// Commit the dragged value with a single seek.
    pub fn release_drag(&mut self, shared: &mut SharedPlayback) -> bool {
        let Some(value) = self.drag.take() else {
            return false;
        };
        let Some(engine) = shared.engine_mut() else {
            return false;
        };
        engine.seek_to(value);
        self.view.set_position(value);
        true
    }

    fn show_playing(&mut self, playing: bool, scheduler: &dyn Scheduler) {
        if playing {
            self.view.icon = TransportIcon::Pause;
            self.view.spin.start();
            self.poller.start(scheduler);
        } else {
            self.view.icon = TransportIcon::Play;
            self.view.spin.stop();
            self.poller.cancel();
        }
    }

    /// Rebuild title, artwork, labels and seek bar from the engine.
    fn resync(&mut self, ctx: &TransportCtx<'_>) {
        let Some(engine) = ctx.shared.engine() else {
            return;
        };
        let Some(item) = engine.current_item() else {
            self.view.title.clear();
            self.view.set_duration(0);
            self.view.set_position(0);
            return;
        };
        self.view.title = item.title.clone();
        self.view.artwork = artwork_for(ctx.index, &item.artwork);
        self.view.set_duration(engine.duration());
        if self.drag.is_none() {
            self.view.set_position(engine.current_position());
        } else {
            self.view.position_label = readable_time(engine.current_position());
        }
    }
}
