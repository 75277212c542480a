//! `App::handle`: the one place UI state changes.

use tracing::{debug, info, warn};

use crate::bridge::Surface;
use crate::engine::{EngineEvent, MediaItem};
use crate::permission::{self, Answer};
use crate::poller::Tick;

use super::event::{Intent, UiEvent};
use super::model::{App, Screen};

impl App {
    pub fn handle(&mut self, event: UiEvent) {
        match event {
            UiEvent::Input(intent) => self.on_intent(intent),
            UiEvent::Engine(event) => self.on_engine_event(&event),
            UiEvent::Tick(tick) => self.on_tick(tick),
            UiEvent::Quit => self.shutdown(),
        }
    }

    fn on_intent(&mut self, intent: Intent) {
        if self.dialog.is_some() {
            // The dialog is modal.
            if let Intent::Answer(answer) = intent {
                self.answer_dialog(answer);
            }
            return;
        }

        match intent {
            Intent::Up => self.move_by(-(self.span as isize)),
            Intent::Down => self.move_by(self.span as isize),
            Intent::Left => self.move_by(-1),
            Intent::Right => self.move_by(1),
            Intent::Select(i) => {
                if i < self.catalog.len() {
                    self.selected = i;
                }
            }
            Intent::PlaySelected => self.play_selected(),
            Intent::TogglePlay => {
                let (ctl, mut ctx) = self.active();
                ctl.toggle_play(&mut ctx);
            }
            Intent::Next => {
                let (ctl, mut ctx) = self.active();
                ctl.next(&mut ctx);
            }
            Intent::Previous => {
                let (ctl, mut ctx) = self.active();
                ctl.previous(&mut ctx);
            }
            Intent::ToggleSpan => {
                self.span = if self.span == 1 { 2 } else { 1 };
                debug!(span = self.span, "grid span changed");
            }
            Intent::OpenPlayer => self.open_player(),
            Intent::Back => self.back(),
            Intent::Scrub(delta) => {
                if self.screen() == Screen::Player {
                    let step = delta.signum() * self.scrub_ms;
                    self.player.drag_by(step);
                }
            }
            Intent::SeekDrag(position) => {
                if self.screen() == Screen::Player {
                    self.player.drag_to(position);
                }
            }
            Intent::SeekCommit => {
                if self.screen() == Screen::Player {
                    self.player.release_drag(&mut self.shared);
                }
            }
            Intent::Answer(_) => {}
        }
    }

    fn answer_dialog(&mut self, answer: Answer) {
        let gate = permission::answer(self.access.as_mut(), answer);
        self.apply_gate(gate);
    }

    fn move_by(&mut self, delta: isize) {
        if self.catalog.is_empty() {
            return;
        }
        let target = self.selected as isize + delta;
        if (0..self.catalog.len() as isize).contains(&target) {
            self.selected = target as usize;
        }
    }

    /// Queue the whole catalog starting at the cursor. Playback starts when
    /// the engine announces the transition.
    fn play_selected(&mut self) {
        if self.screen() != Screen::Library || self.catalog.is_empty() {
            return;
        }
        let items: Vec<MediaItem> = self.catalog.iter().map(MediaItem::from).collect();
        let start = self.selected;
        match self.shared.engine_mut() {
            Some(engine) => {
                info!(start, queued = items.len(), "loading queue");
                engine.load(items, start);
            }
            None => {
                warn!("play requested without an audio engine");
                self.show_toast("No audio output available");
            }
        }
    }

    fn open_player(&mut self) {
        if self.screen() == Screen::Player {
            return;
        }
        self.mini.deactivate(&mut self.shared);
        self.screens.push(Screen::Player);
        let (_, player, mut ctx) = self.parts();
        player.activate(&mut ctx);
    }

    /// Drop an uncommitted drag first; otherwise pop the player.
    fn back(&mut self) {
        if self.screen() != Screen::Player {
            return;
        }
        if self.player.is_dragging() {
            self.player.cancel_drag();
            return;
        }
        self.player.deactivate(&mut self.shared);
        self.screens.pop();
        let (mini, _, mut ctx) = self.parts();
        mini.activate(&mut ctx);
    }

    fn on_engine_event(&mut self, event: &EngineEvent) {
        let subscribers = self.shared.subscribers().to_vec();
        for surface in subscribers {
            let (mini, player, mut ctx) = self.parts();
            let ctl = match surface {
                Surface::MiniBar => mini,
                Surface::Player => player,
            };
            ctl.on_event(event, &mut ctx);
        }
    }

    fn on_tick(&mut self, tick: Tick) {
        let (mini, player, mut ctx) = self.parts();
        let ctl = match tick.surface {
            Surface::MiniBar => mini,
            Surface::Player => player,
        };
        ctl.on_tick(tick, &mut ctx);
    }

    /// Stop if playing and release the engine, once.
    fn shutdown(&mut self) {
        if self.quit {
            return;
        }
        self.mini.deactivate(&mut self.shared);
        self.player.deactivate(&mut self.shared);
        self.shared.release();
        self.quit = true;
        info!("shutting down");
    }
}
