//! Application model: `App`, its screens and overlays.

use std::sync::Arc;
use std::time::{Duration, Instant};

use tracing::{error, info};

use crate::bridge::{SharedPlayback, Surface};
use crate::config::{ControlsSettings, UiSettings};
use crate::engine::PlaybackEngine;
use crate::library::{Catalog, Locator, MediaIndex, load_catalog};
use crate::permission::{
    ALLOW_LABEL, DENIED_TOAST, DENY_LABEL, Gate, RATIONALE_MESSAGE, RATIONALE_TITLE,
    StorageAccess,
};
use crate::poller::Scheduler;
use crate::transport::{TransportController, TransportCtx, TransportView};

/// How long a toast stays on screen.
pub const TOAST_TTL: Duration = Duration::from_secs(3);

#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum Screen {
    Library,
    Player,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Dialog {
    pub title: &'static str,
    pub message: &'static str,
    pub allow: &'static str,
    pub deny: &'static str,
}

impl Dialog {
    pub fn rationale() -> Self {
        Self {
            title: RATIONALE_TITLE,
            message: RATIONALE_MESSAGE,
            allow: ALLOW_LABEL,
            deny: DENY_LABEL,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Toast {
    pub message: String,
    pub shown_at: Instant,
}

impl Toast {
    pub fn is_visible(&self, now: Instant) -> bool {
        now.saturating_duration_since(self.shown_at) < TOAST_TTL
    }
}

/// The main application model.
pub struct App {
    pub(super) catalog: Catalog,
    pub(super) selected: usize,
    pub(super) span: u16,
    pub(super) screens: Vec<Screen>,
    pub(super) mini: TransportController,
    pub(super) player: TransportController,
    pub(super) shared: SharedPlayback,
    pub(super) scheduler: Box<dyn Scheduler>,
    pub(super) index: Arc<dyn MediaIndex>,
    pub(super) collection: Locator,
    pub(super) access: Box<dyn StorageAccess>,
    pub(super) dialog: Option<Dialog>,
    pub(super) toast: Option<Toast>,
    pub(super) title: String,
    pub(super) rotation: Duration,
    pub(super) scrub_ms: i64,
    pub(super) quit: bool,
}

impl App {
    pub fn new(
        index: Arc<dyn MediaIndex>,
        collection: Locator,
        access: Box<dyn StorageAccess>,
        scheduler: Box<dyn Scheduler>,
        ui: &UiSettings,
        controls: &ControlsSettings,
    ) -> Self {
        let poll = Duration::from_millis(ui.poll_interval_ms);
        Self {
            catalog: Catalog::default(),
            selected: 0,
            span: ui.grid_span.clamp(1, 2),
            screens: vec![Screen::Library],
            mini: TransportController::new(Surface::MiniBar, poll),
            player: TransportController::new(Surface::Player, poll),
            shared: SharedPlayback::new(),
            scheduler,
            index,
            collection,
            access,
            dialog: None,
            toast: None,
            title: ui.title.clone(),
            rotation: Duration::from_millis(ui.artwork_rotation_ms),
            scrub_ms: (controls.scrub_seconds.min(i64::MAX as u64 / 1000) * 1000) as i64,
            quit: false,
        }
    }

    /// Make `engine` the shared playback engine.
    pub fn attach_engine(&mut self, engine: Box<dyn PlaybackEngine>) {
        self.shared.publish(engine);
    }

    /// Run the permission flow and activate the library surface.
    pub fn start(&mut self) {
        let gate = crate::permission::check(self.access.as_mut());
        self.apply_gate(gate);
        let (mini, _, mut ctx) = self.parts();
        mini.activate(&mut ctx);
    }

    pub(super) fn apply_gate(&mut self, gate: Gate) {
        match gate {
            Gate::Granted => {
                self.dialog = None;
                self.reload_catalog();
            }
            Gate::Rationale => self.dialog = Some(Dialog::rationale()),
            Gate::Denied => {
                self.dialog = None;
                self.show_toast(DENIED_TOAST);
            }
        }
    }

    /// Replace the catalog with a fresh query.
    pub fn reload_catalog(&mut self) {
        match load_catalog(self.index.as_ref(), &self.collection) {
            Ok(catalog) => {
                info!(tracks = catalog.len(), "library ready");
                self.catalog = catalog;
                self.selected = 0;
            }
            Err(e) => {
                error!(error = %e, "failed to load the library");
                self.catalog = Catalog::default();
                self.selected = 0;
                self.show_toast(format!("Could not load songs: {e}"));
            }
        }
    }

    pub fn show_toast(&mut self, message: impl Into<String>) {
        self.toast = Some(Toast {
            message: message.into(),
            shown_at: Instant::now(),
        });
    }

    pub fn catalog(&self) -> &Catalog {
        &self.catalog
    }

    pub fn selected(&self) -> usize {
        self.selected
    }

    pub fn span(&self) -> u16 {
        self.span
    }

    pub fn screen(&self) -> Screen {
        self.screens.last().copied().unwrap_or(Screen::Library)
    }

    pub fn title(&self) -> &str {
        &self.title
    }

    pub fn rotation(&self) -> Duration {
        self.rotation
    }

    pub fn mini_view(&self) -> &TransportView {
        self.mini.view()
    }

    pub fn player_view(&self) -> &TransportView {
        self.player.view()
    }

    pub fn is_dragging(&self) -> bool {
        self.player.is_dragging()
    }

    pub fn dialog(&self) -> Option<&Dialog> {
        self.dialog.as_ref()
    }

    pub fn toast(&self) -> Option<&Toast> {
        self.toast.as_ref()
    }

    pub fn should_quit(&self) -> bool {
        self.quit
    }

    /// Both controllers plus a context borrowing the rest of the app.
    pub(super) fn parts(
        &mut self,
    ) -> (
        &mut TransportController,
        &mut TransportController,
        TransportCtx<'_>,
    ) {
        (
            &mut self.mini,
            &mut self.player,
            TransportCtx {
                shared: &mut self.shared,
                scheduler: self.scheduler.as_ref(),
                index: self.index.as_ref(),
            },
        )
    }

    /// Controller of the surface currently on screen.
    pub(super) fn active(&mut self) -> (&mut TransportController, TransportCtx<'_>) {
        let screen = self.screen();
        let (mini, player, ctx) = self.parts();
        match screen {
            Screen::Library => (mini, ctx),
            Screen::Player => (player, ctx),
        }
    }
}
