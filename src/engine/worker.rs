//! The audio thread: owns the output, the current voice and the
//! playback session. Commands arrive over a channel and are acknowledged once
//! applied; state for queries is published into a shared snapshot.

use std::path::PathBuf;
use std::sync::mpsc::{self, Receiver, RecvTimeoutError, Sender};
use std::sync::{Arc, Mutex};
use std::thread::{self, JoinHandle};
use std::time::{Duration, Instant};

use rodio::OutputStreamBuilder;
use tracing::{debug, info, warn};

use crate::library::Locator;

use super::queue::{PlayQueue, Previous};
use super::sink::{Output, Voice};
use super::types::{EngineError, EngineEvent, EngineState, MediaItem, TransitionReason};

const TICK: Duration = Duration::from_millis(200);

#[derive(Debug)]
pub(super) enum WorkerCmd {
    Load {
        items: Vec<MediaItem>,
        paths: Vec<Option<PathBuf>>,
        start: usize,
    },
    Play,
    Pause,
    Stop,
    SeekTo(Duration),
    Next,
    Previous,
    Release,
}

pub(super) struct Request {
    pub cmd: WorkerCmd,
    pub ack: Sender<()>,
}

/// Session state readable from the UI thread.
#[derive(Debug, Clone, Default)]
pub(super) struct Snapshot {
    pub items: usize,
    pub current: Option<MediaItem>,
    pub playing: bool,
    pub accumulated: Duration,
    pub resumed_at: Option<Instant>,
    pub total: Option<Duration>,
}

impl Snapshot {
    pub fn position(&self) -> Duration {
        self.accumulated + self.resumed_at.map_or(Duration::ZERO, |t| t.elapsed())
    }
}

pub(super) type SnapshotHandle = Arc<Mutex<Snapshot>>;

/// The playback session. Every event is emitted after the snapshot reflects
/// it, so listeners may query the engine straight away.
pub(super) struct Worker<O: Output, F> {
    output: O,
    voice: Option<O::Voice>,
    queue: PlayQueue,
    paths: Vec<Option<PathBuf>>,
    playing: bool,
    started_at: Option<Instant>,
    accumulated: Duration,
    total: Option<Duration>,
    state: EngineState,
    volume: f32,
    snapshot: SnapshotHandle,
    listener: F,
}

impl<O: Output, F: Fn(EngineEvent)> Worker<O, F> {
    pub(super) fn new(output: O, volume: f32, snapshot: SnapshotHandle, listener: F) -> Self {
        Self {
            output,
            voice: None,
            queue: PlayQueue::default(),
            paths: Vec::new(),
            playing: false,
            started_at: None,
            accumulated: Duration::ZERO,
            total: None,
            state: EngineState::Idle,
            volume,
            snapshot,
            listener,
        }
    }

    fn elapsed(&self) -> Duration {
        self.accumulated + self.started_at.map_or(Duration::ZERO, |st| st.elapsed())
    }

    fn set_state(&mut self, state: EngineState) {
        if self.state != state {
            self.state = state;
            self.emit(EngineEvent::StateChanged { state });
        }
    }

    fn emit(&self, event: EngineEvent) {
        self.publish();
        (self.listener)(event);
    }

    fn publish(&self) {
        if let Ok(mut snap) = self.snapshot.lock() {
            snap.items = self.queue.len();
            snap.current = self.queue.current().cloned();
            snap.playing = self.playing;
            snap.accumulated = self.accumulated;
            snap.resumed_at = self.started_at;
            snap.total = self.total;
        }
    }

    fn drop_voice(&mut self) {
        if let Some(v) = self.voice.take() {
            v.stop();
        }
    }

    /// Open the current item at `start_at`, resuming output if playing.
    fn open_current(&mut self, start_at: Duration) {
        self.drop_voice();
        let Some(index) = self.queue.index() else {
            return;
        };
        let opened = match self.paths.get(index).cloned().flatten() {
            Some(path) => self.output.open(&path, start_at, self.volume),
            None => Err(EngineError::Unresolved(
                self.queue
                    .current()
                    .map(|i| i.locator.clone())
                    .unwrap_or_else(|| Locator::new("")),
            )),
        };

        match opened {
            Ok(opened) => {
                self.total = opened.total;
                self.accumulated = start_at;
                if self.playing {
                    opened.voice.play();
                    self.started_at = Some(Instant::now());
                } else {
                    self.started_at = None;
                }
                self.voice = Some(opened.voice);
                self.set_state(EngineState::Ready);
            }
            Err(e) => {
                warn!(error = %e, "cannot play queue item");
                // No voice, so not playing.
                self.playing = false;
                self.started_at = None;
                self.accumulated = start_at;
                self.set_state(EngineState::Idle);
            }
        }
    }

    fn transition(&mut self, index: usize, reason: TransitionReason) {
        self.queue.set_index(index);
        self.accumulated = Duration::ZERO;
        self.started_at = None;
        self.total = None;
        if let Some(item) = self.queue.current().cloned() {
            debug!(index, ?reason, title = %item.title, "item transition");
            self.emit(EngineEvent::ItemTransitioned { item, reason });
        }
        self.set_state(EngineState::Buffering);
        self.open_current(Duration::ZERO);
    }

    pub(super) fn handle(&mut self, cmd: WorkerCmd) {
        match cmd {
            WorkerCmd::Load {
                items,
                paths,
                start,
            } => {
                self.paths = paths;
                match self.queue.replace(items, start) {
                    Some(index) => self.transition(index, TransitionReason::PlaylistChanged),
                    None => {
                        self.drop_voice();
                        self.playing = false;
                        self.started_at = None;
                        self.accumulated = Duration::ZERO;
                        self.set_state(EngineState::Ended);
                    }
                }
            }
            WorkerCmd::Play => {
                if self.queue.is_empty() || self.playing {
                    return;
                }
                self.playing = true;
                match self.voice.as_ref() {
                    Some(v) => {
                        v.play();
                        self.started_at = Some(Instant::now());
                    }
                    None => {
                        // Stopped or failed earlier: prepare again from the saved position.
                        self.set_state(EngineState::Buffering);
                        self.open_current(self.accumulated);
                    }
                }
            }
            WorkerCmd::Pause => {
                if !self.playing {
                    return;
                }
                self.accumulated = self.elapsed();
                self.started_at = None;
                self.playing = false;
                if let Some(v) = self.voice.as_ref() {
                    v.pause();
                }
            }
            WorkerCmd::Stop => {
                self.drop_voice();
                self.playing = false;
                self.started_at = None;
                self.accumulated = Duration::ZERO;
                self.set_state(EngineState::Idle);
            }
            WorkerCmd::SeekTo(pos) => {
                if self.queue.current().is_none() {
                    return;
                }
                let pos = match self.total {
                    Some(total) => pos.min(total),
                    None => pos,
                };
                if self.voice.is_some() {
                    // Reopen the item and skip into the file.
                    self.open_current(pos);
                } else {
                    self.accumulated = pos;
                }
            }
            WorkerCmd::Next => {
                if let Some(i) = self.queue.next_index() {
                    self.transition(i, TransitionReason::Seek);
                }
            }
            WorkerCmd::Previous => {
                let position_ms = self.elapsed().as_millis() as u64;
                match self.queue.previous_target(position_ms) {
                    Some(Previous::Restart) => self.handle(WorkerCmd::SeekTo(Duration::ZERO)),
                    Some(Previous::Move(i)) => self.transition(i, TransitionReason::Seek),
                    None => {}
                }
            }
            WorkerCmd::Release => self.shutdown(),
        }
    }

    /// Periodic check for the end of the current item.
    pub(super) fn tick(&mut self) {
        let finished = self.playing && self.voice.as_ref().is_some_and(|v| v.is_finished());
        if !finished {
            return;
        }
        match self.queue.next_index() {
            Some(i) => {
                let reason = if Some(i) == self.queue.index() {
                    TransitionReason::Repeat
                } else {
                    TransitionReason::Auto
                };
                self.transition(i, reason);
            }
            None => {
                self.drop_voice();
                self.playing = false;
                self.started_at = None;
                self.set_state(EngineState::Ended);
            }
        }
    }

    fn shutdown(&mut self) {
        self.drop_voice();
        self.playing = false;
        self.started_at = None;
    }

    fn run(mut self, rx: Receiver<Request>) {
        loop {
            match rx.recv_timeout(TICK) {
                Ok(Request {
                    cmd: WorkerCmd::Release,
                    ack,
                }) => {
                    self.shutdown();
                    self.publish();
                    let _ = ack.send(());
                    break;
                }
                Ok(Request { cmd, ack }) => {
                    self.handle(cmd);
                    self.publish();
                    let _ = ack.send(());
                }
                Err(RecvTimeoutError::Timeout) => {
                    self.tick();
                    self.publish();
                }
                Err(RecvTimeoutError::Disconnected) => {
                    self.shutdown();
                    break;
                }
            }
        }
        info!("audio thread finished");
    }
}

/// Start the audio thread. Fails when no output device can be opened.
pub(super) fn spawn_worker<F>(
    rx: Receiver<Request>,
    snapshot: SnapshotHandle,
    volume: f32,
    listener: F,
) -> Result<JoinHandle<()>, EngineError>
where
    F: Fn(EngineEvent) + Send + 'static,
{
    let (ready_tx, ready_rx) = mpsc::channel::<Result<(), String>>();

    let handle = thread::Builder::new()
        .name("spindle-audio".to_string())
        .spawn(move || {
            let mut stream = match OutputStreamBuilder::open_default_stream() {
                Ok(s) => s,
                Err(e) => {
                    let _ = ready_tx.send(Err(e.to_string()));
                    return;
                }
            };
            // rodio logs to stderr when OutputStream is dropped. That's useful in debugging,
            // but noisy for a TUI app.
            stream.log_on_drop(false);
            let _ = ready_tx.send(Ok(()));

            Worker::new(stream, volume, snapshot, listener).run(rx);
        })
        .map_err(EngineError::Spawn)?;

    match ready_rx.recv() {
        Ok(Ok(())) => Ok(handle),
        Ok(Err(msg)) => {
            let _ = handle.join();
            Err(EngineError::NoOutputDevice(msg))
        }
        Err(_) => Err(EngineError::WorkerGone),
    }
}
