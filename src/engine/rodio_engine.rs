use std::sync::mpsc::{self, Sender};
use std::sync::{Arc, Mutex};
use std::thread::JoinHandle;
use std::time::Duration;

use tracing::{info, warn};

use crate::config::AudioSettings;
use crate::library::MediaIndex;

use super::types::{EngineError, EngineEvent, MediaItem, PlaybackEngine};
use super::worker::{Request, Snapshot, SnapshotHandle, WorkerCmd, spawn_worker};

/// How long a command may take before the caller stops waiting for it.
const ACK_TIMEOUT: Duration = Duration::from_secs(2);

/// rodio-backed engine. Commands run on the audio thread; queries read the
/// snapshot it publishes after each command.
pub struct RodioEngine {
    tx: Sender<Request>,
    snapshot: SnapshotHandle,
    index: Arc<dyn MediaIndex>,
    join: Option<JoinHandle<()>>,
}

impl RodioEngine {
    /// Open the default output device and start the audio thread.
    ///
    /// `listener` runs on the audio thread for every engine event.
    pub fn spawn<F>(
        index: Arc<dyn MediaIndex>,
        settings: &AudioSettings,
        listener: F,
    ) -> Result<Self, EngineError>
    where
        F: Fn(EngineEvent) + Send + 'static,
    {
        let (tx, rx) = mpsc::channel();
        let snapshot: SnapshotHandle = Arc::new(Mutex::new(Snapshot::default()));
        let join = spawn_worker(rx, Arc::clone(&snapshot), settings.volume, listener)?;
        info!(volume = settings.volume, "audio engine started");
        Ok(Self {
            tx,
            snapshot,
            index,
            join: Some(join),
        })
    }

    fn request(&self, cmd: WorkerCmd) {
        if self.join.is_none() {
            return;
        }
        let (ack, done) = mpsc::channel();
        if self.tx.send(Request { cmd, ack }).is_err() {
            warn!("audio thread is gone; command dropped");
            return;
        }
        if done.recv_timeout(ACK_TIMEOUT).is_err() {
            warn!("audio thread did not acknowledge a command");
        }
    }

    fn read<T>(&self, f: impl FnOnce(&Snapshot) -> T) -> Option<T> {
        self.snapshot.lock().ok().map(|snap| f(&snap))
    }
}

impl PlaybackEngine for RodioEngine {
    fn load(&mut self, items: Vec<MediaItem>, start_index: usize) {
        let paths = items
            .iter()
            .map(|item| self.index.resolve(&item.locator))
            .collect();
        self.request(WorkerCmd::Load {
            items,
            paths,
            start: start_index,
        });
    }

    fn play(&mut self) {
        self.request(WorkerCmd::Play);
    }

    fn pause(&mut self) {
        self.request(WorkerCmd::Pause);
    }

    fn stop(&mut self) {
        self.request(WorkerCmd::Stop);
    }

    fn seek_to(&mut self, position_ms: u64) {
        self.request(WorkerCmd::SeekTo(Duration::from_millis(position_ms)));
    }

    fn seek_to_next(&mut self) {
        self.request(WorkerCmd::Next);
    }

    fn seek_to_previous(&mut self) {
        self.request(WorkerCmd::Previous);
    }

    fn has_next(&self) -> bool {
        self.item_count() > 0
    }

    fn has_previous(&self) -> bool {
        self.item_count() > 0
    }

    fn is_playing(&self) -> bool {
        self.read(|s| s.playing).unwrap_or(false)
    }

    fn current_position(&self) -> u64 {
        self.read(|s| s.position().as_millis() as u64).unwrap_or(0)
    }

    fn duration(&self) -> u64 {
        self.read(|s| {
            s.total
                .map(|d| d.as_millis() as u64)
                .or_else(|| s.current.as_ref().map(|item| item.duration_ms))
                .unwrap_or(0)
        })
        .unwrap_or(0)
    }

    fn current_item(&self) -> Option<MediaItem> {
        self.read(|s| s.current.clone()).flatten()
    }

    fn item_count(&self) -> usize {
        self.read(|s| s.items).unwrap_or(0)
    }

    fn release(&mut self) {
        let Some(join) = self.join.take() else {
            return;
        };
        let (ack, done) = mpsc::channel();
        if self
            .tx
            .send(Request {
                cmd: WorkerCmd::Release,
                ack,
            })
            .is_ok()
        {
            let _ = done.recv_timeout(ACK_TIMEOUT);
        }
        if join.join().is_err() {
            warn!("audio thread panicked");
        }
        info!("audio engine released");
    }
}

impl Drop for RodioEngine {
    fn drop(&mut self) {
        self.release();
    }
}
