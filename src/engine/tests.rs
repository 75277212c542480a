use std::cell::{Cell, RefCell};
use std::path::{Path, PathBuf};
use std::rc::Rc;
use std::sync::{Arc, Mutex};
use std::time::Duration;

use crate::library::{Locator, SONGS_BASE};

use super::fake::{Call, FakeEngine};
use super::queue::{PlayQueue, Previous};
use super::sink::{Opened, Output, Voice};
use super::worker::{Snapshot, SnapshotHandle, Worker, WorkerCmd};
use super::{EngineError, EngineEvent, EngineState, MediaItem, PlaybackEngine, TransitionReason};

fn item(id: u64) -> MediaItem {
    MediaItem {
        locator: Locator::with_appended_id(SONGS_BASE, id),
        title: format!("song {id}"),
        artwork: Locator::new("media://external/audio/albumart/1"),
        duration_ms: 60_000,
    }
}

fn items(n: u64) -> Vec<MediaItem> {
    (1..=n).map(item).collect()
}

#[test]
fn queue_wraps_at_both_ends() {
    let mut q = PlayQueue::default();
    assert_eq!(q.replace(items(3), 2), Some(2));
    assert_eq!(q.next_index(), Some(0));

    q.set_index(0);
    assert_eq!(q.previous_index(), Some(2));
    assert_eq!(q.next_index(), Some(1));
}

#[test]
fn queue_clamps_start_and_handles_empty() {
    let mut q = PlayQueue::default();
    assert_eq!(q.replace(items(2), 9), Some(1));
    assert_eq!(q.replace(Vec::new(), 0), None);
    assert_eq!(q.next_index(), None);
    assert_eq!(q.previous_target(10_000), None);
}

#[test]
fn previous_restarts_only_past_threshold() {
    let mut q = PlayQueue::default();
    q.replace(items(3), 1);
    assert_eq!(q.previous_target(3_000), Some(Previous::Move(0)));
    assert_eq!(q.previous_target(3_001), Some(Previous::Restart));
}

#[test]
fn single_item_queue_wraps_onto_itself() {
    let mut q = PlayQueue::default();
    q.replace(items(1), 0);
    assert_eq!(q.next_index(), Some(0));
    assert_eq!(q.previous_index(), Some(0));
}

#[test]
fn load_announces_transition_then_readiness() {
    let fake = FakeEngine::new();
    let mut engine = fake.clone();
    engine.load(items(3), 1);

    assert_eq!(
        fake.take_events(),
        vec![
            EngineEvent::ItemTransitioned {
                item: item(2),
                reason: TransitionReason::PlaylistChanged,
            },
            EngineEvent::StateChanged {
                state: EngineState::Buffering
            },
            EngineEvent::StateChanged {
                state: EngineState::Ready
            },
        ]
    );
    assert_eq!(engine.current_item(), Some(item(2)));
    assert!(engine.has_next() && engine.has_previous());
    assert!(!engine.is_playing());
}

#[test]
fn finishing_the_last_item_repeats_the_queue() {
    let fake = FakeEngine::new();
    let mut engine = fake.clone();
    engine.load(items(2), 1);
    engine.play();
    fake.take_events();

    fake.finish_current();
    let events = fake.take_events();
    assert!(matches!(
        events.first(),
        Some(EngineEvent::ItemTransitioned {
            reason: TransitionReason::Auto,
            ..
        })
    ));
    assert_eq!(engine.current_item(), Some(item(1)));

    engine.load(items(1), 0);
    fake.take_events();
    fake.finish_current();
    assert!(matches!(
        fake.take_events().first(),
        Some(EngineEvent::ItemTransitioned {
            reason: TransitionReason::Repeat,
            ..
        })
    ));
}

#[test]
fn seek_clamps_to_duration_and_stop_resets() {
    let fake = FakeEngine::new();
    let mut engine = fake.clone();
    engine.load(items(1), 0);
    engine.seek_to(90_000);
    assert_eq!(engine.current_position(), 60_000);

    engine.stop();
    assert_eq!(engine.current_position(), 0);
    assert!(fake.take_events().ends_with(&[EngineEvent::StateChanged {
        state: EngineState::Idle
    }]));
}

#[test]
fn release_is_recorded_once() {
    let fake = FakeEngine::new();
    let mut engine = fake.clone();
    engine.release();
    engine.release();
    assert!(fake.released());
    assert_eq!(fake.calls(), vec![Call::Release]);
}

/// Output that decodes nothing. Every opened item reports a one minute length.
#[derive(Default)]
struct HeadlessOutput {
    opened: Rc<RefCell<Vec<(PathBuf, Duration)>>>,
    finished: Rc<Cell<bool>>,
}

struct HeadlessVoice {
    finished: Rc<Cell<bool>>,
}

impl Voice for HeadlessVoice {
    fn play(&self) {}
    fn pause(&self) {}
    fn stop(&self) {}
    fn is_finished(&self) -> bool {
        self.finished.get()
    }
}

impl Output for HeadlessOutput {
    type Voice = HeadlessVoice;

    fn open(
        &self,
        path: &Path,
        start_at: Duration,
        _volume: f32,
    ) -> Result<Opened<HeadlessVoice>, EngineError> {
        self.opened.borrow_mut().push((path.to_path_buf(), start_at));
        self.finished.set(false);
        Ok(Opened {
            voice: HeadlessVoice {
                finished: Rc::clone(&self.finished),
            },
            total: Some(Duration::from_secs(60)),
        })
    }
}

type Seen = Rc<RefCell<Vec<(EngineEvent, Option<String>)>>>;

/// A worker driven by hand. Each event is recorded with the title the
/// snapshot showed when the event arrived.
struct Session {
    worker: Worker<HeadlessOutput, Box<dyn Fn(EngineEvent)>>,
    snapshot: SnapshotHandle,
    seen: Seen,
    opened: Rc<RefCell<Vec<(PathBuf, Duration)>>>,
    finished: Rc<Cell<bool>>,
}

impl Session {
    fn new() -> Self {
        let output = HeadlessOutput::default();
        let opened = Rc::clone(&output.opened);
        let finished = Rc::clone(&output.finished);
        let snapshot: SnapshotHandle = Arc::new(Mutex::new(Snapshot::default()));
        let seen: Seen = Rc::default();

        let snap = Arc::clone(&snapshot);
        let log = Rc::clone(&seen);
        let listener: Box<dyn Fn(EngineEvent)> = Box::new(move |event| {
            let title = snap.lock().unwrap().current.as_ref().map(|i| i.title.clone());
            log.borrow_mut().push((event, title));
        });

        Self {
            worker: Worker::new(output, 1.0, Arc::clone(&snapshot), listener),
            snapshot,
            seen,
            opened,
            finished,
        }
    }

    /// Queue `n` items; the 1-based ids in `missing` have no file behind them.
    fn load(&mut self, n: u64, start: usize, missing: &[u64]) {
        let paths = (1..=n)
            .map(|id| (!missing.contains(&id)).then(|| path(id)))
            .collect();
        self.worker.handle(WorkerCmd::Load {
            items: items(n),
            paths,
            start,
        });
    }

    fn events(&self) -> Vec<EngineEvent> {
        self.seen.borrow_mut().drain(..).map(|(e, _)| e).collect()
    }

    fn snapshot(&self) -> Snapshot {
        self.snapshot.lock().unwrap().clone()
    }

    fn last_opened(&self) -> Option<(PathBuf, Duration)> {
        self.opened.borrow().last().cloned()
    }
}

fn path(id: u64) -> PathBuf {
    PathBuf::from(format!("/music/{id}.mp3"))
}

fn state(state: EngineState) -> EngineEvent {
    EngineEvent::StateChanged { state }
}

#[test]
fn worker_publishes_before_announcing_an_advance() {
    let mut s = Session::new();
    s.load(2, 0, &[]);
    s.worker.handle(WorkerCmd::Play);
    s.events();

    s.finished.set(true);
    s.worker.tick();

    let seen = s.seen.borrow().clone();
    assert_eq!(
        seen.iter().map(|(e, _)| e.clone()).collect::<Vec<_>>(),
        vec![
            EngineEvent::ItemTransitioned {
                item: item(2),
                reason: TransitionReason::Auto,
            },
            state(EngineState::Buffering),
            state(EngineState::Ready),
        ]
    );
    for (_, title) in &seen {
        assert_eq!(title.as_deref(), Some("song 2"));
    }
    assert_eq!(s.last_opened(), Some((path(2), Duration::ZERO)));
}

#[test]
fn worker_stops_playing_when_an_item_cannot_be_opened() {
    let mut s = Session::new();
    s.load(2, 0, &[2]);
    s.worker.handle(WorkerCmd::Play);
    s.events();

    s.finished.set(true);
    s.worker.tick();
    assert_eq!(
        s.events(),
        vec![
            EngineEvent::ItemTransitioned {
                item: item(2),
                reason: TransitionReason::Auto,
            },
            state(EngineState::Buffering),
            state(EngineState::Idle),
        ]
    );
    let snap = s.snapshot();
    assert!(!snap.playing);
    assert_eq!(snap.current, Some(item(2)));

    // Play tries again and fails the same way; next still moves on.
    s.worker.handle(WorkerCmd::Play);
    assert_eq!(
        s.events(),
        vec![state(EngineState::Buffering), state(EngineState::Idle)]
    );
    assert!(!s.snapshot().playing);

    s.worker.handle(WorkerCmd::Next);
    assert_eq!(s.snapshot().current, Some(item(1)));
    assert!(s.events().ends_with(&[state(EngineState::Ready)]));
}

#[test]
fn worker_reopens_the_item_on_play_after_stop() {
    let mut s = Session::new();
    s.load(1, 0, &[]);
    s.worker.handle(WorkerCmd::Play);
    s.worker.handle(WorkerCmd::Stop);
    assert!(s.events().ends_with(&[state(EngineState::Idle)]));
    assert_eq!(s.snapshot().position(), Duration::ZERO);

    s.worker.handle(WorkerCmd::Play);
    assert_eq!(
        s.events(),
        vec![state(EngineState::Buffering), state(EngineState::Ready)]
    );
    assert_eq!(s.opened.borrow().len(), 2);
    assert_eq!(s.last_opened(), Some((path(1), Duration::ZERO)));
    assert!(s.snapshot().playing);
}

#[test]
fn worker_previous_restarts_past_threshold_then_moves() {
    let mut s = Session::new();
    s.load(3, 1, &[]);
    s.worker.handle(WorkerCmd::SeekTo(Duration::from_secs(10)));
    assert_eq!(s.last_opened(), Some((path(2), Duration::from_secs(10))));
    assert_eq!(s.snapshot().position(), Duration::from_secs(10));
    s.events();

    s.worker.handle(WorkerCmd::Previous);
    assert_eq!(s.last_opened(), Some((path(2), Duration::ZERO)));
    assert_eq!(s.snapshot().current, Some(item(2)));
    assert!(s.events().is_empty());

    s.worker.handle(WorkerCmd::Previous);
    assert_eq!(s.snapshot().current, Some(item(1)));
    assert_eq!(
        s.events().first(),
        Some(&EngineEvent::ItemTransitioned {
            item: item(1),
            reason: TransitionReason::Seek,
        })
    );
}

#[test]
fn worker_seek_clamps_to_decoded_length_without_state_change() {
    let mut s = Session::new();
    s.load(1, 0, &[]);
    s.events();

    s.worker.handle(WorkerCmd::SeekTo(Duration::from_secs(90)));
    assert_eq!(s.last_opened(), Some((path(1), Duration::from_secs(60))));
    assert_eq!(s.snapshot().position(), Duration::from_secs(60));
    assert!(s.events().is_empty());
}

#[test]
fn worker_ends_on_an_empty_load() {
    let mut s = Session::new();
    s.load(0, 0, &[]);
    assert_eq!(s.events(), vec![state(EngineState::Ended)]);
    let snap = s.snapshot();
    assert_eq!(snap.items, 0);
    assert_eq!(snap.current, None);
}

#[test]
fn worker_repeats_a_single_item_and_ignores_paused_ends() {
    let mut s = Session::new();
    s.load(1, 0, &[]);
    s.worker.handle(WorkerCmd::Play);
    s.events();

    s.finished.set(true);
    s.worker.tick();
    assert_eq!(
        s.events().first(),
        Some(&EngineEvent::ItemTransitioned {
            item: item(1),
            reason: TransitionReason::Repeat,
        })
    );

    s.worker.handle(WorkerCmd::Pause);
    s.finished.set(true);
    s.worker.tick();
    assert!(s.events().is_empty());
}
