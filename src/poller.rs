//! Position polling for transport surfaces.
//!
//! A poller is a one-shot timer that re-arms itself after each tick has been
//! handled. Ticks carry the generation they were scheduled under; cancelling
//! bumps the generation so ticks already in flight are ignored.

use std::cmp::Reverse;
use std::collections::BinaryHeap;
use std::sync::mpsc::{self, RecvTimeoutError, Sender};
use std::thread;
use std::time::{Duration, Instant};

use tracing::{debug, warn};

use crate::bridge::Surface;

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub struct Tick {
    pub surface: Surface,
    pub generation: u64,
}

/// Something that can deliver a tick back to the UI queue after a delay.
pub trait Scheduler {
    fn schedule(&self, delay: Duration, tick: Tick);
}

#[derive(Debug)]
pub struct PositionPoller {
    surface: Surface,
    interval: Duration,
    generation: u64,
    running: bool,
}

impl PositionPoller {
    pub fn new(surface: Surface, interval: Duration) -> Self {
        Self {
            surface,
            interval,
            generation: 0,
            running: false,
        }
    }

    pub fn is_running(&self) -> bool {
        self.running
    }

    /// Arm the first tick. Starting a running poller does nothing.
    pub fn start(&mut self, scheduler: &dyn Scheduler) {
        if self.running {
            return;
        }
        self.running = true;
        self.generation += 1;
        scheduler.schedule(self.interval, self.current_tick());
    }

    pub fn cancel(&mut self) {
        if self.running {
            self.running = false;
            self.generation += 1;
        }
    }

    /// Whether `tick` belongs to the live schedule of this poller.
    pub fn accepts(&self, tick: Tick) -> bool {
        self.running && tick == self.current_tick()
    }

    /// Arm the next tick. Called after a tick has been handled.
    pub fn reschedule(&self, scheduler: &dyn Scheduler) {
        if self.running {
            scheduler.schedule(self.interval, self.current_tick());
        }
    }

    fn current_tick(&self) -> Tick {
        Tick {
            surface: self.surface,
            generation: self.generation,
        }
    }
}

/// Timer thread delivering scheduled ticks in due order.
pub struct TimerThread {
    tx: Sender<(Instant, Tick)>,
}

impl TimerThread {
    pub fn spawn<F>(deliver: F) -> std::io::Result<Self>
    where
        F: Fn(Tick) -> bool + Send + 'static,
    {
        let (tx, rx) = mpsc::channel::<(Instant, Tick)>();
        thread::Builder::new()
            .name("spindle-timer".to_string())
            .spawn(move || {
                let mut pending: BinaryHeap<Reverse<(Instant, Tick)>> = BinaryHeap::new();
                loop {
                    let wait = pending
                        .peek()
                        .map(|Reverse((due, _))| due.saturating_duration_since(Instant::now()))
                        .unwrap_or(Duration::from_secs(3600));
                    match rx.recv_timeout(wait) {
                        Ok(entry) => pending.push(Reverse(entry)),
                        Err(RecvTimeoutError::Timeout) => {}
                        Err(RecvTimeoutError::Disconnected) => break,
                    }
                    let now = Instant::now();
                    while let Some(Reverse((due, tick))) = pending.peek().copied() {
                        if due > now {
                            break;
                        }
                        pending.pop();
                        if !deliver(tick) {
                            debug!("timer receiver closed");
                            return;
                        }
                    }
                }
            })?;
        Ok(Self { tx })
    }
}

impl Scheduler for TimerThread {
    fn schedule(&self, delay: Duration, tick: Tick) {
        if self.tx.send((Instant::now() + delay, tick)).is_err() {
            warn!("timer thread is gone; tick dropped");
        }
    }
}

/// Scheduler for tests: records requests, fires nothing on its own.
#[cfg(test)]
#[derive(Debug, Default)]
pub struct ManualScheduler {
    scheduled: std::cell::RefCell<Vec<(Duration, Tick)>>,
}

#[cfg(test)]
impl ManualScheduler {
    pub fn take(&self) -> Vec<(Duration, Tick)> {
        std::mem::take(&mut *self.scheduled.borrow_mut())
    }
}

#[cfg(test)]
impl Scheduler for ManualScheduler {
    fn schedule(&self, delay: Duration, tick: Tick) {
        self.scheduled.borrow_mut().push((delay, tick));
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const SECOND: Duration = Duration::from_millis(1000);

    #[test]
    fn start_arms_one_tick_at_the_interval() {
        let sched = ManualScheduler::default();
        let mut poller = PositionPoller::new(Surface::Player, SECOND);
        poller.start(&sched);
        poller.start(&sched);

        let armed = sched.take();
        assert_eq!(armed.len(), 1);
        assert_eq!(armed[0].0, SECOND);
        assert!(poller.accepts(armed[0].1));
    }

    #[test]
    fn cancel_makes_in_flight_ticks_inert() {
        let sched = ManualScheduler::default();
        let mut poller = PositionPoller::new(Surface::Player, SECOND);
        poller.start(&sched);
        let stale = sched.take()[0].1;

        poller.cancel();
        assert!(!poller.accepts(stale));
        poller.reschedule(&sched);
        assert!(sched.take().is_empty());

        poller.start(&sched);
        let fresh = sched.take()[0].1;
        assert!(!poller.accepts(stale));
        assert!(poller.accepts(fresh));
    }

    #[test]
    fn ticks_for_another_surface_are_rejected() {
        let sched = ManualScheduler::default();
        let mut poller = PositionPoller::new(Surface::MiniBar, SECOND);
        poller.start(&sched);
        let tick = sched.take()[0].1;
        assert!(!poller.accepts(Tick {
            surface: Surface::Player,
            ..tick
        }));
    }

    #[test]
    fn timer_thread_delivers_in_due_order() {
        let (tx, rx) = mpsc::channel();
        let timer = TimerThread::spawn(move |tick| tx.send(tick).is_ok()).unwrap();
        let late = Tick {
            surface: Surface::Player,
            generation: 2,
        };
        let early = Tick {
            surface: Surface::MiniBar,
            generation: 1,
        };
        timer.schedule(Duration::from_millis(60), late);
        timer.schedule(Duration::from_millis(10), early);

        let wait = Duration::from_secs(2);
        assert_eq!(rx.recv_timeout(wait).unwrap(), early);
        assert_eq!(rx.recv_timeout(wait).unwrap(), late);
    }
}
