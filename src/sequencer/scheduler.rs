// Copyright (c) 2026 Robert L. Snyder, Sierra Vista, AZ
// Licensed under the MIT License. See LICENSE file in the project root for details.

//! Periodic step timers.
//!
//! The transport never sleeps or spawns on its own. It asks a
//! [`StepScheduler`] for a recurring timer and cancels it on stop. Each
//! timer has a [`TimerId`]; ticks carry that id so a tick from a cancelled
//! timer can be recognised and ignored.

use std::collections::{BTreeMap, HashMap};
use std::fmt;
use std::time::Duration;

use tokio::sync::mpsc::{UnboundedSender, WeakUnboundedSender};
use tokio::task::JoinHandle;
use tokio::time::{self, Instant, MissedTickBehavior};
use tracing::{debug, trace};

use super::Command;

/// Shortest interval handed to a real timer
const MIN_INTERVAL: Duration = Duration::from_micros(100);

/// Identifies one scheduled periodic timer
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct TimerId(u64);

impl TimerId {
    pub fn new(raw: u64) -> Self {
        Self(raw)
    }

    pub fn raw(self) -> u64 {
        self.0
    }
}

impl fmt::Display for TimerId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "timer#{}", self.0)
    }
}

/// Starts and cancels periodic step callbacks
pub trait StepScheduler {
    /// Start a timer that fires every `interval`, first after one interval
    fn schedule(&mut self, interval: Duration) -> TimerId;

    /// Cancel a timer. Unknown or already cancelled ids are ignored.
    fn cancel(&mut self, id: TimerId);
}

impl<S: StepScheduler + ?Sized> StepScheduler for Box<S> {
    fn schedule(&mut self, interval: Duration) -> TimerId {
        (**self).schedule(interval)
    }

    fn cancel(&mut self, id: TimerId) {
        (**self).cancel(id)
    }
}

/// Scheduler that only bookkeeps timers.
///
/// Nothing fires on its own; the owner delivers `Command::Tick(id)` by hand.
/// Used by tests and for driving the engine synchronously.
#[derive(Debug, Default)]
pub struct ManualScheduler {
    next_id: u64,
    active: BTreeMap<TimerId, Duration>,
}

impl ManualScheduler {
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of timers currently running
    pub fn active_count(&self) -> usize {
        self.active.len()
    }

    pub fn is_active(&self, id: TimerId) -> bool {
        self.active.contains_key(&id)
    }

    /// Interval of a running timer
    pub fn interval(&self, id: TimerId) -> Option<Duration> {
        self.active.get(&id).copied()
    }

    /// Ids of running timers, oldest first
    pub fn active_timers(&self) -> Vec<TimerId> {
        self.active.keys().copied().collect()
    }

    /// Total timers ever scheduled
    pub fn scheduled_total(&self) -> u64 {
        self.next_id
    }
}

impl StepScheduler for ManualScheduler {
    fn schedule(&mut self, interval: Duration) -> TimerId {
        self.next_id += 1;
        let id = TimerId(self.next_id);
        self.active.insert(id, interval);
        id
    }

    fn cancel(&mut self, id: TimerId) {
        self.active.remove(&id);
    }
}

/// Scheduler backed by tokio interval tasks.
///
/// Each timer is a task that posts `Command::Tick(id)` into the engine's
/// command queue. Cancelling aborts the task. The task holds only a weak
/// sender, so timers never keep the command queue open by themselves.
/// Must be used from within a tokio runtime.
pub struct TokioScheduler {
    commands: WeakUnboundedSender<Command>,
    next_id: u64,
    tasks: HashMap<TimerId, JoinHandle<()>>,
}

impl TokioScheduler {
    /// Create a scheduler posting ticks into `commands`
    pub fn new(commands: &UnboundedSender<Command>) -> Self {
        Self {
            commands: commands.downgrade(),
            next_id: 0,
            tasks: HashMap::new(),
        }
    }

    /// Number of timer tasks currently held
    pub fn active_count(&self) -> usize {
        self.tasks.len()
    }
}

impl StepScheduler for TokioScheduler {
    fn schedule(&mut self, interval: Duration) -> TimerId {
        self.next_id += 1;
        let id = TimerId(self.next_id);
        let interval = interval.max(MIN_INTERVAL);
        let commands = self.commands.clone();

        let task = tokio::spawn(async move {
            let mut ticker = time::interval_at(Instant::now() + interval, interval);
            ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);
            loop {
                ticker.tick().await;
                let Some(sender) = commands.upgrade() else {
                    break;
                };
                if sender.send(Command::Tick(id)).is_err() {
                    break;
                }
                trace!(%id, "tick posted");
            }
        });

        debug!(%id, interval_ms = interval.as_secs_f64() * 1000.0, "timer scheduled");
        self.tasks.insert(id, task);
        id
    }

    fn cancel(&mut self, id: TimerId) {
        if let Some(task) = self.tasks.remove(&id) {
            task.abort();
            debug!(%id, "timer cancelled");
        }
    }
}

impl Drop for TokioScheduler {
    fn drop(&mut self) {
        for (_, task) in self.tasks.drain() {
            task.abort();
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tokio::sync::mpsc;

    #[test]
    fn test_manual_schedule_cancel() {
        let mut scheduler = ManualScheduler::new();
        let a = scheduler.schedule(Duration::from_millis(125));
        let b = scheduler.schedule(Duration::from_millis(250));

        assert_ne!(a, b);
        assert_eq!(scheduler.active_count(), 2);
        assert_eq!(scheduler.interval(a), Some(Duration::from_millis(125)));

        scheduler.cancel(a);
        assert!(!scheduler.is_active(a));
        assert_eq!(scheduler.active_timers(), vec![b]);

        // Cancelling twice is harmless
        scheduler.cancel(a);
        assert_eq!(scheduler.active_count(), 1);
        assert_eq!(scheduler.scheduled_total(), 2);
    }

    #[test]
    fn test_timer_id_display() {
        assert_eq!(TimerId::new(7).to_string(), "timer#7");
        assert_eq!(TimerId::new(7).raw(), 7);
    }

    #[tokio::test(start_paused = true)]
    async fn test_tokio_timer_posts_ticks() {
        let (tx, mut rx) = mpsc::unbounded_channel();
        let mut scheduler = TokioScheduler::new(&tx);
        let id = scheduler.schedule(Duration::from_millis(125));

        // Nothing before the first interval
        time::sleep(Duration::from_millis(100)).await;
        assert!(rx.try_recv().is_err());

        time::sleep(Duration::from_millis(300)).await;
        let mut ticks = 0;
        while let Ok(command) = rx.try_recv() {
            assert_eq!(command, Command::Tick(id));
            ticks += 1;
        }
        // Fired at 125, 250 and 375 ms
        assert_eq!(ticks, 3);
    }

    #[tokio::test(start_paused = true)]
    async fn test_tokio_cancel_stops_ticks() {
        let (tx, mut rx) = mpsc::unbounded_channel();
        let mut scheduler = TokioScheduler::new(&tx);
        let id = scheduler.schedule(Duration::from_millis(50));

        time::sleep(Duration::from_millis(60)).await;
        assert_eq!(rx.try_recv().ok(), Some(Command::Tick(id)));

        scheduler.cancel(id);
        assert_eq!(scheduler.active_count(), 0);

        time::sleep(Duration::from_millis(500)).await;
        assert!(rx.try_recv().is_err());
    }
}
