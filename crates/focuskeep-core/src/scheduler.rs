//! Cooperative tick cadence.
//!
//! The scheduler is purely a cadence source: it never mutates timer state
//! itself, it only asks the registry to re-evaluate completion and
//! publishes the resulting snapshot. All registry access is serialized
//! through one shared handle, so every mutation still happens on a single
//! logical execution context.
//!
//! Host lifecycle signals arrive on a channel. Backgrounding, resigning
//! active and terminating trigger a persistence write; returning to the
//! foreground forces one immediate tick so drift accumulated while
//! suspended is resolved without waiting for the next cadence.

use std::sync::{Arc, Mutex};
use std::time::Duration;

use tokio::sync::{broadcast, mpsc};
use tokio::time::MissedTickBehavior;

use crate::events::TickUpdate;
use crate::timer::TimerRegistry;

/// Tick cadence reference value, in seconds.
pub const DEFAULT_TICK_INTERVAL_SECS: u64 = 1;

const UPDATE_CHANNEL_CAPACITY: usize = 64;

/// Zero-argument notifications from the host environment.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LifecycleSignal {
    EnterBackground,
    WillResignActive,
    WillTerminate,
    EnterForeground,
}

/// Caller-facing handle: subscribe to tick updates, inject lifecycle
/// signals. Dropping every handle ends the scheduler loop.
#[derive(Clone)]
pub struct SchedulerHandle {
    updates: broadcast::Sender<TickUpdate>,
    signals: mpsc::UnboundedSender<LifecycleSignal>,
}

impl SchedulerHandle {
    pub fn subscribe(&self) -> broadcast::Receiver<TickUpdate> {
        self.updates.subscribe()
    }

    /// Returns false once the scheduler has shut down.
    pub fn signal(&self, signal: LifecycleSignal) -> bool {
        self.signals.send(signal).is_ok()
    }
}

pub struct TickScheduler {
    registry: Arc<Mutex<TimerRegistry>>,
    tick_interval: Duration,
    updates: broadcast::Sender<TickUpdate>,
    signals: mpsc::UnboundedReceiver<LifecycleSignal>,
}

impl TickScheduler {
    pub fn new(registry: Arc<Mutex<TimerRegistry>>) -> (Self, SchedulerHandle) {
        Self::with_interval(registry, Duration::from_secs(DEFAULT_TICK_INTERVAL_SECS))
    }

    pub fn with_interval(
        registry: Arc<Mutex<TimerRegistry>>,
        tick_interval: Duration,
    ) -> (Self, SchedulerHandle) {
        let (updates, _) = broadcast::channel(UPDATE_CHANNEL_CAPACITY);
        let (signal_tx, signal_rx) = mpsc::unbounded_channel();
        let scheduler = Self {
            registry,
            tick_interval,
            updates: updates.clone(),
            signals: signal_rx,
        };
        let handle = SchedulerHandle {
            updates,
            signals: signal_tx,
        };
        (scheduler, handle)
    }

    /// Drive the cadence until every [`SchedulerHandle`] is dropped.
    pub async fn run(mut self) {
        let mut interval = tokio::time::interval(self.tick_interval);
        interval.set_missed_tick_behavior(MissedTickBehavior::Delay);

        loop {
            tokio::select! {
                _ = interval.tick() => {
                    self.step();
                }
                signal = self.signals.recv() => {
                    match signal {
                        Some(LifecycleSignal::EnterForeground) => self.step(),
                        Some(_) => {
                            self.registry
                                .lock()
                                .unwrap_or_else(|e| e.into_inner())
                                .persist_for_lifecycle();
                        }
                        None => break,
                    }
                }
            }
        }
    }

    fn step(&mut self) {
        let update = {
            let mut registry = self.registry.lock().unwrap_or_else(|e| e.into_inner());
            let outcome = registry.tick();
            TickUpdate {
                states: registry.snapshot(),
                completed: outcome.completed,
                at: registry.now(),
            }
        };
        // Nobody listening is fine.
        let _ = self.updates.send(update);
    }
}
