//! Multi-child timer registry.
//!
//! The registry owns every live countdown and all mutation logic. It is a
//! wall-clock state machine with no internal thread: the caller (or the
//! [`crate::TickScheduler`]) invokes `tick()` periodically for completion
//! detection. Clock, reminder port and persistence policy are injected, so
//! tests can simulate arbitrary downtime deterministically.
//!
//! Completion moves a state into a transient awaiting-acknowledgment list
//! rather than deleting it outright, so a caller can record the outcome
//! before it disappears. Only live states are persisted; the awaiting list
//! is rebuilt by recovery when a countdown finishes while the process is
//! not running.

use std::collections::{HashMap, HashSet};

use chrono::{DateTime, Utc};

use crate::clock::Clock;
use crate::error::RegistryError;
use crate::events::{Event, TimerSnapshot};
use crate::persist::PersistenceDriver;
use crate::reminder::{ReminderPort, DEFAULT_WARNING_THRESHOLDS};

use super::recovery::{self, RecoveryReport};
use super::state::{CategorySnapshot, EntityId, TimerState};

/// Result of a single tick pass.
#[derive(Debug, Clone, Default)]
pub struct TickOutcome {
    /// Entities whose countdown reached zero during this call.
    pub completed: Vec<EntityId>,
    pub events: Vec<Event>,
}

pub struct TimerRegistry {
    timers: HashMap<EntityId, TimerState>,
    completed: Vec<TimerState>,
    clock: Box<dyn Clock>,
    reminders: Box<dyn ReminderPort>,
    driver: PersistenceDriver,
    warning_thresholds: Vec<u64>,
}

impl TimerRegistry {
    /// Build the registry from the persisted snapshot, reconciling each
    /// entry against the current wall clock. Runs exactly once per
    /// registry; an absent or corrupt snapshot yields an empty registry.
    pub fn restore(
        clock: Box<dyn Clock>,
        reminders: Box<dyn ReminderPort>,
        driver: PersistenceDriver,
    ) -> (Self, RecoveryReport) {
        Self::restore_with_thresholds(clock, reminders, driver, DEFAULT_WARNING_THRESHOLDS.to_vec())
    }

    pub fn restore_with_thresholds(
        clock: Box<dyn Clock>,
        reminders: Box<dyn ReminderPort>,
        driver: PersistenceDriver,
        warning_thresholds: Vec<u64>,
    ) -> (Self, RecoveryReport) {
        let mut registry = Self {
            timers: HashMap::new(),
            completed: Vec::new(),
            clock,
            reminders,
            driver,
            warning_thresholds,
        };

        let persisted = registry.driver.load();
        let recon = recovery::reconcile(persisted, registry.clock.now());

        for state in recon.live {
            if !state.is_paused {
                registry.arm_reminders(&state);
            }
            registry.timers.insert(state.entity_id, state);
        }
        for state in recon.completed {
            registry.reminders.cancel_all(state.entity_id);
            registry.completed.push(state);
        }

        if recon.report.restored {
            tracing::info!(
                live = recon.report.live,
                completed = recon.report.completed,
                "restored persisted timers"
            );
        }
        (registry, recon.report)
    }

    // ── Queries ──────────────────────────────────────────────────────

    pub fn now(&self) -> DateTime<Utc> {
        self.clock.now()
    }

    pub fn state_for(&self, entity_id: EntityId) -> Option<&TimerState> {
        self.timers.get(&entity_id)
    }

    pub fn has_timer(&self, entity_id: EntityId) -> bool {
        self.timers.contains_key(&entity_id)
    }

    /// Entities with a live, unpaused countdown.
    pub fn all_running_entity_ids(&self) -> HashSet<EntityId> {
        self.timers
            .values()
            .filter(|s| !s.is_paused)
            .map(|s| s.entity_id)
            .collect()
    }

    /// Entities with any live countdown, running or paused.
    pub fn active_entity_ids(&self) -> Vec<EntityId> {
        self.timers.keys().copied().collect()
    }

    /// Completed countdowns the caller has not acknowledged yet.
    pub fn completed_awaiting(&self) -> &[TimerState] {
        &self.completed
    }

    pub fn is_empty(&self) -> bool {
        self.timers.is_empty()
    }

    /// Per-entity snapshot rows for subscribers/UI, in a stable order.
    pub fn snapshot(&self) -> Vec<TimerSnapshot> {
        let now = self.clock.now();
        let mut rows: Vec<TimerSnapshot> = self
            .timers
            .values()
            .map(|s| TimerSnapshot {
                entity_id: s.entity_id,
                entity_label: s.entity_label.clone(),
                category: s.category.clone(),
                remaining_secs: s.remaining(now),
                total_secs: s.total_secs,
                is_paused: s.is_paused,
                progress: s.progress(now),
            })
            .collect();
        rows.sort_by(|a, b| {
            a.entity_label
                .cmp(&b.entity_label)
                .then(a.entity_id.cmp(&b.entity_id))
        });
        rows
    }

    // ── Commands ─────────────────────────────────────────────────────

    /// Arm a fresh countdown. Fails if the entity already has a live
    /// timer; callers must `stop` first.
    pub fn start(
        &mut self,
        entity_id: EntityId,
        entity_label: &str,
        category: CategorySnapshot,
        duration_secs: u64,
    ) -> Result<Event, RegistryError> {
        if duration_secs == 0 {
            return Err(RegistryError::InvalidDuration);
        }
        if self.timers.contains_key(&entity_id) {
            return Err(RegistryError::AlreadyRunning { entity_id });
        }

        let now = self.clock.now();
        let state = TimerState::started(entity_id, entity_label, category, duration_secs, now);
        self.arm_reminders(&state);

        let event = Event::TimerStarted {
            entity_id,
            entity_label: state.entity_label.clone(),
            category_label: state.category.label.clone(),
            duration_secs,
            at: now,
        };
        self.timers.insert(entity_id, state);
        self.persist_after_mutation();
        Ok(event)
    }

    /// Freeze a running countdown. No-op if absent or already paused.
    pub fn pause(&mut self, entity_id: EntityId) -> Option<Event> {
        let now = self.clock.now();
        let state = self.timers.get(&entity_id)?;
        if state.is_paused {
            return None;
        }

        let paused = state.paused(now);
        let remaining_secs = paused.remaining(now);
        self.timers.insert(entity_id, paused);
        self.reminders.cancel_all(entity_id);
        self.persist_after_mutation();
        Some(Event::TimerPaused {
            entity_id,
            remaining_secs,
            at: now,
        })
    }

    /// Unfreeze a paused countdown. No-op if absent or not paused.
    pub fn resume(&mut self, entity_id: EntityId) -> Option<Event> {
        let now = self.clock.now();
        let state = self.timers.get(&entity_id)?;
        if !state.is_paused {
            return None;
        }

        let resumed = state.resumed(now);
        let remaining_secs = resumed.remaining(now);
        self.arm_reminders(&resumed);
        self.timers.insert(entity_id, resumed);
        self.persist_after_mutation();
        Some(Event::TimerResumed {
            entity_id,
            remaining_secs,
            at: now,
        })
    }

    /// Extend a countdown. Reminders are re-armed against the new
    /// remaining when the timer is running.
    pub fn add_time(
        &mut self,
        entity_id: EntityId,
        added_secs: u64,
    ) -> Result<Event, RegistryError> {
        if added_secs == 0 {
            return Err(RegistryError::InvalidDuration);
        }
        let now = self.clock.now();
        let state = self
            .timers
            .get(&entity_id)
            .ok_or(RegistryError::NotFound { entity_id })?;

        let updated = state.with_added_secs(added_secs);
        let total_secs = updated.total_secs;
        if !updated.is_paused {
            self.reminders.cancel_all(entity_id);
            self.arm_reminders(&updated);
        }
        self.timers.insert(entity_id, updated);
        self.persist_after_mutation();
        Ok(Event::TimeAdded {
            entity_id,
            added_secs,
            total_secs,
            at: now,
        })
    }

    /// Remove a countdown without completing it. Idempotent.
    pub fn stop(&mut self, entity_id: EntityId) -> Option<Event> {
        let state = self.timers.remove(&entity_id)?;
        let now = self.clock.now();
        self.reminders.cancel_all(entity_id);
        self.persist_after_mutation();
        Some(Event::TimerStopped {
            entity_id,
            remaining_secs: state.remaining(now),
            at: now,
        })
    }

    /// Re-evaluate completion for every running entry. Paused entries are
    /// never touched. Returns the entities that completed during this call.
    pub fn tick(&mut self) -> TickOutcome {
        let now = self.clock.now();
        let mut outcome = TickOutcome::default();

        let finished: Vec<EntityId> = self
            .timers
            .values()
            .filter(|s| s.is_complete(now))
            .map(|s| s.entity_id)
            .collect();

        for entity_id in finished {
            if let Some(state) = self.timers.remove(&entity_id) {
                self.reminders.cancel_all(entity_id);
                outcome.events.push(Event::TimerCompleted {
                    entity_id,
                    entity_label: state.entity_label.clone(),
                    category_label: state.category.label.clone(),
                    total_secs: state.total_secs,
                    at: now,
                });
                outcome.completed.push(entity_id);
                self.completed.push(state);
            }
        }

        if !outcome.completed.is_empty() {
            self.persist_after_mutation();
        }

        let states = self.live_states();
        let any_running = self.timers.values().any(|s| !s.is_paused);
        self.driver.on_tick(&states, any_running, now);

        outcome
    }

    /// Caller confirms completion ahead of the countdown (the "done early"
    /// button). Removes the live entry and returns it for activity
    /// logging; does not pass through the awaiting list.
    pub fn complete_now(&mut self, entity_id: EntityId) -> Option<TimerState> {
        let state = self.timers.remove(&entity_id)?;
        self.reminders.cancel_all(entity_id);
        self.persist_after_mutation();
        Some(state)
    }

    /// Caller has recorded the outcome of a completed countdown.
    pub fn acknowledge(&mut self, entity_id: EntityId) -> Option<TimerState> {
        let idx = self
            .completed
            .iter()
            .position(|s| s.entity_id == entity_id)?;
        Some(self.completed.remove(idx))
    }

    /// Host lifecycle transition (backgrounding, resigning active,
    /// terminating). Persists only when there is something to persist.
    pub fn persist_for_lifecycle(&mut self) {
        if self.timers.is_empty() {
            return;
        }
        let states = self.live_states();
        let now = self.clock.now();
        self.driver.on_lifecycle(&states, now);
    }

    // ── Internal ─────────────────────────────────────────────────────

    fn live_states(&self) -> Vec<TimerState> {
        self.timers.values().cloned().collect()
    }

    fn persist_after_mutation(&mut self) {
        let states = self.live_states();
        let now = self.clock.now();
        self.driver.after_mutation(&states, now);
    }

    fn arm_reminders(&self, state: &TimerState) {
        let now = self.clock.now();
        let remaining = state.remaining(now);
        if remaining == 0 {
            return;
        }
        let label = state.reminder_label();
        self.reminders
            .schedule_completion(state.entity_id, remaining, &label);
        for &threshold in &self.warning_thresholds {
            if remaining > threshold {
                self.reminders
                    .schedule_threshold(state.entity_id, remaining, threshold, &label);
            }
        }
    }
}
