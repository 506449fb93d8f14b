//! Per-child countdown state.
//!
//! A [`TimerState`] is pure data plus derived calculations; it performs no
//! I/O and never reads the clock itself. All timing math is anchored on
//! `started_at`, which stays fixed for the life of a run: pause spans
//! accumulate into `paused_secs` on resume, so `remaining` is frozen while
//! paused and resumes exactly where it left off.

use std::fmt;
use std::str::FromStr;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Opaque identity of a tracked child, stable across restarts.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize,
)]
#[serde(transparent)]
pub struct EntityId(Uuid);

impl EntityId {
    pub fn new() -> Self {
        Self(Uuid::new_v4())
    }

    pub fn as_uuid(&self) -> &Uuid {
        &self.0
    }
}

impl From<Uuid> for EntityId {
    fn from(id: Uuid) -> Self {
        Self(id)
    }
}

impl fmt::Display for EntityId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        self.0.fmt(f)
    }
}

impl FromStr for EntityId {
    type Err = uuid::Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Uuid::parse_str(s).map(Self)
    }
}

/// Denormalized activity category captured when the timer starts.
///
/// Recovery must not depend on a live join against category storage, which
/// may have changed or been deleted while the timer was running.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CategorySnapshot {
    pub id: Uuid,
    pub label: String,
    pub icon: String,
    pub color: String,
}

/// One child's countdown: identity, category snapshot, timing anchors and
/// pause bookkeeping.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TimerState {
    pub entity_id: EntityId,
    pub entity_label: String,
    pub category: CategorySnapshot,
    /// Wall-clock instant the countdown was armed.
    pub started_at: DateTime<Utc>,
    /// Total countdown length in seconds. Grows only via an explicit
    /// add-time operation.
    pub total_secs: u64,
    /// Sum of all prior pause spans for this run, in seconds.
    #[serde(default)]
    pub paused_secs: u64,
    /// Start of the current pause, absent while running.
    #[serde(default)]
    pub paused_at: Option<DateTime<Utc>>,
    /// Redundant with `paused_at` presence, kept explicit in the
    /// serialized form.
    #[serde(default)]
    pub is_paused: bool,
}

impl TimerState {
    /// Create the initial running state for a fresh countdown.
    pub fn started(
        entity_id: EntityId,
        entity_label: &str,
        category: CategorySnapshot,
        total_secs: u64,
        now: DateTime<Utc>,
    ) -> Self {
        Self {
            entity_id,
            entity_label: entity_label.to_string(),
            category,
            started_at: now,
            total_secs,
            paused_secs: 0,
            paused_at: None,
            is_paused: false,
        }
    }

    /// Seconds the countdown has actually been running, net of pauses.
    pub fn elapsed_running(&self, now: DateTime<Utc>) -> u64 {
        let anchor = self.paused_at.unwrap_or(now);
        let gross = (anchor - self.started_at).num_seconds().max(0) as u64;
        gross.saturating_sub(self.paused_secs)
    }

    /// Seconds left on the countdown, clamped at zero.
    pub fn remaining(&self, now: DateTime<Utc>) -> u64 {
        self.total_secs.saturating_sub(self.elapsed_running(now))
    }

    /// A paused timer is never complete, whatever the clock says.
    pub fn is_complete(&self, now: DateTime<Utc>) -> bool {
        self.remaining(now) == 0 && !self.is_paused
    }

    /// 0.0 .. 1.0 progress toward completion.
    pub fn progress(&self, now: DateTime<Utc>) -> f64 {
        if self.total_secs == 0 {
            return 0.0;
        }
        1.0 - (self.remaining(now) as f64 / self.total_secs as f64)
    }

    /// A paused copy of this state. No-op when already paused.
    pub fn paused(&self, now: DateTime<Utc>) -> Self {
        if self.is_paused {
            return self.clone();
        }
        Self {
            paused_at: Some(now),
            is_paused: true,
            ..self.clone()
        }
    }

    /// A resumed copy, with the just-ended pause span folded into
    /// `paused_secs`. No-op when not paused.
    pub fn resumed(&self, now: DateTime<Utc>) -> Self {
        let Some(paused_at) = self.paused_at else {
            return self.clone();
        };
        let span = (now - paused_at).num_seconds().max(0) as u64;
        Self {
            paused_secs: self.paused_secs + span,
            paused_at: None,
            is_paused: false,
            ..self.clone()
        }
    }

    /// A copy with the countdown extended by `secs`.
    pub fn with_added_secs(&self, secs: u64) -> Self {
        Self {
            total_secs: self.total_secs.saturating_add(secs),
            ..self.clone()
        }
    }

    /// Reminder text, e.g. `"Avery's Reading"`.
    pub(crate) fn reminder_label(&self) -> String {
        format!("{}'s {}", self.entity_label, self.category.label)
    }
}
