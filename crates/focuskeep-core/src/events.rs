use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::timer::{CategorySnapshot, EntityId};

/// Every observable state change in the engine produces an Event.
/// Callers log or display them; the engine itself never consumes them.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "type")]
pub enum Event {
    TimerStarted {
        entity_id: EntityId,
        entity_label: String,
        category_label: String,
        duration_secs: u64,
        at: DateTime<Utc>,
    },
    TimerPaused {
        entity_id: EntityId,
        remaining_secs: u64,
        at: DateTime<Utc>,
    },
    TimerResumed {
        entity_id: EntityId,
        remaining_secs: u64,
        at: DateTime<Utc>,
    },
    TimeAdded {
        entity_id: EntityId,
        added_secs: u64,
        total_secs: u64,
        at: DateTime<Utc>,
    },
    TimerStopped {
        entity_id: EntityId,
        remaining_secs: u64,
        at: DateTime<Utc>,
    },
    TimerCompleted {
        entity_id: EntityId,
        entity_label: String,
        category_label: String,
        total_secs: u64,
        at: DateTime<Utc>,
    },
}

/// Per-child row of the live snapshot published after each tick.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TimerSnapshot {
    pub entity_id: EntityId,
    pub entity_label: String,
    pub category: CategorySnapshot,
    pub remaining_secs: u64,
    pub total_secs: u64,
    pub is_paused: bool,
    /// 0.0 .. 1.0 progress toward completion.
    pub progress: f64,
}

/// Payload broadcast to subscribers after every tick.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TickUpdate {
    pub states: Vec<TimerSnapshot>,
    /// Entities that completed during this tick.
    pub completed: Vec<EntityId>,
    pub at: DateTime<Utc>,
}
