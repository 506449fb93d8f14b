//! Boundary to the host reminder/notification system.
//!
//! The engine schedules reminders as a best-effort courtesy and never
//! assumes they fired; completion truth comes from its own tick loop.
//! Implementations are expected to address reminders per entity. A
//! mechanism that can only cancel globally should reintroduce the
//! cancel-everything-then-re-arm-the-others dance inside its adapter, not
//! here.

use crate::timer::EntityId;

/// Warning look-ahead offsets in seconds: five minutes and one minute.
pub const DEFAULT_WARNING_THRESHOLDS: [u64; 2] = [300, 60];

/// Capability to schedule and cancel host-level reminders.
pub trait ReminderPort: Send {
    /// Arm the completion reminder `remaining_secs` from now.
    fn schedule_completion(&self, entity_id: EntityId, remaining_secs: u64, label: &str);

    /// Arm a warning that fires `threshold_secs` before completion. Only
    /// called when `remaining_secs` exceeds the threshold.
    fn schedule_threshold(
        &self,
        entity_id: EntityId,
        remaining_secs: u64,
        threshold_secs: u64,
        label: &str,
    );

    /// Drop every pending reminder for one entity. Others stay armed.
    fn cancel_all(&self, entity_id: EntityId);
}

/// Reminder sink that drops every request. For hosts without notifications
/// and for tests that don't care about reminder traffic.
#[derive(Debug, Clone, Copy, Default)]
pub struct NullReminderPort;

impl ReminderPort for NullReminderPort {
    fn schedule_completion(&self, _entity_id: EntityId, _remaining_secs: u64, _label: &str) {}

    fn schedule_threshold(
        &self,
        _entity_id: EntityId,
        _remaining_secs: u64,
        _threshold_secs: u64,
        _label: &str,
    ) {
    }

    fn cancel_all(&self, _entity_id: EntityId) {}
}
