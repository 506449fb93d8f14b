//! Cold-start reconciliation.
//!
//! Runs once, when the registry is constructed: each persisted entry is
//! corrected for the real time that passed while the process was not
//! running. Paused entries need no correction, their countdown was frozen.
//! Running entries whose time ran out while the process was down go
//! straight to the completed-awaiting list instead of the live registry.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::state::TimerState;

/// Advisory summary of what recovery restored, for caller-facing
/// "timers were restored" UX. Does not gate correctness.
#[derive(Debug, Clone, Copy, Default, Serialize, Deserialize)]
pub struct RecoveryReport {
    pub restored: bool,
    /// Entries restored into the live registry (running or paused).
    pub live: usize,
    /// Entries that completed while the process was not running.
    pub completed: usize,
}

pub(crate) struct Reconciliation {
    pub live: Vec<TimerState>,
    pub completed: Vec<TimerState>,
    pub report: RecoveryReport,
}

pub(crate) fn reconcile(states: Vec<TimerState>, now: DateTime<Utc>) -> Reconciliation {
    let mut live = Vec::new();
    let mut completed = Vec::new();

    for state in states {
        if state.is_paused {
            live.push(state);
        } else if state.remaining(now) == 0 {
            completed.push(state);
        } else {
            live.push(state);
        }
    }

    let report = RecoveryReport {
        restored: !live.is_empty() || !completed.is_empty(),
        live: live.len(),
        completed: completed.len(),
    };
    Reconciliation {
        live,
        completed,
        report,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::timer::{CategorySnapshot, EntityId};
    use chrono::{Duration, TimeZone};
    use uuid::Uuid;

    fn t0() -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2026, 3, 2, 8, 0, 0).unwrap()
    }

    fn state(total_secs: u64) -> TimerState {
        TimerState::started(
            EntityId::new(),
            "Avery",
            CategorySnapshot {
                id: Uuid::new_v4(),
                label: "Reading".into(),
                icon: "book.fill".into(),
                color: "#FF6B6B".into(),
            },
            total_secs,
            t0(),
        )
    }

    #[test]
    fn empty_input_reports_nothing_restored() {
        let recon = reconcile(Vec::new(), t0());
        assert!(!recon.report.restored);
        assert_eq!(recon.report.live, 0);
        assert_eq!(recon.report.completed, 0);
    }

    #[test]
    fn running_entry_stays_live_while_time_remains() {
        let recon = reconcile(vec![state(60)], t0() + Duration::seconds(30));
        assert_eq!(recon.live.len(), 1);
        assert!(recon.completed.is_empty());
        assert_eq!(recon.live[0].remaining(t0() + Duration::seconds(30)), 30);
        assert!(recon.report.restored);
    }

    #[test]
    fn downtime_past_zero_lands_in_completed() {
        // Persisted running with 60s total, recovered 90s later.
        let recon = reconcile(vec![state(60)], t0() + Duration::seconds(90));
        assert!(recon.live.is_empty());
        assert_eq!(recon.completed.len(), 1);
        assert_eq!(recon.report.completed, 1);
    }

    #[test]
    fn downtime_exactly_at_zero_completes() {
        let recon = reconcile(vec![state(60)], t0() + Duration::seconds(60));
        assert!(recon.live.is_empty());
        assert_eq!(recon.completed.len(), 1);
    }

    #[test]
    fn paused_entry_is_kept_frozen() {
        let paused = state(60).paused(t0() + Duration::seconds(10));
        let much_later = t0() + Duration::seconds(86_400);

        let recon = reconcile(vec![paused], much_later);
        assert_eq!(recon.live.len(), 1);
        assert!(recon.completed.is_empty());
        assert!(recon.live[0].is_paused);
        assert_eq!(recon.live[0].remaining(much_later), 50);
    }

    #[test]
    fn mixed_entries_are_partitioned() {
        let live_one = state(600);
        let gone = state(30);
        let paused = state(300).paused(t0() + Duration::seconds(5));

        let recon = reconcile(vec![live_one, gone, paused], t0() + Duration::seconds(60));
        assert_eq!(recon.live.len(), 2);
        assert_eq!(recon.completed.len(), 1);
        assert!(recon.report.restored);
    }
}
