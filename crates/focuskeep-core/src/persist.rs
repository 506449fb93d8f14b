//! Persistence write policy.
//!
//! The driver is policy, not mechanism: it owns the only call site into the
//! codec and store, and decides whether a given trigger warrants a write.
//! Three triggers exist: a registry mutation (always write), the periodic
//! safety interval (write only while something is actually counting down),
//! and a host lifecycle transition (always write; callers gate on the
//! registry being non-empty).
//!
//! Write failures are logged and swallowed. Losing the most recent snapshot
//! only risks under-recovery, never corruption, and the last-write marker is
//! advanced only on success so the next tick retries naturally.

use chrono::{DateTime, Duration, Utc};

use crate::codec;
use crate::store::SnapshotStore;
use crate::timer::TimerState;

/// Safety-interval reference value, in seconds.
pub const DEFAULT_PERSIST_INTERVAL_SECS: u64 = 10;

pub struct PersistenceDriver {
    store: Box<dyn SnapshotStore>,
    interval: Duration,
    last_write: Option<DateTime<Utc>>,
}

impl PersistenceDriver {
    pub fn new(store: Box<dyn SnapshotStore>) -> Self {
        Self {
            store,
            interval: Duration::seconds(DEFAULT_PERSIST_INTERVAL_SECS as i64),
            last_write: None,
        }
    }

    /// Override the safety interval.
    pub fn with_interval_secs(mut self, secs: u64) -> Self {
        self.interval = Duration::seconds(secs as i64);
        self
    }

    /// A registry mutation changed observable state.
    pub fn after_mutation(&mut self, states: &[TimerState], now: DateTime<Utc>) {
        self.write(states, now);
    }

    /// Periodic safety write. Paused timers' derived state does not change
    /// over time, so re-persisting a registry with nothing running is
    /// wasted work.
    pub fn on_tick(&mut self, states: &[TimerState], any_running: bool, now: DateTime<Utc>) {
        if !any_running {
            return;
        }
        let due = match self.last_write {
            None => true,
            Some(at) => now - at >= self.interval,
        };
        if due {
            self.write(states, now);
        }
    }

    /// The host is backgrounding, resigning active, or terminating.
    pub fn on_lifecycle(&mut self, states: &[TimerState], now: DateTime<Utc>) {
        self.write(states, now);
    }

    /// Load and decode the persisted snapshot. Absence and corruption both
    /// come back as an empty list; a corrupt blob is discarded, not
    /// propagated.
    pub fn load(&self) -> Vec<TimerState> {
        let bytes = match self.store.load() {
            Ok(Some(bytes)) => bytes,
            Ok(None) => return Vec::new(),
            Err(e) => {
                tracing::warn!(error = %e, "failed to read persisted timers, starting empty");
                return Vec::new();
            }
        };
        match codec::decode(&bytes) {
            Ok(states) => states,
            Err(e) => {
                tracing::warn!(error = %e, "discarding corrupt timer snapshot");
                Vec::new()
            }
        }
    }

    fn write(&mut self, states: &[TimerState], now: DateTime<Utc>) {
        let bytes = match codec::encode(states) {
            Ok(bytes) => bytes,
            Err(e) => {
                tracing::warn!(error = %e, "failed to encode timer snapshot");
                return;
            }
        };
        match self.store.save(&bytes) {
            Ok(()) => self.last_write = Some(now),
            Err(e) => {
                tracing::warn!(error = %e, "failed to persist timer snapshot");
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::StoreError;
    use crate::store::MemoryStore;
    use crate::timer::{CategorySnapshot, EntityId, TimerState};
    use chrono::TimeZone;
    use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
    use std::sync::Arc;

    /// Store that counts saves and can be told to fail them.
    #[derive(Clone, Default)]
    struct FlakyStore {
        saves: Arc<AtomicUsize>,
        failing: Arc<AtomicBool>,
    }

    impl SnapshotStore for FlakyStore {
        fn load(&self) -> Result<Option<Vec<u8>>, StoreError> {
            Ok(None)
        }

        fn save(&self, _bytes: &[u8]) -> Result<(), StoreError> {
            if self.failing.load(Ordering::SeqCst) {
                return Err(StoreError::WriteFailed("disk full".into()));
            }
            self.saves.fetch_add(1, Ordering::SeqCst);
            Ok(())
        }
    }

    fn t0() -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2026, 3, 2, 8, 0, 0).unwrap()
    }

    fn running_state() -> TimerState {
        TimerState::started(
            EntityId::new(),
            "Avery",
            CategorySnapshot {
                id: uuid::Uuid::new_v4(),
                label: "Reading".into(),
                icon: "book.fill".into(),
                color: "#FF6B6B".into(),
            },
            1500,
            t0(),
        )
    }

    #[test]
    fn mutation_always_writes() {
        let store = FlakyStore::default();
        let mut driver = PersistenceDriver::new(Box::new(store.clone()));

        driver.after_mutation(&[running_state()], t0());
        driver.after_mutation(&[running_state()], t0());
        assert_eq!(store.saves.load(Ordering::SeqCst), 2);
    }

    #[test]
    fn tick_writes_only_after_interval() {
        let store = FlakyStore::default();
        let mut driver = PersistenceDriver::new(Box::new(store.clone()));
        let states = [running_state()];

        driver.after_mutation(&states, t0());
        assert_eq!(store.saves.load(Ordering::SeqCst), 1);

        driver.on_tick(&states, true, t0() + Duration::seconds(5));
        assert_eq!(store.saves.load(Ordering::SeqCst), 1);

        driver.on_tick(&states, true, t0() + Duration::seconds(10));
        assert_eq!(store.saves.load(Ordering::SeqCst), 2);

        // Interval restarts from the last successful write.
        driver.on_tick(&states, true, t0() + Duration::seconds(15));
        assert_eq!(store.saves.load(Ordering::SeqCst), 2);
    }

    #[test]
    fn tick_never_writes_while_nothing_runs() {
        let store = FlakyStore::default();
        let mut driver = PersistenceDriver::new(Box::new(store.clone()));
        let paused = [running_state().paused(t0())];

        driver.on_tick(&paused, false, t0() + Duration::seconds(60));
        driver.on_tick(&paused, false, t0() + Duration::seconds(600));
        assert_eq!(store.saves.load(Ordering::SeqCst), 0);
    }

    #[test]
    fn lifecycle_always_writes() {
        let store = FlakyStore::default();
        let mut driver = PersistenceDriver::new(Box::new(store.clone()));

        driver.on_lifecycle(&[running_state()], t0());
        driver.on_lifecycle(&[running_state()], t0());
        assert_eq!(store.saves.load(Ordering::SeqCst), 2);
    }

    #[test]
    fn write_failure_is_swallowed_and_retried() {
        let store = FlakyStore::default();
        store.failing.store(true, Ordering::SeqCst);
        let mut driver = PersistenceDriver::new(Box::new(store.clone()));
        let states = [running_state()];

        // Does not panic, does not advance the last-write marker.
        driver.after_mutation(&states, t0());
        assert_eq!(store.saves.load(Ordering::SeqCst), 0);

        store.failing.store(false, Ordering::SeqCst);
        driver.on_tick(&states, true, t0() + Duration::seconds(1));
        assert_eq!(store.saves.load(Ordering::SeqCst), 1);
    }

    #[test]
    fn load_tolerates_absence_and_corruption() {
        let store = MemoryStore::new();
        let driver = PersistenceDriver::new(Box::new(store.clone()));
        assert!(driver.load().is_empty());

        store.save(b"{ definitely not a snapshot").unwrap();
        assert!(driver.load().is_empty());

        let states = vec![running_state()];
        store.save(&codec::encode(&states).unwrap()).unwrap();
        assert_eq!(driver.load(), states);
    }

    #[test]
    fn custom_interval_is_honored() {
        let store = FlakyStore::default();
        let mut driver =
            PersistenceDriver::new(Box::new(store.clone())).with_interval_secs(30);
        let states = [running_state()];

        driver.after_mutation(&states, t0());
        driver.on_tick(&states, true, t0() + Duration::seconds(10));
        assert_eq!(store.saves.load(Ordering::SeqCst), 1);

        driver.on_tick(&states, true, t0() + Duration::seconds(30));
        assert_eq!(store.saves.load(Ordering::SeqCst), 2);
    }
}
