//! # FocusKeep Core Library
//!
//! This library provides the timer engine for FocusKeep: an independent
//! countdown per tracked child, persisted across process restarts and
//! reconciled against wall-clock time on recovery.
//!
//! ## Architecture
//!
//! - **Timer Registry**: A wall-clock-based state machine that owns every
//!   live countdown and requires the caller (or the [`TickScheduler`]) to
//!   periodically invoke `tick()` for completion detection
//! - **Persistence**: A single policy object decides when to write the
//!   snapshot blob (every mutation, a low-frequency safety interval while
//!   running, and host lifecycle transitions); a SQLite key-value store
//!   holds the blob
//! - **Recovery**: At construction the registry reloads the persisted
//!   snapshot and corrects each entry for the time the process was not
//!   running
//! - **Reminders**: Host notifications are an injected capability; the
//!   engine schedules and cancels them but never relies on them for its
//!   own completion truth
//!
//! ## Key Components
//!
//! - [`TimerRegistry`]: Multi-child countdown state machine
//! - [`PersistenceDriver`]: Write policy over a [`SnapshotStore`]
//! - [`TickScheduler`]: Cadence source publishing [`TickUpdate`]s
//! - [`ReminderPort`]: Trait boundary to the host notification system
//! - [`Config`]: Engine configuration management

pub mod clock;
pub mod codec;
pub mod config;
pub mod error;
pub mod events;
pub mod persist;
pub mod reminder;
pub mod scheduler;
pub mod store;
pub mod timer;

pub use clock::{Clock, ManualClock, SystemClock};
pub use config::Config;
pub use error::{CodecError, ConfigError, CoreError, RegistryError, Result, StoreError};
pub use events::{Event, TickUpdate, TimerSnapshot};
pub use persist::PersistenceDriver;
pub use reminder::{NullReminderPort, ReminderPort};
pub use scheduler::{LifecycleSignal, SchedulerHandle, TickScheduler};
pub use store::{MemoryStore, SnapshotStore, SqliteStore};
pub use timer::{CategorySnapshot, EntityId, RecoveryReport, TickOutcome, TimerRegistry, TimerState};
