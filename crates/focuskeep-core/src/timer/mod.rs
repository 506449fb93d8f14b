mod recovery;
mod registry;
mod state;

pub use recovery::RecoveryReport;
pub use registry::{TickOutcome, TimerRegistry};
pub use state::{CategorySnapshot, EntityId, TimerState};
