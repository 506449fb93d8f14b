use clap::Subcommand;
use focuskeep_core::{
    CategorySnapshot, Config, EntityId, NullReminderPort, PersistenceDriver, SqliteStore,
    SystemClock, TimerRegistry,
};
use uuid::Uuid;

#[derive(Subcommand)]
pub enum TimerAction {
    /// Start a countdown for a child
    Start {
        /// Child id (a new one is generated when omitted)
        #[arg(long)]
        entity: Option<Uuid>,
        /// Display name for the child
        #[arg(long)]
        label: String,
        /// Activity category name
        #[arg(long)]
        category: String,
        /// Category icon name
        #[arg(long, default_value = "timer")]
        icon: String,
        /// Category color hex
        #[arg(long, default_value = "#4ECDC4")]
        color: String,
        /// Countdown length in minutes (config default when omitted)
        #[arg(long)]
        minutes: Option<u64>,
    },
    /// Pause a running countdown
    Pause {
        #[arg(long)]
        entity: Uuid,
    },
    /// Resume a paused countdown
    Resume {
        #[arg(long)]
        entity: Uuid,
    },
    /// Stop and discard a countdown
    Stop {
        #[arg(long)]
        entity: Uuid,
    },
    /// Extend a countdown
    Add {
        #[arg(long)]
        entity: Uuid,
        #[arg(long)]
        minutes: u64,
    },
    /// Run one tick and print the live snapshot as JSON
    Status,
    /// Acknowledge a completed countdown
    Ack {
        #[arg(long)]
        entity: Uuid,
    },
}

fn open_registry(config: &Config) -> Result<TimerRegistry, Box<dyn std::error::Error>> {
    let store = SqliteStore::open()?;
    let driver =
        PersistenceDriver::new(Box::new(store)).with_interval_secs(config.persist_interval_secs);
    let (registry, report) = TimerRegistry::restore_with_thresholds(
        Box::new(SystemClock),
        Box::new(NullReminderPort),
        driver,
        config.warning_thresholds_secs.clone(),
    );
    if report.completed > 0 {
        eprintln!(
            "{} timer(s) finished while the app was closed; run `timer status` to see them",
            report.completed
        );
    }
    Ok(registry)
}

pub fn run(action: TimerAction) -> Result<(), Box<dyn std::error::Error>> {
    let config = Config::load_or_default();
    let mut registry = open_registry(&config)?;

    match action {
        TimerAction::Start {
            entity,
            label,
            category,
            icon,
            color,
            minutes,
        } => {
            let entity_id = entity.map(EntityId::from).unwrap_or_else(EntityId::new);
            let duration_secs = minutes
                .map(|m| m.saturating_mul(60))
                .unwrap_or(config.default_duration_secs);
            let snapshot = CategorySnapshot {
                id: Uuid::new_v4(),
                label: category,
                icon,
                color,
            };
            let event = registry.start(entity_id, &label, snapshot, duration_secs)?;
            println!("{}", serde_json::to_string_pretty(&event)?);
        }
        TimerAction::Pause { entity } => match registry.pause(entity.into()) {
            Some(event) => println!("{}", serde_json::to_string_pretty(&event)?),
            None => println!("{{\"type\": \"noop\"}}"),
        },
        TimerAction::Resume { entity } => match registry.resume(entity.into()) {
            Some(event) => println!("{}", serde_json::to_string_pretty(&event)?),
            None => println!("{{\"type\": \"noop\"}}"),
        },
        TimerAction::Stop { entity } => match registry.stop(entity.into()) {
            Some(event) => println!("{}", serde_json::to_string_pretty(&event)?),
            None => println!("{{\"type\": \"noop\"}}"),
        },
        TimerAction::Add { entity, minutes } => {
            let event = registry.add_time(entity.into(), minutes.saturating_mul(60))?;
            println!("{}", serde_json::to_string_pretty(&event)?);
        }
        TimerAction::Status => {
            let outcome = registry.tick();
            println!("{}", serde_json::to_string_pretty(&registry.snapshot())?);
            for event in outcome.events {
                println!("{}", serde_json::to_string_pretty(&event)?);
            }
        }
        TimerAction::Ack { entity } => match registry.acknowledge(entity.into()) {
            Some(state) => println!("{}", serde_json::to_string_pretty(&state)?),
            None => println!("{{\"type\": \"noop\"}}"),
        },
    }

    Ok(())
}
