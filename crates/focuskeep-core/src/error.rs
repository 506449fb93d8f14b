//! Core error types for focuskeep-core.
//!
//! Nothing in this hierarchy is fatal to the engine: registry errors are
//! caller mistakes, codec and store errors are recovered by discarding the
//! snapshot or retrying on the next write.

use std::path::PathBuf;
use thiserror::Error;

use crate::timer::EntityId;

/// Core error type for focuskeep-core.
#[derive(Error, Debug)]
pub enum CoreError {
    /// Registry-level errors
    #[error("registry error: {0}")]
    Registry(#[from] RegistryError),

    /// Snapshot encode/decode errors
    #[error("codec error: {0}")]
    Codec(#[from] CodecError),

    /// Durable store errors
    #[error("store error: {0}")]
    Store(#[from] StoreError),

    /// Configuration errors
    #[error("configuration error: {0}")]
    Config(#[from] ConfigError),

    /// IO errors
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// Serialization/deserialization errors
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

/// Errors returned by [`crate::TimerRegistry`] mutations.
#[derive(Error, Debug, PartialEq, Eq)]
pub enum RegistryError {
    /// `start` was called while the entity already has a live timer.
    /// Callers must `stop` first.
    #[error("a timer is already running for entity {entity_id}")]
    AlreadyRunning { entity_id: EntityId },

    /// A mutation referenced an entity with no live timer.
    #[error("no timer found for entity {entity_id}")]
    NotFound { entity_id: EntityId },

    /// A zero duration was supplied.
    #[error("duration must be greater than zero")]
    InvalidDuration,
}

/// Snapshot codec errors.
#[derive(Error, Debug)]
pub enum CodecError {
    /// Failed to serialize the snapshot
    #[error("failed to encode timer snapshot: {0}")]
    Encode(String),

    /// The persisted blob is not a valid snapshot
    #[error("malformed timer snapshot: {0}")]
    Decode(#[from] serde_json::Error),
}

/// Durable store errors.
#[derive(Error, Debug)]
pub enum StoreError {
    /// Failed to open the backing database
    #[error("failed to open store at {path}: {source}")]
    OpenFailed {
        path: PathBuf,
        #[source]
        source: rusqlite::Error,
    },

    /// Read failed
    #[error("store read failed: {0}")]
    ReadFailed(String),

    /// Write failed
    #[error("store write failed: {0}")]
    WriteFailed(String),

    /// IO errors
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

/// Configuration errors.
#[derive(Error, Debug)]
pub enum ConfigError {
    /// Failed to load configuration
    #[error("failed to load configuration from {path}: {message}")]
    LoadFailed { path: PathBuf, message: String },

    /// Failed to save configuration
    #[error("failed to save configuration to {path}: {message}")]
    SaveFailed { path: PathBuf, message: String },

    /// Unknown configuration key
    #[error("unknown configuration key: {0}")]
    UnknownKey(String),

    /// Invalid configuration value
    #[error("invalid configuration value for '{key}': {message}")]
    InvalidValue { key: String, message: String },
}

/// Result type alias for CoreError
pub type Result<T, E = CoreError> = std::result::Result<T, E>;
