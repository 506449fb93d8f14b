//! Durable snapshot storage.
//!
//! The engine treats the store as a key-value byte blob under a fixed key.
//! The blob is a derived, disposable cache of the live registry; absence
//! (first run) and corruption (interrupted write, downgrade) are both
//! tolerated upstream.

use std::path::{Path, PathBuf};
use std::sync::{Arc, Mutex};
use std::time::Duration;

use rusqlite::{params, Connection, OptionalExtension};

use crate::error::StoreError;

const STORAGE_KEY: &str = "timer_states";

/// Returns `~/.config/focuskeep[-dev]/` based on FOCUSKEEP_ENV.
///
/// Set FOCUSKEEP_ENV=dev to use the development data directory.
///
/// # Errors
/// Returns an error if creating the directory fails.
pub fn data_dir() -> Result<PathBuf, StoreError> {
    let base_dir = dirs::home_dir()
        .unwrap_or_else(|| PathBuf::from("."))
        .join(".config");

    let env = std::env::var("FOCUSKEEP_ENV").unwrap_or_else(|_| "production".to_string());

    let dir = if env == "dev" {
        base_dir.join("focuskeep-dev")
    } else {
        base_dir.join("focuskeep")
    };

    std::fs::create_dir_all(&dir)?;
    Ok(dir)
}

/// Byte-blob persistence boundary consumed by the persistence driver.
pub trait SnapshotStore: Send {
    /// `Ok(None)` on first run; errors only for real read failures.
    fn load(&self) -> Result<Option<Vec<u8>>, StoreError>;

    fn save(&self, bytes: &[u8]) -> Result<(), StoreError>;
}

/// SQLite-backed store holding the snapshot blob in a kv table.
pub struct SqliteStore {
    conn: Connection,
}

impl SqliteStore {
    /// Open the store at `~/.config/focuskeep/focuskeep.db`.
    ///
    /// Creates the database file and schema if they don't exist.
    pub fn open() -> Result<Self, StoreError> {
        let path = data_dir()?.join("focuskeep.db");
        Self::open_at(&path)
    }

    /// Open the store at an explicit path, for hosts that manage their own
    /// data directory.
    pub fn open_at(path: &Path) -> Result<Self, StoreError> {
        let conn = Connection::open(path).map_err(|source| StoreError::OpenFailed {
            path: path.to_path_buf(),
            source,
        })?;
        conn.busy_timeout(Duration::from_secs(5))
            .map_err(|e| StoreError::WriteFailed(e.to_string()))?;
        let store = Self { conn };
        store.migrate()?;
        Ok(store)
    }

    /// Open an in-memory store (for tests).
    #[cfg(test)]
    pub fn open_memory() -> Result<Self, StoreError> {
        let conn = Connection::open_in_memory().map_err(|source| StoreError::OpenFailed {
            path: PathBuf::from(":memory:"),
            source,
        })?;
        let store = Self { conn };
        store.migrate()?;
        Ok(store)
    }

    fn migrate(&self) -> Result<(), StoreError> {
        self.conn
            .execute_batch(
                "CREATE TABLE IF NOT EXISTS kv (
                    key   TEXT PRIMARY KEY,
                    value BLOB NOT NULL
                );",
            )
            .map_err(|e| StoreError::WriteFailed(e.to_string()))
    }
}

impl SnapshotStore for SqliteStore {
    fn load(&self) -> Result<Option<Vec<u8>>, StoreError> {
        self.conn
            .query_row(
                "SELECT value FROM kv WHERE key = ?1",
                params![STORAGE_KEY],
                |row| row.get::<_, Vec<u8>>(0),
            )
            .optional()
            .map_err(|e| StoreError::ReadFailed(e.to_string()))
    }

    fn save(&self, bytes: &[u8]) -> Result<(), StoreError> {
        self.conn
            .execute(
                "INSERT INTO kv (key, value) VALUES (?1, ?2)
                 ON CONFLICT(key) DO UPDATE SET value = excluded.value",
                params![STORAGE_KEY, bytes],
            )
            .map(|_| ())
            .map_err(|e| StoreError::WriteFailed(e.to_string()))
    }
}

/// In-memory store for tests and embedding. Clones share the same buffer,
/// so a test can keep a handle while the driver owns another.
#[derive(Debug, Clone, Default)]
pub struct MemoryStore {
    data: Arc<Mutex<Option<Vec<u8>>>>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Current blob contents, if any.
    pub fn contents(&self) -> Option<Vec<u8>> {
        self.data.lock().unwrap_or_else(|e| e.into_inner()).clone()
    }
}

impl SnapshotStore for MemoryStore {
    fn load(&self) -> Result<Option<Vec<u8>>, StoreError> {
        Ok(self.contents())
    }

    fn save(&self, bytes: &[u8]) -> Result<(), StoreError> {
        *self.data.lock().unwrap_or_else(|e| e.into_inner()) = Some(bytes.to_vec());
        Ok(())
    }
}
