//! TOML-based engine configuration.
//!
//! Stores the cadence and reminder tuning knobs:
//! - Tick cadence for completion detection
//! - Safety-interval for the periodic persistence write
//! - Warning look-ahead offsets for threshold reminders
//! - Default countdown length when the caller supplies none
//!
//! Configuration is stored at `~/.config/focuskeep/config.toml`.

use serde::{Deserialize, Serialize};
use std::path::PathBuf;

use crate::error::ConfigError;
use crate::persist::DEFAULT_PERSIST_INTERVAL_SECS;
use crate::reminder::DEFAULT_WARNING_THRESHOLDS;
use crate::scheduler::DEFAULT_TICK_INTERVAL_SECS;
use crate::store::data_dir;

/// Engine configuration.
///
/// Serialized to/from TOML at `~/.config/focuskeep/config.toml`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Config {
    #[serde(default = "default_tick_interval")]
    pub tick_interval_secs: u64,
    #[serde(default = "default_persist_interval")]
    pub persist_interval_secs: u64,
    #[serde(default = "default_warning_thresholds")]
    pub warning_thresholds_secs: Vec<u64>,
    /// 25 minutes, the recommended activity length.
    #[serde(default = "default_duration")]
    pub default_duration_secs: u64,
}

// Default functions
fn default_tick_interval() -> u64 {
    DEFAULT_TICK_INTERVAL_SECS
}
fn default_persist_interval() -> u64 {
    DEFAULT_PERSIST_INTERVAL_SECS
}
fn default_warning_thresholds() -> Vec<u64> {
    DEFAULT_WARNING_THRESHOLDS.to_vec()
}
fn default_duration() -> u64 {
    25 * 60
}

impl Default for Config {
    fn default() -> Self {
        Self {
            tick_interval_secs: default_tick_interval(),
            persist_interval_secs: default_persist_interval(),
            warning_thresholds_secs: default_warning_thresholds(),
            default_duration_secs: default_duration(),
        }
    }
}

impl Config {
    fn path() -> Result<PathBuf, ConfigError> {
        let dir = data_dir().map_err(|e| ConfigError::LoadFailed {
            path: PathBuf::from("config.toml"),
            message: e.to_string(),
        })?;
        Ok(dir.join("config.toml"))
    }

    /// Load from disk or write and return the default.
    ///
    /// # Errors
    ///
    /// Returns an error if the config file exists but cannot be parsed,
    /// or if the default config cannot be written to disk.
    pub fn load() -> Result<Self, ConfigError> {
        let path = Self::path()?;
        match std::fs::read_to_string(&path) {
            Ok(content) => toml::from_str(&content).map_err(|e| ConfigError::LoadFailed {
                path,
                message: e.to_string(),
            }),
            Err(_) => {
                let cfg = Self::default();
                cfg.save()?;
                Ok(cfg)
            }
        }
    }

    /// Persist to disk.
    pub fn save(&self) -> Result<(), ConfigError> {
        let path = Self::path()?;
        let content = toml::to_string_pretty(self).map_err(|e| ConfigError::SaveFailed {
            path: path.clone(),
            message: e.to_string(),
        })?;
        std::fs::write(&path, content).map_err(|e| ConfigError::SaveFailed {
            path,
            message: e.to_string(),
        })
    }

    /// Load from disk, returning default on error.
    /// This is a convenience method that never fails.
    pub fn load_or_default() -> Self {
        Self::load().unwrap_or_default()
    }

    /// Get a config value as string by key.
    pub fn get(&self, key: &str) -> Option<String> {
        let json = serde_json::to_value(self).ok()?;
        let val = json.get(key)?;
        match val {
            serde_json::Value::String(s) => Some(s.clone()),
            other => Some(other.to_string()),
        }
    }

    /// Set a config value by key and persist. Returns an error if the key
    /// is unknown or the value cannot be parsed as the key's type.
    pub fn set(&mut self, key: &str, value: &str) -> Result<(), ConfigError> {
        self.apply(key, value)?;
        self.save()
    }

    fn apply(&mut self, key: &str, value: &str) -> Result<(), ConfigError> {
        let invalid = |message: String| ConfigError::InvalidValue {
            key: key.to_string(),
            message,
        };

        let mut json = serde_json::to_value(&*self).map_err(|e| invalid(e.to_string()))?;
        let obj = json
            .as_object_mut()
            .ok_or_else(|| invalid("not an object".into()))?;
        let existing = obj
            .get(key)
            .ok_or_else(|| ConfigError::UnknownKey(key.to_string()))?;

        let new_value = match existing {
            serde_json::Value::Number(_) => {
                let n = value.parse::<u64>().map_err(|e| invalid(e.to_string()))?;
                serde_json::Value::Number(n.into())
            }
            serde_json::Value::Array(_) => {
                serde_json::from_str(value).map_err(|e| invalid(e.to_string()))?
            }
            _ => serde_json::Value::String(value.into()),
        };

        obj.insert(key.to_string(), new_value);
        *self = serde_json::from_value(json).map_err(|e| invalid(e.to_string()))?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_config_roundtrip() {
        let cfg = Config::default();
        let toml_str = toml::to_string_pretty(&cfg).unwrap();
        let parsed: Config = toml::from_str(&toml_str).unwrap();
        assert_eq!(parsed.tick_interval_secs, 1);
        assert_eq!(parsed.persist_interval_secs, 10);
        assert_eq!(parsed.warning_thresholds_secs, vec![300, 60]);
        assert_eq!(parsed.default_duration_secs, 1500);
    }

    #[test]
    fn missing_fields_fall_back_to_defaults() {
        let parsed: Config = toml::from_str("tick_interval_secs = 2\n").unwrap();
        assert_eq!(parsed.tick_interval_secs, 2);
        assert_eq!(parsed.persist_interval_secs, 10);
        assert_eq!(parsed.warning_thresholds_secs, vec![300, 60]);
    }

    #[test]
    fn get_returns_string_for_all_types() {
        let cfg = Config::default();
        assert_eq!(cfg.get("persist_interval_secs").as_deref(), Some("10"));
        assert_eq!(cfg.get("warning_thresholds_secs").as_deref(), Some("[300,60]"));
        assert!(cfg.get("missing_key").is_none());
    }

    #[test]
    fn apply_updates_a_number() {
        let mut cfg = Config::default();
        cfg.apply("persist_interval_secs", "30").unwrap();
        assert_eq!(cfg.persist_interval_secs, 30);
    }

    #[test]
    fn apply_updates_an_array() {
        let mut cfg = Config::default();
        cfg.apply("warning_thresholds_secs", "[600, 120, 30]").unwrap();
        assert_eq!(cfg.warning_thresholds_secs, vec![600, 120, 30]);
    }

    #[test]
    fn apply_rejects_unknown_key() {
        let mut cfg = Config::default();
        assert!(matches!(
            cfg.apply("nonexistent_key", "1"),
            Err(ConfigError::UnknownKey(_))
        ));
    }

    #[test]
    fn apply_rejects_invalid_type() {
        let mut cfg = Config::default();
        assert!(matches!(
            cfg.apply("tick_interval_secs", "not_a_number"),
            Err(ConfigError::InvalidValue { .. })
        ));
    }
}
