//! Configuration store and connection settings.
//!
//! The host owns configuration; this crate only reads one flag
//! (`disable_presence`) on every publish and writes it back from the
//! preferences panel. [`FileConfig`] stands in for the host's store when
//! running outside of it.

use std::collections::HashMap;
use std::path::{Path, PathBuf};
use std::sync::RwLock;
use std::time::Duration;

use fs_err as fs;
use serde::{Deserialize, Serialize};
use tracing::warn;

use crate::backoff::Backoff;
use crate::error::{PresenceError, Result};

pub const DISABLE_PRESENCE_KEY: &str = "disable_presence";

/// Application id registered with the presence service.
pub const APPLICATION_ID: i64 = 386_149_818_227_097_610;

const CONFIG_DIR_NAME: &str = "edmc-discord-presence";
const CONFIG_FILE_NAME: &str = "config.toml";
const CONNECTION_TABLE: &str = "connection";

/// Integer key/value store owned by the host.
pub trait ConfigStore: Send + Sync {
    /// Missing keys read as `0`.
    fn get_int(&self, key: &str) -> Result<i64>;

    fn set(&self, key: &str, value: i64) -> Result<()>;
}

/// Reads the disable flag; unreadable values fall back to enabled.
pub fn presence_enabled(store: &dyn ConfigStore) -> bool {
    match store.get_int(DISABLE_PRESENCE_KEY) {
        Ok(value) => value == 0,
        Err(err) => {
            warn!(error = %err, "Failed to read presence flag; assuming enabled");
            true
        }
    }
}

// ─────────────────────────────────────────────────────────────────────
// In-memory store
// ─────────────────────────────────────────────────────────────────────

#[derive(Default)]
pub struct MemoryConfig {
    values: RwLock<HashMap<String, i64>>,
}

impl MemoryConfig {
    pub fn new() -> Self {
        Self::default()
    }
}

impl ConfigStore for MemoryConfig {
    fn get_int(&self, key: &str) -> Result<i64> {
        let values = self.values.read().unwrap_or_else(|p| p.into_inner());
        Ok(values.get(key).copied().unwrap_or(0))
    }

    fn set(&self, key: &str, value: i64) -> Result<()> {
        let mut values = self.values.write().unwrap_or_else(|p| p.into_inner());
        values.insert(key.to_string(), value);
        Ok(())
    }
}

// ─────────────────────────────────────────────────────────────────────
// TOML file store
// ─────────────────────────────────────────────────────────────────────

/// TOML-backed store. Top-level integer keys hold flags; an optional
/// `[connection]` table holds [`ConnectionSettings`].
pub struct FileConfig {
    path: PathBuf,
    table: RwLock<toml::Table>,
}

impl FileConfig {
    /// Returns `~/.config/edmc-discord-presence/config.toml` (platform equivalent).
    pub fn default_path() -> Result<PathBuf> {
        dirs::config_dir()
            .map(|dir| dir.join(CONFIG_DIR_NAME).join(CONFIG_FILE_NAME))
            .ok_or(PresenceError::ConfigPathUnavailable)
    }

    /// Loads `path`, starting empty when the file does not exist yet.
    pub fn open(path: impl Into<PathBuf>) -> Result<Self> {
        let path = path.into();
        let table = load_table(&path)?;
        Ok(Self {
            path,
            table: RwLock::new(table),
        })
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Connection settings from `[connection]`; invalid tables fall back to defaults.
    pub fn connection_settings(&self) -> ConnectionSettings {
        let table = self.table.read().unwrap_or_else(|p| p.into_inner());
        match table.get(CONNECTION_TABLE) {
            None => ConnectionSettings::default(),
            Some(value) => value.clone().try_into().unwrap_or_else(|err| {
                warn!(
                    error = %err,
                    path = %self.path.display(),
                    "Invalid connection settings; using defaults"
                );
                ConnectionSettings::default()
            }),
        }
    }

    fn save(&self, table: &toml::Table) -> Result<()> {
        if let Some(parent) = self.path.parent() {
            fs::create_dir_all(parent).map_err(|source| PresenceError::Io {
                context: "Failed to create config directory".to_string(),
                source,
            })?;
        }

        let payload = toml::to_string_pretty(table).map_err(|err| PresenceError::ConfigMalformed {
            path: self.path.clone(),
            details: err.to_string(),
        })?;
        let tmp_path = self.path.with_extension("tmp");
        fs::write(&tmp_path, payload).map_err(|source| PresenceError::Io {
            context: "Failed to write config".to_string(),
            source,
        })?;
        fs::rename(&tmp_path, &self.path).map_err(|source| PresenceError::Io {
            context: "Failed to commit config".to_string(),
            source,
        })
    }
}

impl ConfigStore for FileConfig {
    fn get_int(&self, key: &str) -> Result<i64> {
        let table = self.table.read().unwrap_or_else(|p| p.into_inner());
        match table.get(key) {
            None => Ok(0),
            Some(toml::Value::Integer(value)) => Ok(*value),
            Some(toml::Value::Boolean(value)) => Ok(i64::from(*value)),
            Some(other) => Err(PresenceError::InvalidConfigValue {
                key: key.to_string(),
                details: format!("expected integer, found {}", other.type_str()),
            }),
        }
    }

    fn set(&self, key: &str, value: i64) -> Result<()> {
        let mut table = self.table.write().unwrap_or_else(|p| p.into_inner());
        table.insert(key.to_string(), toml::Value::Integer(value));
        self.save(&table)
    }
}

fn load_table(path: &Path) -> Result<toml::Table> {
    let content = match fs::read_to_string(path) {
        Ok(content) => content,
        Err(err) if err.kind() == std::io::ErrorKind::NotFound => return Ok(toml::Table::new()),
        Err(source) => {
            return Err(PresenceError::Io {
                context: "Failed to read config".to_string(),
                source,
            })
        }
    };

    content
        .parse::<toml::Table>()
        .map_err(|err| PresenceError::ConfigMalformed {
            path: path.to_path_buf(),
            details: err.to_string(),
        })
}

// ─────────────────────────────────────────────────────────────────────
// Connection settings
// ─────────────────────────────────────────────────────────────────────

/// Timing and identity for the connection supervisor.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ConnectionSettings {
    pub application_id: i64,
    /// Connection attempts per cycle before the cycle is declared failed.
    pub max_attempts: u32,
    pub retry_base_ms: u64,
    pub retry_max_ms: u64,
    pub pump_interval_ms: u64,
    /// Pause between a lost session and the next connection cycle.
    pub failure_cooldown_ms: u64,
    /// Pause after an exhausted cycle before trying again unprompted.
    pub cycle_cooldown_ms: u64,
    pub shutdown_timeout_ms: u64,
}

impl Default for ConnectionSettings {
    fn default() -> Self {
        Self {
            application_id: APPLICATION_ID,
            max_attempts: 5,
            retry_base_ms: 1_000,
            retry_max_ms: 16_000,
            pump_interval_ms: 100,
            failure_cooldown_ms: 1_000,
            cycle_cooldown_ms: 60_000,
            shutdown_timeout_ms: 2_000,
        }
    }
}

impl ConnectionSettings {
    pub fn backoff(&self) -> Backoff {
        Backoff::new(
            Duration::from_millis(self.retry_base_ms),
            Duration::from_millis(self.retry_max_ms),
        )
    }

    /// At least one attempt is always made.
    pub fn attempts(&self) -> u32 {
        self.max_attempts.max(1)
    }

    pub fn pump_interval(&self) -> Duration {
        Duration::from_millis(self.pump_interval_ms)
    }

    pub fn failure_cooldown(&self) -> Duration {
        Duration::from_millis(self.failure_cooldown_ms)
    }

    pub fn cycle_cooldown(&self) -> Duration {
        Duration::from_millis(self.cycle_cooldown_ms)
    }

    pub fn shutdown_timeout(&self) -> Duration {
        Duration::from_millis(self.shutdown_timeout_ms)
    }
}
