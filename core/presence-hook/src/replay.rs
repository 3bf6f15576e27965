//! Journal replay through the full plugin.
//!
//! Reads one JSON entry per line, keeps the host-side location (system and
//! station) the way the host does before each delivery, and hands every
//! entry to [`PresencePlugin::journal_entry`]. Presence calls go to a
//! [`TracingClient`], so the log shows exactly what would be published.

use std::io::{BufRead, BufReader};
use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::thread;
use std::time::{Duration, Instant};

use fs_err as fs;
use presence_core::{ConfigStore, ConnectionState, PresencePlugin, TracingClient};
use serde::Serialize;
use serde_json::Value;

use crate::prefs::open_config;

const CONNECT_WAIT: Duration = Duration::from_secs(2);

pub fn run(
    journal: &Path,
    interval_ms: u64,
    plugin_dir: Option<PathBuf>,
    config_path: Option<PathBuf>,
) -> Result<(), String> {
    let config = open_config(config_path)?;
    let settings = config.connection_settings();
    let config: Arc<dyn ConfigStore> = Arc::new(config);

    let plugin_dir = match plugin_dir {
        Some(dir) => dir,
        None => std::env::current_dir()
            .map_err(|e| format!("Failed to resolve current directory: {}", e))?
            .join("plugins")
            .join("EDMC-Discord-Presence"),
    };

    let file = fs::File::open(journal).map_err(|e| format!("Failed to open journal: {}", e))?;

    let mut plugin = PresencePlugin::new(Arc::new(TracingClient::new()), config, settings);
    let name = plugin.start(&plugin_dir);
    tracing::info!(plugin = name, journal = %journal.display(), "Replaying journal");
    wait_for_connection(&plugin);

    let mut location = HostLocation::default();
    let mut summary = ReplaySummary::default();

    for (index, line) in BufReader::new(file).lines().enumerate() {
        let line = line.map_err(|e| format!("Failed to read journal: {}", e))?;
        if line.trim().is_empty() {
            continue;
        }

        let entry: Value = match serde_json::from_str(&line) {
            Ok(entry) => entry,
            Err(e) => {
                tracing::warn!(line = index + 1, error = %e, "Skipping unparsable journal line");
                summary.unparsable += 1;
                continue;
            }
        };

        location.observe(&entry);
        summary.entries += 1;
        if plugin
            .journal_entry(location.system.as_deref(), location.station.as_deref(), &entry)
            .is_some()
        {
            summary.changes += 1;
        }

        if interval_ms > 0 {
            thread::sleep(Duration::from_millis(interval_ms));
        }
    }

    summary.state = plugin.descriptor().state.clone();
    summary.details = plugin.descriptor().details.clone();
    plugin.stop();

    let output = serde_json::to_string_pretty(&summary)
        .map_err(|e| format!("Failed to serialize summary: {}", e))?;
    println!("{}", output);
    Ok(())
}

fn wait_for_connection(plugin: &PresencePlugin) {
    let deadline = Instant::now() + CONNECT_WAIT;
    while plugin.connection_state() != ConnectionState::Connected && Instant::now() < deadline {
        thread::sleep(Duration::from_millis(10));
    }
}

#[derive(Debug, Default, Serialize)]
struct ReplaySummary {
    entries: usize,
    changes: usize,
    unparsable: usize,
    state: String,
    details: String,
}

/// Host-side view of where the commander is, updated before each delivery.
#[derive(Debug, Default, PartialEq, Eq)]
struct HostLocation {
    system: Option<String>,
    station: Option<String>,
}

impl HostLocation {
    fn observe(&mut self, entry: &Value) {
        let text = |key: &str| entry.get(key).and_then(Value::as_str).map(str::to_string);

        if let Some(system) = text("StarSystem") {
            self.system = Some(system);
        }

        match entry.get("event").and_then(Value::as_str).unwrap_or_default() {
            "Docked" => self.station = text("StationName"),
            "Location" | "CarrierJump" => {
                let docked = entry.get("Docked").and_then(Value::as_bool).unwrap_or(false);
                self.station = if docked { text("StationName") } else { None };
            }
            "Undocked" | "FSDJump" | "SupercruiseEntry" | "StartJump" => self.station = None,
            _ => {}
        }
    }
}
