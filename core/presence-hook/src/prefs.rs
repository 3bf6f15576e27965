//! Preference toggling and status output against the TOML config file.

use std::path::PathBuf;

use presence_core::{
    presence_enabled, ConfigStore, ConnectionSettings, FileConfig, DISABLE_PRESENCE_KEY, VERSION,
};
use serde::Serialize;

#[derive(Debug, Serialize)]
struct Status {
    version: &'static str,
    config_path: String,
    presence_enabled: bool,
    connection: ConnectionSettings,
}

pub fn open_config(path: Option<PathBuf>) -> Result<FileConfig, String> {
    let path = match path {
        Some(path) => path,
        None => FileConfig::default_path()?,
    };
    Ok(FileConfig::open(path)?)
}

pub fn set(disable: bool, path: Option<PathBuf>) -> Result<(), String> {
    let config = open_config(path)?;
    config.set(DISABLE_PRESENCE_KEY, i64::from(disable))?;
    tracing::info!(
        path = %config.path().display(),
        disabled = disable,
        "Presence preference saved"
    );
    Ok(())
}

pub fn status(path: Option<PathBuf>) -> Result<(), String> {
    let config = open_config(path)?;
    let output = serde_json::to_string_pretty(&build_status(&config))
        .map_err(|e| format!("Failed to serialize status: {}", e))?;
    println!("{}", output);
    Ok(())
}

fn build_status(config: &FileConfig) -> Status {
    Status {
        version: VERSION,
        config_path: config.path().display().to_string(),
        presence_enabled: presence_enabled(config),
        connection: config.connection_settings(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn set_then_status_reflects_flag() {
        let temp = TempDir::new().unwrap();
        let path = temp.path().join("config.toml");

        set(true, Some(path.clone())).unwrap();
        let config = open_config(Some(path.clone())).unwrap();
        assert!(!build_status(&config).presence_enabled);

        set(false, Some(path.clone())).unwrap();
        let config = open_config(Some(path)).unwrap();
        let status = build_status(&config);
        assert!(status.presence_enabled);
        assert_eq!(status.connection, ConnectionSettings::default());
    }
}
