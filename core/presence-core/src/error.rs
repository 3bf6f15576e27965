//! Error types for presence-core operations.
//!
//! None of these cross the host boundary: plugin entry points log them and
//! carry on. They exist so internal layers can propagate with `?`.

use std::path::PathBuf;

/// All errors that can occur inside presence-core.
#[derive(Debug, thiserror::Error)]
pub enum PresenceError {
    // ─────────────────────────────────────────────────────────────────────
    // Journal Errors
    // ─────────────────────────────────────────────────────────────────────
    #[error("Malformed journal entry: {source}")]
    MalformedEvent {
        #[source]
        source: serde_json::Error,
    },

    // ─────────────────────────────────────────────────────────────────────
    // Configuration Errors
    // ─────────────────────────────────────────────────────────────────────
    #[error("Configuration path unavailable")]
    ConfigPathUnavailable,

    #[error("Configuration file malformed: {path}: {details}")]
    ConfigMalformed { path: PathBuf, details: String },

    #[error("Configuration value invalid: {key}: {details}")]
    InvalidConfigValue { key: String, details: String },

    // ─────────────────────────────────────────────────────────────────────
    // I/O Errors
    // ─────────────────────────────────────────────────────────────────────
    #[error("I/O error: {context}: {source}")]
    Io {
        context: String,
        #[source]
        source: std::io::Error,
    },
}

/// Convenience type alias for Results using PresenceError.
pub type Result<T> = std::result::Result<T, PresenceError>;

impl From<PresenceError> for String {
    fn from(err: PresenceError) -> String {
        err.to_string()
    }
}
