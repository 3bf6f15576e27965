//! Value types shared by the classifier, publisher and supervisor.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// State line shown while no journal event has been seen yet (and after shutdown).
pub const CONNECTING_STATE: &str = "Connecting CMDR Interface";

/// Body name used until the first surface-related event names one.
pub const HIDDEN_BODY: &str = "<Hidden>";

/// Landing pad assumed until a docking grant reports the real one.
pub const DEFAULT_LANDING_PAD: &str = "2";

/// Image key registered with the presence application.
pub const LARGE_IMAGE_KEY: &str = "elite_logo";

/// The two lines shown on the presence card plus the start of the elapsed timer.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PresenceDescriptor {
    pub state: String,
    pub details: String,
    pub session_start: DateTime<Utc>,
}

impl PresenceDescriptor {
    pub fn new(
        state: impl Into<String>,
        details: impl Into<String>,
        session_start: DateTime<Utc>,
    ) -> Self {
        Self {
            state: state.into(),
            details: details.into(),
            session_start,
        }
    }

    /// Descriptor shown before the first journal event arrives.
    pub fn connecting(session_start: DateTime<Utc>) -> Self {
        Self::new(CONNECTING_STATE, "", session_start)
    }

    /// Compares the visible text only; the timer start is not part of identity.
    pub fn same_text(&self, other: &PresenceDescriptor) -> bool {
        self.state == other.state && self.details == other.details
    }
}

/// Session-scoped memory that outlives a single journal event.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Context {
    pub current_body: String,
    pub current_landing_pad: String,
}

impl Default for Context {
    fn default() -> Self {
        Self {
            current_body: HIDDEN_BODY.to_string(),
            current_landing_pad: DEFAULT_LANDING_PAD.to_string(),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum ConnectionState {
    Disconnected,
    Connecting,
    Connected,
    Failed,
}

impl ConnectionState {
    pub fn as_str(&self) -> &'static str {
        match self {
            ConnectionState::Disconnected => "disconnected",
            ConnectionState::Connecting => "connecting",
            ConnectionState::Connected => "connected",
            ConnectionState::Failed => "failed",
        }
    }
}

/// Payload handed to the presence client.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Activity {
    pub state: String,
    pub details: String,
    pub start_timestamp: i64,
    pub large_image: String,
}

impl Activity {
    pub fn from_descriptor(descriptor: &PresenceDescriptor) -> Self {
        Self {
            state: descriptor.state.clone(),
            details: descriptor.details.clone(),
            start_timestamp: descriptor.session_start.timestamp(),
            large_image: LARGE_IMAGE_KEY.to_string(),
        }
    }
}
