//! Host-facing plugin facade.
//!
//! Maps the host's lifecycle calls onto the classifier, change gate,
//! publisher and supervisor. The host calls these from its own thread, one
//! event at a time; none of them block on the network or return errors.
//!
//! ```text
//! journal_entry → classify → should_publish → publish → session handle
//!                    │                           ▲
//!                 Context                 Supervisor::snapshot
//! ```

use std::path::{Path, PathBuf};
use std::sync::Arc;

use chrono::Utc;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use tracing::{debug, warn};

use crate::classifier::classify;
use crate::client::PresenceClient;
use crate::config::{presence_enabled, ConfigStore, ConnectionSettings, DISABLE_PRESENCE_KEY};
use crate::cqc::classify_cqc;
use crate::event::{Ambient, GameMode, JournalEvent};
use crate::gate::should_publish;
use crate::publisher::{publish, PublishOutcome};
use crate::supervisor::{Supervisor, SupervisorStatus};
use crate::types::{ConnectionState, Context, PresenceDescriptor};

/// Name reported to the host; also the name of the SDK data directory.
pub const PLUGIN_NAME: &str = "DiscordPresence";

pub const VERSION: &str = env!("CARGO_PKG_VERSION");

/// Values behind the host's preferences panel.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Preferences {
    pub disable_presence: bool,
    pub version: String,
}

pub struct PresencePlugin {
    supervisor: Supervisor,
    config: Arc<dyn ConfigStore>,
    descriptor: PresenceDescriptor,
    context: Context,
}

impl PresencePlugin {
    pub fn new(
        client: Arc<dyn PresenceClient>,
        config: Arc<dyn ConfigStore>,
        settings: ConnectionSettings,
    ) -> Self {
        Self {
            supervisor: Supervisor::new(client, Arc::clone(&config), settings),
            config,
            descriptor: PresenceDescriptor::connecting(Utc::now()),
            context: Context::default(),
        }
    }

    /// Resets classification state and starts connecting in the background.
    pub fn start(&mut self, plugin_dir: &Path) -> &'static str {
        self.descriptor = PresenceDescriptor::connecting(Utc::now());
        self.context = Context::default();
        self.supervisor.remember(&self.descriptor);
        self.supervisor.start(sdk_data_path(plugin_dir));
        PLUGIN_NAME
    }

    pub fn stop(&mut self) {
        self.supervisor.stop();
    }

    pub fn journal_entry(
        &mut self,
        system: Option<&str>,
        station: Option<&str>,
        entry: &Value,
    ) -> Option<PublishOutcome> {
        let event = self.parse(entry)?;
        let ambient = Ambient::new(system, station);
        let (next, context) = classify(&self.descriptor, &self.context, &event, &ambient);
        self.context = context;
        self.apply(next)
    }

    /// Journal path used while the commander is in a CQC match.
    pub fn journal_entry_cqc(&mut self, entry: &Value, state: &Value) -> Option<PublishOutcome> {
        let event = self.parse(entry)?;
        let next = classify_cqc(&self.descriptor, &event, GameMode::from_state(state));
        self.apply(next)
    }

    pub fn preferences(&self) -> Preferences {
        Preferences {
            disable_presence: !presence_enabled(self.config.as_ref()),
            version: VERSION.to_string(),
        }
    }

    /// Persists the flag and re-sends the current descriptor so it takes effect now.
    pub fn preferences_changed(&mut self, preferences: &Preferences) {
        let value = i64::from(preferences.disable_presence);
        if let Err(err) = self.config.set(DISABLE_PRESENCE_KEY, value) {
            warn!(error = %err, "Failed to save presence preference");
        }
        self.publish_current();
    }

    pub fn descriptor(&self) -> &PresenceDescriptor {
        &self.descriptor
    }

    pub fn context(&self) -> &Context {
        &self.context
    }

    pub fn connection_state(&self) -> ConnectionState {
        self.supervisor.state()
    }

    pub fn status(&self) -> SupervisorStatus {
        self.supervisor.status()
    }

    fn parse(&self, entry: &Value) -> Option<JournalEvent> {
        match JournalEvent::from_entry(entry) {
            Ok(event) => Some(event),
            Err(err) => {
                let kind = entry.get("event").and_then(Value::as_str).unwrap_or("<missing>");
                warn!(
                    event = kind,
                    error = %err,
                    "Skipping journal entry"
                );
                None
            }
        }
    }

    /// Returns `None` when the change gate held the descriptor back.
    fn apply(&mut self, next: PresenceDescriptor) -> Option<PublishOutcome> {
        if !should_publish(&self.descriptor, &next) {
            return None;
        }
        debug!(state = %next.state, details = %next.details, "Presence changed");
        self.descriptor = next;
        Some(self.publish_current())
    }

    fn publish_current(&mut self) -> PublishOutcome {
        // Remember first so a connect racing this publish still replays it.
        self.supervisor.remember(&self.descriptor);
        let handle = self.supervisor.snapshot();
        if let Some(handle) = &handle {
            self.descriptor.session_start = handle.started_at();
        }

        let outcome = publish(
            &self.descriptor,
            handle.as_ref(),
            presence_enabled(self.config.as_ref()),
        );
        if outcome == PublishOutcome::Skipped {
            self.supervisor.request_reconnect();
        }
        outcome
    }
}

/// The SDK keeps its files next to the plugin directory, under the plugin name.
fn sdk_data_path(plugin_dir: &Path) -> PathBuf {
    plugin_dir
        .parent()
        .unwrap_or(plugin_dir)
        .join(PLUGIN_NAME)
}
