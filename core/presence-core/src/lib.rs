//! # presence-core
//!
//! Keeps a rich presence status in sync with Elite Dangerous journal events.
//!
//! ## Design Principles
//!
//! - **Pure classification**: journal events map to a two-line descriptor with
//!   no I/O; stateful bits (current body, landing pad) live in an explicit [`Context`].
//! - **Single writer**: the host delivers events on one thread; the descriptor and
//!   context are owned by [`PresencePlugin`] and never shared mutably.
//! - **Never block the host**: the [`Supervisor`] connects, pumps callbacks and
//!   reconnects on background threads. Publishing without a session is a no-op.
//! - **Never raise to the host**: every public entry point logs and swallows failures.
//!
//! ## Quick Start
//!
//! ```rust,ignore
//! use presence_core::{ConnectionSettings, MemoryConfig, PresencePlugin, TracingClient};
//! use std::sync::Arc;
//!
//! let mut plugin = PresencePlugin::new(
//!     Arc::new(TracingClient::new()),
//!     Arc::new(MemoryConfig::new()),
//!     ConnectionSettings::default(),
//! );
//! plugin.start(plugin_dir);
//! plugin.journal_entry(Some("Sol"), None, &entry, &state);
//! plugin.stop();
//! ```

pub mod backoff;
pub mod classifier;
pub mod client;
pub mod config;
pub mod cqc;
pub mod error;
pub mod event;
pub mod gate;
pub mod plugin;
pub mod publisher;
pub mod supervisor;
pub mod types;

pub use backoff::Backoff;
pub use classifier::classify;
pub use client::{
    ClientCall, ClientError, Completion, CreateFlags, PresenceClient, PresenceSession,
    RecordingClient, TracingClient,
};
pub use config::{
    presence_enabled, ConfigStore, ConnectionSettings, FileConfig, MemoryConfig,
    DISABLE_PRESENCE_KEY,
};
pub use cqc::classify_cqc;
pub use error::{PresenceError, Result};
pub use event::{Ambient, GameMode, JournalEvent};
pub use gate::should_publish;
pub use plugin::{PresencePlugin, Preferences, PLUGIN_NAME, VERSION};
pub use publisher::{publish, PublishOutcome};
pub use supervisor::{SessionHandle, Supervisor, SupervisorStatus};
pub use types::{Activity, ConnectionState, Context, PresenceDescriptor};
