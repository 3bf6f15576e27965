//! Presence service client interfaces.
//!
//! The real SDK (connect, update/clear activity, run callbacks) sits behind
//! these traits so the supervisor and publisher never depend on it directly.
//!
//! Implementors should:
//! - Never block in `update_activity`/`clear_activity`; results arrive via the completion
//! - Invoke completions from `run_callbacks`, on the pump thread
//! - Return an error from `run_callbacks` once the session is unusable

mod recording;
mod tracing_client;

use std::path::Path;
use std::sync::Arc;

use crate::types::Activity;

pub use recording::{ClientCall, RecordingClient};
pub use tracing_client::TracingClient;

/// Completion callback for activity updates and clears.
pub type Completion = Box<dyn FnOnce(Result<(), ClientError>) + Send + 'static>;

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ClientError {
    #[error("presence service is not running")]
    NotRunning,

    #[error("presence session disconnected")]
    Disconnected,

    #[error("presence service error: {0}")]
    Internal(String),
}

/// Connection behaviour when the companion app is absent.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum CreateFlags {
    /// Connect without requiring the companion app to be installed.
    #[default]
    NoRequireDiscord,
}

pub trait PresenceClient: Send + Sync {
    /// Opens a session for `application_id`. `path` is the plugin's own data directory.
    fn connect(
        &self,
        application_id: i64,
        flags: CreateFlags,
        path: &Path,
    ) -> Result<Arc<dyn PresenceSession>, ClientError>;
}

pub trait PresenceSession: Send + Sync {
    fn update_activity(&self, activity: &Activity, done: Completion);

    fn clear_activity(&self, done: Completion);

    /// Drains the service's queue. An error means the session is gone.
    fn run_callbacks(&self) -> Result<(), ClientError>;
}
