//! Sends a descriptor to the presence service, honoring the disable flag.

use tracing::{debug, error};

use crate::client::ClientError;
use crate::supervisor::SessionHandle;
use crate::types::{Activity, PresenceDescriptor};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PublishOutcome {
    Updated,
    Cleared,
    /// No session; the descriptor goes out on the next connect instead.
    Skipped,
}

/// Fire-and-forget: completions only log, they never feed back into state.
pub fn publish(
    descriptor: &PresenceDescriptor,
    handle: Option<&SessionHandle>,
    enabled: bool,
) -> PublishOutcome {
    let Some(handle) = handle else {
        debug!(state = %descriptor.state, "No presence session; update deferred");
        return PublishOutcome::Skipped;
    };

    if !enabled {
        handle
            .session()
            .clear_activity(Box::new(|result| log_completion("clear", result)));
        return PublishOutcome::Cleared;
    }

    let mut activity = Activity::from_descriptor(descriptor);
    activity.start_timestamp = handle.started_at().timestamp();
    handle
        .session()
        .update_activity(&activity, Box::new(|result| log_completion("update", result)));
    PublishOutcome::Updated
}

fn log_completion(operation: &'static str, result: Result<(), ClientError>) {
    match result {
        Ok(()) => debug!(operation, "Presence activity call succeeded"),
        Err(err) => error!(operation, error = %err, "Presence activity call failed"),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{DateTime, Utc};
    use std::path::Path;

    use crate::client::{ClientCall, CreateFlags, PresenceClient, RecordingClient};

    fn handle(client: &RecordingClient, started_at: DateTime<Utc>) -> SessionHandle {
        let session = client
            .connect(1, CreateFlags::default(), Path::new("/tmp"))
            .unwrap();
        SessionHandle::new(session, started_at)
    }

    #[test]
    fn enabled_publish_updates_with_session_start() {
        let client = RecordingClient::new();
        let started_at = DateTime::from_timestamp(1_700_000_000, 0).unwrap();
        let handle = handle(&client, started_at);
        let descriptor = PresenceDescriptor::new("In system Sol", "Supercruising", Utc::now());

        assert_eq!(publish(&descriptor, Some(&handle), true), PublishOutcome::Updated);

        let updates = client.updates();
        assert_eq!(updates.len(), 1);
        assert_eq!(updates[0].state, "In system Sol");
        assert_eq!(updates[0].details, "Supercruising");
        assert_eq!(updates[0].start_timestamp, 1_700_000_000);
    }

    #[test]
    fn disabled_publish_clears_instead() {
        let client = RecordingClient::new();
        let handle = handle(&client, Utc::now());
        let descriptor = PresenceDescriptor::new("In system Sol", "Supercruising", Utc::now());

        assert_eq!(publish(&descriptor, Some(&handle), false), PublishOutcome::Cleared);
        assert!(client.updates().is_empty());
        assert_eq!(client.clear_count(), 1);
    }

    #[test]
    fn missing_session_is_skipped() {
        let descriptor = PresenceDescriptor::connecting(Utc::now());
        assert_eq!(publish(&descriptor, None, true), PublishOutcome::Skipped);
        assert_eq!(publish(&descriptor, None, false), PublishOutcome::Skipped);
    }

    #[test]
    fn stale_session_failure_is_only_logged() {
        let client = RecordingClient::new();
        let handle = handle(&client, Utc::now());
        client.break_session();
        let descriptor = PresenceDescriptor::connecting(Utc::now());

        assert_eq!(publish(&descriptor, Some(&handle), true), PublishOutcome::Updated);
        assert!(client
            .calls()
            .iter()
            .all(|call| !matches!(call, ClientCall::Update(_))));
    }
}
