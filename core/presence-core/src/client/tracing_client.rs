//! Client that only logs; for dry runs against journal files.

use std::path::Path;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, Mutex};

use tracing::info;

use super::{ClientError, Completion, CreateFlags, PresenceClient, PresenceSession};
use crate::types::Activity;

#[derive(Default)]
pub struct TracingClient {
    sessions: AtomicU64,
}

impl TracingClient {
    pub fn new() -> Self {
        Self::default()
    }
}

impl PresenceClient for TracingClient {
    fn connect(
        &self,
        application_id: i64,
        flags: CreateFlags,
        path: &Path,
    ) -> Result<Arc<dyn PresenceSession>, ClientError> {
        let session = self.sessions.fetch_add(1, Ordering::SeqCst) + 1;
        info!(
            application_id,
            flags = ?flags,
            path = %path.display(),
            session,
            "Presence session opened"
        );
        Ok(Arc::new(TracingSession {
            session,
            pending: Mutex::new(Vec::new()),
        }))
    }
}

struct TracingSession {
    session: u64,
    pending: Mutex<Vec<Completion>>,
}

impl TracingSession {
    fn enqueue(&self, done: Completion) {
        let mut pending = self.pending.lock().unwrap_or_else(|p| p.into_inner());
        pending.push(done);
    }
}

impl PresenceSession for TracingSession {
    fn update_activity(&self, activity: &Activity, done: Completion) {
        info!(
            session = self.session,
            state = %activity.state,
            details = %activity.details,
            start = activity.start_timestamp,
            "Presence activity"
        );
        self.enqueue(done);
    }

    fn clear_activity(&self, done: Completion) {
        info!(session = self.session, "Presence cleared");
        self.enqueue(done);
    }

    fn run_callbacks(&self) -> Result<(), ClientError> {
        let drained: Vec<Completion> = {
            let mut pending = self.pending.lock().unwrap_or_else(|p| p.into_inner());
            pending.drain(..).collect()
        };
        for done in drained {
            done(Ok(()));
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::AtomicBool;

    #[test]
    fn completions_fire_on_run_callbacks() {
        let client = TracingClient::new();
        let session = client
            .connect(1, CreateFlags::default(), Path::new("/tmp"))
            .unwrap();
        let fired = Arc::new(AtomicBool::new(false));
        let flag = Arc::clone(&fired);

        session.clear_activity(Box::new(move |result| {
            assert!(result.is_ok());
            flag.store(true, Ordering::SeqCst);
        }));
        assert!(!fired.load(Ordering::SeqCst));

        session.run_callbacks().unwrap();
        assert!(fired.load(Ordering::SeqCst));
    }
}
