//! In-memory client that records every call.
//!
//! Used by tests and failure simulations: connections can be made to fail,
//! the live session can be broken so the next callback drain errors, and the
//! recorded calls can be inspected afterwards.

use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicBool, AtomicU32, Ordering};
use std::sync::{Arc, Mutex, MutexGuard};

use super::{ClientError, Completion, CreateFlags, PresenceClient, PresenceSession};
use crate::types::Activity;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ClientCall {
    Connect {
        application_id: i64,
        flags: CreateFlags,
        path: PathBuf,
    },
    Update(Activity),
    Clear,
}

#[derive(Default)]
struct Recorder {
    calls: Mutex<Vec<ClientCall>>,
    connect_failures: AtomicU32,
    connect_attempts: AtomicU32,
    sessions: AtomicU32,
}

impl Recorder {
    fn calls(&self) -> MutexGuard<'_, Vec<ClientCall>> {
        self.calls.lock().unwrap_or_else(|p| p.into_inner())
    }
}

#[derive(Clone, Default)]
pub struct RecordingClient {
    recorder: Arc<Recorder>,
    live: Arc<Mutex<Option<Arc<RecordingSession>>>>,
}

impl RecordingClient {
    pub fn new() -> Self {
        Self::default()
    }

    /// Makes the next `count` connection attempts fail.
    pub fn fail_next_connects(&self, count: u32) {
        self.recorder.connect_failures.store(count, Ordering::SeqCst);
    }

    /// Makes every connection attempt fail until
    /// [`fail_next_connects`](Self::fail_next_connects) resets it.
    pub fn fail_all_connects(&self) {
        self.fail_next_connects(u32::MAX);
    }

    /// Breaks the current session; its next `run_callbacks` returns an error.
    pub fn break_session(&self) -> bool {
        let live = self.live.lock().unwrap_or_else(|p| p.into_inner());
        match live.as_ref() {
            Some(session) => {
                session.broken.store(true, Ordering::SeqCst);
                true
            }
            None => false,
        }
    }

    pub fn calls(&self) -> Vec<ClientCall> {
        self.recorder.calls().clone()
    }

    pub fn updates(&self) -> Vec<Activity> {
        self.recorder
            .calls()
            .iter()
            .filter_map(|call| match call {
                ClientCall::Update(activity) => Some(activity.clone()),
                _ => None,
            })
            .collect()
    }

    pub fn clear_count(&self) -> usize {
        self.recorder
            .calls()
            .iter()
            .filter(|call| matches!(call, ClientCall::Clear))
            .count()
    }

    pub fn connect_attempts(&self) -> u32 {
        self.recorder.connect_attempts.load(Ordering::SeqCst)
    }

    pub fn sessions_opened(&self) -> u32 {
        self.recorder.sessions.load(Ordering::SeqCst)
    }
}

impl PresenceClient for RecordingClient {
    fn connect(
        &self,
        application_id: i64,
        flags: CreateFlags,
        path: &Path,
    ) -> Result<Arc<dyn PresenceSession>, ClientError> {
        self.recorder.connect_attempts.fetch_add(1, Ordering::SeqCst);
        self.recorder.calls().push(ClientCall::Connect {
            application_id,
            flags,
            path: path.to_path_buf(),
        });

        let failures = &self.recorder.connect_failures;
        let remaining = failures.load(Ordering::SeqCst);
        if remaining > 0 {
            if remaining != u32::MAX {
                failures.store(remaining - 1, Ordering::SeqCst);
            }
            return Err(ClientError::NotRunning);
        }

        self.recorder.sessions.fetch_add(1, Ordering::SeqCst);
        let session = Arc::new(RecordingSession {
            recorder: Arc::clone(&self.recorder),
            broken: AtomicBool::new(false),
            pending: Mutex::new(Vec::new()),
        });
        *self.live.lock().unwrap_or_else(|p| p.into_inner()) = Some(Arc::clone(&session));
        Ok(session as Arc<dyn PresenceSession>)
    }
}

struct RecordingSession {
    recorder: Arc<Recorder>,
    broken: AtomicBool,
    pending: Mutex<Vec<Completion>>,
}

impl RecordingSession {
    fn record(&self, call: ClientCall, done: Completion) {
        if self.broken.load(Ordering::SeqCst) {
            done(Err(ClientError::Disconnected));
            return;
        }
        self.recorder.calls().push(call);
        self.pending
            .lock()
            .unwrap_or_else(|p| p.into_inner())
            .push(done);
    }
}

impl PresenceSession for RecordingSession {
    fn update_activity(&self, activity: &Activity, done: Completion) {
        self.record(ClientCall::Update(activity.clone()), done);
    }

    fn clear_activity(&self, done: Completion) {
        self.record(ClientCall::Clear, done);
    }

    fn run_callbacks(&self) -> Result<(), ClientError> {
        if self.broken.load(Ordering::SeqCst) {
            return Err(ClientError::Disconnected);
        }
        let drained: Vec<Completion> = self
            .pending
            .lock()
            .unwrap_or_else(|p| p.into_inner())
            .drain(..)
            .collect();
        for done in drained {
            done(Ok(()));
        }
        Ok(())
    }
}
