//! Connection supervisor for the presence service.
//!
//! Owns the only writable copy of the session handle. Two background threads
//! do the work and talk over a channel:
//!
//! ```text
//!   start() ──Connect──▶ ┌──────────────┐  spawn   ┌──────────────┐
//!                        │ retry worker │ ───────▶ │ callback pump│
//!   stop() ──Shutdown──▶ │ (state owner)│ ◀─────── │ run_callbacks│
//!                        └──────────────┘ PumpFailed└─────────────┘
//! ```
//!
//! State machine:
//!
//! ```text
//! Disconnected → Connecting → Connected
//!                    ↑   ↓         ↓ (pump error)
//!                    └─ Failed ◀───┘
//! ```
//!
//! A cycle makes up to `max_attempts` connection attempts with exponential
//! backoff between them. An exhausted cycle waits `cycle_cooldown` (or a
//! [`Supervisor::request_reconnect`] nudge) and starts over; the supervisor
//! never gives up while running.
//!
//! The foreground reads [`Supervisor::snapshot`], a cloned handle, and never
//! holds a lock across a client call. A publish racing a disconnect may hit a
//! dead session; that failure is logged by the completion and nothing more.

use std::path::PathBuf;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::mpsc::{self, Receiver, RecvTimeoutError, Sender};
use std::sync::{Arc, Mutex, MutexGuard, RwLock};
use std::thread::{self, JoinHandle};
use std::time::{Duration, Instant};

use chrono::{DateTime, Utc};
use serde::Serialize;
use tracing::{debug, error, info, warn};

use crate::client::{ClientError, CreateFlags, PresenceClient, PresenceSession};
use crate::config::{presence_enabled, ConfigStore, ConnectionSettings};
use crate::publisher::publish;
use crate::types::{ConnectionState, PresenceDescriptor};

const STOP_POLL_INTERVAL: Duration = Duration::from_millis(10);

/// A live session plus the moment it was established.
#[derive(Clone)]
pub struct SessionHandle {
    session: Arc<dyn PresenceSession>,
    started_at: DateTime<Utc>,
}

impl SessionHandle {
    pub fn new(session: Arc<dyn PresenceSession>, started_at: DateTime<Utc>) -> Self {
        Self {
            session,
            started_at,
        }
    }

    pub fn session(&self) -> &dyn PresenceSession {
        self.session.as_ref()
    }

    /// Start of the elapsed-time display; reset on every (re)connect.
    pub fn started_at(&self) -> DateTime<Utc> {
        self.started_at
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct SupervisorStatus {
    pub state: ConnectionState,
    /// Attempts made in the current (or most recent) connection cycle.
    pub attempts_in_cycle: u32,
    pub last_delay_ms: Option<u64>,
    pub exhausted_cycles: u32,
    pub sessions_opened: u32,
}

impl Default for SupervisorStatus {
    fn default() -> Self {
        Self {
            state: ConnectionState::Disconnected,
            attempts_in_cycle: 0,
            last_delay_ms: None,
            exhausted_cycles: 0,
            sessions_opened: 0,
        }
    }
}

#[derive(Debug)]
enum SupervisorMessage {
    Connect,
    PumpFailed(ClientError),
    Shutdown,
}

#[derive(Default)]
struct Shared {
    handle: RwLock<Option<SessionHandle>>,
    status: Mutex<SupervisorStatus>,
    latest: Mutex<Option<PresenceDescriptor>>,
}

impl Shared {
    fn status(&self) -> MutexGuard<'_, SupervisorStatus> {
        self.status.lock().unwrap_or_else(|p| p.into_inner())
    }

    fn set_state(&self, state: ConnectionState) {
        self.status().state = state;
    }

    fn snapshot(&self) -> Option<SessionHandle> {
        self.handle.read().unwrap_or_else(|p| p.into_inner()).clone()
    }

    fn install(&self, handle: SessionHandle) {
        *self.handle.write().unwrap_or_else(|p| p.into_inner()) = Some(handle);
        let mut status = self.status();
        status.state = ConnectionState::Connected;
        status.sessions_opened += 1;
    }

    fn release(&self, state: ConnectionState) {
        *self.handle.write().unwrap_or_else(|p| p.into_inner()) = None;
        self.set_state(state);
    }

    fn latest(&self) -> Option<PresenceDescriptor> {
        self.latest.lock().unwrap_or_else(|p| p.into_inner()).clone()
    }
}

struct Control {
    tx: Sender<SupervisorMessage>,
    stop: Arc<AtomicBool>,
    worker: JoinHandle<()>,
}

pub struct Supervisor {
    client: Arc<dyn PresenceClient>,
    config: Arc<dyn ConfigStore>,
    settings: ConnectionSettings,
    shared: Arc<Shared>,
    control: Mutex<Option<Control>>,
}

impl Supervisor {
    pub fn new(
        client: Arc<dyn PresenceClient>,
        config: Arc<dyn ConfigStore>,
        settings: ConnectionSettings,
    ) -> Self {
        Self {
            client,
            config,
            settings,
            shared: Arc::new(Shared::default()),
            control: Mutex::new(None),
        }
    }

    /// Begins connecting in the background. Calling it again while running is a no-op.
    pub fn start(&self, data_path: PathBuf) {
        let mut control = self.control();
        if control.is_some() {
            debug!("Presence supervisor already running");
            return;
        }

        let (tx, rx) = mpsc::channel();
        let stop = Arc::new(AtomicBool::new(false));
        let worker = Worker {
            client: Arc::clone(&self.client),
            config: Arc::clone(&self.config),
            settings: self.settings.clone(),
            shared: Arc::clone(&self.shared),
            path: data_path,
            rx,
            tx: tx.clone(),
            stop: Arc::clone(&stop),
            pump: None,
        };

        let spawned = thread::Builder::new()
            .name("presence-supervisor".to_string())
            .spawn(move || worker.run());
        let worker = match spawned {
            Ok(worker) => worker,
            Err(err) => {
                error!(error = %err, "Failed to spawn presence supervisor thread");
                return;
            }
        };

        let _ = tx.send(SupervisorMessage::Connect);
        *control = Some(Control { tx, stop, worker });
    }

    /// Stops both background threads and waits at most `shutdown_timeout`
    /// for them. The worker clears presence on its way out. Safe to call
    /// more than once.
    pub fn stop(&self) {
        let Some(control) = self.control().take() else {
            return;
        };

        control.stop.store(true, Ordering::SeqCst);
        let _ = control.tx.send(SupervisorMessage::Shutdown);

        let deadline = Instant::now() + self.settings.shutdown_timeout();
        while !control.worker.is_finished() {
            if Instant::now() >= deadline {
                warn!(
                    timeout_ms = self.settings.shutdown_timeout_ms,
                    "Presence supervisor did not stop in time; detaching"
                );
                return;
            }
            thread::sleep(STOP_POLL_INTERVAL);
        }
        if control.worker.join().is_err() {
            warn!("Presence supervisor thread panicked");
        }
        info!("Presence supervisor stopped");
    }

    /// Nudges an idle supervisor (failed and waiting out its cooldown) to retry now.
    pub fn request_reconnect(&self) {
        if self.state() != ConnectionState::Failed {
            return;
        }
        if let Some(control) = self.control().as_ref() {
            let _ = control.tx.send(SupervisorMessage::Connect);
        }
    }

    /// Records the descriptor to replay on the next successful connect.
    pub fn remember(&self, descriptor: &PresenceDescriptor) {
        *self.shared.latest.lock().unwrap_or_else(|p| p.into_inner()) = Some(descriptor.clone());
    }

    pub fn snapshot(&self) -> Option<SessionHandle> {
        self.shared.snapshot()
    }

    pub fn state(&self) -> ConnectionState {
        self.shared.status().state
    }

    pub fn status(&self) -> SupervisorStatus {
        *self.shared.status()
    }

    fn control(&self) -> MutexGuard<'_, Option<Control>> {
        self.control.lock().unwrap_or_else(|p| p.into_inner())
    }
}

impl Drop for Supervisor {
    fn drop(&mut self) {
        self.stop();
    }
}

enum Wake {
    Elapsed,
    Triggered,
    Shutdown,
}

enum CycleOutcome {
    Connected,
    Exhausted,
    Shutdown,
}

/// State owned by the retry thread.
struct Worker {
    client: Arc<dyn PresenceClient>,
    config: Arc<dyn ConfigStore>,
    settings: ConnectionSettings,
    shared: Arc<Shared>,
    path: PathBuf,
    rx: Receiver<SupervisorMessage>,
    tx: Sender<SupervisorMessage>,
    stop: Arc<AtomicBool>,
    pump: Option<JoinHandle<()>>,
}

impl Worker {
    fn run(mut self) {
        while let Ok(message) = self.rx.recv() {
            if !self.handle(message) {
                break;
            }
        }
        self.finish();
    }

    /// Returns false once the worker should exit.
    fn handle(&mut self, message: SupervisorMessage) -> bool {
        match message {
            SupervisorMessage::Shutdown => false,
            SupervisorMessage::Connect => {
                if self.pump.is_some() {
                    return true;
                }
                self.connect_until_connected()
            }
            SupervisorMessage::PumpFailed(err) => {
                self.session_lost(&err);
                match self.sleep(self.settings.failure_cooldown(), true) {
                    Wake::Shutdown => false,
                    Wake::Elapsed | Wake::Triggered => self.connect_until_connected(),
                }
            }
        }
    }

    fn connect_until_connected(&mut self) -> bool {
        loop {
            match self.connect_cycle() {
                CycleOutcome::Connected => return true,
                CycleOutcome::Shutdown => return false,
                CycleOutcome::Exhausted => match self.sleep(self.settings.cycle_cooldown(), true) {
                    Wake::Shutdown => return false,
                    Wake::Elapsed | Wake::Triggered => {}
                },
            }
        }
    }

    fn connect_cycle(&mut self) -> CycleOutcome {
        let attempts = self.settings.attempts();
        let backoff = self.settings.backoff();
        {
            let mut status = self.shared.status();
            status.attempts_in_cycle = 0;
            status.last_delay_ms = None;
        }

        for attempt in 0..attempts {
            if self.stopping() {
                return CycleOutcome::Shutdown;
            }
            {
                let mut status = self.shared.status();
                status.state = ConnectionState::Connecting;
                status.attempts_in_cycle = attempt + 1;
            }

            match self.connect_once() {
                Ok(outcome) => return outcome,
                Err(err) => {
                    self.shared.set_state(ConnectionState::Failed);
                    warn!(
                        attempt = attempt + 1,
                        max_attempts = attempts,
                        error = %err,
                        "Presence connection attempt failed"
                    );
                }
            }

            if attempt + 1 < attempts {
                let delay = backoff.delay(attempt);
                self.shared.status().last_delay_ms =
                    Some(u64::try_from(delay.as_millis()).unwrap_or(u64::MAX));
                if let Wake::Shutdown = self.sleep(delay, false) {
                    return CycleOutcome::Shutdown;
                }
            }
        }

        self.shared.status().exhausted_cycles += 1;
        error!(
            attempts,
            retry_in_ms = self.settings.cycle_cooldown_ms,
            "Presence connection cycle exhausted"
        );
        CycleOutcome::Exhausted
    }

    fn connect_once(&mut self) -> Result<CycleOutcome, ClientError> {
        let session = self.client.connect(
            self.settings.application_id,
            CreateFlags::NoRequireDiscord,
            &self.path,
        )?;

        // A connect that outlived stop() must not publish anything.
        if self.stopping() {
            clear_session(session.as_ref());
            debug!("Presence session opened during shutdown; discarded");
            return Ok(CycleOutcome::Shutdown);
        }

        let handle = SessionHandle::new(session, Utc::now());
        self.shared.install(handle.clone());

        match self.spawn_pump(handle.clone()) {
            Ok(pump) => self.pump = Some(pump),
            Err(err) => {
                self.shared.release(ConnectionState::Failed);
                return Err(ClientError::Internal(format!(
                    "failed to spawn callback pump: {}",
                    err
                )));
            }
        }

        info!(path = %self.path.display(), "Presence session connected");
        self.replay(&handle);
        Ok(CycleOutcome::Connected)
    }

    /// Re-sends the last descriptor so a fresh session shows current status.
    fn replay(&self, handle: &SessionHandle) {
        let Some(mut descriptor) = self.shared.latest() else {
            return;
        };
        descriptor.session_start = handle.started_at();
        let outcome = publish(&descriptor, Some(handle), presence_enabled(self.config.as_ref()));
        debug!(outcome = ?outcome, "Replayed presence after connect");
    }

    fn spawn_pump(&self, handle: SessionHandle) -> std::io::Result<JoinHandle<()>> {
        let interval = self.settings.pump_interval();
        let tx = self.tx.clone();
        let stop = Arc::clone(&self.stop);

        thread::Builder::new()
            .name("presence-callbacks".to_string())
            .spawn(move || loop {
                thread::sleep(interval);
                if stop.load(Ordering::SeqCst) {
                    break;
                }
                if let Err(err) = handle.session().run_callbacks() {
                    let _ = tx.send(SupervisorMessage::PumpFailed(err));
                    break;
                }
            })
    }

    fn session_lost(&mut self, err: &ClientError) {
        if let Some(pump) = self.pump.take() {
            if pump.join().is_err() {
                warn!("Presence callback pump panicked");
            }
        }
        self.shared.release(ConnectionState::Failed);
        warn!(error = %err, "Presence session lost; reconnecting");
    }

    /// Waits up to `delay`. Connect nudges end the wait early only when `wake_on_connect`.
    fn sleep(&self, delay: Duration, wake_on_connect: bool) -> Wake {
        let deadline = Instant::now() + delay;
        loop {
            let remaining = deadline.saturating_duration_since(Instant::now());
            if remaining.is_zero() {
                return Wake::Elapsed;
            }
            match self.rx.recv_timeout(remaining) {
                Ok(SupervisorMessage::Shutdown) | Err(RecvTimeoutError::Disconnected) => {
                    return Wake::Shutdown
                }
                Ok(SupervisorMessage::Connect) if wake_on_connect => return Wake::Triggered,
                Ok(message) => {
                    debug!(message = ?message, "Ignoring supervisor message while waiting")
                }
                Err(RecvTimeoutError::Timeout) => return Wake::Elapsed,
            }
        }
    }

    fn stopping(&self) -> bool {
        self.stop.load(Ordering::SeqCst)
    }

    fn finish(&mut self) {
        self.stop.store(true, Ordering::SeqCst);
        if let Some(pump) = self.pump.take() {
            let _ = pump.join();
        }
        if let Some(handle) = self.shared.snapshot() {
            clear_session(handle.session());
        }
        self.shared.release(ConnectionState::Disconnected);
        debug!("Presence supervisor worker exited");
    }
}

/// Best-effort clear, flushed right away since no pump is left to drain it.
fn clear_session(session: &dyn PresenceSession) {
    session.clear_activity(Box::new(|result| {
        if let Err(err) = result {
            warn!(error = %err, "Failed to clear presence on shutdown");
        }
    }));
    if let Err(err) = session.run_callbacks() {
        debug!(error = %err, "Final presence callback flush failed");
    }
}
