//! Session driver and event loop.
//!
//! The driver is a spawned task that owns the session state machine. It
//! processes inbound transport messages strictly in delivery order, applies
//! status transitions one at a time, and runs the two timed behaviors:
//!
//! - **Reconnect polling**: while the status is disconnected and both a
//!   credential and a ready transport are available, `connection:init` is
//!   re-sent every 30 seconds. The timer is cancelled the instant the
//!   status leaves the disconnected set.
//! - **Liveness probe**: a `ping` correlated to its `pong` through a
//!   single-slot latch, with a 1000 ms deadline. A probe that times out
//!   marks the transport not-ready and forces the status to `closed`,
//!   because a shared transport can die without emitting any lifecycle
//!   event.

// ============================================================================
// Imports
// ============================================================================

use std::sync::Arc;
use std::time::Duration;

use parking_lot::Mutex;
use tokio::sync::{mpsc, oneshot};
use tokio::time::{Instant, Interval, MissedTickBehavior, interval_at, sleep_until};
use tracing::{debug, trace, warn};

use crate::emitter::Emitter;
use crate::latch::{LatchOutcome, LatchSlot};
use crate::protocol::{Inbound, Outbound};
use crate::session::callbacks::SessionCallbacks;
use crate::session::status::{self, SessionStatus, StatusMessage};
use crate::transport::Transport;

// ============================================================================
// Constants
// ============================================================================

/// Interval between `connection:init` re-sends while disconnected.
pub const RECONNECT_INTERVAL: Duration = Duration::from_secs(30);

/// Deadline for a liveness probe to be answered with `pong`.
pub const PROBE_TIMEOUT: Duration = Duration::from_millis(1000);

/// Diagnostic attached to the `closed` status forced by a probe timeout.
///
/// The string is part of the upstream-facing contract and must not change.
pub const PROBE_LOST_MESSAGE: &str = "connection to shared worker lost";

// ============================================================================
// Command
// ============================================================================

/// Commands from the facade to the driver.
pub(crate) enum Command {
    /// Store a new access credential and re-initialize if possible.
    SetToken(String),
    /// Run a liveness probe; `reply` observes the probe outcome.
    Probe {
        reply: Option<oneshot::Sender<LatchOutcome>>,
    },
    /// Post `beforeunload`, stop the emitter and terminate the driver.
    Close,
}

// ============================================================================
// ProbeWindow
// ============================================================================

/// The at-most-one outstanding liveness probe.
#[derive(Default)]
struct ProbeWindow {
    slot: LatchSlot,
    deadline: Option<Instant>,
}

impl ProbeWindow {
    /// Resolves the outstanding probe. Returns `false` for an unsolicited
    /// `pong`.
    fn complete_resolved(&mut self) -> bool {
        self.deadline = None;
        self.slot.resolve()
    }

    /// Rejects the outstanding probe on deadline.
    fn complete_rejected(&mut self) {
        self.deadline = None;
        self.slot.reject();
    }
}

// ============================================================================
// SessionDriver
// ============================================================================

/// Owns the session state and runs the event loop.
pub(crate) struct SessionDriver {
    transport: Arc<dyn Transport>,
    emitter: Arc<Emitter>,
    callbacks: SessionCallbacks,
    status: Arc<Mutex<StatusMessage>>,
    token: Option<String>,
    worker_ready: bool,
}

impl SessionDriver {
    pub(crate) fn new(
        transport: Arc<dyn Transport>,
        emitter: Arc<Emitter>,
        callbacks: SessionCallbacks,
        status: Arc<Mutex<StatusMessage>>,
        token: Option<String>,
    ) -> Self {
        Self {
            transport,
            emitter,
            callbacks,
            status,
            token,
            worker_ready: false,
        }
    }

    /// Event loop. Runs until the facade closes or the transport channel
    /// drops.
    pub(crate) async fn run(
        mut self,
        mut inbound_rx: mpsc::UnboundedReceiver<Inbound>,
        mut command_rx: mpsc::UnboundedReceiver<Command>,
    ) {
        let mut reconnect: Option<Interval> = None;
        let mut probe = ProbeWindow::default();

        loop {
            tokio::select! {
                // Inbound messages, processed one at a time in arrival order
                inbound = inbound_rx.recv() => {
                    match inbound {
                        Some(message) => self.handle_inbound(message, &mut probe, &mut reconnect),
                        None => {
                            debug!("Inbound channel closed, stopping driver");
                            self.apply_status(StatusMessage::with_message(
                                SessionStatus::Closed,
                                "transport channel dropped",
                            ));
                            self.emitter.stop();
                            break;
                        }
                    }
                }

                // Commands from the facade
                command = command_rx.recv() => {
                    match command {
                        Some(Command::SetToken(token)) => {
                            self.handle_set_token(token, &mut reconnect);
                        }
                        Some(Command::Probe { reply }) => {
                            self.handle_probe(reply, &mut probe);
                        }
                        Some(Command::Close) | None => {
                            self.handle_close();
                            break;
                        }
                    }
                }

                // Probe deadline
                () = probe_deadline(&probe), if probe.deadline.is_some() => {
                    self.handle_probe_timeout(&mut probe, &mut reconnect);
                }

                // Reconnect polling
                () = reconnect_tick(&mut reconnect), if reconnect.is_some() => {
                    self.resend_init();
                }
            }
        }

        debug!("Session driver terminated");
    }

    // ========================================================================
    // Inbound Handling
    // ========================================================================

    fn handle_inbound(
        &mut self,
        message: Inbound,
        probe: &mut ProbeWindow,
        reconnect: &mut Option<Interval>,
    ) {
        match message {
            Inbound::WorkerReady => {
                debug!("Transport ready");
                self.worker_ready = true;
                self.try_init();
                self.sync_reconnect(reconnect);
            }

            Inbound::EventReceived { target, payload } => {
                trace!(event_target = %target, "Event received");
                self.emitter.emit(&target, &payload);
            }

            Inbound::Pong => {
                if probe.complete_resolved() {
                    trace!("Probe answered");
                    self.worker_ready = true;
                    self.sync_reconnect(reconnect);
                } else {
                    trace!("Unsolicited pong ignored");
                }
            }

            lifecycle => {
                if let Some(next) = status::transition(self.current_status(), &lifecycle) {
                    self.apply_status(next);
                    self.sync_reconnect(reconnect);
                }
            }
        }
    }

    // ========================================================================
    // Command Handling
    // ========================================================================

    fn handle_set_token(&mut self, token: String, reconnect: &mut Option<Interval>) {
        if self.token.as_deref() == Some(token.as_str()) {
            trace!("Token unchanged");
            return;
        }

        debug!("Token updated");
        self.token = Some(token);
        self.try_init();
        self.sync_reconnect(reconnect);
    }

    fn handle_probe(&mut self, reply: Option<oneshot::Sender<LatchOutcome>>, probe: &mut ProbeWindow) {
        // Arming invalidates any probe still in flight.
        let latch = probe.slot.arm();
        probe.deadline = Some(Instant::now() + PROBE_TIMEOUT);

        if let Some(reply) = reply {
            tokio::spawn(async move {
                let _ = reply.send(latch.wait().await);
            });
        }

        trace!("Probe sent");
        self.transport.post(Outbound::Ping);
    }

    fn handle_probe_timeout(&mut self, probe: &mut ProbeWindow, reconnect: &mut Option<Interval>) {
        warn!(timeout_ms = PROBE_TIMEOUT.as_millis() as u64, "Liveness probe timed out");
        probe.complete_rejected();
        self.worker_ready = false;
        self.apply_status(StatusMessage::with_message(
            SessionStatus::Closed,
            PROBE_LOST_MESSAGE,
        ));
        self.sync_reconnect(reconnect);
    }

    fn handle_close(&mut self) {
        debug!("Client closing");
        // Best-effort notice; delivery is not guaranteed during teardown.
        self.transport.post(Outbound::BeforeUnload);
        self.emitter.stop();
    }

    // ========================================================================
    // Session Management
    // ========================================================================

    /// Sends `connection:init` if the transport is ready and a credential
    /// is present.
    fn try_init(&self) {
        if !self.worker_ready {
            return;
        }
        if let Some(token) = &self.token {
            debug!("Initializing session");
            self.transport.post(Outbound::Init {
                token: token.clone(),
            });
        }
    }

    /// Re-sends `connection:init` on a reconnect poll tick.
    fn resend_init(&self) {
        if let Some(token) = &self.token {
            debug!("Reconnect poll, re-sending init");
            self.transport.post(Outbound::Init {
                token: token.clone(),
            });
        }
    }

    fn current_status(&self) -> SessionStatus {
        self.status.lock().status
    }

    /// Publishes a status change and dispatches callbacks.
    fn apply_status(&mut self, next: StatusMessage) {
        debug!(status = %next.status, reason = ?next.message, "Session status changed");
        *self.status.lock() = next.clone();
        self.callbacks.notify(&next);
    }

    /// Keeps the reconnect timer synchronized with the disconnected
    /// predicate: running iff disconnected with a credential and a ready
    /// transport.
    fn sync_reconnect(&self, reconnect: &mut Option<Interval>) {
        let should_poll =
            self.current_status().is_disconnected() && self.token.is_some() && self.worker_ready;

        match (should_poll, reconnect.is_some()) {
            (true, false) => {
                debug!("Starting reconnect polling");
                let mut interval =
                    interval_at(Instant::now() + RECONNECT_INTERVAL, RECONNECT_INTERVAL);
                interval.set_missed_tick_behavior(MissedTickBehavior::Delay);
                *reconnect = Some(interval);
            }
            (false, true) => {
                debug!("Stopping reconnect polling");
                *reconnect = None;
            }
            _ => {}
        }
    }
}

// ============================================================================
// Select Helpers
// ============================================================================

/// Sleeps until the probe deadline, or forever when no probe is armed.
async fn probe_deadline(probe: &ProbeWindow) {
    match probe.deadline {
        Some(deadline) => sleep_until(deadline).await,
        None => std::future::pending().await,
    }
}

/// Waits for the next reconnect tick, or forever when polling is off.
async fn reconnect_tick(reconnect: &mut Option<Interval>) {
    match reconnect {
        Some(interval) => {
            interval.tick().await;
        }
        None => std::future::pending::<()>().await,
    }
}

// ============================================================================
// Tests
// ============================================================================
