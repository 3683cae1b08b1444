//! Client facade and builder.
//!
//! [`SignalsClient`] is the public surface of the crate: `send`/`on`/`off`
//! plus credential updates, the visibility-change probe hook, a status
//! snapshot, and teardown. Construction goes through
//! [`SignalsClient::builder`], which spawns the session driver task over a
//! transport.
//!
//! A [`Diagnostics`] handle for ad hoc inspection can be taken at most once
//! per client instance.

// ============================================================================
// Imports
// ============================================================================

use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};

use parking_lot::Mutex;
use serde_json::Value;
use tokio::sync::{mpsc, oneshot};
use tracing::{debug, info, warn};

use crate::emitter::{Emitter, ListenerId};
use crate::error::{Error, Result};
use crate::latch::LatchOutcome;
use crate::protocol::{Inbound, Outbound};
use crate::session::machine::PROBE_TIMEOUT;
use crate::session::{Command, SessionCallbacks, SessionDriver, SessionStatus, StatusMessage};
use crate::transport::{Transport, WebSocketTransport};

// ============================================================================
// SignalsClient
// ============================================================================

/// Facade over one session on the shared signals channel.
///
/// # Example
///
/// ```ignore
/// use signals_client::{SessionCallbacks, SignalsClient};
///
/// let client = SignalsClient::builder()
///     .token("access-token")
///     .callbacks(SessionCallbacks::new().on_connected(|| println!("live")))
///     .connect_ws("wss://signals.example.com")
///     .await?;
///
/// let id = client.on("notifications", |payload| println!("{payload}"));
/// client.send("chat:new-message", serde_json::json!({"text": "hi"}));
/// client.off("notifications", id);
/// ```
pub struct SignalsClient {
    transport: Arc<dyn Transport>,
    emitter: Arc<Emitter>,
    status: Arc<Mutex<StatusMessage>>,
    command_tx: mpsc::UnboundedSender<Command>,
    diagnostics_taken: AtomicBool,
}

impl SignalsClient {
    /// Returns a builder for configuring and starting a client.
    #[inline]
    #[must_use]
    pub fn builder() -> SignalsClientBuilder {
        SignalsClientBuilder::new()
    }

    /// Posts a domain message to the named target. Fire-and-forget.
    pub fn send(&self, target: impl Into<String>, args: Value) {
        self.transport.post(Outbound::Send {
            target: target.into(),
            args,
        });
    }

    /// Registers `callback` for events on `target` and informs the
    /// upstream service of the interest.
    ///
    /// Listeners on the same target are additive; each is independently
    /// removable through the returned handle.
    pub fn on(
        &self,
        target: impl Into<String>,
        callback: impl Fn(&Value) + Send + Sync + 'static,
    ) -> ListenerId {
        let target = target.into();
        let id = self.emitter.on(&target, Arc::new(callback));
        self.transport.post(Outbound::Register { target });
        id
    }

    /// Removes the listener identified by `id` from `target`.
    ///
    /// Removal is local only: interest is never cancelled upstream, so the
    /// service may keep delivering events for targets this client no
    /// longer observes. Known limitation of the protocol.
    pub fn off(&self, target: &str, id: ListenerId) -> bool {
        self.emitter.off(target, id)
    }

    /// Stores a new access credential.
    ///
    /// If the transport is already ready the session is re-initialized
    /// immediately; otherwise initialization happens once readiness is
    /// announced.
    pub fn set_token(&self, token: impl Into<String>) {
        if self
            .command_tx
            .send(Command::SetToken(token.into()))
            .is_err()
        {
            warn!("set_token after driver shutdown");
        }
    }

    /// Runs a liveness probe. Call on visibility changes (tab foregrounded).
    ///
    /// A probe answered within 1000 ms leaves the status untouched; one
    /// that is not forces the status to `closed`.
    pub fn probe(&self) {
        if self.command_tx.send(Command::Probe { reply: None }).is_err() {
            warn!("probe after driver shutdown");
        }
    }

    /// Returns a snapshot of the current status.
    #[must_use]
    pub fn status(&self) -> StatusMessage {
        self.status.lock().clone()
    }

    /// Tears the client down: posts a best-effort `beforeunload`, stops
    /// event delivery and terminates the driver task.
    pub fn close(&self) {
        let _ = self.command_tx.send(Command::Close);
    }

    /// Returns the diagnostic interface.
    ///
    /// Installed at most once per client instance; subsequent calls return
    /// `None`.
    #[must_use]
    pub fn diagnostics(&self) -> Option<Diagnostics> {
        if self.diagnostics_taken.swap(true, Ordering::SeqCst) {
            return None;
        }
        debug!("Diagnostics installed");
        Some(Diagnostics {
            transport: Arc::clone(&self.transport),
            emitter: Arc::clone(&self.emitter),
            command_tx: self.command_tx.clone(),
        })
    }
}

// ============================================================================
// SignalsClientBuilder
// ============================================================================

/// Builder for [`SignalsClient`].
#[derive(Default)]
pub struct SignalsClientBuilder {
    token: Option<String>,
    callbacks: SessionCallbacks,
}

impl SignalsClientBuilder {
    /// Creates a builder with no credential and no callbacks.
    #[inline]
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Sets the initial access credential.
    ///
    /// Without a credential the session is not initialized until
    /// [`SignalsClient::set_token`] provides one.
    #[must_use]
    pub fn token(mut self, token: impl Into<String>) -> Self {
        self.token = Some(token.into());
        self
    }

    /// Sets the status-change callbacks.
    #[must_use]
    pub fn callbacks(mut self, callbacks: SessionCallbacks) -> Self {
        self.callbacks = callbacks;
        self
    }

    /// Starts a client over an already-connected transport.
    ///
    /// `inbound` is the transport's inbound message stream; the driver task
    /// is spawned here and runs until [`SignalsClient::close`].
    #[must_use]
    pub fn start<T: Transport>(
        self,
        transport: T,
        inbound: mpsc::UnboundedReceiver<Inbound>,
    ) -> SignalsClient {
        let transport: Arc<dyn Transport> = Arc::new(transport);
        let emitter = Arc::new(Emitter::new());
        let status = Arc::new(Mutex::new(StatusMessage::new(SessionStatus::Unset)));
        let (command_tx, command_rx) = mpsc::unbounded_channel();

        let driver = SessionDriver::new(
            Arc::clone(&transport),
            Arc::clone(&emitter),
            self.callbacks,
            Arc::clone(&status),
            self.token,
        );
        tokio::spawn(driver.run(inbound, command_rx));

        SignalsClient {
            transport,
            emitter,
            status,
            command_tx,
            diagnostics_taken: AtomicBool::new(false),
        }
    }

    /// Connects a [`WebSocketTransport`] to `endpoint` and starts a client
    /// over it.
    ///
    /// # Errors
    ///
    /// - [`Error::InvalidEndpoint`] if `endpoint` is not a `ws`/`wss` URL
    /// - [`Error::WebSocket`] if the handshake fails
    pub async fn connect_ws(self, endpoint: &str) -> Result<SignalsClient> {
        let (transport, inbound) = WebSocketTransport::connect(endpoint).await?;
        Ok(self.start(transport, inbound))
    }
}

// ============================================================================
// Diagnostics
// ============================================================================

/// Selector deciding whether a traced event should be printed.
pub type SignalSelector = Box<dyn Fn(&Value) -> bool + Send + Sync>;

/// Ad hoc inspection interface, obtainable once per client.
///
/// Replaces ambient global debug hooks with an explicitly constructed
/// handle.
pub struct Diagnostics {
    transport: Arc<dyn Transport>,
    emitter: Arc<Emitter>,
    command_tx: mpsc::UnboundedSender<Command>,
}

impl Diagnostics {
    /// Traces every future event on `target` that matches `selector`
    /// (every event when `selector` is `None`).
    ///
    /// Returns the listener handle so tracing can be switched off again.
    pub fn log_signal(&self, target: impl Into<String>, selector: Option<SignalSelector>) -> ListenerId {
        let target = target.into();
        let target_label = target.clone();

        let id = self.emitter.on(
            &target,
            Arc::new(move |payload| {
                let matches = selector.as_ref().map_or(true, |selector| selector(payload));
                if matches {
                    info!(signal = %target_label, %payload, "Signal observed");
                }
            }),
        );
        self.transport.post(Outbound::Register { target });
        id
    }

    /// Sends a manual liveness probe and waits for its outcome.
    ///
    /// # Errors
    ///
    /// - [`Error::ProbeTimeout`] if no `pong` arrived within the deadline
    /// - [`Error::ProbeInvalidated`] if a newer probe superseded this one
    /// - [`Error::ConnectionClosed`] if the driver has terminated
    pub async fn ping(&self) -> Result<()> {
        let (reply_tx, reply_rx) = oneshot::channel();
        self.command_tx
            .send(Command::Probe {
                reply: Some(reply_tx),
            })
            .map_err(|_| Error::ConnectionClosed)?;

        match reply_rx.await? {
            LatchOutcome::Resolved => Ok(()),
            LatchOutcome::Rejected => Err(Error::probe_timeout(PROBE_TIMEOUT.as_millis() as u64)),
            LatchOutcome::Invalidated => Err(Error::ProbeInvalidated),
        }
    }
}
