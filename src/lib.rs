//! Signals client - session and reconnection manager for a real-time
//! event channel.
//!
//! This library maintains one client session on a shared channel to an
//! upstream signals service: it initializes the session with an access
//! credential, tracks a discrete connection status, recovers from
//! disconnection with fixed-interval polling, and detects silent transport
//! death with a timed liveness probe.
//!
//! # Architecture
//!
//! - **Transport**: one shared duplex channel to the upstream service;
//!   outbound posts are fire-and-forget, inbound messages arrive in order
//! - **Session driver**: a spawned task interpreting lifecycle messages
//!   into status transitions and running the reconnect/probe timers
//! - **Emitter**: local fan-out of `event:received` messages to listeners
//!   registered by target name
//! - **Facade**: [`SignalsClient`] with `send`/`on`/`off` plus status
//!   subscription via [`SessionCallbacks`]
//!
//! All failures surface as status values delivered to the embedding
//! application; nothing escapes the subsystem boundary as a panic or error
//! once the client is running.
//!
//! # Quick Start
//!
//! ```no_run
//! use signals_client::{Result, SessionCallbacks, SignalsClient};
//!
//! #[tokio::main]
//! async fn main() -> Result<()> {
//!     let client = SignalsClient::builder()
//!         .token("access-token")
//!         .callbacks(
//!             SessionCallbacks::new()
//!                 .on_connected(|| println!("connected"))
//!                 .on_closed(|reason| println!("closed: {reason:?}")),
//!         )
//!         .connect_ws("wss://signals.example.com")
//!         .await?;
//!
//!     let id = client.on("notifications", |payload| {
//!         println!("notification: {payload}");
//!     });
//!     client.send("chat:new-message", serde_json::json!({"text": "hi"}));
//!     client.off("notifications", id);
//!     client.close();
//!
//!     Ok(())
//! }
//! ```
//!
//! # Modules
//!
//! | Module | Description |
//! |--------|-------------|
//! | [`client`] | Facade, builder and [`Diagnostics`] |
//! | [`emitter`] | Target-keyed listener registry |
//! | [`error`] | Error types and [`Result`] alias |
//! | [`latch`] | Single-shot probe latch |
//! | [`protocol`] | Channel message types |
//! | [`session`] | Status machine, polling and liveness probe |
//! | [`transport`] | Shared channel transport (internal seam + WebSocket) |

// ============================================================================
// Modules
// ============================================================================

/// Client facade, builder and diagnostics.
pub mod client;

/// In-process event emitter.
pub mod emitter;

/// Error types and result aliases.
///
/// All fallible operations return [`Result<T>`] which uses [`Error`].
pub mod error;

/// Single-shot latch and its single-slot owner.
pub mod latch;

/// Channel message types.
pub mod protocol;

/// Session state machine.
pub mod session;

/// Shared channel transport layer.
pub mod transport;

// ============================================================================
// Re-exports
// ============================================================================

// Client types
pub use client::{Diagnostics, SignalSelector, SignalsClient, SignalsClientBuilder};

// Emitter types
pub use emitter::{Emitter, ListenerCallback, ListenerId};

// Error types
pub use error::{Error, Result};

// Latch types
pub use latch::{Latch, LatchOutcome, LatchSlot};

// Protocol types
pub use protocol::{Inbound, Outbound};

// Session types
pub use session::{
    PROBE_LOST_MESSAGE, PROBE_TIMEOUT, RECONNECT_INTERVAL, SessionCallbacks, SessionStatus,
    StatusMessage,
};

// Transport types
pub use transport::{Transport, WebSocketTransport};
