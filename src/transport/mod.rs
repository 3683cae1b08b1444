//! Shared channel transport layer.
//!
//! The transport owns the single underlying connection to the upstream
//! signals service and is shared by every consumer of the client: handles
//! are cheap clones over one connection.
//!
//! ```text
//! ┌──────────────────┐                            ┌──────────────────┐
//! │  SignalsClient   │        WebSocket           │  Signals service │
//! │                  │◄──────────────────────────►│                  │
//! │  Transport::post │        JSON messages       │  session mgmt    │
//! │  ← Inbound mpsc  │                            │  event routing   │
//! └──────────────────┘                            └──────────────────┘
//! ```
//!
//! # Contract
//!
//! - Outbound posts are fire-and-forget; none is acknowledged.
//! - Inbound messages are delivered in arrival order on an mpsc channel.
//! - A one-time `worker:ready` is delivered once the channel is usable;
//!   initialization must be gated on it.
//!
//! # Modules
//!
//! | Module | Description |
//! |--------|-------------|
//! | `websocket` | Production transport over tokio-tungstenite |

// ============================================================================
// Submodules
// ============================================================================

/// WebSocket transport and its IO loop.
pub mod websocket;

// ============================================================================
// Re-exports
// ============================================================================

pub use websocket::WebSocketTransport;

use crate::protocol::Outbound;

// ============================================================================
// Transport Trait
// ============================================================================

/// Outbound half of the shared channel.
///
/// Implementations must be cheap to clone behind an `Arc` and safe to call
/// from any task. `post` never blocks and never fails visibly; a dead
/// channel swallows the message, which the session detects through the
/// liveness probe rather than through a send error.
pub trait Transport: Send + Sync + 'static {
    /// Posts an outbound message, fire-and-forget.
    fn post(&self, message: Outbound);
}
