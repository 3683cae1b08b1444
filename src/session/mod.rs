//! Session state machine.
//!
//! Interprets transport lifecycle messages into a discrete status, notifies
//! the embedding application on every change, and drives recovery: fixed
//! 30-second reconnect polling while disconnected, and a 1000 ms liveness
//! probe for silent transport death.
//!
//! # Status Transitions
//!
//! | Inbound message | New status |
//! |-----------------|------------|
//! | `connection:ready` after `closed`/`error` | `reconnected` |
//! | `connection:ready` otherwise | `connected` |
//! | `connection:closed` | `closed` |
//! | `connection:error` | `error` |
//! | `connection:reconnected` | `reconnected` |
//! | `connection:reconnecting` | `reconnecting` |
//! | probe timeout | `closed` (fixed message) |
//!
//! # Modules
//!
//! | Module | Description |
//! |--------|-------------|
//! | `callbacks` | Application callback set and dispatch order |
//! | `machine` | Driver task, reconnect polling, liveness probe |
//! | `status` | Status enum and the pure transition table |

// ============================================================================
// Submodules
// ============================================================================

/// Application callback set.
pub mod callbacks;

/// Driver task and timed behaviors.
pub mod machine;

/// Status values and transitions.
pub mod status;

// ============================================================================
// Re-exports
// ============================================================================

pub use callbacks::SessionCallbacks;
pub use machine::{PROBE_LOST_MESSAGE, PROBE_TIMEOUT, RECONNECT_INTERVAL};
pub use status::{SessionStatus, StatusMessage, transition};

pub(crate) use machine::{Command, SessionDriver};
