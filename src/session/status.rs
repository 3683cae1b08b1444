//! Session status and the lifecycle transition table.

// ============================================================================
// Imports
// ============================================================================

use std::fmt;

use serde::{Deserialize, Serialize};

use crate::protocol::Inbound;

// ============================================================================
// SessionStatus
// ============================================================================

/// Discrete session status exposed to the embedding application.
///
/// Exactly one value is live at a time. `Unset` means no status has been
/// observed yet; it is never re-entered once any lifecycle event arrives.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SessionStatus {
    /// No status observed yet.
    Unset,
    /// Connected for the first time in this session.
    Connected,
    /// Connected again after a closure or error.
    Reconnected,
    /// The upstream layer is attempting to re-establish the connection.
    Reconnecting,
    /// The connection closed.
    Closed,
    /// The connection failed.
    Error,
}

impl SessionStatus {
    /// Returns `true` if this status counts as disconnected.
    ///
    /// Reconnect polling runs only while the status is in this set.
    #[inline]
    #[must_use]
    pub fn is_disconnected(self) -> bool {
        matches!(self, Self::Unset | Self::Closed | Self::Error)
    }

    /// Returns the lowercase wire/display name of this status.
    #[inline]
    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Unset => "unset",
            Self::Connected => "connected",
            Self::Reconnected => "reconnected",
            Self::Reconnecting => "reconnecting",
            Self::Closed => "closed",
            Self::Error => "error",
        }
    }
}

impl fmt::Display for SessionStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

// ============================================================================
// StatusMessage
// ============================================================================

/// A status value plus an optional human-readable reason.
///
/// Produced on every status change; immutable once emitted.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StatusMessage {
    /// The new status.
    pub status: SessionStatus,
    /// Optional reason, carried by `closed`/`error` lifecycle messages.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub message: Option<String>,
}

impl StatusMessage {
    /// Creates a status message without a reason.
    #[inline]
    #[must_use]
    pub fn new(status: SessionStatus) -> Self {
        Self {
            status,
            message: None,
        }
    }

    /// Creates a status message with a reason.
    #[inline]
    #[must_use]
    pub fn with_message(status: SessionStatus, message: impl Into<String>) -> Self {
        Self {
            status,
            message: Some(message.into()),
        }
    }
}

// ============================================================================
// Transition Table
// ============================================================================

/// Applies one inbound message to `previous`, returning the new status.
///
/// Returns `None` for messages that do not affect the status. The one
/// history-dependent rule: `connection:ready` after `closed` or `error`
/// yields `reconnected`, never `connected`.
#[must_use]
pub fn transition(previous: SessionStatus, inbound: &Inbound) -> Option<StatusMessage> {
    match inbound {
        Inbound::ConnectionReady => {
            let next = if matches!(previous, SessionStatus::Closed | SessionStatus::Error) {
                SessionStatus::Reconnected
            } else {
                SessionStatus::Connected
            };
            Some(StatusMessage::new(next))
        }

        Inbound::ConnectionClosed { message } => Some(StatusMessage {
            status: SessionStatus::Closed,
            message: message.clone(),
        }),

        Inbound::ConnectionError { message } => Some(StatusMessage {
            status: SessionStatus::Error,
            message: message.clone(),
        }),

        Inbound::ConnectionReconnected => Some(StatusMessage::new(SessionStatus::Reconnected)),

        Inbound::ConnectionReconnecting => Some(StatusMessage::new(SessionStatus::Reconnecting)),

        Inbound::WorkerReady | Inbound::EventReceived { .. } | Inbound::Pong => None,
    }
}

// ============================================================================
// Tests
// ============================================================================
