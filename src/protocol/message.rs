//! Outbound and inbound message types.
//!
//! The vocabulary is deliberately small: five outbound messages and eight
//! inbound ones. None of the outbound messages is acknowledged; the only
//! correlated pair is `ping` → `pong`, and that correlation is handled by
//! the session's single probe slot, not by message IDs.

// ============================================================================
// Imports
// ============================================================================

use serde::{Deserialize, Serialize};
use serde_json::Value;

// ============================================================================
// Outbound
// ============================================================================

/// A message from the client to the upstream signals service.
///
/// All outbound messages are fire-and-forget.
///
/// # Format
///
/// ```json
/// {"type": "connection:init", "token": "access-token"}
/// {"type": "send", "target": "chat:new-message", "args": {...}}
/// ```
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type")]
pub enum Outbound {
    /// Starts (or restarts) a session using the given access credential.
    #[serde(rename = "connection:init")]
    Init {
        /// Access credential for the upstream service.
        token: String,
    },

    /// Sends a domain message to the named target.
    #[serde(rename = "send")]
    Send {
        /// Target name identifying the message class.
        target: String,
        /// Arbitrary message arguments.
        args: Value,
    },

    /// Registers interest in events for the named target.
    #[serde(rename = "event:register")]
    Register {
        /// Target name to subscribe to.
        target: String,
    },

    /// Liveness probe; the service answers with `pong`.
    #[serde(rename = "ping")]
    Ping,

    /// Best-effort teardown notice posted when the client goes away.
    #[serde(rename = "beforeunload")]
    BeforeUnload,
}

impl Outbound {
    /// Returns the wire name of this message, for logging.
    #[inline]
    #[must_use]
    pub fn name(&self) -> &'static str {
        match self {
            Self::Init { .. } => "connection:init",
            Self::Send { .. } => "send",
            Self::Register { .. } => "event:register",
            Self::Ping => "ping",
            Self::BeforeUnload => "beforeunload",
        }
    }
}

// ============================================================================
// Inbound
// ============================================================================

/// A message from the upstream signals service to the client.
///
/// Delivered asynchronously, in arrival order. Lifecycle messages drive the
/// session state machine; `event:received` fans out to registered listeners;
/// `pong` resolves the outstanding liveness probe.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type")]
pub enum Inbound {
    /// One-time readiness announcement from the shared transport.
    ///
    /// Until this arrives, outbound delivery is not guaranteed and the
    /// session must not be initialized.
    #[serde(rename = "worker:ready")]
    WorkerReady,

    /// The upstream connection is established.
    #[serde(rename = "connection:ready")]
    ConnectionReady,

    /// The upstream connection closed.
    #[serde(rename = "connection:closed")]
    ConnectionClosed {
        /// Optional human-readable reason.
        #[serde(default, skip_serializing_if = "Option::is_none")]
        message: Option<String>,
    },

    /// The upstream connection failed.
    #[serde(rename = "connection:error")]
    ConnectionError {
        /// Optional human-readable reason.
        #[serde(default, skip_serializing_if = "Option::is_none")]
        message: Option<String>,
    },

    /// The upstream connection was re-established.
    #[serde(rename = "connection:reconnected")]
    ConnectionReconnected,

    /// The upstream connection is attempting to re-establish.
    #[serde(rename = "connection:reconnecting")]
    ConnectionReconnecting,

    /// A domain event routed to this client.
    #[serde(rename = "event:received")]
    EventReceived {
        /// Target name identifying the event class.
        target: String,
        /// Event payload.
        payload: Value,
    },

    /// Answer to an outbound `ping`.
    #[serde(rename = "pong")]
    Pong,
}

impl Inbound {
    /// Returns `true` if this message affects the session status.
    #[inline]
    #[must_use]
    pub fn is_lifecycle(&self) -> bool {
        matches!(
            self,
            Self::ConnectionReady
                | Self::ConnectionClosed { .. }
                | Self::ConnectionError { .. }
                | Self::ConnectionReconnected
                | Self::ConnectionReconnecting
        )
    }
}

// ============================================================================
// Tests
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_init_serialization() {
        let msg = Outbound::Init {
            token: "secret".to_string(),
        };
        let json = serde_json::to_value(&msg).expect("serialize");

        assert_eq!(json, json!({"type": "connection:init", "token": "secret"}));
    }

    #[test]
    fn test_send_serialization() {
        let msg = Outbound::Send {
            target: "chat:new-message".to_string(),
            args: json!({"text": "hi"}),
        };
        let json = serde_json::to_value(&msg).expect("serialize");

        assert_eq!(json["type"], "send");
        assert_eq!(json["target"], "chat:new-message");
        assert_eq!(json["args"]["text"], "hi");
    }

    #[test]
    fn test_ping_serialization() {
        let json = serde_json::to_value(Outbound::Ping).expect("serialize");
        assert_eq!(json, json!({"type": "ping"}));
    }

    #[test]
    fn test_outbound_names() {
        assert_eq!(
            Outbound::Register {
                target: "t".to_string()
            }
            .name(),
            "event:register"
        );
        assert_eq!(Outbound::BeforeUnload.name(), "beforeunload");
    }

    #[test]
    fn test_inbound_lifecycle_parsing() {
        let msg: Inbound =
            serde_json::from_str(r#"{"type": "connection:closed", "message": "kicked"}"#)
                .expect("parse");

        assert!(msg.is_lifecycle());
        assert_eq!(
            msg,
            Inbound::ConnectionClosed {
                message: Some("kicked".to_string())
            }
        );
    }

    #[test]
    fn test_inbound_closed_without_message() {
        let msg: Inbound = serde_json::from_str(r#"{"type": "connection:closed"}"#).expect("parse");
        assert_eq!(msg, Inbound::ConnectionClosed { message: None });
    }

    #[test]
    fn test_inbound_event_received() {
        let msg: Inbound = serde_json::from_str(
            r#"{"type": "event:received", "target": "notifications", "payload": {"id": 7}}"#,
        )
        .expect("parse");

        assert!(!msg.is_lifecycle());
        match msg {
            Inbound::EventReceived { target, payload } => {
                assert_eq!(target, "notifications");
                assert_eq!(payload["id"], 7);
            }
            other => panic!("unexpected message: {other:?}"),
        }
    }

    #[test]
    fn test_inbound_pong() {
        let msg: Inbound = serde_json::from_str(r#"{"type": "pong"}"#).expect("parse");
        assert_eq!(msg, Inbound::Pong);
        assert!(!msg.is_lifecycle());
    }

    #[test]
    fn test_unknown_inbound_rejected() {
        let result = serde_json::from_str::<Inbound>(r#"{"type": "mystery"}"#);
        assert!(result.is_err());
    }
}
