//! Status-change callbacks registered by the embedding application.

// ============================================================================
// Imports
// ============================================================================

use crate::session::status::{SessionStatus, StatusMessage};

// ============================================================================
// Types
// ============================================================================

/// Callback receiving the full status message on every change.
pub type StatusChangeCallback = Box<dyn Fn(&StatusMessage) + Send>;

/// Callback receiving the optional reason of a `closed`/`error` status.
pub type ReasonCallback = Box<dyn Fn(Option<&str>) + Send>;

/// Callback receiving no arguments.
pub type PlainCallback = Box<dyn Fn() + Send>;

// ============================================================================
// SessionCallbacks
// ============================================================================

/// Set of callbacks invoked by the session state machine.
///
/// On every status change the machine invokes `on_status_change` first,
/// then exactly one status-specific callback, synchronously with the state
/// update. All callbacks are optional.
///
/// # Example
///
/// ```ignore
/// let callbacks = SessionCallbacks::new()
///     .on_connected(|| println!("live"))
///     .on_closed(|reason| println!("closed: {reason:?}"));
/// ```
#[derive(Default)]
pub struct SessionCallbacks {
    on_status_change: Option<StatusChangeCallback>,
    on_connected: Option<PlainCallback>,
    on_reconnected: Option<PlainCallback>,
    on_reconnecting: Option<PlainCallback>,
    on_closed: Option<ReasonCallback>,
    on_error: Option<ReasonCallback>,
}

impl SessionCallbacks {
    /// Creates an empty callback set.
    #[inline]
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Sets the generic status-change callback.
    #[must_use]
    pub fn on_status_change(mut self, callback: impl Fn(&StatusMessage) + Send + 'static) -> Self {
        self.on_status_change = Some(Box::new(callback));
        self
    }

    /// Sets the callback for the `connected` status.
    #[must_use]
    pub fn on_connected(mut self, callback: impl Fn() + Send + 'static) -> Self {
        self.on_connected = Some(Box::new(callback));
        self
    }

    /// Sets the callback for the `reconnected` status.
    #[must_use]
    pub fn on_reconnected(mut self, callback: impl Fn() + Send + 'static) -> Self {
        self.on_reconnected = Some(Box::new(callback));
        self
    }

    /// Sets the callback for the `reconnecting` status.
    #[must_use]
    pub fn on_reconnecting(mut self, callback: impl Fn() + Send + 'static) -> Self {
        self.on_reconnecting = Some(Box::new(callback));
        self
    }

    /// Sets the callback for the `closed` status.
    #[must_use]
    pub fn on_closed(mut self, callback: impl Fn(Option<&str>) + Send + 'static) -> Self {
        self.on_closed = Some(Box::new(callback));
        self
    }

    /// Sets the callback for the `error` status.
    #[must_use]
    pub fn on_error(mut self, callback: impl Fn(Option<&str>) + Send + 'static) -> Self {
        self.on_error = Some(Box::new(callback));
        self
    }

    /// Dispatches one status change: generic callback first, then the
    /// status-specific one.
    pub(crate) fn notify(&self, status_message: &StatusMessage) {
        if let Some(callback) = &self.on_status_change {
            callback(status_message);
        }

        let reason = status_message.message.as_deref();
        match status_message.status {
            SessionStatus::Connected => {
                if let Some(callback) = &self.on_connected {
                    callback();
                }
            }
            SessionStatus::Reconnected => {
                if let Some(callback) = &self.on_reconnected {
                    callback();
                }
            }
            SessionStatus::Reconnecting => {
                if let Some(callback) = &self.on_reconnecting {
                    callback();
                }
            }
            SessionStatus::Closed => {
                if let Some(callback) = &self.on_closed {
                    callback(reason);
                }
            }
            SessionStatus::Error => {
                if let Some(callback) = &self.on_error {
                    callback(reason);
                }
            }
            SessionStatus::Unset => {}
        }
    }
}

// ============================================================================
// Tests
// ============================================================================
