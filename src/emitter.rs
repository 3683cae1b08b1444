//! In-process event emitter.
//!
//! Fans inbound domain events out to listeners registered against a target
//! name. Multiple listeners on the same target are additive; each is
//! independently removable via the [`ListenerId`] handle returned by
//! [`Emitter::on`].
//!
//! Callbacks are not comparable in Rust, so removal is handle-based rather
//! than by callback identity.

// ============================================================================
// Imports
// ============================================================================

use std::fmt;
use std::sync::Arc;

use parking_lot::Mutex;
use rustc_hash::FxHashMap;
use serde_json::Value;
use tracing::trace;
use uuid::Uuid;

// ============================================================================
// Types
// ============================================================================

/// Callback invoked with the payload of each matching event.
pub type ListenerCallback = Arc<dyn Fn(&Value) + Send + Sync>;

/// Handle identifying one registered listener.
///
/// Returned by [`Emitter::on`]; pass it to [`Emitter::off`] to remove
/// exactly that listener.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct ListenerId(Uuid);

impl ListenerId {
    /// Generates a fresh listener handle.
    #[inline]
    #[must_use]
    pub fn generate() -> Self {
        Self(Uuid::new_v4())
    }
}

impl fmt::Display for ListenerId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        self.0.fmt(f)
    }
}

// ============================================================================
// Emitter
// ============================================================================

/// Target-keyed publish/subscribe registry.
///
/// # Thread Safety
///
/// `Emitter` is `Send + Sync`; all operations lock briefly and callbacks
/// are invoked outside the lock, so a callback may call [`Emitter::off`]
/// without deadlocking.
pub struct Emitter {
    inner: Mutex<EmitterInner>,
}

struct EmitterInner {
    listeners: FxHashMap<String, Vec<(ListenerId, ListenerCallback)>>,
    stopped: bool,
}

impl Emitter {
    /// Creates an empty emitter.
    #[must_use]
    pub fn new() -> Self {
        Self {
            inner: Mutex::new(EmitterInner {
                listeners: FxHashMap::default(),
                stopped: false,
            }),
        }
    }

    /// Registers `callback` against `target` and returns its handle.
    ///
    /// Registrations after [`Emitter::stop`] are accepted but never fire.
    pub fn on(&self, target: &str, callback: ListenerCallback) -> ListenerId {
        let id = ListenerId::generate();
        let mut inner = self.inner.lock();
        inner
            .listeners
            .entry(target.to_string())
            .or_default()
            .push((id, callback));
        trace!(event_target = %target, listener = %id, "Listener registered");
        id
    }

    /// Removes the listener identified by `id` from `target`.
    ///
    /// Returns `true` if a listener was removed. Other listeners on the
    /// same target are unaffected.
    pub fn off(&self, target: &str, id: ListenerId) -> bool {
        let mut inner = self.inner.lock();
        let Some(entries) = inner.listeners.get_mut(target) else {
            return false;
        };

        let before = entries.len();
        entries.retain(|(entry_id, _)| *entry_id != id);
        let removed = entries.len() != before;

        if entries.is_empty() {
            inner.listeners.remove(target);
        }
        if removed {
            trace!(event_target = %target, listener = %id, "Listener removed");
        }
        removed
    }

    /// Delivers `payload` to every listener registered against `target`.
    ///
    /// No-op after [`Emitter::stop`].
    pub fn emit(&self, target: &str, payload: &Value) {
        let callbacks: Vec<ListenerCallback> = {
            let inner = self.inner.lock();
            if inner.stopped {
                return;
            }
            inner
                .listeners
                .get(target)
                .map(|entries| entries.iter().map(|(_, cb)| Arc::clone(cb)).collect())
                .unwrap_or_default()
        };

        for callback in callbacks {
            callback(payload);
        }
    }

    /// Returns the number of listeners registered against `target`.
    #[must_use]
    pub fn listener_count(&self, target: &str) -> usize {
        self.inner
            .lock()
            .listeners
            .get(target)
            .map_or(0, Vec::len)
    }

    /// Stops delivery and drops all listeners.
    ///
    /// Called on client teardown; no callback fires after this returns.
    pub fn stop(&self) {
        let mut inner = self.inner.lock();
        inner.stopped = true;
        inner.listeners.clear();
    }

    /// Returns `true` if the emitter has been stopped.
    #[inline]
    #[must_use]
    pub fn is_stopped(&self) -> bool {
        self.inner.lock().stopped
    }
}

impl Default for Emitter {
    fn default() -> Self {
        Self::new()
    }
}

// ============================================================================
// Tests
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    use std::sync::atomic::{AtomicUsize, Ordering};

    use serde_json::json;

    fn counting_callback() -> (ListenerCallback, Arc<AtomicUsize>) {
        let count = Arc::new(AtomicUsize::new(0));
        let count_clone = Arc::clone(&count);
        let callback: ListenerCallback = Arc::new(move |_| {
            count_clone.fetch_add(1, Ordering::SeqCst);
        });
        (callback, count)
    }

    #[test]
    fn test_on_emit() {
        let emitter = Emitter::new();
        let (callback, count) = counting_callback();

        emitter.on("chat", callback);
        emitter.emit("chat", &json!({"text": "hi"}));

        assert_eq!(count.load(Ordering::SeqCst), 1);
    }

    #[test]
    fn test_emit_other_target_not_delivered() {
        let emitter = Emitter::new();
        let (callback, count) = counting_callback();

        emitter.on("chat", callback);
        emitter.emit("notifications", &json!({}));

        assert_eq!(count.load(Ordering::SeqCst), 0);
    }

    #[test]
    fn test_off_removes_exactly_one_listener() {
        let emitter = Emitter::new();
        let (first, first_count) = counting_callback();
        let (second, second_count) = counting_callback();

        let first_id = emitter.on("chat", first);
        emitter.on("chat", second);
        assert_eq!(emitter.listener_count("chat"), 2);

        assert!(emitter.off("chat", first_id));
        emitter.emit("chat", &json!({}));

        assert_eq!(first_count.load(Ordering::SeqCst), 0);
        assert_eq!(second_count.load(Ordering::SeqCst), 1);
        assert_eq!(emitter.listener_count("chat"), 1);
    }

    #[test]
    fn test_off_unknown_returns_false() {
        let emitter = Emitter::new();
        assert!(!emitter.off("chat", ListenerId::generate()));
    }

    #[test]
    fn test_fan_out() {
        let emitter = Emitter::new();
        let (first, first_count) = counting_callback();
        let (second, second_count) = counting_callback();

        emitter.on("chat", first);
        emitter.on("chat", second);
        emitter.emit("chat", &json!({}));

        assert_eq!(first_count.load(Ordering::SeqCst), 1);
        assert_eq!(second_count.load(Ordering::SeqCst), 1);
    }

    #[test]
    fn test_stop_halts_delivery() {
        let emitter = Emitter::new();
        let (callback, count) = counting_callback();

        emitter.on("chat", callback);
        emitter.stop();
        emitter.emit("chat", &json!({}));

        assert!(emitter.is_stopped());
        assert_eq!(count.load(Ordering::SeqCst), 0);
    }

    #[test]
    fn test_callback_may_remove_itself() {
        let emitter = Arc::new(Emitter::new());
        let slot: Arc<Mutex<Option<ListenerId>>> = Arc::new(Mutex::new(None));

        let emitter_clone = Arc::clone(&emitter);
        let slot_clone = Arc::clone(&slot);
        let id = emitter.on(
            "once",
            Arc::new(move |_| {
                if let Some(id) = slot_clone.lock().take() {
                    emitter_clone.off("once", id);
                }
            }),
        );
        *slot.lock() = Some(id);

        emitter.emit("once", &json!({}));
        assert_eq!(emitter.listener_count("once"), 0);
    }
}
