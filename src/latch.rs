//! Single-shot latch with a single-slot owner.
//!
//! A [`Latch`] is a one-time signal that is either resolved or rejected by
//! whoever holds the matching [`LatchSlot`]. The slot holds at most one
//! outstanding latch: arming a new one drops the previous sender, so a
//! stale latch observes [`LatchOutcome::Invalidated`] and can never affect
//! state that belongs to its successor.
//!
//! The session uses one slot for its liveness probe; `pong` resolves the
//! current latch, the probe deadline rejects it, and each visibility check
//! arms a fresh one.

// ============================================================================
// Imports
// ============================================================================

use tokio::sync::oneshot;

// ============================================================================
// LatchOutcome
// ============================================================================

/// How a latch completed.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LatchOutcome {
    /// Resolved by the slot owner (probe answered).
    Resolved,
    /// Rejected by the slot owner (probe deadline elapsed).
    Rejected,
    /// Superseded: a newer latch was armed before this one completed.
    Invalidated,
}

// ============================================================================
// Latch
// ============================================================================

/// Waiter half of a single-shot latch.
#[derive(Debug)]
pub struct Latch {
    rx: oneshot::Receiver<bool>,
}

impl Latch {
    /// Waits for the latch to complete.
    pub async fn wait(self) -> LatchOutcome {
        match self.rx.await {
            Ok(true) => LatchOutcome::Resolved,
            Ok(false) => LatchOutcome::Rejected,
            Err(_) => LatchOutcome::Invalidated,
        }
    }
}

// ============================================================================
// LatchSlot
// ============================================================================

/// Owner half: holds at most one outstanding latch.
#[derive(Debug, Default)]
pub struct LatchSlot {
    tx: Option<oneshot::Sender<bool>>,
}

impl LatchSlot {
    /// Creates an empty slot.
    #[inline]
    #[must_use]
    pub fn new() -> Self {
        Self { tx: None }
    }

    /// Arms a fresh latch, invalidating any previously armed one.
    #[must_use]
    pub fn arm(&mut self) -> Latch {
        let (tx, rx) = oneshot::channel();
        self.tx = Some(tx);
        Latch { rx }
    }

    /// Resolves the outstanding latch, if any.
    ///
    /// Returns `true` if a latch was armed.
    pub fn resolve(&mut self) -> bool {
        match self.tx.take() {
            Some(tx) => {
                let _ = tx.send(true);
                true
            }
            None => false,
        }
    }

    /// Rejects the outstanding latch, if any.
    ///
    /// Returns `true` if a latch was armed.
    pub fn reject(&mut self) -> bool {
        match self.tx.take() {
            Some(tx) => {
                let _ = tx.send(false);
                true
            }
            None => false,
        }
    }

    /// Drops the outstanding latch without resolving or rejecting it.
    pub fn disarm(&mut self) {
        self.tx = None;
    }

    /// Returns `true` if a latch is currently armed.
    #[inline]
    #[must_use]
    pub fn is_armed(&self) -> bool {
        self.tx.is_some()
    }
}

// ============================================================================
// Tests
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_resolve() {
        let mut slot = LatchSlot::new();
        let latch = slot.arm();
        assert!(slot.is_armed());

        assert!(slot.resolve());
        assert_eq!(latch.wait().await, LatchOutcome::Resolved);
        assert!(!slot.is_armed());
    }

    #[tokio::test]
    async fn test_reject() {
        let mut slot = LatchSlot::new();
        let latch = slot.arm();

        assert!(slot.reject());
        assert_eq!(latch.wait().await, LatchOutcome::Rejected);
    }

    #[tokio::test]
    async fn test_rearm_invalidates_previous() {
        let mut slot = LatchSlot::new();
        let stale = slot.arm();
        let fresh = slot.arm();

        // Resolving reaches only the fresh latch.
        assert!(slot.resolve());
        assert_eq!(stale.wait().await, LatchOutcome::Invalidated);
        assert_eq!(fresh.wait().await, LatchOutcome::Resolved);
    }

    #[tokio::test]
    async fn test_disarm() {
        let mut slot = LatchSlot::new();
        let latch = slot.arm();

        slot.disarm();
        assert!(!slot.is_armed());
        assert!(!slot.resolve());
        assert_eq!(latch.wait().await, LatchOutcome::Invalidated);
    }

    #[test]
    fn test_empty_slot_completions() {
        let mut slot = LatchSlot::new();
        assert!(!slot.is_armed());
        assert!(!slot.resolve());
        assert!(!slot.reject());
    }
}
