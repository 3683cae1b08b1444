//! Signals channel message types.
//!
//! This module defines the message format exchanged between the client
//! (this crate) and the shared transport to the upstream signals service.
//!
//! # Protocol Overview
//!
//! | Message Type | Direction | Purpose |
//! |--------------|-----------|---------|
//! | [`Outbound`] | Client → Service | Session control and domain sends |
//! | [`Inbound`] | Service → Client | Lifecycle events, domain events, pong |
//!
//! All messages are JSON objects discriminated by a `type` field, e.g.
//! `{"type": "connection:init", "token": "..."}`.

// ============================================================================
// Submodules
// ============================================================================

/// Outbound and inbound message definitions.
pub mod message;

// ============================================================================
// Re-exports
// ============================================================================

pub use message::{Inbound, Outbound};
