//! Error types for the translation core
//!
//! [`TranslateError`] covers invariant violations: the internal model has
//! already diverged from reality, continuing would compound the divergence,
//! so these propagate as unrecoverable errors and are never repaired in
//! place. Expected anomalies (stale releases, unconvertible characters, a
//! torn-down sink) are handled locally and do not appear here.

use thiserror::Error;

use keysync_keymap::{LogicalKeyId, PhysicalKeyId};

use crate::stage::LockStage;

/// Fatal inconsistency between the translator's records and the event
/// stream.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum TranslateError {
    /// A press was recorded for a physical key that already has a pressing
    /// record.
    #[error("physical key {0} is already pressed")]
    AlreadyPressed(PhysicalKeyId),

    /// A release was recorded for a physical key with no pressing record.
    #[error("physical key {0} is not pressed")]
    NotPressed(PhysicalKeyId),

    /// A release had to be synthesized for a logical key that has no
    /// mapping record; a pressed key must have been mapped by its press.
    #[error("no mapping record for pressed logical key {0}")]
    MissingMapping(LogicalKeyId),

    /// A lock key's pressing record names a different logical key than the
    /// lock family it belongs to.
    #[error("pressing record for {physical} holds {found}, expected {expected}")]
    InconsistentRecord {
        physical: PhysicalKeyId,
        found: LogicalKeyId,
        expected: LogicalKeyId,
    },

    /// Lock-stage synthesis would exceed the safety cap on intermediate
    /// steps.
    #[error("lock stage synthesis from {from:?} toward {to:?} exceeds {cap} steps")]
    StageOverflow {
        from: LockStage,
        to: LockStage,
        cap: usize,
    },

    /// CapsLock polarity inference did not settle on the key's first press.
    #[error("caps lock polarity undecided after first press")]
    UndecidedInference,
}

/// Delivery failure reported by an event sink.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum SinkError {
    /// The sink is shutting down and no longer accepts events.
    #[error("event sink is shutting down")]
    Closed,

    /// The sink accepted the event but the runtime failed to process it.
    #[error("event delivery failed: {0}")]
    Delivery(String),
}
