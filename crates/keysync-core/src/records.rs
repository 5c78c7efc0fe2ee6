//! Pressing and mapping record tables
//!
//! [`PressingRecords`] is the translator's belief about which physical keys
//! are currently down and which logical key each produced. Its insert and
//! remove operations enforce the core self-consistency invariant: a press
//! may only land on a released key and a release only on a pressed one.
//! A violation means the synthesizers produced an event against stale
//! state, which is unrecoverable.
//!
//! [`MappingRecords`] is best-effort memory of which physical key last
//! produced each logical key. Entries are never removed; they are only
//! consulted when a press must be synthesized for a logical key with no
//! currently-pressed source.

use std::collections::HashMap;

use keysync_keymap::{LogicalKeyId, PhysicalKeyId};

use crate::error::TranslateError;

/// Physical key → logical key it most recently produced, present iff the
/// key is considered pressed.
#[derive(Debug, Default)]
pub(crate) struct PressingRecords {
    records: HashMap<PhysicalKeyId, LogicalKeyId>,
}

impl PressingRecords {
    pub(crate) fn new() -> Self {
        Self::default()
    }

    /// Record a press. The key must not already be down.
    pub(crate) fn press(
        &mut self,
        physical: PhysicalKeyId,
        logical: LogicalKeyId,
    ) -> Result<(), TranslateError> {
        if self.records.contains_key(&physical) {
            return Err(TranslateError::AlreadyPressed(physical));
        }
        self.records.insert(physical, logical);
        Ok(())
    }

    /// Record a release, returning the logical key the press had produced.
    /// The key must be down.
    pub(crate) fn release(
        &mut self,
        physical: PhysicalKeyId,
    ) -> Result<LogicalKeyId, TranslateError> {
        self.records
            .remove(&physical)
            .ok_or(TranslateError::NotPressed(physical))
    }

    /// The logical key a pressed physical key is producing, if pressed.
    pub(crate) fn logical_for(&self, physical: PhysicalKeyId) -> Option<LogicalKeyId> {
        self.records.get(&physical).copied()
    }

    /// Reverse lookup: a physical key currently producing this logical key.
    pub(crate) fn physical_for(&self, logical: LogicalKeyId) -> Option<PhysicalKeyId> {
        self.records
            .iter()
            .find(|(_, l)| **l == logical)
            .map(|(p, _)| *p)
    }

    /// Read-only view of the table.
    pub(crate) fn as_map(&self) -> &HashMap<PhysicalKeyId, LogicalKeyId> {
        &self.records
    }
}

/// Logical key → physical key last observed producing it. Last-writer-wins,
/// never pruned.
#[derive(Debug, Default)]
pub(crate) struct MappingRecords {
    records: HashMap<LogicalKeyId, PhysicalKeyId>,
}

impl MappingRecords {
    pub(crate) fn new() -> Self {
        Self::default()
    }

    pub(crate) fn record(&mut self, logical: LogicalKeyId, physical: PhysicalKeyId) {
        self.records.insert(logical, physical);
    }

    pub(crate) fn physical_for(&self, logical: LogicalKeyId) -> Option<PhysicalKeyId> {
        self.records.get(&logical).copied()
    }
}
