//! Tracked modifier and lock family descriptors
//!
//! The translation core only reconciles the modifier families listed here
//! against the event bitmask. Each family maps one state bit to the logical
//! keys that can assert it and to the physical key used when a press must be
//! synthesized with no better information.

use crate::id::{LogicalKeyId, PhysicalKeyId};
use crate::{logical, physical};

/// Bit assignments of the live modifier bitmask carried by raw events.
///
/// These follow the X11 modifier layout delivered by GTK-style shells:
/// `ALT` is mod1, `NUM_LOCK` is mod2, `SUPER` is mod4.
pub mod state_bits {
    pub const SHIFT: u32 = 1 << 0;
    pub const CAPS_LOCK: u32 = 1 << 1;
    pub const CONTROL: u32 = 1 << 2;
    pub const ALT: u32 = 1 << 3;
    pub const NUM_LOCK: u32 = 1 << 4;
    pub const SUPER: u32 = 1 << 6;
}

/// Descriptor for one tracked modifier or lock family.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CheckedKey {
    /// The family's bit in the event bitmask.
    pub mask: u32,
    /// Logical key synthesized presses default to.
    pub primary_logical: LogicalKeyId,
    /// The other logical key that can assert this bit (the right-hand
    /// variant); `None` for single-key families such as locks.
    pub secondary_logical: Option<LogicalKeyId>,
    /// Physical key used for a synthesized press when the mapping record has
    /// no better candidate.
    pub primary_physical: PhysicalKeyId,
    /// Marks the CapsLock family, which is subject to polarity inference.
    pub is_caps_lock: bool,
}

/// Modifier families reconciled on every event.
pub const TRACKED_MODIFIERS: &[CheckedKey] = &[
    CheckedKey {
        mask: state_bits::CONTROL,
        primary_logical: logical::CONTROL_LEFT,
        secondary_logical: Some(logical::CONTROL_RIGHT),
        primary_physical: physical::CONTROL_LEFT,
        is_caps_lock: false,
    },
    CheckedKey {
        mask: state_bits::SHIFT,
        primary_logical: logical::SHIFT_LEFT,
        secondary_logical: Some(logical::SHIFT_RIGHT),
        primary_physical: physical::SHIFT_LEFT,
        is_caps_lock: false,
    },
    CheckedKey {
        mask: state_bits::ALT,
        primary_logical: logical::ALT_LEFT,
        secondary_logical: Some(logical::ALT_RIGHT),
        primary_physical: physical::ALT_LEFT,
        is_caps_lock: false,
    },
    CheckedKey {
        mask: state_bits::SUPER,
        primary_logical: logical::META_LEFT,
        secondary_logical: Some(logical::META_RIGHT),
        primary_physical: physical::META_LEFT,
        is_caps_lock: false,
    },
];

/// Lock families reconciled on every event.
pub const TRACKED_LOCKS: &[CheckedKey] = &[
    CheckedKey {
        mask: state_bits::CAPS_LOCK,
        primary_logical: logical::CAPS_LOCK,
        secondary_logical: None,
        primary_physical: physical::CAPS_LOCK,
        is_caps_lock: true,
    },
    CheckedKey {
        mask: state_bits::NUM_LOCK,
        primary_logical: logical::NUM_LOCK,
        secondary_logical: None,
        primary_physical: physical::NUM_LOCK,
        is_caps_lock: false,
    },
];

/// The default tracked modifier families.
pub fn tracked_modifiers() -> Vec<CheckedKey> {
    TRACKED_MODIFIERS.to_vec()
}

/// The default tracked lock families.
pub fn tracked_locks() -> Vec<CheckedKey> {
    TRACKED_LOCKS.to_vec()
}
