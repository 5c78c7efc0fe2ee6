//! Raw and translated key event types

use serde::{Deserialize, Serialize};

use keysync_keymap::{LogicalKeyId, PhysicalKeyId};

/// Microseconds per millisecond; raw platform timestamps arrive in
/// milliseconds and are carried internally in microseconds.
pub(crate) const US_PER_MS: u64 = 1000;

/// A keyboard event as delivered by the native platform.
///
/// The `state` bitmask is the platform's live picture of modifier and lock
/// bits at the time of the event; it is the only signal the core has for
/// modifier keys, which produce no press/release events of their own on
/// some platforms. `specified_logical` lets a caller re-dispatch a raw
/// event under a different logical interpretation.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RawKeyEvent {
    /// Native keycode (key position).
    pub keycode: u32,
    /// Native keyval / virtual key (symbol produced).
    pub keyval: u32,
    /// Live modifier bitmask, platform bit assignments.
    pub state: u32,
    /// Monotonic platform timestamp in milliseconds.
    pub time_ms: u32,
    /// `true` for press, `false` for release.
    pub is_press: bool,
    /// Caller-forced logical key, bypassing keyval resolution.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub specified_logical: Option<LogicalKeyId>,
}

impl RawKeyEvent {
    /// The event timestamp in microseconds.
    pub fn timestamp_us(&self) -> u64 {
        u64::from(self.time_ms) * US_PER_MS
    }
}

/// The kind of a translated key event.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum KeyEventKind {
    Down,
    Up,
    Repeat,
}

/// A translated key event as consumed by the UI runtime.
///
/// At most one event per raw input is genuine (`synthesized == false`); any
/// others were generated by the core to correct believed-vs-actual state
/// drift before the genuine event lands.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct KeyEvent {
    pub kind: KeyEventKind,
    pub physical: PhysicalKeyId,
    pub logical: LogicalKeyId,
    /// Character payload, present on genuine press events that type
    /// something.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub character: Option<String>,
    /// Timestamp in microseconds.
    pub timestamp_us: u64,
    pub synthesized: bool,
}

impl KeyEvent {
    /// The reserved all-zero event, sent when a call would otherwise
    /// produce no output so the sink always receives at least one signal
    /// per raw input.
    pub fn empty() -> Self {
        Self {
            kind: KeyEventKind::Down,
            physical: PhysicalKeyId::NONE,
            logical: LogicalKeyId::NONE,
            character: None,
            timestamp_us: 0,
            synthesized: false,
        }
    }

    /// Whether this is the reserved empty event.
    pub fn is_empty(&self) -> bool {
        self.physical.is_none() && self.logical.is_none()
    }
}
