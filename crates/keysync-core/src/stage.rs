//! The 4-stage lock key cycle
//!
//! A lock key moves through a fixed cycle as it is pressed and released:
//!
//! ```text
//!   stage        [0]                [1]               [2]               [3]
//!   pressed:   Released           Pressed           Released          Pressed
//!   enabled:   Disabled           Enabled           Enabled           Disabled
//!                    \--- down ---/    \--- up ----/    \--- down ---/    \-- up --> [0]
//! ```
//!
//! Reconciling the stage implied by an incoming event against the stage
//! implied by the translator's records tells the lock synchronizer how many
//! intermediate events to synthesize. All stage arithmetic lives here as
//! pure functions so the cycle logic is testable without any table state.

use serde::{Deserialize, Serialize};

/// One position in a lock key's press/enabled cycle.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum LockStage {
    ReleasedDisabled,
    PressedEnabled,
    ReleasedEnabled,
    PressedDisabled,
}

impl LockStage {
    /// Number of stages in the cycle.
    pub const COUNT: usize = 4;

    /// The stage implied by the translator's records before an event.
    pub fn from_record(is_pressed: bool, is_enabled: bool) -> Self {
        match (is_pressed, is_enabled) {
            (false, false) => LockStage::ReleasedDisabled,
            (true, true) => LockStage::PressedEnabled,
            (false, true) => LockStage::ReleasedEnabled,
            (true, false) => LockStage::PressedDisabled,
        }
    }

    /// The stage implied by an event of the lock key itself.
    ///
    /// The platform reports the key's enabled bit as 0-1-1-1 across the
    /// four stages (1-1-0-1 under reversed polarity), so a clear bit or a
    /// press pins the stage while a bare release is ambiguous and leaves
    /// the recorded stage as-is.
    pub fn from_own_event(
        by_record: Self,
        is_press: bool,
        state_on: bool,
        reversed: bool,
    ) -> Self {
        if !state_on {
            return if reversed {
                LockStage::ReleasedEnabled
            } else {
                LockStage::ReleasedDisabled
            };
        }
        if is_press {
            return if reversed {
                LockStage::ReleasedDisabled
            } else {
                LockStage::ReleasedEnabled
            };
        }
        by_record
    }

    /// The stage implied for a lock key by an event of some *other* key,
    /// where only the bitmask bit is informative.
    ///
    /// A set bit on a key recorded as fully idle advances it a single
    /// minimal step; anything else keeps the recorded stage.
    pub fn from_others_event(by_record: Self, state_on: bool) -> Self {
        if !state_on {
            return LockStage::ReleasedDisabled;
        }
        if by_record == LockStage::ReleasedDisabled {
            return LockStage::PressedEnabled;
        }
        by_record
    }

    /// The following stage in the cycle.
    pub fn next(self) -> Self {
        match self {
            LockStage::ReleasedDisabled => LockStage::PressedEnabled,
            LockStage::PressedEnabled => LockStage::ReleasedEnabled,
            LockStage::ReleasedEnabled => LockStage::PressedDisabled,
            LockStage::PressedDisabled => LockStage::ReleasedDisabled,
        }
    }

    /// Whether the step out of this stage is a press (released stages exit
    /// via a down event, pressed stages via an up event).
    pub fn exits_with_press(self) -> bool {
        matches!(self, LockStage::ReleasedDisabled | LockStage::ReleasedEnabled)
    }

    /// Number of forward steps from `from` to `to`, moving only forward
    /// around the cycle (never backward), zero when equal.
    pub fn forward_distance(from: Self, to: Self) -> usize {
        (to.index() + Self::COUNT - from.index()) % Self::COUNT
    }

    fn index(self) -> usize {
        match self {
            LockStage::ReleasedDisabled => 0,
            LockStage::PressedEnabled => 1,
            LockStage::ReleasedEnabled => 2,
            LockStage::PressedDisabled => 3,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::LockStage::*;
    use super::*;

    #[test]
    fn record_stages_cover_the_cross_product() {
        assert_eq!(LockStage::from_record(false, false), ReleasedDisabled);
        assert_eq!(LockStage::from_record(true, true), PressedEnabled);
        assert_eq!(LockStage::from_record(false, true), ReleasedEnabled);
        assert_eq!(LockStage::from_record(true, false), PressedDisabled);
    }

    #[test]
    fn the_cycle_alternates_press_and_release() {
        assert_eq!(ReleasedDisabled.next(), PressedEnabled);
        assert_eq!(PressedEnabled.next(), ReleasedEnabled);
        assert_eq!(ReleasedEnabled.next(), PressedDisabled);
        assert_eq!(PressedDisabled.next(), ReleasedDisabled);

        assert!(ReleasedDisabled.exits_with_press());
        assert!(!PressedEnabled.exits_with_press());
        assert!(ReleasedEnabled.exits_with_press());
        assert!(!PressedDisabled.exits_with_press());
    }

    #[test]
    fn own_event_with_bit_clear_pins_the_released_stage() {
        assert_eq!(
            LockStage::from_own_event(PressedEnabled, true, false, false),
            ReleasedDisabled
        );
        assert_eq!(
            LockStage::from_own_event(PressedEnabled, true, false, true),
            ReleasedEnabled
        );
    }

    #[test]
    fn own_press_with_bit_set_pins_released_enabled() {
        assert_eq!(
            LockStage::from_own_event(ReleasedDisabled, true, true, false),
            ReleasedEnabled
        );
        assert_eq!(
            LockStage::from_own_event(ReleasedDisabled, true, true, true),
            ReleasedDisabled
        );
    }

    #[test]
    fn own_release_is_ambiguous_and_keeps_the_record() {
        assert_eq!(
            LockStage::from_own_event(PressedEnabled, false, true, false),
            PressedEnabled
        );
        assert_eq!(
            LockStage::from_own_event(PressedDisabled, false, true, false),
            PressedDisabled
        );
    }

    #[test]
    fn others_event_applies_the_minimal_correction() {
        assert_eq!(
            LockStage::from_others_event(PressedEnabled, false),
            ReleasedDisabled
        );
        assert_eq!(
            LockStage::from_others_event(ReleasedDisabled, true),
            PressedEnabled
        );
        // Already consistent with the set bit: no correction.
        assert_eq!(
            LockStage::from_others_event(ReleasedEnabled, true),
            ReleasedEnabled
        );
    }

    #[test]
    fn forward_distance_never_goes_backward() {
        assert_eq!(LockStage::forward_distance(ReleasedDisabled, ReleasedDisabled), 0);
        assert_eq!(LockStage::forward_distance(ReleasedDisabled, PressedDisabled), 3);
        // "Backward" targets wrap forward around the cycle.
        assert_eq!(LockStage::forward_distance(PressedDisabled, ReleasedEnabled), 3);
        assert_eq!(LockStage::forward_distance(PressedEnabled, ReleasedDisabled), 3);
    }
}
