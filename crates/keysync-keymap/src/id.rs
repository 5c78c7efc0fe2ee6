//! Key identifier newtypes and id planes

use std::fmt;

use serde::{Deserialize, Serialize};

/// Mask selecting the value portion of a key id; the bits above it carry the
/// plane tag.
pub const VALUE_MASK: u64 = 0x0000_ffff_ffff;

/// Canonical plane for logical keys that produce a character. The value is
/// the Unicode scalar of the (lower-cased) character.
pub const UNICODE_PLANE: u64 = 0x0000_0000_0000;

/// Canonical plane for named non-character keys (modifiers, locks,
/// navigation, function keys).
pub const FUNCTIONAL_PLANE: u64 = 0x0001_0000_0000;

/// Auto-generated plane for native codes with no canonical mapping. Ids in
/// this plane are synthesized from the raw keycode or keyval and are only
/// meaningful within one platform.
pub const PLATFORM_PLANE: u64 = 0x0110_0000_0000;

/// Combine a raw value with a plane tag.
pub const fn apply_plane(value: u64, plane: u64) -> u64 {
    (value & VALUE_MASK) | plane
}

macro_rules! key_id {
    ($name:ident, $doc:literal) => {
        #[doc = $doc]
        ///
        /// Id 0 is reserved and means "no key"; use [`Self::NONE`] and
        /// [`Self::is_some`] rather than comparing raw values.
        #[derive(
            Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize,
        )]
        #[serde(transparent)]
        pub struct $name(pub u64);

        impl $name {
            /// The reserved "no key" id.
            pub const NONE: Self = Self(0);

            /// Synthesize an id in the platform-specific plane from a raw
            /// native code.
            pub const fn from_platform(raw: u64) -> Self {
                Self(apply_plane(raw, PLATFORM_PLANE))
            }

            /// Whether this id names an actual key.
            pub const fn is_some(self) -> bool {
                self.0 != 0
            }

            /// Whether this id is the reserved "no key" value.
            pub const fn is_none(self) -> bool {
                self.0 == 0
            }
        }

        impl fmt::Display for $name {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                write!(f, "{:#x}", self.0)
            }
        }
    };
}

key_id!(
    PhysicalKeyId,
    "Platform-independent identifier for a key position on the keyboard."
);
key_id!(
    LogicalKeyId,
    "Platform-independent identifier for the symbol or function a key currently produces."
);

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn zero_is_reserved() {
        assert!(PhysicalKeyId::NONE.is_none());
        assert!(!LogicalKeyId::NONE.is_some());
        assert!(PhysicalKeyId(1).is_some());
    }

    #[test]
    fn platform_plane_ids_keep_the_raw_value() {
        let id = PhysicalKeyId::from_platform(0x2a);
        assert_eq!(id.0 & VALUE_MASK, 0x2a);
        assert_eq!(id.0 & !VALUE_MASK, PLATFORM_PLANE);
    }

    #[test]
    fn apply_plane_truncates_oversized_values() {
        // A raw value wider than the value mask must not corrupt the plane
        // tag.
        let id = apply_plane(0xdead_beef_cafe, PLATFORM_PLANE);
        assert_eq!(id & !VALUE_MASK, PLATFORM_PLANE);
    }

    #[test]
    fn display_is_hex() {
        assert_eq!(LogicalKeyId(0x61).to_string(), "0x61");
    }
}
