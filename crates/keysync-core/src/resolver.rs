//! Key identity resolution
//!
//! Derives the canonical physical and logical ids for a raw event from the
//! static tables, with a synthetic-id fallback for unmapped codes.
//! Resolution never fails: an unmapped keycode or keyval resolves to an id
//! in the platform plane so the rest of the pipeline can treat every key
//! uniformly.

use keysync_keymap::{
    keyval_to_unicode, logical_key_for_keyval, physical_key_for_keycode, LogicalKeyId,
    PhysicalKeyId, UNICODE_PLANE,
};

use crate::event::RawKeyEvent;

/// Resolve the physical key id for a raw event.
pub fn physical_key(event: &RawKeyEvent) -> PhysicalKeyId {
    physical_key_for_keycode(event.keycode)
        .unwrap_or_else(|| PhysicalKeyId::from_platform(u64::from(event.keycode)))
}

/// Resolve the logical key id for a raw event.
///
/// Keyvals in the 8-bit legacy character range resolve into the Unicode
/// plane, lower-cased so that shifted and unshifted presses of one key
/// agree on a logical id.
pub fn logical_key(event: &RawKeyEvent) -> LogicalKeyId {
    if let Some(logical) = logical_key_for_keyval(event.keyval) {
        return logical;
    }
    if event.keyval < 256 {
        return LogicalKeyId(UNICODE_PLANE | u64::from(to_lower(event.keyval)));
    }
    LogicalKeyId::from_platform(u64::from(event.keyval))
}

/// Derive the character a press event types, if any.
///
/// Release events never carry a character, and keyvals with no Unicode
/// equivalent (modifiers, function keys) yield `None`.
pub fn character(event: &RawKeyEvent) -> Option<String> {
    if !event.is_press {
        return None;
    }
    keyval_to_unicode(event.keyval).map(String::from)
}

/// Lower-case a keyval in the 8-bit legacy character range.
///
/// Handles ASCII `A`..`Z` and the Latin-1 supplement `À`..`Þ`, excluding
/// the division sign which sits inside that range without being a letter.
fn to_lower(keyval: u32) -> u32 {
    const LOWER_A: u32 = 0x61;
    const UPPER_A: u32 = 0x41;
    const UPPER_Z: u32 = 0x5a;

    const LOWER_A_GRAVE: u32 = 0xe0;
    const UPPER_A_GRAVE: u32 = 0xc0;
    const UPPER_THORN: u32 = 0xde;
    const DIVISION: u32 = 0xf7;

    if (UPPER_A..=UPPER_Z).contains(&keyval) {
        return keyval - UPPER_A + LOWER_A;
    }
    if (UPPER_A_GRAVE..=UPPER_THORN).contains(&keyval) && keyval != DIVISION {
        return keyval - UPPER_A_GRAVE + LOWER_A_GRAVE;
    }
    keyval
}

#[cfg(test)]
mod tests {
    use keysync_keymap::{logical, physical, PLATFORM_PLANE};

    use super::*;

    fn raw(keycode: u32, keyval: u32, is_press: bool) -> RawKeyEvent {
        RawKeyEvent {
            keycode,
            keyval,
            state: 0,
            time_ms: 0,
            is_press,
            specified_logical: None,
        }
    }

    #[test]
    fn mapped_keycode_resolves_from_the_table() {
        assert_eq!(physical_key(&raw(38, 0x61, true)), physical::KEY_A);
        assert_eq!(physical_key(&raw(37, 0xffe3, true)), physical::CONTROL_LEFT);
    }

    #[test]
    fn unmapped_keycode_resolves_into_the_platform_plane() {
        let id = physical_key(&raw(255, 0, true));
        assert_eq!(id.0, PLATFORM_PLANE | 255);
    }

    #[test]
    fn character_keyvals_resolve_lower_cased_into_the_unicode_plane() {
        // Shifted 'A' and plain 'a' agree on the logical id.
        assert_eq!(logical_key(&raw(38, 0x41, true)), LogicalKeyId(0x61));
        assert_eq!(logical_key(&raw(38, 0x61, true)), LogicalKeyId(0x61));
        // Latin-1: À lowers to à, the division sign stays itself.
        assert_eq!(logical_key(&raw(0, 0xc0, true)), LogicalKeyId(0xe0));
        assert_eq!(logical_key(&raw(0, 0xf7, true)), LogicalKeyId(0xf7));
    }

    #[test]
    fn named_keyvals_resolve_from_the_table() {
        assert_eq!(logical_key(&raw(37, 0xffe3, true)), logical::CONTROL_LEFT);
        assert_eq!(logical_key(&raw(66, 0xffe5, true)), logical::CAPS_LOCK);
    }

    #[test]
    fn unmapped_keyval_resolves_into_the_platform_plane() {
        let id = logical_key(&raw(0, 0xfe03, true));
        assert_eq!(id.0, PLATFORM_PLANE | 0xfe03);
    }

    #[test]
    fn character_is_derived_for_presses_only() {
        assert_eq!(character(&raw(38, 0x61, true)).as_deref(), Some("a"));
        assert_eq!(character(&raw(38, 0x61, false)), None);
        // Modifiers type nothing.
        assert_eq!(character(&raw(37, 0xffe3, true)), None);
    }
}
