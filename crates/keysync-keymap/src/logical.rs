//! Canonical logical key ids, the native keyval table, and character
//! conversion
//!
//! Character-producing keys do not appear in the table: their logical id is
//! derived by the core in the Unicode plane from the (lower-cased) keyval.
//! The table only names functional keys. Like the keycode table, a miss here
//! falls back to the platform plane and is not an error.
//!
//! Named logical ids reuse the HID usage of the key's customary position,
//! mirroring the physical id scheme; the two id spaces stay distinct through
//! their newtypes.

use crate::id::{apply_plane, LogicalKeyId, FUNCTIONAL_PLANE};

macro_rules! logical_keys {
    ($($name:ident = $usage:literal;)*) => {
        $(pub const $name: LogicalKeyId =
            LogicalKeyId(apply_plane($usage, FUNCTIONAL_PLANE));)*
    };
}

logical_keys! {
    ENTER = 0x28; ESCAPE = 0x29; BACKSPACE = 0x2a; TAB = 0x2b;
    CAPS_LOCK = 0x39;
    F1 = 0x3a; F2 = 0x3b; F3 = 0x3c; F4 = 0x3d; F5 = 0x3e; F6 = 0x3f;
    F7 = 0x40; F8 = 0x41; F9 = 0x42; F10 = 0x43; F11 = 0x44; F12 = 0x45;
    PRINT_SCREEN = 0x46; SCROLL_LOCK = 0x47; PAUSE = 0x48;
    INSERT = 0x49; HOME = 0x4a; PAGE_UP = 0x4b; DELETE = 0x4c;
    END = 0x4d; PAGE_DOWN = 0x4e;
    ARROW_RIGHT = 0x4f; ARROW_LEFT = 0x50; ARROW_DOWN = 0x51; ARROW_UP = 0x52;
    NUM_LOCK = 0x53;
    CONTROL_LEFT = 0xe0; SHIFT_LEFT = 0xe1; ALT_LEFT = 0xe2; META_LEFT = 0xe3;
    CONTROL_RIGHT = 0xe4; SHIFT_RIGHT = 0xe5; ALT_RIGHT = 0xe6; META_RIGHT = 0xe7;
}

/// Look up the canonical logical id for a named (non-character) keyval.
pub fn logical_key_for_keyval(keyval: u32) -> Option<LogicalKeyId> {
    let id = match keyval {
        0xff08 => BACKSPACE,
        0xff09 => TAB,
        0xff0d => ENTER,
        0xff13 => PAUSE,
        0xff14 => SCROLL_LOCK,
        0xff1b => ESCAPE,
        0xff50 => HOME,
        0xff51 => ARROW_LEFT,
        0xff52 => ARROW_UP,
        0xff53 => ARROW_RIGHT,
        0xff54 => ARROW_DOWN,
        0xff55 => PAGE_UP,
        0xff56 => PAGE_DOWN,
        0xff57 => END,
        0xff61 => PRINT_SCREEN,
        0xff63 => INSERT,
        0xff7f => NUM_LOCK,
        0xffbe => F1,
        0xffbf => F2,
        0xffc0 => F3,
        0xffc1 => F4,
        0xffc2 => F5,
        0xffc3 => F6,
        0xffc4 => F7,
        0xffc5 => F8,
        0xffc6 => F9,
        0xffc7 => F10,
        0xffc8 => F11,
        0xffc9 => F12,
        0xffe1 => SHIFT_LEFT,
        0xffe2 => SHIFT_RIGHT,
        0xffe3 => CONTROL_LEFT,
        0xffe4 => CONTROL_RIGHT,
        0xffe5 => CAPS_LOCK,
        0xffe7 => META_LEFT,
        0xffe8 => META_RIGHT,
        0xffe9 => ALT_LEFT,
        0xffea => ALT_RIGHT,
        0xffeb => META_LEFT,
        0xffec => META_RIGHT,
        0xffff => DELETE,
        _ => return None,
    };
    Some(id)
}

/// Convert a native keyval to the Unicode character it types, if any.
///
/// Follows the X11 keysym conventions: Latin-1 keyvals map to themselves,
/// keyvals with the `0x0100_0000` tag carry a Unicode scalar directly, and a
/// handful of editing keysyms map to their control characters. Everything
/// else (modifiers, function keys, navigation) produces no character.
pub fn keyval_to_unicode(keyval: u32) -> Option<char> {
    match keyval {
        0x20..=0x7e | 0xa0..=0xff => char::from_u32(keyval),
        kv if kv & 0xff00_0000 == 0x0100_0000 => char::from_u32(kv & 0x00ff_ffff),
        0xff08 => Some('\u{8}'),
        0xff09 => Some('\t'),
        0xff0a => Some('\n'),
        0xff0d => Some('\r'),
        0xff1b => Some('\u{1b}'),
        0xffff => Some('\u{7f}'),
        _ => None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn named_keyvals_resolve() {
        assert_eq!(logical_key_for_keyval(0xffe3), Some(CONTROL_LEFT));
        assert_eq!(logical_key_for_keyval(0xffe5), Some(CAPS_LOCK));
        assert_eq!(logical_key_for_keyval(0xffc8), Some(F11));
    }

    #[test]
    fn super_and_meta_share_logical_ids() {
        // Super_L and Meta_L keysyms both name the meta family.
        assert_eq!(logical_key_for_keyval(0xffeb), Some(META_LEFT));
        assert_eq!(logical_key_for_keyval(0xffe7), Some(META_LEFT));
    }

    #[test]
    fn character_keyvals_are_not_in_the_table() {
        assert_eq!(logical_key_for_keyval(0x61), None);
        assert_eq!(logical_key_for_keyval(0x41), None);
    }

    #[test]
    fn latin1_keyvals_convert_to_themselves() {
        assert_eq!(keyval_to_unicode(0x61), Some('a'));
        assert_eq!(keyval_to_unicode(0xe9), Some('é'));
        assert_eq!(keyval_to_unicode(0x20), Some(' '));
    }

    #[test]
    fn tagged_unicode_keyvals_strip_the_tag() {
        // Cyrillic small a, delivered as a directly encoded scalar.
        assert_eq!(keyval_to_unicode(0x0100_0430), Some('а'));
    }

    #[test]
    fn editing_keysyms_map_to_control_characters() {
        assert_eq!(keyval_to_unicode(0xff0d), Some('\r'));
        assert_eq!(keyval_to_unicode(0xff09), Some('\t'));
    }

    #[test]
    fn modifiers_produce_no_character() {
        assert_eq!(keyval_to_unicode(0xffe3), None);
        assert_eq!(keyval_to_unicode(0xffbe), None);
    }
}
