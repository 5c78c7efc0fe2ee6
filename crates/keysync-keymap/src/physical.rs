//! Canonical physical key ids and the native keycode table
//!
//! Physical ids live in the functional plane and reuse the USB HID usage of
//! the key's customary position, so `CONTROL_LEFT` is `0x1_0000_00e0`
//! regardless of what the key is remapped to produce.
//!
//! The keycode table covers X11-style keycodes (evdev scancode + 8) as
//! delivered by GTK-style shells. Codes missing from the table are resolved
//! by the core into the platform plane instead; absence here is not an
//! error.

use crate::id::{apply_plane, PhysicalKeyId, FUNCTIONAL_PLANE};

macro_rules! physical_keys {
    ($($name:ident = $usage:literal;)*) => {
        $(pub const $name: PhysicalKeyId =
            PhysicalKeyId(apply_plane($usage, FUNCTIONAL_PLANE));)*
    };
}

physical_keys! {
    KEY_A = 0x04; KEY_B = 0x05; KEY_C = 0x06; KEY_D = 0x07;
    KEY_E = 0x08; KEY_F = 0x09; KEY_G = 0x0a; KEY_H = 0x0b;
    KEY_I = 0x0c; KEY_J = 0x0d; KEY_K = 0x0e; KEY_L = 0x0f;
    KEY_M = 0x10; KEY_N = 0x11; KEY_O = 0x12; KEY_P = 0x13;
    KEY_Q = 0x14; KEY_R = 0x15; KEY_S = 0x16; KEY_T = 0x17;
    KEY_U = 0x18; KEY_V = 0x19; KEY_W = 0x1a; KEY_X = 0x1b;
    KEY_Y = 0x1c; KEY_Z = 0x1d;
    DIGIT_1 = 0x1e; DIGIT_2 = 0x1f; DIGIT_3 = 0x20; DIGIT_4 = 0x21;
    DIGIT_5 = 0x22; DIGIT_6 = 0x23; DIGIT_7 = 0x24; DIGIT_8 = 0x25;
    DIGIT_9 = 0x26; DIGIT_0 = 0x27;
    ENTER = 0x28; ESCAPE = 0x29; BACKSPACE = 0x2a; TAB = 0x2b;
    SPACE = 0x2c; MINUS = 0x2d; EQUAL = 0x2e;
    BRACKET_LEFT = 0x2f; BRACKET_RIGHT = 0x30; BACKSLASH = 0x31;
    SEMICOLON = 0x33; QUOTE = 0x34; BACKQUOTE = 0x35;
    COMMA = 0x36; PERIOD = 0x37; SLASH = 0x38;
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

/// Look up the canonical physical id for an X11-style keycode.
pub fn physical_key_for_keycode(keycode: u32) -> Option<PhysicalKeyId> {
    let id = match keycode {
        9 => ESCAPE,
        10 => DIGIT_1,
        11 => DIGIT_2,
        12 => DIGIT_3,
        13 => DIGIT_4,
        14 => DIGIT_5,
        15 => DIGIT_6,
        16 => DIGIT_7,
        17 => DIGIT_8,
        18 => DIGIT_9,
        19 => DIGIT_0,
        20 => MINUS,
        21 => EQUAL,
        22 => BACKSPACE,
        23 => TAB,
        24 => KEY_Q,
        25 => KEY_W,
        26 => KEY_E,
        27 => KEY_R,
        28 => KEY_T,
        29 => KEY_Y,
        30 => KEY_U,
        31 => KEY_I,
        32 => KEY_O,
        33 => KEY_P,
        34 => BRACKET_LEFT,
        35 => BRACKET_RIGHT,
        36 => ENTER,
        37 => CONTROL_LEFT,
        38 => KEY_A,
        39 => KEY_S,
        40 => KEY_D,
        41 => KEY_F,
        42 => KEY_G,
        43 => KEY_H,
        44 => KEY_J,
        45 => KEY_K,
        46 => KEY_L,
        47 => SEMICOLON,
        48 => QUOTE,
        49 => BACKQUOTE,
        50 => SHIFT_LEFT,
        51 => BACKSLASH,
        52 => KEY_Z,
        53 => KEY_X,
        54 => KEY_C,
        55 => KEY_V,
        56 => KEY_B,
        57 => KEY_N,
        58 => KEY_M,
        59 => COMMA,
        60 => PERIOD,
        61 => SLASH,
        62 => SHIFT_RIGHT,
        64 => ALT_LEFT,
        65 => SPACE,
        66 => CAPS_LOCK,
        67 => F1,
        68 => F2,
        69 => F3,
        70 => F4,
        71 => F5,
        72 => F6,
        73 => F7,
        74 => F8,
        75 => F9,
        76 => F10,
        77 => NUM_LOCK,
        78 => SCROLL_LOCK,
        95 => F11,
        96 => F12,
        105 => CONTROL_RIGHT,
        107 => PRINT_SCREEN,
        108 => ALT_RIGHT,
        110 => HOME,
        111 => ARROW_UP,
        112 => PAGE_UP,
        113 => ARROW_LEFT,
        114 => ARROW_RIGHT,
        115 => END,
        116 => ARROW_DOWN,
        117 => PAGE_DOWN,
        118 => INSERT,
        119 => DELETE,
        127 => PAUSE,
        133 => META_LEFT,
        134 => META_RIGHT,
        _ => return None,
    };
    Some(id)
}
