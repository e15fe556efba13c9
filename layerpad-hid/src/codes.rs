//! HID usage tables
//!
//! Keyboard page (0x07) and consumer page (0x0C) usages, looked up by the
//! upper-case identifiers the keypad configuration uses (`A`, `ENTER`,
//! `LEFT_ARROW`, `VOLUME_INCREMENT`, ...). Lookups are exact and
//! case-sensitive: `"a"` is not a key name, it is text.

/// HID modifier bitmask constants (first byte of a boot keyboard report).
pub mod mods {
    pub const LCTRL: u8 = 0x01;
    pub const LSHIFT: u8 = 0x02;
    pub const LALT: u8 = 0x04;
    pub const LGUI: u8 = 0x08;
    pub const RCTRL: u8 = 0x10;
    pub const RSHIFT: u8 = 0x20;
    pub const RALT: u8 = 0x40;
    pub const RGUI: u8 = 0x80;
}

/// Keyboard usages referenced directly by the engine.
pub mod usage {
    pub const ENTER: u8 = 0x28;
    pub const LEFT_CONTROL: u8 = 0xE0;
    pub const LEFT_SHIFT: u8 = 0xE1;
    pub const LEFT_ALT: u8 = 0xE2;
    pub const LEFT_GUI: u8 = 0xE3;
}

const LETTERS: [&str; 26] = [
    "A", "B", "C", "D", "E", "F", "G", "H", "I", "J", "K", "L", "M", "N", "O", "P", "Q", "R", "S",
    "T", "U", "V", "W", "X", "Y", "Z",
];

const FUNCTION_KEYS: [&str; 24] = [
    "F1", "F2", "F3", "F4", "F5", "F6", "F7", "F8", "F9", "F10", "F11", "F12", "F13", "F14", "F15",
    "F16", "F17", "F18", "F19", "F20", "F21", "F22", "F23", "F24",
];

/// Canonical names for everything that is not a letter or F-key.
const NAMED_KEYS: &[(&str, u8)] = &[
    ("ONE", 0x1E),
    ("TWO", 0x1F),
    ("THREE", 0x20),
    ("FOUR", 0x21),
    ("FIVE", 0x22),
    ("SIX", 0x23),
    ("SEVEN", 0x24),
    ("EIGHT", 0x25),
    ("NINE", 0x26),
    ("ZERO", 0x27),
    ("ENTER", 0x28),
    ("ESCAPE", 0x29),
    ("BACKSPACE", 0x2A),
    ("TAB", 0x2B),
    ("SPACEBAR", 0x2C),
    ("MINUS", 0x2D),
    ("EQUALS", 0x2E),
    ("LEFT_BRACKET", 0x2F),
    ("RIGHT_BRACKET", 0x30),
    ("BACKSLASH", 0x31),
    ("POUND", 0x32),
    ("SEMICOLON", 0x33),
    ("QUOTE", 0x34),
    ("GRAVE_ACCENT", 0x35),
    ("COMMA", 0x36),
    ("PERIOD", 0x37),
    ("FORWARD_SLASH", 0x38),
    ("CAPS_LOCK", 0x39),
    ("PRINT_SCREEN", 0x46),
    ("SCROLL_LOCK", 0x47),
    ("PAUSE", 0x48),
    ("INSERT", 0x49),
    ("HOME", 0x4A),
    ("PAGE_UP", 0x4B),
    ("DELETE", 0x4C),
    ("END", 0x4D),
    ("PAGE_DOWN", 0x4E),
    ("RIGHT_ARROW", 0x4F),
    ("LEFT_ARROW", 0x50),
    ("DOWN_ARROW", 0x51),
    ("UP_ARROW", 0x52),
    ("KEYPAD_NUMLOCK", 0x53),
    ("KEYPAD_FORWARD_SLASH", 0x54),
    ("KEYPAD_ASTERISK", 0x55),
    ("KEYPAD_MINUS", 0x56),
    ("KEYPAD_PLUS", 0x57),
    ("KEYPAD_ENTER", 0x58),
    ("KEYPAD_ONE", 0x59),
    ("KEYPAD_TWO", 0x5A),
    ("KEYPAD_THREE", 0x5B),
    ("KEYPAD_FOUR", 0x5C),
    ("KEYPAD_FIVE", 0x5D),
    ("KEYPAD_SIX", 0x5E),
    ("KEYPAD_SEVEN", 0x5F),
    ("KEYPAD_EIGHT", 0x60),
    ("KEYPAD_NINE", 0x61),
    ("KEYPAD_ZERO", 0x62),
    ("KEYPAD_PERIOD", 0x63),
    ("KEYPAD_BACKSLASH", 0x64),
    ("APPLICATION", 0x65),
    ("POWER", 0x66),
    ("KEYPAD_EQUALS", 0x67),
    ("LEFT_CONTROL", 0xE0),
    ("LEFT_SHIFT", 0xE1),
    ("LEFT_ALT", 0xE2),
    ("LEFT_GUI", 0xE3),
    ("RIGHT_CONTROL", 0xE4),
    ("RIGHT_SHIFT", 0xE5),
    ("RIGHT_ALT", 0xE6),
    ("RIGHT_GUI", 0xE7),
];

/// Alternate spellings accepted on input, never produced on output.
const KEY_ALIASES: &[(&str, u8)] = &[
    ("RETURN", 0x28),
    ("SPACE", 0x2C),
    ("CONTROL", 0xE0),
    ("SHIFT", 0xE1),
    ("ALT", 0xE2),
    ("OPTION", 0xE2),
    ("GUI", 0xE3),
    ("WINDOWS", 0xE3),
    ("COMMAND", 0xE3),
    ("RIGHT_OPTION", 0xE6),
];

/// Consumer page usages reachable by name.
const CONSUMER_CODES: &[(&str, u16)] = &[
    ("BRIGHTNESS_INCREMENT", 0x006F),
    ("BRIGHTNESS_DECREMENT", 0x0070),
    ("RECORD", 0x00B2),
    ("FAST_FORWARD", 0x00B3),
    ("REWIND", 0x00B4),
    ("SCAN_NEXT_TRACK", 0x00B5),
    ("SCAN_PREVIOUS_TRACK", 0x00B6),
    ("STOP", 0x00B7),
    ("EJECT", 0x00B8),
    ("PLAY_PAUSE", 0x00CD),
    ("MUTE", 0x00E2),
    ("VOLUME_INCREMENT", 0x00E9),
    ("VOLUME_DECREMENT", 0x00EA),
];

/// Look up a keyboard usage by its configuration name
pub fn keycode_from_name(name: &str) -> Option<u8> {
    if let Some(pos) = LETTERS.iter().position(|&l| l == name) {
        return Some(0x04 + pos as u8);
    }
    if let Some(pos) = FUNCTION_KEYS.iter().position(|&f| f == name) {
        // F1-F12 and F13-F24 live in two separate runs of the usage table
        return Some(if pos < 12 {
            0x3A + pos as u8
        } else {
            0x68 + (pos - 12) as u8
        });
    }
    NAMED_KEYS
        .iter()
        .chain(KEY_ALIASES)
        .find(|(n, _)| *n == name)
        .map(|&(_, code)| code)
}

/// Get the canonical name of a keyboard usage
pub fn key_name(code: u8) -> &'static str {
    match code {
        0x04..=0x1D => LETTERS[(code - 0x04) as usize],
        0x3A..=0x45 => FUNCTION_KEYS[(code - 0x3A) as usize],
        0x68..=0x73 => FUNCTION_KEYS[(code - 0x68) as usize + 12],
        _ => NAMED_KEYS
            .iter()
            .find(|&&(_, c)| c == code)
            .map(|&(n, _)| n)
            .unwrap_or("?"),
    }
}

/// Look up a consumer-control usage by its configuration name
pub fn consumer_code_from_name(name: &str) -> Option<u16> {
    CONSUMER_CODES
        .iter()
        .find(|(n, _)| *n == name)
        .map(|&(_, code)| code)
}

/// Get the configuration name of a consumer-control usage
pub fn consumer_name(code: u16) -> Option<&'static str> {
    CONSUMER_CODES
        .iter()
        .find(|&&(_, c)| c == code)
        .map(|&(n, _)| n)
}

/// Check if a keyboard usage is a modifier key (0xE0-0xE7)
pub fn is_modifier(code: u8) -> bool {
    (0xE0..=0xE7).contains(&code)
}

/// Convert a modifier usage (0xE0-0xE7) to its report bitmask bit
pub fn modifier_bit(code: u8) -> Option<u8> {
    is_modifier(code).then(|| 1 << (code - 0xE0))
}

/// Punctuation keys on the US layout: (usage, unshifted, shifted)
const PUNCTUATION: [(u8, char, char); 11] = [
    (0x2D, '-', '_'),
    (0x2E, '=', '+'),
    (0x2F, '[', '{'),
    (0x30, ']', '}'),
    (0x31, '\\', '|'),
    (0x33, ';', ':'),
    (0x34, '\'', '"'),
    (0x35, '`', '~'),
    (0x36, ',', '<'),
    (0x37, '.', '>'),
    (0x38, '/', '?'),
];

/// Shifted digit row, `!` on 1 through `)` on 0
const DIGIT_SYMBOLS: &str = "!@#$%^&*()";

/// Convert a character to HID keycode on the US layout
/// Returns (keycode, needs_shift) or None if unsupported
pub fn char_to_hid(ch: char) -> Option<(u8, bool)> {
    match ch {
        'a'..='z' => Some((0x04 + (ch as u8 - b'a'), false)),
        'A'..='Z' => Some((0x04 + (ch as u8 - b'A'), true)),
        '1'..='9' => Some((0x1E + (ch as u8 - b'1'), false)),
        '0' => Some((0x27, false)),
        ' ' => Some((0x2C, false)),
        '\n' => Some((usage::ENTER, false)),
        '\t' => Some((0x2B, false)),
        _ => {
            if let Some(i) = DIGIT_SYMBOLS.find(ch) {
                return Some((0x1E + i as u8, true));
            }
            PUNCTUATION.iter().find_map(|&(code, plain, shifted)| {
                if ch == plain {
                    Some((code, false))
                } else if ch == shifted {
                    Some((code, true))
                } else {
                    None
                }
            })
        }
    }
}
