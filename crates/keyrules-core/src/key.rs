// Keyrules Code Types
// Name tables for key codes, consumer key codes and pointing buttons

use std::fmt;
use std::str::FromStr;

include!(concat!(env!("OUT_DIR"), "/code_types.rs"));

/// Vendor usage for the Apple top-case fn key, kept above the keyboard page.
pub const FN_KEY_CODE: u32 = 0x1_0003;

/// Highest pointing button number accepted by `button<N>` names
pub const MAX_POINTING_BUTTON: u32 = 32;

const KEY_CODE_NAMES: &[(&str, u32)] = &[
    ("a", 0x04),
    ("b", 0x05),
    ("c", 0x06),
    ("d", 0x07),
    ("e", 0x08),
    ("f", 0x09),
    ("g", 0x0a),
    ("h", 0x0b),
    ("i", 0x0c),
    ("j", 0x0d),
    ("k", 0x0e),
    ("l", 0x0f),
    ("m", 0x10),
    ("n", 0x11),
    ("o", 0x12),
    ("p", 0x13),
    ("q", 0x14),
    ("r", 0x15),
    ("s", 0x16),
    ("t", 0x17),
    ("u", 0x18),
    ("v", 0x19),
    ("w", 0x1a),
    ("x", 0x1b),
    ("y", 0x1c),
    ("z", 0x1d),
    ("1", 0x1e),
    ("2", 0x1f),
    ("3", 0x20),
    ("4", 0x21),
    ("5", 0x22),
    ("6", 0x23),
    ("7", 0x24),
    ("8", 0x25),
    ("9", 0x26),
    ("0", 0x27),
    ("return_or_enter", 0x28),
    ("escape", 0x29),
    ("delete_or_backspace", 0x2a),
    ("tab", 0x2b),
    ("spacebar", 0x2c),
    ("hyphen", 0x2d),
    ("equal_sign", 0x2e),
    ("open_bracket", 0x2f),
    ("close_bracket", 0x30),
    ("backslash", 0x31),
    ("non_us_pound", 0x32),
    ("semicolon", 0x33),
    ("quote", 0x34),
    ("grave_accent_and_tilde", 0x35),
    ("comma", 0x36),
    ("period", 0x37),
    ("slash", 0x38),
    ("caps_lock", 0x39),
    ("f1", 0x3a),
    ("f2", 0x3b),
    ("f3", 0x3c),
    ("f4", 0x3d),
    ("f5", 0x3e),
    ("f6", 0x3f),
    ("f7", 0x40),
    ("f8", 0x41),
    ("f9", 0x42),
    ("f10", 0x43),
    ("f11", 0x44),
    ("f12", 0x45),
    ("print_screen", 0x46),
    ("scroll_lock", 0x47),
    ("pause", 0x48),
    ("insert", 0x49),
    ("home", 0x4a),
    ("page_up", 0x4b),
    ("delete_forward", 0x4c),
    ("end", 0x4d),
    ("page_down", 0x4e),
    ("right_arrow", 0x4f),
    ("left_arrow", 0x50),
    ("down_arrow", 0x51),
    ("up_arrow", 0x52),
    ("keypad_num_lock", 0x53),
    ("keypad_slash", 0x54),
    ("keypad_asterisk", 0x55),
    ("keypad_hyphen", 0x56),
    ("keypad_plus", 0x57),
    ("keypad_enter", 0x58),
    ("keypad_1", 0x59),
    ("keypad_2", 0x5a),
    ("keypad_3", 0x5b),
    ("keypad_4", 0x5c),
    ("keypad_5", 0x5d),
    ("keypad_6", 0x5e),
    ("keypad_7", 0x5f),
    ("keypad_8", 0x60),
    ("keypad_9", 0x61),
    ("keypad_0", 0x62),
    ("keypad_period", 0x63),
    ("non_us_backslash", 0x64),
    ("application", 0x65),
    ("power", 0x66),
    ("keypad_equal_sign", 0x67),
    ("f13", 0x68),
    ("f14", 0x69),
    ("f15", 0x6a),
    ("f16", 0x6b),
    ("f17", 0x6c),
    ("f18", 0x6d),
    ("f19", 0x6e),
    ("f20", 0x6f),
    ("f21", 0x70),
    ("f22", 0x71),
    ("f23", 0x72),
    ("f24", 0x73),
    ("execute", 0x74),
    ("help", 0x75),
    ("menu", 0x76),
    ("select", 0x77),
    ("stop", 0x78),
    ("again", 0x79),
    ("undo", 0x7a),
    ("cut", 0x7b),
    ("copy", 0x7c),
    ("paste", 0x7d),
    ("find", 0x7e),
    ("mute", 0x7f),
    ("volume_increment", 0x80),
    ("volume_decrement", 0x81),
    ("international1", 0x87),
    ("international3", 0x89),
    ("lang1", 0x90),
    ("lang2", 0x91),
    ("left_control", 0xe0),
    ("left_shift", 0xe1),
    ("left_option", 0xe2),
    ("left_command", 0xe3),
    ("right_control", 0xe4),
    ("right_shift", 0xe5),
    ("right_option", 0xe6),
    ("right_command", 0xe7),
    ("fn", FN_KEY_CODE),
];

const CONSUMER_KEY_CODE_NAMES: &[(&str, u32)] = &[
    ("power", 0x30),
    ("menu", 0x40),
    ("display_brightness_increment", 0x6f),
    ("display_brightness_decrement", 0x70),
    ("fastforward", 0xb3),
    ("rewind", 0xb4),
    ("scan_next_track", 0xb5),
    ("scan_previous_track", 0xb6),
    ("eject", 0xb8),
    ("play_or_pause", 0xcd),
    ("mute", 0xe2),
    ("volume_increment", 0xe9),
    ("volume_decrement", 0xea),
    ("al_terminal_lock_or_screensaver", 0x19e),
];

fn name_of(table: &[(&'static str, u32)], code: u32) -> String {
    table
        .iter()
        .find(|(_, value)| *value == code)
        .map(|(name, _)| name.to_string())
        .unwrap_or_else(|| "unknown".to_string())
}

fn code_of(table: &[(&'static str, u32)], name: &str) -> Option<u32> {
    table
        .iter()
        .find(|(candidate, _)| *candidate == name)
        .map(|(_, value)| *value)
}

/// Display name for a key code
pub fn key_code_name(code: u32) -> String {
    name_of(KEY_CODE_NAMES, code)
}

/// Parse a key code name (`a`, `return_or_enter`, `left_shift`, ...)
///
/// Names are case-sensitive, matching how rule documents spell them.
pub fn key_code_from_name(name: &str) -> Option<KeyCode> {
    code_of(KEY_CODE_NAMES, name).map(KeyCode)
}

/// Display name for a consumer key code
pub fn consumer_key_code_name(code: u32) -> String {
    name_of(CONSUMER_KEY_CODE_NAMES, code)
}

/// Parse a consumer key code name (`mute`, `play_or_pause`, ...)
pub fn consumer_key_code_from_name(name: &str) -> Option<ConsumerKeyCode> {
    code_of(CONSUMER_KEY_CODE_NAMES, name).map(ConsumerKeyCode)
}

/// Display name for a pointing button
pub fn pointing_button_name(code: u32) -> String {
    if (1..=MAX_POINTING_BUTTON).contains(&code) {
        format!("button{}", code)
    } else {
        "unknown".to_string()
    }
}

/// Parse `button1` .. `button32`
pub fn pointing_button_from_name(name: &str) -> Option<PointingButton> {
    let number = name.strip_prefix("button")?;
    // Reject forms like "button01" or "button+1" that u32 parsing would accept
    if number.starts_with('0') || !number.chars().all(|c| c.is_ascii_digit()) {
        return None;
    }
    let value: u32 = number.parse().ok()?;
    (1..=MAX_POINTING_BUTTON)
        .contains(&value)
        .then_some(PointingButton(value))
}
