//! Keyboard scancodes and the scancode → key table
//!
//! Every real key has bit 7 set. The top four rows count up diagonally
//! from 0x80..0x83 in steps of 4; the bottom rows (including the piano
//! keys) start at 0xB8 and are less regular.
//!
//! The table follows the Spanish layout. Codes below [`KEY_BASE`] index
//! the shift alternates: a shifted key is looked up as `scancode - 0x80`.

/// Bit 7, set on every key scancode
pub const KEY_BASE: u8 = 0x80;

// Row 1
pub const KEY_F1: u8 = 0x80;
pub const KEY_F2: u8 = 0x84;
pub const KEY_F3: u8 = 0x88;
pub const KEY_F4: u8 = 0x8C;
pub const KEY_F5: u8 = 0x90;
pub const KEY_F6: u8 = 0x94;
pub const KEY_F7: u8 = 0x98;
pub const KEY_F8: u8 = 0x9C;
pub const KEY_F9: u8 = 0xA0;
pub const KEY_F10: u8 = 0xA4;
pub const KEY_F11: u8 = 0xA8;
pub const KEY_F12: u8 = 0xAC;

// Row 2
pub const KEY_ESCAPE: u8 = 0x81;
pub const KEY_1: u8 = 0x85;
pub const KEY_2: u8 = 0x89;
pub const KEY_3: u8 = 0x8D;
pub const KEY_4: u8 = 0x91;
pub const KEY_5: u8 = 0x95;
pub const KEY_6: u8 = 0x99;
pub const KEY_7: u8 = 0x9D;
pub const KEY_8: u8 = 0xA1;
pub const KEY_9: u8 = 0xA5;
pub const KEY_0: u8 = 0xA9;
pub const KEY_SINGLE_QUOTE: u8 = 0xAD;
pub const KEY_EXCLAMATION_FLIPPED: u8 = 0xB1;
pub const KEY_BACKSPACE: u8 = 0xB5;

// Row 3
pub const KEY_HELP: u8 = 0x82;
pub const KEY_Q: u8 = 0x86;
pub const KEY_W: u8 = 0x8A;
pub const KEY_E: u8 = 0x8E;
pub const KEY_R: u8 = 0x92;
pub const KEY_T: u8 = 0x96;
pub const KEY_Y: u8 = 0x9A;
pub const KEY_U: u8 = 0x9E;
pub const KEY_I: u8 = 0xA2;
pub const KEY_O: u8 = 0xA6;
pub const KEY_P: u8 = 0xAA;
pub const KEY_BACKTICK: u8 = 0xAE;
pub const KEY_RIGHT_SQ_BRACKET: u8 = 0xB2;
pub const KEY_ENTER: u8 = 0xB6;

// Row 4 (0x83 is probably caps lock, reported as a flag)
pub const KEY_A: u8 = 0x87;
pub const KEY_S: u8 = 0x8B;
pub const KEY_D: u8 = 0x8F;
pub const KEY_F: u8 = 0x93;
pub const KEY_G: u8 = 0x97;
pub const KEY_H: u8 = 0x9B;
pub const KEY_J: u8 = 0x9F;
pub const KEY_K: u8 = 0xA3;
pub const KEY_L: u8 = 0xA7;
pub const KEY_N_TILDE: u8 = 0xAB;
pub const KEY_U_UMLAUT: u8 = 0xAF;
pub const KEY_O_OVER_LINE: u8 = 0xB3;

// Row 5
pub const KEY_Z: u8 = 0xB8;
pub const KEY_X: u8 = 0xBC;
pub const KEY_C: u8 = 0xC0;
pub const KEY_V: u8 = 0xC4;
pub const KEY_B: u8 = 0xC8;
pub const KEY_N: u8 = 0xCC;
pub const KEY_M: u8 = 0xD0;
pub const KEY_COMMA: u8 = 0xD4;
pub const KEY_PERIOD: u8 = 0xD8;
pub const KEY_DASH: u8 = 0xDC;
pub const KEY_LESS_THAN: u8 = 0xBD;
pub const KEY_MEMORY_PLUS: u8 = 0xCD;
pub const KEY_MEMORY_RECALL: u8 = 0xD1;
pub const KEY_SQUAREROOT: u8 = 0xD5;
pub const KEY_DIVIDE: u8 = 0xE4;
pub const KEY_ARROW_UP: u8 = 0xE8;
pub const KEY_PLUS: u8 = 0xEC;

// Row 6
pub const KEY_SPACE: u8 = 0xB9;
pub const KEY_PAGE_UP: u8 = 0xC1;
pub const KEY_PAGE_DOWN: u8 = 0xC5;
pub const KEY_MEMORY_MINUS: u8 = 0xC9;
pub const KEY_MULTIPLY: u8 = 0xD9;
pub const KEY_ARROW_DOWN: u8 = 0xDD;
pub const KEY_PRINTSCREEN_RIGHT: u8 = 0xDE;
pub const KEY_DELETE: u8 = 0xE0;
pub const KEY_MINUS: u8 = 0xE1;
pub const KEY_ARROW_LEFT: u8 = 0xE5;
pub const KEY_EQUALS: u8 = 0xE9;
pub const KEY_ARROW_RIGHT: u8 = 0xED;

// Row 7: piano sharps
pub const KEY_PIANO_DO_SHARP: u8 = 0xBA;
pub const KEY_PIANO_RE_SHARP: u8 = 0xBE;
pub const KEY_PIANO_FA_SHARP: u8 = 0xC6;
pub const KEY_PIANO_SOL_SHARP: u8 = 0xCA;
pub const KEY_PIANO_LA_SHARP: u8 = 0xCE;
pub const KEY_PIANO_DO_2_SHARP: u8 = 0xD6;
pub const KEY_PIANO_RE_2_SHARP: u8 = 0xDA;
pub const KEY_PIANO_FA_2_SHARP: u8 = 0xE2;
pub const KEY_PIANO_SOL_2_SHARP: u8 = 0xE6;
pub const KEY_PIANO_LA_2_SHARP: u8 = 0xEA;

// Row 8: piano naturals
pub const KEY_PIANO_DO: u8 = 0xBB;
pub const KEY_PIANO_RE: u8 = 0xBF;
pub const KEY_PIANO_MI: u8 = 0xC3;
pub const KEY_PIANO_FA: u8 = 0xC7;
pub const KEY_PIANO_SOL: u8 = 0xCB;
pub const KEY_PIANO_LA: u8 = 0xCF;
pub const KEY_PIANO_SI: u8 = 0xD3;
pub const KEY_PIANO_DO_2: u8 = 0xD7;
pub const KEY_PIANO_RE_2: u8 = 0xDB;
pub const KEY_PIANO_FA_2: u8 = 0xE3;
pub const KEY_PIANO_SOL_2: u8 = 0xE7;
pub const KEY_PIANO_LA_2: u8 = 0xEB;
pub const KEY_PIANO_SI_2: u8 = 0xEF;

/// Start of what look like system codes rather than keys
pub const KEY_SYSTEM_CODES_START: u8 = 0xF0;

/// A decoded key press
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum Key {
    /// Nothing pressed, or a key with no mapping
    #[default]
    None,
    /// A printable character
    Char(char),
    ArrowUp,
    ArrowDown,
    ArrowRight,
    ArrowLeft,
    Help,
    Backspace,
    Enter,
    Escape,
    Delete,
}

impl Key {
    /// Whether holding the key should auto-repeat
    ///
    /// Printable characters and the arrows repeat. Delete counts as
    /// printable since it sits above the control range.
    pub fn is_repeatable(self) -> bool {
        match self {
            Key::Char(c) => c >= ' ',
            Key::Delete | Key::ArrowUp | Key::ArrowDown | Key::ArrowRight | Key::ArrowLeft => {
                true
            }
            _ => false,
        }
    }

    /// The character, if this is a printable key
    pub fn as_char(self) -> Option<char> {
        match self {
            Key::Char(c) => Some(c),
            _ => None,
        }
    }
}

/// Translate a table index to a key
///
/// Indices at or above [`KEY_BASE`] are plain scancodes. Indices below
/// it select the shift alternate of `index + 0x80`; keys without one
/// fall back to their plain meaning.
pub fn keycode_to_key(index: u8) -> Key {
    if index >= KEY_BASE {
        base_key(index)
    } else {
        let scancode = index | KEY_BASE;
        shifted_key(scancode).unwrap_or_else(|| base_key(scancode))
    }
}

fn base_key(scancode: u8) -> Key {
    let c = match scancode {
        KEY_ESCAPE => return Key::Escape,
        KEY_BACKSPACE => return Key::Backspace,
        KEY_HELP => return Key::Help,
        KEY_ENTER => return Key::Enter,
        KEY_DELETE => return Key::Delete,
        KEY_ARROW_UP => return Key::ArrowUp,
        KEY_ARROW_DOWN => return Key::ArrowDown,
        KEY_ARROW_LEFT => return Key::ArrowLeft,
        KEY_ARROW_RIGHT => return Key::ArrowRight,

        KEY_1 => '1',
        KEY_2 => '2',
        KEY_3 => '3',
        KEY_4 => '4',
        KEY_5 => '5',
        KEY_6 => '6',
        KEY_7 => '7',
        KEY_8 => '8',
        KEY_9 => '9',
        KEY_0 => '0',
        KEY_SINGLE_QUOTE => '\'',
        KEY_EXCLAMATION_FLIPPED => '¡',

        KEY_Q => 'q',
        KEY_W => 'w',
        KEY_E => 'e',
        KEY_R => 'r',
        KEY_T => 't',
        KEY_Y => 'y',
        KEY_U => 'u',
        KEY_I => 'i',
        KEY_O => 'o',
        KEY_P => 'p',
        KEY_BACKTICK => '`',
        KEY_RIGHT_SQ_BRACKET => ']',

        KEY_A => 'a',
        KEY_S => 's',
        KEY_D => 'd',
        KEY_F => 'f',
        KEY_G => 'g',
        KEY_H => 'h',
        KEY_J => 'j',
        KEY_K => 'k',
        KEY_L => 'l',
        KEY_N_TILDE => 'ñ',
        KEY_U_UMLAUT => 'ü',
        KEY_O_OVER_LINE => 'º',

        KEY_Z => 'z',
        KEY_X => 'x',
        KEY_C => 'c',
        KEY_V => 'v',
        KEY_B => 'b',
        KEY_N => 'n',
        KEY_M => 'm',
        KEY_COMMA => ',',
        KEY_PERIOD => '.',
        KEY_DASH => '-',
        KEY_LESS_THAN => '<',

        KEY_SPACE => ' ',
        KEY_MULTIPLY => '*',
        KEY_MINUS => '-',
        KEY_EQUALS => '=',
        KEY_DIVIDE => '/',
        KEY_PLUS => '+',

        _ => return Key::None,
    };
    Key::Char(c)
}

fn shifted_key(scancode: u8) -> Option<Key> {
    let c = match scancode {
        KEY_1 => '!',
        KEY_2 => '"',
        KEY_3 => '·',
        KEY_4 => '$',
        KEY_5 => '%',
        KEY_6 => '&',
        KEY_7 => '/',
        KEY_8 => '(',
        KEY_9 => ')',
        KEY_0 => '\\',
        KEY_SINGLE_QUOTE => '?',
        KEY_EXCLAMATION_FLIPPED => '¿',
        KEY_BACKTICK => '[',
        KEY_RIGHT_SQ_BRACKET => '*',
        KEY_N_TILDE => 'Ñ',
        KEY_U_UMLAUT => 'Ü',
        KEY_O_OVER_LINE => 'ª',
        KEY_DASH => '_',
        KEY_LESS_THAN => '>',
        _ => match base_key(scancode) {
            Key::Char(c) if c.is_ascii_lowercase() => c.to_ascii_uppercase(),
            _ => return None,
        },
    };
    Some(Key::Char(c))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_base_keys() {
        assert_eq!(keycode_to_key(KEY_1), Key::Char('1'));
        assert_eq!(keycode_to_key(KEY_A), Key::Char('a'));
        assert_eq!(keycode_to_key(KEY_SPACE), Key::Char(' '));
        assert_eq!(keycode_to_key(KEY_ENTER), Key::Enter);
        assert_eq!(keycode_to_key(KEY_ARROW_LEFT), Key::ArrowLeft);
        assert_eq!(keycode_to_key(KEY_F1), Key::None);
        assert_eq!(keycode_to_key(KEY_PIANO_DO), Key::None);
    }

    #[test]
    fn test_shift_alternates() {
        assert_eq!(keycode_to_key(KEY_1 - KEY_BASE), Key::Char('!'));
        assert_eq!(keycode_to_key(KEY_SINGLE_QUOTE - KEY_BASE), Key::Char('?'));
        assert_eq!(keycode_to_key(KEY_Q - KEY_BASE), Key::Char('Q'));
        assert_eq!(keycode_to_key(KEY_N_TILDE - KEY_BASE), Key::Char('Ñ'));
        // No alternate: plain meaning
        assert_eq!(keycode_to_key(KEY_COMMA - KEY_BASE), Key::Char(','));
        assert_eq!(keycode_to_key(KEY_ARROW_UP - KEY_BASE), Key::ArrowUp);
    }

    #[test]
    fn test_repeatable_keys() {
        assert!(Key::Char('a').is_repeatable());
        assert!(Key::Char(' ').is_repeatable());
        assert!(Key::ArrowDown.is_repeatable());
        assert!(Key::Delete.is_repeatable());
        assert!(!Key::Enter.is_repeatable());
        assert!(!Key::Help.is_repeatable());
        assert!(!Key::None.is_repeatable());
    }

    #[test]
    fn test_every_scancode_has_an_answer() {
        for code in 0..=u8::MAX {
            let _ = keycode_to_key(code);
        }
    }
}
