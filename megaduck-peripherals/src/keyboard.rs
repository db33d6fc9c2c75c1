//! Keyboard polling and key decoding
//!
//! A poll asks the laptop for one report (modifier flags plus scancode).
//! [`Keyboard::process`] turns successive reports into key presses,
//! applying shift, caps lock and software auto-repeat.

use bitflags::bitflags;
use megaduck_link::PacketLink;
use megaduck_protocol::cmd;

use crate::error::PeripheralError;
use crate::keycodes::{keycode_to_key, Key, KEY_BASE};

/// Bytes after LENGTH in a keyboard reply: flags, scancode, checksum
pub const KEYBOARD_REPLY_LEN: usize = 3;

/// Polls to wait before the first repeat
pub const REPEAT_FIRST_THRESHOLD: u8 = 8;

/// Polls to wait between later repeats
pub const REPEAT_CONTINUE_THRESHOLD: u8 = 4;

bitflags! {
    /// Modifier flags byte of a keyboard report
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
    pub struct KeyFlags: u8 {
        /// Key is being held (usually sent with no scancode)
        const REPEAT = 0x01;
        const CAPS_LOCK = 0x02;
        const SHIFT = 0x04;
        /// Left print screen is only reported as a flag
        const PRINTSCREEN_LEFT = 0x08;
    }
}

#[cfg(feature = "defmt")]
impl defmt::Format for KeyFlags {
    fn format(&self, f: defmt::Formatter) {
        defmt::write!(f, "KeyFlags({=u8:#x})", self.bits())
    }
}

/// One raw keyboard report
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct KeyReport {
    pub flags: KeyFlags,
    /// 0x00 when nothing is pressed
    pub scancode: u8,
}

impl KeyReport {
    pub fn new(flags: u8, scancode: u8) -> Self {
        Self {
            flags: KeyFlags::from_bits_retain(flags),
            scancode,
        }
    }
}

/// Key decoder with auto-repeat state
#[derive(Debug, Clone, Default)]
pub struct Keyboard {
    previous: Key,
    repeat_allowed: bool,
    repeat_timeout: u8,
    flags: KeyFlags,
}

impl Keyboard {
    pub fn new() -> Self {
        Self::default()
    }

    /// Request one keyboard report
    pub fn poll<L: PacketLink>(link: &mut L) -> Result<KeyReport, PeripheralError> {
        let rx = link.receive_buffer(cmd::GET_KEYS)?;
        match *rx.as_slice() {
            [flags, scancode, _checksum] => Ok(KeyReport::new(flags, scancode)),
            _ => Err(PeripheralError::UnexpectedLength(rx.len())),
        }
    }

    /// Poll and decode in one step
    pub fn read_key<L: PacketLink>(&mut self, link: &mut L) -> Result<Key, PeripheralError> {
        let report = Self::poll(link)?;
        Ok(self.process(report))
    }

    /// Decode a report into a key press
    ///
    /// While a repeatable key is held the laptop sends the REPEAT flag;
    /// the previous key is re-emitted after [`REPEAT_FIRST_THRESHOLD`]
    /// polls and then every [`REPEAT_CONTINUE_THRESHOLD`] polls.
    pub fn process(&mut self, report: KeyReport) -> Key {
        if report.flags.contains(KeyFlags::REPEAT) && self.repeat_allowed {
            if self.repeat_timeout > 0 {
                self.repeat_timeout -= 1;
                return Key::None;
            }
            self.repeat_timeout = REPEAT_CONTINUE_THRESHOLD;
            return self.previous;
        }

        self.flags = report.flags;
        let key = decode(report);

        if key.is_repeatable() {
            self.repeat_allowed = true;
            self.repeat_timeout = REPEAT_FIRST_THRESHOLD;
        } else {
            self.repeat_allowed = false;
        }
        self.previous = key;
        key
    }

    /// Modifier flags of the last non-repeat report
    pub fn flags(&self) -> KeyFlags {
        self.flags
    }
}

fn decode(report: KeyReport) -> Key {
    if report.scancode < KEY_BASE {
        return Key::None;
    }

    let modifiers = report.flags & (KeyFlags::SHIFT | KeyFlags::CAPS_LOCK);
    if modifiers == KeyFlags::SHIFT {
        return keycode_to_key(report.scancode - KEY_BASE);
    }

    let key = keycode_to_key(report.scancode);
    match key {
        Key::Char(c) if modifiers == KeyFlags::CAPS_LOCK && c.is_ascii_lowercase() => {
            Key::Char(c.to_ascii_uppercase())
        }
        _ => key,
    }
}
