//! Command, reply and timing constants
//!
//! Values come from the laptop system ROM. Some codes share a value and
//! are told apart only by where they appear in the dialogue.

/// Host → peripheral command bytes
pub mod cmd {
    /// Requests the 255..0 countdown during the boot handshake
    pub const INIT_SEQ_REQUEST: u8 = 0x00;
    /// Requests a frame with the keyboard state
    pub const GET_KEYS: u8 = 0x00;
    /// Generic OK / transfer done
    pub const DONE_OR_OK: u8 = 0x01;
    /// OK variant seen in the system ROM, purpose unknown
    pub const DONE_OR_OK_AND_SOMETHING: u8 = 0x81;
    /// Generic ABORT / failure
    pub const ABORT_OR_FAIL: u8 = 0x04;
    /// Hands control to the cartridge slot
    pub const RUN_CART_IN_SLOT: u8 = 0x08;
    /// Sent once after the handshake; the reply is unused by the system ROM
    pub const INIT_UNKNOWN_0X09: u8 = 0x09;
    /// Sets the RTC date and time (send-buffer)
    pub const RTC_SET_DATE_AND_TIME: u8 = 0x0B;
    /// Requests the RTC date and time (receive-buffer)
    pub const RTC_GET_DATE_AND_TIME: u8 = 0x0C;
}

/// Peripheral → host reply bytes
pub mod reply {
    /// Count-up sequence accepted during the boot handshake
    pub const BOOT_OK: u8 = 0x01;
    /// Per-byte acknowledgement while the host sends a buffer
    pub const SEND_BUFFER_OK: u8 = 0x03;
    /// Acknowledgement of the final checksum byte of a sent buffer
    pub const BUFFER_SEND_AND_CHECKSUM_OK: u8 = 0x01;
}

/// Wait budgets, in link timing units (nominally milliseconds)
pub mod timeout {
    /// Bounded handshake reply wait
    pub const HANDSHAKE: u8 = 2;
    /// Each byte of a received buffer
    pub const RECEIVE: u8 = 100;
    /// Each acknowledgement while sending a buffer
    pub const SEND_ACK: u8 = 200;
}
