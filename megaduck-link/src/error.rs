//! Link-level error types

use core::fmt;

pub use megaduck_protocol::{LinkError, SendStage};

/// First failure recorded during a boot handshake attempt
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum HandshakeError {
    /// The count-up was not answered with `BOOT_OK`
    BootReply {
        /// Reply received, `None` on timeout
        got: Option<u8>,
    },
    /// A countdown byte was missing or out of order
    Countdown {
        /// Value the countdown should have produced
        expected: u8,
        /// Reply received, `None` on timeout
        got: Option<u8>,
    },
}

impl fmt::Display for HandshakeError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            HandshakeError::BootReply { got: Some(b) } => {
                write!(f, "laptop not detected: boot reply {:#04x}", b)
            }
            HandshakeError::BootReply { got: None } => {
                f.write_str("laptop not detected: no boot reply")
            }
            HandshakeError::Countdown {
                expected,
                got: Some(b),
            } => write!(
                f,
                "laptop not detected: countdown expected {:#04x}, got {:#04x}",
                expected, b
            ),
            HandshakeError::Countdown {
                expected,
                got: None,
            } => write!(
                f,
                "laptop not detected: countdown byte {:#04x} missing",
                expected
            ),
        }
    }
}
