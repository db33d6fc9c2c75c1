//! Adapter error types

use core::fmt;

use megaduck_link::{HandshakeError, LinkError};
use megaduck_protocol::FrameError;

use crate::rtc::RtcError;

/// Errors from the peripheral adapters
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum PeripheralError {
    /// The packet exchange failed
    Link(LinkError),
    /// A reply frame had the wrong size (bytes after LENGTH, checksum included)
    UnexpectedLength(usize),
    /// Clock values out of range
    Rtc(RtcError),
    /// The laptop did not complete the boot handshake
    NotDetected(HandshakeError),
    /// An outgoing payload did not fit a frame
    Frame(FrameError),
}

impl From<LinkError> for PeripheralError {
    fn from(e: LinkError) -> Self {
        PeripheralError::Link(e)
    }
}

impl From<RtcError> for PeripheralError {
    fn from(e: RtcError) -> Self {
        PeripheralError::Rtc(e)
    }
}

impl From<HandshakeError> for PeripheralError {
    fn from(e: HandshakeError) -> Self {
        PeripheralError::NotDetected(e)
    }
}

impl From<FrameError> for PeripheralError {
    fn from(e: FrameError) -> Self {
        PeripheralError::Frame(e)
    }
}

impl fmt::Display for PeripheralError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            PeripheralError::Link(e) => write!(f, "link error: {}", e),
            PeripheralError::UnexpectedLength(n) => write!(f, "unexpected reply size {}", n),
            PeripheralError::Rtc(e) => write!(f, "clock error: {}", e),
            PeripheralError::NotDetected(e) => e.fmt(f),
            PeripheralError::Frame(e) => write!(f, "frame error: {:?}", e),
        }
    }
}
