//! Link failure taxonomy
//!
//! Acknowledgement checks collapse timeout and wrong-reply into one
//! outcome, so a failed send only reports where it stopped.

use core::fmt;

/// Point in a send-buffer exchange where an acknowledgement was missing
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum SendStage {
    /// The command byte
    Command,
    /// The frame length byte
    Length,
    /// A payload byte (index into the payload)
    Payload(u8),
    /// The trailing checksum byte
    Checksum,
}

/// Errors from a packet exchange
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum LinkError {
    /// No byte arrived within the wait budget
    Timeout,
    /// Acknowledgement missing or wrong
    NoAck(SendStage),
    /// Frame bytes did not sum to zero
    ChecksumInvalid,
    /// Advertised frame length is zero or exceeds the receive buffer
    InvalidLength(u8),
}

impl fmt::Display for SendStage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SendStage::Command => f.write_str("command"),
            SendStage::Length => f.write_str("length"),
            SendStage::Payload(index) => write!(f, "payload byte {}", index),
            SendStage::Checksum => f.write_str("checksum"),
        }
    }
}

impl fmt::Display for LinkError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            LinkError::Timeout => f.write_str("timed out waiting for peripheral"),
            LinkError::NoAck(stage) => write!(f, "no acknowledgement for {}", stage),
            LinkError::ChecksumInvalid => f.write_str("frame checksum invalid"),
            LinkError::InvalidLength(len) => write!(f, "invalid frame length {}", len),
        }
    }
}
