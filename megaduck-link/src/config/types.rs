//! Link configuration type definitions
//!
//! Defaults reproduce the system ROM timings: a 1 ms timing unit, a
//! 1 ms settle after each transmitted byte, 200 ms per send
//! acknowledgement and 100 ms per received byte.

use core::fmt;

use megaduck_protocol::timeout;

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

/// Nominal length of one timing unit
pub const DEFAULT_UNIT_MICROS: u32 = 1_000;

/// How often the received flag is checked inside a unit
///
/// The system ROM spins 75 iterations per millisecond, roughly 13 µs each.
pub const DEFAULT_POLL_INTERVAL_MICROS: u32 = 10;

/// How the handshake waits for each reply byte
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub enum ReplyWait {
    /// Spin until the byte arrives; the peripheral is assumed present
    #[default]
    Blocking,
    /// Give up after this many timing units (counts as a mismatch)
    Bounded(u8),
}

/// What the handshake does after a wrong countdown byte
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub enum CountdownPolicy {
    /// Keep reading until all 256 countdown bytes are consumed
    #[default]
    ConsumeAll,
    /// Stop reading at the first wrong byte and abort
    StopAtFirstMismatch,
}

/// How startup reacts to a failed handshake
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub enum RetryPolicy {
    /// Retry immediately, forever (peripheral assumed attached)
    #[default]
    Forever,
    /// Give up after this many attempts
    Attempts(u8),
}

/// Boot handshake configuration
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct HandshakeConfig {
    /// Wait mode for the boot reply and the countdown bytes
    pub reply_wait: ReplyWait,
    /// Countdown mismatch handling
    pub countdown: CountdownPolicy,
    /// Retry policy used by startup
    pub retry: RetryPolicy,
}

impl HandshakeConfig {
    /// The alternate ROM variant: 2 ms bounded waits, no retries
    pub const fn bounded() -> Self {
        Self {
            reply_wait: ReplyWait::Bounded(timeout::HANDSHAKE),
            countdown: CountdownPolicy::ConsumeAll,
            retry: RetryPolicy::Attempts(1),
        }
    }
}

/// Link timing configuration
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct LinkConfig {
    /// Length of one timing unit in microseconds
    pub unit_micros: u32,
    /// Pause between received-flag checks, in microseconds
    pub poll_interval_micros: u32,
    /// Units to wait after shifting a byte out
    pub settle_units: u8,
    /// Units to wait for each acknowledgement while sending a buffer
    pub send_ack_timeout: u8,
    /// Units to wait for each byte while receiving a buffer
    pub receive_timeout: u8,
    /// Boot handshake behaviour
    pub handshake: HandshakeConfig,
}

impl Default for LinkConfig {
    fn default() -> Self {
        Self {
            unit_micros: DEFAULT_UNIT_MICROS,
            poll_interval_micros: DEFAULT_POLL_INTERVAL_MICROS,
            settle_units: 1,
            send_ack_timeout: timeout::SEND_ACK,
            receive_timeout: timeout::RECEIVE,
            handshake: HandshakeConfig::default(),
        }
    }
}

/// Configuration validation errors
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum ConfigError {
    /// Timing unit is zero
    ZeroUnit,
    /// Poll interval is zero or longer than a unit
    InvalidPollInterval,
    /// A timeout of zero units can never succeed
    ZeroTimeout,
    /// Retry policy allows no attempts
    ZeroAttempts,
    /// Persisted configuration could not be encoded or decoded
    Encoding,
}

impl fmt::Display for ConfigError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ConfigError::ZeroUnit => f.write_str("timing unit must be non-zero"),
            ConfigError::InvalidPollInterval => {
                f.write_str("poll interval must be non-zero and at most one unit")
            }
            ConfigError::ZeroTimeout => f.write_str("timeouts must be non-zero"),
            ConfigError::ZeroAttempts => f.write_str("retry policy must allow an attempt"),
            ConfigError::Encoding => f.write_str("configuration encoding error"),
        }
    }
}

impl LinkConfig {
    /// Check the configuration for values the link cannot run with
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.unit_micros == 0 {
            return Err(ConfigError::ZeroUnit);
        }
        if self.poll_interval_micros == 0 || self.poll_interval_micros > self.unit_micros {
            return Err(ConfigError::InvalidPollInterval);
        }
        if self.send_ack_timeout == 0 || self.receive_timeout == 0 {
            return Err(ConfigError::ZeroTimeout);
        }
        if self.handshake.reply_wait == ReplyWait::Bounded(0) {
            return Err(ConfigError::ZeroTimeout);
        }
        if self.handshake.retry == RetryPolicy::Attempts(0) {
            return Err(ConfigError::ZeroAttempts);
        }
        Ok(())
    }

    /// Length of `units` timing units in microseconds
    pub fn units_to_micros(&self, units: u8) -> u64 {
        u64::from(units) * u64::from(self.unit_micros)
    }
}
