//! Time source abstractions
//!
//! Timeouts on the link are deadlines against a monotonic microsecond
//! counter. Busy-wait pauses go through `embedded_hal::delay::DelayNs`,
//! so any HAL delay provider works for the spin part.

use embedded_hal::delay::DelayNs;

/// Monotonic microsecond counter
pub trait Monotonic {
    /// Microseconds since an arbitrary fixed origin
    ///
    /// Must never go backwards.
    fn now_micros(&self) -> u64;

    /// Microseconds elapsed since `start`
    fn elapsed_since(&self, start: u64) -> u64 {
        self.now_micros().saturating_sub(start)
    }
}

/// A clock usable by the link: timestamps plus busy-wait delays
pub trait Clock: Monotonic + DelayNs {}

// Blanket implementation
impl<T: Monotonic + DelayNs> Clock for T {}
