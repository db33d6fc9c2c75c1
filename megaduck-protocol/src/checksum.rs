//! Two's-complement frame checksum
//!
//! The sender seeds an 8-bit accumulator with the frame length, adds
//! every payload byte, and transmits the two's complement of the total.
//! The receiver adds everything it sees, checksum included, and accepts
//! the frame only if the accumulator wraps to exactly zero.

/// Running 8-bit frame sum
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct Checksum(u8);

impl Checksum {
    /// Value forced into the accumulator when a frame is cut short
    ///
    /// Any non-zero value fails validation; 0xFF matches the system ROM.
    pub const INVALID: u8 = 0xFF;

    /// Start an accumulator from a seed (the frame length byte)
    pub const fn seeded(seed: u8) -> Self {
        Self(seed)
    }

    /// Add one byte
    pub fn add(&mut self, byte: u8) {
        self.0 = self.0.wrapping_add(byte);
    }

    /// Add a run of bytes
    pub fn add_all(&mut self, bytes: &[u8]) {
        for &byte in bytes {
            self.add(byte);
        }
    }

    /// Force the accumulator to a value that can never validate
    pub fn poison(&mut self) {
        self.0 = Self::INVALID;
    }

    /// Current 8-bit sum
    pub fn sum(self) -> u8 {
        self.0
    }

    /// Checksum byte that brings the sum to zero
    pub fn twos_complement(self) -> u8 {
        (!self.0).wrapping_add(1)
    }

    /// True when the accumulated frame sums to zero
    pub fn is_valid(self) -> bool {
        self.0 == 0
    }
}

/// Two's complement of the 8-bit sum of `bytes`
pub fn twos_complement(bytes: &[u8]) -> u8 {
    let mut sum = Checksum::default();
    sum.add_all(bytes);
    sum.twos_complement()
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    #[test]
    fn test_keyboard_reply_checksum() {
        // 04 flags=04 code=85 -> 04 + 04 + 85 = 8D, complement = 73
        let mut sum = Checksum::seeded(0x04);
        sum.add_all(&[0x04, 0x85]);
        assert_eq!(sum.sum(), 0x8D);
        assert_eq!(sum.twos_complement(), 0x73);

        sum.add(0x73);
        assert!(sum.is_valid());
    }

    #[test]
    fn test_zero_sum_complement_is_zero() {
        assert_eq!(Checksum::default().twos_complement(), 0);
        assert_eq!(twos_complement(&[0x80, 0x80]), 0);
    }

    #[test]
    fn test_poison_never_validates() {
        let mut sum = Checksum::seeded(0);
        assert!(sum.is_valid());
        sum.poison();
        assert!(!sum.is_valid());
        assert_eq!(sum.sum(), Checksum::INVALID);
    }

    #[test]
    fn test_wrapping_add() {
        let mut sum = Checksum::seeded(0xFF);
        sum.add(0x02);
        assert_eq!(sum.sum(), 0x01);
    }

    proptest! {
        #[test]
        fn prop_complement_cancels_sum(bytes in proptest::collection::vec(any::<u8>(), 0..64)) {
            let mut sum = Checksum::default();
            sum.add_all(&bytes);
            let check = twos_complement(&bytes);
            sum.add(check);
            prop_assert!(sum.is_valid());
        }

        #[test]
        fn prop_single_byte_corruption_detected(
            bytes in proptest::collection::vec(any::<u8>(), 1..16),
            index in any::<prop::sample::Index>(),
            flip in 1u8..=255,
        ) {
            let check = twos_complement(&bytes);
            let mut corrupted = bytes.clone();
            let i = index.index(corrupted.len());
            corrupted[i] ^= flip;

            let mut sum = Checksum::default();
            sum.add_all(&corrupted);
            sum.add(check);
            prop_assert!(!sum.is_valid());
        }
    }
}
