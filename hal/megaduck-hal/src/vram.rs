//! Video memory access
//!
//! Model detection inspects font tiles the laptop system ROM leaves in
//! VRAM before a cartridge starts.

/// Read-only view of video memory
pub trait VideoMemory {
    /// Read one byte of VRAM at an absolute address
    fn read_vram(&mut self, addr: u16) -> u8;

    /// Compare a run of VRAM against an expected pattern
    fn matches(&mut self, addr: u16, expected: &[u8]) -> bool {
        expected
            .iter()
            .enumerate()
            .all(|(offset, &byte)| self.read_vram(addr.wrapping_add(offset as u16)) == byte)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    /// Mock VRAM backed by a small array starting at 0x8000
    struct MockVram {
        bytes: [u8; 16],
    }

    impl VideoMemory for MockVram {
        fn read_vram(&mut self, addr: u16) -> u8 {
            self.bytes[(addr - 0x8000) as usize]
        }
    }

    #[test]
    fn test_matches_pattern() {
        let mut vram = MockVram { bytes: [0; 16] };
        vram.bytes[4..8].copy_from_slice(&[1, 2, 3, 4]);

        assert!(vram.matches(0x8004, &[1, 2, 3, 4]));
        assert!(!vram.matches(0x8004, &[1, 2, 3, 5]));
        assert!(!vram.matches(0x8003, &[1, 2, 3, 4]));
    }

    #[test]
    fn test_empty_pattern_always_matches() {
        let mut vram = MockVram { bytes: [0xFF; 16] };
        assert!(vram.matches(0x8000, &[]));
    }
}
