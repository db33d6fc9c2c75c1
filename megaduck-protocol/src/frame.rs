//! Frame encoding and assembly for the laptop link.
//!
//! Frame format:
//! - LENGTH (1 byte): total frame size, counting itself and the checksum
//! - PAYLOAD (0-12 bytes): command-specific data
//! - CHECKSUM (1 byte): two's complement of LENGTH + all PAYLOAD bytes
//!
//! The same shape is used in both directions. What differs is the
//! dialogue around it (per-byte acks when the host sends, a single
//! OK/ABORT when the host receives).

use heapless::Vec;

use crate::checksum::Checksum;

/// Largest frame either side may advertise
pub const MAX_FRAME_LEN: usize = 14;

/// Maximum payload size in bytes
pub const MAX_PAYLOAD_LEN: usize = MAX_FRAME_LEN - 2;

/// Receive buffer capacity; also the largest acceptable LENGTH byte
pub const RX_MAX_LEN: usize = MAX_FRAME_LEN;

/// Errors that can occur during frame assembly or encoding
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum FrameError {
    /// Payload exceeds maximum allowed size
    PayloadTooLarge,
    /// LENGTH byte cannot describe a valid frame
    InvalidLength(u8),
    /// Checksum mismatch
    InvalidChecksum,
    /// Buffer too small for encoding
    BufferTooSmall,
}

/// A frame payload, staged for sending or produced by assembly
#[derive(Debug, Clone, Default, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct Frame {
    payload: Vec<u8, MAX_PAYLOAD_LEN>,
}

/// Payload an adapter fills before a send-buffer call
pub type TxBuffer = Frame;

impl Frame {
    /// Create an empty frame
    pub const fn new() -> Self {
        Self {
            payload: Vec::new(),
        }
    }

    /// Create a frame from a payload slice
    pub fn from_slice(payload: &[u8]) -> Result<Self, FrameError> {
        let mut frame = Self::new();
        frame
            .payload
            .extend_from_slice(payload)
            .map_err(|_| FrameError::PayloadTooLarge)?;
        Ok(frame)
    }

    /// Append one payload byte
    pub fn push(&mut self, byte: u8) -> Result<(), FrameError> {
        self.payload
            .push(byte)
            .map_err(|_| FrameError::PayloadTooLarge)
    }

    /// Drop all payload bytes
    pub fn clear(&mut self) {
        self.payload.clear();
    }

    /// Payload bytes
    pub fn payload(&self) -> &[u8] {
        &self.payload
    }

    /// Number of payload bytes
    pub fn len(&self) -> usize {
        self.payload.len()
    }

    /// True if there is no payload
    pub fn is_empty(&self) -> bool {
        self.payload.is_empty()
    }

    /// LENGTH byte for this frame (payload + length byte + checksum)
    pub fn length_byte(&self) -> u8 {
        (self.payload.len() + 2) as u8
    }

    /// CHECKSUM byte for this frame
    pub fn checksum(&self) -> u8 {
        let mut sum = Checksum::seeded(self.length_byte());
        sum.add_all(&self.payload);
        sum.twos_complement()
    }

    /// Encode this frame into a byte buffer
    ///
    /// Returns the number of bytes written
    pub fn encode(&self, buffer: &mut [u8]) -> Result<usize, FrameError> {
        let frame_len = self.payload.len() + 2;
        if buffer.len() < frame_len {
            return Err(FrameError::BufferTooSmall);
        }

        buffer[0] = self.length_byte();
        buffer[1..1 + self.payload.len()].copy_from_slice(&self.payload);
        buffer[frame_len - 1] = self.checksum();

        Ok(frame_len)
    }

    /// Encode this frame into a heapless Vec
    pub fn encode_to_vec(&self) -> Result<Vec<u8, MAX_FRAME_LEN>, FrameError> {
        let mut buffer = [0u8; MAX_FRAME_LEN];
        let len = self.encode(&mut buffer)?;
        let mut vec = Vec::new();
        vec.extend_from_slice(&buffer[..len])
            .map_err(|_| FrameError::BufferTooSmall)?;
        Ok(vec)
    }
}

/// Bytes received after a LENGTH byte: the payload followed by the checksum
///
/// Overwritten on every receive. Holds at most `RX_MAX_LEN - 1` bytes in
/// practice since the LENGTH byte itself is not stored.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct RxBuffer {
    bytes: Vec<u8, RX_MAX_LEN>,
}

impl RxBuffer {
    /// Create an empty buffer
    pub const fn new() -> Self {
        Self { bytes: Vec::new() }
    }

    /// Reset the length to zero
    pub fn clear(&mut self) {
        self.bytes.clear();
    }

    /// Append a received byte
    pub fn push(&mut self, byte: u8) -> Result<(), FrameError> {
        self.bytes
            .push(byte)
            .map_err(|_| FrameError::InvalidLength(self.bytes.len() as u8 + 1))
    }

    /// Everything received after the LENGTH byte, checksum included
    pub fn as_slice(&self) -> &[u8] {
        &self.bytes
    }

    /// Number of stored bytes, checksum included
    pub fn len(&self) -> usize {
        self.bytes.len()
    }

    /// True if nothing has been stored
    pub fn is_empty(&self) -> bool {
        self.bytes.is_empty()
    }

    /// Stored bytes without the trailing checksum
    pub fn payload(&self) -> &[u8] {
        match self.bytes.split_last() {
            Some((_, payload)) => payload,
            None => &[],
        }
    }
}

/// State machine that rebuilds a frame from the bytes of a send exchange
///
/// Used on the peripheral side of the link (and by the host simulator):
/// feed it every byte after the command and it reports each byte's fate.
#[derive(Debug, Clone)]
pub struct FrameAssembler {
    state: AssembleState,
    frame: Frame,
    remaining: u8,
    sum: Checksum,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum AssembleState {
    /// Waiting for LENGTH
    WaitingForLength,
    /// Reading payload bytes
    ReadingPayload,
    /// Waiting for CHECKSUM
    WaitingForChecksum,
}

impl Default for FrameAssembler {
    fn default() -> Self {
        Self::new()
    }
}

impl FrameAssembler {
    /// Create a new assembler
    pub fn new() -> Self {
        Self {
            state: AssembleState::WaitingForLength,
            frame: Frame::new(),
            remaining: 0,
            sum: Checksum::default(),
        }
    }

    /// Reset the assembler state
    pub fn reset(&mut self) {
        *self = Self::new();
    }

    /// Feed a single byte
    ///
    /// Returns `Ok(Some(frame))` once the checksum byte validates,
    /// `Ok(None)` when more bytes are needed, or `Err` on a bad length or
    /// checksum. The assembler resets itself after a frame or an error.
    pub fn feed(&mut self, byte: u8) -> Result<Option<Frame>, FrameError> {
        match self.state {
            AssembleState::WaitingForLength => {
                if byte < 2 || byte as usize > MAX_FRAME_LEN {
                    self.reset();
                    return Err(FrameError::InvalidLength(byte));
                }
                self.sum = Checksum::seeded(byte);
                self.remaining = byte - 2;
                self.state = if self.remaining == 0 {
                    AssembleState::WaitingForChecksum
                } else {
                    AssembleState::ReadingPayload
                };
                Ok(None)
            }
            AssembleState::ReadingPayload => {
                if let Err(e) = self.frame.push(byte) {
                    self.reset();
                    return Err(e);
                }
                self.sum.add(byte);
                self.remaining -= 1;
                if self.remaining == 0 {
                    self.state = AssembleState::WaitingForChecksum;
                }
                Ok(None)
            }
            AssembleState::WaitingForChecksum => {
                self.sum.add(byte);
                let valid = self.sum.is_valid();
                let frame = core::mem::take(&mut self.frame);
                self.reset();
                if valid {
                    Ok(Some(frame))
                } else {
                    Err(FrameError::InvalidChecksum)
                }
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    #[test]
    fn test_frame_encode_empty_payload() {
        let frame = Frame::new();
        let mut buffer = [0u8; 4];
        let len = frame.encode(&mut buffer).unwrap();

        assert_eq!(len, 2);
        assert_eq!(buffer[0], 2); // length
        assert_eq!(buffer[1], 0xFE); // -(2)
    }

    #[test]
    fn test_frame_encode_keyboard_reply() {
        let frame = Frame::from_slice(&[0x04, 0x85]).unwrap();
        let encoded = frame.encode_to_vec().unwrap();

        assert_eq!(encoded.as_slice(), &[0x04, 0x04, 0x85, 0x73]);
    }

    #[test]
    fn test_frame_encode_buffer_too_small() {
        let frame = Frame::from_slice(&[1, 2, 3]).unwrap();
        let mut buffer = [0u8; 4];
        assert_eq!(frame.encode(&mut buffer), Err(FrameError::BufferTooSmall));
    }

    #[test]
    fn test_payload_too_large() {
        let large_payload = [0u8; MAX_PAYLOAD_LEN + 1];
        assert_eq!(
            Frame::from_slice(&large_payload),
            Err(FrameError::PayloadTooLarge)
        );

        let mut frame = Frame::from_slice(&[0u8; MAX_PAYLOAD_LEN]).unwrap();
        assert_eq!(frame.length_byte() as usize, MAX_FRAME_LEN);
        assert_eq!(frame.push(0), Err(FrameError::PayloadTooLarge));
    }

    #[test]
    fn test_rx_buffer_payload_excludes_checksum() {
        let mut rx = RxBuffer::new();
        assert_eq!(rx.payload(), &[] as &[u8]);

        for byte in [0x04, 0x85, 0x73] {
            rx.push(byte).unwrap();
        }
        assert_eq!(rx.len(), 3);
        assert_eq!(rx.payload(), &[0x04, 0x85]);
        assert_eq!(rx.as_slice().last(), Some(&0x73));

        rx.clear();
        assert!(rx.is_empty());
    }

    #[test]
    fn test_rx_buffer_never_exceeds_capacity() {
        let mut rx = RxBuffer::new();
        for i in 0..RX_MAX_LEN {
            rx.push(i as u8).unwrap();
        }
        assert!(rx.push(0).is_err());
        assert_eq!(rx.len(), RX_MAX_LEN);
    }

    #[test]
    fn test_assembler_roundtrip() {
        let original = Frame::from_slice(&[0x93, 0x06, 0x01, 0x02]).unwrap();
        let encoded = original.encode_to_vec().unwrap();

        let mut assembler = FrameAssembler::new();
        let (last, head) = encoded.split_last().unwrap();
        for &byte in head {
            assert_eq!(assembler.feed(byte), Ok(None));
        }
        assert_eq!(assembler.feed(*last), Ok(Some(original)));
    }

    #[test]
    fn test_assembler_invalid_checksum() {
        let frame = Frame::from_slice(&[1, 2]).unwrap();
        let mut encoded = frame.encode_to_vec().unwrap();
        let last_idx = encoded.len() - 1;
        encoded[last_idx] ^= 0xFF;

        let mut assembler = FrameAssembler::new();
        let (last, head) = encoded.split_last().unwrap();
        for &byte in head {
            assert_eq!(assembler.feed(byte), Ok(None));
        }
        assert_eq!(assembler.feed(*last), Err(FrameError::InvalidChecksum));
    }

    #[test]
    fn test_assembler_rejects_bad_length() {
        let mut assembler = FrameAssembler::new();
        assert_eq!(assembler.feed(0), Err(FrameError::InvalidLength(0)));
        assert_eq!(assembler.feed(1), Err(FrameError::InvalidLength(1)));
        assert_eq!(assembler.feed(15), Err(FrameError::InvalidLength(15)));

        // Still usable afterwards
        assert_eq!(assembler.feed(2), Ok(None));
        assert_eq!(assembler.feed(0xFE), Ok(Some(Frame::new())));
    }

    proptest! {
        #[test]
        fn prop_encoded_frame_sums_to_zero(payload in proptest::collection::vec(any::<u8>(), 0..=MAX_PAYLOAD_LEN)) {
            let frame = Frame::from_slice(&payload).unwrap();
            let encoded = frame.encode_to_vec().unwrap();

            prop_assert_eq!(encoded.len(), payload.len() + 2);
            prop_assert_eq!(encoded[0] as usize, encoded.len());

            let mut sum = Checksum::default();
            sum.add_all(&encoded);
            prop_assert!(sum.is_valid());
        }
    }
}
