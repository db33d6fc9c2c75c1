//! One-slot receive mailbox shared with the serial interrupt
//!
//! The interrupt handler is the only writer of the byte/flag pair and
//! mainline code the only one that clears it. The handler masks its own
//! interrupt source, so at most one unconsumed byte is ever pending.

use core::sync::atomic::{AtomicBool, AtomicU8, Ordering};

use megaduck_hal::SerialPort;

/// Latched received byte plus its "received" flag
///
/// Only atomic loads and stores are used, so this works on cores
/// without atomic read-modify-write instructions.
#[derive(Debug)]
pub struct RxMailbox {
    received: AtomicBool,
    data: AtomicU8,
}

impl Default for RxMailbox {
    fn default() -> Self {
        Self::new()
    }
}

impl RxMailbox {
    /// Create an empty mailbox (usable in a `static`)
    pub const fn new() -> Self {
        Self {
            received: AtomicBool::new(false),
            data: AtomicU8::new(0),
        }
    }

    /// Forget any latched byte before arming a new receive
    pub fn clear(&self) {
        self.received.store(false, Ordering::Release);
    }

    /// Store a byte and raise the flag (interrupt context)
    pub fn latch(&self, byte: u8) {
        self.data.store(byte, Ordering::Relaxed);
        self.received.store(true, Ordering::Release);
    }

    /// True once a byte has been latched since the last `clear`
    pub fn is_set(&self) -> bool {
        self.received.load(Ordering::Acquire)
    }

    /// The latched byte, if the flag is set
    pub fn received(&self) -> Option<u8> {
        if self.is_set() {
            Some(self.data.load(Ordering::Relaxed))
        } else {
            None
        }
    }
}

/// Serial interrupt handler body
///
/// Latches the data register into `mailbox`, sets the flag and removes
/// the serial bit from the enable mask. Bind it to the serial vector:
///
/// ```ignore
/// static MAILBOX: RxMailbox = RxMailbox::new();
///
/// #[interrupt]
/// fn SERIAL() {
///     on_byte_interrupt(&MAILBOX, &mut MmioPort::new(bus));
/// }
/// ```
pub fn on_byte_interrupt<P: SerialPort + ?Sized>(mailbox: &RxMailbox, port: &mut P) {
    let byte = port.read_data();
    mailbox.latch(byte);
    port.mask_serial_interrupt();
}

#[cfg(test)]
mod tests {
    use super::*;
    use megaduck_hal::{ClockSource, SERIAL_INTERRUPT};

    /// Mock port that only tracks the data register and enable mask
    struct MockPort {
        data: u8,
        ie: u8,
        reads: u32,
    }

    impl SerialPort for MockPort {
        fn prepare_transfer(&mut self) {}
        fn write_data(&mut self, byte: u8) {
            self.data = byte;
        }
        fn read_data(&mut self) -> u8 {
            self.reads += 1;
            self.data
        }
        fn start_transfer(&mut self, _clock: ClockSource) {}
        fn clear_pending_interrupts(&mut self) {}
        fn interrupt_mask(&self) -> u8 {
            self.ie
        }
        fn set_interrupt_mask(&mut self, mask: u8) {
            self.ie = mask;
        }
        fn enable_interrupts(&mut self) {}
        fn disable_interrupts(&mut self) {}
        fn reset(&mut self) {}
    }

    #[test]
    fn test_new_mailbox_is_empty() {
        let mailbox = RxMailbox::new();
        assert!(!mailbox.is_set());
        assert_eq!(mailbox.received(), None);
    }

    #[test]
    fn test_latch_and_clear() {
        let mailbox = RxMailbox::new();
        mailbox.latch(0x42);
        assert_eq!(mailbox.received(), Some(0x42));

        mailbox.clear();
        assert_eq!(mailbox.received(), None);
        assert!(!mailbox.is_set());
    }

    #[test]
    fn test_interrupt_latches_and_disarms() {
        let mailbox = RxMailbox::new();
        let mut port = MockPort {
            data: 0x85,
            ie: SERIAL_INTERRUPT | 0x01,
            reads: 0,
        };

        on_byte_interrupt(&mailbox, &mut port);

        assert_eq!(mailbox.received(), Some(0x85));
        assert_eq!(port.reads, 1);
        // Serial source masked, other sources untouched
        assert_eq!(port.ie, 0x01);
    }
}
