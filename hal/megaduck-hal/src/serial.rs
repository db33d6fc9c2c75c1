//! Serial link register abstractions
//!
//! The laptop link is the console's synchronous serial port: one data
//! register shifted out on an internal clock, or shifted in on the
//! peripheral's external clock. Completion raises the serial interrupt.

/// Serial bit in the interrupt enable / flag registers
pub const SERIAL_INTERRUPT: u8 = 0x08;

/// Clock source for a serial transfer
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum ClockSource {
    /// Console drives the clock (transmit)
    Internal,
    /// Peripheral drives the clock (receive)
    External,
}

/// Serial port registers plus the interrupt controller bits the link needs
///
/// All methods are single register accesses. Sequencing (settle delays,
/// arming, clearing) is the link engine's job, not the port's.
pub trait SerialPort {
    /// Write the laptop link-control register ahead of a transfer
    fn prepare_transfer(&mut self);

    /// Load the data register
    fn write_data(&mut self, byte: u8);

    /// Read the data register
    fn read_data(&mut self) -> u8;

    /// Start (or ready) a transfer with the given clock source
    fn start_transfer(&mut self, clock: ClockSource);

    /// Clear every pending interrupt flag
    fn clear_pending_interrupts(&mut self);

    /// Current interrupt enable mask
    fn interrupt_mask(&self) -> u8;

    /// Replace the interrupt enable mask
    fn set_interrupt_mask(&mut self, mask: u8);

    /// Enable interrupts globally
    fn enable_interrupts(&mut self);

    /// Disable interrupts globally
    fn disable_interrupts(&mut self);

    /// Zero the control and data registers
    fn reset(&mut self);

    /// Remove the serial bit from the enable mask
    ///
    /// Called from interrupt context; must stay a single mask write.
    fn mask_serial_interrupt(&mut self) {
        let mask = self.interrupt_mask();
        self.set_interrupt_mask(mask & !SERIAL_INTERRUPT);
    }
}
