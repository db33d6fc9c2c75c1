//! Serial and interrupt registers
//!
//! Game Boy compatible serial block, plus the laptop link control
//! register at 0xFF60 which the system ROM writes before every transfer.

use megaduck_hal::{ClockSource, SerialPort, VideoMemory};

use crate::bus::RegisterBus;

/// Serial control register bits
pub mod sc {
    /// Start a transfer (internal clock) or become ready (external clock)
    pub const XFER_START: u8 = 0x80;
    /// Console drives the clock
    pub const CLOCK_INTERNAL: u8 = 0x01;
    /// Peripheral drives the clock
    pub const CLOCK_EXTERNAL: u8 = 0x00;
}

/// Register addresses used by the port
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct RegisterMap {
    /// Serial data (SB)
    pub sb: u16,
    /// Serial control (SC)
    pub sc: u16,
    /// Interrupt flags (IF)
    pub iflag: u16,
    /// Interrupt enable (IE)
    pub ie: u16,
    /// Laptop link control
    pub link_ctrl: u16,
    /// Value written to link control before each transfer
    pub link_ctrl_before_xfer: u8,
}

impl Default for RegisterMap {
    fn default() -> Self {
        Self {
            sb: 0xFF01,
            sc: 0xFF02,
            iflag: 0xFF0F,
            ie: 0xFFFF,
            link_ctrl: 0xFF60,
            link_ctrl_before_xfer: 0x00,
        }
    }
}

/// Serial port and VRAM access through a [`RegisterBus`]
pub struct MmioPort<B> {
    bus: B,
    map: RegisterMap,
}

impl<B: RegisterBus> MmioPort<B> {
    pub fn new(bus: B, map: RegisterMap) -> Self {
        Self { bus, map }
    }

    pub fn map(&self) -> &RegisterMap {
        &self.map
    }

    pub fn bus(&self) -> &B {
        &self.bus
    }

    pub fn release(self) -> B {
        self.bus
    }
}

impl<B: RegisterBus> SerialPort for MmioPort<B> {
    fn prepare_transfer(&mut self) {
        self.bus
            .write8(self.map.link_ctrl, self.map.link_ctrl_before_xfer);
    }

    fn write_data(&mut self, byte: u8) {
        self.bus.write8(self.map.sb, byte);
    }

    fn read_data(&mut self) -> u8 {
        self.bus.read8(self.map.sb)
    }

    fn start_transfer(&mut self, clock: ClockSource) {
        let bits = match clock {
            ClockSource::Internal => sc::XFER_START | sc::CLOCK_INTERNAL,
            ClockSource::External => sc::XFER_START | sc::CLOCK_EXTERNAL,
        };
        self.bus.write8(self.map.sc, bits);
    }

    fn clear_pending_interrupts(&mut self) {
        self.bus.write8(self.map.iflag, 0);
    }

    fn interrupt_mask(&self) -> u8 {
        self.bus.read8(self.map.ie)
    }

    fn set_interrupt_mask(&mut self, mask: u8) {
        self.bus.write8(self.map.ie, mask);
    }

    fn enable_interrupts(&mut self) {
        self.bus.set_master_interrupt(true);
    }

    fn disable_interrupts(&mut self) {
        self.bus.set_master_interrupt(false);
    }

    fn reset(&mut self) {
        self.bus.write8(self.map.sc, 0);
        self.bus.write8(self.map.sb, 0);
    }
}

impl<B: RegisterBus> VideoMemory for MmioPort<B> {
    fn read_vram(&mut self, addr: u16) -> u8 {
        self.bus.read8(addr)
    }
}
