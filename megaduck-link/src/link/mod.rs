//! The link engine
//!
//! [`Link`] owns the serial port and clock for one physical link and
//! borrows the interrupt mailbox. Byte transport lives here; the
//! timeout receive, packet layer, handshake and startup sequence are
//! implemented in the submodules on the same type.

mod handshake;
mod packet;
mod receive;
mod startup;

pub use startup::StartupReport;

use megaduck_hal::{ClockSource, Clock, SerialPort, SERIAL_INTERRUPT};
use megaduck_protocol::RxBuffer;

use crate::config::{ConfigError, LinkConfig};
use crate::mailbox::RxMailbox;

/// Serial link to the laptop peripheral
pub struct Link<'m, P, C> {
    port: P,
    clock: C,
    mailbox: &'m RxMailbox,
    config: LinkConfig,
    rx: RxBuffer,
}

impl<'m, P: SerialPort, C: Clock> Link<'m, P, C> {
    /// Create a link with the default (system ROM) timings
    pub fn new(port: P, clock: C, mailbox: &'m RxMailbox) -> Self {
        Self {
            port,
            clock,
            mailbox,
            config: LinkConfig::default(),
            rx: RxBuffer::new(),
        }
    }

    /// Create a link with custom timings
    pub fn with_config(
        port: P,
        clock: C,
        mailbox: &'m RxMailbox,
        config: LinkConfig,
    ) -> Result<Self, ConfigError> {
        config.validate()?;
        Ok(Self {
            config,
            ..Self::new(port, clock, mailbox)
        })
    }

    pub fn config(&self) -> &LinkConfig {
        &self.config
    }

    pub fn port(&self) -> &P {
        &self.port
    }

    pub fn port_mut(&mut self) -> &mut P {
        &mut self.port
    }

    pub fn clock_mut(&mut self) -> &mut C {
        &mut self.clock
    }

    pub fn mailbox(&self) -> &'m RxMailbox {
        self.mailbox
    }

    /// Buffer filled by the last successful [`receive_buffer`](Self::receive_buffer)
    pub fn rx_buffer(&self) -> &RxBuffer {
        &self.rx
    }

    /// Give back the port and clock
    pub fn release(self) -> (P, C) {
        (self.port, self.clock)
    }

    /// Shift one byte out on the internal clock
    ///
    /// Waits the settle time, then leaves the port ready to receive on
    /// the peripheral's clock. No acknowledgement is read.
    pub fn send_byte(&mut self, byte: u8) {
        self.port.prepare_transfer();
        self.port.write_data(byte);
        self.port.start_transfer(ClockSource::Internal);
        self.wait_units(self.config.settle_units);
        self.port.clear_pending_interrupts();
        self.port.start_transfer(ClockSource::External);
    }

    /// Arm the port for one externally clocked byte
    ///
    /// The serial interrupt stays enabled until the handler masks it
    /// again on receipt.
    pub fn enable_receive(&mut self) {
        self.port.prepare_transfer();
        self.port.start_transfer(ClockSource::External);
        let mask = self.port.interrupt_mask();
        self.port.set_interrupt_mask(mask | SERIAL_INTERRUPT);
        self.port.clear_pending_interrupts();
        self.port.enable_interrupts();
    }

    /// Run `f` with only the serial interrupt enabled, then restore the
    /// previous mask
    pub(crate) fn with_link_interrupt_only<T>(&mut self, f: impl FnOnce(&mut Self) -> T) -> T {
        let saved = self.port.interrupt_mask();
        self.port.set_interrupt_mask(SERIAL_INTERRUPT);
        let result = f(self);
        self.port.set_interrupt_mask(saved);
        result
    }

    fn wait_units(&mut self, units: u8) {
        for _ in 0..units {
            self.clock.delay_us(self.config.unit_micros);
        }
    }
}
