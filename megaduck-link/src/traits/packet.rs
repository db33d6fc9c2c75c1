//! Packet exchange trait
//!
//! Adapters (keyboard, clock) only need framed send and receive, so they
//! are written against this trait rather than a concrete [`Link`].
//!
//! [`Link`]: crate::link::Link

use megaduck_hal::{Clock, SerialPort};
use megaduck_protocol::{LinkError, RxBuffer, TxBuffer};

use crate::link::Link;

/// Framed command exchange with the laptop peripheral
pub trait PacketLink {
    /// Send `command` and a framed payload, checking every acknowledgement
    fn send_buffer(&mut self, command: u8, tx: &TxBuffer) -> Result<(), LinkError>;

    /// Send `command` and read the framed reply
    ///
    /// The buffer holds the payload followed by the checksum byte.
    fn receive_buffer(&mut self, command: u8) -> Result<&RxBuffer, LinkError>;
}

impl<'m, P: SerialPort, C: Clock> PacketLink for Link<'m, P, C> {
    fn send_buffer(&mut self, command: u8, tx: &TxBuffer) -> Result<(), LinkError> {
        Link::send_buffer(self, command, tx)
    }

    fn receive_buffer(&mut self, command: u8) -> Result<&RxBuffer, LinkError> {
        Link::receive_buffer(self, command)
    }
}

impl<T: PacketLink + ?Sized> PacketLink for &mut T {
    fn send_buffer(&mut self, command: u8, tx: &TxBuffer) -> Result<(), LinkError> {
        (**self).send_buffer(command, tx)
    }

    fn receive_buffer(&mut self, command: u8) -> Result<&RxBuffer, LinkError> {
        (**self).receive_buffer(command)
    }
}
