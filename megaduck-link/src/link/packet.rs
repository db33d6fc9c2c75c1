//! Packet layer: framed send and receive built on acknowledged bytes
//!
//! Both operations run with only the serial interrupt enabled and put
//! the caller's mask back on every return path.

use megaduck_hal::{Clock, SerialPort};
use megaduck_protocol::{
    cmd, reply, Checksum, LinkError, RxBuffer, SendStage, TxBuffer, RX_MAX_LEN,
};

use super::Link;

impl<'m, P: SerialPort, C: Clock> Link<'m, P, C> {
    /// Send `command` followed by a framed copy of `tx`
    ///
    /// Every byte up to the checksum must be answered with
    /// `SEND_BUFFER_OK`, the checksum with `BUFFER_SEND_AND_CHECKSUM_OK`.
    /// Stops at the first missing acknowledgement without signalling the
    /// peripheral.
    pub fn send_buffer(&mut self, command: u8, tx: &TxBuffer) -> Result<(), LinkError> {
        let result = self.with_link_interrupt_only(|link| link.send_frame(command, tx));
        if let Err(e) = result {
            warn!("send buffer {=u8:#x} failed: {}", command, e);
        }
        result
    }

    /// Send `command` and read the framed reply
    ///
    /// On success the returned buffer holds the payload followed by the
    /// checksum byte. The peripheral is told OK on success and ABORT on
    /// any failure.
    pub fn receive_buffer(&mut self, command: u8) -> Result<&RxBuffer, LinkError> {
        self.with_link_interrupt_only(|link| {
            let result = link.receive_frame(command);
            match result {
                Ok(()) => link.send_byte(cmd::DONE_OR_OK),
                Err(e) => {
                    warn!("receive buffer {=u8:#x} failed: {}", command, e);
                    link.send_byte(cmd::ABORT_OR_FAIL);
                }
            }
            result
        })?;
        Ok(&self.rx)
    }

    fn send_frame(&mut self, command: u8, tx: &TxBuffer) -> Result<(), LinkError> {
        let length = tx.length_byte();
        let mut sum = Checksum::seeded(length);

        self.expect_ack(command, reply::SEND_BUFFER_OK, SendStage::Command)?;
        self.expect_ack(length, reply::SEND_BUFFER_OK, SendStage::Length)?;
        for (index, &byte) in tx.payload().iter().enumerate() {
            sum.add(byte);
            self.expect_ack(byte, reply::SEND_BUFFER_OK, SendStage::Payload(index as u8))?;
        }
        self.expect_ack(
            sum.twos_complement(),
            reply::BUFFER_SEND_AND_CHECKSUM_OK,
            SendStage::Checksum,
        )
    }

    fn expect_ack(&mut self, byte: u8, expected: u8, stage: SendStage) -> Result<(), LinkError> {
        if self.send_and_check_ack(byte, self.config.send_ack_timeout, expected) {
            Ok(())
        } else {
            Err(LinkError::NoAck(stage))
        }
    }

    fn receive_frame(&mut self, command: u8) -> Result<(), LinkError> {
        self.rx.clear();
        self.send_byte(command);

        let timeout = self.config.receive_timeout;
        let length = self.read_with_timeout(timeout).ok_or(LinkError::Timeout)?;
        if length == 0 || usize::from(length) > RX_MAX_LEN {
            return Err(LinkError::InvalidLength(length));
        }

        let mut sum = Checksum::seeded(length);
        for _ in 1..length {
            match self.read_with_timeout(timeout) {
                Some(byte) => {
                    self.rx
                        .push(byte)
                        .map_err(|_| LinkError::InvalidLength(length))?;
                    sum.add(byte);
                }
                None => {
                    sum.poison();
                    break;
                }
            }
        }

        if sum.is_valid() {
            Ok(())
        } else if self.rx.len() + 1 < usize::from(length) {
            // Ran out of time before the frame was complete
            Err(LinkError::Timeout)
        } else {
            debug!("checksum mismatch, sum {=u8:#x}", sum.sum());
            Err(LinkError::ChecksumInvalid)
        }
    }
}
