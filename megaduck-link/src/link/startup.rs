//! Startup sequence: handshake with retries, then the vendor query

use megaduck_hal::{Clock, SerialPort, SERIAL_INTERRUPT};
use megaduck_protocol::cmd;

use super::Link;
use crate::config::RetryPolicy;
use crate::error::HandshakeError;

/// Outcome of a successful startup
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct StartupReport {
    /// Handshake attempts made, including the successful one
    pub attempts: u32,
    /// Reply to `INIT_UNKNOWN_0X09`; its meaning is not known
    pub vendor_reply: Option<u8>,
}

impl<'m, P: SerialPort, C: Clock> Link<'m, P, C> {
    /// Bring the link up
    ///
    /// Runs with interrupts globally disabled, the enable mask cut down to
    /// the serial bit and the port reset. Retries the handshake per the
    /// configured [`RetryPolicy`] and sends the `INIT_UNKNOWN_0X09` query
    /// on success. Finally restores the enable mask and turns interrupts
    /// back on. On failure the error of the last attempt is returned.
    pub fn startup(&mut self) -> Result<StartupReport, HandshakeError> {
        self.port.disable_interrupts();
        let saved = self.port.interrupt_mask();
        self.port.set_interrupt_mask(SERIAL_INTERRUPT);
        self.port.reset();

        let result = self.handshake_with_retry().map(|attempts| {
            self.send_byte(cmd::INIT_UNKNOWN_0X09);
            let vendor_reply = self.handshake_reply();
            StartupReport {
                attempts,
                vendor_reply,
            }
        });

        self.port.set_interrupt_mask(saved);
        self.port.enable_interrupts();
        result
    }

    fn handshake_with_retry(&mut self) -> Result<u32, HandshakeError> {
        let mut attempts: u32 = 0;
        loop {
            attempts = attempts.saturating_add(1);
            match self.boot_handshake() {
                Ok(()) => return Ok(attempts),
                Err(e) => {
                    if let RetryPolicy::Attempts(limit) = self.config.handshake.retry {
                        if attempts >= u32::from(limit) {
                            warn!("laptop not detected after {} attempts", attempts);
                            return Err(e);
                        }
                    }
                    debug!("handshake attempt {} failed, retrying", attempts);
                }
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::{HandshakeConfig, LinkConfig, ReplyWait};
    use crate::mailbox::RxMailbox;
    use crate::sim::{Fault, LaptopPeer, Simulator};
    use megaduck_hal::ClockSource;

    /// Port wrapper recording the enable mask each time interrupts go on
    struct MaskSpy<P> {
        inner: P,
        masks_when_enabled: Vec<u8>,
    }

    impl<P> MaskSpy<P> {
        fn new(inner: P) -> Self {
            Self {
                inner,
                masks_when_enabled: Vec::new(),
            }
        }
    }

    impl<P: SerialPort> SerialPort for MaskSpy<P> {
        fn prepare_transfer(&mut self) {
            self.inner.prepare_transfer();
        }
        fn write_data(&mut self, byte: u8) {
            self.inner.write_data(byte);
        }
        fn read_data(&mut self) -> u8 {
            self.inner.read_data()
        }
        fn start_transfer(&mut self, clock: ClockSource) {
            self.inner.start_transfer(clock);
        }
        fn clear_pending_interrupts(&mut self) {
            self.inner.clear_pending_interrupts();
        }
        fn interrupt_mask(&self) -> u8 {
            self.inner.interrupt_mask()
        }
        fn set_interrupt_mask(&mut self, mask: u8) {
            self.inner.set_interrupt_mask(mask);
        }
        fn enable_interrupts(&mut self) {
            self.masks_when_enabled.push(self.inner.interrupt_mask());
            self.inner.enable_interrupts();
        }
        fn disable_interrupts(&mut self) {
            self.inner.disable_interrupts();
        }
        fn reset(&mut self) {
            self.inner.reset();
        }
    }

    #[test]
    fn test_startup_first_try() {
        let mailbox = RxMailbox::new();
        let sim = Simulator::new(&mailbox, LaptopPeer::new().with_vendor_reply(0x5A));
        let mut link = Link::new(sim.port(), sim.clock(), &mailbox);
        link.port_mut().set_interrupt_mask(0x01);

        let report = link.startup().unwrap();

        assert_eq!(
            report,
            StartupReport {
                attempts: 1,
                vendor_reply: Some(0x5A),
            }
        );
        assert_eq!(sim.sent().last(), Some(&cmd::INIT_UNKNOWN_0X09));
        let regs = sim.registers();
        assert_eq!(regs.ie, 0x01);
        assert!(regs.ime);
    }

    #[test]
    fn test_startup_retries_until_success() {
        let mailbox = RxMailbox::new();
        let sim = Simulator::new(&mailbox, LaptopPeer::new());
        sim.peer_mut().inject(Fault::BootReply(0x00));
        sim.peer_mut().inject(Fault::BootReply(0x00));
        let mut link = Link::new(sim.port(), sim.clock(), &mailbox);

        let report = link.startup().unwrap();

        assert_eq!(report.attempts, 3);
        assert_eq!(sim.peer().handshakes(), 1);
    }

    #[test]
    fn test_startup_gives_up_after_attempts() {
        let mailbox = RxMailbox::new();
        let sim = Simulator::new(&mailbox, LaptopPeer::new());
        sim.peer_mut().inject(Fault::Unresponsive);
        let config = LinkConfig {
            handshake: HandshakeConfig {
                reply_wait: ReplyWait::Bounded(2),
                retry: RetryPolicy::Attempts(3),
                ..HandshakeConfig::default()
            },
            ..LinkConfig::default()
        };
        let mut link = Link::with_config(sim.port(), sim.clock(), &mailbox, config).unwrap();
        link.port_mut().set_interrupt_mask(0x01);

        let result = link.startup();

        assert_eq!(result, Err(HandshakeError::BootReply { got: None }));
        // Three full count-ups, no vendor query
        let sent = sim.sent();
        assert_eq!(sent.iter().filter(|&&b| b == 0xFF).count(), 3);
        assert_ne!(sent.last(), Some(&cmd::INIT_UNKNOWN_0X09));
        assert_eq!(sim.registers().ie, 0x01);
    }

    #[test]
    fn test_startup_enables_only_serial_interrupt() {
        let mailbox = RxMailbox::new();
        let sim = Simulator::new(&mailbox, LaptopPeer::new());
        let mut link = Link::new(MaskSpy::new(sim.port()), sim.clock(), &mailbox);
        link.port_mut().set_interrupt_mask(0x01);

        link.startup().unwrap();

        let (spy, _) = link.release();
        let (last, during) = spy.masks_when_enabled.split_last().unwrap();
        // Countdown and vendor reply reads all ran with interrupts on
        assert!(during.len() >= 257);
        assert!(during.iter().all(|&mask| mask == SERIAL_INTERRUPT));
        assert_eq!(*last, 0x01);
        assert_eq!(sim.registers().ie, 0x01);
    }

    #[test]
    fn test_boot_handshake_masks_other_sources() {
        let mailbox = RxMailbox::new();
        let sim = Simulator::new(&mailbox, LaptopPeer::new());
        let mut link = Link::new(MaskSpy::new(sim.port()), sim.clock(), &mailbox);
        link.port_mut().set_interrupt_mask(0x05);

        link.boot_handshake().unwrap();

        assert_eq!(link.port().interrupt_mask(), 0x05);
        let (spy, _) = link.release();
        assert!(!spy.masks_when_enabled.is_empty());
        assert!(spy
            .masks_when_enabled
            .iter()
            .all(|&mask| mask == SERIAL_INTERRUPT));
    }
}
