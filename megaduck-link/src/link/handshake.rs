//! Cold boot handshake
//!
//! The host counts up 0..=255, the peripheral answers `BOOT_OK`, the host
//! requests the countdown and the peripheral sends 255..=0. The host
//! closes with OK, or ABORT if anything was off.

use megaduck_hal::{Clock, SerialPort};
use megaduck_protocol::{cmd, reply};

use super::Link;
use crate::config::{CountdownPolicy, ReplyWait};
use crate::error::HandshakeError;

impl<'m, P: SerialPort, C: Clock> Link<'m, P, C> {
    /// Run one handshake attempt
    ///
    /// Returns the first failure seen. A bad boot reply does not cut the
    /// attempt short: the countdown is still requested and read so the
    /// peripheral ends in a known state. Only the serial interrupt is
    /// enabled while the attempt runs.
    pub fn boot_handshake(&mut self) -> Result<(), HandshakeError> {
        self.with_link_interrupt_only(Self::handshake_attempt)
    }

    fn handshake_attempt(&mut self) -> Result<(), HandshakeError> {
        let mut failure = None;

        let mut counter: u8 = 0;
        loop {
            self.send_byte(counter);
            counter = counter.wrapping_add(1);
            if counter == 0 {
                break;
            }
        }

        let got = self.handshake_reply();
        if got != Some(reply::BOOT_OK) {
            failure = Some(HandshakeError::BootReply { got });
        }

        self.send_byte(cmd::INIT_SEQ_REQUEST);

        for expected in (0..=u8::MAX).rev() {
            let got = self.handshake_reply();
            if got == Some(expected) {
                continue;
            }
            if failure.is_none() {
                failure = Some(HandshakeError::Countdown { expected, got });
            }
            if self.config.handshake.countdown == CountdownPolicy::StopAtFirstMismatch {
                break;
            }
        }

        match failure {
            None => {
                self.send_byte(cmd::DONE_OR_OK);
                info!("laptop handshake ok");
                Ok(())
            }
            Some(e) => {
                self.send_byte(cmd::ABORT_OR_FAIL);
                debug!("laptop handshake failed: {}", e);
                Err(e)
            }
        }
    }

    /// Read one handshake reply in the configured wait mode
    pub(crate) fn handshake_reply(&mut self) -> Option<u8> {
        match self.config.handshake.reply_wait {
            ReplyWait::Blocking => Some(self.read_blocking()),
            ReplyWait::Bounded(units) => self.read_with_timeout(units),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::{HandshakeConfig, LinkConfig};
    use crate::mailbox::RxMailbox;
    use crate::sim::{Fault, LaptopPeer, PeerState, Simulator};

    fn config(countdown: CountdownPolicy, reply_wait: ReplyWait) -> LinkConfig {
        LinkConfig {
            handshake: HandshakeConfig {
                reply_wait,
                countdown,
                ..HandshakeConfig::default()
            },
            ..LinkConfig::default()
        }
    }

    #[test]
    fn test_handshake_success() {
        let mailbox = RxMailbox::new();
        let sim = Simulator::new(&mailbox, LaptopPeer::new());
        let mut link = Link::new(sim.port(), sim.clock(), &mailbox);

        assert_eq!(link.boot_handshake(), Ok(()));

        let sent = sim.sent();
        assert_eq!(sent.len(), 256 + 2);
        assert!(sent[..256].iter().enumerate().all(|(i, &b)| b == i as u8));
        assert_eq!(sent[256], cmd::INIT_SEQ_REQUEST);
        assert_eq!(sent[257], cmd::DONE_OR_OK);
        assert_eq!(sim.peer().state(), PeerState::Idle);
    }

    #[test]
    fn test_handshake_out_of_order_countdown() {
        for policy in [CountdownPolicy::ConsumeAll, CountdownPolicy::StopAtFirstMismatch] {
            let mailbox = RxMailbox::new();
            let sim = Simulator::new(&mailbox, LaptopPeer::new());
            sim.peer_mut().inject(Fault::CountdownByte {
                index: 10,
                value: 0x42,
            });
            let mut link = Link::with_config(
                sim.port(),
                sim.clock(),
                &mailbox,
                config(policy, ReplyWait::Blocking),
            )
            .unwrap();

            assert_eq!(
                link.boot_handshake(),
                Err(HandshakeError::Countdown {
                    expected: 245,
                    got: Some(0x42),
                })
            );
            assert_eq!(sim.sent().last(), Some(&cmd::ABORT_OR_FAIL));
            // Peripheral is back at the start, ready for a retry
            assert_eq!(sim.peer().state(), PeerState::CountingUp);
        }
    }

    #[test]
    fn test_consume_all_reads_whole_countdown() {
        let mailbox = RxMailbox::new();
        let sim = Simulator::new(&mailbox, LaptopPeer::new());
        sim.peer_mut().inject(Fault::CountdownByte { index: 0, value: 0 });
        let mut link = Link::new(sim.port(), sim.clock(), &mailbox);

        assert!(link.boot_handshake().is_err());
        assert_eq!(sim.delivered(), 1 + 256);
    }

    #[test]
    fn test_stop_at_first_mismatch_reads_less() {
        let mailbox = RxMailbox::new();
        let sim = Simulator::new(&mailbox, LaptopPeer::new());
        sim.peer_mut().inject(Fault::CountdownByte { index: 0, value: 0 });
        let mut link = Link::with_config(
            sim.port(),
            sim.clock(),
            &mailbox,
            config(CountdownPolicy::StopAtFirstMismatch, ReplyWait::Blocking),
        )
        .unwrap();

        assert!(link.boot_handshake().is_err());
        assert_eq!(sim.delivered(), 1 + 1);
    }

    #[test]
    fn test_bad_boot_reply_still_reads_countdown() {
        let mailbox = RxMailbox::new();
        let sim = Simulator::new(&mailbox, LaptopPeer::new());
        sim.peer_mut().inject(Fault::BootReply(0x04));
        let mut link = Link::new(sim.port(), sim.clock(), &mailbox);

        assert_eq!(
            link.boot_handshake(),
            Err(HandshakeError::BootReply { got: Some(0x04) })
        );
        assert_eq!(sim.sent()[256], cmd::INIT_SEQ_REQUEST);
        assert_eq!(sim.delivered(), 1 + 256);
    }

    #[test]
    fn test_bounded_wait_with_absent_peripheral() {
        let mailbox = RxMailbox::new();
        let sim = Simulator::new(&mailbox, LaptopPeer::new());
        sim.peer_mut().inject(Fault::Unresponsive);
        let mut link = Link::with_config(
            sim.port(),
            sim.clock(),
            &mailbox,
            config(CountdownPolicy::StopAtFirstMismatch, ReplyWait::Bounded(2)),
        )
        .unwrap();

        assert_eq!(
            link.boot_handshake(),
            Err(HandshakeError::BootReply { got: None })
        );
        assert_eq!(sim.sent().last(), Some(&cmd::ABORT_OR_FAIL));
    }
}
