//! Timeout-bounded single byte receive

use megaduck_hal::{Clock, SerialPort};

use super::Link;

impl<'m, P: SerialPort, C: Clock> Link<'m, P, C> {
    /// Wait for one byte with no bound
    ///
    /// Only used where the peripheral is assumed present.
    pub fn read_blocking(&mut self) -> u8 {
        self.mailbox.clear();
        self.enable_receive();
        loop {
            if let Some(byte) = self.mailbox.received() {
                return byte;
            }
            self.clock.delay_us(self.config.poll_interval_micros);
        }
    }

    /// Wait up to `units` timing units for one byte
    ///
    /// The flag is polled every poll interval, so a byte is returned as
    /// soon as it arrives rather than when the budget runs out.
    pub fn read_with_timeout(&mut self, units: u8) -> Option<u8> {
        self.mailbox.clear();
        self.enable_receive();

        let budget = self.config.units_to_micros(units);
        let start = self.clock.now_micros();
        loop {
            if let Some(byte) = self.mailbox.received() {
                return Some(byte);
            }
            if self.clock.elapsed_since(start) >= budget {
                break;
            }
            self.clock.delay_us(self.config.poll_interval_micros);
        }

        // A byte may have landed during the last pause
        self.mailbox.received()
    }

    /// Send `byte` and check the reply
    ///
    /// True only if a reply arrived within `units` and equals
    /// `expected`. Timeout and a wrong reply are not told apart.
    pub fn send_and_check_ack(&mut self, byte: u8, units: u8, expected: u8) -> bool {
        self.send_byte(byte);
        self.read_with_timeout(units) == Some(expected)
    }
}
