//! Laptop real-time clock
//!
//! The clock is read and written as eight BCD bytes: year, month, day,
//! weekday, AM/PM, hour (0-11), minute, second. Years are two BCD digits;
//! 92-99 are 1992-1999 and 00-91 are 2000-2091, matching the system ROM
//! which starts at 1993.

use core::fmt;

use megaduck_link::PacketLink;
use megaduck_protocol::{cmd, TxBuffer};

use crate::error::PeripheralError;

/// Payload bytes in a clock frame
pub const RTC_PAYLOAD_LEN: usize = 8;

/// Bytes after LENGTH in a clock reply (payload plus checksum)
pub const RTC_REPLY_LEN: usize = RTC_PAYLOAD_LEN + 1;

/// Earliest representable year
pub const YEAR_MIN: u16 = 1992;

/// Latest representable year
pub const YEAR_MAX: u16 = 2091;

/// Clock value errors
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum RtcError {
    /// Year outside 1992..=2091
    YearOutOfRange(u16),
    /// A field does not fit its range
    FieldOutOfRange,
    /// A byte read from the laptop is not valid BCD
    InvalidBcd(u8),
}

impl fmt::Display for RtcError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            RtcError::YearOutOfRange(y) => write!(f, "year {} out of range", y),
            RtcError::FieldOutOfRange => f.write_str("date or time field out of range"),
            RtcError::InvalidBcd(b) => write!(f, "invalid BCD byte {:#04x}", b),
        }
    }
}

/// Convert 0..=99 to packed BCD
pub const fn to_bcd(value: u8) -> u8 {
    ((value / 10) << 4) | (value % 10)
}

/// Convert packed BCD to binary, rejecting digits above 9
pub fn from_bcd(bcd: u8) -> Result<u8, RtcError> {
    let (hi, lo) = (bcd >> 4, bcd & 0x0F);
    if hi > 9 || lo > 9 {
        return Err(RtcError::InvalidBcd(bcd));
    }
    Ok(hi * 10 + lo)
}

/// Calendar date and 12-hour time as kept by the laptop
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct RtcDateTime {
    /// Full year, 1992..=2091
    pub year: u16,
    /// 1..=12
    pub month: u8,
    /// 1..=31
    pub day: u8,
    /// 0..=6, Sunday first
    pub weekday: u8,
    /// Afternoon half of the day
    pub pm: bool,
    /// 0..=11
    pub hour: u8,
    pub minute: u8,
    pub second: u8,
}

impl Default for RtcDateTime {
    /// Power-on value of the Spanish laptop: 1993-06-01, Tuesday, 00:00:00 AM
    fn default() -> Self {
        Self {
            year: 1993,
            month: 6,
            day: 1,
            weekday: 2,
            pm: false,
            hour: 0,
            minute: 0,
            second: 0,
        }
    }
}

impl RtcDateTime {
    /// Check every field against its range
    pub fn validate(&self) -> Result<(), RtcError> {
        if !(YEAR_MIN..=YEAR_MAX).contains(&self.year) {
            return Err(RtcError::YearOutOfRange(self.year));
        }
        let in_range = (1..=12).contains(&self.month)
            && (1..=31).contains(&self.day)
            && self.weekday <= 6
            && self.hour <= 11
            && self.minute <= 59
            && self.second <= 59;
        if in_range {
            Ok(())
        } else {
            Err(RtcError::FieldOutOfRange)
        }
    }

    /// Encode as the eight BCD payload bytes
    pub fn to_bcd_payload(&self) -> Result<[u8; RTC_PAYLOAD_LEN], RtcError> {
        self.validate()?;
        let year = (self.year % 100) as u8;
        Ok([
            to_bcd(year),
            to_bcd(self.month),
            to_bcd(self.day),
            to_bcd(self.weekday),
            to_bcd(self.pm as u8),
            to_bcd(self.hour),
            to_bcd(self.minute),
            to_bcd(self.second),
        ])
    }

    /// Decode the eight BCD payload bytes
    pub fn from_bcd_payload(payload: &[u8; RTC_PAYLOAD_LEN]) -> Result<Self, RtcError> {
        let mut fields = [0u8; RTC_PAYLOAD_LEN];
        for (field, &bcd) in fields.iter_mut().zip(payload) {
            *field = from_bcd(bcd)?;
        }
        let [year, month, day, weekday, ampm, hour, minute, second] = fields;

        let century = if year >= 92 { 1900 } else { 2000 };
        let dt = Self {
            year: century + u16::from(year),
            month,
            day,
            weekday,
            pm: match ampm {
                0 => false,
                1 => true,
                _ => return Err(RtcError::FieldOutOfRange),
            },
            hour,
            minute,
            second,
        };
        dt.validate()?;
        Ok(dt)
    }
}

/// Clock commands
pub struct Rtc;

impl Rtc {
    /// Write the laptop clock
    pub fn set<L: PacketLink>(link: &mut L, dt: &RtcDateTime) -> Result<(), PeripheralError> {
        let payload = dt.to_bcd_payload()?;
        let tx = TxBuffer::from_slice(&payload)?;
        link.send_buffer(cmd::RTC_SET_DATE_AND_TIME, &tx)?;
        Ok(())
    }

    /// Read the laptop clock
    pub fn get<L: PacketLink>(link: &mut L) -> Result<RtcDateTime, PeripheralError> {
        let rx = link.receive_buffer(cmd::RTC_GET_DATE_AND_TIME)?;
        let payload: &[u8; RTC_PAYLOAD_LEN] = rx
            .payload()
            .try_into()
            .map_err(|_| PeripheralError::UnexpectedLength(rx.len()))?;
        Ok(RtcDateTime::from_bcd_payload(payload)?)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use megaduck_link::sim::{LaptopPeer, Simulator};
    use megaduck_link::{Link, LinkError, RxMailbox, SendStage};
    use proptest::prelude::*;

    #[test]
    fn test_bcd() {
        assert_eq!(to_bcd(0), 0x00);
        assert_eq!(to_bcd(12), 0x12);
        assert_eq!(to_bcd(93), 0x93);
        assert_eq!(from_bcd(0x59), Ok(59));
        assert_eq!(from_bcd(0x1A), Err(RtcError::InvalidBcd(0x1A)));
    }

    #[test]
    fn test_default_payload() {
        let payload = RtcDateTime::default().to_bcd_payload().unwrap();
        assert_eq!(payload, [0x93, 0x06, 0x01, 0x02, 0x00, 0x00, 0x00, 0x00]);
    }

    #[test]
    fn test_century_window() {
        let mut payload = [0x92, 0x01, 0x01, 0x00, 0x00, 0x00, 0x00, 0x00];
        assert_eq!(RtcDateTime::from_bcd_payload(&payload).unwrap().year, 1992);
        payload[0] = 0x91;
        assert_eq!(RtcDateTime::from_bcd_payload(&payload).unwrap().year, 2091);
        payload[0] = 0x00;
        assert_eq!(RtcDateTime::from_bcd_payload(&payload).unwrap().year, 2000);
    }

    #[test]
    fn test_all_fields_encoded_as_bcd() {
        let dt = RtcDateTime {
            year: 2024,
            month: 12,
            day: 31,
            weekday: 2,
            pm: true,
            hour: 11,
            minute: 45,
            second: 30,
        };
        assert_eq!(
            dt.to_bcd_payload(),
            Ok([0x24, 0x12, 0x31, 0x02, 0x01, 0x11, 0x45, 0x30])
        );
    }

    #[test]
    fn test_out_of_range_rejected() {
        let dt = RtcDateTime {
            year: 1991,
            ..RtcDateTime::default()
        };
        assert_eq!(dt.to_bcd_payload(), Err(RtcError::YearOutOfRange(1991)));

        let dt = RtcDateTime {
            hour: 12,
            ..RtcDateTime::default()
        };
        assert_eq!(dt.to_bcd_payload(), Err(RtcError::FieldOutOfRange));

        let payload = [0x93, 0x13, 0x01, 0x02, 0x00, 0x00, 0x00, 0x00];
        assert_eq!(
            RtcDateTime::from_bcd_payload(&payload),
            Err(RtcError::FieldOutOfRange)
        );
    }

    #[test]
    fn test_set_then_get_1993() {
        let mailbox = RxMailbox::new();
        let sim = Simulator::new(&mailbox, LaptopPeer::ready().with_rtc([0; 8]));
        let mut link = Link::new(sim.port(), sim.clock(), &mailbox);
        let dt = RtcDateTime {
            year: 1993,
            month: 3,
            day: 14,
            weekday: 0,
            pm: true,
            hour: 3,
            minute: 15,
            second: 9,
        };

        Rtc::set(&mut link, &dt).unwrap();

        let sent = sim.sent();
        assert_eq!(sent[0], cmd::RTC_SET_DATE_AND_TIME);
        assert_eq!(sent[1], 10);
        assert_eq!(sent[2], 0x93);
        assert_eq!(sim.peer().rtc()[0], 0x93);

        assert_eq!(Rtc::get(&mut link), Ok(dt));
    }

    #[test]
    fn test_get_power_on_default() {
        let mailbox = RxMailbox::new();
        let sim = Simulator::new(&mailbox, LaptopPeer::ready());
        let mut link = Link::new(sim.port(), sim.clock(), &mailbox);

        assert_eq!(Rtc::get(&mut link), Ok(RtcDateTime::default()));
    }

    #[test]
    fn test_get_rejects_short_reply() {
        let mailbox = RxMailbox::new();
        let sim = Simulator::new(&mailbox, LaptopPeer::ready());
        sim.peer_mut().queue_reply(&[0x04, 0x93, 0x06, 0x63]);
        let mut link = Link::new(sim.port(), sim.clock(), &mailbox);

        assert_eq!(Rtc::get(&mut link), Err(PeripheralError::UnexpectedLength(3)));
    }

    #[test]
    fn test_set_reports_link_failure() {
        let mailbox = RxMailbox::new();
        let sim = Simulator::new(&mailbox, LaptopPeer::ready());
        sim.peer_mut()
            .inject(megaduck_link::sim::Fault::NackSendByte(1));
        let mut link = Link::new(sim.port(), sim.clock(), &mailbox);

        assert_eq!(
            Rtc::set(&mut link, &RtcDateTime::default()),
            Err(PeripheralError::Link(LinkError::NoAck(SendStage::Length)))
        );
    }

    fn arb_datetime() -> impl Strategy<Value = RtcDateTime> {
        (
            YEAR_MIN..=YEAR_MAX,
            1u8..=12,
            1u8..=31,
            0u8..=6,
            any::<bool>(),
            0u8..=11,
            0u8..=59,
            0u8..=59,
        )
            .prop_map(|(year, month, day, weekday, pm, hour, minute, second)| {
                RtcDateTime {
                    year,
                    month,
                    day,
                    weekday,
                    pm,
                    hour,
                    minute,
                    second,
                }
            })
    }

    proptest! {
        #[test]
        fn prop_bcd_payload_decodes_back(dt in arb_datetime()) {
            let payload = dt.to_bcd_payload().unwrap();
            prop_assert_eq!(RtcDateTime::from_bcd_payload(&payload), Ok(dt));
        }
    }
}
