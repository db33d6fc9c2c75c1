//! Scripted laptop peripheral
//!
//! Plays the peripheral side of every dialogue the host uses: the boot
//! handshake, keyboard and clock reads, clock writes and the vendor
//! query. One-shot [`Fault`]s bend a single reply to exercise the
//! host's failure paths.

use std::collections::VecDeque;

use megaduck_protocol::{cmd, reply, Frame, FrameAssembler};

use super::{Outbox, PeerBehavior};

/// Power-on clock: 1993-06-01, Tuesday, 00:00:00 AM
const POWER_ON_RTC: [u8; 8] = [0x93, 0x06, 0x01, 0x02, 0x00, 0x00, 0x00, 0x00];

/// Misbehaviour to inject into the next matching reply
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Fault {
    /// Answer the count-up with this byte instead of `BOOT_OK`
    BootReply(u8),
    /// Replace one countdown byte (index 0 is the 255)
    CountdownByte { index: u8, value: u8 },
    /// Send a reply frame with a wrong checksum
    CorruptReplyChecksum,
    /// Send a reply frame with this LENGTH byte
    ReplyLength(u8),
    /// Stop a reply frame after this many bytes
    TruncateReply(usize),
    /// Answer this byte of a send exchange with ABORT (0 is the command)
    NackSendByte(usize),
    /// Do not answer this byte of a send exchange
    SilentSendByte(usize),
    /// Never answer anything again
    Unresponsive,
}

/// Dialogue position of the peer
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PeerState {
    /// Expecting the 0..=255 count-up
    CountingUp,
    /// Count-up answered, expecting `INIT_SEQ_REQUEST`
    AwaitInitRequest,
    /// Countdown queued, expecting OK or ABORT
    AwaitHandshakeVerdict,
    /// Ready for a command
    Idle,
    /// Reply frame queued, expecting OK or ABORT
    AwaitReceiveVerdict,
    /// Taking a frame from the host
    ReceivingFrame,
}

/// Model of the laptop peripheral
#[derive(Debug)]
pub struct LaptopPeer {
    state: PeerState,
    counted: u16,
    count_ok: bool,
    assembler: FrameAssembler,
    exchange_index: usize,
    command: u8,
    keys: VecDeque<(u8, u8)>,
    rtc: [u8; 8],
    vendor_reply: u8,
    scripted: Option<Vec<u8>>,
    faults: Vec<Fault>,
    verdicts: Vec<u8>,
    handshakes: u32,
    last_frame: Option<Vec<u8>>,
}

impl Default for LaptopPeer {
    fn default() -> Self {
        Self::new()
    }
}

impl LaptopPeer {
    /// A peer fresh from power-on, waiting for the handshake
    pub fn new() -> Self {
        Self {
            state: PeerState::CountingUp,
            counted: 0,
            count_ok: true,
            assembler: FrameAssembler::new(),
            exchange_index: 0,
            command: 0,
            keys: VecDeque::new(),
            rtc: POWER_ON_RTC,
            vendor_reply: 0x00,
            scripted: None,
            faults: Vec::new(),
            verdicts: Vec::new(),
            handshakes: 0,
            last_frame: None,
        }
    }

    /// A peer that has already completed the handshake
    pub fn ready() -> Self {
        Self {
            state: PeerState::Idle,
            ..Self::new()
        }
    }

    pub fn with_vendor_reply(mut self, byte: u8) -> Self {
        self.vendor_reply = byte;
        self
    }

    /// Preset the clock registers (BCD)
    pub fn with_rtc(mut self, rtc: [u8; 8]) -> Self {
        self.rtc = rtc;
        self
    }

    /// Queue a keyboard report for the next key read
    pub fn press(&mut self, flags: u8, scancode: u8) {
        self.keys.push_back((flags, scancode));
    }

    /// Answer the next command with `frame` verbatim
    pub fn queue_reply(&mut self, frame: &[u8]) {
        self.scripted = Some(frame.to_vec());
    }

    pub fn inject(&mut self, fault: Fault) {
        self.faults.push(fault);
    }

    pub fn state(&self) -> PeerState {
        self.state
    }

    /// Clock registers (BCD)
    pub fn rtc(&self) -> [u8; 8] {
        self.rtc
    }

    /// OK / ABORT bytes received after each reply frame
    pub fn verdicts(&self) -> &[u8] {
        &self.verdicts
    }

    /// Completed handshakes
    pub fn handshakes(&self) -> u32 {
        self.handshakes
    }

    /// Payload of the last frame accepted from the host
    pub fn last_frame(&self) -> Option<&[u8]> {
        self.last_frame.as_deref()
    }

    fn take_fault(&mut self, pred: impl Fn(&Fault) -> bool) -> Option<Fault> {
        let pos = self.faults.iter().position(pred)?;
        Some(self.faults.remove(pos))
    }

    fn count_up(&mut self, byte: u8, out: &mut Outbox) {
        if u16::from(byte) != self.counted {
            self.count_ok = false;
        }
        self.counted += 1;
        if self.counted < 256 {
            return;
        }

        let boot_reply = match self.take_fault(|f| matches!(f, Fault::BootReply(_))) {
            Some(Fault::BootReply(byte)) => byte,
            _ if self.count_ok => reply::BOOT_OK,
            _ => cmd::ABORT_OR_FAIL,
        };
        out.push(boot_reply);
        self.counted = 0;
        self.count_ok = true;
        self.state = PeerState::AwaitInitRequest;
    }

    fn count_down(&mut self, out: &mut Outbox) {
        let fault = self.take_fault(|f| matches!(f, Fault::CountdownByte { .. }));
        for (index, value) in (0..=u8::MAX).rev().enumerate() {
            let byte = match fault {
                Some(Fault::CountdownByte { index: i, value: v }) if usize::from(i) == index => v,
                _ => value,
            };
            out.push(byte);
        }
        self.state = PeerState::AwaitHandshakeVerdict;
    }

    fn on_command(&mut self, byte: u8, out: &mut Outbox) {
        if let Some(frame) = self.scripted.take() {
            out.push_all(&frame);
            self.state = PeerState::AwaitReceiveVerdict;
            return;
        }

        match byte {
            cmd::GET_KEYS => {
                let (flags, scancode) = self.keys.pop_front().unwrap_or((0, 0));
                self.reply_frame(&[flags, scancode], out);
            }
            cmd::RTC_GET_DATE_AND_TIME => {
                let rtc = self.rtc;
                self.reply_frame(&rtc, out);
            }
            cmd::RTC_SET_DATE_AND_TIME => {
                self.command = byte;
                self.exchange_index = 0;
                self.assembler.reset();
                self.state = PeerState::ReceivingFrame;
                self.ack(reply::SEND_BUFFER_OK, out);
            }
            cmd::INIT_UNKNOWN_0X09 => out.push(self.vendor_reply),
            _ => {}
        }
    }

    fn reply_frame(&mut self, payload: &[u8], out: &mut Outbox) {
        let Ok(encoded) = Frame::from_slice(payload).and_then(|f| f.encode_to_vec()) else {
            return;
        };
        let mut frame = encoded.to_vec();

        if let Some(Fault::ReplyLength(length)) =
            self.take_fault(|f| matches!(f, Fault::ReplyLength(_)))
        {
            frame[0] = length;
        }
        if self.take_fault(|f| *f == Fault::CorruptReplyChecksum).is_some() {
            if let Some(last) = frame.last_mut() {
                *last = last.wrapping_add(1);
            }
        }
        if let Some(Fault::TruncateReply(n)) =
            self.take_fault(|f| matches!(f, Fault::TruncateReply(_)))
        {
            frame.truncate(n);
        }

        out.push_all(&frame);
        self.state = PeerState::AwaitReceiveVerdict;
    }

    /// Acknowledge one byte of a send exchange, returns false if a fault
    /// swallowed or refused it
    fn ack(&mut self, byte: u8, out: &mut Outbox) -> bool {
        let index = self.exchange_index;
        self.exchange_index += 1;
        if self.take_fault(|f| *f == Fault::SilentSendByte(index)).is_some() {
            return false;
        }
        if self.take_fault(|f| *f == Fault::NackSendByte(index)).is_some() {
            out.push(cmd::ABORT_OR_FAIL);
            return false;
        }
        out.push(byte);
        true
    }

    fn receive_frame_byte(&mut self, byte: u8, out: &mut Outbox) {
        match self.assembler.feed(byte) {
            Ok(None) => {
                self.ack(reply::SEND_BUFFER_OK, out);
            }
            Ok(Some(frame)) => {
                self.state = PeerState::Idle;
                if self.ack(reply::BUFFER_SEND_AND_CHECKSUM_OK, out) {
                    let payload = frame.payload();
                    if self.command == cmd::RTC_SET_DATE_AND_TIME && payload.len() == self.rtc.len() {
                        self.rtc.copy_from_slice(payload);
                    }
                    self.last_frame = Some(payload.to_vec());
                }
            }
            Err(_) => {
                self.state = PeerState::Idle;
                out.push(cmd::ABORT_OR_FAIL);
            }
        }
    }
}

impl PeerBehavior for LaptopPeer {
    fn on_host_byte(&mut self, byte: u8, out: &mut Outbox) {
        if self.faults.contains(&Fault::Unresponsive) {
            return;
        }

        match self.state {
            PeerState::CountingUp => self.count_up(byte, out),
            PeerState::AwaitInitRequest => {
                if byte == cmd::INIT_SEQ_REQUEST {
                    self.count_down(out);
                } else {
                    self.state = PeerState::CountingUp;
                }
            }
            PeerState::AwaitHandshakeVerdict => {
                // Bytes the host did not read are dropped
                out.clear();
                if byte == cmd::DONE_OR_OK {
                    self.handshakes += 1;
                    self.state = PeerState::Idle;
                } else {
                    self.state = PeerState::CountingUp;
                }
            }
            PeerState::Idle => self.on_command(byte, out),
            PeerState::AwaitReceiveVerdict => {
                out.clear();
                self.verdicts.push(byte);
                self.state = PeerState::Idle;
            }
            PeerState::ReceivingFrame => self.receive_frame_byte(byte, out),
        }
    }
}
