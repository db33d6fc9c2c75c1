//! Host simulator of the laptop peripheral
//!
//! The simulator stands in for the serial hardware, the interrupt
//! controller and the clock. Time is virtual and only moves when the
//! link waits, so tests run instantly and timing assertions are exact.
//!
//! A byte written with an internal-clock transfer is handed to the
//! [`PeerBehavior`], which answers by queueing bytes in an [`Outbox`].
//! A queued byte is delivered through [`on_byte_interrupt`] once its
//! ready time has passed and the port is armed (interrupts on, serial
//! bit enabled, transfer started on the external clock). Arming is
//! noticed when the mask or master enable changes and on every wait.

mod peer;

pub use peer::{Fault, LaptopPeer, PeerState};

use std::cell::{Ref, RefCell, RefMut};
use std::collections::VecDeque;
use std::rc::Rc;

use embedded_hal::delay::DelayNs;
use megaduck_hal::{ClockSource, Monotonic, SerialPort, SERIAL_INTERRUPT};

use crate::mailbox::{on_byte_interrupt, RxMailbox};

/// Default delay between a host byte and the first reply byte
pub const DEFAULT_LATENCY_MICROS: u64 = 200;

/// Default spacing between back-to-back reply bytes
pub const DEFAULT_GAP_MICROS: u64 = 100;

/// Virtual time with no traffic after which a wait is considered hung
const STALL_MICROS: u64 = 5_000_000;

/// SC bit: transfer in progress / ready
const XFER_START: u8 = 0x80;
/// SC bit: internal clock
const CLOCK_INTERNAL: u8 = 0x01;

/// Scripted behaviour of the far end of the link
pub trait PeerBehavior {
    /// React to one byte shifted out by the host
    fn on_host_byte(&mut self, byte: u8, out: &mut Outbox);
}

/// Reply bytes waiting to be clocked into the host
#[derive(Debug)]
pub struct Outbox {
    queue: VecDeque<(u64, u8)>,
    now: u64,
    latency: u64,
    gap: u64,
}

impl Outbox {
    fn new(latency: u64, gap: u64) -> Self {
        Self {
            queue: VecDeque::new(),
            now: 0,
            latency,
            gap,
        }
    }

    /// Queue a reply after the usual latency
    pub fn push(&mut self, byte: u8) {
        self.push_after(self.latency, byte);
    }

    /// Queue a reply no earlier than `delay_micros` from now
    ///
    /// Replies keep their order and stay at least one gap apart.
    pub fn push_after(&mut self, delay_micros: u64, byte: u8) {
        let earliest = self.now + delay_micros;
        let ready = match self.queue.back() {
            Some(&(last, _)) => earliest.max(last + self.gap),
            None => earliest,
        };
        self.queue.push_back((ready, byte));
    }

    /// Queue several replies back to back
    pub fn push_all(&mut self, bytes: &[u8]) {
        for &byte in bytes {
            self.push(byte);
        }
    }

    /// Drop every pending reply
    pub fn clear(&mut self) {
        self.queue.clear();
    }

    pub fn len(&self) -> usize {
        self.queue.len()
    }

    pub fn is_empty(&self) -> bool {
        self.queue.is_empty()
    }

    fn schedule_at(&mut self, at: u64, byte: u8) {
        let pos = self.queue.partition_point(|&(ready, _)| ready <= at);
        self.queue.insert(pos, (at, byte));
    }

    fn pop_ready(&mut self, now: u64) -> Option<u8> {
        match self.queue.front() {
            Some(&(ready, _)) if ready <= now => self.queue.pop_front().map(|(_, b)| b),
            _ => None,
        }
    }
}

/// Register file of the simulated serial block
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct SimRegisters {
    /// Serial data
    pub sb: u8,
    /// Serial control
    pub sc: u8,
    /// Pending interrupt flags
    pub iflag: u8,
    /// Interrupt enable mask
    pub ie: u8,
    /// Interrupt master enable
    pub ime: bool,
    /// Laptop link control
    pub link_ctrl: u8,
}

impl SimRegisters {
    fn armed(&self) -> bool {
        self.ime && self.ie & SERIAL_INTERRUPT != 0 && self.sc == XFER_START
    }
}

impl SerialPort for SimRegisters {
    fn prepare_transfer(&mut self) {
        self.link_ctrl = 0x00;
    }

    fn write_data(&mut self, byte: u8) {
        self.sb = byte;
    }

    fn read_data(&mut self) -> u8 {
        self.sb
    }

    fn start_transfer(&mut self, clock: ClockSource) {
        self.sc = match clock {
            ClockSource::Internal => XFER_START | CLOCK_INTERNAL,
            ClockSource::External => XFER_START,
        };
    }

    fn clear_pending_interrupts(&mut self) {
        self.iflag = 0;
    }

    fn interrupt_mask(&self) -> u8 {
        self.ie
    }

    fn set_interrupt_mask(&mut self, mask: u8) {
        self.ie = mask;
    }

    fn enable_interrupts(&mut self) {
        self.ime = true;
    }

    fn disable_interrupts(&mut self) {
        self.ime = false;
    }

    fn reset(&mut self) {
        self.sc = 0;
        self.sb = 0;
    }
}

struct SimState<'m, B> {
    regs: SimRegisters,
    outbox: Outbox,
    peer: B,
    mailbox: &'m RxMailbox,
    now_ns: u64,
    last_activity: u64,
    sent: Vec<u8>,
    delivered: usize,
}

impl<'m, B: PeerBehavior> SimState<'m, B> {
    fn now_micros(&self) -> u64 {
        self.now_ns / 1_000
    }

    /// An internal-clock transfer shifts the data register out at once
    fn transmit(&mut self) {
        let byte = self.regs.sb;
        let now = self.now_micros();
        self.sent.push(byte);
        self.last_activity = now;
        self.regs.sc &= !XFER_START;
        self.regs.iflag |= SERIAL_INTERRUPT;

        self.outbox.now = now;
        self.peer.on_host_byte(byte, &mut self.outbox);
    }

    fn pump(&mut self) {
        if !self.regs.armed() {
            return;
        }
        let now = self.now_micros();
        if let Some(byte) = self.outbox.pop_ready(now) {
            self.regs.sb = byte;
            self.regs.sc &= !XFER_START;
            on_byte_interrupt(self.mailbox, &mut self.regs);
            self.delivered += 1;
            self.last_activity = now;
        }
    }

    fn advance(&mut self, ns: u64) {
        self.now_ns += ns;
        self.pump();

        let now = self.now_micros();
        if self.outbox.is_empty() && now - self.last_activity > STALL_MICROS {
            panic!(
                "simulated link stalled: no traffic since {} µs (now {} µs)",
                self.last_activity, now
            );
        }
    }
}

/// A virtual serial link with a scripted peer on the far end
///
/// # Panics
///
/// Waiting more than five seconds of virtual time with nothing queued
/// panics, so a blocking read against a silent peer fails the test
/// instead of hanging it.
pub struct Simulator<'m, B> {
    state: Rc<RefCell<SimState<'m, B>>>,
}

impl<'m, B: PeerBehavior> Simulator<'m, B> {
    /// Create a simulator with the default reply timing
    pub fn new(mailbox: &'m RxMailbox, peer: B) -> Self {
        Self::with_timing(mailbox, peer, DEFAULT_LATENCY_MICROS, DEFAULT_GAP_MICROS)
    }

    /// Create a simulator with custom reply latency and spacing
    pub fn with_timing(mailbox: &'m RxMailbox, peer: B, latency_micros: u64, gap_micros: u64) -> Self {
        let state = SimState {
            regs: SimRegisters::default(),
            outbox: Outbox::new(latency_micros, gap_micros),
            peer,
            mailbox,
            now_ns: 0,
            last_activity: 0,
            sent: Vec::new(),
            delivered: 0,
        };
        Self {
            state: Rc::new(RefCell::new(state)),
        }
    }

    /// Serial port handle to give to the link
    pub fn port(&self) -> SimPort<'m, B> {
        SimPort {
            state: Rc::clone(&self.state),
        }
    }

    /// Clock handle to give to the link
    pub fn clock(&self) -> SimClock<'m, B> {
        SimClock {
            state: Rc::clone(&self.state),
        }
    }

    /// Deliver `byte` at an absolute virtual time, independent of the peer
    pub fn schedule(&self, byte: u8, at_micros: u64) {
        self.state.borrow_mut().outbox.schedule_at(at_micros, byte);
    }

    /// Every byte the host has shifted out so far
    pub fn sent(&self) -> Vec<u8> {
        self.state.borrow().sent.clone()
    }

    /// Number of bytes delivered to the host
    pub fn delivered(&self) -> usize {
        self.state.borrow().delivered
    }

    /// Snapshot of the register file
    pub fn registers(&self) -> SimRegisters {
        self.state.borrow().regs
    }

    pub fn now_micros(&self) -> u64 {
        self.state.borrow().now_micros()
    }

    pub fn peer(&self) -> Ref<'_, B> {
        Ref::map(self.state.borrow(), |s| &s.peer)
    }

    pub fn peer_mut(&self) -> RefMut<'_, B> {
        RefMut::map(self.state.borrow_mut(), |s| &mut s.peer)
    }
}

/// [`SerialPort`] handle onto a [`Simulator`]
pub struct SimPort<'m, B> {
    state: Rc<RefCell<SimState<'m, B>>>,
}

impl<'m, B: PeerBehavior> SerialPort for SimPort<'m, B> {
    fn prepare_transfer(&mut self) {
        self.state.borrow_mut().regs.prepare_transfer();
    }

    fn write_data(&mut self, byte: u8) {
        self.state.borrow_mut().regs.write_data(byte);
    }

    fn read_data(&mut self) -> u8 {
        self.state.borrow_mut().regs.read_data()
    }

    fn start_transfer(&mut self, clock: ClockSource) {
        let mut state = self.state.borrow_mut();
        state.regs.start_transfer(clock);
        if clock == ClockSource::Internal {
            state.transmit();
        }
    }

    fn clear_pending_interrupts(&mut self) {
        self.state.borrow_mut().regs.clear_pending_interrupts();
    }

    fn interrupt_mask(&self) -> u8 {
        self.state.borrow().regs.interrupt_mask()
    }

    fn set_interrupt_mask(&mut self, mask: u8) {
        let mut state = self.state.borrow_mut();
        state.regs.set_interrupt_mask(mask);
        state.pump();
    }

    fn enable_interrupts(&mut self) {
        let mut state = self.state.borrow_mut();
        state.regs.enable_interrupts();
        state.pump();
    }

    fn disable_interrupts(&mut self) {
        self.state.borrow_mut().regs.disable_interrupts();
    }

    fn reset(&mut self) {
        self.state.borrow_mut().regs.reset();
    }
}

/// Virtual clock handle onto a [`Simulator`]
pub struct SimClock<'m, B> {
    state: Rc<RefCell<SimState<'m, B>>>,
}

impl<'m, B: PeerBehavior> Monotonic for SimClock<'m, B> {
    fn now_micros(&self) -> u64 {
        self.state.borrow().now_micros()
    }
}

impl<'m, B: PeerBehavior> DelayNs for SimClock<'m, B> {
    fn delay_ns(&mut self, ns: u32) {
        self.state.borrow_mut().advance(u64::from(ns));
    }
}
