//! Register-level backend for the MegaDuck laptop link
//!
//! Implements the `megaduck-hal` traits on top of the console's
//! memory-mapped I/O registers:
//!
//! - [`RegisterBus`] - byte access to the 16-bit address space plus the
//!   interrupt master enable
//! - [`MmioPort`] - serial port and VRAM access through a bus
//! - [`SpinClock`] - calibrated busy-wait delays
//!
//! # Usage
//!
//! ```ignore
//! static MAILBOX: RxMailbox = RxMailbox::new();
//!
//! let bus = unsafe { VolatileBus::new(0, set_ime) };
//! let port = MmioPort::new(bus, RegisterMap::default());
//! let link = Link::new(port, SpinClock::new(LOOPS_PER_MICRO), &MAILBOX);
//! ```
//!
//! All `unsafe` in the workspace lives in [`VolatileBus`].

#![cfg_attr(not(test), no_std)]

pub mod bus;
pub mod clock;
pub mod registers;

pub use bus::{RegisterBus, VolatileBus};
pub use clock::SpinClock;
pub use registers::{MmioPort, RegisterMap};
