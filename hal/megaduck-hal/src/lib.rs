//! MegaDuck Hardware Abstraction Layer
//!
//! This crate defines the hardware traits the link engine is written
//! against. A register-level backend implements them on the console,
//! and the link crate's simulator implements them on the host.
//!
//! # Architecture
//!
//! ```text
//! ┌─────────────────────────────────────────┐
//! │  megaduck-peripherals (keyboard, RTC)   │
//! └─────────────────────────────────────────┘
//!                     │
//!                     ▼
//! ┌─────────────────────────────────────────┐
//! │  megaduck-link (transport + protocol)   │
//! └─────────────────────────────────────────┘
//!                     │
//!                     ▼
//! ┌─────────────────────────────────────────┐
//! │  megaduck-hal (this crate - traits)     │
//! └─────────────────────────────────────────┘
//!                     │
//!         ┌───────────┴───────────┐
//!         ▼                       ▼
//! ┌───────────────┐       ┌───────────────┐
//! │ megaduck-hal- │       │  link::sim    │
//! │     mmio      │       │  (host only)  │
//! └───────────────┘       └───────────────┘
//! ```
//!
//! # Traits
//!
//! - [`serial::SerialPort`] - Serial data/control registers and interrupt mask
//! - [`clock::Monotonic`] - Microsecond timestamps for timeout deadlines
//! - [`vram::VideoMemory`] - Read access to tile memory

#![no_std]
#![deny(unsafe_code)]

pub mod clock;
pub mod serial;
pub mod vram;

// Re-export key traits at crate root for convenience
pub use clock::{Clock, Monotonic};
pub use serial::{ClockSource, SerialPort, SERIAL_INTERRUPT};
pub use vram::VideoMemory;
