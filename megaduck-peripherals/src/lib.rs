//! Application adapters for the MegaDuck laptop base
//!
//! Thin layers over the packet link:
//!
//! - Keyboard polling with shift, caps lock and auto-repeat
//! - Scancode constants and the scancode → key table
//! - Real-time clock read/write with BCD conversion
//! - Model detection from VRAM font tiles
//! - [`Laptop`], tying detection, startup and the adapters together

#![cfg_attr(not(test), no_std)]
#![deny(unsafe_code)]

pub mod error;
pub mod keyboard;
pub mod keycodes;
pub mod laptop;
pub mod model;
pub mod rtc;

pub use error::PeripheralError;
pub use keyboard::{KeyFlags, KeyReport, Keyboard};
pub use keycodes::Key;
pub use laptop::Laptop;
pub use model::Model;
pub use rtc::{Rtc, RtcDateTime, RtcError};
