//! MegaDuck Laptop Link Protocol
//!
//! This crate defines the byte-level protocol between the MegaDuck
//! handheld (host) and the laptop base (keyboard + RTC peripheral).
//! Every exchange starts with a one-byte command; multi-byte data moves
//! in length-prefixed, checksum-terminated frames:
//!
//! ```text
//! ┌────────┬─────────────┬──────────┐
//! │ LENGTH │ PAYLOAD     │ CHECKSUM │
//! │ 1B     │ 0–12B       │ 1B       │
//! └────────┴─────────────┴──────────┘
//! ```
//!
//! LENGTH counts the whole frame (itself, the payload and the checksum).
//! CHECKSUM is the two's complement of the sum of all preceding frame
//! bytes, so the 8-bit sum of the complete frame is zero.
//!
//! Host → peripheral frames are acknowledged byte by byte; peripheral →
//! host frames are sent back to back and answered with a single OK or
//! ABORT once the host has validated the checksum.

#![cfg_attr(not(any(test, feature = "std")), no_std)]
#![deny(unsafe_code)]

pub mod checksum;
pub mod command;
pub mod error;
pub mod frame;

pub use checksum::{twos_complement, Checksum};
pub use command::{cmd, reply, timeout};
pub use error::{LinkError, SendStage};
pub use frame::{
    Frame, FrameAssembler, FrameError, RxBuffer, TxBuffer, MAX_FRAME_LEN, MAX_PAYLOAD_LEN,
    RX_MAX_LEN,
};
