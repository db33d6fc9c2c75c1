//! Serial transport engine for the MegaDuck laptop peripheral
//!
//! This crate drives the console side of the laptop link on top of the
//! `megaduck-hal` traits:
//!
//! - Interrupt receive mailbox and handler entry point
//! - Byte transport and timeout-bounded receive
//! - Packet layer (framed send with per-byte acks, framed receive)
//! - Cold boot handshake and startup sequence
//! - Link timing configuration
//! - A host simulator of the peripheral (feature `sim`)
//!
//! ```ignore
//! static MAILBOX: RxMailbox = RxMailbox::new();
//!
//! let mut link = Link::new(port, clock, &MAILBOX);
//! link.startup()?;
//! let keys = link.receive_buffer(cmd::GET_KEYS)?;
//! ```

#![cfg_attr(not(any(test, feature = "std")), no_std)]
#![deny(unsafe_code)]

// Must come first so the logging macros are visible everywhere
mod fmt;

pub mod config;
pub mod error;
pub mod link;
pub mod mailbox;
#[cfg(any(test, feature = "sim"))]
pub mod sim;
pub mod traits;

pub use config::LinkConfig;
pub use error::{HandshakeError, LinkError, SendStage};
pub use link::{Link, StartupReport};
pub use mailbox::{on_byte_interrupt, RxMailbox};
pub use traits::PacketLink;
