//! Configuration types
//!
//! Link timing and handshake policy. With the `serde` feature the
//! configuration can be persisted as postcard binary data (for example
//! in battery-backed cartridge SRAM).

#[cfg(feature = "serde")]
pub mod persist;
pub mod types;

pub use types::*;
