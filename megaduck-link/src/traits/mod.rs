//! Seams between the link engine and its users

pub mod packet;

pub use packet::PacketLink;
