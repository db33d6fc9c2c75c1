//! Byte access to the console address space

use core::ptr::{read_volatile, write_volatile};

/// Byte-wide register access
pub trait RegisterBus {
    /// Read the byte at `addr`
    fn read8(&self, addr: u16) -> u8;

    /// Write `value` to `addr`
    fn write8(&mut self, addr: u16, value: u8);

    /// Turn the CPU's interrupt master enable on or off
    fn set_master_interrupt(&mut self, enabled: bool);
}

/// Volatile accesses at `base + addr`
///
/// On the console the base is address zero. Register addresses are
/// built from integers, never by offsetting a pointer. The master enable
/// has no memory-mapped register, so it is switched through a callback
/// (typically wrapping the `ei` / `di` instructions).
pub struct VolatileBus {
    base: usize,
    set_ime: fn(bool),
}

impl VolatileBus {
    /// Create a bus over the 64 KiB window starting at address `base`
    ///
    /// # Safety
    ///
    /// Every address in `base..base + 0x10000` must be valid for volatile
    /// byte reads and writes for the lifetime of the bus (memory-mapped
    /// registers or exposed memory), and no other code may hold
    /// references into that window.
    pub const unsafe fn new(base: usize, set_ime: fn(bool)) -> Self {
        Self { base, set_ime }
    }

    #[inline(always)]
    fn register(&self, addr: u16) -> *mut u8 {
        self.base.wrapping_add(usize::from(addr)) as *mut u8
    }
}

impl RegisterBus for VolatileBus {
    #[inline(always)]
    fn read8(&self, addr: u16) -> u8 {
        // SAFETY: every address in the window was declared valid in `new`
        unsafe { read_volatile(self.register(addr)) }
    }

    #[inline(always)]
    fn write8(&mut self, addr: u16, value: u8) {
        // SAFETY: every address in the window was declared valid in `new`
        unsafe { write_volatile(self.register(addr), value) }
    }

    fn set_master_interrupt(&mut self, enabled: bool) {
        (self.set_ime)(enabled);
    }
}
