//! Calibrated busy-wait clock
//!
//! The console has no free-running microsecond timer, so time is only
//! known by counting it away: every delay spins a calibrated number of
//! loop iterations and adds its length to a running total. Timeouts on
//! the link are measured against that total, which matches how the
//! system ROM counts its waits.

use embedded_hal::delay::DelayNs;
use megaduck_hal::Monotonic;

/// Busy-wait delay source with an elapsed-time counter
#[derive(Debug, Clone)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct SpinClock {
    loops_per_micro: u32,
    elapsed_micros: u64,
}

impl SpinClock {
    /// Create a clock spinning `loops_per_micro` iterations per microsecond
    pub const fn new(loops_per_micro: u32) -> Self {
        Self {
            loops_per_micro,
            elapsed_micros: 0,
        }
    }

    /// Derive the loop count from the CPU clock and the cost of one
    /// iteration in cycles (at least one iteration per microsecond)
    pub const fn calibrated(cpu_hz: u32, cycles_per_loop: u32) -> Self {
        let cycles_per_micro = cpu_hz / 1_000_000;
        let loops = if cycles_per_loop == 0 {
            cycles_per_micro
        } else {
            cycles_per_micro / cycles_per_loop
        };
        Self::new(if loops == 0 { 1 } else { loops })
    }

    pub fn loops_per_micro(&self) -> u32 {
        self.loops_per_micro
    }
}

impl Monotonic for SpinClock {
    fn now_micros(&self) -> u64 {
        self.elapsed_micros
    }
}

impl DelayNs for SpinClock {
    fn delay_ns(&mut self, ns: u32) {
        let micros = ns.div_ceil(1_000);
        for _ in 0..micros {
            for _ in 0..self.loops_per_micro {
                core::hint::spin_loop();
            }
        }
        self.elapsed_micros += u64::from(micros);
    }
}
