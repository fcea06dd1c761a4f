//! Clock sources producing `Micros` readings.
//!
//! The trigger itself never reads a clock. These exist for the loops that
//! drive it: `VirtualClock` for deterministic simulation and tests,
//! `MonotonicClock` for wall-time loops.

use std::sync::atomic::{AtomicI64, Ordering};
use std::sync::Arc;
use std::time::Instant;

use super::Micros;

/// Anything that can report the current time as microseconds since its epoch.
pub trait Clock {
    fn now(&self) -> Micros;
}

/// A deterministic clock that only moves when told to.
///
/// Clones share the same counter, so a driver can hand a copy to whoever
/// needs to read the time while it keeps advancing its own.
#[derive(Clone, Debug)]
pub struct VirtualClock {
    offset: Arc<AtomicI64>, // Microseconds
}

impl VirtualClock {
    /// Creates a new virtual clock starting at `seed` microseconds.
    pub fn new(seed: i64) -> Self {
        Self {
            offset: Arc::new(AtomicI64::new(seed)),
        }
    }

    /// Advances the clock. Negative steps move it backwards.
    #[inline]
    pub fn advance(&self, by: Micros) {
        self.offset.fetch_add(by.as_micros(), Ordering::Release);
    }

    /// Jumps straight to `at`, forwards or backwards.
    #[inline]
    pub fn set(&self, at: Micros) {
        self.offset.store(at.as_micros(), Ordering::Release);
    }
}

impl Clock for VirtualClock {
    #[inline]
    fn now(&self) -> Micros {
        Micros::from_micros(self.offset.load(Ordering::Acquire))
    }
}

/// Real monotonic time, measured from the moment the clock was created.
#[derive(Clone, Copy, Debug)]
pub struct MonotonicClock {
    epoch: Instant,
}

impl MonotonicClock {
    pub fn new() -> Self {
        Self {
            epoch: Instant::now(),
        }
    }
}

impl Default for MonotonicClock {
    fn default() -> Self {
        Self::new()
    }
}

impl Clock for MonotonicClock {
    fn now(&self) -> Micros {
        // i64 microseconds covers ~292k years of uptime.
        Micros::try_from(self.epoch.elapsed()).unwrap_or(Micros::MAX)
    }
}
