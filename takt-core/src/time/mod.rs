//! ## takt-core::time
//! **Microsecond timestamps and injectable clocks**
//!
//! All time values handed to an `IntervalTrigger` are `Micros`: a signed count
//! of microseconds since whatever epoch the caller picked (process start, a
//! simulation seed, ...). Signed on purpose, so a reading taken before the
//! trigger's base time is representable and compares as "earlier".
//!
//! ### Key Submodules:
//! - `clock/`: `Clock` trait, `VirtualClock` for simulation, `MonotonicClock` for real time

mod clock;

pub use clock::{Clock, MonotonicClock, VirtualClock};

use std::fmt;
use std::ops::{Add, Sub};
use std::time::Duration;

use serde::{Deserialize, Serialize};

use crate::error::TriggerError;

/// A point in time, or a span of time, in whole microseconds.
#[derive(
    Clone, Copy, Debug, Default, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize,
)]
#[serde(transparent)]
pub struct Micros(i64);

impl Micros {
    pub const ZERO: Micros = Micros(0);
    pub const MAX: Micros = Micros(i64::MAX);

    #[inline]
    pub const fn from_micros(us: i64) -> Self {
        Self(us)
    }

    /// Saturates at the `i64` bounds.
    #[inline]
    pub const fn from_millis(ms: i64) -> Self {
        Self(ms.saturating_mul(1_000))
    }

    /// Saturates at the `i64` bounds.
    #[inline]
    pub const fn from_secs(secs: i64) -> Self {
        Self(secs.saturating_mul(1_000_000))
    }

    #[inline]
    pub const fn as_micros(self) -> i64 {
        self.0
    }

    #[inline]
    pub const fn is_positive(self) -> bool {
        self.0 > 0
    }

    pub fn checked_add(self, rhs: Micros) -> Option<Micros> {
        self.0.checked_add(rhs.0).map(Micros)
    }

    pub fn checked_sub(self, rhs: Micros) -> Option<Micros> {
        self.0.checked_sub(rhs.0).map(Micros)
    }
}

impl Add for Micros {
    type Output = Micros;

    /// Saturating.
    fn add(self, rhs: Micros) -> Micros {
        Micros(self.0.saturating_add(rhs.0))
    }
}

impl Sub for Micros {
    type Output = Micros;

    /// Saturating.
    fn sub(self, rhs: Micros) -> Micros {
        Micros(self.0.saturating_sub(rhs.0))
    }
}

impl fmt::Display for Micros {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}us", self.0)
    }
}

impl TryFrom<Duration> for Micros {
    type Error = TriggerError;

    fn try_from(duration: Duration) -> Result<Self, Self::Error> {
        i64::try_from(duration.as_micros())
            .map(Micros)
            .map_err(|_| TriggerError::DurationOverflow(duration))
    }
}

/// Negative spans clamp to zero.
impl From<Micros> for Duration {
    fn from(us: Micros) -> Self {
        Duration::from_micros(u64::try_from(us.0).unwrap_or(0))
    }
}
