//! ## takt-core::trigger
//! **Fixed-period trigger for polling loops**
//!
//! `IntervalTrigger` answers "has the next interval boundary passed as of this
//! timestamp?". Boundaries sit at `base + k * interval` for whole `k`, measured
//! from the base time recorded by `start`/`start_next`, never from the last
//! poll. A loop that polls late therefore does not push later triggers back,
//! and a loop that polls very late gets exactly one trigger for the whole gap.
//!
//! The trigger owns no clock and never waits. It is a plain value mutated
//! through `&mut self`; sharing one between threads needs an external lock.

use serde::{Deserialize, Serialize};
use tracing::{debug, trace};

use crate::error::TriggerError;
use crate::time::{Clock, Micros};

/// Where the first boundary sits relative to the start time.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum StartMode {
    /// First trigger is due at the start time itself.
    #[default]
    Immediate,
    /// First trigger is due one full interval after the start time.
    Next,
}

/// Details of a single reported trigger.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Elapsed {
    /// The most recent boundary at or before the polled time.
    pub boundary: Micros,
    /// Whole boundaries that passed unreported and were folded into this trigger.
    pub absorbed: u64,
}

#[derive(Clone, Debug)]
pub struct IntervalTrigger {
    interval: Micros,
    base: Micros,
    running: bool,
    mode: StartMode,
    trigger_count: i128,
}

impl IntervalTrigger {
    /// Creates a stopped trigger. Fails unless `interval` is positive.
    pub fn new(interval: Micros) -> Result<Self, TriggerError> {
        validate_interval(interval)?;
        Ok(Self {
            interval,
            base: Micros::ZERO,
            running: false,
            mode: StartMode::Immediate,
            trigger_count: 0,
        })
    }

    /// (Re)starts the trigger with the first trigger due immediately.
    pub fn start(&mut self, now: Micros) {
        self.start_with(StartMode::Immediate, now);
    }

    /// (Re)starts the trigger with the first trigger due one interval from `now`.
    pub fn start_next(&mut self, now: Micros) {
        self.start_with(StartMode::Next, now);
    }

    pub fn start_with(&mut self, mode: StartMode, now: Micros) {
        self.base = now;
        self.mode = mode;
        self.trigger_count = 0;
        self.running = true;
        debug!(base = %now, interval = %self.interval, ?mode, "Interval trigger started");
    }

    /// Pauses the trigger. Base time and count are kept; the next start resets them.
    pub fn stop(&mut self) {
        self.running = false;
        debug!("Interval trigger stopped");
    }

    /// Returns true at most once per call, and only when a boundary not yet
    /// reported has been reached by `now`.
    #[inline]
    pub fn has_elapsed(&mut self, now: Micros) -> bool {
        self.check(now).is_some()
    }

    /// Same as [`IntervalTrigger::has_elapsed`], reading the time from `clock`.
    #[inline]
    pub fn poll<C: Clock + ?Sized>(&mut self, clock: &C) -> bool {
        self.has_elapsed(clock.now())
    }

    /// The elapsed check, reporting which boundary fired and how many were skipped.
    pub fn check(&mut self, now: Micros) -> Option<Elapsed> {
        if !self.running {
            return None;
        }

        let whole = self.whole_intervals(now);
        let reached = match self.mode {
            StartMode::Immediate => whole + 1,
            StartMode::Next => whole,
        };

        if reached <= self.trigger_count {
            if now < self.base {
                debug!(now = %now, base = %self.base, "Clock regression, no trigger");
            }
            return None;
        }

        let absorbed = u64::try_from(reached - self.trigger_count - 1).unwrap_or(u64::MAX);
        self.trigger_count = reached;
        let boundary = self.boundary_at(whole);
        trace!(now = %now, %boundary, absorbed, count = self.trigger_count(), "Interval elapsed");

        Some(Elapsed { boundary, absorbed })
    }

    /// Changes the interval for all later checks. Base time and count are kept,
    /// so the next boundary is recomputed from the original base.
    pub fn set_interval(&mut self, interval: Micros) -> Result<(), TriggerError> {
        validate_interval(interval)?;
        if interval != self.interval {
            debug!(from = %self.interval, to = %interval, "Interval changed");
        }
        self.interval = interval;
        Ok(())
    }

    /// Time at which the next trigger becomes due, or `None` while stopped.
    pub fn next_boundary(&self) -> Option<Micros> {
        if !self.running {
            return None;
        }
        let k = match self.mode {
            StartMode::Immediate => self.trigger_count,
            StartMode::Next => self.trigger_count + 1,
        };
        Some(self.boundary_at(k))
    }

    pub fn interval(&self) -> Micros {
        self.interval
    }

    pub fn base(&self) -> Micros {
        self.base
    }

    pub fn is_running(&self) -> bool {
        self.running
    }

    pub fn start_mode(&self) -> StartMode {
        self.mode
    }

    /// Boundaries acknowledged since the last start.
    pub fn trigger_count(&self) -> u64 {
        u64::try_from(self.trigger_count).unwrap_or(u64::MAX)
    }

    /// `floor((now - base) / interval)`, rounding toward negative infinity.
    fn whole_intervals(&self, now: Micros) -> i128 {
        let delta = i128::from(now.as_micros()) - i128::from(self.base.as_micros());
        delta.div_euclid(i128::from(self.interval.as_micros()))
    }

    fn boundary_at(&self, k: i128) -> Micros {
        let at = i128::from(self.base.as_micros()) + k * i128::from(self.interval.as_micros());
        Micros::from_micros(at.clamp(i128::from(i64::MIN), i128::from(i64::MAX)) as i64)
    }
}

fn validate_interval(interval: Micros) -> Result<(), TriggerError> {
    if interval.is_positive() {
        Ok(())
    } else {
        Err(TriggerError::NonPositiveInterval(interval))
    }
}
