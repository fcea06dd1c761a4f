//! # takt-core
//!
//! Drift-free interval triggering for polling loops.
//!
//! The caller owns the clock. Every operation takes a timestamp and answers
//! immediately, so the trigger never sleeps, blocks or spawns anything.
//!
//! ### Key Submodules:
//! - `time`: `Micros` timestamps plus the `Clock` trait and its virtual/monotonic clocks
//! - `trigger`: `IntervalTrigger`, the fixed-period elapsed check
//! - `error`: input validation failures
//!
//! ```
//! use takt_core::prelude::*;
//!
//! let mut trigger = IntervalTrigger::new(Micros::from_millis(10)).unwrap();
//! trigger.start(Micros::ZERO);
//! assert!(trigger.has_elapsed(Micros::ZERO));
//! assert!(!trigger.has_elapsed(Micros::from_millis(9)));
//! assert!(trigger.has_elapsed(Micros::from_millis(10)));
//! ```

pub mod error;
pub mod time;
pub mod trigger;

pub mod prelude {
    pub use crate::error::*;
    pub use crate::time::*;
    pub use crate::trigger::*;
}

pub use error::TriggerError;
pub use time::{Clock, Micros, MonotonicClock, VirtualClock};
pub use trigger::IntervalTrigger;
