use std::time::Duration;

use thiserror::Error;

use crate::time::Micros;

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum TriggerError {
    #[error("Interval must be positive, got {0}")]
    NonPositiveInterval(Micros),

    #[error("Duration {0:?} does not fit in a signed microsecond count")]
    DurationOverflow(Duration),
}
