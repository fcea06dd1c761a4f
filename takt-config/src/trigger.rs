//! Trigger configuration.

use serde::{Deserialize, Serialize};
use validator::Validate;

use takt_core::trigger::StartMode;
use takt_core::{IntervalTrigger, Micros};

use crate::ConfigError;

#[derive(Debug, Serialize, Deserialize, Validate, Clone)]
pub struct TriggerConfig {
    /// Spacing between triggers in microseconds.
    #[serde(default = "default_interval_us")]
    #[validate(range(min = 1))]
    pub interval_us: i64,

    /// `immediate` fires on start, `next` one interval later.
    #[serde(default)]
    pub start_mode: StartMode,
}

/// One frame at 60 Hz.
fn default_interval_us() -> i64 {
    16_667
}

impl Default for TriggerConfig {
    fn default() -> Self {
        Self {
            interval_us: default_interval_us(),
            start_mode: StartMode::default(),
        }
    }
}

impl TriggerConfig {
    pub fn interval(&self) -> Micros {
        Micros::from_micros(self.interval_us)
    }

    /// Builds a stopped trigger with the configured interval.
    pub fn build(&self) -> Result<IntervalTrigger, ConfigError> {
        Ok(IntervalTrigger::new(self.interval())?)
    }
}
