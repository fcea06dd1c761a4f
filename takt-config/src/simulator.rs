//! Polling loop simulator configuration.

use serde::{Deserialize, Serialize};
use validator::Validate;

#[derive(Debug, Serialize, Deserialize, Validate, Clone)]
pub struct SimulatorConfig {
    /// Seed for the per-step jitter.
    #[serde(default = "default_seed")]
    pub seed: u64,

    /// Number of loop iterations to simulate.
    #[serde(default = "default_steps")]
    #[validate(range(min = 1, max = 100_000_000))]
    pub steps: u64,

    /// Fixed processing cost of one loop iteration, in microseconds. Must be
    /// positive so virtual time always moves forward.
    #[serde(default = "default_work_us")]
    #[validate(range(min = 1, max = 2_000_000_000))]
    pub work_us: u64,

    /// Upper bound of the extra uniform jitter added to each iteration.
    #[serde(default)]
    #[validate(range(max = 2_000_000_000))]
    pub jitter_us: u64,
}

fn default_seed() -> u64 {
    42
}

fn default_steps() -> u64 {
    10_000
}

fn default_work_us() -> u64 {
    1_000
}

impl Default for SimulatorConfig {
    fn default() -> Self {
        Self {
            seed: default_seed(),
            steps: default_steps(),
            work_us: default_work_us(),
            jitter_us: 0,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn zero_work_is_rejected() {
        let config = SimulatorConfig {
            work_us: 0,
            jitter_us: 50,
            ..SimulatorConfig::default()
        };
        assert!(config.validate().is_err());
    }

    #[test]
    fn large_bounds_are_accepted() {
        let config = SimulatorConfig {
            work_us: 2_000_000_000,
            jitter_us: 2_000_000_000,
            ..SimulatorConfig::default()
        };
        assert!(config.validate().is_ok());

        let config = SimulatorConfig {
            jitter_us: 2_000_000_001,
            ..SimulatorConfig::default()
        };
        assert!(config.validate().is_err());
    }
}
