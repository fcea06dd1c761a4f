use thiserror::Error;

use takt_config::ConfigError;
use takt_simulator::SimulationError;
use takt_telemetry::metrics::MetricsError;

#[derive(Debug, Error)]
pub enum CliError {
    #[error(transparent)]
    Config(#[from] ConfigError),

    #[error(transparent)]
    Simulation(#[from] SimulationError),

    #[error(transparent)]
    Metrics(#[from] MetricsError),

    #[error("Timeline hash mismatch: expected {expected}, got {actual}")]
    HashMismatch { expected: String, actual: String },
}
