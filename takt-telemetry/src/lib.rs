//! # Takt Telemetry
//!
//! Logging setup and Prometheus counters for trigger-driven loops.

pub mod logging;
pub mod metrics;

pub use logging::EventLogger;
pub use metrics::MetricsRecorder;
