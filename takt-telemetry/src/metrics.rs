//! ## takt-telemetry::metrics
//! **Prometheus counters for trigger activity**
//!
//! Each recorder owns its own registry, so several loops (or tests) can keep
//! separate figures in one process.

use prometheus::{Encoder, Histogram, HistogramOpts, IntCounter, Registry, TextEncoder};
use thiserror::Error;

#[derive(Debug, Error)]
pub enum MetricsError {
    #[error("Prometheus error: {0}")]
    Prometheus(#[from] prometheus::Error),

    #[error("Metrics output is not UTF-8: {0}")]
    Encoding(#[from] std::string::FromUtf8Error),
}

#[derive(Debug, Clone)]
pub struct MetricsRecorder {
    pub registry: Registry,
    pub polls: IntCounter,
    pub triggers: IntCounter,
    pub absorbed_intervals: IntCounter,
    pub trigger_lateness: Histogram,
}

impl MetricsRecorder {
    pub fn new() -> Result<Self, MetricsError> {
        let registry = Registry::new();
        let polls = IntCounter::new("takt_polls_total", "Elapsed checks performed")?;
        let triggers = IntCounter::new("takt_triggers_total", "Elapsed checks that reported a trigger")?;
        let absorbed_intervals = IntCounter::new(
            "takt_intervals_absorbed_total",
            "Whole intervals folded into a later trigger because polling fell behind",
        )?;
        let trigger_lateness = Histogram::with_opts(
            HistogramOpts::new(
                "takt_trigger_lateness_us",
                "Distance between a trigger's boundary and the poll that reported it",
            )
            .buckets(vec![10.0, 100.0, 1_000.0, 10_000.0, 100_000.0, 1_000_000.0]),
        )?;

        registry.register(Box::new(polls.clone()))?;
        registry.register(Box::new(triggers.clone()))?;
        registry.register(Box::new(absorbed_intervals.clone()))?;
        registry.register(Box::new(trigger_lateness.clone()))?;

        Ok(Self {
            registry,
            polls,
            triggers,
            absorbed_intervals,
            trigger_lateness,
        })
    }

    pub fn record_poll(&self) {
        self.polls.inc();
    }

    pub fn record_trigger(&self, lateness_us: i64, absorbed: u64) {
        self.triggers.inc();
        self.absorbed_intervals.inc_by(absorbed);
        self.trigger_lateness.observe(lateness_us as f64);
    }

    pub fn gather_metrics(&self) -> Result<String, MetricsError> {
        let encoder = TextEncoder::new();
        let mut buffer = Vec::<u8>::new();
        encoder.encode(&self.registry.gather(), &mut buffer)?;
        Ok(String::from_utf8(buffer)?)
    }
}
