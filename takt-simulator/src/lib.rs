/*!
# Takt Simulator

Deterministic rendition of a polling loop driven by an `IntervalTrigger`.

Each iteration polls the trigger at the virtual clock's current time, then
advances the clock by the iteration's processing cost: a fixed work time plus
seeded jitter. Every trigger is recorded along with the boundary it belongs to
and how late the poll was, so drift (or the absence of it) can be checked
directly. The timeline is folded into a BLAKE3 hash; equal seeds and settings
always give equal hashes.
*/

use blake3::Hasher;
use thiserror::Error;
use tracing::{debug, info, instrument};

use takt_config::TaktConfig;
use takt_core::trigger::StartMode;
use takt_core::{Clock, IntervalTrigger, Micros, VirtualClock};
use takt_telemetry::MetricsRecorder;

pub mod jitter;

use jitter::{JitterModel, NoJitterModel, RandomJitterModel};

#[derive(Debug, Error)]
pub enum SimulationError {
    #[error("Configuration error: {0}")]
    Config(#[from] takt_config::ConfigError),

    #[error("Work per iteration must be positive, got {0}")]
    StalledLoop(Micros),
}

/// One reported trigger.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct TriggerEvent {
    /// Loop iteration that observed the trigger.
    pub step: u64,
    /// Time of the poll.
    pub at: Micros,
    /// Boundary the trigger belongs to.
    pub boundary: Micros,
    /// `at - boundary`.
    pub lateness: Micros,
    /// Boundaries skipped over and folded into this trigger.
    pub absorbed: u64,
}

#[derive(Clone, Debug)]
pub struct SimulationReport {
    pub interval: Micros,
    pub base: Micros,
    pub polls: u64,
    pub triggers: Vec<TriggerEvent>,
    /// Clock reading after the last iteration.
    pub end: Micros,
    /// Hex encoded BLAKE3 hash of the trigger timeline.
    pub hash: String,
}

impl SimulationReport {
    pub fn max_lateness(&self) -> Micros {
        self.triggers
            .iter()
            .map(|event| event.lateness)
            .max()
            .unwrap_or(Micros::ZERO)
    }

    pub fn absorbed(&self) -> u64 {
        self.triggers.iter().map(|event| event.absorbed).sum()
    }
}

pub struct Simulator {
    clock: VirtualClock,
    trigger: IntervalTrigger,
    start_mode: StartMode,
    work: Micros,
    jitter: Box<dyn JitterModel>,
    metrics: Option<MetricsRecorder>,
    state_hasher: Hasher,
}

impl Simulator {
    /// Creates a simulator around a (stopped) trigger. The loop starts at time zero.
    pub fn new(trigger: IntervalTrigger, start_mode: StartMode, work: Micros) -> Self {
        Self {
            clock: VirtualClock::new(0),
            trigger,
            start_mode,
            work,
            jitter: Box::new(NoJitterModel),
            metrics: None,
            state_hasher: Hasher::new(),
        }
    }

    pub fn from_config(config: &TaktConfig) -> Result<Self, SimulationError> {
        let sim = &config.simulator;
        let work = Micros::from_micros(i64::try_from(sim.work_us).unwrap_or(i64::MAX));
        let mut simulator = Self::new(config.trigger.build()?, config.trigger.start_mode, work);
        if sim.jitter_us > 0 {
            simulator.set_jitter_model(Box::new(RandomJitterModel::new(sim.jitter_us, sim.seed)));
        }
        Ok(simulator)
    }

    pub fn set_jitter_model(&mut self, model: Box<dyn JitterModel>) {
        self.jitter = model;
    }

    pub fn with_metrics(mut self, metrics: MetricsRecorder) -> Self {
        self.metrics = Some(metrics);
        self
    }

    /// Shared handle on the loop's clock.
    pub fn clock(&self) -> VirtualClock {
        self.clock.clone()
    }

    /// Runs `steps` loop iterations from a freshly started trigger. The clock
    /// and the timeline hash restart from zero on every call; the jitter model
    /// keeps its state.
    #[instrument(skip(self), fields(interval = %self.trigger.interval()))]
    pub fn run(&mut self, steps: u64) -> Result<SimulationReport, SimulationError> {
        if !self.work.is_positive() {
            return Err(SimulationError::StalledLoop(self.work));
        }
        self.clock.set(Micros::ZERO);
        self.state_hasher = Hasher::new();

        let base = self.clock.now();
        self.trigger.start_with(self.start_mode, base);
        let mut triggers = Vec::new();

        for step in 0..steps {
            let now = self.clock.now();
            if let Some(metrics) = &self.metrics {
                metrics.record_poll();
            }

            if let Some(elapsed) = self.trigger.check(now) {
                let event = TriggerEvent {
                    step,
                    at: now,
                    boundary: elapsed.boundary,
                    lateness: now - elapsed.boundary,
                    absorbed: elapsed.absorbed,
                };
                self.record(&event);
                triggers.push(event);
            }

            self.clock.advance(self.work + self.jitter.sample());
        }

        let report = SimulationReport {
            interval: self.trigger.interval(),
            base,
            polls: steps,
            triggers,
            end: self.clock.now(),
            hash: hex::encode(self.state_hasher.finalize().as_bytes()),
        };
        info!(
            polls = report.polls,
            triggers = report.triggers.len(),
            absorbed = report.absorbed(),
            max_lateness = %report.max_lateness(),
            hash = %report.hash,
            "Simulation finished"
        );
        Ok(report)
    }

    fn record(&mut self, event: &TriggerEvent) {
        debug!(step = event.step, at = %event.at, lateness = %event.lateness, "Trigger");
        self.state_hasher.update(&event.step.to_le_bytes());
        self.state_hasher.update(&event.at.as_micros().to_le_bytes());
        self.state_hasher.update(&event.boundary.as_micros().to_le_bytes());
        self.state_hasher.update(&event.absorbed.to_le_bytes());
        if let Some(metrics) = &self.metrics {
            metrics.record_trigger(event.lateness.as_micros(), event.absorbed);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;
    use tracing_test::traced_test;

    fn simulator(interval: i64, mode: StartMode, work: i64) -> Simulator {
        let trigger = IntervalTrigger::new(Micros::from_micros(interval)).unwrap();
        Simulator::new(trigger, mode, Micros::from_micros(work))
    }

    #[traced_test]
    #[test]
    fn test_fixed_cost_loop() {
        let report = simulator(1_000, StartMode::Immediate, 300).run(10).unwrap();
        let at: Vec<i64> = report.triggers.iter().map(|e| e.at.as_micros()).collect();
        let boundary: Vec<i64> = report
            .triggers
            .iter()
            .map(|e| e.boundary.as_micros())
            .collect();
        assert_eq!(at, vec![0, 1_200, 2_100]);
        assert_eq!(boundary, vec![0, 1_000, 2_000]);
        assert_eq!(report.max_lateness(), Micros::from_micros(200));
        assert_eq!(report.end, Micros::from_micros(3_000));
        assert!(logs_contain("Simulation finished"));
    }

    #[test]
    fn test_slow_loop_absorbs_intervals() {
        let report = simulator(100, StartMode::Next, 350).run(4).unwrap();
        let absorbed: Vec<u64> = report.triggers.iter().map(|e| e.absorbed).collect();
        assert_eq!(report.triggers.len(), 3);
        assert_eq!(absorbed, vec![2, 3, 2]);
        assert_eq!(report.absorbed(), 7);
    }

    #[test]
    fn test_same_seed_same_hash() {
        let run = |seed| {
            let mut sim = simulator(1_000, StartMode::Immediate, 100);
            sim.set_jitter_model(Box::new(RandomJitterModel::new(500, seed)));
            sim.run(5_000).unwrap().hash
        };
        assert_eq!(run(1), run(1));
        assert_ne!(run(1), run(2));
    }

    #[test]
    fn test_metrics_are_recorded() {
        let metrics = MetricsRecorder::new().unwrap();
        let report = simulator(1_000, StartMode::Immediate, 300)
            .with_metrics(metrics.clone())
            .run(10)
            .unwrap();
        assert_eq!(metrics.polls.get(), 10);
        assert_eq!(metrics.triggers.get(), report.triggers.len() as u64);
    }

    #[test]
    fn test_zero_cost_loop_is_rejected() {
        let err = simulator(1_000, StartMode::Immediate, 0).run(3).unwrap_err();
        assert!(matches!(err, SimulationError::StalledLoop(_)));
    }

    #[test]
    fn test_minimal_work_with_jitter_runs_to_completion() {
        let mut sim = simulator(1_000, StartMode::Immediate, 1);
        sim.set_jitter_model(Box::new(RandomJitterModel::new(1, 5)));
        let report = sim.run(10_000).unwrap();
        assert!(report.end >= Micros::from_micros(10_000));
        assert!(!report.triggers.is_empty());
    }

    #[test]
    fn test_rerun_restarts_clock_and_hash() {
        let mut sim = simulator(1_000, StartMode::Next, 300);
        let clock = sim.clock();
        let first = sim.run(10).unwrap();
        assert_eq!(clock.now(), Micros::from_micros(3_000));

        let second = sim.run(10).unwrap();
        assert_eq!(second.base, Micros::ZERO);
        assert_eq!(second.hash, first.hash);
        assert_eq!(second.triggers, first.triggers);
        assert_eq!(clock.now(), first.end);
    }

    #[test]
    fn test_from_config() {
        let mut config = TaktConfig::default();
        config.trigger.interval_us = 500;
        config.simulator.work_us = 100;
        config.simulator.jitter_us = 50;
        let report = Simulator::from_config(&config).unwrap().run(1_000).unwrap();
        assert_eq!(report.interval, Micros::from_micros(500));
        assert!(!report.triggers.is_empty());
    }

    proptest! {
        #[test]
        fn prop_no_drift_under_jitter(
            interval in 10i64..5_000,
            work in 1i64..2_000,
            jitter in 0u64..3_000,
            seed in any::<u64>(),
        ) {
            let mut sim = simulator(interval, StartMode::Immediate, work);
            sim.set_jitter_model(Box::new(RandomJitterModel::new(jitter, seed)));
            let report = sim.run(2_000).unwrap();

            let mut expected = 0u64;
            for event in &report.triggers {
                let offset = (event.boundary - report.base).as_micros();
                prop_assert_eq!(offset % interval, 0);
                prop_assert!(event.lateness < Micros::from_micros(interval));
                expected += 1 + event.absorbed;
            }
            // Every boundary up to the last trigger is accounted for exactly once.
            if let Some(last) = report.triggers.last() {
                let boundaries = (last.boundary - report.base).as_micros() / interval + 1;
                prop_assert_eq!(expected, boundaries as u64);
            }
        }
    }
}
