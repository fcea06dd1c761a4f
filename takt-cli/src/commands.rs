use std::path::PathBuf;
use std::time::Duration;

use clap::{Args, Parser, Subcommand};
use tracing::{info, warn};
use validator::Validate;

use takt_config::{ConfigError, TaktConfig};
use takt_core::trigger::StartMode;
use takt_core::{Clock, MonotonicClock};
use takt_simulator::{SimulationReport, Simulator};
use takt_telemetry::MetricsRecorder;

use crate::error::CliError;

#[derive(Parser, Debug)]
#[command(version, about)]
pub struct Cli {
    /// Configuration file; defaults to config/takt.yaml plus TAKT_* variables
    #[arg(short, long, global = true)]
    pub config: Option<PathBuf>,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Run a polling loop on virtual time and report its trigger timeline
    Simulate(SimulateArgs),
    /// Drive a trigger against the real clock, logging every tick
    Run(RunArgs),
}

/// Settings shared by both subcommands; each overrides the loaded config.
#[derive(Args, Debug, Clone, Default)]
pub struct TriggerArgs {
    /// Trigger interval in microseconds
    #[arg(long)]
    pub interval_us: Option<i64>,
    /// Defer the first trigger by one interval instead of firing on start
    #[arg(long)]
    pub start_next: bool,
}

#[derive(Args, Debug, Clone)]
pub struct SimulateArgs {
    #[command(flatten)]
    pub trigger: TriggerArgs,
    /// Number of loop iterations
    #[arg(long)]
    pub steps: Option<u64>,
    /// Jitter seed
    #[arg(long)]
    pub seed: Option<u64>,
    /// Fixed processing time per iteration, in microseconds
    #[arg(long)]
    pub work_us: Option<u64>,
    /// Maximum extra processing time per iteration, in microseconds
    #[arg(long)]
    pub jitter_us: Option<u64>,
    /// Fail unless the timeline hash equals this value
    #[arg(long)]
    pub expect_hash: Option<String>,
    /// Print Prometheus metrics for the run
    #[arg(long)]
    pub metrics: bool,
}

#[derive(Args, Debug, Clone)]
pub struct RunArgs {
    #[command(flatten)]
    pub trigger: TriggerArgs,
    /// Stop after this many triggers
    #[arg(long, default_value_t = 10)]
    pub count: u64,
    /// Pause between polls, in microseconds
    #[arg(long, default_value_t = 500)]
    pub poll_us: u64,
}

impl Cli {
    pub fn load_config(&self) -> Result<TaktConfig, ConfigError> {
        match &self.config {
            Some(path) => TaktConfig::load_from_path(path),
            None => TaktConfig::load(),
        }
    }
}

impl TriggerArgs {
    fn apply(&self, config: &mut TaktConfig) {
        if let Some(interval_us) = self.interval_us {
            config.trigger.interval_us = interval_us;
        }
        if self.start_next {
            config.trigger.start_mode = StartMode::Next;
        }
    }
}

impl SimulateArgs {
    fn apply(&self, config: &mut TaktConfig) -> Result<(), ConfigError> {
        self.trigger.apply(config);
        let sim = &mut config.simulator;
        if let Some(steps) = self.steps {
            sim.steps = steps;
        }
        if let Some(seed) = self.seed {
            sim.seed = seed;
        }
        if let Some(work_us) = self.work_us {
            sim.work_us = work_us;
        }
        if let Some(jitter_us) = self.jitter_us {
            sim.jitter_us = jitter_us;
        }
        config.validate()?;
        Ok(())
    }
}

pub fn simulate(args: SimulateArgs, config: TaktConfig) -> Result<(), CliError> {
    let metrics = args.metrics.then(MetricsRecorder::new).transpose()?;
    let report = run_simulation(&args, config, metrics.clone())?;

    println!("{}", report.hash);
    if let Some(metrics) = metrics {
        print!("{}", metrics.gather_metrics()?);
    }
    Ok(())
}

pub fn run_simulation(
    args: &SimulateArgs,
    mut config: TaktConfig,
    metrics: Option<MetricsRecorder>,
) -> Result<SimulationReport, CliError> {
    args.apply(&mut config)?;

    let mut simulator = Simulator::from_config(&config)?;
    if let Some(metrics) = metrics {
        simulator = simulator.with_metrics(metrics);
    }
    let report = simulator.run(config.simulator.steps)?;

    if let Some(expected) = &args.expect_hash {
        if !expected.eq_ignore_ascii_case(&report.hash) {
            return Err(CliError::HashMismatch {
                expected: expected.clone(),
                actual: report.hash,
            });
        }
        info!("Timeline hash matches");
    }
    Ok(report)
}

pub async fn run(args: RunArgs, mut config: TaktConfig) -> Result<(), CliError> {
    args.trigger.apply(&mut config);
    config.validate().map_err(ConfigError::from)?;

    let clock = MonotonicClock::new();
    let mut trigger = config.trigger.build()?;
    let poll = Duration::from_micros(args.poll_us);
    trigger.start_with(config.trigger.start_mode, clock.now());
    info!(interval = %trigger.interval(), count = args.count, "Running");

    let ctrl_c = tokio::signal::ctrl_c();
    tokio::pin!(ctrl_c);

    let mut fired = 0;
    while fired < args.count {
        tokio::select! {
            _ = &mut ctrl_c => {
                trigger.stop();
                warn!(fired, "Interrupted");
                break;
            }
            _ = tokio::time::sleep(poll) => {
                let now = clock.now();
                if let Some(elapsed) = trigger.check(now) {
                    fired += 1;
                    info!(
                        tick = fired,
                        at = %now,
                        lateness = %(now - elapsed.boundary),
                        absorbed = elapsed.absorbed,
                        "Tick"
                    );
                }
            }
        }
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn simulate_args(argv: &[&str]) -> SimulateArgs {
        let cli = Cli::try_parse_from(argv).unwrap();
        match cli.command {
            Commands::Simulate(args) => args,
            other => panic!("unexpected command {:?}", other),
        }
    }

    #[test]
    fn parses_simulate_overrides() {
        let args = simulate_args(&[
            "takt",
            "simulate",
            "--interval-us",
            "1000",
            "--start-next",
            "--steps",
            "20",
            "--work-us",
            "300",
        ]);
        let mut config = TaktConfig::default();
        args.apply(&mut config).unwrap();
        assert_eq!(config.trigger.interval_us, 1_000);
        assert_eq!(config.trigger.start_mode, StartMode::Next);
        assert_eq!(config.simulator.steps, 20);
        assert_eq!(config.simulator.work_us, 300);
    }

    #[test]
    fn rejects_zero_interval_override() {
        let args = simulate_args(&["takt", "simulate", "--interval-us", "0"]);
        let err = run_simulation(&args, TaktConfig::default(), None).unwrap_err();
        assert!(matches!(err, CliError::Config(ConfigError::Validation(_))));
    }

    #[test]
    fn zero_work_override_fails_validation() {
        for argv in [
            &["takt", "simulate", "--work-us", "0"][..],
            &["takt", "simulate", "--work-us", "0", "--jitter-us", "50"][..],
        ] {
            let err = run_simulation(&simulate_args(argv), TaktConfig::default(), None).unwrap_err();
            assert!(matches!(err, CliError::Config(ConfigError::Validation(_))));
        }
    }

    #[test]
    fn jittered_run_with_minimal_work_succeeds() {
        let argv = ["takt", "simulate", "--work-us", "1", "--jitter-us", "50", "--steps", "10000"];
        let report = run_simulation(&simulate_args(&argv), TaktConfig::default(), None).unwrap();
        assert_eq!(report.polls, 10_000);
    }

    #[test]
    fn expected_hash_is_checked() {
        let argv = ["takt", "simulate", "--steps", "100", "--jitter-us", "50"];
        let report = run_simulation(&simulate_args(&argv), TaktConfig::default(), None).unwrap();

        let mut matching = simulate_args(&argv);
        matching.expect_hash = Some(report.hash.to_uppercase());
        assert!(run_simulation(&matching, TaktConfig::default(), None).is_ok());

        let mut wrong = simulate_args(&argv);
        wrong.expect_hash = Some("00".into());
        let err = run_simulation(&wrong, TaktConfig::default(), None).unwrap_err();
        assert!(matches!(err, CliError::HashMismatch { .. }));
    }

    #[test]
    fn metrics_follow_the_run() {
        let args = simulate_args(&["takt", "simulate", "--steps", "50"]);
        let metrics = MetricsRecorder::new().unwrap();
        run_simulation(&args, TaktConfig::default(), Some(metrics.clone())).unwrap();
        assert_eq!(metrics.polls.get(), 50);
    }

    #[tokio::test]
    async fn run_stops_after_count() {
        let args = RunArgs {
            trigger: TriggerArgs {
                interval_us: Some(1_000),
                start_next: false,
            },
            count: 3,
            poll_us: 200,
        };
        run(args, TaktConfig::default()).await.unwrap();
    }
}
