//! ## takt-cli
//! **Command line front end for the interval trigger**
//!
//! `takt simulate` replays a polling loop on virtual time and prints its
//! trigger timeline hash; `takt run` drives a trigger against the real
//! monotonic clock and logs every tick.

use clap::Parser;
use takt_telemetry::EventLogger;

mod commands;
mod error;

use commands::{Cli, Commands};
use error::CliError;

#[tokio::main]
async fn main() -> Result<(), CliError> {
    let cli = Cli::parse();
    let config = cli.load_config()?;
    EventLogger::init(&config.telemetry.log_level);

    match cli.command {
        Commands::Simulate(args) => commands::simulate(args, config),
        Commands::Run(args) => commands::run(args, config).await,
    }
}
