//! # Takt Configuration System
//!
//! Layered configuration for the trigger, the loop simulator and logging.
//!
//! ## Hierarchy
//! 1. Default values
//! 2. `config/takt.yaml`
//! 3. `config/<TAKT_ENV>.yaml`
//! 4. `TAKT_*` environment variables, `__` separating nested keys
//!    (e.g. `TAKT_TRIGGER__INTERVAL_US=2500`)

#![warn(unsafe_code)]
#![deny(rustdoc::broken_intra_doc_links)]

use std::path::{Path, PathBuf};

use figment::{
    providers::{Env, Format, Serialized, Yaml},
    Figment,
};
use serde::{Deserialize, Serialize};
use validator::Validate;

mod error;
mod simulator;
mod telemetry;
mod trigger;
mod validation;

pub use error::ConfigError;
pub use simulator::SimulatorConfig;
pub use telemetry::TelemetryConfig;
pub use trigger::TriggerConfig;

const BASE_FILE: &str = "config/takt.yaml";
const ENV_PREFIX: &str = "TAKT_";

/// Top-level configuration container.
#[derive(Debug, Serialize, Deserialize, Validate, Default, Clone)]
pub struct TaktConfig {
    #[validate(nested)]
    #[serde(default)]
    pub trigger: TriggerConfig,

    #[validate(nested)]
    #[serde(default)]
    pub simulator: SimulatorConfig,

    #[validate(nested)]
    #[serde(default)]
    pub telemetry: TelemetryConfig,
}

impl TaktConfig {
    /// Load configuration from the default files and the environment.
    /// Missing files are skipped.
    pub fn load() -> Result<Self, ConfigError> {
        let mut figment = Figment::from(Serialized::defaults(TaktConfig::default()));

        if Path::new(BASE_FILE).exists() {
            figment = figment.merge(Yaml::file(BASE_FILE));
        }

        let env = std::env::var("TAKT_ENV").unwrap_or_else(|_| "production".into());
        let env_file = format!("config/{}.yaml", env);
        if Path::new(&env_file).exists() {
            figment = figment.merge(Yaml::file(env_file));
        }

        Self::extract(figment.merge(Env::prefixed(ENV_PREFIX).split("__")))
    }

    /// Load configuration from a specific file, layered over defaults and
    /// under the environment.
    pub fn load_from_path<P: AsRef<Path>>(path: P) -> Result<Self, ConfigError> {
        let path = path.as_ref();
        if !path.exists() {
            return Err(ConfigError::FileNotFound(PathBuf::from(path)));
        }

        Self::extract(
            Figment::from(Serialized::defaults(TaktConfig::default()))
                .merge(Yaml::file(path))
                .merge(Env::prefixed(ENV_PREFIX).split("__")),
        )
    }

    fn extract(figment: Figment) -> Result<Self, ConfigError> {
        let config: Self = figment.extract()?;
        config.validate()?;
        Ok(config)
    }
}
