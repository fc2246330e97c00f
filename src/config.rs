use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::{fs, io::ErrorKind, path::Path};
use stormrunner_scene::AtmosphereConfig;
use tracing::{debug, warn};

pub const DEFAULT_CONFIG_PATH: &str = "config/stormrunner.toml";

#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
#[serde(default)]
pub struct SimulationConfig {
    /// Seed for every random stream in the run.
    pub seed: u64,
    /// Ticks to simulate when `--ticks` is not given.
    pub ticks: u64,
    pub atmosphere: AtmosphereConfig,
}

impl Default for SimulationConfig {
    fn default() -> Self {
        Self {
            seed: 0,
            ticks: 1200,
            atmosphere: AtmosphereConfig::default(),
        }
    }
}

impl SimulationConfig {
    /// Load from `explicit`, or from [`DEFAULT_CONFIG_PATH`].
    ///
    /// A missing or unreadable default file falls back to defaults. An
    /// explicit path must exist. Any file that is read must parse, and the
    /// result is validated.
    pub fn load(explicit: Option<&Path>) -> Result<Self> {
        let config = match explicit {
            Some(path) => Self::load_strict(path)?,
            None => Self::load_default(Path::new(DEFAULT_CONFIG_PATH))?,
        };
        config
            .atmosphere
            .validate()
            .context("invalid simulation config")?;
        Ok(config)
    }

    fn load_strict(path: &Path) -> Result<Self> {
        let contents = fs::read_to_string(path)
            .with_context(|| format!("failed to read {}", path.display()))?;
        Self::parse(path, &contents)
    }

    fn load_default(path: &Path) -> Result<Self> {
        match fs::read_to_string(path) {
            Ok(contents) => Self::parse(path, &contents),
            Err(err) if err.kind() == ErrorKind::NotFound => {
                warn!("Config not found at {}. Using defaults", path.display());
                Ok(SimulationConfig::default())
            }
            Err(err) => {
                warn!("Failed to read {}: {err}. Using defaults", path.display());
                Ok(SimulationConfig::default())
            }
        }
    }

    fn parse(path: &Path, contents: &str) -> Result<Self> {
        let config = toml::from_str(contents)
            .with_context(|| format!("failed to parse {}", path.display()))?;
        debug!(path = %path.display(), "config loaded");
        Ok(config)
    }
}
