//! Configuration System
//!
//! Loads the batch experiment design from a TOML file so sweeps can be
//! changed without recompiling.

use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};
use std::str::FromStr;
use tracing::warn;

use pd_records::ModelParams;

use crate::batch::{BatchSettings, ParameterSweep, SweepError};
use crate::output::DEFAULT_PREFIX;

/// Default experiment file path
pub const DEFAULT_BATCH_PATH: &str = "batch.toml";

/// Configuration error type
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("could not read {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("parse error: {0}")]
    Parse(#[from] toml::de::Error),
    #[error("invalid sweep: {0}")]
    Sweep(#[from] SweepError),
}

/// Where and how results are written
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct OutputConfig {
    pub dir: PathBuf,
    pub prefix: String,
    /// Write a JSON manifest next to the spreadsheet
    pub manifest: bool,
}

impl Default for OutputConfig {
    fn default() -> Self {
        Self {
            dir: PathBuf::from("output"),
            prefix: DEFAULT_PREFIX.to_string(),
            manifest: true,
        }
    }
}

/// Top-level configuration structure
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BatchConfig {
    #[serde(default)]
    pub batch: BatchSettings,
    #[serde(default)]
    pub output: OutputConfig,
    /// Base parameters every combination is layered over
    #[serde(default)]
    pub model: ModelParams,
    /// Sweep axes, in column order
    #[serde(default = "default_sweep_table")]
    pub sweep: toml::Table,
}

/// 10x10 grid with each reward swept over 0, 0.25, 0.5, 0.75
fn default_sweep_table() -> toml::Table {
    let mut table = toml::Table::new();
    table.insert("width".into(), toml::Value::Integer(10));
    table.insert("height".into(), toml::Value::Integer(10));
    for reward in [
        "cooperation_reward",
        "defected_reward",
        "defection_reward",
        "mutual_defection_reward",
    ] {
        let mut range = toml::Table::new();
        range.insert("start".into(), toml::Value::Float(0.0));
        range.insert("stop".into(), toml::Value::Float(1.0));
        range.insert("step".into(), toml::Value::Float(0.25));
        table.insert(reward.into(), toml::Value::Table(range));
    }
    table
}

impl Default for BatchConfig {
    fn default() -> Self {
        Self {
            batch: BatchSettings::default(),
            output: OutputConfig::default(),
            model: ModelParams::default(),
            sweep: default_sweep_table(),
        }
    }
}

impl BatchConfig {
    /// Load configuration from a TOML file
    pub fn load(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let path = path.as_ref();
        let content = fs::read_to_string(path).map_err(|source| ConfigError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        content.parse()
    }

    /// Load configuration from a path, or use defaults if it cannot be read
    pub fn load_or_default(path: impl AsRef<Path>) -> Self {
        Self::load(path.as_ref()).unwrap_or_else(|e| {
            warn!("Could not load {}: {}. Using defaults.", path.as_ref().display(), e);
            Self::default()
        })
    }

    pub fn parameter_sweep(&self) -> Result<ParameterSweep, SweepError> {
        ParameterSweep::from_table(&self.sweep)
    }
}

impl FromStr for BatchConfig {
    type Err = ConfigError;

    /// Parse configuration from a TOML string
    fn from_str(content: &str) -> Result<Self, Self::Err> {
        let config: BatchConfig = toml::from_str(content)?;
        // Surface sweep mistakes at load time rather than at run time
        config.parameter_sweep()?;
        Ok(config)
    }
}
