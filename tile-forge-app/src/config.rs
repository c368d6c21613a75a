use crate::error::AppError;
use clap::{Parser, ValueEnum};
use figment::providers::{Env, Format, Serialized, Toml};
use figment::Figment;
use serde::{Deserialize, Serialize};
use std::path::PathBuf;
use std::time::Duration;
use wfc_core::{PropagationMode, SelectionStrategy, WfcConfig};

/// Prefix of the environment variables read as a configuration layer.
pub const ENV_PREFIX: &str = "TILE_FORGE_";

/// Represents the different visualization modes available.
#[derive(ValueEnum, Serialize, Deserialize, Clone, Copy, Debug, Default, PartialEq, Eq)]
#[serde(rename_all = "kebab-case")]
pub enum VisualizationMode {
    #[default] // Default to None
    None,
    Terminal, // Box-drawing glyphs printed after the run
}

/// Log level applied to everything except the progress reports.
#[derive(ValueEnum, Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum GlobalLogLevel {
    Trace,
    Debug,
    #[default]
    Info,
    Warn,
    Error,
}

/// Log level of the `progress` module.
#[derive(ValueEnum, Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum ProgressLogLevel {
    Trace,
    Debug,
    #[default]
    Info,
    Warn,
}

/// Command line of the Tile Forge application.
///
/// Generation settings left unset here fall back to the `TILE_FORGE_*`
/// environment, then to the `--config` TOML file, then to the defaults of
/// [`Settings`].
#[derive(Parser, Serialize, Debug, Clone, Default)]
#[command(name = "tile-forge", author, version, about, long_about = None)]
pub struct AppConfig {
    /// Path to a RON catalogue of base tiles. Uses the built-in catalogue if omitted.
    #[arg(short, long, value_name = "FILE")]
    #[serde(skip_serializing_if = "Option::is_none")]
    pub rule_file: Option<PathBuf>,

    /// Side length of the square output grid [default: 10].
    #[arg(long)]
    #[serde(skip_serializing_if = "Option::is_none")]
    pub size: Option<usize>,

    /// Optional seed for the random number generator.
    #[arg(long)]
    #[serde(skip_serializing_if = "Option::is_none")]
    pub seed: Option<u64>,

    /// Path to save the generated output grid [default: output.txt].
    #[arg(short, long, value_name = "FILE")]
    #[serde(skip_serializing_if = "Option::is_none")]
    pub output_path: Option<PathBuf>,

    /// Choose the visualization mode.
    #[arg(long, value_enum)]
    #[serde(skip_serializing_if = "Option::is_none")]
    pub visualization_mode: Option<VisualizationMode>,

    /// How ties between minimum-entropy cells are broken.
    #[arg(long, value_enum)]
    #[serde(skip_serializing_if = "Option::is_none")]
    pub selection_strategy: Option<SelectionStrategy>,

    /// How far constraints travel after each collapse.
    #[arg(long, value_enum)]
    #[serde(skip_serializing_if = "Option::is_none")]
    pub propagation: Option<PropagationMode>,

    /// Attempts before a contradiction is reported; each retry resets the grid.
    #[arg(long)]
    #[serde(skip_serializing_if = "Option::is_none")]
    pub max_attempts: Option<u32>,

    /// Number of independent grids to generate in parallel.
    #[arg(long)]
    #[serde(skip_serializing_if = "Option::is_none")]
    pub batch: Option<usize>,

    /// Report progress updates every specified interval (e.g., "1s", "500ms").
    #[arg(
        long,
        value_name = "DURATION",
        value_parser = humantime::parse_duration,
        env = "TILE_FORGE_REPORT_PROGRESS_INTERVAL"
    )]
    #[serde(skip)]
    pub report_progress_interval: Option<Duration>,

    /// Log level for everything but progress reports.
    #[arg(long, value_enum, default_value_t, env = "TILE_FORGE_GLOBAL_LOG_LEVEL")]
    #[serde(skip)]
    pub global_log_level: GlobalLogLevel,

    /// Log level for progress reports.
    #[arg(long, value_enum, default_value_t, env = "TILE_FORGE_PROGRESS_LOG_LEVEL")]
    #[serde(skip)]
    pub progress_log_level: ProgressLogLevel,

    /// TOML file with generation settings.
    #[arg(short, long, value_name = "FILE")]
    #[serde(skip)]
    pub config: Option<PathBuf>,
}

impl AppConfig {
    /// Layers defaults, the config file, the environment and the command line,
    /// in increasing order of precedence.
    pub fn figment(&self) -> Figment {
        let mut figment = Figment::from(Serialized::defaults(Settings::default()));
        if let Some(path) = &self.config {
            figment = figment.merge(Toml::file(path));
        }
        figment
            .merge(Env::prefixed(ENV_PREFIX))
            .merge(Serialized::defaults(self))
    }

    /// Resolves and validates the generation settings.
    pub fn resolve(&self) -> Result<Settings, AppError> {
        if let Some(path) = &self.config {
            if !path.is_file() {
                return Err(AppError::Config(format!(
                    "Config file {} does not exist",
                    path.display()
                )));
            }
        }
        let settings: Settings = self.figment().extract()?;
        settings.validate()
    }
}

/// Generation settings after all configuration layers are merged.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct Settings {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub rule_file: Option<PathBuf>,
    pub size: usize,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub seed: Option<u64>,
    pub output_path: PathBuf,
    pub visualization_mode: VisualizationMode,
    pub selection_strategy: SelectionStrategy,
    pub propagation: PropagationMode,
    pub max_attempts: u32,
    pub batch: usize,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            rule_file: None,
            size: 10,
            seed: None,
            output_path: PathBuf::from("output.txt"),
            visualization_mode: VisualizationMode::None,
            selection_strategy: SelectionStrategy::default(),
            propagation: PropagationMode::default(),
            max_attempts: 1,
            batch: 1,
        }
    }
}

impl Settings {
    fn validate(self) -> Result<Self, AppError> {
        if self.size == 0 {
            return Err(AppError::Config("Grid size must be at least 1".to_string()));
        }
        if self.max_attempts == 0 {
            return Err(AppError::Config(
                "max_attempts must be at least 1".to_string(),
            ));
        }
        if self.batch == 0 {
            return Err(AppError::Config("batch must be at least 1".to_string()));
        }
        Ok(self)
    }

    /// Solver configuration for one grid. Batch members get consecutive seeds.
    pub fn wfc_config(&self, index: usize) -> WfcConfig {
        WfcConfig {
            seed: self.seed.map(|seed| seed.wrapping_add(index as u64)),
            selection_strategy: self.selection_strategy,
            propagation_mode: self.propagation,
            max_attempts: self.max_attempts,
        }
    }
}
