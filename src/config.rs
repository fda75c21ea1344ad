//! Configuration management and validation.
//!
//! Layered configuration for batch processing: built-in defaults, an
//! optional TOML config file, then CLI argument overrides applied by the
//! command layer.

use crate::{Error, Result};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use tracing::debug;

/// Processing paths and identity settings
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ProcessingConfig {
    /// Root directory scanned for hex/xmlcon files, laid out as
    /// `<root>/<year>/<vessel>/...`
    pub input_path: PathBuf,

    /// Root directory for output CSV files
    pub output_path: PathBuf,

    /// Optional haul CSV extract; without it every haul join misses
    #[serde(default)]
    pub haul_path: Option<PathBuf>,

    /// Vessel identity override; by default the vessel is taken from the
    /// directory layout of each hex file
    #[serde(default)]
    pub vessel: Option<String>,

    /// Report what would be processed without converting anything
    #[serde(default)]
    pub dry_run: bool,
}

/// Performance settings
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PerformanceConfig {
    /// Number of files converted concurrently. The default of 1
    /// preserves deterministic ordering of per-file timing output.
    #[serde(default = "default_workers")]
    pub parallel_workers: usize,
}

fn default_workers() -> usize {
    1
}

/// Logging settings
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LoggingConfig {
    #[serde(default = "default_log_level")]
    pub level: String,
}

fn default_log_level() -> String {
    "info".to_string()
}

/// Global configuration for CTD processing
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Config {
    pub processing: ProcessingConfig,

    #[serde(default)]
    pub performance: PerformanceConfig,

    #[serde(default)]
    pub logging: LoggingConfig,
}

impl Default for PerformanceConfig {
    fn default() -> Self {
        Self {
            parallel_workers: default_workers(),
        }
    }
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: default_log_level(),
        }
    }
}

impl Config {
    /// Create a configuration with explicit paths and defaults elsewhere
    pub fn new(input_path: PathBuf, output_path: PathBuf) -> Self {
        Self {
            processing: ProcessingConfig {
                input_path,
                output_path,
                haul_path: None,
                vessel: None,
                dry_run: false,
            },
            performance: PerformanceConfig::default(),
            logging: LoggingConfig::default(),
        }
    }

    /// Default input directory: `~/Desktop/CTD`
    pub fn default_input_path() -> PathBuf {
        dirs::home_dir()
            .unwrap_or_else(|| PathBuf::from("."))
            .join("Desktop")
            .join("CTD")
    }

    /// Default output directory: `~/Desktop/CTD output`
    pub fn default_output_path() -> PathBuf {
        dirs::home_dir()
            .unwrap_or_else(|| PathBuf::from("."))
            .join("Desktop")
            .join("CTD output")
    }

    /// Default config file location: `<config dir>/ctd-processor/config.toml`
    pub fn default_config_path() -> Result<PathBuf> {
        let base = dirs::config_dir()
            .ok_or_else(|| Error::configuration("no user configuration directory available"))?;
        Ok(base.join("ctd-processor").join("config.toml"))
    }

    /// Load a configuration file (TOML)
    pub fn from_file(path: &Path) -> Result<Self> {
        let text = std::fs::read_to_string(path)
            .map_err(|e| Error::io(format!("failed to read config {}", path.display()), e))?;
        let config: Self = toml::from_str(&text).map_err(|e| {
            Error::configuration(format!("invalid config file {}: {}", path.display(), e))
        })?;
        Ok(config)
    }

    /// Layered load: defaults, then the config file when present, then
    /// explicit path arguments.
    pub fn load_layered(
        input_path: Option<PathBuf>,
        output_path: Option<PathBuf>,
        config_file: Option<&Path>,
    ) -> Result<Self> {
        let mut config = match config_file {
            Some(path) => Self::from_file(path)?,
            None => Self::new(Self::default_input_path(), Self::default_output_path()),
        };

        if let Some(input) = input_path {
            config.processing.input_path = input;
        }
        if let Some(output) = output_path {
            config.processing.output_path = output;
        }

        debug!("layered configuration: {:?}", config);
        Ok(config)
    }

    /// Validate settings before processing starts
    pub fn validate(&self) -> Result<()> {
        if !self.processing.input_path.exists() {
            return Err(Error::configuration(format!(
                "input path does not exist: {}",
                self.processing.input_path.display()
            )));
        }
        if self.performance.parallel_workers == 0 {
            return Err(Error::configuration(
                "parallel_workers must be at least 1".to_string(),
            ));
        }
        if let Some(haul_path) = &self.processing.haul_path {
            if !haul_path.exists() {
                return Err(Error::configuration(format!(
                    "haul file does not exist: {}",
                    haul_path.display()
                )));
            }
        }
        Ok(())
    }

    /// Create the output directory if absent (idempotent)
    pub fn ensure_output_directory(&self) -> Result<()> {
        std::fs::create_dir_all(&self.processing.output_path).map_err(|e| {
            Error::configuration(format!(
                "failed to create output directory '{}': {}",
                self.processing.output_path.display(),
                e
            ))
        })
    }
}
