//! Command-line argument definitions for the CTD processor
//!
//! This module defines the complete CLI interface using the clap derive
//! API.

use clap::{Parser, Subcommand, ValueEnum};
use std::path::PathBuf;

/// CLI arguments for the CTD hex-file processor
///
/// Decodes Seabird SBE 19plus V2 CTD hex dump files and converts them
/// into calibrated measurement tables written as CSV.
#[derive(Debug, Clone, Parser)]
#[command(
    name = "ctd-processor",
    version,
    about = "Decode SBE 19plus V2 CTD hex dumps into calibrated measurement CSV tables",
    long_about = "Processes raw Seabird SBE 19plus V2 CTD dump files: scans the header \
                  block, decodes the fixed-width hexadecimal sample records, applies the \
                  instrument calibration coefficients from the paired xmlcon file, joins \
                  samples to trawl-survey hauls and writes one CSV measurement table per \
                  input file."
)]
pub struct Args {
    #[command(subcommand)]
    pub command: Option<Commands>,
}

/// Available subcommands for the CTD processor
#[derive(Debug, Clone, Subcommand)]
pub enum Commands {
    /// Process hex files into measurement CSV tables (main command)
    Process(ProcessArgs),
    /// Decode one hex file's header and report its casts and flags
    Inspect(InspectArgs),
}

/// Output report format
#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum OutputFormat {
    /// Human-readable summary
    Human,
    /// JSON for machine consumption
    Json,
    /// CSV metric rows
    Csv,
}

/// Arguments for the process command (main batch processing)
#[derive(Debug, Clone, Parser)]
pub struct ProcessArgs {
    /// Input path to the CTD data root
    ///
    /// Expected layout is <root>/<year>/<vessel>/... with hex files and
    /// their xmlcon configuration files anywhere below. Defaults to
    /// ~/Desktop/CTD.
    #[arg(
        short = 'i',
        long = "input",
        value_name = "PATH",
        help = "Input path to the CTD data root"
    )]
    pub input_path: Option<PathBuf>,

    /// Output path for generated CSV files
    ///
    /// Will be created if it doesn't exist; one <year>/<vessel>/<file>.csv
    /// per processed hex file. Defaults to ~/Desktop/CTD output.
    #[arg(
        short = 'o',
        long = "output",
        value_name = "PATH",
        help = "Output path for generated CSV files"
    )]
    pub output_path: Option<PathBuf>,

    /// Trawl-survey haul CSV extract for the haul join
    ///
    /// Without it samples are still converted but every haul join misses
    /// and HaulID, latitude and longitude are left blank.
    #[arg(
        long = "hauls",
        value_name = "FILE",
        help = "Haul CSV extract for position/identifier enrichment"
    )]
    pub haul_file: Option<PathBuf>,

    /// Vessel identity override
    ///
    /// By default the vessel is taken from each file's directory layout.
    #[arg(long = "vessel", value_name = "NAME", help = "Vessel identity override")]
    pub vessel: Option<String>,

    /// Configuration file path (TOML)
    #[arg(
        long = "config",
        value_name = "FILE",
        help = "Configuration file path (TOML)"
    )]
    pub config_file: Option<PathBuf>,

    /// Number of files processed concurrently
    ///
    /// The default of 1 processes files one at a time, preserving
    /// deterministic ordering of per-file timing output.
    #[arg(
        short = 'w',
        long = "workers",
        value_name = "N",
        help = "Number of files processed concurrently"
    )]
    pub workers: Option<usize>,

    /// Report what would be processed without converting anything
    #[arg(long = "dry-run", help = "List work without converting anything")]
    pub dry_run: bool,

    /// Report output format
    #[arg(
        long = "format",
        value_enum,
        default_value = "human",
        help = "Final report format"
    )]
    pub output_format: OutputFormat,

    /// Enable verbose (debug) logging
    #[arg(short = 'v', long = "verbose", help = "Enable verbose logging")]
    pub verbose: bool,

    /// Suppress progress output
    #[arg(short = 'q', long = "quiet", help = "Suppress progress output")]
    pub quiet: bool,
}

impl ProcessArgs {
    /// Effective tracing level for this invocation
    pub fn get_log_level(&self) -> &'static str {
        if self.verbose {
            "debug"
        } else if self.quiet {
            "warn"
        } else {
            "info"
        }
    }

    /// Whether progress bars should be drawn
    pub fn show_progress(&self) -> bool {
        !self.quiet && self.output_format == OutputFormat::Human
    }

    /// Validate argument combinations
    pub fn validate(&self) -> crate::Result<()> {
        if let Some(workers) = self.workers {
            if workers == 0 {
                return Err(crate::Error::configuration(
                    "--workers must be at least 1".to_string(),
                ));
            }
        }
        Ok(())
    }
}

/// Arguments for the inspect command
#[derive(Debug, Clone, Parser)]
pub struct InspectArgs {
    /// Hex file to inspect
    #[arg(value_name = "HEX_FILE", help = "Hex file to inspect")]
    pub hex_file: PathBuf,

    /// Report output format
    #[arg(
        long = "format",
        value_enum,
        default_value = "human",
        help = "Report format"
    )]
    pub output_format: OutputFormat,

    /// Enable verbose (debug) logging
    #[arg(short = 'v', long = "verbose", help = "Enable verbose logging")]
    pub verbose: bool,
}

impl InspectArgs {
    pub fn get_log_level(&self) -> &'static str {
        if self.verbose { "debug" } else { "warn" }
    }
}
