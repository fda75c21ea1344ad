//! Shared components for CLI commands
//!
//! Common types and helpers used across command implementations: run
//! statistics, logging setup, progress reporting, and hex/xmlcon file
//! discovery under the data root.

use crate::cli::args::ProcessArgs;
use crate::constants::{HEX_FILE_EXTENSION, XMLCON_FILE_EXTENSION};
use crate::{Config, Error, Result};
use indicatif::{ProgressBar, ProgressStyle};
use std::collections::HashMap;
use std::path::{Path, PathBuf};
use tracing::{debug, warn};
use walkdir::WalkDir;

/// Processing statistics for reporting across all commands
#[derive(Debug, Clone, Default)]
pub struct ProcessingStats {
    /// Number of hex files discovered under the input root
    pub files_discovered: usize,
    /// Number of files fully converted and written
    pub files_converted: usize,
    /// Number of files that failed with a per-file fatal error
    pub files_failed: usize,
    /// Number of files skipped (unsupported instrument, no xmlcon)
    pub files_skipped: usize,
    /// Raw samples decoded across all files
    pub samples_decoded: usize,
    /// Measurement rows written across all files
    pub rows_written: usize,
    /// Haul records loaded for the join
    pub hauls_loaded: usize,
    /// Total processing time
    pub processing_time: std::time::Duration,
    /// Output file sizes in bytes
    pub output_sizes: Vec<(String, u64)>,
}

impl ProcessingStats {
    /// Calculate total output size in bytes
    pub fn total_output_size(&self) -> u64 {
        self.output_sizes.iter().map(|(_, size)| size).sum()
    }

    /// Format output size in human-readable format
    pub fn format_size(bytes: u64) -> String {
        const UNITS: &[&str] = &["B", "KB", "MB", "GB", "TB"];
        let mut size = bytes as f64;
        let mut unit_index = 0;

        while size >= 1024.0 && unit_index < UNITS.len() - 1 {
            size /= 1024.0;
            unit_index += 1;
        }

        if unit_index == 0 {
            format!("{} {}", bytes, UNITS[unit_index])
        } else {
            format!("{:.2} {}", size, UNITS[unit_index])
        }
    }
}

/// Set up structured logging at the given level
pub fn setup_logging(log_level: &str) -> Result<()> {
    use tracing_subscriber::{fmt, layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(format!("ctd_processor={}", log_level)));

    tracing_subscriber::registry()
        .with(filter)
        .with(
            fmt::layer()
                .with_target(false)
                .with_level(true)
                .with_timer(fmt::time::uptime())
                .with_writer(std::io::stderr),
        )
        .try_init()
        .ok();

    debug!("Logging initialized at level: {}", log_level);
    Ok(())
}

/// Load configuration using the layered approach (file -> args)
pub fn load_configuration(args: &ProcessArgs) -> Result<Config> {
    let default_config_path = if args.config_file.is_none() {
        Config::default_config_path().ok()
    } else {
        None
    };

    let config_file = match &args.config_file {
        Some(path) => Some(path.as_path()),
        None => default_config_path
            .as_ref()
            .filter(|path| path.exists())
            .map(|path| path.as_path()),
    };

    let mut config = Config::load_layered(
        args.input_path.clone(),
        args.output_path.clone(),
        config_file,
    )?;

    // CLI argument overrides
    if let Some(haul_file) = &args.haul_file {
        config.processing.haul_path = Some(haul_file.clone());
    }
    if let Some(vessel) = &args.vessel {
        config.processing.vessel = Some(vessel.clone());
    }
    if let Some(workers) = args.workers {
        config.performance.parallel_workers = workers;
    }
    config.processing.dry_run = args.dry_run;
    config.logging.level = args.get_log_level().to_string();

    config.validate()?;
    Ok(config)
}

/// Discover hex files under the data root, sorted for deterministic
/// processing order.
pub fn discover_hex_files(root: &Path) -> Result<Vec<PathBuf>> {
    discover_by_extension(root, HEX_FILE_EXTENSION)
}

/// Discover xmlcon configuration files under the data root
pub fn discover_xmlcon_files(root: &Path) -> Result<Vec<PathBuf>> {
    discover_by_extension(root, XMLCON_FILE_EXTENSION)
}

fn discover_by_extension(root: &Path, extension: &str) -> Result<Vec<PathBuf>> {
    let mut files = Vec::new();

    for entry in WalkDir::new(root).follow_links(false) {
        match entry {
            Ok(entry) => {
                let path = entry.path();
                if path.is_file()
                    && path
                        .extension()
                        .and_then(|s| s.to_str())
                        .is_some_and(|ext| ext.eq_ignore_ascii_case(extension))
                {
                    files.push(path.to_path_buf());
                }
            }
            Err(e) => {
                warn!("error walking {}: {}", root.display(), e);
            }
        }
    }

    files.sort();
    debug!(
        "Discovered {} .{} files under {}",
        files.len(),
        extension,
        root.display()
    );
    Ok(files)
}

/// Instrument serial number from a hex file name.
///
/// Survey file names carry a `CTD<serial>` segment, e.g.
/// `PORT_CTD5048_DO1360CT1460Op302_Hauls_1to5_21May2016.hex`.
pub fn ctd_serial_from_filename(file: &Path) -> Option<String> {
    let stem = file.file_stem()?.to_str()?;
    stem.split('_')
        .find_map(|segment| segment.strip_prefix("CTD"))
        .filter(|serial| !serial.is_empty() && serial.chars().all(|c| c.is_ascii_digit()))
        .map(|serial| serial.to_string())
}

/// Instrument serial number from an xmlcon file name
/// (e.g. `SBE19plusV2_5048.xmlcon`).
pub fn xmlcon_serial(file: &Path) -> Option<String> {
    let stem = file.file_stem()?.to_str()?;
    stem.rsplit('_')
        .next()
        .filter(|serial| !serial.is_empty() && serial.chars().all(|c| c.is_ascii_digit()))
        .map(|serial| serial.to_string())
}

/// Index xmlcon files by instrument serial number
pub fn index_xmlcon_by_serial(xmlcon_files: &[PathBuf]) -> HashMap<String, PathBuf> {
    let mut index = HashMap::new();
    for file in xmlcon_files {
        if let Some(serial) = xmlcon_serial(file) {
            index.entry(serial).or_insert_with(|| file.clone());
        }
    }
    index
}

/// Resolve the xmlcon file for a hex file: by the serial number embedded
/// in the file name, falling back to a single xmlcon in the same
/// directory.
pub fn find_xmlcon_for(
    hex_file: &Path,
    serial_index: &HashMap<String, PathBuf>,
    xmlcon_files: &[PathBuf],
) -> Option<PathBuf> {
    if let Some(serial) = ctd_serial_from_filename(hex_file) {
        if let Some(path) = serial_index.get(&serial) {
            return Some(path.clone());
        }
        debug!(
            "no xmlcon indexed for serial {} ({})",
            serial,
            hex_file.display()
        );
    }

    let parent = hex_file.parent()?;
    let mut siblings = xmlcon_files.iter().filter(|f| f.parent() == Some(parent));
    match (siblings.next(), siblings.next()) {
        (Some(only), None) => Some(only.clone()),
        _ => None,
    }
}

/// Year and vessel identity of a hex file from its layout below the
/// input root (`<root>/<year>/<vessel>/...`).
pub fn year_and_vessel_for(hex_file: &Path, input_root: &Path) -> (String, String) {
    let relative = hex_file.strip_prefix(input_root).unwrap_or(hex_file);
    let mut components = relative
        .components()
        .filter_map(|c| c.as_os_str().to_str());

    let year = components
        .next()
        .filter(|c| c.len() == 4 && c.chars().all(|ch| ch.is_ascii_digit()))
        .unwrap_or("unknown")
        .to_string();
    let vessel = components
        .next()
        .filter(|c| !c.ends_with(".hex"))
        .unwrap_or("unknown")
        .to_string();
    (year, vessel)
}

/// Check if an error is critical enough to stop the whole batch
pub fn is_critical_error(error: &Error) -> bool {
    matches!(
        error,
        Error::Configuration { .. } | Error::ProcessingInterrupted { .. }
    )
}

/// Create a progress bar with appropriate styling
pub fn create_progress_bar(total: u64, message: &str) -> ProgressBar {
    let pb = ProgressBar::new(total);
    pb.set_style(
        ProgressStyle::default_bar()
            .template("{spinner:.green} [{elapsed_precise}] [{bar:40.cyan/blue}] {pos}/{len} ({percent}%) {msg}")
            .unwrap()
            .progress_chars("#>-"),
    );
    pb.set_message(message.to_string());
    pb
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn test_processing_stats_totals() {
        let stats = ProcessingStats {
            output_sizes: vec![("a.csv".to_string(), 1000), ("b.csv".to_string(), 2000)],
            ..Default::default()
        };
        assert_eq!(stats.total_output_size(), 3000);
    }

    #[test]
    fn test_format_size() {
        assert_eq!(ProcessingStats::format_size(500), "500 B");
        assert_eq!(ProcessingStats::format_size(1536), "1.50 KB");
        assert_eq!(ProcessingStats::format_size(1048576), "1.00 MB");
    }

    #[test]
    fn test_ctd_serial_from_filename() {
        let path = Path::new("PORT_CTD5048_DO1360CT1460Op302_Hauls_1to5_21May2016.hex");
        assert_eq!(ctd_serial_from_filename(path).as_deref(), Some("5048"));

        assert_eq!(
            ctd_serial_from_filename(Path::new("no_serial_here.hex")),
            None
        );
    }

    #[test]
    fn test_xmlcon_serial() {
        assert_eq!(
            xmlcon_serial(Path::new("SBE19plusV2_5048.xmlcon")).as_deref(),
            Some("5048")
        );
        assert_eq!(xmlcon_serial(Path::new("notes.xmlcon")), None);
    }

    #[test]
    fn test_find_xmlcon_by_serial() {
        let xmlcon = vec![
            PathBuf::from("/data/2016/2016_CTD_ConFiles_Raw/SBE19plusV2_5048.xmlcon"),
            PathBuf::from("/data/2016/2016_CTD_ConFiles_Raw/SBE19plusV2_7738.xmlcon"),
        ];
        let index = index_xmlcon_by_serial(&xmlcon);

        let hex = Path::new("/data/2016/Excalibur/PORT_CTD5048_Hauls_1to5.hex");
        let found = find_xmlcon_for(hex, &index, &xmlcon).unwrap();
        assert!(found.to_string_lossy().contains("5048"));
    }

    #[test]
    fn test_find_xmlcon_sibling_fallback() {
        let xmlcon = vec![PathBuf::from("/data/2016/Excalibur/config.xmlcon")];
        let index = index_xmlcon_by_serial(&xmlcon);

        let hex = Path::new("/data/2016/Excalibur/no_serial.hex");
        let found = find_xmlcon_for(hex, &index, &xmlcon).unwrap();
        assert_eq!(found, PathBuf::from("/data/2016/Excalibur/config.xmlcon"));
    }

    #[test]
    fn test_year_and_vessel_from_layout() {
        let root = Path::new("/data/ctd");
        let hex = Path::new("/data/ctd/2016/Excalibur/PORT_CTD5048.hex");
        let (year, vessel) = year_and_vessel_for(hex, root);
        assert_eq!(year, "2016");
        assert_eq!(vessel, "Excalibur");

        let flat = Path::new("/data/ctd/PORT_CTD5048.hex");
        let (year, vessel) = year_and_vessel_for(flat, root);
        assert_eq!(year, "unknown");
        assert_eq!(vessel, "unknown");
    }

    #[test]
    fn test_discover_hex_files() {
        let temp_dir = TempDir::new().unwrap();
        let nested = temp_dir.path().join("2016").join("Excalibur");
        std::fs::create_dir_all(&nested).unwrap();
        std::fs::write(nested.join("a.hex"), "* test\n").unwrap();
        std::fs::write(nested.join("b.HEX"), "* test\n").unwrap();
        std::fs::write(nested.join("c.txt"), "not hex\n").unwrap();

        let files = discover_hex_files(temp_dir.path()).unwrap();
        assert_eq!(files.len(), 2);
    }

    #[test]
    fn test_is_critical_error() {
        assert!(is_critical_error(&Error::configuration("bad".to_string())));
        assert!(!is_critical_error(&Error::io_error("transient".to_string())));
    }
}
