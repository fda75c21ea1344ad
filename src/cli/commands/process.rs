//! Process command implementation
//!
//! The complete batch workflow: load the haul registry, discover hex and
//! xmlcon files under the data root, pair each hex file with its
//! instrument configuration, run decode -> convert -> write per file,
//! and report a final success/failure count. A per-file fatal error is
//! logged with the file identity and the batch continues.

use super::shared::{
    create_progress_bar, ctd_serial_from_filename, discover_hex_files, discover_xmlcon_files,
    find_xmlcon_for, index_xmlcon_by_serial, is_critical_error, load_configuration, setup_logging,
    year_and_vessel_for, ProcessingStats,
};
use crate::app::services::haul_registry::HaulRegistry;
use crate::app::services::hex_parser::HexParser;
use crate::app::services::instrument_config::{self, InstrumentConfig};
use crate::app::services::measurement_writer::{output_path_for, write_measurement_table};
use crate::app::services::unit_converter::UnitConverter;
use crate::cli::args::{OutputFormat, ProcessArgs};
use crate::{Config, Error, Result};
use colored::Colorize;
use futures::stream::{self, StreamExt};
use indicatif::HumanDuration;
use std::collections::HashMap;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::Instant;
use tracing::{debug, error, info, warn};

/// Outcome of one file's pipeline run
#[derive(Debug)]
enum FileOutcome {
    Converted {
        output_file: String,
        samples_decoded: usize,
        rows_written: usize,
        bytes_written: u64,
    },
    Skipped {
        reason: String,
    },
    Failed {
        error: Error,
    },
}

/// Process command runner
///
/// Orchestrates the whole workflow:
/// 1. Set up logging and layered configuration
/// 2. Load the haul registry
/// 3. Discover and pair hex/xmlcon files
/// 4. Convert files (sequentially, or N at a time with `--workers`)
/// 5. Report final statistics
pub async fn run_process(args: ProcessArgs) -> Result<ProcessingStats> {
    let start_time = Instant::now();

    setup_logging(args.get_log_level())?;
    info!("Starting CTD processor");
    debug!("Command line arguments: {:?}", args);

    args.validate()?;
    let config = load_configuration(&args)?;
    config.ensure_output_directory()?;

    // Haul registry (optional; without it every join misses)
    let (hauls, hauls_loaded) = match &config.processing.haul_path {
        Some(path) => {
            let (registry, load_stats) = HaulRegistry::load(path)?;
            (registry, load_stats.hauls_loaded)
        }
        None => {
            warn!("no haul file given; HaulID, latitude and longitude will be blank");
            (HaulRegistry::empty(), 0)
        }
    };

    // Discover input files
    let input_root = config.processing.input_path.clone();
    info!("Searching for hex files: {}", input_root.display());
    let hex_files = discover_hex_files(&input_root)?;
    info!("hex file count: {}", hex_files.len());

    let xmlcon_files = discover_xmlcon_files(&input_root)?;
    info!("xmlcon file count: {}", xmlcon_files.len());
    let serial_index = index_xmlcon_by_serial(&xmlcon_files);

    if config.processing.dry_run {
        return run_dry_run(&config, &hex_files, &xmlcon_files, &serial_index, hauls_loaded);
    }

    let mut stats = ProcessingStats {
        files_discovered: hex_files.len(),
        hauls_loaded,
        ..Default::default()
    };

    let progress_bar = if args.show_progress() {
        Some(create_progress_bar(
            hex_files.len() as u64,
            "Processing hex files...",
        ))
    } else {
        None
    };

    // Across files the decode is embarrassingly parallel: each task owns
    // its header, table and cursor, and output directories are created
    // idempotently. workers = 1 preserves deterministic file order.
    let workers = config.performance.parallel_workers.max(1);
    let config = Arc::new(config);
    let hauls = Arc::new(hauls);
    let serial_index = Arc::new(serial_index);
    let xmlcon_files = Arc::new(xmlcon_files);

    let mut outcomes = stream::iter(hex_files.iter().cloned())
        .map(|hex_file| {
            let config = Arc::clone(&config);
            let hauls = Arc::clone(&hauls);
            let serial_index = Arc::clone(&serial_index);
            let xmlcon_files = Arc::clone(&xmlcon_files);
            async move {
                let outcome =
                    process_file(&hex_file, &config, &hauls, &serial_index, &xmlcon_files).await;
                (hex_file, outcome)
            }
        })
        .buffer_unordered(workers);

    while let Some((hex_file, outcome)) = outcomes.next().await {
        match outcome {
            FileOutcome::Converted {
                output_file,
                samples_decoded,
                rows_written,
                bytes_written,
            } => {
                stats.files_converted += 1;
                stats.samples_decoded += samples_decoded;
                stats.rows_written += rows_written;
                stats.output_sizes.push((output_file, bytes_written));
            }
            FileOutcome::Skipped { reason } => {
                warn!("skipping {}: {}", hex_file.display(), reason);
                stats.files_skipped += 1;
            }
            FileOutcome::Failed { error } => {
                error!("failed to process {}: {}", hex_file.display(), error);
                stats.files_failed += 1;
                if is_critical_error(&error) {
                    return Err(error);
                }
            }
        }
        if let Some(pb) = &progress_bar {
            pb.inc(1);
        }
    }

    if let Some(pb) = &progress_bar {
        pb.finish_with_message("Processing complete");
    }

    stats.processing_time = start_time.elapsed();
    generate_final_report(&args, &stats)?;
    Ok(stats)
}

/// Run the full pipeline for one hex file
async fn process_file(
    hex_file: &Path,
    config: &Config,
    hauls: &HaulRegistry,
    serial_index: &HashMap<String, PathBuf>,
    xmlcon_files: &[PathBuf],
) -> FileOutcome {
    let file_start = Instant::now();
    let (year, vessel_from_path) = year_and_vessel_for(hex_file, &config.processing.input_path);
    let vessel = config
        .processing
        .vessel
        .clone()
        .unwrap_or(vessel_from_path);

    info!(
        "Processing {} (year {}, vessel {}, CTD {})",
        hex_file.display(),
        year,
        vessel,
        ctd_serial_from_filename(hex_file).unwrap_or_else(|| "?".to_string())
    );

    // Resolve and load the instrument configuration
    let Some(xmlcon_path) = find_xmlcon_for(hex_file, serial_index, xmlcon_files) else {
        return FileOutcome::Skipped {
            reason: "no matching xmlcon configuration found".to_string(),
        };
    };
    debug!("xmlcon: {}", xmlcon_path.display());

    let instrument: InstrumentConfig = match instrument_config::load(&xmlcon_path) {
        Ok(instrument) => instrument,
        Err(error) => return FileOutcome::Failed { error },
    };
    if !instrument.is_supported_family() {
        return FileOutcome::Skipped {
            reason: format!("unsupported instrument '{}'", instrument.name),
        };
    }

    // Stage 1: decode the hex file
    let parse_start = Instant::now();
    let parsed = match HexParser::new().parse_file(hex_file).await {
        Ok(parsed) => parsed,
        Err(error) => return FileOutcome::Failed { error },
    };
    info!(
        "Parsing hex file took {:.2}s",
        parse_start.elapsed().as_secs_f64()
    );

    // Stage 2: convert to engineering units
    let convert_start = Instant::now();
    let table = match UnitConverter::new().convert(
        &parsed.samples,
        &parsed.header,
        &instrument,
        hauls,
        &vessel,
    ) {
        Ok(table) => table,
        Err(error) => return FileOutcome::Failed { error },
    };
    info!(
        "Converting to engineering units took {:.2}s",
        convert_start.elapsed().as_secs_f64()
    );

    // Stage 3: write the measurement table
    let output_path = output_path_for(&config.processing.output_path, &year, &vessel, hex_file);
    let write_stats = match write_measurement_table(&table, &output_path) {
        Ok(write_stats) => write_stats,
        Err(error) => return FileOutcome::Failed { error },
    };

    info!(
        "Completed {} in {:.2}s: {} samples -> {} rows",
        hex_file.display(),
        file_start.elapsed().as_secs_f64(),
        parsed.samples.num_rows(),
        write_stats.rows_written
    );

    FileOutcome::Converted {
        output_file: output_path.to_string_lossy().to_string(),
        samples_decoded: parsed.samples.num_rows(),
        rows_written: write_stats.rows_written,
        bytes_written: write_stats.bytes_written,
    }
}

/// Perform a dry run showing what would be processed
fn run_dry_run(
    config: &Config,
    hex_files: &[PathBuf],
    xmlcon_files: &[PathBuf],
    serial_index: &HashMap<String, PathBuf>,
    hauls_loaded: usize,
) -> Result<ProcessingStats> {
    info!("Performing dry run - no files will be created");

    let mut stats = ProcessingStats {
        files_discovered: hex_files.len(),
        hauls_loaded,
        ..Default::default()
    };

    for hex_file in hex_files {
        let (year, vessel) = year_and_vessel_for(hex_file, &config.processing.input_path);
        match find_xmlcon_for(hex_file, serial_index, xmlcon_files) {
            Some(xmlcon) => {
                let output = output_path_for(&config.processing.output_path, &year, &vessel, hex_file);
                info!(
                    "would process {} with {} -> {}",
                    hex_file.display(),
                    xmlcon.display(),
                    output.display()
                );
            }
            None => {
                warn!("would skip {} (no xmlcon)", hex_file.display());
                stats.files_skipped += 1;
            }
        }
    }

    info!(
        "Dry run complete: {} hex files, {} would be skipped",
        stats.files_discovered, stats.files_skipped
    );
    Ok(stats)
}

/// Generate the final processing report
fn generate_final_report(args: &ProcessArgs, stats: &ProcessingStats) -> Result<()> {
    match args.output_format {
        OutputFormat::Human => generate_human_report(stats),
        OutputFormat::Json => generate_json_report(stats),
        OutputFormat::Csv => generate_csv_report(stats),
    }
}

/// Generate human-readable report
fn generate_human_report(stats: &ProcessingStats) -> Result<()> {
    let duration = HumanDuration(stats.processing_time);
    let total_size = ProcessingStats::format_size(stats.total_output_size());

    println!();
    println!("{}", "CTD Processing Complete".bold());
    println!("{}", "━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━".dimmed());
    println!("   Files discovered:  {}", stats.files_discovered);
    println!(
        "   Files converted:   {}",
        stats.files_converted.to_string().green()
    );
    if stats.files_failed > 0 {
        println!(
            "   Files failed:      {}",
            stats.files_failed.to_string().red()
        );
    } else {
        println!("   Files failed:      0");
    }
    println!("   Files skipped:     {}", stats.files_skipped);
    println!("   Hauls loaded:      {}", stats.hauls_loaded);
    println!("   Samples decoded:   {}", stats.samples_decoded);
    println!("   Rows written:      {}", stats.rows_written);
    println!("   Total output size: {}", total_size);
    println!("   Processing time:   {}", duration);

    if !stats.output_sizes.is_empty() {
        println!();
        println!("   Output files:");
        for (filename, size) in &stats.output_sizes {
            println!("   - {}: {}", filename, ProcessingStats::format_size(*size));
        }
    }

    println!();
    Ok(())
}

/// Generate JSON report for machine consumption
fn generate_json_report(stats: &ProcessingStats) -> Result<()> {
    let json_stats = serde_json::json!({
        "files_discovered": stats.files_discovered,
        "files_converted": stats.files_converted,
        "files_failed": stats.files_failed,
        "files_skipped": stats.files_skipped,
        "hauls_loaded": stats.hauls_loaded,
        "samples_decoded": stats.samples_decoded,
        "rows_written": stats.rows_written,
        "processing_time_seconds": stats.processing_time.as_secs_f64(),
        "total_output_size_bytes": stats.total_output_size(),
        "output_files": stats.output_sizes.iter().map(|(name, size)| {
            serde_json::json!({
                "filename": name,
                "size_bytes": size
            })
        }).collect::<Vec<_>>()
    });

    println!("{}", serde_json::to_string_pretty(&json_stats).unwrap_or_default());
    Ok(())
}

/// Generate CSV report for data analysis
fn generate_csv_report(stats: &ProcessingStats) -> Result<()> {
    println!("metric,value");
    println!("files_discovered,{}", stats.files_discovered);
    println!("files_converted,{}", stats.files_converted);
    println!("files_failed,{}", stats.files_failed);
    println!("files_skipped,{}", stats.files_skipped);
    println!("hauls_loaded,{}", stats.hauls_loaded);
    println!("samples_decoded,{}", stats.samples_decoded);
    println!("rows_written,{}", stats.rows_written);
    println!(
        "processing_time_seconds,{}",
        stats.processing_time.as_secs_f64()
    );
    println!("total_output_size_bytes,{}", stats.total_output_size());
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_generate_reports_do_not_panic() {
        let stats = ProcessingStats {
            files_discovered: 3,
            files_converted: 2,
            files_failed: 1,
            files_skipped: 0,
            samples_decoded: 1000,
            rows_written: 800,
            hauls_loaded: 12,
            processing_time: std::time::Duration::from_secs(42),
            output_sizes: vec![("out.csv".to_string(), 2048)],
        };

        assert!(generate_human_report(&stats).is_ok());
        assert!(generate_json_report(&stats).is_ok());
        assert!(generate_csv_report(&stats).is_ok());
    }

    #[test]
    fn test_dry_run_counts_unpaired_files() {
        let temp_dir = tempfile::TempDir::new().unwrap();
        let config = Config::new(
            temp_dir.path().to_path_buf(),
            temp_dir.path().join("output"),
        );
        let hex_files = vec![temp_dir.path().join("orphan.hex")];
        let serial_index = HashMap::new();

        let stats = run_dry_run(&config, &hex_files, &[], &serial_index, 0).unwrap();
        assert_eq!(stats.files_discovered, 1);
        assert_eq!(stats.files_skipped, 1);
    }
}
