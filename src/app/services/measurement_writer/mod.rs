//! CSV output for measurement tables
//!
//! Writes one delimited file per converted hex file, carrying exactly
//! the stable output column contract. Parent directories are created
//! idempotently so concurrent per-file writers never race on directory
//! creation.

use crate::app::models::{MeasurementRow, MeasurementTable};
use crate::constants::output_columns;
use crate::{Error, Result};
use std::path::Path;
use tracing::info;

/// Writing statistics for one output file
#[derive(Debug, Clone, Default)]
pub struct WriteStats {
    pub rows_written: usize,
    pub bytes_written: u64,
}

/// Write a measurement table to a CSV file at `output_path`.
///
/// Missing values are emitted as empty cells; timestamps are RFC 3339
/// with the source-zone offset preserved.
pub fn write_measurement_table(table: &MeasurementTable, output_path: &Path) -> Result<WriteStats> {
    if let Some(parent) = output_path.parent() {
        // create-if-absent; safe under concurrent creation
        std::fs::create_dir_all(parent).map_err(|e| {
            Error::io(
                format!("failed to create output directory {}", parent.display()),
                e,
            )
        })?;
    }

    let mut writer = csv::Writer::from_path(output_path).map_err(|e| {
        Error::csv(
            output_path.to_string_lossy().to_string(),
            "failed to create output CSV",
            Some(e),
        )
    })?;

    writer.write_record(output_columns::ALL).map_err(|e| {
        Error::csv(
            output_path.to_string_lossy().to_string(),
            "failed to write header row",
            Some(e),
        )
    })?;

    for row in &table.rows {
        writer.write_record(format_row(row)).map_err(|e| {
            Error::csv(
                output_path.to_string_lossy().to_string(),
                "failed to write data row",
                Some(e),
            )
        })?;
    }

    writer.flush().map_err(|e| {
        Error::io(
            format!("failed to flush output CSV {}", output_path.display()),
            e,
        )
    })?;

    let bytes_written = std::fs::metadata(output_path).map(|m| m.len()).unwrap_or(0);
    info!(
        "Wrote {} rows ({} bytes) to {}",
        table.len(),
        bytes_written,
        output_path.display()
    );

    Ok(WriteStats {
        rows_written: table.len(),
        bytes_written,
    })
}

/// Format one row in output column order
fn format_row(row: &MeasurementRow) -> Vec<String> {
    vec![
        format_measurement(row.temperature),
        format_measurement(row.pressure),
        format_measurement(row.conductivity),
        format_measurement(row.salinity),
        format_measurement(row.oxygen),
        format_measurement(row.optode_oxygen),
        format_measurement(row.depth),
        format_position(row.latitude),
        format_position(row.longitude),
        row.haul_id.clone().unwrap_or_default(),
        row.date_time.to_rfc3339(),
        row.year().to_string(),
        row.month().to_string(),
        row.day().to_string(),
    ]
}

/// Physical quantities at 4 decimal places, blank when missing
fn format_measurement(value: Option<f64>) -> String {
    match value {
        Some(v) if v.is_finite() => format!("{:.4}", v),
        _ => String::new(),
    }
}

/// Positions at 6 decimal places, blank when missing
fn format_position(value: Option<f64>) -> String {
    match value {
        Some(v) if v.is_finite() => format!("{:.6}", v),
        _ => String::new(),
    }
}

/// Output file path for a hex file: `<output>/<year>/<vessel>/<stem>.csv`
pub fn output_path_for(
    output_root: &Path,
    year: &str,
    vessel: &str,
    hex_file: &Path,
) -> std::path::PathBuf {
    let stem = hex_file
        .file_stem()
        .map(|s| s.to_string_lossy().to_string())
        .unwrap_or_else(|| "output".to_string());
    output_root
        .join(year)
        .join(vessel)
        .join(format!("{}.csv", stem))
}
