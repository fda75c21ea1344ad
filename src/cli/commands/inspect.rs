//! Inspect command implementation
//!
//! Decodes one hex file and reports its header: instrument identity,
//! declared sample count, sensor and voltage channel flags, voltage
//! calibration and the cast table. Useful for checking a deployment's
//! configuration before running a batch.

use super::shared::setup_logging;
use crate::app::services::hex_parser::HexParser;
use crate::cli::args::{InspectArgs, OutputFormat};
use crate::Result;
use colored::Colorize;

/// Inspect command runner
pub async fn run_inspect(args: InspectArgs) -> Result<()> {
    setup_logging(args.get_log_level())?;

    let result = HexParser::new().parse_file(&args.hex_file).await?;
    let header = &result.header;

    match args.output_format {
        OutputFormat::Json => {
            let casts: Vec<_> = header
                .casts
                .iter()
                .map(|c| {
                    serde_json::json!({
                        "cast": c.cast_number,
                        "start_time": c.start_time.to_rfc3339(),
                        "first_sample": c.first_sample,
                        "last_sample": c.last_sample,
                        "averaging_window": c.averaging_window,
                    })
                })
                .collect();

            let report = serde_json::json!({
                "file": args.hex_file.display().to_string(),
                "serial_number": header.serial_number,
                "end_date_time": header.end_date_time.map(|t| t.to_rfc3339()),
                "total_samples": header.total_samples,
                "pump_delay_seconds": header.pump_delay_seconds,
                "sample_interval_seconds": header.sample_interval_seconds,
                "rows_decoded": result.stats.rows_decoded,
                "columns": result.samples.column_names(),
                "casts": casts,
            });
            println!("{}", serde_json::to_string_pretty(&report).unwrap_or_default());
        }
        OutputFormat::Human | OutputFormat::Csv => {
            println!();
            println!("{}", args.hex_file.display().to_string().bold());
            println!(
                "   Serial number:   {}",
                header.serial_number.as_deref().unwrap_or("?")
            );
            println!(
                "   Recording ended: {}",
                header
                    .end_date_time
                    .map(|t| t.to_rfc3339())
                    .unwrap_or_else(|| "?".to_string())
            );
            println!(
                "   Declared samples: {}   decoded rows: {}",
                header
                    .total_samples
                    .map(|n| n.to_string())
                    .unwrap_or_else(|| "?".to_string()),
                result.stats.rows_decoded
            );
            if let Some(delay) = header.pump_delay_seconds {
                println!("   Pump delay:      {} s", delay);
            }

            let enabled_volts: Vec<String> = (0..6u8)
                .filter(|ch| header.voltage_enabled(*ch))
                .map(|ch| ch.to_string())
                .collect();
            println!(
                "   Voltage channels: {}",
                if enabled_volts.is_empty() {
                    "none".to_string()
                } else {
                    enabled_volts.join(", ")
                }
            );

            println!("   Columns:");
            for name in result.samples.column_names() {
                println!("   - {}", name);
            }

            println!("   Casts:");
            if header.casts.is_empty() {
                println!("   - none");
            }
            for cast in &header.casts {
                println!(
                    "   - cast {:>3}  {}  samples {} to {}  (avg = {})",
                    cast.cast_number,
                    cast.start_time.format("%Y-%m-%d %H:%M:%S %Z"),
                    cast.first_sample,
                    cast.last_sample,
                    cast.averaging_window
                );
            }
            println!();
        }
    }

    Ok(())
}
