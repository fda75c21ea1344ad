//! End-to-end tests for the single-pass hex file parser

use super::{banner_line, create_temp_file, minimal_hex_content, zero_row};
use crate::app::services::hex_parser::HexParser;

#[tokio::test]
async fn test_minimal_file_end_to_end() {
    // banner + samples + one cast spanning 0..9, then 10 all-zero rows
    let temp_file = create_temp_file(&minimal_hex_content(10));

    let parser = HexParser::new();
    let result = parser.parse_file(temp_file.path()).await.unwrap();

    assert_eq!(result.header.serial_number.as_deref(), Some("5048"));
    assert_eq!(result.header.total_samples, Some(10));
    assert_eq!(result.header.casts.len(), 1);
    assert_eq!(result.header.casts[0].first_sample, 0);
    assert_eq!(result.header.casts[0].last_sample, 9);

    // base record: T, C, P counts, pressure temp voltage, clock
    assert_eq!(result.samples.num_rows(), 10);
    assert_eq!(result.samples.num_columns(), 5);
    assert_eq!(result.stats.rows_decoded, 10);
    assert_eq!(result.stats.rows_skipped, 0);

    // zero counts pass through the transform chains untouched
    for row in 0..10 {
        assert_eq!(result.samples.value("Temperature A/D Counts", row), Some(0.0));
        assert_eq!(result.samples.value("Conductivity Frequency", row), Some(0.0));
        assert_eq!(result.samples.value("Pressure A/D Counts", row), Some(0.0));
    }
}

#[tokio::test]
async fn test_declared_count_with_matching_rows() {
    let temp_file = create_temp_file(&minimal_hex_content(25));
    let result = HexParser::new()
        .parse_file(temp_file.path())
        .await
        .unwrap();

    assert_eq!(result.samples.num_rows(), 25);
    let names = result.samples.column_names();
    assert_eq!(
        names,
        vec![
            "Temperature A/D Counts",
            "Conductivity Frequency",
            "Pressure A/D Counts",
            "Pressure Temperature Compensation Voltage",
            "Time, Seconds since January 1, 2000",
        ]
    );
}

#[tokio::test]
async fn test_early_stream_end_tolerated() {
    let mut content = String::new();
    content.push_str(banner_line());
    content.push('\n');
    content.push_str("* samples = 100\n");
    content.push_str("*END*\n");
    for _ in 0..7 {
        content.push_str(&zero_row(30));
        content.push('\n');
    }
    let temp_file = create_temp_file(&content);

    let result = HexParser::new()
        .parse_file(temp_file.path())
        .await
        .unwrap();

    assert_eq!(result.header.total_samples, Some(100));
    assert_eq!(result.samples.num_rows(), 7);
    assert_eq!(result.stats.rows_skipped, 0);
}

#[tokio::test]
async fn test_voltage_channel_enable_changes_schema() {
    let build = |volt0: &str| {
        format!(
            "{}\n* samples = 2\n* Ext Volt 0 = {}, Ext Volt 1 = no\n*END*\n{}\n{}\n",
            banner_line(),
            volt0,
            zero_row(34),
            zero_row(34)
        )
    };

    // enabled: the 4-char voltage field is sliced out of each row
    let enabled_file = create_temp_file(&build("yes"));
    let enabled = HexParser::new()
        .parse_file(enabled_file.path())
        .await
        .unwrap();
    assert!(enabled
        .samples
        .column_names()
        .contains(&"External Voltage 0"));
    assert_eq!(enabled.samples.num_columns(), 6);

    // disabled: same data bytes present, but the rule is never sliced
    let disabled_file = create_temp_file(&build("no"));
    let disabled = HexParser::new()
        .parse_file(disabled_file.path())
        .await
        .unwrap();
    assert!(!disabled
        .samples
        .column_names()
        .contains(&"External Voltage 0"));
    assert_eq!(disabled.samples.num_columns(), 5);
    assert_eq!(disabled.stats.rows_decoded, 2);
}

#[tokio::test]
async fn test_late_header_marker_after_sentinel() {
    // the cast marker appears after *END*; it must still be absorbed and
    // the line must not be decoded as data
    let mut content = String::new();
    content.push_str(banner_line());
    content.push('\n');
    content.push_str("* samples = 2\n");
    content.push_str("*END*\n");
    content.push_str(&zero_row(30));
    content.push('\n');
    content.push_str("* cast 1 21 May 2016 10:15:00, 0 to 1, avg = 5\n");
    content.push_str(&zero_row(30));
    content.push('\n');
    let temp_file = create_temp_file(&content);

    let result = HexParser::new()
        .parse_file(temp_file.path())
        .await
        .unwrap();

    assert_eq!(result.header.casts.len(), 1);
    assert_eq!(result.samples.num_rows(), 2);
}

#[tokio::test]
async fn test_schema_mismatch_rows_surfaced() {
    let mut content = minimal_hex_content(2);
    content.push_str("0000\n"); // short row
    let temp_file = create_temp_file(&content);

    let result = HexParser::new()
        .parse_file(temp_file.path())
        .await
        .unwrap();

    assert_eq!(result.stats.rows_decoded, 2);
    assert_eq!(result.stats.rows_skipped, 1);
    assert!(!result.stats.errors.is_empty());
    assert_eq!(result.samples.num_rows(), 2);
}

#[tokio::test]
async fn test_missing_file_is_io_error() {
    let parser = HexParser::new();
    let result = parser
        .parse_file(std::path::Path::new("/nonexistent/cast.hex"))
        .await;
    assert!(result.is_err());
}

#[tokio::test]
async fn test_file_without_sentinel_decodes_no_rows() {
    let content = format!("{}\n* samples = 5\n", banner_line());
    let temp_file = create_temp_file(&content);

    let result = HexParser::new()
        .parse_file(temp_file.path())
        .await
        .unwrap();

    assert_eq!(result.header.total_samples, Some(5));
    assert_eq!(result.samples.num_rows(), 0);
    assert_eq!(result.samples.num_columns(), 0);
}
