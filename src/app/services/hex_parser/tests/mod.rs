//! Test utilities for hex parser testing
//!
//! Helpers for building synthetic hex files with a controlled header
//! block and well-formed zero data rows.

use std::io::Write;
use tempfile::NamedTempFile;

mod parser_tests;

/// Banner line carrying serial number 5048 and an end date
pub fn banner_line() -> &'static str {
    "* SBE 19plus V 2.5.2  SERIAL NO. 5048    21 May 2016 10:02:19"
}

/// A data row of ascii zeros at the given record width
pub fn zero_row(width: usize) -> String {
    "0".repeat(width)
}

/// Minimal synthetic file: banner, sample count, one cast spanning
/// `0..samples-1`, the sentinel, then `samples` zero rows at the base
/// record width (no voltages, no extra sensors).
pub fn minimal_hex_content(samples: usize) -> String {
    let mut content = String::new();
    content.push_str(banner_line());
    content.push('\n');
    content.push_str(&format!("* samples = {}\n", samples));
    content.push_str(&format!(
        "* cast   1 21 May 2016 10:15:00 samples 0 to {}, avg = 5, stop = mag switch\n",
        samples.saturating_sub(1)
    ));
    content.push_str("*END*\n");
    for _ in 0..samples {
        content.push_str(&zero_row(30));
        content.push('\n');
    }
    content
}

/// Write content to a temporary file
pub fn create_temp_file(content: &str) -> NamedTempFile {
    let mut temp_file = NamedTempFile::new().unwrap();
    write!(temp_file, "{}", content).unwrap();
    temp_file.flush().unwrap();
    temp_file
}
