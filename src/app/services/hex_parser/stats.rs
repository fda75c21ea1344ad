//! Parsing statistics and result structures for hex-file decoding

use crate::app::models::{HexHeader, RawSampleTable};

/// Decode result for one hex file: the accumulated header, the raw
/// sample table, and decode statistics.
#[derive(Debug, Clone)]
pub struct ParseResult {
    pub header: HexHeader,
    pub samples: RawSampleTable,
    pub stats: ParseStats,
}

/// Line- and field-level decode statistics
#[derive(Debug, Clone, Default, serde::Serialize)]
pub struct ParseStats {
    /// Total lines read from the file
    pub total_lines: usize,

    /// Lines classified as header-shaped (before or after the sentinel)
    pub header_lines: usize,

    /// Data rows decoded into the raw table
    pub rows_decoded: usize,

    /// Data rows skipped for schema mismatches
    pub rows_skipped: usize,

    /// Individual fields recorded as missing after a decode failure
    pub field_errors: usize,

    /// Row-level error descriptions for debugging
    pub errors: Vec<String>,
}

impl ParseStats {
    pub fn new() -> Self {
        Self::default()
    }

    /// Fraction of data rows decoded successfully, as a percentage
    pub fn success_rate(&self) -> f64 {
        let total = self.rows_decoded + self.rows_skipped;
        if total == 0 {
            0.0
        } else {
            (self.rows_decoded as f64 / total as f64) * 100.0
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_success_rate() {
        let mut stats = ParseStats::new();
        assert_eq!(stats.success_rate(), 0.0);

        stats.rows_decoded = 9;
        stats.rows_skipped = 1;
        assert!((stats.success_rate() - 90.0).abs() < 1e-9);
    }
}
