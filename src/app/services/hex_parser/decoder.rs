//! Fixed-width sample record decoding
//!
//! Decodes every line at or after the data-start sentinel against the
//! locked active-rule sequence. The cursor policy is explicit: a field
//! that fails to decode is recorded as a NaN missing sentinel and the
//! cursor still advances by the rule's declared width, so one bad field
//! can never shift the remaining fields of its row. A line shorter than
//! the locked record width is a schema mismatch; the row is skipped and
//! the mismatch surfaced in the parse statistics.

use super::rules::ActiveRules;
use super::stats::ParseStats;
use crate::app::models::{HexHeader, RawSampleTable};
use tracing::debug;

/// Row-by-row decoder owning the raw table under construction.
///
/// Created once per file, after the header scan has reached the data
/// sentinel, so the active-rule sequence and the table schema are locked
/// before the first row.
#[derive(Debug)]
pub struct SampleDecoder {
    active: ActiveRules,
    table: RawSampleTable,
    row_values: Vec<f64>,
}

impl SampleDecoder {
    /// Lock the active rules against the accumulated header and
    /// preallocate column storage to the declared sample count.
    pub fn new(header: &HexHeader) -> Self {
        let active = ActiveRules::lock(header);
        let capacity = header.total_samples.unwrap_or(0);
        let table = RawSampleTable::with_schema(active.column_names(), capacity);
        let width = active.len();
        Self {
            active,
            table,
            row_values: Vec::with_capacity(width),
        }
    }

    /// Hex characters a well-formed record must carry
    pub fn record_width(&self) -> usize {
        self.active.record_width()
    }

    /// Decode one data line into the next row of the table
    pub fn decode_line(&mut self, line: &str, stats: &mut ParseStats) {
        let line = line.trim_end();
        if line.is_empty() {
            return;
        }

        let row = self.table.num_rows();
        let expected = self.active.record_width();
        if !line.is_ascii() || line.len() < expected {
            stats.rows_skipped += 1;
            stats
                .errors
                .push(format!(
                    "row {}: expected {} hex chars, found {}",
                    row,
                    expected,
                    line.len()
                ));
            debug!(
                "schema mismatch at row {}: expected {} chars, found {}",
                row,
                expected,
                line.len()
            );
            return;
        }

        self.row_values.clear();
        let mut cursor = 0usize;
        for rule in self.active.iter() {
            let field = &line[cursor..cursor + rule.width];
            match rule.decode(field) {
                Ok(value) => self.row_values.push(value),
                Err(e) => {
                    stats.field_errors += 1;
                    debug!("row {}, field '{}': {}", row, rule.variable, e);
                    self.row_values.push(f64::NAN);
                }
            }
            // the cursor advances by the declared width regardless of
            // decode success
            cursor += rule.width;
        }

        // cannot fail: row_values is built from the locked rule sequence
        if self.table.push_row(&self.row_values).is_ok() {
            stats.rows_decoded += 1;
        }
    }

    /// Finish decoding and hand over the raw table
    pub fn into_table(self) -> RawSampleTable {
        self.table
    }
}
