//! Core hex-file parser implementation
//!
//! Single pass over the file as an explicit two-phase state machine:
//! header lines are absorbed into the [`HexHeader`] accumulator until the
//! data-start sentinel, after which every non-header-shaped line is a
//! fixed-width data record. Header-shaped lines (leading `*`) that appear
//! after the sentinel are still absorbed, because some deployments place
//! markers near the end of the header block only.

use std::path::Path;
use tokio::io::AsyncBufReadExt;
use tracing::{debug, info, warn};

use super::decoder::SampleDecoder;
use super::stats::{ParseResult, ParseStats};
use crate::app::models::HexHeader;
use crate::constants::HEADER_LINE_PREFIX;
use crate::{Error, Result};

/// Decode phase of the single-pass scan
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum ParserState {
    ScanningHeader,
    DecodingData,
}

/// Line-oriented parser for SBE 19plus V2 hex dump files
///
/// The parser owns no state between files; every call to
/// [`HexParser::parse_file`] builds a fresh header accumulator, decoder
/// and raw table, so files may be parsed concurrently from independent
/// tasks.
#[derive(Debug, Default)]
pub struct HexParser;

impl HexParser {
    pub fn new() -> Self {
        Self
    }

    /// Parse a hex file into its header and raw sample table.
    ///
    /// The file is consumed one line at a time; an unreadable file is an
    /// error, while row- and field-level decode failures are recovered
    /// and surfaced through [`ParseStats`].
    pub async fn parse_file(&self, file_path: &Path) -> Result<ParseResult> {
        info!("Parsing hex file: {}", file_path.display());

        let file = tokio::fs::File::open(file_path).await.map_err(|e| {
            Error::io(
                format!("failed to open hex file {}", file_path.display()),
                e,
            )
        })?;
        let reader = tokio::io::BufReader::new(file);
        let mut lines = reader.lines();

        let mut header = HexHeader::new();
        let mut stats = ParseStats::new();
        let mut state = ParserState::ScanningHeader;
        let mut decoder: Option<SampleDecoder> = None;
        let mut line_index = 0usize;

        while let Some(line) = lines.next_line().await.map_err(|e| {
            Error::io(
                format!("failed to read line from {}", file_path.display()),
                e,
            )
        })? {
            stats.total_lines += 1;

            match state {
                ParserState::ScanningHeader => {
                    stats.header_lines += 1;
                    header.absorb_line(&line, line_index);
                    if header.data_start_line.is_some() {
                        state = ParserState::DecodingData;
                    }
                }
                ParserState::DecodingData => {
                    if line.starts_with(HEADER_LINE_PREFIX) {
                        // late header markers interleave with data rows
                        stats.header_lines += 1;
                        header.absorb_line(&line, line_index);
                    } else {
                        let decoder =
                            decoder.get_or_insert_with(|| SampleDecoder::new(&header));
                        decoder.decode_line(&line, &mut stats);
                    }
                }
            }
            line_index += 1;
        }

        if header.data_start_line.is_none() {
            warn!(
                "no data-start sentinel in {}; file decoded as header only",
                file_path.display()
            );
        }

        if let Err(e) = header.validate() {
            warn!("{}: {}", file_path.display(), e);
        }

        let samples = decoder.map(SampleDecoder::into_table).unwrap_or_default();

        if let Some(declared) = header.total_samples {
            if samples.num_rows() < declared {
                debug!(
                    "stream ended early: {} of {} declared samples decoded",
                    samples.num_rows(),
                    declared
                );
            }
        }

        info!(
            "Parsed {} rows ({} skipped, {} field errors) from {} lines",
            stats.rows_decoded, stats.rows_skipped, stats.field_errors, stats.total_lines
        );

        Ok(ParseResult {
            header,
            samples,
            stats,
        })
    }
}
