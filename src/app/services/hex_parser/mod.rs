//! Hex-file parser for SBE 19plus V2 CTD dump files
//!
//! A hex file is a free-form header block terminated by a `*END*`
//! sentinel, followed by fixed-width hexadecimal data records. This
//! module decodes one file into a [`crate::app::models::HexHeader`] and a
//! [`crate::app::models::RawSampleTable`] in a single streaming pass.
//!
//! ## Architecture
//!
//! - [`parser`] - single-pass scan state machine and file handling
//! - [`header`] - header line classification and accumulation
//! - [`rules`] - the static field rule table and active-rule locking
//! - [`decoder`] - fixed-width record decoding with explicit cursor policy
//! - [`hex`] - the hexadecimal integer primitive
//! - [`stats`] - decode statistics and result structures
//!
//! ## Usage
//!
//! ```no_run
//! use ctd_processor::app::services::hex_parser::HexParser;
//!
//! # async fn example() -> ctd_processor::Result<()> {
//! let parser = HexParser::new();
//! let result = parser.parse_file(std::path::Path::new("cast.hex")).await?;
//!
//! println!("decoded {} samples across {} casts",
//!          result.samples.num_rows(),
//!          result.header.casts.len());
//! # Ok(())
//! # }
//! ```

pub mod decoder;
pub mod header;
pub mod hex;
pub mod parser;
pub mod rules;
pub mod stats;

#[cfg(test)]
mod tests;

// Re-export main types for easy access
pub use decoder::SampleDecoder;
pub use hex::hex_to_u64;
pub use parser::HexParser;
pub use rules::{ActiveRules, FieldRule, SensorCategory, Transform, RULES};
pub use stats::{ParseResult, ParseStats};
