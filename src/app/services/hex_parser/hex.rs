//! Hexadecimal field decoding primitive
//!
//! Every fixed-width field in a data record is a big-endian unsigned
//! hexadecimal integer. Field widths range from 4 to 12 digits (up to
//! 48-bit magnitudes), which fit a `u64` exactly and remain exact when
//! widened to `f64` for the raw sample table.

use crate::{Error, Result};

/// Decode a fixed-length string of hexadecimal digits as a big-endian
/// unsigned integer.
///
/// Fails on an empty string, on any non-hex character, and on widths
/// beyond 16 digits. `u64::from_str_radix` accepts a leading `+`, which
/// a hex record never contains, so digits are checked explicitly first.
pub fn hex_to_u64(digits: &str) -> Result<u64> {
    if digits.is_empty() {
        return Err(Error::data_validation("empty hex field"));
    }
    if digits.len() > 16 {
        return Err(Error::data_validation(format!(
            "hex field too wide: {} digits",
            digits.len()
        )));
    }
    if !digits.bytes().all(|b| b.is_ascii_hexdigit()) {
        return Err(Error::data_validation(format!(
            "invalid hex field '{}'",
            digits
        )));
    }

    u64::from_str_radix(digits, 16)
        .map_err(|e| Error::data_validation(format!("invalid hex field '{}': {}", digits, e)))
}
