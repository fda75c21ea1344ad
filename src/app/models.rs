//! Data models for CTD processing
//!
//! This module contains the core data structures produced by the hex-file
//! decode stage and consumed by the engineering-unit conversion stage:
//! the accumulated file header, cast records, the raw sample table and
//! the final calibrated measurement table.

use crate::constants::{SCAN_RATE_HZ, output_columns};
use crate::{Error, Result};
use chrono::{DateTime, Datelike};
use chrono_tz::Tz;
use std::collections::HashMap;

// =============================================================================
// Header Structures
// =============================================================================

/// Auxiliary sensors whose presence is declared in the header and gates
/// whether their fields appear in each data record.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ExtraSensor {
    Sbe38,
    Wetlabs,
    GasTensionDevice,
    Optode,
    Sbe63,
    SeaFet,
}

impl ExtraSensor {
    /// Resolve a header key (spaces already stripped, e.g. "GasTensionDevice")
    pub fn from_header_key(key: &str) -> Option<Self> {
        match key {
            "SBE38" => Some(Self::Sbe38),
            "WETLABS" => Some(Self::Wetlabs),
            "GasTensionDevice" => Some(Self::GasTensionDevice),
            "OPTODE" => Some(Self::Optode),
            "SBE63" => Some(Self::Sbe63),
            "SeaFET" => Some(Self::SeaFet),
            _ => None,
        }
    }
}

/// Offset/slope calibration for one external voltage channel
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct VoltageCalibration {
    pub offset: f64,
    pub slope: f64,
}

impl VoltageCalibration {
    /// Apply the channel calibration to a raw voltage
    pub fn apply(&self, raw_volts: f64) -> f64 {
        self.offset + self.slope * raw_volts
    }
}

/// One deployment/lowering of the instrument: a contiguous sample range
/// with its wall-clock start time.
#[derive(Debug, Clone, PartialEq)]
pub struct Cast {
    /// Cast number as recorded in the file (preserved as-seen, not
    /// necessarily monotonic)
    pub cast_number: i32,

    /// Cast start in the fixed source time zone
    pub start_time: DateTime<Tz>,

    /// First sample index belonging to this cast (inclusive)
    pub first_sample: usize,

    /// Last sample index belonging to this cast (inclusive)
    pub last_sample: usize,

    /// Number of scans averaged into each stored sample
    pub averaging_window: u32,
}

impl Cast {
    /// Validate the sample range, optionally against a declared total
    pub fn validate(&self, total_samples: Option<usize>) -> Result<()> {
        if self.first_sample > self.last_sample {
            return Err(Error::data_validation(format!(
                "cast {}: first sample {} is after last sample {}",
                self.cast_number, self.first_sample, self.last_sample
            )));
        }
        if let Some(total) = total_samples {
            if total > 0 && self.last_sample > total - 1 {
                return Err(Error::data_validation(format!(
                    "cast {}: last sample {} exceeds declared sample count {}",
                    self.cast_number, self.last_sample, total
                )));
            }
        }
        Ok(())
    }

    /// Whether a sample index falls inside this cast's range
    pub fn contains(&self, sample_index: usize) -> bool {
        sample_index >= self.first_sample && sample_index <= self.last_sample
    }
}

/// Accumulated header metadata of one hex file.
///
/// Built up line by line during the single-pass scan; every field is
/// optional until its marker line has been seen. Header lines may appear
/// anywhere, including after the data-start sentinel.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct HexHeader {
    /// Instrument serial number from the banner line
    pub serial_number: Option<String>,

    /// Recording end date/time from the banner line
    pub end_date_time: Option<DateTime<Tz>>,

    /// Declared total number of samples
    pub total_samples: Option<usize>,

    /// Seconds after cast start during which pumped sensors are unstable
    pub pump_delay_seconds: Option<f64>,

    /// Declared interval between stored samples (moored deployments)
    pub sample_interval_seconds: Option<f64>,

    /// Pressure sensor description (key -> value, kept verbatim)
    pub pressure_sensor: HashMap<String, String>,

    /// Extra-sensor enable flags
    pub extra_sensors: HashMap<ExtraSensor, bool>,

    /// External voltage channel enable flags
    pub voltage_channels: HashMap<u8, bool>,

    /// Per-channel voltage offset/slope calibration
    pub voltage_calibration: HashMap<u8, VoltageCalibration>,

    /// Casts in file order
    pub casts: Vec<Cast>,

    /// Line index of the first data row, once the sentinel has been seen
    pub data_start_line: Option<usize>,
}

impl HexHeader {
    pub fn new() -> Self {
        Self::default()
    }

    /// Whether an external voltage channel is enabled (absent means no)
    pub fn voltage_enabled(&self, channel: u8) -> bool {
        self.voltage_channels.get(&channel).copied().unwrap_or(false)
    }

    /// Whether an extra sensor is enabled (absent means no)
    pub fn extra_sensor_enabled(&self, sensor: ExtraSensor) -> bool {
        self.extra_sensors.get(&sensor).copied().unwrap_or(false)
    }

    /// Seconds between stored samples for a given cast: the declared
    /// moored interval when present, otherwise averaged profiling scans.
    pub fn sample_interval_for(&self, cast: &Cast) -> f64 {
        self.sample_interval_seconds
            .unwrap_or(cast.averaging_window.max(1) as f64 / SCAN_RATE_HZ)
    }

    /// Find the cast owning a sample index, if any
    pub fn cast_for_sample(&self, sample_index: usize) -> Option<&Cast> {
        self.casts.iter().find(|c| c.contains(sample_index))
    }

    /// Validate accumulated cast ranges against the declared sample count
    pub fn validate(&self) -> Result<()> {
        for cast in &self.casts {
            cast.validate(self.total_samples)?;
        }
        Ok(())
    }
}

// =============================================================================
// Raw Sample Table
// =============================================================================

/// One decoded raw column: the rule's variable name and its values in
/// sample order. Missing per-row values are NaN sentinels.
#[derive(Debug, Clone)]
pub struct RawColumn {
    pub name: String,
    pub values: Vec<f64>,
}

/// Columnar table of raw decoded sample values.
///
/// The column set is locked before the first data row from the active
/// field rules and never changes for the life of the table; every pushed
/// row must populate exactly that column set.
#[derive(Debug, Clone, Default)]
pub struct RawSampleTable {
    columns: Vec<RawColumn>,
    rows: usize,
}

impl RawSampleTable {
    /// Create a table with a locked column set, preallocating each column
    /// to `capacity` rows.
    pub fn with_schema(names: Vec<String>, capacity: usize) -> Self {
        let columns = names
            .into_iter()
            .map(|name| RawColumn {
                name,
                values: Vec::with_capacity(capacity),
            })
            .collect();
        Self { columns, rows: 0 }
    }

    /// Append one row. The value slice must match the locked column set.
    pub fn push_row(&mut self, values: &[f64]) -> Result<()> {
        if values.len() != self.columns.len() {
            return Err(Error::data_validation(format!(
                "row has {} values but the table has {} columns",
                values.len(),
                self.columns.len()
            )));
        }
        for (column, value) in self.columns.iter_mut().zip(values) {
            column.values.push(*value);
        }
        self.rows += 1;
        Ok(())
    }

    pub fn num_rows(&self) -> usize {
        self.rows
    }

    pub fn num_columns(&self) -> usize {
        self.columns.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows == 0
    }

    /// Column names in rule-table order
    pub fn column_names(&self) -> Vec<&str> {
        self.columns.iter().map(|c| c.name.as_str()).collect()
    }

    /// Values of a column by variable name
    pub fn column(&self, name: &str) -> Option<&[f64]> {
        self.columns
            .iter()
            .find(|c| c.name == name)
            .map(|c| c.values.as_slice())
    }

    /// A single cell, None when out of range or a NaN missing sentinel
    pub fn value(&self, name: &str, row: usize) -> Option<f64> {
        self.column(name)
            .and_then(|values| values.get(row))
            .copied()
            .filter(|v| !v.is_nan())
    }
}

// =============================================================================
// Measurement Table
// =============================================================================

/// One calibrated sample retained in the output.
///
/// Optional fields are emitted as blank cells; `date_time` is always
/// present because only samples owned by a cast are retained.
#[derive(Debug, Clone, PartialEq)]
pub struct MeasurementRow {
    pub temperature: Option<f64>,
    pub pressure: Option<f64>,
    pub conductivity: Option<f64>,
    pub salinity: Option<f64>,
    pub oxygen: Option<f64>,
    pub optode_oxygen: Option<f64>,
    pub depth: Option<f64>,
    pub latitude: Option<f64>,
    pub longitude: Option<f64>,
    pub haul_id: Option<String>,
    pub date_time: DateTime<Tz>,
}

impl MeasurementRow {
    pub fn year(&self) -> i32 {
        self.date_time.year()
    }

    pub fn month(&self) -> u32 {
        self.date_time.month()
    }

    pub fn day(&self) -> u32 {
        self.date_time.day()
    }
}

/// Final calibrated measurement table for one input file.
///
/// Produced fresh per file and immutable once returned; rows preserve the
/// original sample order of the retained (in-cast) samples.
#[derive(Debug, Clone, Default)]
pub struct MeasurementTable {
    pub rows: Vec<MeasurementRow>,
}

impl MeasurementTable {
    /// The stable output column contract, in writing order
    pub fn column_names() -> &'static [&'static str] {
        output_columns::ALL
    }

    pub fn len(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }
}
