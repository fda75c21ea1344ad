//! Static field rule table for SBE 19plus V2 data records
//!
//! A data record is a run of fixed-width hexadecimal fields whose layout
//! depends on which sensors and voltage channels the deployment enabled.
//! The rule table below is order-significant: field offsets are the
//! cumulative widths of the rules that are active for the file, in table
//! order. Activation is decided once per file against the accumulated
//! header and locked before any row is decoded.

use super::hex::hex_to_u64;
use crate::app::models::{ExtraSensor, HexHeader};
use crate::{Error, Result};

/// Sensor family owning a field rule. Activation semantics differ per
/// variant: the base CTD fields and the clock are always present, voltage
/// and extra-sensor fields are gated by header enable flags.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SensorCategory {
    Temperature,
    Conductivity,
    Pressure,
    Voltage(u8),
    Extra(ExtraSensor),
    Clock,
}

/// A pure arithmetic step applied to the decoded integer value
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Transform {
    Divide(f64),
    Subtract(f64),
}

impl Transform {
    pub fn apply(&self, value: f64) -> f64 {
        match self {
            Transform::Divide(c) => value / c,
            Transform::Subtract(c) => value - c,
        }
    }
}

/// One fixed-width field of the data record
#[derive(Debug)]
pub struct FieldRule {
    pub category: SensorCategory,
    pub variable: &'static str,
    pub width: usize,
    /// Raw A/D count passed through untouched for sensor-specific
    /// calibration downstream
    pub is_raw_ad_count: bool,
    pub transforms: &'static [Transform],
}

impl FieldRule {
    /// Whether this field appears in the data records of a file with the
    /// given header flags.
    pub fn is_active(&self, header: &HexHeader) -> bool {
        match self.category {
            SensorCategory::Voltage(channel) => header.voltage_enabled(channel),
            SensorCategory::Extra(sensor) => header.extra_sensor_enabled(sensor),
            SensorCategory::Temperature
            | SensorCategory::Conductivity
            | SensorCategory::Pressure
            | SensorCategory::Clock => true,
        }
    }

    /// Decode one field slice: hex integer, then the transform chain
    pub fn decode(&self, field: &str) -> Result<f64> {
        let mut value = hex_to_u64(field)? as f64;
        for transform in self.transforms {
            value = transform.apply(value);
        }
        if value.is_nan() {
            return Err(Error::data_validation(format!(
                "transform chain for '{}' produced NaN",
                self.variable
            )));
        }
        Ok(value)
    }
}

/// The complete rule table, in record order.
pub const RULES: &[FieldRule] = &[
    FieldRule {
        category: SensorCategory::Temperature,
        variable: "Temperature A/D Counts",
        width: 6,
        is_raw_ad_count: true,
        transforms: &[],
    },
    FieldRule {
        category: SensorCategory::Conductivity,
        variable: "Conductivity Frequency",
        width: 6,
        is_raw_ad_count: false,
        transforms: &[Transform::Divide(256.0)],
    },
    FieldRule {
        category: SensorCategory::Pressure,
        variable: "Pressure A/D Counts",
        width: 6,
        is_raw_ad_count: true,
        transforms: &[],
    },
    FieldRule {
        category: SensorCategory::Pressure,
        variable: "Pressure Temperature Compensation Voltage",
        width: 4,
        is_raw_ad_count: false,
        transforms: &[Transform::Divide(13107.0)],
    },
    FieldRule {
        category: SensorCategory::Voltage(0),
        variable: "External Voltage 0",
        width: 4,
        is_raw_ad_count: false,
        transforms: &[Transform::Divide(13107.0)],
    },
    FieldRule {
        category: SensorCategory::Voltage(1),
        variable: "External Voltage 1",
        width: 4,
        is_raw_ad_count: false,
        transforms: &[Transform::Divide(13107.0)],
    },
    FieldRule {
        category: SensorCategory::Voltage(2),
        variable: "External Voltage 2",
        width: 4,
        is_raw_ad_count: false,
        transforms: &[Transform::Divide(13107.0)],
    },
    FieldRule {
        category: SensorCategory::Voltage(3),
        variable: "External Voltage 3",
        width: 4,
        is_raw_ad_count: false,
        transforms: &[Transform::Divide(13107.0)],
    },
    FieldRule {
        category: SensorCategory::Voltage(4),
        variable: "External Voltage 4",
        width: 4,
        is_raw_ad_count: false,
        transforms: &[Transform::Divide(13107.0)],
    },
    FieldRule {
        category: SensorCategory::Voltage(5),
        variable: "External Voltage 5",
        width: 4,
        is_raw_ad_count: false,
        transforms: &[Transform::Divide(13107.0)],
    },
    FieldRule {
        category: SensorCategory::Extra(ExtraSensor::Sbe38),
        variable: "SBE38 Temperature",
        width: 6,
        is_raw_ad_count: false,
        transforms: &[Transform::Divide(100_000.0), Transform::Subtract(10.0)],
    },
    FieldRule {
        category: SensorCategory::Extra(ExtraSensor::Wetlabs),
        variable: "WETLABS Signal Counts",
        width: 12,
        is_raw_ad_count: false,
        transforms: &[],
    },
    FieldRule {
        category: SensorCategory::Extra(ExtraSensor::GasTensionDevice),
        variable: "GTD Pressure",
        width: 6,
        is_raw_ad_count: false,
        transforms: &[Transform::Divide(100_000.0)],
    },
    FieldRule {
        category: SensorCategory::Extra(ExtraSensor::GasTensionDevice),
        variable: "GTD Temperature",
        width: 6,
        is_raw_ad_count: false,
        transforms: &[Transform::Divide(100_000.0), Transform::Subtract(10.0)],
    },
    FieldRule {
        category: SensorCategory::Extra(ExtraSensor::Optode),
        variable: "OPTODE Oxygen",
        width: 6,
        is_raw_ad_count: false,
        transforms: &[Transform::Divide(10_000.0), Transform::Subtract(10.0)],
    },
    FieldRule {
        category: SensorCategory::Extra(ExtraSensor::Sbe63),
        variable: "SBE63 Oxygen Phase",
        width: 6,
        is_raw_ad_count: false,
        transforms: &[Transform::Divide(100_000.0), Transform::Subtract(10.0)],
    },
    FieldRule {
        category: SensorCategory::Extra(ExtraSensor::Sbe63),
        variable: "SBE63 Oxygen Temperature Voltage",
        width: 6,
        is_raw_ad_count: false,
        transforms: &[Transform::Divide(1_000_000.0), Transform::Subtract(1.0)],
    },
    FieldRule {
        category: SensorCategory::Extra(ExtraSensor::SeaFet),
        variable: "SeaFET Internal Reference Cell Voltage",
        width: 7,
        is_raw_ad_count: false,
        transforms: &[Transform::Divide(1_000_000.0), Transform::Subtract(8.0)],
    },
    FieldRule {
        category: SensorCategory::Extra(ExtraSensor::SeaFet),
        variable: "SeaFET External Reference Cell Voltage",
        width: 12,
        is_raw_ad_count: false,
        transforms: &[Transform::Divide(1_000_000.0), Transform::Subtract(8.0)],
    },
    FieldRule {
        category: SensorCategory::Clock,
        variable: "Time, Seconds since January 1, 2000",
        width: 8,
        is_raw_ad_count: false,
        transforms: &[],
    },
];

/// The active-rule sequence of one file, locked before any row decode.
///
/// Locking once removes the per-row membership re-evaluation of the
/// header flag maps and pins the record layout for the life of the file.
#[derive(Debug)]
pub struct ActiveRules {
    rules: Vec<&'static FieldRule>,
    record_width: usize,
}

impl ActiveRules {
    /// Evaluate every rule against the header flags, in table order
    pub fn lock(header: &HexHeader) -> Self {
        let rules: Vec<&'static FieldRule> =
            RULES.iter().filter(|r| r.is_active(header)).collect();
        let record_width = rules.iter().map(|r| r.width).sum();
        Self {
            rules,
            record_width,
        }
    }

    /// Total hex characters a well-formed record must carry
    pub fn record_width(&self) -> usize {
        self.record_width
    }

    pub fn len(&self) -> usize {
        self.rules.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rules.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = &&'static FieldRule> {
        self.rules.iter()
    }

    /// Variable names of the active rules, the locked raw-table schema
    pub fn column_names(&self) -> Vec<String> {
        self.rules.iter().map(|r| r.variable.to_string()).collect()
    }
}
