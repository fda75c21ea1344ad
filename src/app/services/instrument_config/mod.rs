//! Instrument configuration (.xmlcon) loading
//!
//! A Seabird xmlcon document declares the instrument identity and an
//! ordered sensor array whose entries carry the per-sensor calibration
//! coefficients. The decode stage is driven by the hex header's enable
//! flags, not by this sensor list; the conversion stage cross-checks the
//! two and looks coefficients up here by sensor identity.

pub mod parser;

pub use parser::load;

use crate::constants::INSTRUMENT_FAMILY;
use crate::{Error, Result};
use std::collections::HashMap;

/// Sensor families recognized in the xmlcon sensor array
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum SensorType {
    Temperature,
    Conductivity,
    Pressure,
    /// SBE 43 dissolved oxygen on an external voltage channel
    Oxygen,
    /// Aanderaa optode oxygen (serial channel)
    Optode,
    NotInUse,
    Unknown,
}

impl SensorType {
    /// Map an xmlcon sensor element name to a sensor family
    pub fn from_element_name(name: &str) -> Self {
        match name {
            "TemperatureSensor" => Self::Temperature,
            "ConductivitySensor" => Self::Conductivity,
            "PressureSensor" => Self::Pressure,
            "OxygenSensor" => Self::Oxygen,
            "NotInUse" => Self::NotInUse,
            other if other.contains("Optode") => Self::Optode,
            _ => Self::Unknown,
        }
    }
}

/// One entry of the xmlcon sensor array
#[derive(Debug, Clone)]
pub struct SensorDescriptor {
    /// Position in the sensor array (0 = temperature, 1 = conductivity,
    /// 2 = pressure, 3.. = external voltage channels)
    pub channel: usize,

    pub sensor_type: SensorType,

    /// xmlcon element name, kept for unknown sensor kinds
    pub element_name: String,

    pub serial_number: Option<String>,

    /// Numeric calibration coefficients keyed by their xmlcon element
    /// names (e.g. "A0", "G", "PTCA1", "Soc")
    pub coefficients: HashMap<String, f64>,
}

impl SensorDescriptor {
    /// External voltage channel number for auxiliary sensors, derived
    /// from the SBE 19plus V2 array layout
    pub fn voltage_channel(&self) -> Option<u8> {
        self.channel.checked_sub(3).map(|c| c as u8)
    }

    pub fn coefficient(&self, name: &str) -> Option<f64> {
        self.coefficients.get(name).copied()
    }
}

/// Parsed instrument configuration for one deployment
#[derive(Debug, Clone)]
pub struct InstrumentConfig {
    /// Instrument name from the xmlcon document
    pub name: String,

    /// Declared number of external voltage channels, when present
    pub external_voltage_channels: Option<u32>,

    /// Sensor array in document order
    pub sensors: Vec<SensorDescriptor>,

    /// Source document identity for error reporting
    pub source: String,
}

impl InstrumentConfig {
    /// Whether this configuration describes the supported instrument family
    pub fn is_supported_family(&self) -> bool {
        self.name.contains(INSTRUMENT_FAMILY)
    }

    /// First sensor of a given family, if configured
    pub fn sensor_of_type(&self, sensor_type: SensorType) -> Option<&SensorDescriptor> {
        self.sensors.iter().find(|s| s.sensor_type == sensor_type)
    }

    /// Sensor wired to a given external voltage channel
    pub fn sensor_on_voltage_channel(&self, channel: u8) -> Option<&SensorDescriptor> {
        self.sensors
            .iter()
            .find(|s| s.voltage_channel() == Some(channel))
    }

    /// Look up a required calibration coefficient; absence is fatal for
    /// the file being converted.
    pub fn require_coefficient(&self, sensor_type: SensorType, name: &str) -> Result<f64> {
        let sensor = self.sensor_of_type(sensor_type).ok_or_else(|| {
            Error::config_resolution(
                self.source.clone(),
                format!("no {:?} sensor in configuration", sensor_type),
            )
        })?;
        sensor.coefficient(name).ok_or_else(|| {
            Error::config_resolution(
                self.source.clone(),
                format!(
                    "missing {:?} calibration coefficient '{}'",
                    sensor_type, name
                ),
            )
        })
    }
}
