//! Application constants for the CTD processor
//!
//! This module contains the header line markers, the measurement-table
//! column contract, and the physical/format constants used throughout
//! the application.

// =============================================================================
// Hex File Header Markers
// =============================================================================

/// Instrument banner prefix carrying the serial number and end date/time
pub const MARKER_BANNER: &str = "* SBE 19plus V";

/// Separator between the banner text and the serial number / end date
pub const MARKER_SERIAL: &str = "SERIAL NO.";

/// Total sample count line
pub const MARKER_SAMPLES: &str = "* samples";

/// Mode line carrying the pump delay (and sample interval when moored)
pub const MARKER_MODE: &str = "* mode =";

/// Pressure sensor description line
pub const MARKER_PRESSURE_SENSOR: &str = "* pressure sensor";

/// Extra-sensor enable flags line (SBE 38, WETLABS, OPTODE, ...)
pub const MARKER_EXTRA_SENSORS: &str = "* SBE 38";

/// External voltage channel enable flags line
pub const MARKER_EXT_VOLT: &str = "* Ext Volt";

/// Per-channel voltage calibration line prefix
pub const MARKER_VOLT_CAL: &str = "* volt ";

/// Required substring for a voltage calibration line
pub const MARKER_VOLT_CAL_OFFSET: &str = "offset =";

/// Cast record line
pub const MARKER_CAST: &str = "* cast";

/// Sentinel terminating the header block; data rows start on the next line
pub const MARKER_DATA_START: &str = "*END*";

/// Any header-shaped line starts with this character, data rows never do
pub const HEADER_LINE_PREFIX: char = '*';

// =============================================================================
// Date/Time Handling
// =============================================================================

/// Calendar pattern for cast start dates ("21 May 2016 10:15:00")
pub const CAST_DATE_FORMAT: &str = "%d %B %Y %H:%M:%S";

/// Calendar pattern for the banner end date ("21 May 2016 10:02:19")
pub const BANNER_DATE_FORMAT: &str = "%d %b %Y %H:%M:%S";

/// Fixed source time zone of all instrument clocks in the survey
pub const SOURCE_TIME_ZONE: chrono_tz::Tz = chrono_tz::America::Los_Angeles;

// =============================================================================
// Sampling and Conversion Constants
// =============================================================================

/// Instrument scan rate in profiling mode (scans per second)
pub const SCAN_RATE_HZ: f64 = 4.0;

/// dbar per psi, and the standard-atmosphere offset removed from psia
pub const PSIA_TO_DBAR: f64 = 0.689476;
pub const ATM_PSI: f64 = 14.7;

/// Micromolar to ml/l conversion for dissolved oxygen
pub const OXYGEN_UMOL_PER_ML: f64 = 44.6596;

/// Latitude used for the depth calculation when no haul record matches
pub const DEFAULT_LATITUDE_DEG: f64 = 45.0;

// =============================================================================
// File Discovery
// =============================================================================

/// Raw instrument dump extension
pub const HEX_FILE_EXTENSION: &str = "hex";

/// Instrument configuration extension
pub const XMLCON_FILE_EXTENSION: &str = "xmlcon";

/// Instrument family accepted by the conversion pipeline
pub const INSTRUMENT_FAMILY: &str = "SBE 19plus V2";

// =============================================================================
// Measurement Table Column Contract
// =============================================================================

/// Output columns, in the exact order written to the delimited file.
///
/// This list is a stable external contract; downstream consumers select
/// columns by these names.
pub mod output_columns {
    pub const TEMPERATURE: &str = "Temperature (degC)";
    pub const PRESSURE: &str = "Pressure (dbars)";
    pub const CONDUCTIVITY: &str = "Conductivity (S_per_m)";
    pub const SALINITY: &str = "Salinity (psu)";
    pub const OXYGEN: &str = "Oxygen (ml_per_l)";
    pub const OPTODE_OXYGEN: &str = "OPTODE Oxygen (ml_per_l)";
    pub const DEPTH: &str = "Depth (m)";
    pub const LATITUDE: &str = "Latitude (decDeg)";
    pub const LONGITUDE: &str = "Longitude (decDeg)";
    pub const HAUL_ID: &str = "HaulID";
    pub const DATE_TIME: &str = "DateTime (ISO8601)";
    pub const YEAR: &str = "Year";
    pub const MONTH: &str = "Month";
    pub const DAY: &str = "Day";

    /// All output columns in writing order
    pub const ALL: &[&str] = &[
        TEMPERATURE,
        PRESSURE,
        CONDUCTIVITY,
        SALINITY,
        OXYGEN,
        OPTODE_OXYGEN,
        DEPTH,
        LATITUDE,
        LONGITUDE,
        HAUL_ID,
        DATE_TIME,
        YEAR,
        MONTH,
        DAY,
    ];
}

// =============================================================================
// Raw Column Variable Names
// =============================================================================

/// Variable names of the decode rule table referenced by the converter.
///
/// These mirror the Seabird data output naming so raw tables can be
/// inspected against the manufacturer's own processing output.
pub mod raw_columns {
    pub const TEMPERATURE_COUNTS: &str = "Temperature A/D Counts";
    pub const CONDUCTIVITY_FREQUENCY: &str = "Conductivity Frequency";
    pub const PRESSURE_COUNTS: &str = "Pressure A/D Counts";
    pub const PRESSURE_TEMP_VOLTAGE: &str = "Pressure Temperature Compensation Voltage";
    pub const OPTODE_OXYGEN: &str = "OPTODE Oxygen";

    /// External voltage column name for a channel index
    pub fn external_voltage(channel: u8) -> String {
        format!("External Voltage {}", channel)
    }
}
