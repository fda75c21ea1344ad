//! CTD Processor Library
//!
//! A Rust library for decoding Seabird SBE 19plus V2 CTD hex dump files
//! into calibrated, physical-unit measurement tables.
//!
//! This library provides tools for:
//! - Scanning hex-file headers (serial number, casts, sensor/voltage flags)
//! - Decoding fixed-width hexadecimal sample records into raw count columns
//! - Converting raw counts to engineering units with per-instrument
//!   calibration coefficients (temperature, pressure, conductivity,
//!   salinity, oxygen, depth)
//! - Loading instrument configuration (.xmlcon) files
//! - Joining samples to trawl-survey haul records
//! - Writing flat CSV measurement tables with a stable column contract

pub mod config;
pub mod constants;

// Core application modules
pub mod app {
    pub mod models;
    pub mod services {
        pub mod haul_registry;
        pub mod hex_parser;
        pub mod instrument_config;
        pub mod measurement_writer;
        pub mod unit_converter;
    }
}

// CLI modules
pub mod cli {
    pub mod args;
    pub mod commands;
}

// Re-export commonly used types
pub use app::models::{Cast, HexHeader, MeasurementTable, RawSampleTable};
pub use config::Config;

/// Result type alias for the CTD processor
pub type Result<T> = std::result::Result<T, Error>;

/// Comprehensive error types for CTD processing operations
#[derive(thiserror::Error, Debug)]
pub enum Error {
    /// I/O operation failed
    #[error("I/O error: {message}")]
    Io {
        message: String,
        #[source]
        source: std::io::Error,
    },

    /// A single fixed-width field failed to decode
    #[error("field decode error for '{variable}' at row {row}: {message}")]
    FieldDecode {
        variable: String,
        row: usize,
        message: String,
    },

    /// A data row does not reproduce the locked-in record layout
    #[error("schema mismatch at row {row}: expected {expected} hex chars, found {found}")]
    SchemaMismatch {
        row: usize,
        expected: usize,
        found: usize,
    },

    /// Instrument configuration could not be resolved
    #[error("instrument config error in '{file}': {message}")]
    ConfigResolution { file: String, message: String },

    /// xmlcon document parsing error
    #[error("xmlcon parsing error in '{file}': {message}")]
    XmlConfig {
        file: String,
        message: String,
        #[source]
        source: Option<roxmltree::Error>,
    },

    /// Haul registry error
    #[error("haul registry error: {message}")]
    HaulRegistry { message: String },

    /// CSV reading/writing error
    #[error("CSV error in file '{file}': {message}")]
    Csv {
        file: String,
        message: String,
        #[source]
        source: Option<csv::Error>,
    },

    /// Configuration error
    #[error("configuration error: {message}")]
    Configuration { message: String },

    /// Data validation error
    #[error("data validation error: {message}")]
    DataValidation { message: String },

    /// Date/time parsing error
    #[error("date/time parsing error: {message}")]
    DateTimeParsing { message: String },

    /// File not found
    #[error("file not found: {path}")]
    FileNotFound { path: String },

    /// Directory traversal error
    #[error("directory traversal error: {message}")]
    DirectoryTraversal {
        message: String,
        #[source]
        source: walkdir::Error,
    },

    /// Processing interrupted
    #[error("processing interrupted: {reason}")]
    ProcessingInterrupted { reason: String },
}

impl Error {
    /// Create an I/O error with context
    pub fn io(message: impl Into<String>, source: std::io::Error) -> Self {
        Self::Io {
            message: message.into(),
            source,
        }
    }

    /// Create an I/O error with a simple message
    pub fn io_error(message: impl Into<String>) -> Self {
        let message_str = message.into();
        Self::Io {
            message: message_str.clone(),
            source: std::io::Error::new(std::io::ErrorKind::Other, message_str),
        }
    }

    /// Create a field decode error
    pub fn field_decode(
        variable: impl Into<String>,
        row: usize,
        message: impl Into<String>,
    ) -> Self {
        Self::FieldDecode {
            variable: variable.into(),
            row,
            message: message.into(),
        }
    }

    /// Create a schema mismatch error
    pub fn schema_mismatch(row: usize, expected: usize, found: usize) -> Self {
        Self::SchemaMismatch {
            row,
            expected,
            found,
        }
    }

    /// Create an instrument config resolution error
    pub fn config_resolution(file: impl Into<String>, message: impl Into<String>) -> Self {
        Self::ConfigResolution {
            file: file.into(),
            message: message.into(),
        }
    }

    /// Create an xmlcon parsing error
    pub fn xml_config(
        file: impl Into<String>,
        message: impl Into<String>,
        source: Option<roxmltree::Error>,
    ) -> Self {
        Self::XmlConfig {
            file: file.into(),
            message: message.into(),
            source,
        }
    }

    /// Create a haul registry error
    pub fn haul_registry(message: impl Into<String>) -> Self {
        Self::HaulRegistry {
            message: message.into(),
        }
    }

    /// Create a CSV error with context
    pub fn csv(
        file: impl Into<String>,
        message: impl Into<String>,
        source: Option<csv::Error>,
    ) -> Self {
        Self::Csv {
            file: file.into(),
            message: message.into(),
            source,
        }
    }

    /// Create a configuration error
    pub fn configuration(message: impl Into<String>) -> Self {
        Self::Configuration {
            message: message.into(),
        }
    }

    /// Create a data validation error
    pub fn data_validation(message: impl Into<String>) -> Self {
        Self::DataValidation {
            message: message.into(),
        }
    }

    /// Create a date/time parsing error
    pub fn datetime_parsing(message: impl Into<String>) -> Self {
        Self::DateTimeParsing {
            message: message.into(),
        }
    }

    /// Create a file not found error
    pub fn file_not_found(path: impl Into<String>) -> Self {
        Self::FileNotFound { path: path.into() }
    }

    /// Create a directory traversal error
    pub fn directory_traversal(message: impl Into<String>, source: walkdir::Error) -> Self {
        Self::DirectoryTraversal {
            message: message.into(),
            source,
        }
    }

    /// Create a processing interrupted error
    pub fn processing_interrupted(reason: impl Into<String>) -> Self {
        Self::ProcessingInterrupted {
            reason: reason.into(),
        }
    }

    /// Whether this error is fatal for the current file only (the batch
    /// continues with the next file)
    pub fn is_per_file(&self) -> bool {
        matches!(
            self,
            Error::Io { .. }
                | Error::ConfigResolution { .. }
                | Error::XmlConfig { .. }
                | Error::FileNotFound { .. }
                | Error::DataValidation { .. }
        )
    }
}

// Automatic conversions from common error types
impl From<std::io::Error> for Error {
    fn from(error: std::io::Error) -> Self {
        Self::Io {
            message: "I/O operation failed".to_string(),
            source: error,
        }
    }
}

impl From<csv::Error> for Error {
    fn from(error: csv::Error) -> Self {
        Self::Csv {
            file: "unknown".to_string(),
            message: "CSV processing failed".to_string(),
            source: Some(error),
        }
    }
}

impl From<chrono::ParseError> for Error {
    fn from(error: chrono::ParseError) -> Self {
        Self::DateTimeParsing {
            message: error.to_string(),
        }
    }
}

impl From<walkdir::Error> for Error {
    fn from(error: walkdir::Error) -> Self {
        Self::DirectoryTraversal {
            message: "directory traversal failed".to_string(),
            source: error,
        }
    }
}
