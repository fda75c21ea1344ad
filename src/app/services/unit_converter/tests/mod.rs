//! Test utilities for the unit converter
//!
//! Builders for synthetic raw tables, headers and instrument
//! configurations with representative calibration coefficients.

use crate::app::models::{Cast, HexHeader, RawSampleTable, VoltageCalibration};
use crate::app::services::instrument_config::{
    InstrumentConfig, SensorDescriptor, SensorType,
};
use crate::constants::SOURCE_TIME_ZONE;
use chrono::TimeZone;

mod converter_tests;

pub fn sensor(
    channel: usize,
    sensor_type: SensorType,
    element_name: &str,
    coefficients: &[(&str, f64)],
) -> SensorDescriptor {
    SensorDescriptor {
        channel,
        sensor_type,
        element_name: element_name.to_string(),
        serial_number: None,
        coefficients: coefficients
            .iter()
            .map(|(k, v)| (k.to_string(), *v))
            .collect(),
    }
}

/// Instrument configuration with representative calibration sheet values
pub fn test_instrument(with_oxygen: bool) -> InstrumentConfig {
    let mut sensors = vec![
        sensor(
            0,
            SensorType::Temperature,
            "TemperatureSensor",
            &[
                ("A0", 1.231478e-3),
                ("A1", 2.706772e-4),
                ("A2", -1.368093e-6),
                ("A3", 1.911110e-7),
            ],
        ),
        sensor(
            1,
            SensorType::Conductivity,
            "ConductivitySensor",
            &[
                ("G", -1.008995),
                ("H", 1.464577e-1),
                ("I", -3.631824e-4),
                ("J", 4.919326e-5),
                ("CPcor", -9.57e-8),
                ("CTcor", 3.25e-6),
            ],
        ),
        sensor(
            2,
            SensorType::Pressure,
            "PressureSensor",
            &[
                ("PA0", 2.192664e-1),
                ("PA1", 1.547940e-3),
                ("PA2", 6.868418e-12),
                ("PTCA0", 5.246558e5),
                ("PTCA1", 4.603805),
                ("PTCA2", -9.204927e-2),
                ("PTCB0", 2.501288e1),
                ("PTCB1", -2.25e-4),
                ("PTCB2", 0.0),
                ("PTEMPA0", -6.431504e1),
                ("PTEMPA1", 5.126207e1),
                ("PTEMPA2", -2.441924e-1),
            ],
        ),
    ];

    if with_oxygen {
        sensors.push(sensor(
            3,
            SensorType::Oxygen,
            "OxygenSensor",
            &[
                ("Soc", 0.4792),
                ("offset", -0.496),
                ("A", -3.661e-3),
                ("B", 1.745e-4),
                ("C", -2.887e-6),
                ("E", 3.6e-2),
            ],
        ));
    }

    InstrumentConfig {
        name: "SBE 19plus V2 Seacat CTD".to_string(),
        external_voltage_channels: Some(if with_oxygen { 1 } else { 0 }),
        sensors,
        source: "test.xmlcon".to_string(),
    }
}

/// Header with one cast covering `first..=last`, voltage channel 0
/// enabled and a one-second sample interval (avg = 4 at 4 Hz).
pub fn test_header(first: usize, last: usize) -> HexHeader {
    let mut header = HexHeader::new();
    header.serial_number = Some("5048".to_string());
    header.total_samples = Some(last + 1);
    header.voltage_channels.insert(0, true);
    header
        .voltage_calibration
        .insert(0, VoltageCalibration { offset: 0.0, slope: 1.0 });
    header.casts.push(Cast {
        cast_number: 1,
        start_time: SOURCE_TIME_ZONE
            .with_ymd_and_hms(2016, 5, 21, 10, 15, 0)
            .unwrap(),
        first_sample: first,
        last_sample: last,
        averaging_window: 4,
    });
    header
}

/// Raw table with the base columns plus external voltage 0, all rows
/// identical: mid-scale temperature, near-surface pressure, an in-water
/// conductivity frequency and a mid-range oxygen voltage.
pub fn test_raw_table(rows: usize) -> RawSampleTable {
    let names: Vec<String> = [
        "Temperature A/D Counts",
        "Conductivity Frequency",
        "Pressure A/D Counts",
        "Pressure Temperature Compensation Voltage",
        "External Voltage 0",
    ]
    .iter()
    .map(|s| s.to_string())
    .collect();

    let mut table = RawSampleTable::with_schema(names, rows);
    for _ in 0..rows {
        table
            .push_row(&[600_000.0, 5500.0, 540_000.0, 1.35, 2.0])
            .unwrap();
    }
    table
}
