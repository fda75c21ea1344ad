//! Tests for the engineering-unit conversion stage

use super::{test_header, test_instrument, test_raw_table};
use crate::app::services::haul_registry::{HaulRecord, HaulRegistry};
use crate::app::services::unit_converter::UnitConverter;
use crate::constants::SOURCE_TIME_ZONE;
use chrono::{TimeZone, Utc};

fn haul_covering_cast() -> HaulRecord {
    // cast starts 2016-05-21 10:15:00 America/Los_Angeles = 17:15 UTC
    HaulRecord {
        haul_id: "201605021".to_string(),
        vessel: "Excalibur".to_string(),
        start_time: Utc.with_ymd_and_hms(2016, 5, 21, 17, 0, 0).unwrap(),
        end_time: Utc.with_ymd_and_hms(2016, 5, 21, 18, 0, 0).unwrap(),
        latitude: 44.625,
        longitude: -124.43,
    }
}

#[test]
fn test_out_of_cast_samples_dropped() {
    // 10 samples, cast covers 2..=5 only
    let samples = test_raw_table(10);
    let header = test_header(2, 5);
    let instrument = test_instrument(false);
    let hauls = HaulRegistry::empty();

    let table = UnitConverter::new()
        .convert(&samples, &header, &instrument, &hauls, "Excalibur")
        .unwrap();

    assert_eq!(table.len(), 4);
}

#[test]
fn test_cast_timestamps_derived_from_start() {
    let samples = test_raw_table(3);
    let header = test_header(0, 2); // avg = 4 at 4 Hz -> 1 s interval
    let instrument = test_instrument(false);
    let hauls = HaulRegistry::empty();

    let table = UnitConverter::new()
        .convert(&samples, &header, &instrument, &hauls, "Excalibur")
        .unwrap();

    let base = SOURCE_TIME_ZONE
        .with_ymd_and_hms(2016, 5, 21, 10, 15, 0)
        .unwrap();
    assert_eq!(table.rows[0].date_time, base);
    assert_eq!(table.rows[1].date_time, base + chrono::Duration::seconds(1));
    assert_eq!(table.rows[2].date_time, base + chrono::Duration::seconds(2));
}

#[test]
fn test_physical_quantities_in_range() {
    let samples = test_raw_table(1);
    let header = test_header(0, 0);
    let instrument = test_instrument(false);
    let hauls = HaulRegistry::empty();

    let table = UnitConverter::new()
        .convert(&samples, &header, &instrument, &hauls, "Excalibur")
        .unwrap();

    let row = &table.rows[0];
    let t = row.temperature.unwrap();
    let c = row.conductivity.unwrap();
    let s = row.salinity.unwrap();
    assert!(t > -5.0 && t < 40.0, "t = {}", t);
    assert!(c > 0.0 && c < 7.0, "c = {}", c);
    assert!(s > 0.0 && s < 42.0, "s = {}", s);
    assert!(row.pressure.is_some());
    assert!(row.depth.is_some());
}

#[test]
fn test_haul_join_hit_and_miss() {
    let samples = test_raw_table(1);
    let header = test_header(0, 0);
    let instrument = test_instrument(false);
    let hauls = HaulRegistry::with_hauls(vec![haul_covering_cast()]);

    // vessel matches and the cast time is inside the tow window
    let joined = UnitConverter::new()
        .convert(&samples, &header, &instrument, &hauls, "Excalibur")
        .unwrap();
    let row = &joined.rows[0];
    assert_eq!(row.haul_id.as_deref(), Some("201605021"));
    assert_eq!(row.latitude, Some(44.625));
    assert_eq!(row.longitude, Some(-124.43));

    // wrong vessel: join miss null-fills but never fails the row
    let missed = UnitConverter::new()
        .convert(&samples, &header, &instrument, &hauls, "Last Straw")
        .unwrap();
    let row = &missed.rows[0];
    assert_eq!(row.haul_id, None);
    assert_eq!(row.latitude, None);
    assert_eq!(row.longitude, None);
    // depth falls back to the fixed survey latitude
    assert!(row.depth.is_some());
}

#[test]
fn test_depth_uses_haul_latitude() {
    let samples = test_raw_table(1);
    let header = test_header(0, 0);
    let instrument = test_instrument(false);

    let hauls = HaulRegistry::with_hauls(vec![haul_covering_cast()]);
    let with_haul = UnitConverter::new()
        .convert(&samples, &header, &instrument, &hauls, "Excalibur")
        .unwrap();
    let without_haul = UnitConverter::new()
        .convert(
            &samples,
            &header,
            &instrument,
            &HaulRegistry::empty(),
            "Excalibur",
        )
        .unwrap();

    // both defined, slightly different through the gravity term
    let d1 = with_haul.rows[0].depth.unwrap();
    let d2 = without_haul.rows[0].depth.unwrap();
    assert!(d1.is_finite() && d2.is_finite());
    assert!((d1 - d2).abs() < 1.0);
}

#[test]
fn test_oxygen_requires_enabled_channel() {
    let samples = test_raw_table(1);
    let instrument = test_instrument(true);
    let hauls = HaulRegistry::empty();

    let enabled = test_header(0, 0);
    let with_oxygen = UnitConverter::new()
        .convert(&samples, &enabled, &instrument, &hauls, "Excalibur")
        .unwrap();
    assert!(with_oxygen.rows[0].oxygen.is_some());
    assert!(with_oxygen.rows[0].oxygen.unwrap() > 0.0);

    // channel disabled in the header: the configured sensor is ignored
    let mut disabled = test_header(0, 0);
    disabled.voltage_channels.insert(0, false);
    let without_oxygen = UnitConverter::new()
        .convert(&samples, &disabled, &instrument, &hauls, "Excalibur")
        .unwrap();
    assert_eq!(without_oxygen.rows[0].oxygen, None);
}

#[test]
fn test_voltage_calibration_applied_to_oxygen() {
    let samples = test_raw_table(1);
    let instrument = test_instrument(true);
    let hauls = HaulRegistry::empty();

    let identity = test_header(0, 0);
    let baseline = UnitConverter::new()
        .convert(&samples, &identity, &instrument, &hauls, "Excalibur")
        .unwrap();

    let mut scaled = test_header(0, 0);
    scaled.voltage_calibration.insert(
        0,
        crate::app::models::VoltageCalibration {
            offset: 0.0,
            slope: 1.5,
        },
    );
    let boosted = UnitConverter::new()
        .convert(&samples, &scaled, &instrument, &hauls, "Excalibur")
        .unwrap();

    assert!(boosted.rows[0].oxygen.unwrap() > baseline.rows[0].oxygen.unwrap());
}

#[test]
fn test_pump_delay_blanks_early_oxygen() {
    let samples = test_raw_table(5);
    let mut header = test_header(0, 4); // 1 s interval
    header.pump_delay_seconds = Some(3.0);
    let instrument = test_instrument(true);
    let hauls = HaulRegistry::empty();

    let table = UnitConverter::new()
        .convert(&samples, &header, &instrument, &hauls, "Excalibur")
        .unwrap();

    // samples at 0, 1 and 2 seconds are inside the delay window
    assert_eq!(table.rows[0].oxygen, None);
    assert_eq!(table.rows[1].oxygen, None);
    assert_eq!(table.rows[2].oxygen, None);
    assert!(table.rows[3].oxygen.is_some());
    assert!(table.rows[4].oxygen.is_some());

    // non-oxygen quantities are untouched by the delay
    assert!(table.rows[0].temperature.is_some());
    assert!(table.rows[0].salinity.is_some());
}

#[test]
fn test_missing_coefficient_is_fatal() {
    let samples = test_raw_table(1);
    let header = test_header(0, 0);
    let hauls = HaulRegistry::empty();

    let mut broken = test_instrument(false);
    broken.sensors[0].coefficients.remove("A2");

    let result = UnitConverter::new().convert(&samples, &header, &broken, &hauls, "Excalibur");
    assert!(result.is_err());
}

#[test]
fn test_conversion_is_idempotent() {
    let samples = test_raw_table(6);
    let header = test_header(0, 5);
    let instrument = test_instrument(true);
    let hauls = HaulRegistry::with_hauls(vec![haul_covering_cast()]);

    let converter = UnitConverter::new();
    let first = converter
        .convert(&samples, &header, &instrument, &hauls, "Excalibur")
        .unwrap();
    let second = converter
        .convert(&samples, &header, &instrument, &hauls, "Excalibur")
        .unwrap();

    assert_eq!(first.rows, second.rows);
}

#[test]
fn test_empty_input_yields_empty_table() {
    let samples = test_raw_table(0);
    let header = test_header(0, 0);
    let instrument = test_instrument(false);
    let hauls = HaulRegistry::empty();

    let table = UnitConverter::new()
        .convert(&samples, &header, &instrument, &hauls, "Excalibur")
        .unwrap();
    assert!(table.is_empty());
}
