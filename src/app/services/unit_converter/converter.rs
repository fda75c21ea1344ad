//! Raw-count to engineering-unit conversion
//!
//! Pure function of its declared inputs: the raw sample table and header
//! from the decode stage, the instrument calibration configuration, the
//! haul registry and the vessel identity. Produces the final measurement
//! table with the stable output column contract; the same inputs always
//! produce identical rows.

use chrono::{Duration, Utc};
use tracing::{debug, info, warn};

use super::calibration::{
    optode_to_ml_per_l, ConductivityCoefficients, OxygenCoefficients, PressureCoefficients,
    TemperatureCoefficients,
};
use super::seawater::{depth_from_pressure, practical_salinity};
use crate::app::models::{
    ExtraSensor, HexHeader, MeasurementRow, MeasurementTable, RawSampleTable,
};
use crate::app::services::haul_registry::HaulRegistry;
use crate::app::services::instrument_config::{InstrumentConfig, SensorType};
use crate::constants::{raw_columns, DEFAULT_LATITUDE_DEG};
use crate::Result;

/// Engineering-unit converter for decoded CTD samples
#[derive(Debug, Default)]
pub struct UnitConverter;

/// Resolved oxygen channel: the SBE 43 coefficients plus the raw voltage
/// column feeding them
struct OxygenChannel {
    coefficients: OxygenCoefficients,
    column: String,
    channel: u8,
}

impl UnitConverter {
    pub fn new() -> Self {
        Self
    }

    /// Convert a raw sample table into the calibrated measurement table.
    ///
    /// Samples outside every cast range are dropped. A missing
    /// calibration coefficient for an active sensor fails the whole
    /// file; a haul-lookup miss only null-fills the join columns.
    pub fn convert(
        &self,
        samples: &RawSampleTable,
        header: &HexHeader,
        instrument: &InstrumentConfig,
        hauls: &HaulRegistry,
        vessel: &str,
    ) -> Result<MeasurementTable> {
        let temperature_cal = TemperatureCoefficients::from_config(instrument)?;
        let pressure_cal = PressureCoefficients::from_config(instrument)?;
        let conductivity_cal = ConductivityCoefficients::from_config(instrument)?;
        let oxygen = self.resolve_oxygen_channel(header, instrument)?;
        self.cross_check_channels(header, instrument);

        let optode_enabled = header.extra_sensor_enabled(ExtraSensor::Optode)
            && samples.column(raw_columns::OPTODE_OXYGEN).is_some();
        let pump_delay = header.pump_delay_seconds.unwrap_or(0.0);

        let mut table = MeasurementTable::default();
        let mut dropped_out_of_cast = 0usize;

        for index in 0..samples.num_rows() {
            let Some(cast) = header.cast_for_sample(index) else {
                dropped_out_of_cast += 1;
                continue;
            };

            let interval = header.sample_interval_for(cast);
            let elapsed = (index - cast.first_sample) as f64 * interval;
            let date_time =
                cast.start_time + Duration::milliseconds((elapsed * 1000.0).round() as i64);

            let temperature = samples
                .value(raw_columns::TEMPERATURE_COUNTS, index)
                .map(|counts| temperature_cal.convert(counts));

            let pressure = match (
                samples.value(raw_columns::PRESSURE_COUNTS, index),
                samples.value(raw_columns::PRESSURE_TEMP_VOLTAGE, index),
            ) {
                (Some(counts), Some(volts)) => Some(pressure_cal.convert(counts, volts)),
                _ => None,
            };

            let conductivity = match (
                samples.value(raw_columns::CONDUCTIVITY_FREQUENCY, index),
                temperature,
                pressure,
            ) {
                (Some(frequency), Some(t), Some(p)) => {
                    Some(conductivity_cal.convert(frequency, t, p))
                }
                _ => None,
            };

            let salinity = match (conductivity, temperature, pressure) {
                (Some(c), Some(t), Some(p)) => Some(practical_salinity(c, t, p)),
                _ => None,
            };

            let haul = hauls.find_haul(vessel, date_time.with_timezone(&Utc));
            let latitude = haul.map(|h| h.latitude);
            let longitude = haul.map(|h| h.longitude);

            let depth = pressure
                .map(|p| depth_from_pressure(p, latitude.unwrap_or(DEFAULT_LATITUDE_DEG)));

            // pumped oxygen readings are unstable during the pump delay
            // window at the start of each cast
            let pump_settled = elapsed >= pump_delay;

            let oxygen_ml_per_l = if pump_settled {
                oxygen.as_ref().and_then(|channel| {
                    let raw_volts = samples.value(&channel.column, index)?;
                    let volts = header
                        .voltage_calibration
                        .get(&channel.channel)
                        .map(|cal| cal.apply(raw_volts))
                        .unwrap_or(raw_volts);
                    match (temperature, salinity, pressure) {
                        (Some(t), Some(s), Some(p)) => {
                            Some(channel.coefficients.convert(volts, t, s, p))
                        }
                        _ => None,
                    }
                })
            } else {
                None
            };

            let optode_oxygen = if pump_settled && optode_enabled {
                samples
                    .value(raw_columns::OPTODE_OXYGEN, index)
                    .map(optode_to_ml_per_l)
            } else {
                None
            };

            table.rows.push(MeasurementRow {
                temperature,
                pressure,
                conductivity,
                salinity,
                oxygen: oxygen_ml_per_l,
                optode_oxygen,
                depth,
                latitude,
                longitude,
                haul_id: haul.map(|h| h.haul_id.clone()),
                date_time,
            });
        }

        info!(
            "Converted {} of {} samples ({} outside cast ranges)",
            table.len(),
            samples.num_rows(),
            dropped_out_of_cast
        );

        Ok(table)
    }

    /// Resolve the SBE 43 oxygen channel when one is configured and its
    /// voltage channel is enabled in the header.
    fn resolve_oxygen_channel(
        &self,
        header: &HexHeader,
        instrument: &InstrumentConfig,
    ) -> Result<Option<OxygenChannel>> {
        let Some(sensor) = instrument.sensor_of_type(SensorType::Oxygen) else {
            return Ok(None);
        };
        let Some(channel) = sensor.voltage_channel() else {
            warn!(
                "oxygen sensor at array position {} is not on a voltage channel",
                sensor.channel
            );
            return Ok(None);
        };
        if !header.voltage_enabled(channel) {
            warn!(
                "oxygen sensor configured on voltage channel {} but the channel is disabled in the header",
                channel
            );
            return Ok(None);
        }

        // coefficients are required once the channel is active
        let coefficients = OxygenCoefficients::from_config(instrument)?;
        Ok(Some(OxygenChannel {
            coefficients,
            column: raw_columns::external_voltage(channel),
            channel,
        }))
    }

    /// Cross-check header enable flags against the configured sensor
    /// array; disagreements are logged, not fatal.
    fn cross_check_channels(&self, header: &HexHeader, instrument: &InstrumentConfig) {
        for channel in 0..6u8 {
            if !header.voltage_enabled(channel) {
                continue;
            }
            match instrument.sensor_on_voltage_channel(channel) {
                None => warn!(
                    "voltage channel {} enabled in header but absent from the sensor array",
                    channel
                ),
                Some(sensor) if sensor.sensor_type == SensorType::NotInUse => warn!(
                    "voltage channel {} enabled in header but marked not-in-use in the configuration",
                    channel
                ),
                Some(sensor) => debug!(
                    "voltage channel {} -> {:?} sensor",
                    channel, sensor.sensor_type
                ),
            }
        }

        if header.extra_sensor_enabled(ExtraSensor::Optode)
            && instrument.sensor_of_type(SensorType::Optode).is_none()
        {
            warn!("OPTODE enabled in header but absent from the sensor array");
        }
    }
}
