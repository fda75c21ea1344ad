//! Manufacturer calibration equations for SBE 19plus V2 sensors
//!
//! Each sensor's raw counts are converted with the equation published on
//! its calibration sheet, parameterized by the coefficients carried in
//! the instrument's xmlcon configuration. Coefficient structs are built
//! once per file; a missing coefficient for an active sensor is fatal
//! for that file.

use super::seawater::oxygen_solubility;
use crate::app::services::instrument_config::{InstrumentConfig, SensorType};
use crate::constants::{ATM_PSI, OXYGEN_UMOL_PER_ML, PSIA_TO_DBAR};
use crate::Result;

/// Thermistor coefficients (A0-A3)
#[derive(Debug, Clone, Copy)]
pub struct TemperatureCoefficients {
    pub a0: f64,
    pub a1: f64,
    pub a2: f64,
    pub a3: f64,
}

impl TemperatureCoefficients {
    pub fn from_config(config: &InstrumentConfig) -> Result<Self> {
        Ok(Self {
            a0: config.require_coefficient(SensorType::Temperature, "A0")?,
            a1: config.require_coefficient(SensorType::Temperature, "A1")?,
            a2: config.require_coefficient(SensorType::Temperature, "A2")?,
            a3: config.require_coefficient(SensorType::Temperature, "A3")?,
        })
    }

    /// Temperature (degC, ITS-90) from raw thermistor A/D counts
    pub fn convert(&self, counts: f64) -> f64 {
        let mv = (counts - 524_288.0) / 1.6e7;
        let r = (mv * 2.900e9 + 1.024e8) / (2.048e4 - mv * 2.0e5);
        let ln_r = r.ln();
        1.0 / (self.a0 + ln_r * (self.a1 + ln_r * (self.a2 + ln_r * self.a3))) - 273.15
    }
}

/// Strain-gauge pressure coefficients
#[derive(Debug, Clone, Copy)]
pub struct PressureCoefficients {
    pub pa0: f64,
    pub pa1: f64,
    pub pa2: f64,
    pub ptca0: f64,
    pub ptca1: f64,
    pub ptca2: f64,
    pub ptcb0: f64,
    pub ptcb1: f64,
    pub ptcb2: f64,
    pub ptempa0: f64,
    pub ptempa1: f64,
    pub ptempa2: f64,
}

impl PressureCoefficients {
    pub fn from_config(config: &InstrumentConfig) -> Result<Self> {
        let get = |name: &str| config.require_coefficient(SensorType::Pressure, name);
        Ok(Self {
            pa0: get("PA0")?,
            pa1: get("PA1")?,
            pa2: get("PA2")?,
            ptca0: get("PTCA0")?,
            ptca1: get("PTCA1")?,
            ptca2: get("PTCA2")?,
            ptcb0: get("PTCB0")?,
            ptcb1: get("PTCB1")?,
            ptcb2: get("PTCB2")?,
            ptempa0: get("PTEMPA0")?,
            ptempa1: get("PTEMPA1")?,
            ptempa2: get("PTEMPA2")?,
        })
    }

    /// Pressure (dbar, relative to the atmosphere) from raw counts and
    /// the thermistor compensation voltage.
    pub fn convert(&self, counts: f64, compensation_volts: f64) -> f64 {
        let y = compensation_volts;
        let t = self.ptempa0 + y * (self.ptempa1 + y * self.ptempa2);
        let x = counts - self.ptca0 - t * (self.ptca1 + t * self.ptca2);
        let n = x * self.ptcb0 / (self.ptcb0 + t * (self.ptcb1 + t * self.ptcb2));
        let psia = self.pa0 + n * (self.pa1 + n * self.pa2);
        (psia - ATM_PSI) * PSIA_TO_DBAR
    }
}

/// Conductivity cell coefficients (G-J plus compressibility corrections)
#[derive(Debug, Clone, Copy)]
pub struct ConductivityCoefficients {
    pub g: f64,
    pub h: f64,
    pub i: f64,
    pub j: f64,
    pub cpcor: f64,
    pub ctcor: f64,
}

impl ConductivityCoefficients {
    pub fn from_config(config: &InstrumentConfig) -> Result<Self> {
        let get = |name: &str| config.require_coefficient(SensorType::Conductivity, name);
        Ok(Self {
            g: get("G")?,
            h: get("H")?,
            i: get("I")?,
            j: get("J")?,
            cpcor: get("CPcor")?,
            ctcor: get("CTcor")?,
        })
    }

    /// Conductivity (S/m) from cell frequency (Hz), calibrated
    /// temperature (degC) and pressure (dbar).
    pub fn convert(&self, frequency_hz: f64, temperature: f64, pressure: f64) -> f64 {
        let f = frequency_hz / 1000.0; // kHz
        let f2 = f * f;
        (self.g + f2 * (self.h + f * (self.i + f * self.j)))
            / (1.0 + self.ctcor * temperature + self.cpcor * pressure)
    }
}

/// SBE 43 dissolved oxygen coefficients
#[derive(Debug, Clone, Copy)]
pub struct OxygenCoefficients {
    pub soc: f64,
    pub voffset: f64,
    pub a: f64,
    pub b: f64,
    pub c: f64,
    pub e: f64,
}

impl OxygenCoefficients {
    pub fn from_config(config: &InstrumentConfig) -> Result<Self> {
        let get = |name: &str| config.require_coefficient(SensorType::Oxygen, name);
        Ok(Self {
            soc: get("Soc")?,
            voffset: get("offset")?,
            a: get("A")?,
            b: get("B")?,
            c: get("C")?,
            e: get("E")?,
        })
    }

    /// Oxygen concentration (ml/l) from calibrated sensor voltage,
    /// temperature (degC), salinity (psu) and pressure (dbar).
    pub fn convert(&self, volts: f64, temperature: f64, salinity: f64, pressure: f64) -> f64 {
        let t = temperature;
        let kelvin = t + 273.15;
        self.soc
            * (volts + self.voffset)
            * (1.0 + t * (self.a + t * (self.b + t * self.c)))
            * oxygen_solubility(t, salinity)
            * (self.e * pressure / kelvin).exp()
    }
}

/// Optode oxygen (reported in micromolar after the decode transform
/// chain) converted to ml/l.
pub fn optode_to_ml_per_l(micromolar: f64) -> f64 {
    micromolar / OXYGEN_UMOL_PER_ML
}
