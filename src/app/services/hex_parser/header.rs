//! Header line classification and accumulation
//!
//! The header block of a hex file is free-form text in which a fixed set
//! of literal-prefix markers carry structured fields. Lines are absorbed
//! one at a time into the [`HexHeader`] accumulator; unmatched lines and
//! malformed sub-fields are skipped without error. The format is not
//! schema-checked on purpose: deployments differ in which markers they
//! emit and where in the block they appear.

use crate::app::models::{Cast, ExtraSensor, HexHeader, VoltageCalibration};
use crate::constants::{
    BANNER_DATE_FORMAT, CAST_DATE_FORMAT, MARKER_BANNER, MARKER_CAST, MARKER_DATA_START,
    MARKER_EXT_VOLT, MARKER_EXTRA_SENSORS, MARKER_MODE, MARKER_PRESSURE_SENSOR, MARKER_SAMPLES,
    MARKER_SERIAL, MARKER_VOLT_CAL, MARKER_VOLT_CAL_OFFSET, SOURCE_TIME_ZONE,
};
use chrono::{DateTime, NaiveDateTime, TimeZone};
use chrono_tz::Tz;
use std::sync::OnceLock;
use tracing::{debug, warn};

/// Cast line body after the marker, e.g.
/// `1 21 May 2016 10:15:00, 100 to 200, avg = 5` or the on-instrument
/// variant `1  21 May 2016 10:15:00    samples 100 to 200, avg = 5`.
fn cast_regex() -> &'static regex::Regex {
    static RE: OnceLock<regex::Regex> = OnceLock::new();
    RE.get_or_init(|| {
        regex::Regex::new(
            r"^(?P<num>\d+)\s+(?P<date>\d{1,2}\s+\w+\s+\d{4}\s+\d{1,2}:\d{2}:\d{2})\s*(?:,|samples)\s*(?P<first>\d+)\s+to\s+(?P<last>\d+)\s*,\s*avg\s*=\s*(?P<avg>\d+)",
        )
        .expect("cast line regex is valid")
    })
}

/// Parse a naive local timestamp in the fixed source time zone
fn parse_source_datetime(text: &str, format: &str) -> Option<DateTime<Tz>> {
    let naive = NaiveDateTime::parse_from_str(text.trim(), format).ok()?;
    SOURCE_TIME_ZONE.from_local_datetime(&naive).earliest()
}

impl HexHeader {
    /// Classify one line against the marker set and accumulate any fields
    /// it carries. `line_index` is the zero-based position in the file and
    /// is used only to record where data rows begin.
    pub fn absorb_line(&mut self, line: &str, line_index: usize) {
        if line.starts_with(MARKER_BANNER)
            && line.contains(MARKER_SERIAL)
            && self.end_date_time.is_none()
        {
            self.absorb_banner(line);
        }

        if line.starts_with(MARKER_SAMPLES) {
            self.absorb_samples(line);
        }

        if line.starts_with(MARKER_MODE) {
            self.absorb_mode(line);
        }

        if line.starts_with(MARKER_PRESSURE_SENSOR) {
            self.absorb_pressure_sensor(line);
        }

        if line.starts_with(MARKER_EXTRA_SENSORS) {
            self.absorb_extra_sensors(line);
        }

        if line.starts_with(MARKER_EXT_VOLT) {
            self.absorb_voltage_flags(line);
        }

        if line.starts_with(MARKER_VOLT_CAL) && line.contains(MARKER_VOLT_CAL_OFFSET) {
            self.absorb_voltage_calibration(line);
        }

        if line.starts_with(MARKER_CAST) {
            self.absorb_cast(line);
        }

        if line.starts_with(MARKER_DATA_START) {
            self.data_start_line = Some(line_index + 1);
        }
    }

    /// Banner: `* SBE 19plus V 2.5.2  SERIAL NO. 5048    21 May 2016 10:02:19`
    fn absorb_banner(&mut self, line: &str) {
        let mut parts = line.splitn(2, MARKER_SERIAL);
        let _banner = parts.next();
        let Some(rest) = parts.next() else {
            return;
        };
        let rest = rest.trim();

        let Some(serial) = rest.split_whitespace().next() else {
            return;
        };
        self.serial_number = Some(serial.to_string());

        let date_text = rest[serial.len()..].trim();
        self.end_date_time = parse_source_datetime(date_text, BANNER_DATE_FORMAT);
        if self.end_date_time.is_none() {
            debug!("unparseable banner end date: '{}'", date_text);
        }
    }

    /// Samples: `* samples = 53893, free = 405356, lwait = 0 msec`
    fn absorb_samples(&mut self, line: &str) {
        let Some(first) = line.split(',').next() else {
            return;
        };
        let subparts: Vec<&str> = first.split('=').collect();
        if subparts.len() == 2 {
            if let Ok(count) = subparts[1].trim().parse::<usize>() {
                self.total_samples = Some(count);
            }
        }
    }

    /// Mode: `* mode = profile, minimum cond freq = 3000, pump delay = 60 sec`
    /// or `* mode = moored, sample interval = 15 seconds, pump delay = 30 sec`
    fn absorb_mode(&mut self, line: &str) {
        for part in line.split(',') {
            let part = part.trim();
            if let Some(rest) = part.strip_prefix("pump delay =") {
                let text = rest.replace("sec", "");
                if let Ok(delay) = text.trim().parse::<f64>() {
                    self.pump_delay_seconds = Some(delay);
                }
            } else if let Some(rest) = part.strip_prefix("sample interval =") {
                let text = rest.replace("seconds", "").replace("sec", "");
                if let Ok(interval) = text.trim().parse::<f64>() {
                    self.sample_interval_seconds = Some(interval);
                }
            }
        }
    }

    /// Pressure sensor: `* pressure sensor = strain gauge, range = 508.0`
    fn absorb_pressure_sensor(&mut self, line: &str) {
        for part in line.split(',') {
            let part = part.replace('*', "");
            let subparts: Vec<&str> = part.split('=').map(str::trim).collect();
            if subparts.len() == 2 {
                self.pressure_sensor
                    .insert(subparts[0].to_string(), subparts[1].to_string());
            }
        }
    }

    /// Extra sensors: `* SBE 38 = no, WETLABS = no, OPTODE = yes, ...`
    fn absorb_extra_sensors(&mut self, line: &str) {
        for part in line.split(',') {
            let subparts: Vec<String> = part
                .split('=')
                .map(|s| s.replace('*', "").trim().to_string())
                .collect();
            if subparts.len() == 2 {
                let key = subparts[0].replace(' ', "");
                let enabled = subparts[1] == "yes";
                match ExtraSensor::from_header_key(&key) {
                    Some(sensor) => {
                        self.extra_sensors.insert(sensor, enabled);
                    }
                    None => debug!("unknown extra sensor key '{}'", key),
                }
            }
        }
    }

    /// Voltage flags: `* Ext Volt 0 = yes, Ext Volt 1 = yes`
    fn absorb_voltage_flags(&mut self, line: &str) {
        for part in line.split(',') {
            let part = part.replace('*', "");
            let subparts: Vec<&str> = part.split('=').map(str::trim).collect();
            if subparts.len() == 2 {
                let Some(channel) = subparts[0]
                    .split_whitespace()
                    .last()
                    .and_then(|t| t.parse::<u8>().ok())
                else {
                    continue;
                };
                self.voltage_channels.insert(channel, subparts[1] == "yes");
            }
        }
    }

    /// Voltage calibration: `* volt 0: offset = -4.678210e-02, slope = 1.248624e+00`
    fn absorb_voltage_calibration(&mut self, line: &str) {
        let parts: Vec<&str> = line.splitn(2, ':').collect();
        if parts.len() != 2 {
            return;
        }
        let Some(channel) = parts[0]
            .split_whitespace()
            .last()
            .and_then(|t| t.parse::<u8>().ok())
        else {
            return;
        };

        let mut offset = None;
        let mut slope = None;
        for sub in parts[1].split(',') {
            let sub = sub.trim();
            if let Some(rest) = sub.strip_prefix("offset =") {
                offset = rest.trim().parse::<f64>().ok();
            } else if let Some(rest) = sub.strip_prefix("slope =") {
                slope = rest.trim().parse::<f64>().ok();
            }
        }

        if let (Some(offset), Some(slope)) = (offset, slope) {
            self.voltage_calibration
                .insert(channel, VoltageCalibration { offset, slope });
        } else {
            warn!("incomplete voltage calibration line: '{}'", line.trim());
        }
    }

    /// Cast: `* cast   1 21 May 2016 10:15:00 samples 100 to 200, avg = 5, ...`
    fn absorb_cast(&mut self, line: &str) {
        let body = line.trim_start_matches(MARKER_CAST).trim();
        let Some(captures) = cast_regex().captures(body) else {
            debug!("unparseable cast line: '{}'", line.trim());
            return;
        };

        let (Ok(cast_number), Ok(first_sample), Ok(last_sample), Ok(averaging_window)) = (
            captures["num"].parse::<i32>(),
            captures["first"].parse::<usize>(),
            captures["last"].parse::<usize>(),
            captures["avg"].parse::<u32>(),
        ) else {
            return;
        };

        let Some(start_time) = parse_source_datetime(&captures["date"], CAST_DATE_FORMAT) else {
            warn!("unparseable cast start date in line: '{}'", line.trim());
            return;
        };

        self.casts.push(Cast {
            cast_number,
            start_time,
            first_sample,
            last_sample,
            averaging_window,
        });
    }
}
