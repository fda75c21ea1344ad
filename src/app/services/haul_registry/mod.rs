//! Trawl-survey haul metadata loading and lookup
//!
//! Haul records enrich converted samples with position and a haul
//! identifier. The registry is loaded once per run from a CSV extract of
//! the survey haul table and queried per sample by vessel identity and
//! time containment. A lookup miss is never an error; the sample simply
//! carries no haul metadata.

use crate::{Error, Result};
use chrono::{DateTime, NaiveDateTime, Utc};
use csv::StringRecord;
use std::path::Path;
use std::time::Duration;
use tracing::{debug, info, warn};

/// One trawl-survey haul event
#[derive(Debug, Clone, PartialEq)]
pub struct HaulRecord {
    pub haul_id: String,
    pub vessel: String,
    pub start_time: DateTime<Utc>,
    pub end_time: DateTime<Utc>,
    pub latitude: f64,
    pub longitude: f64,
}

impl HaulRecord {
    /// Whether a point in time falls inside this haul's tow window
    pub fn contains(&self, time: DateTime<Utc>) -> bool {
        time >= self.start_time && time <= self.end_time
    }
}

/// Loading statistics for the haul registry
#[derive(Debug, Clone, Default)]
pub struct LoadStats {
    pub hauls_loaded: usize,
    pub rows_skipped: usize,
    pub load_duration: Duration,
    pub errors: Vec<String>,
}

/// In-memory haul registry with vessel + time window lookup
#[derive(Debug, Clone, Default)]
pub struct HaulRegistry {
    hauls: Vec<HaulRecord>,
}

/// Expected CSV column names of the haul extract
const COL_HAUL_ID: &str = "trawl_id";
const COL_VESSEL: &str = "vessel";
const COL_START: &str = "tow_start_timestamp";
const COL_END: &str = "tow_end_timestamp";
const COL_LATITUDE: &str = "latitude_dd";
const COL_LONGITUDE: &str = "longitude_dd";

impl HaulRegistry {
    /// An empty registry; every lookup misses
    pub fn empty() -> Self {
        Self::default()
    }

    pub fn haul_count(&self) -> usize {
        self.hauls.len()
    }

    pub fn is_empty(&self) -> bool {
        self.hauls.is_empty()
    }

    /// Load the registry from a haul CSV extract.
    ///
    /// Malformed rows are skipped with a warning and counted; an
    /// unreadable file or missing required column is an error.
    pub fn load(file_path: &Path) -> Result<(Self, LoadStats)> {
        info!("Loading haul registry: {}", file_path.display());
        let start_time = std::time::Instant::now();

        let mut reader = csv::ReaderBuilder::new()
            .has_headers(true)
            .trim(csv::Trim::All)
            .from_path(file_path)
            .map_err(|e| {
                Error::csv(
                    file_path.to_string_lossy().to_string(),
                    "failed to open haul CSV",
                    Some(e),
                )
            })?;

        let headers = reader
            .headers()
            .map_err(|e| {
                Error::csv(
                    file_path.to_string_lossy().to_string(),
                    "failed to read haul CSV headers",
                    Some(e),
                )
            })?
            .clone();

        let index_of = |name: &str| -> Result<usize> {
            headers
                .iter()
                .position(|h| h.eq_ignore_ascii_case(name))
                .ok_or_else(|| {
                    Error::haul_registry(format!(
                        "haul CSV {} has no '{}' column",
                        file_path.display(),
                        name
                    ))
                })
        };

        let haul_id_idx = index_of(COL_HAUL_ID)?;
        let vessel_idx = index_of(COL_VESSEL)?;
        let start_idx = index_of(COL_START)?;
        let end_idx = index_of(COL_END)?;
        let latitude_idx = index_of(COL_LATITUDE)?;
        let longitude_idx = index_of(COL_LONGITUDE)?;

        let mut registry = Self::default();
        let mut stats = LoadStats::default();
        let mut record = StringRecord::new();
        let mut row = 0usize;

        while reader.read_record(&mut record).map_err(|e| {
            Error::csv(
                file_path.to_string_lossy().to_string(),
                "failed to read haul CSV record",
                Some(e),
            )
        })? {
            row += 1;
            match parse_haul_record(
                &record,
                haul_id_idx,
                vessel_idx,
                start_idx,
                end_idx,
                latitude_idx,
                longitude_idx,
            ) {
                Ok(haul) => {
                    registry.hauls.push(haul);
                    stats.hauls_loaded += 1;
                }
                Err(e) => {
                    warn!("skipping haul row {}: {}", row, e);
                    stats.rows_skipped += 1;
                    stats.errors.push(format!("row {}: {}", row, e));
                }
            }
        }

        stats.load_duration = start_time.elapsed();
        info!(
            "Haul registry loaded: {} hauls ({} rows skipped) in {:.2}s",
            stats.hauls_loaded,
            stats.rows_skipped,
            stats.load_duration.as_secs_f64()
        );

        Ok((registry, stats))
    }

    /// Find the haul owning a sample: vessel identity plus time
    /// containment in the tow window.
    pub fn find_haul(&self, vessel: &str, time: DateTime<Utc>) -> Option<&HaulRecord> {
        let found = self
            .hauls
            .iter()
            .find(|h| h.vessel.eq_ignore_ascii_case(vessel) && h.contains(time));
        if found.is_none() {
            debug!("no haul match for vessel '{}' at {}", vessel, time);
        }
        found
    }

    #[cfg(test)]
    pub fn with_hauls(hauls: Vec<HaulRecord>) -> Self {
        Self { hauls }
    }
}

/// Parse one haul CSV row into a record
fn parse_haul_record(
    record: &StringRecord,
    haul_id_idx: usize,
    vessel_idx: usize,
    start_idx: usize,
    end_idx: usize,
    latitude_idx: usize,
    longitude_idx: usize,
) -> Result<HaulRecord> {
    let field = |idx: usize, name: &str| -> Result<&str> {
        record
            .get(idx)
            .map(str::trim)
            .filter(|v| !v.is_empty())
            .ok_or_else(|| Error::data_validation(format!("missing '{}' value", name)))
    };

    let haul_id = field(haul_id_idx, COL_HAUL_ID)?.to_string();
    let vessel = field(vessel_idx, COL_VESSEL)?.to_string();
    let start_time = parse_haul_datetime(field(start_idx, COL_START)?)?;
    let end_time = parse_haul_datetime(field(end_idx, COL_END)?)?;
    let latitude = field(latitude_idx, COL_LATITUDE)?
        .parse::<f64>()
        .map_err(|e| Error::data_validation(format!("bad latitude: {}", e)))?;
    let longitude = field(longitude_idx, COL_LONGITUDE)?
        .parse::<f64>()
        .map_err(|e| Error::data_validation(format!("bad longitude: {}", e)))?;

    if start_time > end_time {
        return Err(Error::data_validation(format!(
            "haul {} starts after it ends",
            haul_id
        )));
    }

    Ok(HaulRecord {
        haul_id,
        vessel,
        start_time,
        end_time,
        latitude,
        longitude,
    })
}

/// Parse a haul timestamp: RFC 3339 with offset, or a naive timestamp
/// taken as UTC.
fn parse_haul_datetime(text: &str) -> Result<DateTime<Utc>> {
    if let Ok(dt) = DateTime::parse_from_rfc3339(text) {
        return Ok(dt.with_timezone(&Utc));
    }
    for format in ["%Y-%m-%d %H:%M:%S", "%Y-%m-%dT%H:%M:%S"] {
        if let Ok(naive) = NaiveDateTime::parse_from_str(text, format) {
            return Ok(DateTime::from_naive_utc_and_offset(naive, Utc));
        }
    }
    Err(Error::datetime_parsing(format!(
        "unparseable haul timestamp '{}'",
        text
    )))
}
