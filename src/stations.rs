/// Station ingestion boundary.
///
/// Upstream rows arrive as `StationRecord`s (from a station file or the
/// database) and are validated here exactly once. Everything downstream of
/// `normalize_station` can assume in-range coordinates, a finite level and a
/// strictly positive specific yield.
///
/// Missing specific yields are filled from a caller-supplied default; a yield
/// that is present but not positive is rejected rather than replaced.

use serde::Deserialize;
use std::collections::HashSet;
use std::fmt;

use crate::alert::thresholds::classify_station;
use crate::model::{Coordinate, Reading, StationSnapshot};

// ---------------------------------------------------------------------------
// Raw records
// ---------------------------------------------------------------------------

/// A station as delivered by an upstream source, before validation.
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct StationRecord {
    pub id: String,
    #[serde(default)]
    pub name: Option<String>,
    pub latitude: f64,
    pub longitude: f64,
    /// Current level, meters below reference.
    pub water_level: f64,
    #[serde(default)]
    pub specific_yield: Option<f64>,
    #[serde(default)]
    pub readings: Vec<Reading>,
}

/// Top-level layout of a station file:
///
/// ```toml
/// [[station]]
/// id = "DWLR_001"
/// latitude = 25.5941
/// longitude = 85.1376
/// water_level = 12.45
/// specific_yield = 0.15
///
/// [[station.readings]]
/// timestamp = "2024-01-15T06:30:00Z"
/// level = 12.58
/// ```
#[derive(Debug, Clone, Default, Deserialize)]
pub struct StationFile {
    #[serde(default, rename = "station")]
    pub stations: Vec<StationRecord>,
}

pub fn parse_station_file(contents: &str) -> Result<StationFile, toml::de::Error> {
    toml::from_str(contents)
}

// ---------------------------------------------------------------------------
// Ingestion errors
// ---------------------------------------------------------------------------

/// Reasons an upstream station row is rejected.
#[derive(Debug, Clone, PartialEq)]
pub enum IngestError {
    EmptyId,
    InvalidCoordinate { latitude: f64, longitude: f64 },
    NonFiniteLevel(f64),
    /// Specific yield was supplied but is not strictly positive.
    InvalidYield(f64),
    DuplicateId(String),
}

impl fmt::Display for IngestError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            IngestError::EmptyId => write!(f, "Station id is empty"),
            IngestError::InvalidCoordinate { latitude, longitude } => {
                write!(f, "Invalid coordinate: ({}, {})", latitude, longitude)
            }
            IngestError::NonFiniteLevel(level) => write!(f, "Non-finite water level: {}", level),
            IngestError::InvalidYield(sy) => {
                write!(f, "Invalid specific yield: {} (must be > 0)", sy)
            }
            IngestError::DuplicateId(id) => write!(f, "Duplicate station id: {}", id),
        }
    }
}

impl std::error::Error for IngestError {}

// ---------------------------------------------------------------------------
// Normalization
// ---------------------------------------------------------------------------

/// Validates one record and turns it into a snapshot.
///
/// `default_yield` is used only when the record carries no specific yield.
/// Status is always recomputed from the level, never trusted from upstream.
pub fn normalize_station(
    record: &StationRecord,
    default_yield: f64,
) -> Result<StationSnapshot, IngestError> {
    let id = record.id.trim();
    if id.is_empty() {
        return Err(IngestError::EmptyId);
    }

    let coordinate = Coordinate::new(record.latitude, record.longitude);
    if !coordinate.is_valid() {
        return Err(IngestError::InvalidCoordinate {
            latitude: record.latitude,
            longitude: record.longitude,
        });
    }

    if !record.water_level.is_finite() {
        return Err(IngestError::NonFiniteLevel(record.water_level));
    }

    let specific_yield = record.specific_yield.unwrap_or(default_yield);
    if !specific_yield.is_finite() || specific_yield <= 0.0 {
        return Err(IngestError::InvalidYield(specific_yield));
    }

    Ok(StationSnapshot {
        id: id.to_string(),
        coordinate,
        current_level: record.water_level,
        specific_yield,
        status: classify_station(record.water_level),
    })
}

/// Result of normalizing a batch: accepted snapshots plus every rejected
/// row with the reason, for the caller to log.
#[derive(Debug, Default)]
pub struct NormalizedStations {
    pub stations: Vec<StationSnapshot>,
    pub rejected: Vec<(String, IngestError)>,
}

/// Normalizes a batch, keeping the first occurrence of each id.
pub fn normalize_all(records: &[StationRecord], default_yield: f64) -> NormalizedStations {
    let mut seen = HashSet::new();
    let mut out = NormalizedStations::default();

    for record in records {
        match normalize_station(record, default_yield) {
            Ok(snapshot) if !seen.insert(snapshot.id.clone()) => {
                out.rejected
                    .push((record.id.clone(), IngestError::DuplicateId(snapshot.id)));
            }
            Ok(snapshot) => out.stations.push(snapshot),
            Err(e) => out.rejected.push((record.id.clone(), e)),
        }
    }

    out
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::StationStatus;

    fn record(id: &str, lat: f64, lon: f64, level: f64, sy: Option<f64>) -> StationRecord {
        StationRecord {
            id: id.to_string(),
            name: None,
            latitude: lat,
            longitude: lon,
            water_level: level,
            specific_yield: sy,
            readings: Vec::new(),
        }
    }

    #[test]
    fn test_valid_record_normalizes_with_derived_status() {
        let snapshot = normalize_station(&record("DWLR_003", 26.1209, 85.3647, 25.89, Some(0.12)), 0.15)
            .expect("valid record should normalize");
        assert_eq!(snapshot.id, "DWLR_003");
        assert_eq!(snapshot.specific_yield, 0.12);
        assert_eq!(snapshot.status, StationStatus::Critical);
    }

    #[test]
    fn test_missing_yield_uses_caller_default() {
        let snapshot = normalize_station(&record("a", 25.0, 85.0, 3.0, None), 0.15).unwrap();
        assert_eq!(snapshot.specific_yield, 0.15);
    }

    #[test]
    fn test_explicit_non_positive_yield_is_rejected_not_defaulted() {
        let result = normalize_station(&record("a", 25.0, 85.0, 3.0, Some(0.0)), 0.15);
        assert_eq!(result, Err(IngestError::InvalidYield(0.0)));
        let result = normalize_station(&record("a", 25.0, 85.0, 3.0, Some(-0.2)), 0.15);
        assert_eq!(result, Err(IngestError::InvalidYield(-0.2)));
    }

    #[test]
    fn test_out_of_range_coordinates_are_rejected() {
        assert!(matches!(
            normalize_station(&record("a", 91.0, 0.0, 3.0, None), 0.15),
            Err(IngestError::InvalidCoordinate { .. })
        ));
        assert!(matches!(
            normalize_station(&record("a", 0.0, f64::INFINITY, 3.0, None), 0.15),
            Err(IngestError::InvalidCoordinate { .. })
        ));
    }

    #[test]
    fn test_non_finite_level_and_blank_id_are_rejected() {
        assert!(matches!(
            normalize_station(&record("a", 0.0, 0.0, f64::NAN, None), 0.15),
            Err(IngestError::NonFiniteLevel(_))
        ));
        assert_eq!(
            normalize_station(&record("  ", 0.0, 0.0, 1.0, None), 0.15),
            Err(IngestError::EmptyId)
        );
    }

    #[test]
    fn test_normalize_all_keeps_first_duplicate_and_reports_rest() {
        let records = vec![
            record("a", 25.0, 85.0, 3.0, None),
            record("b", 95.0, 85.0, 3.0, None),
            record("a", 25.5, 85.0, 18.0, None),
        ];
        let result = normalize_all(&records, 0.15);
        assert_eq!(result.stations.len(), 1);
        assert_eq!(result.stations[0].current_level, 3.0);
        assert_eq!(result.rejected.len(), 2);
        assert_eq!(result.rejected[1].1, IngestError::DuplicateId("a".to_string()));
    }

    #[test]
    fn test_parse_station_file_with_readings() {
        let toml = r#"
            [[station]]
            id = "DWLR_001"
            name = "Patna Central"
            latitude = 25.5941
            longitude = 85.1376
            water_level = 12.45
            specific_yield = 0.15

            [[station.readings]]
            timestamp = "2024-01-15T06:30:00Z"
            level = 12.58
            temperature = 23.2

            [[station.readings]]
            timestamp = "2024-01-15T07:30:00Z"
            level = 12.55

            [[station]]
            id = "DWLR_002"
            latitude = 24.7914
            longitude = 85.0002
            water_level = 18.72
        "#;
        let file = parse_station_file(toml).expect("station file should parse");
        assert_eq!(file.stations.len(), 2);
        assert_eq!(file.stations[0].readings.len(), 2);
        assert_eq!(file.stations[0].readings[0].temperature, Some(23.2));
        assert_eq!(file.stations[1].specific_yield, None);
        assert!(file.stations[1].readings.is_empty());
    }

    #[test]
    fn test_bundled_sample_file_is_fully_valid() {
        let file = parse_station_file(include_str!("../stations.toml"))
            .expect("bundled stations.toml should parse");
        let result = normalize_all(&file.stations, 0.15);
        assert!(
            result.rejected.is_empty(),
            "sample file has rejected rows: {:?}",
            result.rejected
        );
        assert_eq!(result.stations.len(), file.stations.len());
        // DWLR_004 carries no yield of its own
        let bhagalpur = result.stations.iter().find(|s| s.id == "DWLR_004").unwrap();
        assert_eq!(bhagalpur.specific_yield, 0.15);
    }

    #[test]
    fn test_parse_empty_station_file() {
        let file = parse_station_file("").expect("empty file is valid");
        assert!(file.stations.is_empty());
    }
}
