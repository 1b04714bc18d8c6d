/// Station data sources.
///
/// A `StationRepository` supplies the current station set and, per station,
/// a chronologically ordered reading history. Two implementations are
/// provided: a TOML station file and a PostgreSQL database. Both route raw
/// rows through `stations::normalize_all`; rejected rows are logged and
/// skipped, never passed on.

use chrono::{DateTime, Utc};
use postgres::{Client, NoTls, Row};
use std::fmt;
use std::path::{Path, PathBuf};

use crate::logging::{self, Component};
use crate::model::{Reading, StationSnapshot};
use crate::stations::{self, StationRecord};

// ---------------------------------------------------------------------------
// Errors
// ---------------------------------------------------------------------------

#[derive(Debug)]
pub enum RepositoryError {
    Io(std::io::Error),
    Parse(String),
    Database(postgres::Error),
    StationNotFound(String),
}

impl fmt::Display for RepositoryError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            RepositoryError::Io(e) => write!(f, "I/O error: {}", e),
            RepositoryError::Parse(msg) => write!(f, "Parse error: {}", msg),
            RepositoryError::Database(e) => write!(f, "Database error: {}", e),
            RepositoryError::StationNotFound(id) => write!(f, "Station not found: {}", id),
        }
    }
}

impl std::error::Error for RepositoryError {}

impl From<std::io::Error> for RepositoryError {
    fn from(e: std::io::Error) -> Self {
        RepositoryError::Io(e)
    }
}

impl From<postgres::Error> for RepositoryError {
    fn from(e: postgres::Error) -> Self {
        RepositoryError::Database(e)
    }
}

// ---------------------------------------------------------------------------
// Trait
// ---------------------------------------------------------------------------

pub trait StationRepository {
    /// Current state of every valid station.
    fn stations(&mut self) -> Result<Vec<StationSnapshot>, RepositoryError>;

    /// Reading history for one station, oldest first.
    fn readings(&mut self, station_id: &str) -> Result<Vec<Reading>, RepositoryError>;
}

/// Normalizes raw rows, logging every rejection.
fn ingest_records(records: &[StationRecord], default_yield: f64) -> Vec<StationSnapshot> {
    let normalized = stations::normalize_all(records, default_yield);
    for (id, reason) in &normalized.rejected {
        logging::warn(Component::Ingest, Some(id), &format!("skipped: {}", reason));
    }
    logging::log_refresh_summary(
        Component::Ingest,
        records.len(),
        normalized.stations.len(),
        normalized.rejected.len(),
    );
    normalized.stations
}

// ---------------------------------------------------------------------------
// TOML station file
// ---------------------------------------------------------------------------

/// Reads stations and readings from a TOML station file.
///
/// The file is re-read on every call so edits show up on the next refresh.
pub struct TomlStationRepository {
    path: PathBuf,
    default_yield: f64,
}

impl TomlStationRepository {
    pub fn new(path: impl AsRef<Path>, default_yield: f64) -> Self {
        Self {
            path: path.as_ref().to_path_buf(),
            default_yield,
        }
    }

    fn read_records(&self) -> Result<Vec<StationRecord>, RepositoryError> {
        let contents = std::fs::read_to_string(&self.path)?;
        let file = stations::parse_station_file(&contents)
            .map_err(|e| RepositoryError::Parse(format!("{}: {}", self.path.display(), e)))?;
        Ok(file.stations)
    }
}

impl StationRepository for TomlStationRepository {
    fn stations(&mut self) -> Result<Vec<StationSnapshot>, RepositoryError> {
        let records = self.read_records()?;
        Ok(ingest_records(&records, self.default_yield))
    }

    fn readings(&mut self, station_id: &str) -> Result<Vec<Reading>, RepositoryError> {
        let record = self
            .read_records()?
            .into_iter()
            .find(|r| r.id.trim() == station_id)
            .ok_or_else(|| RepositoryError::StationNotFound(station_id.to_string()))?;

        let mut readings = record.readings;
        readings.sort_by_key(|r| r.timestamp);
        Ok(readings)
    }
}

// ---------------------------------------------------------------------------
// PostgreSQL
// ---------------------------------------------------------------------------

/// Reads from the `groundwater` schema:
///
/// - `groundwater.stations(station_id TEXT, latitude FLOAT8, longitude FLOAT8,
///   water_level FLOAT8, specific_yield FLOAT8 NULL)`
/// - `groundwater.readings(station_id TEXT, measured_at TIMESTAMPTZ,
///   level FLOAT8, temperature FLOAT8 NULL)`
pub struct PostgresStationRepository {
    client: Client,
    default_yield: f64,
}

impl PostgresStationRepository {
    pub fn connect(database_url: &str, default_yield: f64) -> Result<Self, RepositoryError> {
        let client = Client::connect(database_url, NoTls)?;
        logging::info(Component::Database, None, "Connected to station database");
        Ok(Self::with_client(client, default_yield))
    }

    pub fn with_client(client: Client, default_yield: f64) -> Self {
        Self {
            client,
            default_yield,
        }
    }

    /// First and last reading time for a station, if it has any readings.
    pub fn reading_range(
        &mut self,
        station_id: &str,
    ) -> Result<Option<(DateTime<Utc>, DateTime<Utc>)>, RepositoryError> {
        let row = self.client.query_one(
            "SELECT MIN(measured_at), MAX(measured_at)
             FROM groundwater.readings
             WHERE station_id = $1",
            &[&station_id],
        )?;

        let min: Option<DateTime<Utc>> = row.get(0);
        let max: Option<DateTime<Utc>> = row.get(1);

        match (min, max) {
            (Some(start), Some(end)) => Ok(Some((start, end))),
            _ => Ok(None),
        }
    }

    fn station_exists(&mut self, station_id: &str) -> Result<bool, RepositoryError> {
        let row = self.client.query_one(
            "SELECT EXISTS(SELECT 1 FROM groundwater.stations WHERE station_id = $1)",
            &[&station_id],
        )?;
        Ok(row.get(0))
    }
}

/// Decodes a `groundwater.stations` row. A NULL in a required column fails
/// that row only.
fn station_record(row: &Row) -> Result<StationRecord, RepositoryError> {
    Ok(StationRecord {
        id: row.try_get(0)?,
        name: None,
        latitude: row.try_get(1)?,
        longitude: row.try_get(2)?,
        water_level: row.try_get(3)?,
        specific_yield: row.try_get(4)?,
        readings: Vec::new(),
    })
}

fn reading(row: &Row) -> Result<Reading, RepositoryError> {
    Ok(Reading {
        timestamp: row.try_get(0)?,
        level: row.try_get(1)?,
        temperature: row.try_get(2)?,
    })
}

fn skip_row(row: &Row, err: &RepositoryError) {
    let id: Option<String> = row.try_get(0).ok();
    logging::warn(
        Component::Ingest,
        id.as_deref(),
        &format!("skipped undecodable row: {}", err),
    );
}

impl StationRepository for PostgresStationRepository {
    fn stations(&mut self) -> Result<Vec<StationSnapshot>, RepositoryError> {
        let rows = self.client.query(
            "SELECT station_id, latitude, longitude, water_level, specific_yield
             FROM groundwater.stations
             ORDER BY station_id",
            &[],
        )?;

        let mut records = Vec::with_capacity(rows.len());
        for row in &rows {
            match station_record(row) {
                Ok(record) => records.push(record),
                Err(e) => skip_row(row, &e),
            }
        }

        Ok(ingest_records(&records, self.default_yield))
    }

    fn readings(&mut self, station_id: &str) -> Result<Vec<Reading>, RepositoryError> {
        let rows = self.client.query(
            "SELECT measured_at, level, temperature
             FROM groundwater.readings
             WHERE station_id = $1
             ORDER BY measured_at ASC",
            &[&station_id],
        )?;

        if rows.is_empty() && !self.station_exists(station_id)? {
            return Err(RepositoryError::StationNotFound(station_id.to_string()));
        }

        let mut readings = Vec::with_capacity(rows.len());
        for row in &rows {
            match reading(row) {
                Ok(reading) => readings.push(reading),
                Err(e) => logging::warn(
                    Component::Database,
                    Some(station_id),
                    &format!("skipped reading: {}", e),
                ),
            }
        }
        Ok(readings)
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;

    fn write_temp(name: &str, contents: &str) -> PathBuf {
        let path = std::env::temp_dir().join(format!("gwmon_{}_{}.toml", name, std::process::id()));
        std::fs::write(&path, contents).expect("temp dir should be writable");
        path
    }

    const FILE: &str = r#"
        [[station]]
        id = "DWLR_001"
        latitude = 25.5941
        longitude = 85.1376
        water_level = 12.45
        specific_yield = 0.15

        [[station.readings]]
        timestamp = "2024-01-15T08:30:00Z"
        level = 12.52

        [[station.readings]]
        timestamp = "2024-01-15T06:30:00Z"
        level = 12.58

        [[station]]
        id = "BROKEN"
        latitude = 125.0
        longitude = 85.0
        water_level = 3.0
    "#;

    #[test]
    fn test_toml_repository_skips_invalid_rows() {
        let path = write_temp("skips", FILE);
        let mut repo = TomlStationRepository::new(&path, 0.15);
        let stations = repo.stations().expect("file should load");
        assert_eq!(stations.len(), 1);
        assert_eq!(stations[0].id, "DWLR_001");
        let _ = std::fs::remove_file(path);
    }

    #[test]
    fn test_toml_repository_returns_readings_oldest_first() {
        let path = write_temp("readings", FILE);
        let mut repo = TomlStationRepository::new(&path, 0.15);
        let readings = repo.readings("DWLR_001").unwrap();
        assert_eq!(readings.len(), 2);
        assert!(readings[0].timestamp < readings[1].timestamp);
        assert_eq!(readings[0].level, 12.58);
        let _ = std::fs::remove_file(path);
    }

    #[test]
    fn test_toml_repository_unknown_station() {
        let path = write_temp("unknown", FILE);
        let mut repo = TomlStationRepository::new(&path, 0.15);
        assert!(matches!(
            repo.readings("DWLR_404"),
            Err(RepositoryError::StationNotFound(_))
        ));
        let _ = std::fs::remove_file(path);
    }

    #[test]
    fn test_toml_repository_missing_file_is_io_error() {
        let mut repo = TomlStationRepository::new("/nonexistent/gwmon/stations.toml", 0.15);
        assert!(matches!(repo.stations(), Err(RepositoryError::Io(_))));
    }

    #[test]
    fn test_toml_repository_malformed_file_is_parse_error() {
        let path = write_temp("malformed", "[[station]\nid = 1");
        let mut repo = TomlStationRepository::new(&path, 0.15);
        let err = repo.stations().unwrap_err();
        assert!(err.to_string().starts_with("Parse error"), "got '{}'", err);
        let _ = std::fs::remove_file(path);
    }
}
