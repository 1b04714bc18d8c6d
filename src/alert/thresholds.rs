//! Station status thresholds and location-based alerts.
//!
//! `classify_station` is the only place the level breakpoints live. Alert
//! generation and risk scoring both go through it.

use serde::Serialize;

use crate::geo::distance_km;
use crate::model::{Coordinate, StationSnapshot, StationStatus};

/// Levels strictly above this (m) are critical.
pub const CRITICAL_LEVEL_M: f64 = 20.0;
/// Levels from this up to `CRITICAL_LEVEL_M` inclusive are a warning.
pub const WARNING_LEVEL_M: f64 = 15.0;
/// Levels below this (m) count as healthy recharge for alerting.
pub const RECHARGE_LEVEL_M: f64 = 10.0;

/// Stations analysed for alerts when the caller has no location.
const UNLOCATED_STATION_COUNT: usize = 4;

/// Classifies a station's current level.
///
/// - `> 20` → `Critical`
/// - `15 ..= 20` → `Warning`
/// - otherwise → `Normal`
pub fn classify_station(current_level: f64) -> StationStatus {
    if current_level > CRITICAL_LEVEL_M {
        StationStatus::Critical
    } else if current_level >= WARNING_LEVEL_M {
        StationStatus::Warning
    } else {
        StationStatus::Normal
    }
}

/// Alert kinds, in ascending order of severity.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum AlertKind {
    Info,
    Warning,
    Critical,
}

/// An alert raised for one station.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct StationAlert {
    pub station_id: String,
    pub kind: AlertKind,
    pub title: &'static str,
    pub level: f64,
    /// Distance from the caller's location, when one was given.
    pub distance_km: Option<f64>,
}

/// Returns an alert for `station` if its level warrants one.
///
/// Critical and warning stations alert by status; a level under
/// `RECHARGE_LEVEL_M` raises an informational recharge alert. Anything else
/// (10 m up to the warning threshold) is quiet.
pub fn check_station(station: &StationSnapshot, distance_km: Option<f64>) -> Option<StationAlert> {
    let (kind, title) = match classify_station(station.current_level) {
        StationStatus::Critical => (AlertKind::Critical, "High Water Level Alert"),
        StationStatus::Warning => (AlertKind::Warning, "Moderate Water Level"),
        StationStatus::Normal if station.current_level < RECHARGE_LEVEL_M => {
            (AlertKind::Info, "Good Recharge Detected")
        }
        StationStatus::Normal => return None,
    };

    Some(StationAlert {
        station_id: station.id.clone(),
        kind,
        title,
        level: station.current_level,
        distance_km,
    })
}

/// Alerts for the stations relevant to `location`.
///
/// With a location, only stations within `radius_km` are considered and each
/// alert carries its distance. Without one, the first four stations stand in
/// for the region. The result is truncated to `max_alerts`, keeping input
/// order.
pub fn generate_station_alerts(
    stations: &[StationSnapshot],
    location: Option<Coordinate>,
    radius_km: f64,
    max_alerts: usize,
) -> Vec<StationAlert> {
    let candidates: Vec<(&StationSnapshot, Option<f64>)> = match location {
        Some(here) => stations
            .iter()
            .map(|s| (s, distance_km(here, s.coordinate)))
            .filter(|(_, d)| *d <= radius_km)
            .map(|(s, d)| (s, Some(d)))
            .collect(),
        None => stations
            .iter()
            .take(UNLOCATED_STATION_COUNT)
            .map(|s| (s, None))
            .collect(),
    };

    candidates
        .into_iter()
        .filter_map(|(station, distance)| check_station(station, distance))
        .take(max_alerts)
        .collect()
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
