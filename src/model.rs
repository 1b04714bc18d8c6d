/// Core data types for the groundwater estimation core.
///
/// This module defines the shared domain model imported by all other modules.
/// It contains no logic beyond construction and display, no I/O, and only
/// serde/chrono as external dependencies.

use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;

// ---------------------------------------------------------------------------
// Coordinates
// ---------------------------------------------------------------------------

/// A WGS84 point. Immutable value type.
///
/// Range checking is done once at the ingestion boundary
/// (`stations::normalize_station`); the numeric core trusts its inputs.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Coordinate {
    pub latitude: f64,
    pub longitude: f64,
}

impl Coordinate {
    pub const fn new(latitude: f64, longitude: f64) -> Self {
        Self { latitude, longitude }
    }

    /// True when both components are finite and inside [-90,90] / [-180,180].
    pub fn is_valid(&self) -> bool {
        self.latitude.is_finite()
            && self.longitude.is_finite()
            && (-90.0..=90.0).contains(&self.latitude)
            && (-180.0..=180.0).contains(&self.longitude)
    }
}

// ---------------------------------------------------------------------------
// Station types
// ---------------------------------------------------------------------------

/// Per-station status, derived from the current level by
/// `alert::thresholds::classify_station`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum StationStatus {
    Normal,
    Warning,
    Critical,
}

impl fmt::Display for StationStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            StationStatus::Normal => write!(f, "normal"),
            StationStatus::Warning => write!(f, "warning"),
            StationStatus::Critical => write!(f, "critical"),
        }
    }
}

/// Current state of one monitoring station.
///
/// Snapshots are superseded, never mutated: a refresh produces a whole new
/// list (see `snapshot::SnapshotStore`).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StationSnapshot {
    pub id: String,
    pub coordinate: Coordinate,
    /// Meters below the reference point.
    pub current_level: f64,
    /// Aquifer storage coefficient, > 0.
    pub specific_yield: f64,
    pub status: StationStatus,
}

/// A single historical level reading for a station.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Reading {
    pub timestamp: DateTime<Utc>,
    pub level: f64,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub temperature: Option<f64>,
}

/// Logger telemetry that feeds the station health score.
///
/// Not every upstream source reports it, so it is passed separately from the
/// snapshot.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Telemetry {
    /// Battery charge, percent.
    pub battery_level: f64,
    /// Signal strength, percent.
    pub signal_strength: f64,
    /// Share of expected readings actually received, 0.0 to 1.0.
    pub availability_index: f64,
}

// ---------------------------------------------------------------------------
// Derived results
// ---------------------------------------------------------------------------

/// A station paired with its distance from a query point.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct NeighborResult {
    pub station: StationSnapshot,
    pub distance_km: f64,
}

/// Three-tier trust indicator for an interpolated level.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Confidence {
    High,
    Medium,
    Low,
}

impl fmt::Display for Confidence {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Confidence::High => write!(f, "high"),
            Confidence::Medium => write!(f, "medium"),
            Confidence::Low => write!(f, "low"),
        }
    }
}

/// Interpolated level at a query point.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct EstimateResult {
    pub value: f64,
    pub confidence: Confidence,
    pub nearest_distance_km: f64,
    pub neighbor_count: usize,
}

/// One rising transition between consecutive readings.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct RechargeEvent {
    pub date: NaiveDate,
    /// Level rise in meters, always > 0.
    pub delta_h: f64,
    pub amount_mm: f64,
}

/// Aggregate over a list of recharge events.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct RechargeSummary {
    pub event_count: usize,
    pub total_mm: f64,
    pub average_mm: f64,
    pub peak_mm: f64,
}

// ---------------------------------------------------------------------------
// Risk summary
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum SuitabilityLabel {
    Poor,
    Moderate,
    #[serde(rename = "Optimal Yield")]
    OptimalYield,
    #[serde(rename = "No Data")]
    NoData,
}

impl fmt::Display for SuitabilityLabel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SuitabilityLabel::Poor => write!(f, "Poor"),
            SuitabilityLabel::Moderate => write!(f, "Moderate"),
            SuitabilityLabel::OptimalYield => write!(f, "Optimal Yield"),
            SuitabilityLabel::NoData => write!(f, "No Data"),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum StressLabel {
    #[serde(rename = "Low Stress")]
    Low,
    #[serde(rename = "Moderate Stress")]
    Moderate,
    #[serde(rename = "High Stress")]
    High,
    #[serde(rename = "No Data")]
    NoData,
}

impl fmt::Display for StressLabel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            StressLabel::Low => write!(f, "Low Stress"),
            StressLabel::Moderate => write!(f, "Moderate Stress"),
            StressLabel::High => write!(f, "High Stress"),
            StressLabel::NoData => write!(f, "No Data"),
        }
    }
}

/// Regional trend label, derived from the mean level alone.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum TrendLabel {
    #[serde(rename = "Strong Recovery")]
    StrongRecovery,
    #[serde(rename = "Moderate Levels")]
    ModerateLevels,
    #[serde(rename = "Critical Levels")]
    CriticalLevels,
    #[serde(rename = "No Data")]
    NoData,
}

impl fmt::Display for TrendLabel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            TrendLabel::StrongRecovery => write!(f, "Strong Recovery"),
            TrendLabel::ModerateLevels => write!(f, "Moderate Levels"),
            TrendLabel::CriticalLevels => write!(f, "Critical Levels"),
            TrendLabel::NoData => write!(f, "No Data"),
        }
    }
}

/// Station counts per status. `total == safe + warning + critical` always.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct RiskCounts {
    pub safe: usize,
    pub warning: usize,
    pub critical: usize,
    pub total: usize,
}

/// Region-level indices over a station subset. Recomputed on every call.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct RiskSummary {
    pub suitability_score: u8,
    pub suitability_label: SuitabilityLabel,
    pub water_stress_index: u8,
    pub water_stress_label: StressLabel,
    pub trend_label: TrendLabel,
    /// Mean current level; `None` when there are no stations.
    pub average_level: Option<f64>,
    pub counts: RiskCounts,
}

impl RiskSummary {
    /// The "no stations available" summary. Distinct from a computed score
    /// of zero through its `NoData` labels.
    pub fn no_data() -> Self {
        Self {
            suitability_score: 0,
            suitability_label: SuitabilityLabel::NoData,
            water_stress_index: 0,
            water_stress_label: StressLabel::NoData,
            trend_label: TrendLabel::NoData,
            average_level: None,
            counts: RiskCounts::default(),
        }
    }

    pub fn is_no_data(&self) -> bool {
        self.counts.total == 0
    }
}

// ---------------------------------------------------------------------------
// Error types
// ---------------------------------------------------------------------------

/// Failures of the numeric core. Degenerate-but-valid inputs are not errors.
#[derive(Debug, Clone, PartialEq)]
pub enum CoreError {
    /// IDW was asked to interpolate from zero neighbors.
    NoNeighbors,
    /// No candidate stations were available for a level estimate.
    NoData,
    /// Specific yield was zero, negative or not a number.
    InvalidYield(f64),
}

impl fmt::Display for CoreError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            CoreError::NoNeighbors => write!(f, "No neighboring stations to interpolate from"),
            CoreError::NoData => write!(f, "No station data available"),
            CoreError::InvalidYield(sy) => {
                write!(f, "Invalid specific yield: {} (must be > 0)", sy)
            }
        }
    }
}

impl std::error::Error for CoreError {}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
