//! Inverse Distance Weighting.
//!
//! Estimates the water level at an unsampled point as
//!
//! ```text
//! L(x) = Σ(Lᵢ / dᵢ^p) / Σ(1 / dᵢ^p)
//! ```
//!
//! The canonical decay parameter is `p = 1` (linear decay), not the more
//! common inverse-square. Callers wanting `p = 2` pass it explicitly.

use crate::analysis::nearest::nearest;
use crate::model::{Confidence, CoreError, Coordinate, EstimateResult, NeighborResult, StationSnapshot};

/// Default distance decay exponent.
pub const DEFAULT_POWER: f64 = 1.0;

/// Neighbors closer than this (km) are treated as co-located with the query.
pub const COLOCATED_EPSILON_KM: f64 = 0.001;

/// Interpolates a level from `neighbors`.
///
/// A neighbor closer than `COLOCATED_EPSILON_KM` short-circuits the weighting
/// and its level is returned as is. The first such neighbor wins, so with
/// distance-sorted input it is the closest one.
pub fn interpolate(neighbors: &[NeighborResult], power: f64) -> Result<f64, CoreError> {
    if neighbors.is_empty() {
        return Err(CoreError::NoNeighbors);
    }

    if let Some(colocated) = neighbors
        .iter()
        .find(|n| n.distance_km < COLOCATED_EPSILON_KM)
    {
        return Ok(colocated.station.current_level);
    }

    // Weights are taken relative to the closest neighbor so the largest one
    // is exactly 1 and steep powers cannot overflow or underflow the sum.
    let closest_km = neighbors
        .iter()
        .map(|n| n.distance_km)
        .fold(f64::INFINITY, f64::min);

    let (weighted_sum, weight_sum) = neighbors.iter().fold((0.0, 0.0), |(num, den), n| {
        let weight = (closest_km / n.distance_km).powf(power);
        (num + n.station.current_level * weight, den + weight)
    });

    Ok(weighted_sum / weight_sum)
}

/// Trust tier for an estimate, from the nearest-station distance and the
/// number of stations used.
///
/// - `High`: nearest < 5 km and at least 5 stations
/// - `Medium`: nearest < 20 km
/// - `Low`: otherwise
pub fn confidence(nearest_distance_km: f64, neighbor_count: usize) -> Confidence {
    if nearest_distance_km < 5.0 && neighbor_count >= 5 {
        Confidence::High
    } else if nearest_distance_km < 20.0 {
        Confidence::Medium
    } else {
        Confidence::Low
    }
}

/// Estimates the level at `query` from its `k` nearest stations.
///
/// Fails with `CoreError::NoData` when there is nothing to interpolate from
/// (empty station list or `k <= 0`).
pub fn estimate_level(
    query: Coordinate,
    stations: &[StationSnapshot],
    k: i64,
    power: f64,
) -> Result<EstimateResult, CoreError> {
    let neighbors = nearest(query, stations, k);
    let Some(closest) = neighbors.first() else {
        return Err(CoreError::NoData);
    };
    let nearest_distance_km = closest.distance_km;

    let value = interpolate(&neighbors, power).map_err(|_| CoreError::NoData)?;

    Ok(EstimateResult {
        value,
        confidence: confidence(nearest_distance_km, neighbors.len()),
        nearest_distance_km,
        neighbor_count: neighbors.len(),
    })
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
