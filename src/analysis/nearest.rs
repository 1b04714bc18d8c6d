//! Distance ranking of stations around a query point.

use std::cmp::Ordering;

use crate::geo::distance_km;
use crate::model::{Coordinate, NeighborResult, StationSnapshot};

/// Ascending by distance, ties broken by station id.
fn by_distance_then_id(a: &NeighborResult, b: &NeighborResult) -> Ordering {
    a.distance_km
        .total_cmp(&b.distance_km)
        .then_with(|| a.station.id.cmp(&b.station.id))
}

fn ranked(query: Coordinate, stations: &[StationSnapshot]) -> Vec<NeighborResult> {
    let mut results: Vec<NeighborResult> = stations
        .iter()
        .map(|station| NeighborResult {
            distance_km: distance_km(query, station.coordinate),
            station: station.clone(),
        })
        .collect();
    results.sort_by(by_distance_then_id);
    results
}

/// Returns the `min(k, stations.len())` stations closest to `query`.
///
/// Ordering is deterministic: equal distances are ordered by id. An empty
/// station list or `k <= 0` gives an empty result.
pub fn nearest(query: Coordinate, stations: &[StationSnapshot], k: i64) -> Vec<NeighborResult> {
    if k <= 0 || stations.is_empty() {
        return Vec::new();
    }
    let mut results = ranked(query, stations);
    results.truncate(usize::try_from(k).unwrap_or(usize::MAX));
    results
}

/// Stations within `radius_km` of `query`, closest first, at most `limit`.
///
/// When nothing falls inside the radius the closest stations overall are
/// returned instead, so a sparse network still yields something to show.
pub fn nearby_stations(
    query: Coordinate,
    stations: &[StationSnapshot],
    radius_km: f64,
    limit: usize,
) -> Vec<NeighborResult> {
    let all = ranked(query, stations);
    let within: Vec<NeighborResult> = all
        .iter()
        .filter(|n| n.distance_km <= radius_km)
        .cloned()
        .collect();

    let mut results = if within.is_empty() { all } else { within };
    results.truncate(limit);
    results
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
