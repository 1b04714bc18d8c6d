//! Groundwater recharge by the Water Table Fluctuation method.
//!
//! `R = Sy × ΔH`, evaluated for every rising transition between consecutive
//! readings and converted from meters to millimeters. Falling or flat
//! transitions produce nothing; depletion is not tracked here.

use crate::model::{CoreError, Reading, RechargeEvent, RechargeSummary};

const MM_PER_M: f64 = 1000.0;

/// Emits one `RechargeEvent` per rising pair of consecutive readings.
///
/// Readings are expected in chronological order; a sorted copy is used so an
/// out-of-order history gives the same events as the sorted one. Fewer than
/// two readings yields no events. A specific yield that is not strictly
/// positive is rejected before any event is produced.
pub fn compute_recharge(
    readings: &[Reading],
    specific_yield: f64,
) -> Result<Vec<RechargeEvent>, CoreError> {
    if specific_yield.is_nan() || specific_yield <= 0.0 {
        return Err(CoreError::InvalidYield(specific_yield));
    }

    let mut sorted: Vec<&Reading> = readings.iter().collect();
    sorted.sort_by_key(|r| r.timestamp);

    let events = sorted
        .windows(2)
        .filter_map(|pair| {
            let (prev, curr) = (pair[0], pair[1]);
            let delta_h = curr.level - prev.level;
            (delta_h > 0.0).then(|| RechargeEvent {
                date: curr.timestamp.date_naive(),
                delta_h,
                amount_mm: specific_yield * delta_h * MM_PER_M,
            })
        })
        .collect();

    Ok(events)
}

/// Total, average and peak recharge over `events`.
///
/// An empty list summarizes to zeros; the average divides by at least one.
pub fn summarize_recharge(events: &[RechargeEvent]) -> RechargeSummary {
    let total_mm: f64 = events.iter().map(|e| e.amount_mm).sum();
    let peak_mm = events.iter().map(|e| e.amount_mm).fold(0.0, f64::max);

    RechargeSummary {
        event_count: events.len(),
        total_mm,
        average_mm: total_mm / events.len().max(1) as f64,
        peak_mm,
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
