//! Region-level suitability and water-stress indices.
//!
//! All scores are rounded half away from zero first and clamped to [0, 100]
//! afterwards.

use crate::alert::thresholds::classify_station;
use crate::model::{
    Reading, RiskCounts, RiskSummary, StationSnapshot, StationStatus, StressLabel,
    SuitabilityLabel, Telemetry, TrendLabel,
};

// ---------------------------------------------------------------------------
// Scoring weights
// ---------------------------------------------------------------------------

const CRITICAL_PENALTY: f64 = 30.0;
const WARNING_PENALTY: f64 = 15.0;

const CRITICAL_STRESS_IMPACT: f64 = 40.0;
const SAFE_STRESS_BONUS: f64 = -20.0;
/// Mean level (m) that maps to a base stress of 100.
const STRESS_REFERENCE_LEVEL_M: f64 = 10.0;

const STRONG_RECOVERY_BELOW_M: f64 = 2.5;
const CRITICAL_LEVELS_ABOVE_M: f64 = 5.0;

const HEALTH_BASE: f64 = 50.0;
/// A drop smaller than this (m) over the history still earns partial credit.
const HEALTH_SLIGHT_DECLINE_M: f64 = 0.5;

// ---------------------------------------------------------------------------
// Labels
// ---------------------------------------------------------------------------

pub fn suitability_label(score: u8) -> SuitabilityLabel {
    match score {
        75.. => SuitabilityLabel::OptimalYield,
        50..75 => SuitabilityLabel::Moderate,
        _ => SuitabilityLabel::Poor,
    }
}

pub fn stress_label(index: u8) -> StressLabel {
    match index {
        0..=30 => StressLabel::Low,
        31..=60 => StressLabel::Moderate,
        _ => StressLabel::High,
    }
}

pub fn trend_label(average_level: f64) -> TrendLabel {
    if average_level < STRONG_RECOVERY_BELOW_M {
        TrendLabel::StrongRecovery
    } else if average_level > CRITICAL_LEVELS_ABOVE_M {
        TrendLabel::CriticalLevels
    } else {
        TrendLabel::ModerateLevels
    }
}

/// Rounds half away from zero, then clamps into [0, 100].
fn round_and_clamp(raw: f64) -> u8 {
    if raw.is_nan() {
        return 0;
    }
    raw.round().clamp(0.0, 100.0) as u8
}

// ---------------------------------------------------------------------------
// Summary
// ---------------------------------------------------------------------------

/// Partitions stations into safe/warning/critical by current level.
pub fn count_statuses(stations: &[StationSnapshot]) -> RiskCounts {
    let mut counts = RiskCounts {
        total: stations.len(),
        ..RiskCounts::default()
    };
    for station in stations {
        match classify_station(station.current_level) {
            StationStatus::Normal => counts.safe += 1,
            StationStatus::Warning => counts.warning += 1,
            StationStatus::Critical => counts.critical += 1,
        }
    }
    counts
}

/// Summarizes a station subset into suitability, stress and trend.
///
/// An empty subset is the normal "nothing fetched yet" state and yields
/// `RiskSummary::no_data()`.
pub fn summarize_risk(stations: &[StationSnapshot]) -> RiskSummary {
    if stations.is_empty() {
        return RiskSummary::no_data();
    }

    let counts = count_statuses(stations);
    let total = counts.total as f64;
    let safe = counts.safe as f64;
    let warning = counts.warning as f64;
    let critical = counts.critical as f64;

    // safe/total * 100 - critical/total * 30 - warning/total * 15, with a
    // single division so exact halves stay exact
    let suitability_raw =
        (safe * 100.0 - critical * CRITICAL_PENALTY - warning * WARNING_PENALTY) / total;
    let suitability_score = round_and_clamp(suitability_raw);

    let average_level = stations.iter().map(|s| s.current_level).sum::<f64>() / total;
    let base_stress = average_level / STRESS_REFERENCE_LEVEL_M * 100.0;
    let stress_raw = base_stress
        + (critical * CRITICAL_STRESS_IMPACT + safe * SAFE_STRESS_BONUS) / total;
    let water_stress_index = round_and_clamp(stress_raw);

    RiskSummary {
        suitability_score,
        suitability_label: suitability_label(suitability_score),
        water_stress_index,
        water_stress_label: stress_label(water_stress_index),
        trend_label: trend_label(average_level),
        average_level: Some(average_level),
        counts,
    }
}

// ---------------------------------------------------------------------------
// Station health
// ---------------------------------------------------------------------------

fn tiered(value: f64, full_at: f64, half_at: f64) -> f64 {
    if value >= full_at {
        10.0
    } else if value >= half_at {
        5.0
    } else {
        0.0
    }
}

/// 0-100 health score for a single station.
///
/// Starts from 50 and adds:
/// - status: +40 normal, +20 warning, +0 critical
/// - level trend from oldest to newest reading: +30 rising, +15 for a drop
///   under 0.5 m, +0 otherwise (needs at least two readings)
/// - telemetry, when known: up to +10 each for battery (80/50 %) and signal
///   (70/40 %), plus `availability_index * 10`
pub fn station_health_score(
    station: &StationSnapshot,
    readings: &[Reading],
    telemetry: Option<&Telemetry>,
) -> u8 {
    let mut score = HEALTH_BASE;

    score += match station.status {
        StationStatus::Normal => 40.0,
        StationStatus::Warning => 20.0,
        StationStatus::Critical => 0.0,
    };

    if readings.len() >= 2 {
        let oldest = readings.iter().min_by_key(|r| r.timestamp);
        let newest = readings.iter().max_by_key(|r| r.timestamp);
        if let (Some(oldest), Some(newest)) = (oldest, newest) {
            let change = newest.level - oldest.level;
            if change > 0.0 {
                score += 30.0;
            } else if change > -HEALTH_SLIGHT_DECLINE_M {
                score += 15.0;
            }
        }
    }

    if let Some(t) = telemetry {
        score += tiered(t.battery_level, 80.0, 50.0);
        score += tiered(t.signal_strength, 70.0, 40.0);
        score += t.availability_index * 10.0;
    }

    round_and_clamp(score)
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::Coordinate;
    use chrono::TimeZone;

    fn stations_with_levels(levels: &[f64]) -> Vec<StationSnapshot> {
        levels
            .iter()
            .enumerate()
            .map(|(i, &level)| StationSnapshot {
                id: format!("DWLR_{:03}", i),
                coordinate: Coordinate::new(19.0 + 0.01 * i as f64, 72.8),
                current_level: level,
                specific_yield: 0.15,
                status: classify_station(level),
            })
            .collect()
    }

    // --- labels -------------------------------------------------------------

    #[test]
    fn test_suitability_label_breakpoints() {
        assert_eq!(suitability_label(100), SuitabilityLabel::OptimalYield);
        assert_eq!(suitability_label(75), SuitabilityLabel::OptimalYield);
        assert_eq!(suitability_label(74), SuitabilityLabel::Moderate);
        assert_eq!(suitability_label(50), SuitabilityLabel::Moderate);
        assert_eq!(suitability_label(49), SuitabilityLabel::Poor);
        assert_eq!(suitability_label(0), SuitabilityLabel::Poor);
    }

    #[test]
    fn test_stress_label_breakpoints() {
        assert_eq!(stress_label(30), StressLabel::Low);
        assert_eq!(stress_label(31), StressLabel::Moderate);
        assert_eq!(stress_label(60), StressLabel::Moderate);
        assert_eq!(stress_label(61), StressLabel::High);
    }

    #[test]
    fn test_trend_label_breakpoints() {
        assert_eq!(trend_label(2.49), TrendLabel::StrongRecovery);
        assert_eq!(trend_label(2.5), TrendLabel::ModerateLevels);
        assert_eq!(trend_label(5.0), TrendLabel::ModerateLevels);
        assert_eq!(trend_label(5.01), TrendLabel::CriticalLevels);
    }

    // --- summarize_risk -----------------------------------------------------

    #[test]
    fn test_mixed_region_scores_moderate() {
        // 6 normal, 3 warning, 1 critical: 60 - 3 - 4.5 = 52.5 -> 53
        let stations = stations_with_levels(&[
            1.0, 1.0, 1.0, 1.0, 1.0, 1.0, 16.0, 17.0, 18.0, 25.0,
        ]);
        let summary = summarize_risk(&stations);
        assert_eq!(summary.counts.safe, 6);
        assert_eq!(summary.counts.warning, 3);
        assert_eq!(summary.counts.critical, 1);
        assert_eq!(summary.counts.total, 10);
        assert_eq!(summary.suitability_score, 53);
        assert_eq!(summary.suitability_label, SuitabilityLabel::Moderate);
    }

    #[test]
    fn test_empty_region_is_no_data() {
        let summary = summarize_risk(&[]);
        assert_eq!(summary, RiskSummary::no_data());
        assert_eq!(summary.suitability_label, SuitabilityLabel::NoData);
        assert_eq!(summary.water_stress_label, StressLabel::NoData);
    }

    #[test]
    fn test_all_safe_shallow_region() {
        // suitability 100; stress 10 + (-20) = -10 -> clamped to 0
        let summary = summarize_risk(&stations_with_levels(&[1.0, 1.0, 1.0]));
        assert_eq!(summary.suitability_score, 100);
        assert_eq!(summary.suitability_label, SuitabilityLabel::OptimalYield);
        assert_eq!(summary.water_stress_index, 0);
        assert_eq!(summary.water_stress_label, StressLabel::Low);
        assert_eq!(summary.trend_label, TrendLabel::StrongRecovery);
    }

    #[test]
    fn test_all_critical_region() {
        // suitability -30 -> 0; stress 250 + 40 -> 100
        let summary = summarize_risk(&stations_with_levels(&[25.0, 25.0]));
        assert_eq!(summary.suitability_score, 0);
        assert_eq!(summary.suitability_label, SuitabilityLabel::Poor);
        assert_eq!(summary.water_stress_index, 100);
        assert_eq!(summary.water_stress_label, StressLabel::High);
        assert_eq!(summary.trend_label, TrendLabel::CriticalLevels);
    }

    #[test]
    fn test_stress_index_mid_range() {
        // avg 4.0 -> base 40; all safe -> -20; index 20
        let summary = summarize_risk(&stations_with_levels(&[3.0, 5.0]));
        assert_eq!(summary.water_stress_index, 20);
        assert_eq!(summary.water_stress_label, StressLabel::Low);
        assert_eq!(summary.average_level, Some(4.0));
        assert_eq!(summary.trend_label, TrendLabel::ModerateLevels);
    }

    #[test]
    fn test_counts_always_add_up() {
        let levels = [0.0, 14.0, 15.0, 20.0, 20.5, 99.0, -3.0];
        let summary = summarize_risk(&stations_with_levels(&levels));
        let c = summary.counts;
        assert_eq!(c.total, c.safe + c.warning + c.critical);
        assert_eq!(c.total, levels.len());
    }

    #[test]
    fn test_scores_stay_in_range_for_extreme_levels() {
        for levels in [
            vec![1_000.0; 4],
            vec![-1_000.0; 4],
            vec![0.0, 1e9, -1e9],
            vec![f64::MAX, 0.0],
        ] {
            let summary = summarize_risk(&stations_with_levels(&levels));
            assert!(summary.suitability_score <= 100);
            assert!(summary.water_stress_index <= 100);
        }
    }

    // --- station_health_score -----------------------------------------------

    fn history(levels: &[f64]) -> Vec<Reading> {
        let start = chrono::Utc.with_ymd_and_hms(2024, 1, 15, 6, 30, 0).unwrap();
        levels
            .iter()
            .enumerate()
            .map(|(i, &level)| Reading {
                timestamp: start + chrono::Duration::hours(i as i64),
                level,
                temperature: None,
            })
            .collect()
    }

    #[test]
    fn test_health_status_factor() {
        let stations = stations_with_levels(&[3.0, 17.0, 24.0]);
        assert_eq!(station_health_score(&stations[0], &[], None), 90);
        assert_eq!(station_health_score(&stations[1], &[], None), 70);
        assert_eq!(station_health_score(&stations[2], &[], None), 50);
    }

    #[test]
    fn test_health_trend_factor_breakpoints() {
        let critical = &stations_with_levels(&[24.0])[0];
        assert_eq!(station_health_score(critical, &history(&[10.0, 10.2]), None), 80);
        assert_eq!(station_health_score(critical, &history(&[10.0, 10.0]), None), 65);
        assert_eq!(station_health_score(critical, &history(&[10.0, 9.6]), None), 65);
        assert_eq!(station_health_score(critical, &history(&[10.0, 9.5]), None), 50);
        // A single reading has no trend
        assert_eq!(station_health_score(critical, &history(&[10.0]), None), 50);
    }

    #[test]
    fn test_health_trend_uses_timestamps_not_slice_order() {
        let critical = &stations_with_levels(&[24.0])[0];
        let mut readings = history(&[10.0, 11.0]);
        readings.reverse();
        assert_eq!(station_health_score(critical, &readings, None), 80);
    }

    #[test]
    fn test_health_telemetry_tiers() {
        let critical = &stations_with_levels(&[24.0])[0];
        let telemetry = |battery, signal, availability| Telemetry {
            battery_level: battery,
            signal_strength: signal,
            availability_index: availability,
        };
        assert_eq!(station_health_score(critical, &[], Some(&telemetry(80.0, 70.0, 1.0))), 80);
        assert_eq!(station_health_score(critical, &[], Some(&telemetry(79.0, 69.0, 0.5))), 65);
        assert_eq!(station_health_score(critical, &[], Some(&telemetry(49.0, 39.0, 0.0))), 50);
    }

    #[test]
    fn test_health_is_clamped_to_100() {
        let normal = &stations_with_levels(&[3.0])[0];
        let telemetry = Telemetry {
            battery_level: 100.0,
            signal_strength: 100.0,
            availability_index: 1.0,
        };
        let score = station_health_score(normal, &history(&[1.0, 2.0]), Some(&telemetry));
        assert_eq!(score, 100);
    }
}
