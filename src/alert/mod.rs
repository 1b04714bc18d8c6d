/// Station classification, alerts and region-level risk scoring.
///
/// Submodules:
/// - `thresholds` — the per-station level breakpoints and station alerts.
/// - `risk` — suitability score, water-stress index and trend label.

pub mod risk;
pub mod thresholds;
