//! Level change between two estimates.

/// Percentage change from `previous` to `current`, rounded to one decimal.
///
/// Returns 0 when there is no usable baseline (`previous` zero or not
/// finite).
pub fn percent_change(current: f64, previous: f64) -> f64 {
    if previous == 0.0 || !previous.is_finite() || !current.is_finite() {
        return 0.0;
    }
    let percentage = (current - previous) / previous.abs() * 100.0;
    (percentage * 10.0).round() / 10.0
}
