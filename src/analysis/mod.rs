/// Numeric procedures over station snapshots and reading histories.
///
/// Everything here is a pure function of its arguments: no I/O, no shared
/// state, no logging. Callers may invoke any of it concurrently.
///
/// Submodules:
/// - `nearest` — distance ranking of stations around a query point.
/// - `idw` — inverse distance weighted level estimate and its confidence.
/// - `recharge` — Water Table Fluctuation recharge events.
/// - `trend` — percentage change between two level estimates.

pub mod idw;
pub mod nearest;
pub mod recharge;
pub mod trend;
