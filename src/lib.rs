//! Groundwater level estimation and risk scoring over a sparse network of
//! monitoring stations.
//!
//! The numeric core (`geo`, `analysis`, `alert`) is made of pure,
//! synchronous functions over immutable inputs. The remaining modules sit at
//! its boundary: `stations` validates upstream rows, `repository` fetches
//! them, `snapshot` publishes them atomically, `config` and `logging` serve
//! the host process.

pub mod alert;
pub mod analysis;
pub mod config;
pub mod geo;
pub mod logging;
pub mod model;
pub mod repository;
pub mod snapshot;
pub mod stations;

pub use alert::risk::{station_health_score, summarize_risk};
pub use alert::thresholds::classify_station;
pub use analysis::idw::{confidence, estimate_level, interpolate};
pub use analysis::nearest::nearest as nearest_stations;
pub use analysis::recharge::compute_recharge;
pub use geo::distance_km;
