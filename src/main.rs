//! gwmon - query groundwater stations from the command line.
//!
//! Every command prints pretty JSON on stdout; logs go to stderr.

use std::error::Error;
use std::path::PathBuf;
use std::process::ExitCode;

use clap::{Parser, Subcommand};
use serde::Serialize;

use gwmon_core::alert::risk::{station_health_score, summarize_risk};
use gwmon_core::alert::thresholds::generate_station_alerts;
use gwmon_core::analysis::idw::estimate_level;
use gwmon_core::analysis::nearest::{nearby_stations, nearest};
use gwmon_core::analysis::recharge::{compute_recharge, summarize_recharge};
use gwmon_core::config::{Config, DEFAULT_CONFIG_PATH};
use gwmon_core::logging::{self, Component};
use gwmon_core::model::{Coordinate, RechargeEvent, RechargeSummary};
use gwmon_core::repository::{PostgresStationRepository, StationRepository, TomlStationRepository};
use gwmon_core::snapshot::SnapshotStore;

#[derive(Parser, Debug)]
#[command(
    name = "gwmon",
    version,
    about = "Groundwater level estimation and risk scoring"
)]
struct Cli {
    /// Path to the TOML configuration file
    #[arg(short, long, default_value = DEFAULT_CONFIG_PATH)]
    config: PathBuf,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug, PartialEq)]
enum Command {
    /// Stations closest to a point
    Nearest {
        #[arg(allow_negative_numbers = true)]
        lat: f64,
        #[arg(allow_negative_numbers = true)]
        lon: f64,
        /// Number of stations (defaults to analysis.neighbor_count)
        #[arg(allow_negative_numbers = true)]
        k: Option<i64>,
    },

    /// Stations within the configured radius of a point
    Nearby {
        #[arg(allow_negative_numbers = true)]
        lat: f64,
        #[arg(allow_negative_numbers = true)]
        lon: f64,
    },

    /// IDW level estimate with confidence
    Estimate {
        #[arg(allow_negative_numbers = true)]
        lat: f64,
        #[arg(allow_negative_numbers = true)]
        lon: f64,
    },

    /// Recharge events and health score for one station
    Recharge { station_id: String },

    /// Region risk summary over all stations
    Summary,

    /// Station alerts, optionally around a point
    Alerts {
        #[arg(allow_negative_numbers = true, requires = "lon")]
        lat: Option<f64>,
        #[arg(allow_negative_numbers = true)]
        lon: Option<f64>,
    },
}

#[derive(Serialize)]
struct RechargeReport {
    station_id: String,
    health_score: u8,
    events: Vec<RechargeEvent>,
    summary: RechargeSummary,
}

fn coordinate(lat: f64, lon: f64) -> Result<Coordinate, Box<dyn Error>> {
    let coordinate = Coordinate::new(lat, lon);
    if !coordinate.is_valid() {
        return Err(format!("coordinate out of range: {}, {}", lat, lon).into());
    }
    Ok(coordinate)
}

fn print_json<T: Serialize>(value: &T) -> Result<(), Box<dyn Error>> {
    println!("{}", serde_json::to_string_pretty(value)?);
    Ok(())
}

fn open_repository(config: &Config) -> Result<Box<dyn StationRepository>, Box<dyn Error>> {
    let default_yield = config.ingest.default_specific_yield;
    match &config.database_url {
        Some(url) => Ok(Box::new(PostgresStationRepository::connect(url, default_yield)?)),
        None => {
            logging::debug(
                Component::System,
                None,
                &format!("Using station file {}", config.ingest.stations_file.display()),
            );
            Ok(Box::new(TomlStationRepository::new(
                &config.ingest.stations_file,
                default_yield,
            )))
        }
    }
}

fn run(cli: Cli) -> Result<(), Box<dyn Error>> {
    let config = Config::load(&cli.config)?;
    logging::init_logger(
        config.log_level()?,
        config.logging.file.as_deref(),
        config.logging.timestamps,
    );

    let mut repo = open_repository(&config)?;
    let store = SnapshotStore::new();
    store.refresh(repo.as_mut())?;
    let snapshot = store.current();
    let stations = &snapshot.stations;
    let analysis = &config.analysis;

    match cli.command {
        Command::Nearest { lat, lon, k } => {
            let k = k.unwrap_or(i64::from(analysis.neighbor_count));
            print_json(&nearest(coordinate(lat, lon)?, stations, k))
        }
        Command::Nearby { lat, lon } => print_json(&nearby_stations(
            coordinate(lat, lon)?,
            stations,
            analysis.nearby_radius_km,
            analysis.nearby_limit,
        )),
        Command::Estimate { lat, lon } => {
            let estimate = estimate_level(
                coordinate(lat, lon)?,
                stations,
                i64::from(analysis.neighbor_count),
                analysis.idw_power,
            )?;
            print_json(&estimate)
        }
        Command::Recharge { station_id } => {
            let station = stations
                .iter()
                .find(|s| s.id == station_id)
                .ok_or_else(|| format!("unknown station {}", station_id))?;
            let readings = repo.readings(&station_id)?;
            let events = compute_recharge(&readings, station.specific_yield)?;
            let summary = summarize_recharge(&events);
            print_json(&RechargeReport {
                health_score: station_health_score(station, &readings, None),
                station_id,
                events,
                summary,
            })
        }
        Command::Summary => print_json(&summarize_risk(stations)),
        Command::Alerts { lat, lon } => {
            let location = match (lat, lon) {
                (Some(lat), Some(lon)) => Some(coordinate(lat, lon)?),
                _ => None,
            };
            print_json(&generate_station_alerts(
                stations,
                location,
                analysis.alert_radius_km,
                analysis.max_alerts,
            ))
        }
    }
}

fn main() -> ExitCode {
    let cli = Cli::parse();
    match run(cli) {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            eprintln!("gwmon: {}", e);
            ExitCode::FAILURE
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::CommandFactory;

    #[test]
    fn test_cli_definition_is_consistent() {
        Cli::command().debug_assert();
    }

    #[test]
    fn test_negative_coordinates_parse_as_values() {
        let cli = Cli::try_parse_from(["gwmon", "nearest", "-33.86", "151.2", "3"]).unwrap();
        assert_eq!(
            cli.command,
            Command::Nearest {
                lat: -33.86,
                lon: 151.2,
                k: Some(3)
            }
        );
        assert_eq!(cli.config, PathBuf::from(DEFAULT_CONFIG_PATH));
    }

    #[test]
    fn test_config_flag_precedes_command() {
        let cli = Cli::try_parse_from(["gwmon", "--config", "other.toml", "summary"]).unwrap();
        assert_eq!(cli.config, PathBuf::from("other.toml"));
        assert_eq!(cli.command, Command::Summary);
    }

    #[test]
    fn test_alerts_location_is_optional_but_paired() {
        let cli = Cli::try_parse_from(["gwmon", "alerts"]).unwrap();
        assert_eq!(cli.command, Command::Alerts { lat: None, lon: None });

        assert!(Cli::try_parse_from(["gwmon", "alerts", "25.6"]).is_err());
    }

    #[test]
    fn test_bad_arguments_are_rejected() {
        assert!(Cli::try_parse_from(["gwmon"]).is_err());
        assert!(Cli::try_parse_from(["gwmon", "estimate", "north", "85.1"]).is_err());
        assert!(Cli::try_parse_from(["gwmon", "teleport"]).is_err());
    }

    #[test]
    fn test_out_of_range_coordinate_is_an_error() {
        assert!(coordinate(91.0, 0.0).is_err());
        assert!(coordinate(25.6, 85.1).is_ok());
    }
}
