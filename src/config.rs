/// Service configuration.
///
/// Loaded from a TOML file (default `gwmon.toml`); every field has a default
/// so a missing file or section is fine. `DATABASE_URL` comes from the
/// environment, with `.env` honoured through `dotenv`.

use serde::Deserialize;
use std::fmt;
use std::path::{Path, PathBuf};

use crate::analysis::idw::DEFAULT_POWER;
use crate::logging::LogLevel;

pub const DEFAULT_CONFIG_PATH: &str = "gwmon.toml";

// ---------------------------------------------------------------------------
// Sections
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(default)]
pub struct AnalysisConfig {
    /// Stations fed to the IDW estimate.
    pub neighbor_count: u32,
    /// IDW distance decay exponent.
    pub idw_power: f64,
    pub alert_radius_km: f64,
    pub nearby_radius_km: f64,
    pub nearby_limit: usize,
    pub max_alerts: usize,
}

impl Default for AnalysisConfig {
    fn default() -> Self {
        Self {
            neighbor_count: 5,
            idw_power: DEFAULT_POWER,
            alert_radius_km: 50.0,
            nearby_radius_km: 50.0,
            nearby_limit: 6,
            max_alerts: 8,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(default)]
pub struct IngestConfig {
    /// Used for stations whose upstream row has no specific yield.
    /// 0.15 is typical of alluvial aquifers.
    pub default_specific_yield: f64,
    pub stations_file: PathBuf,
}

impl Default for IngestConfig {
    fn default() -> Self {
        Self {
            default_specific_yield: 0.15,
            stations_file: PathBuf::from("stations.toml"),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(default)]
pub struct LoggingConfig {
    pub level: String,
    pub file: Option<String>,
    pub timestamps: bool,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: "info".to_string(),
            file: None,
            timestamps: false,
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
#[serde(default)]
pub struct Config {
    pub analysis: AnalysisConfig,
    pub ingest: IngestConfig,
    pub logging: LoggingConfig,
    /// Never read from the file; filled from `DATABASE_URL`.
    #[serde(skip)]
    pub database_url: Option<String>,
}

// ---------------------------------------------------------------------------
// Errors
// ---------------------------------------------------------------------------

#[derive(Debug)]
pub enum ConfigError {
    Io(std::io::Error),
    Parse(toml::de::Error),
    Invalid(String),
}

impl fmt::Display for ConfigError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ConfigError::Io(e) => write!(f, "Config I/O error: {}", e),
            ConfigError::Parse(e) => write!(f, "Config parse error: {}", e),
            ConfigError::Invalid(msg) => write!(f, "Invalid config: {}", msg),
        }
    }
}

impl std::error::Error for ConfigError {}

impl From<std::io::Error> for ConfigError {
    fn from(e: std::io::Error) -> Self {
        ConfigError::Io(e)
    }
}

impl From<toml::de::Error> for ConfigError {
    fn from(e: toml::de::Error) -> Self {
        ConfigError::Parse(e)
    }
}

// ---------------------------------------------------------------------------
// Loading
// ---------------------------------------------------------------------------

impl Config {
    pub fn from_toml(contents: &str) -> Result<Self, ConfigError> {
        let config: Config = toml::from_str(contents)?;
        config.validate()?;
        Ok(config)
    }

    /// Reads `path` if it exists (defaults otherwise), then applies the
    /// environment.
    pub fn load(path: &Path) -> Result<Self, ConfigError> {
        let mut config = if path.exists() {
            Self::from_toml(&std::fs::read_to_string(path)?)?
        } else {
            Config::default()
        };
        config.apply_env();
        Ok(config)
    }

    /// Loads `.env` and picks up `DATABASE_URL`.
    pub fn apply_env(&mut self) {
        dotenv::dotenv().ok();
        self.database_url = std::env::var("DATABASE_URL")
            .ok()
            .filter(|url| !url.trim().is_empty());
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        let a = &self.analysis;
        if a.neighbor_count == 0 {
            return Err(ConfigError::Invalid("analysis.neighbor_count must be at least 1".into()));
        }
        if !(a.idw_power.is_finite() && a.idw_power > 0.0) {
            return Err(ConfigError::Invalid(format!(
                "analysis.idw_power must be a positive number, got {}",
                a.idw_power
            )));
        }
        for (name, radius) in [
            ("analysis.alert_radius_km", a.alert_radius_km),
            ("analysis.nearby_radius_km", a.nearby_radius_km),
        ] {
            if !(radius.is_finite() && radius > 0.0) {
                return Err(ConfigError::Invalid(format!("{} must be positive", name)));
            }
        }
        let sy = self.ingest.default_specific_yield;
        if !(sy.is_finite() && sy > 0.0) {
            return Err(ConfigError::Invalid(format!(
                "ingest.default_specific_yield must be > 0, got {}",
                sy
            )));
        }
        self.log_level()?;
        Ok(())
    }

    pub fn log_level(&self) -> Result<LogLevel, ConfigError> {
        self.logging.level.parse().map_err(ConfigError::Invalid)
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
