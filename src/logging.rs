/// Structured logging for the groundwater service boundary.
///
/// Provides component-tagged logging with optional station identifiers,
/// timestamps, and severity levels. Supports both console output and
/// file-based logging. The numeric core in `analysis` and `alert` never
/// logs; only repositories, the snapshot store and the CLI do.

use chrono::Utc;
use std::fmt;
use std::fs::OpenOptions;
use std::io::Write;
use std::sync::{Mutex, MutexGuard};

// ---------------------------------------------------------------------------
// Log Levels
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub enum LogLevel {
    Debug,
    Info,
    Warning,
    Error,
}

impl fmt::Display for LogLevel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            LogLevel::Debug => write!(f, "DEBUG"),
            LogLevel::Info => write!(f, "INFO"),
            LogLevel::Warning => write!(f, "WARN"),
            LogLevel::Error => write!(f, "ERROR"),
        }
    }
}

impl std::str::FromStr for LogLevel {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "debug" => Ok(LogLevel::Debug),
            "info" => Ok(LogLevel::Info),
            "warn" | "warning" => Ok(LogLevel::Warning),
            "error" => Ok(LogLevel::Error),
            other => Err(format!("unknown log level '{}'", other)),
        }
    }
}

// ---------------------------------------------------------------------------
// Components
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Component {
    Repository,
    Database,
    Ingest,
    Snapshot,
    System,
}

impl fmt::Display for Component {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Component::Repository => write!(f, "REPO"),
            Component::Database => write!(f, "DB"),
            Component::Ingest => write!(f, "INGEST"),
            Component::Snapshot => write!(f, "SNAP"),
            Component::System => write!(f, "SYS"),
        }
    }
}

// ---------------------------------------------------------------------------
// Failure Classification
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FailureType {
    /// Expected failure - station no longer present upstream
    Expected,
    /// Unexpected failure - indicates service degradation or configuration issue
    Unexpected,
    /// Unknown - cannot determine if this is expected or not
    Unknown,
}

impl fmt::Display for FailureType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            FailureType::Expected => write!(f, "EXPECTED"),
            FailureType::Unexpected => write!(f, "UNEXPECTED"),
            FailureType::Unknown => write!(f, "UNKNOWN"),
        }
    }
}

// ---------------------------------------------------------------------------
// Logger Configuration
// ---------------------------------------------------------------------------

/// Global logger instance
static LOGGER: Mutex<Option<Logger>> = Mutex::new(None);

/// A poisoned lock only means another thread panicked mid-log; the logger
/// itself holds no invariants worth abandoning.
fn global() -> MutexGuard<'static, Option<Logger>> {
    LOGGER.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
}

pub struct Logger {
    /// Minimum log level to display
    min_level: LogLevel,
    /// Optional file path for logging
    log_file: Option<String>,
    /// Whether to include timestamps in console output
    console_timestamps: bool,
}

impl Logger {
    /// Initialize the global logger
    pub fn init(min_level: LogLevel, log_file: Option<String>, console_timestamps: bool) {
        let logger = Logger {
            min_level,
            log_file,
            console_timestamps,
        };

        *global() = Some(logger);
    }

    fn format_entry(level: LogLevel, component: &Component, station_id: Option<&str>, message: &str) -> String {
        let timestamp = Utc::now().format("%Y-%m-%d %H:%M:%S UTC");
        let station_part = station_id.map(|s| format!(" [{}]", s)).unwrap_or_default();
        format!("{} {} {}{}: {}", timestamp, level, component, station_part, message)
    }

    /// Text written to the console for one entry, without the newline.
    fn console_line(&self, level: LogLevel, component: &Component, station_id: Option<&str>, message: &str) -> String {
        if self.console_timestamps {
            return Self::format_entry(level, component, station_id, message);
        }

        let station_part = station_id.map(|s| format!(" [{}]", s)).unwrap_or_default();
        match level {
            LogLevel::Error => format!("   ✗ {}{}: {}", component, station_part, message),
            LogLevel::Warning => format!("   ⚠ {}{}: {}", component, station_part, message),
            LogLevel::Info => format!("   {}", message),
            LogLevel::Debug => format!("   [DEBUG] {}", message),
        }
    }

    fn log(&self, level: LogLevel, component: &Component, station_id: Option<&str>, message: &str) {
        // Console output always goes to stderr; stdout belongs to the CLI's JSON
        self.log_to(&mut std::io::stderr().lock(), level, component, station_id, message);
    }

    fn log_to(
        &self,
        console: &mut dyn Write,
        level: LogLevel,
        component: &Component,
        station_id: Option<&str>,
        message: &str,
    ) {
        if level < self.min_level {
            return;
        }

        let _ = writeln!(console, "{}", self.console_line(level, component, station_id, message));

        if let Some(ref path) = self.log_file {
            let log_entry = Self::format_entry(level, component, station_id, message);
            if let Err(e) = Self::append_to_file(path, &log_entry) {
                eprintln!("Failed to write to log file {}: {}", path, e);
            }
        }
    }

    fn append_to_file(path: &str, entry: &str) -> std::io::Result<()> {
        let mut file = OpenOptions::new()
            .create(true)
            .append(true)
            .open(path)?;
        writeln!(file, "{}", entry)?;
        Ok(())
    }
}

// ---------------------------------------------------------------------------
// Public Logging Functions
// ---------------------------------------------------------------------------

/// Initialize the global logger
pub fn init_logger(min_level: LogLevel, log_file: Option<&str>, console_timestamps: bool) {
    Logger::init(min_level, log_file.map(String::from), console_timestamps);
}

fn emit(level: LogLevel, component: Component, station_id: Option<&str>, message: &str) {
    if let Some(logger) = global().as_ref() {
        logger.log(level, &component, station_id, message);
    }
}

/// Log a general informational message
pub fn info(component: Component, station_id: Option<&str>, message: &str) {
    emit(LogLevel::Info, component, station_id, message);
}

/// Log a warning message
pub fn warn(component: Component, station_id: Option<&str>, message: &str) {
    emit(LogLevel::Warning, component, station_id, message);
}

/// Log an error message
pub fn error(component: Component, station_id: Option<&str>, message: &str) {
    emit(LogLevel::Error, component, station_id, message);
}

/// Log a debug message
pub fn debug(component: Component, station_id: Option<&str>, message: &str) {
    emit(LogLevel::Debug, component, station_id, message);
}

// ---------------------------------------------------------------------------
// Failure Classification Helpers
// ---------------------------------------------------------------------------

/// Classify a repository failure from its error message.
pub fn classify_repository_failure(error_message: &str) -> FailureType {
    if error_message.contains("Station not found") {
        // Retired or renamed stations drop out of the upstream source
        FailureType::Expected
    } else if error_message.contains("Database error") || error_message.contains("I/O error") {
        FailureType::Unexpected
    } else if error_message.contains("Parse error") {
        // Malformed station file or schema drift
        FailureType::Unexpected
    } else {
        FailureType::Unknown
    }
}

// ---------------------------------------------------------------------------
// Structured Failure Logging
// ---------------------------------------------------------------------------

/// Log a repository failure with automatic classification
pub fn log_repository_failure(station_id: Option<&str>, operation: &str, err: &dyn std::error::Error) {
    let error_msg = err.to_string();
    let failure_type = classify_repository_failure(&error_msg);

    let message = format!("{} failed [{}]: {}", operation, failure_type, error_msg);

    match failure_type {
        FailureType::Expected => debug(Component::Repository, station_id, &message),
        FailureType::Unexpected => error(Component::Repository, station_id, &message),
        FailureType::Unknown => warn(Component::Repository, station_id, &message),
    }
}

// ---------------------------------------------------------------------------
// Refresh Summary Logging
// ---------------------------------------------------------------------------

/// Log a summary of a snapshot refresh
pub fn log_refresh_summary(component: Component, total: usize, loaded: usize, skipped: usize) {
    let message = format!(
        "Refresh complete: {}/{} stations loaded, {} skipped",
        loaded, total, skipped
    );

    if skipped == 0 {
        info(component, None, &message);
    } else if loaded == 0 {
        error(component, None, &message);
    } else {
        warn(component, None, &message);
    }
}
