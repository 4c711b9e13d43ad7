// Logging for backup-reports
//
// Installs a `log` backend writing text or JSON lines to the console, a file,
// or both, each destination with its own level. Report failures caught by the
// plugin's error boundary surface here at error level, so operators running
// with `--log-file` get a persistent trail of reports that were not sent.

use log::{Level, LevelFilter};
use serde::{Deserialize, Serialize};
use chrono::{DateTime, Local};
use std::fs::OpenOptions;
use std::io::{self, Write};
use std::path::PathBuf;
use std::sync::Mutex;
use anyhow::{Context, Result};

/// Log output format options
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum LogFormat {
    Text,
    Json,
}

impl std::str::FromStr for LogFormat {
    type Err = String;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "text" => Ok(LogFormat::Text),
            "json" => Ok(LogFormat::Json),
            _ => Err(format!("Invalid log format: {}. Valid options: text, json", s)),
        }
    }
}

/// Log destination options
#[derive(Debug, Clone, PartialEq)]
pub enum LogDestination {
    Console,
    File(PathBuf),
    Both(PathBuf),
}

/// JSON log entry structure
#[derive(Debug, Serialize, Deserialize)]
pub struct JsonLogEntry {
    pub timestamp: String,
    pub level: String,
    pub target: String,
    pub message: String,
}

/// Logging configuration
#[derive(Debug, Clone)]
pub struct LogConfig {
    pub console_level: LevelFilter,
    pub file_level: Option<LevelFilter>,
    pub format: LogFormat,
    pub destination: LogDestination,
}

impl Default for LogConfig {
    fn default() -> Self {
        Self {
            console_level: LevelFilter::Info,
            file_level: None,
            format: LogFormat::Text,
            destination: LogDestination::Console,
        }
    }
}

impl LogConfig {
    /// Most verbose level any destination accepts
    pub fn max_level(&self) -> LevelFilter {
        match self.file_level {
            Some(file_level) if file_level > self.console_level => file_level,
            _ => self.console_level,
        }
    }
}

/// Logger backend
pub struct ReportsLogger {
    config: LogConfig,
    file_lock: Mutex<()>,
}

impl ReportsLogger {
    pub fn new(config: LogConfig) -> Self {
        Self { config, file_lock: Mutex::new(()) }
    }

    fn format_timestamp() -> String {
        let now: DateTime<Local> = Local::now();
        now.format("%Y-%m-%d %H:%M:%S").to_string()
    }

    fn format_record(&self, level: Level, target: &str, message: &str) -> String {
        match self.config.format {
            LogFormat::Text => {
                format!("{} [{}] {}", Self::format_timestamp(), level.to_string().to_uppercase(), message)
            }
            LogFormat::Json => {
                let entry = JsonLogEntry {
                    timestamp: Self::format_timestamp(),
                    level: level.to_string().to_uppercase(),
                    target: target.to_string(),
                    message: message.to_string(),
                };
                serde_json::to_string(&entry).unwrap_or_else(|e| {
                    format!("{} [{}] {} (json error: {})", entry.timestamp, entry.level, message, e)
                })
            }
        }
    }

    fn console_enabled(&self, level: Level) -> bool {
        !matches!(self.config.destination, LogDestination::File(_)) && level <= self.config.console_level
    }

    fn file_target(&self, level: Level) -> Option<&PathBuf> {
        let path = match &self.config.destination {
            LogDestination::Console => return None,
            LogDestination::File(path) | LogDestination::Both(path) => path,
        };
        match self.config.file_level {
            Some(file_level) if level <= file_level => Some(path),
            _ => None,
        }
    }

    fn write_to_file(&self, line: &str, path: &PathBuf) -> Result<()> {
        let _guard = self.file_lock.lock().unwrap_or_else(|poisoned| poisoned.into_inner());
        let mut file = OpenOptions::new()
            .create(true)
            .append(true)
            .open(path)
            .with_context(|| format!("Failed to open log file: {}", path.display()))?;

        writeln!(file, "{}", line).context("Failed to write to log file")
    }
}

impl log::Log for ReportsLogger {
    fn enabled(&self, metadata: &log::Metadata) -> bool {
        self.console_enabled(metadata.level()) || self.file_target(metadata.level()).is_some()
    }

    fn log(&self, record: &log::Record) {
        if !self.enabled(record.metadata()) {
            return;
        }

        let level = record.level();
        let line = self.format_record(level, record.target(), &record.args().to_string());

        if self.console_enabled(level) {
            let _ = writeln!(io::stderr(), "{}", line);
        }

        if let Some(path) = self.file_target(level) {
            if let Err(e) = self.write_to_file(&line, path) {
                // Falls back to the console so the record is not lost
                let _ = writeln!(io::stderr(), "File logging error: {}", e);
                let _ = writeln!(io::stderr(), "{}", line);
            }
        }
    }

    fn flush(&self) {
        let _ = io::stderr().flush();
    }
}

/// Initialize the logging system with the given configuration
pub fn init_logger(config: LogConfig) -> Result<()> {
    let max_level = config.max_level();

    log::set_boxed_logger(Box::new(ReportsLogger::new(config)))
        .context("Failed to set global logger")?;
    log::set_max_level(max_level);

    Ok(())
}

/// Convert string to LevelFilter
pub fn parse_log_level(level_str: &str) -> Result<LevelFilter> {
    match level_str.to_lowercase().as_str() {
        "error" => Ok(LevelFilter::Error),
        "warn" => Ok(LevelFilter::Warn),
        "info" => Ok(LevelFilter::Info),
        "debug" => Ok(LevelFilter::Debug),
        "trace" => Ok(LevelFilter::Trace),
        "off" => Ok(LevelFilter::Off),
        _ => Err(anyhow::anyhow!("Invalid log level: {}. Valid levels: error, warn, info, debug, trace, off", level_str)),
    }
}
