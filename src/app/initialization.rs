//! Application initialization and configuration

use std::str::FromStr;
use std::sync::Arc;
use anyhow::{Context, Result};
use log::{debug, LevelFilter};
use crate::{cli, config, logging};
use crate::mailer::{EmailSender, OutboxMailer, StdoutMailer};
use crate::plugin::ReportsConfig;

pub fn load_configuration(args: &cli::Args) -> Result<config::ConfigManager> {
    match &args.config_file {
        Some(config_file) => {
            debug!("Loading configuration from explicit file: {}", config_file.display());
            config::ConfigManager::load_from_file(config_file.clone())
        }
        None => config::ConfigManager::load(),
    }
}

pub fn configure_logging(args: &cli::Args, config: &config::ConfigManager) -> Result<logging::LogConfig> {
    let console_level = if args.debug {
        LevelFilter::Trace
    } else if args.verbose {
        LevelFilter::Debug
    } else if args.quiet {
        LevelFilter::Error
    } else {
        config.get_log_level("logging", "level")
            .context("Invalid [logging] level")?
            .unwrap_or(LevelFilter::Info)
    };

    let format = if args.log_format != "text" {
        logging::LogFormat::from_str(&args.log_format).map_err(|e| anyhow::anyhow!(e))?
    } else {
        match config.get_value("logging", "format") {
            Some(format_str) => logging::LogFormat::from_str(&format_str).map_err(|e| anyhow::anyhow!(e))?,
            None => logging::LogFormat::Text,
        }
    };

    let log_file_path = args.log_file.clone()
        .or_else(|| config.get_path("logging", "file"));

    let file_log_level = match &args.log_file_level {
        Some(level_str) => Some(logging::parse_log_level(level_str)?),
        None => config.get_log_level("logging", "file-level").context("Invalid [logging] file-level")?,
    };

    let (destination, file_level) = match log_file_path {
        Some(file_path) => {
            let level = file_log_level.unwrap_or(console_level);
            (logging::LogDestination::Both(file_path), Some(level))
        }
        None => (logging::LogDestination::Console, None),
    };

    Ok(logging::LogConfig {
        console_level,
        file_level,
        format,
        destination,
    })
}

/// Recipients from the command line, else from the configuration file
pub fn resolve_reports_config(args: &cli::Args, config: &config::ConfigManager) -> Result<ReportsConfig> {
    if !args.to.is_empty() {
        debug!("Using {} recipients from the command line", args.to.len());
        return Ok(ReportsConfig::new(args.to.iter().cloned()));
    }

    config.get_reports_config()?
        .ok_or_else(|| anyhow::anyhow!("No report recipients: pass --to or set [reports] to in the configuration file"))
}

/// Outbox directory from the command line or `[mail] outbox`, else standard output
pub fn create_mailer(args: &cli::Args, config: &config::ConfigManager) -> Arc<dyn EmailSender> {
    match args.outbox.clone().or_else(|| config.get_path("mail", "outbox")) {
        Some(directory) => {
            debug!("Delivering reports to outbox {}", directory.display());
            Arc::new(OutboxMailer::new(directory))
        }
        None => Arc::new(StdoutMailer),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::path::PathBuf;
    use tempfile::NamedTempFile;

    fn args() -> cli::Args {
        cli::Args {
            log_format: "text".to_string(),
            ..cli::Args::default()
        }
    }

    fn manager_from(content: &str) -> config::ConfigManager {
        let file = NamedTempFile::new().unwrap();
        std::fs::write(file.path(), content).unwrap();
        config::ConfigManager::load_from_file(file.path().to_path_buf()).unwrap()
    }

    #[test]
    fn test_logging_defaults() {
        let log_config = configure_logging(&args(), &manager_from("")).unwrap();
        assert_eq!(log_config.console_level, LevelFilter::Info);
        assert_eq!(log_config.format, logging::LogFormat::Text);
        assert_eq!(log_config.destination, logging::LogDestination::Console);
    }

    #[test]
    fn test_logging_from_config_file() {
        let manager = manager_from("[logging]\nlevel = \"warn\"\nformat = \"json\"\nfile = \"/tmp/r.log\"\nfile-level = \"debug\"\n");
        let log_config = configure_logging(&args(), &manager).unwrap();
        assert_eq!(log_config.console_level, LevelFilter::Warn);
        assert_eq!(log_config.format, logging::LogFormat::Json);
        assert_eq!(log_config.destination, logging::LogDestination::Both(PathBuf::from("/tmp/r.log")));
        assert_eq!(log_config.file_level, Some(LevelFilter::Debug));
    }

    #[test]
    fn test_flags_override_config() {
        let manager = manager_from("[logging]\nlevel = \"warn\"\n");
        let args = cli::Args { verbose: true, ..args() };
        assert_eq!(configure_logging(&args, &manager).unwrap().console_level, LevelFilter::Debug);
    }

    #[test]
    fn test_recipients_precedence() {
        let manager = manager_from("[reports]\nto = [\"file@example.com\"]\n");

        let from_file = resolve_reports_config(&args(), &manager).unwrap();
        assert_eq!(from_file.to, vec!["file@example.com"]);

        let cli_args = cli::Args { to: vec!["cli@example.com".to_string()], ..args() };
        let from_cli = resolve_reports_config(&cli_args, &manager).unwrap();
        assert_eq!(from_cli.to, vec!["cli@example.com"]);

        assert!(resolve_reports_config(&args(), &manager_from("")).is_err());
    }
}
