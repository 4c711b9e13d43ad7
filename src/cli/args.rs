use clap::Parser;
use anyhow::Result;
use std::path::PathBuf;
use log::debug;

/// Replay a terminated job through the backup reports plugin
#[derive(Parser, Debug, Default)]
#[command(name = "backup-reports")]
#[command(about = "Builds the backup/snapshot report for a terminated job and emails it to the configured recipients")]
#[command(version)]
pub struct Args {
    /// Job status JSON file ("-" reads standard input)
    #[arg(short = 's', long = "status", value_name = "FILE")]
    pub status: Option<PathBuf>,

    /// JSON array of objects ({ id, name_label, uuid }) used to resolve call targets
    #[arg(short = 'o', long = "objects", value_name = "FILE")]
    pub objects: Option<PathBuf>,

    /// Report recipient (repeatable, overrides configuration)
    #[arg(short = 't', long = "to", value_name = "ADDRESS")]
    pub to: Vec<String>,

    /// Write messages into this directory instead of standard output
    #[arg(long, value_name = "DIR")]
    pub outbox: Option<PathBuf>,

    /// Print the plugin configuration schema and exit
    #[arg(long)]
    pub print_schema: bool,

    /// Verbose output (debug level logging)
    #[arg(short, long)]
    pub verbose: bool,

    /// Quiet output (error level logging only)
    #[arg(short, long)]
    pub quiet: bool,

    /// Debug output (trace level logging)
    #[arg(long)]
    pub debug: bool,

    /// Log format: text or json
    #[arg(long, value_name = "FORMAT", default_value = "text")]
    pub log_format: String,

    /// Log file path for file output
    #[arg(long, value_name = "FILE")]
    pub log_file: Option<PathBuf>,

    /// Log level for file output (independent of console level)
    #[arg(long, value_name = "LEVEL")]
    pub log_file_level: Option<String>,

    /// Configuration file path
    #[arg(long, value_name = "FILE")]
    pub config_file: Option<PathBuf>,
}

pub fn parse_args() -> Args {
    Args::parse()
}

pub fn validate_args(args: &Args) -> Result<()> {
    debug!("Validating CLI argument combinations");

    let log_flags_count = [args.verbose, args.quiet, args.debug]
        .iter()
        .filter(|&&flag| flag)
        .count();

    if log_flags_count > 1 {
        return Err(anyhow::anyhow!(
            "Conflicting log level flags: only one of --verbose, --quiet, or --debug may be specified"
        ));
    }

    match args.log_format.to_lowercase().as_str() {
        "text" | "json" => {},
        _ => return Err(anyhow::anyhow!(
            "Invalid log format '{}'. Valid options: text, json", args.log_format
        )),
    }

    if let Some(ref level) = args.log_file_level {
        crate::logging::parse_log_level(level)?;
    }

    if args.log_file_level.is_some() && args.log_file.is_none() {
        return Err(anyhow::anyhow!(
            "--log-file-level requires --log-file to be specified"
        ));
    }

    if !args.print_schema && args.status.is_none() {
        return Err(anyhow::anyhow!("--status is required unless --print-schema is given"));
    }

    if let Some(blank) = args.to.iter().find(|address| address.trim().is_empty()) {
        return Err(anyhow::anyhow!("Invalid recipient address '{}'", blank));
    }

    Ok(())
}
