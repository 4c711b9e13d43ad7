use anyhow::Result;
use std::process;
use log::error;

use backup_reports::{app, cli, logging, plugin};

fn main() {
    if let Err(e) = run() {
        error!("Application error: {:#}", e);
        eprintln!("Error: {:#}", e);
        process::exit(1);
    }
}

fn run() -> Result<()> {
    let args = cli::parse_args();

    cli::validate_args(&args)?;

    if args.print_schema {
        println!("{}", serde_json::to_string_pretty(&plugin::configuration_schema())?);
        return Ok(());
    }

    let config_manager = app::load_configuration(&args)?;

    let log_config = app::configure_logging(&args, &config_manager)?;
    logging::init_logger(log_config)?;

    let runtime = tokio::runtime::Builder::new_current_thread()
        .enable_all()
        .build()?;

    runtime.block_on(app::run_report(&args, &config_manager))
}
