//! Application orchestration module

pub mod initialization;
pub mod execution;

pub use initialization::{
    load_configuration,
    configure_logging,
    resolve_reports_config,
    create_mailer
};
pub use execution::{read_job_status, load_registry, run_report};
