pub mod app;
pub mod cli;
pub mod config;
pub mod job;
pub mod logging;
pub mod mailer;
pub mod notifications;
pub mod plugin;
pub mod registry;
pub mod report;
