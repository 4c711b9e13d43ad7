//! Plugin System Module
//!
//! Server plugins receive a [`PluginContext`] at creation, are configured with
//! JSON matching their schema, and subscribe to server events while loaded.
//!
//! # Example Usage
//!
//! ```no_run
//! use std::sync::Arc;
//! use backup_reports::notifications::{AsyncNotificationManager, XoEvent};
//! use backup_reports::plugin::{BackupReportsPlugin, Plugin, PluginContext};
//! use backup_reports::registry::InMemoryRegistry;
//! use backup_reports::mailer::StdoutMailer;
//!
//! # #[tokio::main]
//! # async fn main() -> Result<(), Box<dyn std::error::Error>> {
//! let events = Arc::new(AsyncNotificationManager::<XoEvent>::new());
//! let context = PluginContext::new(events, Arc::new(InMemoryRegistry::new()))
//!     .with_mailer(Arc::new(StdoutMailer));
//!
//! let plugin = BackupReportsPlugin::new(context);
//! plugin.configure(serde_json::json!({ "to": ["ops@example.com"] })).await?;
//! plugin.load().await?;
//! # Ok(())
//! # }
//! ```

pub mod traits;
pub mod error;
pub mod context;
pub mod backup_reports;
pub mod subscriber;

#[cfg(test)]
pub mod tests;

pub use traits::{Plugin, PluginInfo, PluginState};
pub use error::{PluginError, PluginResult};
pub use context::PluginContext;
pub use backup_reports::{
    configuration_schema, BackupReportsPlugin, ReportListener, ReportsConfig, PLUGIN_NAME,
    REPORT_SUBJECT,
};
pub use subscriber::ReportSubscriber;
