//! Report replay execution

use std::io::Read;
use std::path::Path;
use std::sync::Arc;
use anyhow::{Context, Result};
use log::{debug, info};

use crate::{cli, config};
use crate::job::JobStatus;
use crate::notifications::{AsyncNotificationManager, NotificationManager, XoEvent};
use crate::plugin::{BackupReportsPlugin, Plugin, PluginContext};
use crate::registry::InMemoryRegistry;
use super::initialization::{create_mailer, resolve_reports_config};

/// Read a job status from a file, or from standard input for "-"
pub fn read_job_status(path: &Path) -> Result<JobStatus> {
    let content = if path == Path::new("-") {
        let mut buffer = String::new();
        std::io::stdin()
            .read_to_string(&mut buffer)
            .context("Failed to read job status from standard input")?;
        buffer
    } else {
        std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read job status: {}", path.display()))?
    };

    serde_json::from_str(&content).context("Invalid job status JSON")
}

pub fn load_registry(path: Option<&Path>) -> Result<InMemoryRegistry> {
    match path {
        Some(path) => InMemoryRegistry::load_from_file(path)
            .with_context(|| format!("Failed to load objects from {}", path.display())),
        None => {
            debug!("No objects file given; every call target will be unresolved");
            Ok(InMemoryRegistry::new())
        }
    }
}

/// Wire bus, registry, mailer and plugin, then publish `job:terminated` once
pub async fn run_report(args: &cli::Args, config_manager: &config::ConfigManager) -> Result<()> {
    let status_path = args.status.as_deref()
        .ok_or_else(|| anyhow::anyhow!("--status is required"))?;
    let status = read_job_status(status_path)?;
    let registry = load_registry(args.objects.as_deref())?;
    let reports_config = resolve_reports_config(args, config_manager)?;

    let events = Arc::new(AsyncNotificationManager::<XoEvent>::new());
    let context = PluginContext::new(events.clone(), Arc::new(registry))
        .with_mailer(create_mailer(args, config_manager));

    let plugin = BackupReportsPlugin::new(context);
    plugin.configure_reports(reports_config).await?;
    plugin.load().await?;

    info!(
        "Replaying job with {} calls ({} backup/snapshot)",
        status.calls.len(),
        status.recognized_calls().count()
    );
    events.publish(XoEvent::job_terminated(status)).await?;

    plugin.unload().await?;
    events.shutdown().await?;
    Ok(())
}
