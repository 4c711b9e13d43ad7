//! Backup Reports Plugin
//!
//! Emails a status report whenever a job with backup or snapshot calls
//! terminates. The report is built by [`crate::report`]; this module owns the
//! recipient configuration, the event subscription and the hand-off to the
//! host's email sender.

use std::sync::Arc;
use std::sync::atomic::{AtomicU64, Ordering};
use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use serde_json::json;
use tokio::sync::{Mutex, RwLock};
use log::{debug, info, warn};

use crate::job::JobStatus;
use crate::mailer::{Email, EmailSender};
use crate::notifications::{NotificationManager, Subscriber, XoEvent};
use crate::plugin::context::PluginContext;
use crate::plugin::error::{PluginError, PluginResult};
use crate::plugin::subscriber::ReportSubscriber;
use crate::plugin::traits::{Plugin, PluginInfo, PluginState};
use crate::registry::ObjectRegistry;
use crate::report::{build_report, Report};

pub const PLUGIN_NAME: &str = "backup-reports";

/// Subject line of every report
pub const REPORT_SUBJECT: &str = "Backup Reports (XenOrchestra)";

static INSTANCE_COUNTER: AtomicU64 = AtomicU64::new(0);

/// Plugin configuration
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ReportsConfig {
    /// Report recipients
    pub to: Vec<String>,
}

impl ReportsConfig {
    pub fn new<I, S>(to: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self { to: to.into_iter().map(Into::into).collect() }
    }

    pub fn validate(&self) -> PluginResult<()> {
        if self.to.is_empty() {
            return Err(PluginError::configuration_error("`to` requires at least one recipient"));
        }
        if let Some(position) = self.to.iter().position(|address| address.trim().is_empty()) {
            return Err(PluginError::configuration_error(
                format!("`to[{}]` is an empty address", position)
            ));
        }
        Ok(())
    }
}

/// Schema the host validates plugin configuration against
pub fn configuration_schema() -> serde_json::Value {
    json!({
        "type": "object",
        "description": "a array of emails (receivers)",
        "properties": {
            "to": {
                "type": "array",
                "items": { "type": "string" },
                "minItems": 1
            }
        }
    })
}

/// Builds and sends the report for one terminated job
pub struct ReportListener {
    registry: Arc<dyn ObjectRegistry>,
    mailer: Option<Arc<dyn EmailSender>>,
    receivers: Arc<RwLock<Vec<String>>>,
}

impl ReportListener {
    pub fn new(
        registry: Arc<dyn ObjectRegistry>,
        mailer: Option<Arc<dyn EmailSender>>,
        receivers: Arc<RwLock<Vec<String>>>,
    ) -> Self {
        Self { registry, mailer, receivers }
    }

    /// Returns the report that was sent, or `None` when the job had nothing to report
    pub async fn handle_job_terminated(&self, status: &JobStatus) -> PluginResult<Option<Report>> {
        let report = match build_report(status, self.registry.as_ref()) {
            Some(report) => report,
            None => return Ok(None),
        };

        let mailer = self.mailer.as_ref().ok_or(PluginError::SenderUnavailable)?;

        let to = self.receivers.read().await.clone();
        if to.is_empty() {
            return Err(PluginError::configuration_error("no report recipients configured"));
        }

        debug!(
            "Sending backup report ({} succeeded, {} failed) to {}",
            report.summary.success_count,
            report.summary.failure_count,
            to.join(", ")
        );

        mailer
            .send_email(Email {
                to,
                subject: REPORT_SUBJECT.to_string(),
                markdown: report.to_markdown(),
            })
            .await?;

        info!("Backup report sent: {}", report.summary.status);
        Ok(Some(report))
    }
}

/// Plugin instance bound to one server context
pub struct BackupReportsPlugin {
    info: PluginInfo,
    events: Arc<dyn NotificationManager<XoEvent>>,
    receivers: Arc<RwLock<Vec<String>>>,
    subscriber: Arc<ReportSubscriber>,
    state: Mutex<PluginState>,
}

impl BackupReportsPlugin {
    pub fn new(context: PluginContext) -> Self {
        let receivers = Arc::new(RwLock::new(Vec::new()));
        let listener = ReportListener::new(
            Arc::clone(&context.registry),
            context.mailer.clone(),
            Arc::clone(&receivers),
        );
        let instance = INSTANCE_COUNTER.fetch_add(1, Ordering::SeqCst);
        let subscriber = ReportSubscriber::new(
            format!("plugin_{}_{}", PLUGIN_NAME, instance),
            Arc::new(listener),
        );

        Self {
            info: PluginInfo::new(
                PLUGIN_NAME,
                env!("CARGO_PKG_VERSION"),
                "Emails backup and snapshot job reports",
            ),
            events: context.events,
            receivers,
            subscriber: Arc::new(subscriber),
            state: Mutex::new(PluginState::Unloaded),
        }
    }

    /// Replace the recipient list
    pub async fn configure_reports(&self, config: ReportsConfig) -> PluginResult<()> {
        config.validate()?;
        debug!("Configured {} report recipients", config.to.len());
        *self.receivers.write().await = config.to;
        Ok(())
    }

    pub async fn receivers(&self) -> Vec<String> {
        self.receivers.read().await.clone()
    }

    /// Identifier of this instance's event subscription
    pub fn subscriber_id(&self) -> &str {
        self.subscriber.subscriber_id()
    }
}

#[async_trait]
impl Plugin for BackupReportsPlugin {
    fn plugin_info(&self) -> &PluginInfo {
        &self.info
    }

    fn configuration_schema(&self) -> serde_json::Value {
        configuration_schema()
    }

    async fn configure(&self, configuration: serde_json::Value) -> PluginResult<()> {
        let config: ReportsConfig = serde_json::from_value(configuration)
            .map_err(|e| PluginError::configuration_error(e.to_string()))?;
        self.configure_reports(config).await
    }

    async fn load(&self) -> PluginResult<()> {
        let mut state = self.state.lock().await;
        if *state == PluginState::Loaded {
            warn!("Plugin '{}' is already loaded", self.info.name);
            return Ok(());
        }

        self.events.subscribe(self.subscriber.clone()).await?;
        *state = PluginState::Loaded;
        info!("Plugin '{}' loaded", self.info.name);
        Ok(())
    }

    async fn unload(&self) -> PluginResult<()> {
        let mut state = self.state.lock().await;
        if *state == PluginState::Unloaded {
            debug!("Plugin '{}' is not loaded", self.info.name);
            return Ok(());
        }

        self.events.unsubscribe(self.subscriber.subscriber_id()).await?;
        *state = PluginState::Unloaded;
        info!("Plugin '{}' unloaded", self.info.name);
        Ok(())
    }

    async fn plugin_state(&self) -> PluginState {
        *self.state.lock().await
    }
}
