//! Report Subscriber
//!
//! Attaches a [`ReportListener`] to the event bus. Every `job:terminated`
//! event is handled inside an error boundary: failures and panics are logged
//! and never reach the bus, so one bad report leaves the subscription intact.

use std::any::Any;
use std::panic::AssertUnwindSafe;
use std::sync::Arc;
use async_trait::async_trait;
use futures::FutureExt;
use log::error;

use crate::job::JobStatus;
use crate::notifications::{EventFilter, NotificationResult, Subscriber, XoEvent, JOB_TERMINATED};
use crate::plugin::backup_reports::ReportListener;
use crate::plugin::error::PluginError;

pub struct ReportSubscriber {
    subscriber_id: String,
    listener: Arc<ReportListener>,
}

impl ReportSubscriber {
    pub fn new(subscriber_id: String, listener: Arc<ReportListener>) -> Self {
        Self { subscriber_id, listener }
    }

    /// Run the listener; any failure is logged and swallowed
    pub async fn report(&self, status: &JobStatus) {
        let outcome = AssertUnwindSafe(self.listener.handle_job_terminated(status))
            .catch_unwind()
            .await
            .unwrap_or_else(|panic| Err(PluginError::report_failed(panic_message(panic.as_ref()))));

        if let Err(e) = outcome {
            error!("backup report error: {}", e);
        }
    }
}

fn panic_message(payload: &(dyn Any + Send)) -> String {
    if let Some(message) = payload.downcast_ref::<&str>() {
        message.to_string()
    } else if let Some(message) = payload.downcast_ref::<String>() {
        message.clone()
    } else {
        "panic while building report".to_string()
    }
}

#[async_trait]
impl Subscriber<XoEvent> for ReportSubscriber {
    async fn handle_event(&self, event: XoEvent) -> NotificationResult<()> {
        if let XoEvent::JobTerminated(status) = event {
            self.report(&status).await;
        }
        Ok(())
    }

    fn subscriber_id(&self) -> &str {
        &self.subscriber_id
    }

    fn event_filter(&self) -> EventFilter {
        EventFilter::named(JOB_TERMINATED)
    }
}
