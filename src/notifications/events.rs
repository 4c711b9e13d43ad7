//! Host Event Types
//!
//! Events emitted by the management server. Each event carries a stable name
//! (`job:terminated`, ...) which subscribers can filter on.

use serde::{Deserialize, Serialize};
use crate::job::JobStatus;

/// Name of the event emitted when a job finishes, successfully or not
pub const JOB_TERMINATED: &str = "job:terminated";

/// Base trait for all events routed through the bus
pub trait NotificationEvent: Send + Sync + Clone + std::fmt::Debug + 'static {
    /// Stable event name used for filtering
    fn event_name(&self) -> &str;
}

/// Events emitted by the server
#[derive(Debug, Clone, Serialize, Deserialize)]
pub enum XoEvent {
    /// A job reached a terminal state
    JobTerminated(JobStatus),

    /// Any other server event, passed through untouched
    Other {
        name: String,
        payload: serde_json::Value,
    },
}

impl XoEvent {
    pub fn job_terminated(status: JobStatus) -> Self {
        XoEvent::JobTerminated(status)
    }

    pub fn other<S: Into<String>>(name: S, payload: serde_json::Value) -> Self {
        XoEvent::Other { name: name.into(), payload }
    }
}

impl NotificationEvent for XoEvent {
    fn event_name(&self) -> &str {
        match self {
            XoEvent::JobTerminated(_) => JOB_TERMINATED,
            XoEvent::Other { name, .. } => name,
        }
    }
}
