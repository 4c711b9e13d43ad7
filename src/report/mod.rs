//! Backup Report Generation
//!
//! Turns a terminated job into a [`Report`]: one global summary followed by one
//! entry per recognized call, in the order the calls ran. Jobs without any
//! backup or snapshot call produce no report at all.

pub mod duration;
pub mod markdown;

use std::fmt;
use serde::Serialize;
use log::debug;

use crate::job::{CallRecord, JobStatus, Timestamp};
use crate::registry::ObjectRegistry;

pub use duration::humanize_millis;

/// Placeholder used when a call's target cannot be resolved
pub const UNRESOLVED: &str = "undefined";

/// Outcome of a call or of a whole job
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum Outcome {
    Success,
    Fail,
}

impl fmt::Display for Outcome {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Outcome::Success => write!(f, "Success"),
            Outcome::Fail => write!(f, "Fail"),
        }
    }
}

/// Aggregate block heading the report
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct GlobalSummary {
    pub status: Outcome,
    pub start: String,
    pub end: String,
    pub duration: String,
    pub success_count: usize,
    pub failure_count: usize,
}

/// Per-call block
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CallReport {
    pub name: String,
    pub uuid: String,
    pub status: Outcome,
    pub start: String,
    pub end: String,
    pub duration: String,
}

/// Rendered view of one terminated job
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Report {
    pub summary: GlobalSummary,
    pub calls: Vec<CallReport>,
}

impl Report {
    pub fn relevant_count(&self) -> usize {
        self.summary.success_count + self.summary.failure_count
    }

    /// Markdown document: summary first, then calls
    pub fn to_markdown(&self) -> String {
        markdown::render(self)
    }
}

/// Build the report for a job, or `None` when no call is in scope
pub fn build_report(status: &JobStatus, registry: &dyn ObjectRegistry) -> Option<Report> {
    let mut success_count = 0usize;
    let mut calls = Vec::new();

    for call in status.recognized_calls() {
        let outcome = if call.failed() {
            Outcome::Fail
        } else {
            success_count += 1;
            Outcome::Success
        };
        calls.push(describe_call(call, outcome, registry));
    }

    if calls.is_empty() {
        debug!("Job carries no backup or snapshot calls ({} calls total)", status.calls.len());
        return None;
    }

    let relevant_count = calls.len();
    let summary = GlobalSummary {
        status: if success_count == relevant_count { Outcome::Success } else { Outcome::Fail },
        start: status.start.to_string(),
        end: status.end.to_string(),
        duration: elapsed(&status.start, &status.end),
        success_count,
        failure_count: relevant_count - success_count,
    };

    Some(Report { summary, calls })
}

fn describe_call(call: &CallRecord, status: Outcome, registry: &dyn ObjectRegistry) -> CallReport {
    let resolved = match call.target_id() {
        Some(id) => match registry.get_object(id) {
            Ok(object) => Some(object),
            Err(e) => {
                debug!("Unable to resolve '{}' for {}: {}", id, call.method, e);
                None
            }
        },
        None => {
            debug!("Call {} has no target id", call.method);
            None
        }
    };

    let (name, uuid) = match resolved {
        Some(object) => (object.name_label, object.uuid),
        None => (UNRESOLVED.to_string(), UNRESOLVED.to_string()),
    };

    CallReport {
        name,
        uuid,
        status,
        start: call.start.to_string(),
        end: call.end.to_string(),
        duration: elapsed(&call.start, &call.end),
    }
}

fn elapsed(start: &Timestamp, end: &Timestamp) -> String {
    humanize_millis(end.millis_since(start))
}
