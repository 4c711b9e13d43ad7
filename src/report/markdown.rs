//! Markdown rendering of reports

use super::{CallReport, GlobalSummary, Report};

/// Join summary and call blocks, separated by blank lines
pub fn render(report: &Report) -> String {
    let mut blocks = Vec::with_capacity(report.calls.len() + 1);
    blocks.push(render_summary(&report.summary));
    blocks.extend(report.calls.iter().map(render_call));
    blocks.join("\n\n")
}

fn render_summary(summary: &GlobalSummary) -> String {
    [
        format!("## Global status: {}", summary.status),
        format!("  - Start time: {}", summary.start),
        format!("  - End time: {}", summary.end),
        format!("  - Duration: {}", summary.duration),
        format!("  - Successful backed up VM number: {}", summary.success_count),
        format!("  - Failed backed up VM: {}", summary.failure_count),
    ]
    .join("\n")
}

fn render_call(call: &CallReport) -> String {
    [
        format!("### VM : {}", call.name),
        format!("  - UUID: {}", call.uuid),
        format!("  - Status: {}", call.status),
        format!("  - Start time: {}", call.start),
        format!("  - End time: {}", call.end),
        format!("  - Duration: {}", call.duration),
    ]
    .join("\n")
}
