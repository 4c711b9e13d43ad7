//! Tests for report delivery through the plugin

use std::sync::Arc;
use tokio::sync::RwLock;

use super::mock_services::*;
use crate::job::CallRecord;
use crate::notifications::{NotificationManager, XoEvent};
use crate::plugin::{BackupReportsPlugin, Plugin, PluginError, ReportListener, REPORT_SUBJECT};
use crate::report::Outcome;

fn listener(mailer: Option<Arc<RecordingMailer>>) -> ReportListener {
    ReportListener::new(
        Arc::new(vm_registry()),
        mailer.map(|m| m as Arc<dyn crate::mailer::EmailSender>),
        Arc::new(RwLock::new(vec!["ops@example.com".to_string()])),
    )
}

#[tokio::test]
async fn test_empty_job_sends_nothing() {
    let mailer = Arc::new(RecordingMailer::new());
    let result = listener(Some(mailer.clone())).handle_job_terminated(&job(vec![])).await;

    assert!(result.unwrap().is_none());
    assert!(mailer.sent().is_empty());
}

#[tokio::test]
async fn test_single_successful_backup_is_reported() {
    let mailer = Arc::new(RecordingMailer::new());
    let report = listener(Some(mailer.clone()))
        .handle_job_terminated(&job(vec![backup("vm1", 0, 120)]))
        .await
        .unwrap()
        .unwrap();

    assert_eq!(report.summary.status, Outcome::Success);

    let sent = mailer.sent();
    assert_eq!(sent.len(), 1);
    assert_eq!(sent[0].to, vec!["ops@example.com".to_string()]);
    assert_eq!(sent[0].subject, REPORT_SUBJECT);

    let expected = "\
## Global status: Success
  - Start time: Mon Jan 01 2024 10:00:00 GMT+0000
  - End time: Mon Jan 01 2024 10:02:00 GMT+0000
  - Duration: 2 minutes
  - Successful backed up VM number: 1
  - Failed backed up VM: 0

### VM : VM1
  - UUID: u1
  - Status: Success
  - Start time: Mon Jan 01 2024 10:00:00 GMT+0000
  - End time: Mon Jan 01 2024 10:02:00 GMT+0000
  - Duration: 2 minutes";
    assert_eq!(sent[0].markdown, expected);
}

#[tokio::test]
async fn test_single_failed_backup() {
    let mailer = Arc::new(RecordingMailer::new());
    listener(Some(mailer.clone()))
        .handle_job_terminated(&job(vec![failed_backup("vm1", 0, 10)]))
        .await
        .unwrap();

    let markdown = &mailer.sent()[0].markdown;
    assert!(markdown.starts_with("## Global status: Fail\n"));
    assert!(markdown.contains("  - Status: Fail"));
    assert!(markdown.contains("  - Successful backed up VM number: 0"));
    assert!(markdown.contains("  - Failed backed up VM: 1"));
}

#[tokio::test]
async fn test_mixed_outcomes_keep_call_order() {
    let mailer = Arc::new(RecordingMailer::new());
    let report = listener(Some(mailer.clone()))
        .handle_job_terminated(&job(vec![failed_backup("vm2", 0, 10), backup("vm1", 10, 20)]))
        .await
        .unwrap()
        .unwrap();

    assert_eq!(report.summary.status, Outcome::Fail);
    assert_eq!(report.summary.success_count, 1);
    assert_eq!(report.summary.failure_count, 1);

    let markdown = &mailer.sent()[0].markdown;
    let vm2 = markdown.find("### VM : VM2").unwrap();
    let vm1 = markdown.find("### VM : VM1").unwrap();
    assert!(vm2 < vm1);
}

#[tokio::test]
async fn test_unrecognized_calls_are_ignored() {
    let mailer = Arc::new(RecordingMailer::new());
    let migrate = CallRecord::new("vm.migrate", at(0), at(5))
        .with_target("vm2")
        .with_error(serde_json::json!({ "message": "x" }));

    let report = listener(Some(mailer.clone()))
        .handle_job_terminated(&job(vec![migrate, backup("vm1", 5, 10)]))
        .await
        .unwrap()
        .unwrap();

    assert_eq!(report.summary.status, Outcome::Success);
    assert_eq!(report.relevant_count(), 1);
    assert!(!mailer.sent()[0].markdown.contains("VM2"));
}

#[tokio::test]
async fn test_unknown_object_uses_placeholder() {
    let mailer = Arc::new(RecordingMailer::new());
    listener(Some(mailer.clone()))
        .handle_job_terminated(&job(vec![backup("ghost", 0, 10), backup("vm1", 10, 20)]))
        .await
        .unwrap();

    let markdown = &mailer.sent()[0].markdown;
    assert!(markdown.contains("### VM : undefined\n  - UUID: undefined"));
    assert!(markdown.contains("### VM : VM1\n  - UUID: u1"));
}

#[tokio::test]
async fn test_missing_sender_is_an_error() {
    let result = listener(None).handle_job_terminated(&job(vec![backup("vm1", 0, 10)])).await;
    assert!(matches!(result, Err(PluginError::SenderUnavailable)));
}

#[tokio::test]
async fn test_missing_sender_without_calls_is_fine() {
    let result = listener(None).handle_job_terminated(&job(vec![])).await;
    assert!(result.unwrap().is_none());
}

#[tokio::test]
async fn test_send_failure_propagates_from_listener() {
    let mailer = Arc::new(RecordingMailer::new_failing());
    let result = listener(Some(mailer)).handle_job_terminated(&job(vec![backup("vm1", 0, 10)])).await;
    assert!(matches!(result, Err(PluginError::DeliveryFailed(_))));
}

#[tokio::test]
async fn test_unconfigured_recipients_is_an_error() {
    let mailer: Arc<dyn crate::mailer::EmailSender> = Arc::new(RecordingMailer::new());
    let listener = ReportListener::new(
        Arc::new(vm_registry()),
        Some(mailer),
        Arc::new(RwLock::new(Vec::new())),
    );

    let result = listener.handle_job_terminated(&job(vec![backup("vm1", 0, 10)])).await;
    assert!(matches!(result, Err(PluginError::ConfigurationError { .. })));
}

#[tokio::test]
async fn test_report_delivered_through_event_bus() {
    let host = TestHost::new();
    let plugin = BackupReportsPlugin::new(host.context.clone());
    plugin.configure(serde_json::json!({ "to": ["a@example.com", "b@example.com"] })).await.unwrap();
    plugin.load().await.unwrap();

    host.events.publish(XoEvent::other("job:started", serde_json::Value::Null)).await.unwrap();
    host.events.publish(XoEvent::job_terminated(job(vec![backup("vm1", 0, 10)]))).await.unwrap();

    let sent = host.mailer.sent();
    assert_eq!(sent.len(), 1);
    assert_eq!(sent[0].to, vec!["a@example.com".to_string(), "b@example.com".to_string()]);
}

#[tokio::test]
async fn test_errors_are_swallowed_and_plugin_stays_subscribed() {
    let host = TestHost::with_mailer(RecordingMailer::new_failing());
    let plugin = BackupReportsPlugin::new(host.context.clone());
    plugin.configure(serde_json::json!({ "to": ["ops@example.com"] })).await.unwrap();
    plugin.load().await.unwrap();

    let event = XoEvent::job_terminated(job(vec![backup("vm1", 0, 10)]));
    assert!(host.events.publish(event.clone()).await.is_ok());
    assert!(host.events.publish(event).await.is_ok());

    assert!(host.events.has_subscriber(plugin.subscriber_id()).await);
    let stats = host.events.get_stats().await;
    assert_eq!(stats.events_delivered, 2);
    assert_eq!(stats.delivery_failures, 0);
}

#[tokio::test]
async fn test_missing_sender_is_swallowed_by_subscriber() {
    let host = TestHost::without_mailer();
    let plugin = BackupReportsPlugin::new(host.context.clone());
    plugin.configure(serde_json::json!({ "to": ["ops@example.com"] })).await.unwrap();
    plugin.load().await.unwrap();

    let result = host.events.publish(XoEvent::job_terminated(job(vec![backup("vm1", 0, 10)]))).await;
    assert!(result.is_ok());
    assert!(host.mailer.sent().is_empty());
}

#[tokio::test]
async fn test_panic_during_report_is_contained() {
    let host = TestHost::new();
    let context = crate::plugin::PluginContext::new(host.events.clone(), Arc::new(PanickingRegistry))
        .with_mailer(host.mailer.clone());
    let plugin = BackupReportsPlugin::new(context);
    plugin.configure(serde_json::json!({ "to": ["ops@example.com"] })).await.unwrap();
    plugin.load().await.unwrap();

    let result = host.events.publish(XoEvent::job_terminated(job(vec![backup("vm1", 0, 10)]))).await;
    assert!(result.is_ok());
    assert!(host.mailer.sent().is_empty());
    assert!(host.events.has_subscriber(plugin.subscriber_id()).await);
}

#[tokio::test]
async fn test_reports_resume_after_a_panicking_job() {
    let host = TestHost::new();
    let context = crate::plugin::PluginContext::new(
        host.events.clone(),
        Arc::new(TrippingRegistry(vm_registry())),
    )
    .with_mailer(host.mailer.clone());
    let plugin = BackupReportsPlugin::new(context);
    plugin.configure(serde_json::json!({ "to": ["ops@example.com"] })).await.unwrap();
    plugin.load().await.unwrap();

    let poisoned = host.events.publish(XoEvent::job_terminated(job(vec![backup("poison", 0, 10)]))).await;
    assert!(poisoned.is_ok());
    assert!(host.mailer.sent().is_empty());

    host.events.publish(XoEvent::job_terminated(job(vec![backup("vm2", 0, 10)]))).await.unwrap();
    let sent = host.mailer.sent();
    assert_eq!(sent.len(), 1);
    assert!(sent[0].markdown.contains("### VM : VM2"));
}
