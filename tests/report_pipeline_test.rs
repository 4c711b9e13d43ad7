use std::fs;
use std::sync::Arc;
use serde_json::json;
use tempfile::tempdir;

use backup_reports::job::JobStatus;
use backup_reports::mailer::OutboxMailer;
use backup_reports::notifications::{AsyncNotificationManager, NotificationManager, XoEvent};
use backup_reports::plugin::{BackupReportsPlugin, Plugin, PluginContext};
use backup_reports::registry::{InMemoryRegistry, XoObject};

fn status(calls: serde_json::Value) -> JobStatus {
    serde_json::from_value(json!({
        "start": "2024-03-10T02:00:00Z",
        "end": "2024-03-10T04:30:00Z",
        "calls": calls
    }))
    .expect("valid job status")
}

fn outbox_messages(dir: &std::path::Path) -> Vec<String> {
    if !dir.exists() {
        return Vec::new();
    }
    let mut paths: Vec<_> = fs::read_dir(dir)
        .unwrap()
        .map(|entry| entry.unwrap().path())
        .collect();
    paths.sort();
    paths.into_iter().map(|p| fs::read_to_string(p).unwrap()).collect()
}

async fn loaded_plugin(outbox: &std::path::Path) -> (Arc<AsyncNotificationManager<XoEvent>>, BackupReportsPlugin) {
    let events = Arc::new(AsyncNotificationManager::<XoEvent>::new());
    let registry = InMemoryRegistry::new()
        .with_object(XoObject::new("vm-web", "web-01", "9f1c"))
        .with_object(XoObject::new("vm-db", "db-01", "27ab"));
    let context = PluginContext::new(events.clone(), Arc::new(registry))
        .with_mailer(Arc::new(OutboxMailer::new(outbox)));

    let plugin = BackupReportsPlugin::new(context);
    plugin.configure(json!({ "to": ["ops@example.com"] })).await.unwrap();
    plugin.load().await.unwrap();
    (events, plugin)
}

#[tokio::test]
async fn test_nightly_job_report_lands_in_outbox() {
    let dir = tempdir().unwrap();
    let outbox = dir.path().join("outbox");
    let (events, plugin) = loaded_plugin(&outbox).await;

    let job = status(json!([
        {
            "method": "vm.rollingBackup",
            "params": { "id": "vm-web", "tag": "nightly" },
            "start": "2024-03-10T02:00:00Z",
            "end": "2024-03-10T03:00:00Z",
            "error": null
        },
        {
            "method": "vm.migrate",
            "params": { "id": "vm-db" },
            "start": "2024-03-10T03:00:00Z",
            "end": "2024-03-10T03:05:00Z"
        },
        {
            "method": "vm.rollingSnapshot",
            "params": { "id": "vm-gone" },
            "start": "2024-03-10T03:05:00Z",
            "end": "2024-03-10T04:30:00Z",
            "error": { "message": "VM_BAD_POWER_STATE" }
        }
    ]));

    events.publish(XoEvent::job_terminated(job)).await.unwrap();
    plugin.unload().await.unwrap();

    let messages = outbox_messages(&outbox);
    assert_eq!(messages.len(), 1);

    let message = &messages[0];
    assert!(message.starts_with("To: ops@example.com\nSubject: Backup Reports (XenOrchestra)\n\n"));
    assert!(message.contains("## Global status: Fail"));
    assert!(message.contains("  - Start time: Sun Mar 10 2024 02:00:00 GMT+0000"));
    assert!(message.contains("  - Duration: 3 hours"));
    assert!(message.contains("  - Successful backed up VM number: 1"));
    assert!(message.contains("  - Failed backed up VM: 1"));
    assert!(message.contains("### VM : web-01\n  - UUID: 9f1c\n  - Status: Success"));
    assert!(message.contains("  - Duration: an hour"));
    assert!(message.contains("### VM : undefined\n  - UUID: undefined\n  - Status: Fail"));
    assert!(!message.contains("db-01"));

    let web = message.find("web-01").unwrap();
    let gone = message.find("### VM : undefined").unwrap();
    assert!(web < gone);
}

#[tokio::test]
async fn test_job_without_backups_sends_nothing() {
    let dir = tempdir().unwrap();
    let outbox = dir.path().join("outbox");
    let (events, _plugin) = loaded_plugin(&outbox).await;

    events.publish(XoEvent::job_terminated(status(json!([])))).await.unwrap();
    events.publish(XoEvent::job_terminated(status(json!([
        {
            "method": "vm.start",
            "params": { "id": "vm-web" },
            "start": "2024-03-10T02:00:00Z",
            "end": "2024-03-10T02:00:10Z"
        }
    ])))).await.unwrap();

    assert!(outbox_messages(&outbox).is_empty());
}

#[tokio::test]
async fn test_concurrent_jobs_each_get_a_report() {
    let dir = tempdir().unwrap();
    let outbox = dir.path().join("outbox");
    let (events, _plugin) = loaded_plugin(&outbox).await;

    let publishes = (0..4).map(|_| {
        let events = events.clone();
        let job = status(json!([
            {
                "method": "vm.rollingBackup",
                "params": { "id": "vm-db" },
                "start": "2024-03-10T02:00:00Z",
                "end": "2024-03-10T02:00:20Z"
            }
        ]));
        tokio::spawn(async move { events.publish(XoEvent::job_terminated(job)).await })
    });

    for handle in futures::future::join_all(publishes).await {
        handle.unwrap().unwrap();
    }

    let messages = outbox_messages(&outbox);
    assert_eq!(messages.len(), 4);
    assert!(messages.iter().all(|m| m.contains("## Global status: Success")));
    assert!(messages.iter().all(|m| m.contains("  - Duration: a few seconds")));
}
