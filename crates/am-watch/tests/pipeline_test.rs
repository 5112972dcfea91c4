//! End-to-end: relay publish → subscription → watcher pipeline → sinks.

use am_core::{Importance, MessageMeta, NotificationEvent};
use am_relay::Broadcaster;
use am_watch::sinks::{alert, SinkConfig};
use am_watch::{Pipeline, SinkDispatcher};

fn deploy_plan_event() -> NotificationEvent {
    NotificationEvent::new(
        "p",
        "a",
        "2025-01-01T00:00:00Z",
        Some(MessageMeta {
            id: 42,
            from: "Alice".into(),
            subject: "Re: deploy plan".into(),
            importance: Importance::High,
            body: None,
        }),
    )
}

fn pipeline(sinks: SinkConfig) -> Pipeline {
    let dispatcher =
        SinkDispatcher::new(sinks, "http://localhost:8765", None).expect("dispatcher");
    Pipeline::new(dispatcher)
}

#[tokio::test]
async fn published_event_reaches_the_sinks_exactly_once() {
    let dir = tempfile::tempdir().unwrap();
    let sentinel_path = dir.path().join("pending.json");

    let broadcaster = Broadcaster::new();
    let mut sub = broadcaster.subscribe("p", "a");
    let mut pipeline = pipeline(SinkConfig {
        alert: true,
        sentinel_file: Some(sentinel_path.clone()),
        ..Default::default()
    });

    // First delivery runs the sinks.
    broadcaster.publish(&deploy_plan_event());
    let event = sub.recv().await;
    assert!(pipeline.handle(&event).await);
    assert!(sentinel_path.exists());

    // The same envelope again (SSE reconnect replay) is filtered; an
    // external reader consuming the sentinel sees no second write.
    std::fs::remove_file(&sentinel_path).unwrap();
    broadcaster.publish(&deploy_plan_event());
    let replay = sub.recv().await;
    assert!(!pipeline.handle(&replay).await);
    assert!(!sentinel_path.exists());
}

#[test]
fn alert_line_for_the_deploy_plan_event() {
    let line = alert::render_line(&deploy_plan_event());
    assert!(line.contains("Alice"));
    assert!(line.contains("Re: deploy plan"));
    assert!(line.contains("42"));
    assert!(line.contains("🔴"), "elevated importance needs the marker");
}

#[tokio::test]
async fn later_messages_keep_flowing_after_a_duplicate() {
    let dir = tempfile::tempdir().unwrap();
    let buffer_path = dir.path().join("pending.md");

    let mut pipeline = pipeline(SinkConfig {
        buffer_file: Some(buffer_path.clone()),
        ..Default::default()
    });

    let first = deploy_plan_event();
    let mut second = deploy_plan_event();
    if let Some(msg) = second.message.as_mut() {
        msg.id = 43;
        msg.subject = "Re: rollback".into();
    }
    second.timestamp = "2025-01-01T00:01:00Z".into();

    assert!(pipeline.handle(&first).await);
    assert!(!pipeline.handle(&first).await);
    assert!(pipeline.handle(&second).await);

    let text = std::fs::read_to_string(&buffer_path).unwrap();
    assert_eq!(text.matches("Re: deploy plan").count(), 1);
    assert_eq!(text.matches("Re: rollback").count(), 1);
}
