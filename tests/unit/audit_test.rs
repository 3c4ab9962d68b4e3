//! Tests for audit sink

use cicd_scheduler::core::{build_audit_event, AuditAction, AuditSink, InMemoryAuditSink, JobKey};

#[test]
fn test_in_memory_audit_sink() {
    let mut sink = InMemoryAuditSink::new(10);

    let event = build_audit_event(1, JobKey::new("ci", "a"), AuditAction::Promote, None);

    sink.record(event.clone());
    assert_eq!(sink.events().len(), 1);

    let events = sink.events();
    assert_eq!(events[0].event_id, event.event_id);
    assert_eq!(events[0].job, JobKey::new("ci", "a"));
    assert_eq!(events[0].action, AuditAction::Promote);
}

#[test]
fn test_audit_sink_overflow() {
    let mut sink = InMemoryAuditSink::new(2);

    for name in ["a", "b", "c"] {
        sink.record(build_audit_event(1, JobKey::new("ci", name), AuditAction::Promote, None));
    }

    let events = sink.events();
    assert_eq!(events.len(), 2);
    assert_eq!(events[0].job.name, "b"); // First one popped
    assert_eq!(events[1].job.name, "c");
}

#[test]
fn test_build_audit_event() {
    let event = build_audit_event(
        4,
        JobKey::new("ci", "a"),
        AuditAction::StartFailed,
        Some("no pipeline template".to_string()),
    );

    assert_eq!(event.pass, 4);
    assert_eq!(event.action.to_string(), "start_failed");
    assert_eq!(event.detail, Some("no pipeline template".to_string()));
    assert!(!event.event_id.is_empty());
    assert!(event.created_at_ms > 0);
}

#[test]
fn test_audit_event_serializes_action_in_snake_case() {
    let event = build_audit_event(1, JobKey::new("ci", "a"), AuditAction::StartFailed, None);
    let json = serde_json::to_value(&event).unwrap();
    assert_eq!(json["action"], "start_failed");
    assert_eq!(json["job"]["name"], "a");
}
