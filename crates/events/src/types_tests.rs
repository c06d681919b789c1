use super::*;
use chrono::TimeZone;
use serde_json::json;

fn context(value: Value) -> ExecutionContext {
    serde_json::from_value(value).unwrap()
}

#[test]
fn timestamp_displays_as_rfc3339() {
    let dt = Utc.with_ymd_and_hms(2024, 5, 1, 12, 30, 0).unwrap();
    assert_eq!(Timestamp::from_utc(dt).to_string(), "2024-05-01T12:30:00+00:00");
}

#[test]
fn empty_object_has_no_well_known_fields() {
    let context = context(json!({}));

    assert_eq!(context.execution_id(), None);
    assert_eq!(context.started_at(), None);
    assert!(context.attributes().is_empty());
}

#[test]
fn string_fields_are_read() {
    let context = context(json!({
        "execution_id": "exec-1",
        "started_at": "2024-05-01T12:30:00Z"
    }));

    assert_eq!(context.execution_id().as_deref(), Some("exec-1"));
    assert_eq!(
        context.started_at(),
        Some(Timestamp::from_utc(Utc.with_ymd_and_hms(2024, 5, 1, 12, 30, 0).unwrap()))
    );
}

#[test]
fn numeric_execution_id_is_accepted() {
    let context: ExecutionContext = serde_json::from_str(r#"{"execution_id": 42}"#).unwrap();
    assert_eq!(context.execution_id().as_deref(), Some("42"));
}

#[test]
fn numeric_started_at_is_unix_seconds() {
    let context: ExecutionContext = serde_json::from_str(r#"{"started_at": 1700000000}"#).unwrap();

    assert_eq!(
        context.started_at(),
        Some(Timestamp::from_utc(Utc.with_ymd_and_hms(2023, 11, 14, 22, 13, 20).unwrap()))
    );
}

#[test]
fn unexpected_types_are_kept_but_not_interpreted() {
    let context = context(json!({
        "execution_id": {"nested": true},
        "started_at": "yesterday"
    }));

    assert_eq!(context.execution_id(), None);
    assert_eq!(context.started_at(), None);
    assert_eq!(context.get("execution_id"), Some(&json!({"nested": true})));
}

#[test]
fn context_round_trips_unchanged() {
    let original = json!({
        "execution_id": 42,
        "started_at": 1700000000,
        "workflow": "deploy",
        "attempt": 2
    });

    let round_trip = serde_json::to_value(context(original.clone())).unwrap();
    assert_eq!(round_trip, original);
}

#[test]
fn non_object_context_is_rejected() {
    assert!(serde_json::from_str::<ExecutionContext>("[1, 2]").is_err());
}

#[test]
fn new_context_carries_the_execution_id_and_start_time() {
    let context = ExecutionContext::new("delivery-42");

    assert_eq!(context.execution_id().as_deref(), Some("delivery-42"));
    assert!(context.started_at().is_some());
    assert_eq!(context.attributes().len(), 2);
}
