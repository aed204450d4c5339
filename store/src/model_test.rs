use super::*;
use time::macros::datetime;

// =============================================================
// Message deserialization
// =============================================================

#[test]
fn message_parses_rest_row_with_uuid_id() {
    let raw = serde_json::json!({
        "id": "7f0c1d7e-2a4b-4a53-9a53-0f7d9f0f2a11",
        "name": "Ann",
        "content": "hi",
        "created_at": "2024-05-01T10:00:00.123456+00:00"
    });
    let msg: Message = serde_json::from_value(raw).unwrap();
    assert_eq!(msg.id.as_str(), "7f0c1d7e-2a4b-4a53-9a53-0f7d9f0f2a11");
    assert_eq!(msg.name, "Ann");
    assert_eq!(msg.content, "hi");
    assert_eq!(msg.created_at, datetime!(2024-05-01 10:00:00.123456 UTC));
}

#[test]
fn message_accepts_integer_id() {
    let raw = serde_json::json!({
        "id": 42,
        "name": "Ann",
        "content": "hi",
        "created_at": "2024-05-01T10:00:00Z"
    });
    let msg: Message = serde_json::from_value(raw).unwrap();
    assert_eq!(msg.id, MessageId::new("42"));
}

#[test]
fn message_null_or_missing_name_becomes_placeholder() {
    let with_null = serde_json::json!({
        "id": 1, "name": null, "content": "a", "created_at": "2024-05-01T10:00:00Z"
    });
    let missing = serde_json::json!({
        "id": 2, "content": "b", "created_at": "2024-05-01T10:00:00Z"
    });
    let blank = serde_json::json!({
        "id": 3, "name": "  ", "content": "c", "created_at": "2024-05-01T10:00:00Z"
    });
    for raw in [with_null, missing, blank] {
        let msg: Message = serde_json::from_value(raw).unwrap();
        assert_eq!(msg.name, DEFAULT_AUTHOR_NAME);
    }
}

#[test]
fn message_requires_content() {
    let raw = serde_json::json!({ "id": 1, "name": "Ann", "created_at": "2024-05-01T10:00:00Z" });
    assert!(serde_json::from_value::<Message>(raw).is_err());
}

#[test]
fn message_serializes_timestamp_as_rfc3339() {
    let msg = Message {
        id: MessageId::new("m1"),
        name: "Ann".to_owned(),
        content: "hi".to_owned(),
        created_at: datetime!(2024-05-01 10:00:00 UTC),
    };
    let value = serde_json::to_value(&msg).unwrap();
    assert_eq!(value["created_at"], "2024-05-01T10:00:00Z");
    assert_eq!(value["id"], "m1");
}

// =============================================================
// Timestamps
// =============================================================

#[test]
fn parse_timestamp_accepts_postgres_text_form() {
    let ts = parse_timestamp("2024-05-01 10:00:00.5+00").unwrap();
    assert_eq!(ts, datetime!(2024-05-01 10:00:00.5 UTC));
}

#[test]
fn parse_timestamp_accepts_compact_offset() {
    let ts = parse_timestamp("2024-05-01 15:30:00+0530").unwrap();
    assert_eq!(ts, datetime!(2024-05-01 10:00:00 UTC));
}

#[test]
fn parse_timestamp_reads_naive_value_as_utc() {
    let ts = parse_timestamp("2024-05-01T10:00:00").unwrap();
    assert_eq!(ts, datetime!(2024-05-01 10:00:00 UTC));
}

#[test]
fn parse_timestamp_rejects_garbage() {
    assert!(parse_timestamp("yesterday").is_err());
}

// =============================================================
// NewMessage::from_draft
// =============================================================

#[test]
fn from_draft_trims_content_and_defaults_name() {
    let draft = NewMessage::from_draft("", " hello ", DEFAULT_AUTHOR_NAME).unwrap();
    assert_eq!(draft.name, DEFAULT_AUTHOR_NAME);
    assert_eq!(draft.content, "hello");
}

#[test]
fn from_draft_keeps_trimmed_author() {
    let draft = NewMessage::from_draft("  Ann ", "hi", DEFAULT_AUTHOR_NAME).unwrap();
    assert_eq!(draft.name, "Ann");
}

#[test]
fn from_draft_rejects_whitespace_content() {
    assert_eq!(
        NewMessage::from_draft("Ann", " \n\t ", DEFAULT_AUTHOR_NAME),
        Err(ValidationError::EmptyContent)
    );
}
