use super::*;

#[test]
fn log_level_ordering_matches_severity() {
    assert!(LogLevel::Error > LogLevel::Warn);
    assert!(LogLevel::Warn > LogLevel::Info);
    assert!(LogLevel::Info > LogLevel::Debug);
    assert!(LogLevel::Debug > LogLevel::Trace);
}

#[test]
fn session_id_has_prefix() {
    let id = SessionId::new();
    assert!(id.as_str().starts_with("ses-"));
}

#[test]
fn session_id_serializes_as_plain_string() {
    let id = SessionId::from_string("ses-abc123");
    let json = serde_json::to_string(&id).expect("serialize");
    assert_eq!(json, "\"ses-abc123\"");
}
