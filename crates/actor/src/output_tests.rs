use super::*;
use actoriac_core::SessionId;

#[test]
fn per_source_order_is_preserved() {
    let mux = OutputMultiplexer::new();
    mux.push("node-w1", OutputKind::Stdout, "line1");
    mux.push("node-w1", OutputKind::Stdout, "line2");
    mux.push("node-w2", OutputKind::Stdout, "other");

    let w1: Vec<String> = mux.lines_for("node-w1").into_iter().map(|l| l.text).collect();
    assert_eq!(w1, vec!["line1".to_string(), "line2".to_string()]);
    assert_eq!(mux.lines_for("node-w2").len(), 1);
}

#[test]
fn combined_for_joins_with_newlines() {
    let mux = OutputMultiplexer::new();
    mux.push("node-w1", OutputKind::Stdout, "a");
    mux.push("node-w1", OutputKind::Stderr, "b");
    assert_eq!(mux.combined_for("node-w1"), "a\nb");
}

fn entry(label: &str, level: LogLevel, message: &str) -> LogEntry {
    LogEntry {
        session_id: SessionId::new(),
        node_id: "node-w1".into(),
        label: Some(label.into()),
        level,
        action_name: None,
        exit_code: None,
        duration_ms: None,
        message: message.into(),
        timestamp_ms: 0,
    }
}

#[test]
fn summarize_by_label_counts_markers() {
    let entries = vec![
        entry("deploy", LogLevel::Info, "[OK] step one"),
        entry("deploy", LogLevel::Error, "[ERROR] step two failed"),
        entry("deploy", LogLevel::Warn, "[WARN] retrying"),
        entry("other", LogLevel::Info, "[INFO] unrelated"),
    ];
    let grouped = summarize_by_label(&entries);

    let deploy = &grouped["deploy"];
    assert_eq!(deploy.ok, 1);
    assert_eq!(deploy.error, 1);
    assert_eq!(deploy.warn, 1);
    assert_eq!(deploy.error_lines, vec!["[ERROR] step two failed".to_string()]);

    assert_eq!(grouped["other"].info, 1);
}

#[test]
fn trace_level_entries_are_excluded() {
    let entries = vec![entry("deploy", LogLevel::Trace, "[OK] too noisy")];
    let grouped = summarize_by_label(&entries);
    assert!(grouped.is_empty());
}

#[test]
fn format_summary_table_includes_error_and_warning_sections() {
    let entries = vec![
        entry("deploy", LogLevel::Error, "[ERROR] boom"),
        entry("deploy", LogLevel::Warn, "[WARN] careful"),
    ];
    let grouped = summarize_by_label(&entries);
    let table = format_summary_table(&grouped);

    assert!(table.contains("deploy"));
    assert!(table.contains("--- Errors ---"));
    assert!(table.contains("[ERROR] boom"));
    assert!(table.contains("--- Warnings ---"));
    assert!(table.contains("[WARN] careful"));
}
