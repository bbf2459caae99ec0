use super::*;
use actoriac_core::{LogLevel, SessionStatus};
use tempfile::tempdir;

fn open_store() -> (tempfile::TempDir, SessionStore) {
    let dir = tempdir().expect("tempdir");
    let store = SessionStore::open(dir.path()).expect("open store");
    (dir, store)
}

#[test]
fn start_session_then_log_then_summary() {
    let (_dir, store) = open_store();
    let session = store.start_session("deploy", None, None, Some(2), "/", "actoriac run", 1).expect("start");
    store.log(session, "w1", None, LogLevel::Info, "hello", 2).expect("log");
    store.mark_node_success(session, "w1", None, 3).expect("mark");
    store.mark_node_failed(session, "w2", Some("boom".into()), 4).expect("mark");
    store.flush().expect("flush");

    let summary = store.get_summary(session).expect("summary exists");
    assert_eq!(summary.node_count, 2);
    assert_eq!(summary.success_count, 1);
    assert_eq!(summary.failed_count, 1);
}

#[test]
fn log_action_derives_level_from_exit_code() {
    let (_dir, store) = open_store();
    let session = store.start_session("wf", None, None, None, "/", "x", 0).expect("start");
    store.log_action(session, "w1", "step", "executeCommand", 0, 10, "ok", 1).expect("log");
    store.log_action(session, "w1", "step", "executeCommand", 1, 10, "bad", 2).expect("log");
    store.flush().expect("flush");

    let logs = store.get_logs_by_node(session, "w1");
    assert_eq!(logs.len(), 2);
    assert_eq!(logs[0].level, LogLevel::Info);
    assert_eq!(logs[1].level, LogLevel::Error);
}

#[test]
fn get_logs_by_level_filters_below_threshold() {
    let (_dir, store) = open_store();
    let session = store.start_session("wf", None, None, None, "/", "x", 0).expect("start");
    store.log(session, "w1", None, LogLevel::Debug, "d", 1).expect("log");
    store.log(session, "w1", None, LogLevel::Warn, "w", 2).expect("log");
    store.flush().expect("flush");

    let logs = store.get_logs_by_level(session, LogLevel::Info);
    assert_eq!(logs.len(), 1);
    assert_eq!(logs[0].message, "w");
}

#[test]
fn latest_node_marker_wins_for_summary_but_all_are_persisted() {
    let (_dir, store) = open_store();
    let session = store.start_session("wf", None, None, None, "/", "x", 0).expect("start");
    store.mark_node_failed(session, "w1", Some("retry 1".into()), 1).expect("mark");
    store.mark_node_success(session, "w1", None, 2).expect("mark");
    store.flush().expect("flush");

    let summary = store.get_summary(session).expect("summary");
    assert_eq!(summary.success_count, 1);
    assert_eq!(summary.failed_count, 0);
}

#[test]
fn session_survives_reopen_via_replay() {
    let dir = tempdir().expect("tempdir");
    let session = {
        let store = SessionStore::open(dir.path()).expect("open store");
        let session = store.start_session("wf", None, None, None, "/", "x", 0).expect("start");
        store.log(session, "w1", None, LogLevel::Info, "hi", 1).expect("log");
        store.flush().expect("flush");
        session
    };

    let reopened = SessionStore::open(dir.path()).expect("reopen");
    let logs = reopened.get_logs_by_node(session, "w1");
    assert_eq!(logs.len(), 1);
    assert_eq!(logs[0].message, "hi");
}

#[test]
fn list_sessions_orders_most_recent_first() {
    let (_dir, store) = open_store();
    let s1 = store.start_session("wf", None, None, None, "/", "x", 1).expect("start");
    let s2 = store.start_session("wf", None, None, None, "/", "x", 2).expect("start");
    store.flush().expect("flush");

    assert_eq!(store.list_sessions(10), vec![s2, s1]);
    assert_eq!(store.get_latest_session_id(), Some(s2));
}

#[test]
fn ending_a_session_compacts_its_segment_into_zst() {
    let dir = tempdir().expect("tempdir");
    let store = SessionStore::open(dir.path()).expect("open store");
    let session = store.start_session("wf", None, None, None, "/", "x", 0).expect("start");
    store.log(session, "w1", None, LogLevel::Info, "hi", 1).expect("log");
    store.end_session(session, SessionStatus::Completed, 2).expect("end");
    store.flush().expect("flush");

    let plain = dir.path().join(format!("{}.jsonl", session.as_str()));
    let compressed = dir.path().join(format!("{}.jsonl.zst", session.as_str()));
    assert!(!plain.exists());
    assert!(compressed.exists());
}

#[test]
fn ended_session_survives_reopen_via_compressed_replay() {
    let dir = tempdir().expect("tempdir");
    let session = {
        let store = SessionStore::open(dir.path()).expect("open store");
        let session = store.start_session("wf", None, None, None, "/", "x", 0).expect("start");
        store.log(session, "w1", None, LogLevel::Info, "hi", 1).expect("log");
        store.end_session(session, SessionStatus::Completed, 2).expect("end");
        store.flush().expect("flush");
        session
    };

    let reopened = SessionStore::open(dir.path()).expect("reopen");
    let logs = reopened.get_logs_by_node(session, "w1");
    assert_eq!(logs.len(), 1);
    assert_eq!(reopened.get_summary(session).expect("summary").status, Some(SessionStatus::Completed));
}

#[test]
fn summary_falls_back_to_header_node_count_when_no_results_yet() {
    let (_dir, store) = open_store();
    let session = store.start_session("wf", None, None, Some(5), "/", "x", 0).expect("start");
    store.flush().expect("flush");
    let summary = store.get_summary(session).expect("summary");
    assert_eq!(summary.node_count, 5);
}
