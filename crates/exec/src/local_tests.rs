use super::*;
use std::sync::{Arc, Mutex};

#[tokio::test]
async fn echo_is_captured_on_stdout() {
    let exec = LocalExecutor;
    let result = exec.execute("echo hi", None).await.expect("local exec succeeds");
    assert_eq!(result.stdout, "hi");
    assert_eq!(result.stderr, "");
    assert_eq!(result.exit_code, 0);
}

#[tokio::test]
async fn nonzero_exit_is_reported_without_erroring() {
    let exec = LocalExecutor;
    let result = exec.execute("exit 7", None).await.expect("local exec succeeds");
    assert_eq!(result.exit_code, 7);
    assert!(!result.success());
}

#[tokio::test]
async fn stderr_is_captured_separately() {
    let exec = LocalExecutor;
    let result = exec.execute("echo err 1>&2", None).await.expect("local exec succeeds");
    assert_eq!(result.stderr, "err");
}

#[tokio::test]
async fn line_callback_sees_each_line_before_it_is_captured() {
    let exec = LocalExecutor;
    let seen: Arc<Mutex<Vec<(LineSource, String)>>> = Arc::new(Mutex::new(Vec::new()));
    let seen_cb = seen.clone();
    let cb: LineCallback = Arc::new(move |src, line| {
        seen_cb.lock().expect("lock").push((src, line.to_string()));
    });
    let result = exec.execute("printf 'a\\nb\\n'", Some(cb)).await.expect("local exec succeeds");
    assert_eq!(result.stdout, "a\nb");
    let seen = seen.lock().expect("lock");
    assert_eq!(seen.as_slice(), &[(LineSource::Stdout, "a".to_string()), (LineSource::Stdout, "b".to_string())]);
}

#[tokio::test]
async fn variable_substituted_command_executes_expanded_text() {
    let exec = LocalExecutor;
    let result = exec.execute("echo srv1", None).await.expect("local exec succeeds");
    assert_eq!(result.stdout, "srv1");
}
