use super::*;

#[test]
fn success_derives_from_exit_code() {
    let r = CommandResult { stdout: "hi".into(), stderr: "".into(), exit_code: 0 };
    assert!(r.success());
    let r = CommandResult { stdout: "".into(), stderr: "boom".into(), exit_code: 1 };
    assert!(!r.success());
}

#[test]
fn combined_joins_both_streams() {
    let r = CommandResult { stdout: "out".into(), stderr: "err".into(), exit_code: 0 };
    assert_eq!(r.combined(), "out\nerr");
}

#[test]
fn combined_is_just_stdout_when_stderr_empty() {
    let r = CommandResult { stdout: "hi".into(), stderr: "".into(), exit_code: 0 };
    assert_eq!(r.combined(), "hi");
}

#[test]
fn into_action_result_reflects_exit_code() {
    let r = CommandResult { stdout: "hi".into(), stderr: "".into(), exit_code: 0 };
    let a = r.into_action_result();
    assert!(a.success);
    assert_eq!(a.result, "hi");
}

#[test]
fn ok_and_fail_constructors() {
    assert!(ActionResult::ok("x").success);
    assert!(!ActionResult::fail("y").success);
}
