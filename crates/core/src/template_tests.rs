use super::*;

#[test]
fn no_placeholders_is_identity() {
    let state = JsonState::new();
    assert_eq!(interpolate("echo hi", &state, None), "echo hi");
}

#[test]
fn expands_simple_name() {
    let mut state = JsonState::new();
    state.put_str("h", "srv1");
    assert_eq!(interpolate("echo ${h}", &state, None), "echo srv1");
}

#[test]
fn expands_dotted_path() {
    let mut state = JsonState::new();
    state.put_str("a.b", "nested");
    assert_eq!(interpolate("${a.b}", &state, None), "nested");
}

#[test]
fn result_expands_from_last_result_not_state() {
    let state = JsonState::new();
    assert_eq!(interpolate("${result}", &state, Some("srv1")), "srv1");
}

#[test]
fn unknown_variable_left_as_is() {
    let state = JsonState::new();
    assert_eq!(interpolate("${nope}", &state, None), "${nope}");
}

#[test]
fn result_with_no_prior_action_left_as_is() {
    let state = JsonState::new();
    assert_eq!(interpolate("${result}", &state, None), "${result}");
}
