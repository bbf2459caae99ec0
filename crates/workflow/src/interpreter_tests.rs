use super::*;
use serde_json::json;

use crate::document::ActionSpec;

struct RecordingDispatcher {
    calls: Vec<(String, String, Vec<Value>)>,
    fail_methods: Vec<String>,
    entered_labels: Vec<Option<String>>,
}

impl RecordingDispatcher {
    fn new() -> Self {
        RecordingDispatcher { calls: vec![], fail_methods: vec![], entered_labels: vec![] }
    }

    fn failing(methods: &[&str]) -> Self {
        RecordingDispatcher {
            calls: vec![],
            fail_methods: methods.iter().map(|s| s.to_string()).collect(),
            entered_labels: vec![],
        }
    }
}

#[async_trait]
impl ActionDispatcher for RecordingDispatcher {
    async fn dispatch(&mut self, actor: &str, method: &str, arguments: &[Value]) -> ActionResult {
        self.calls.push((actor.to_string(), method.to_string(), arguments.to_vec()));
        if self.fail_methods.contains(&method.to_string()) {
            ActionResult::fail("guard rejected")
        } else {
            ActionResult::ok(format!("{method}-ok"))
        }
    }

    async fn on_enter_transition(&mut self, label: Option<&str>) {
        self.entered_labels.push(label.map(str::to_string));
    }
}

fn action(actor: &str, method: &str) -> ActionSpec {
    ActionSpec { actor: actor.into(), method: method.into(), arguments: vec![] }
}

fn linear_doc() -> WorkflowDocument {
    WorkflowDocument {
        name: "linear".into(),
        transitions: vec![
            Transition { states: ["0".into(), "1".into()], label: Some("start".into()), actions: vec![action("this", "step1")] },
            Transition { states: ["1".into(), "end".into()], label: Some("finish".into()), actions: vec![action("this", "step2")] },
        ],
    }
}

#[tokio::test]
async fn run_until_end_walks_every_transition_in_order() {
    let mut interp = WorkflowInterpreter::new(linear_doc());
    let mut dispatcher = RecordingDispatcher::new();

    let result = interp.run_until_end(&mut dispatcher).await.expect("completes");
    assert!(result.success);
    assert_eq!(interp.current_state(), WorkflowDocument::TERMINAL_STATE);
    assert_eq!(dispatcher.calls.len(), 2);
    assert_eq!(dispatcher.calls[0].1, "step1");
    assert_eq!(dispatcher.calls[1].1, "step2");
    assert_eq!(dispatcher.entered_labels, vec![Some("start".to_string()), Some("finish".to_string())]);
}

#[tokio::test]
async fn guard_failure_falls_through_to_next_candidate() {
    let doc = WorkflowDocument {
        name: "branch".into(),
        transitions: vec![
            Transition { states: ["0".into(), "1".into()], label: None, actions: vec![action("this", "guard_fails")] },
            Transition { states: ["0".into(), "2".into()], label: None, actions: vec![action("this", "guard_ok")] },
            Transition { states: ["2".into(), "end".into()], label: None, actions: vec![] },
        ],
    };
    let mut interp = WorkflowInterpreter::new(doc);
    let mut dispatcher = RecordingDispatcher::failing(&["guard_fails"]);

    let result = interp.run_until_end(&mut dispatcher).await.expect("completes via second candidate");
    assert!(result.success);
    assert_eq!(interp.current_state(), "end");
    assert_eq!(dispatcher.calls[0].1, "guard_fails");
    assert_eq!(dispatcher.calls[1].1, "guard_ok");
}

#[tokio::test]
async fn a_failing_guard_with_no_other_candidate_is_still_taken() {
    let doc = WorkflowDocument {
        name: "dead-end".into(),
        transitions: vec![Transition {
            states: ["0".into(), "1".into()],
            label: None,
            actions: vec![action("this", "always_fails")],
        }],
    };
    let mut interp = WorkflowInterpreter::new(doc);
    let mut dispatcher = RecordingDispatcher::failing(&["always_fails"]);

    let result = interp.run_until_end(&mut dispatcher).await.expect("dead end is not an error");
    assert!(!result.success);
    assert_eq!(interp.current_state(), "1");
    assert_eq!(dispatcher.calls.len(), 1);
}

#[tokio::test]
async fn no_transitions_from_the_current_state_returns_success_in_place() {
    let doc = WorkflowDocument { name: "empty".into(), transitions: vec![] };
    let mut interp = WorkflowInterpreter::new(doc);
    let mut dispatcher = RecordingDispatcher::new();

    let result = interp.run_until_end(&mut dispatcher).await.expect("dead end is not an error");
    assert!(result.success);
    assert_eq!(interp.current_state(), WorkflowDocument::INITIAL_STATE);
}

#[tokio::test]
async fn exceeding_max_iterations_is_reported_as_non_termination() {
    let doc = WorkflowDocument {
        name: "loop".into(),
        transitions: vec![Transition { states: ["0".into(), "0".into()], label: None, actions: vec![] }],
    };
    let mut interp = WorkflowInterpreter::with_max_iterations(doc, 3);
    let mut dispatcher = RecordingDispatcher::new();

    let err = interp.run_until_end(&mut dispatcher).await.unwrap_err();
    assert!(matches!(err, IacError::Config(ConfigError::NoTransition(_, _))));
}

#[tokio::test]
async fn result_and_state_substitution_reach_the_dispatcher() {
    let doc = WorkflowDocument {
        name: "substitution".into(),
        transitions: vec![
            Transition {
                states: ["0".into(), "1".into()],
                label: None,
                actions: vec![ActionSpec { actor: "this".into(), method: "produce".into(), arguments: vec![] }],
            },
            Transition {
                states: ["1".into(), "end".into()],
                label: None,
                actions: vec![ActionSpec {
                    actor: "this".into(),
                    method: "consume".into(),
                    arguments: vec![json!("${result}"), json!("${greeting}")],
                }],
            },
        ],
    };
    let mut interp = WorkflowInterpreter::new(doc);
    interp.state_mut().put_str("greeting", "hi");
    let mut dispatcher = RecordingDispatcher::new();

    interp.run_until_end(&mut dispatcher).await.expect("completes");
    let (_, _, consume_args) = &dispatcher.calls[1];
    assert_eq!(consume_args[0], json!("produce-ok"));
    assert_eq!(consume_args[1], json!("hi"));
}

#[tokio::test]
async fn run_workflow_shares_state_with_the_parent_interpreter() {
    let parent_doc = WorkflowDocument { name: "parent".into(), transitions: vec![] };
    let mut interp = WorkflowInterpreter::new(parent_doc);
    interp.state_mut().put_str("seed", "42");

    let sub_doc = WorkflowDocument {
        name: "child".into(),
        transitions: vec![Transition {
            states: ["0".into(), "end".into()],
            label: None,
            actions: vec![ActionSpec {
                actor: "this".into(),
                method: "echo".into(),
                arguments: vec![json!("${seed}")],
            }],
        }],
    };
    let mut dispatcher = RecordingDispatcher::new();
    let result = interp.run_workflow(&mut dispatcher, sub_doc).await.expect("sub-workflow completes");
    assert!(result.success);
    assert_eq!(dispatcher.calls[0].2[0], json!("42"));
    assert_eq!(interp.state().get("seed").as_deref(), Some("42"));
}

#[test]
fn reset_rewinds_state_machine_without_clearing_json_state() {
    let doc = linear_doc();
    let mut interp = WorkflowInterpreter::new(doc);
    interp.state_mut().put_str("keep", "me");
    // Simulate having progressed past the initial state.
    interp.current_state = "1".into();
    interp.last_result = Some("whatever".into());

    interp.reset();
    assert_eq!(interp.current_state(), WorkflowDocument::INITIAL_STATE);
    assert_eq!(interp.last_result(), None);
    assert_eq!(interp.state().get("keep").as_deref(), Some("me"));
}
