use super::*;

fn doc() -> WorkflowDocument {
    WorkflowDocument {
        name: "deploy".into(),
        transitions: vec![
            Transition {
                states: ["0".into(), "1".into()],
                label: Some("start".into()),
                actions: vec![],
            },
            Transition {
                states: ["0".into(), "2".into()],
                label: Some("alt-start".into()),
                actions: vec![],
            },
        ],
    }
}

#[test]
fn transitions_from_returns_all_sharing_from_in_order() {
    let d = doc();
    let matches = d.transitions_from("0");
    assert_eq!(matches.len(), 2);
    assert_eq!(matches[0].to(), "1");
    assert_eq!(matches[1].to(), "2");
}

#[test]
fn transitions_from_empty_for_unknown_state() {
    let d = doc();
    assert!(d.transitions_from("99").is_empty());
}

#[test]
fn from_and_to_read_the_states_tuple() {
    let t = Transition { states: ["a".into(), "b".into()], label: None, actions: vec![] };
    assert_eq!(t.from(), "a");
    assert_eq!(t.to(), "b");
}
