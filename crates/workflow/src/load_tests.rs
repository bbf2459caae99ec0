use super::*;
use std::fs;
use tempfile::tempdir;

const BASE: &str = r#"
name: deploy
steps:
  - states: ["0", "end"]
    label: finish
    actions:
      - actor: this
        method: doNothing
        arguments: []
"#;

#[test]
fn loads_plain_yaml_document() {
    let dir = tempdir().expect("tempdir");
    let path = dir.path().join("deploy.yaml");
    fs::write(&path, BASE).expect("write");

    let doc = load_workflow(&path, None).expect("load");
    assert_eq!(doc.name, "deploy");
    assert_eq!(doc.transitions.len(), 1);
}

#[test]
fn loads_json_document_by_extension() {
    let dir = tempdir().expect("tempdir");
    let path = dir.path().join("deploy.json");
    let json = r#"{"name": "deploy", "steps": []}"#;
    fs::write(&path, json).expect("write");

    let doc = load_workflow(&path, None).expect("load");
    assert_eq!(doc.name, "deploy");
    assert!(doc.transitions.is_empty());
}

#[test]
fn overlay_replaces_transitions_wholesale() {
    let dir = tempdir().expect("tempdir");
    let base_path = dir.path().join("deploy.yaml");
    fs::write(&base_path, BASE).expect("write base");

    let overlay_dir = dir.path().join("overlays");
    fs::create_dir(&overlay_dir).expect("mkdir");
    let overlay_text = r#"
name: deploy
steps:
  - states: ["0", "1"]
    label: overridden
    actions: []
  - states: ["1", "end"]
    actions: []
"#;
    fs::write(overlay_dir.join("deploy.yaml"), overlay_text).expect("write overlay");

    let doc = load_workflow(&base_path, Some(&overlay_dir)).expect("load");
    assert_eq!(doc.transitions.len(), 2);
    assert_eq!(doc.transitions[0].label.as_deref(), Some("overridden"));
}

#[test]
fn missing_overlay_falls_back_to_base() {
    let dir = tempdir().expect("tempdir");
    let base_path = dir.path().join("deploy.yaml");
    fs::write(&base_path, BASE).expect("write base");

    let overlay_dir = dir.path().join("overlays");
    fs::create_dir(&overlay_dir).expect("mkdir");

    let doc = load_workflow(&base_path, Some(&overlay_dir)).expect("load");
    assert_eq!(doc.transitions.len(), 1);
}

#[test]
fn malformed_yaml_is_a_config_error() {
    let dir = tempdir().expect("tempdir");
    let path = dir.path().join("bad.yaml");
    fs::write(&path, "name: [unterminated").expect("write");

    let err = load_workflow(&path, None).unwrap_err();
    assert!(matches!(err, ConfigError::WorkflowParse(_)));
}
