use super::*;

fn sample() -> Inventory {
    let mut inv = Inventory::new();
    inv.groups.insert("web".to_string(), vec!["w1".to_string(), "w2".to_string()]);
    inv.global_vars.insert("actoriac_user".to_string(), "global_user".to_string());
    inv.group_vars.insert(
        "web".to_string(),
        HashMap::from([("actoriac_user".to_string(), "group_user".to_string())]),
    );
    inv.host_vars.insert(
        "w1".to_string(),
        HashMap::from([("actoriac_user".to_string(), "host_user".to_string())]),
    );
    inv
}

#[test]
fn host_vars_beat_group_vars_beat_global_vars() {
    let inv = sample();
    assert_eq!(inv.effective_vars("w1").get("actoriac_user"), Some(&"host_user".to_string()));
    assert_eq!(inv.effective_vars("w2").get("actoriac_user"), Some(&"group_user".to_string()));
    assert_eq!(inv.effective_vars("w3").get("actoriac_user"), None);
}

#[test]
fn actoriac_prefix_wins_over_ansible_prefix() {
    let mut inv = Inventory::new();
    inv.groups.insert("web".to_string(), vec!["w1".to_string()]);
    inv.host_vars.insert(
        "w1".to_string(),
        HashMap::from([
            ("actoriac_user".to_string(), "iac".to_string()),
            ("ansible_user".to_string(), "ans".to_string()),
        ]),
    );
    let host = inv.build_host("w1");
    match host.connection {
        Connection::Ssh { user, .. } => assert_eq!(user, "iac"),
        Connection::Local => panic!("expected ssh"),
    }
}

#[test]
fn ansible_prefix_used_when_actoriac_absent() {
    let mut inv = Inventory::new();
    inv.groups.insert("web".to_string(), vec!["w1".to_string()]);
    inv.host_vars.insert(
        "w1".to_string(),
        HashMap::from([("ansible_user".to_string(), "ans".to_string())]),
    );
    let host = inv.build_host("w1");
    match host.connection {
        Connection::Ssh { user, .. } => assert_eq!(user, "ans"),
        Connection::Local => panic!("expected ssh"),
    }
}

#[test]
fn connection_local_bypasses_ssh() {
    let mut inv = Inventory::new();
    inv.groups.insert("web".to_string(), vec!["w1".to_string()]);
    inv.host_vars.insert(
        "w1".to_string(),
        HashMap::from([("actoriac_connection".to_string(), "local".to_string())]),
    );
    assert!(inv.build_host("w1").is_local());
}

#[test]
fn hosts_in_unknown_group_is_config_error() {
    let inv = sample();
    assert!(inv.hosts_in(Some("missing")).is_err());
}

#[test]
fn hosts_in_none_flattens_all_groups() {
    let inv = sample();
    assert_eq!(inv.hosts_in(None).unwrap(), vec!["w1".to_string(), "w2".to_string()]);
}

#[test]
fn group_of_finds_membership() {
    let inv = sample();
    assert_eq!(inv.group_of("w1"), Some("web"));
    assert_eq!(inv.group_of("ghost"), None);
}
