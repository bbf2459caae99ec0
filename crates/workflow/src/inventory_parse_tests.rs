use super::*;

#[test]
fn parses_groups_and_inline_host_vars() {
    let text = "[web]\nhost1 actoriac_port=2222\nhost2\n";
    let inv = parse_inventory(text).expect("parse");
    assert_eq!(inv.groups.get("web").unwrap(), &vec!["host1".to_string(), "host2".to_string()]);
    assert_eq!(inv.host_vars.get("host1").unwrap().get("actoriac_port").unwrap(), "2222");
    assert!(!inv.host_vars.contains_key("host2"));
}

#[test]
fn parses_group_vars_section() {
    let text = "[web]\nhost1\n[web:vars]\nactoriac_user=deploy\n";
    let inv = parse_inventory(text).expect("parse");
    assert_eq!(inv.group_vars.get("web").unwrap().get("actoriac_user").unwrap(), "deploy");
}

#[test]
fn parses_all_vars_as_global() {
    let text = "[all:vars]\nactoriac_user=root\n[web]\nhost1\n";
    let inv = parse_inventory(text).expect("parse");
    assert_eq!(inv.global_vars.get("actoriac_user").unwrap(), "root");
}

#[test]
fn skips_children_sections_without_erroring() {
    let text = "[prod:children]\nweb\n[web]\nhost1\n";
    let inv = parse_inventory(text).expect("parse");
    assert!(inv.groups.contains_key("web"));
    assert!(!inv.groups.contains_key("prod"));
}

#[test]
fn skips_bracket_range_hosts() {
    let text = "[web]\nhost[1:3].example.com\nhost1\n";
    let inv = parse_inventory(text).expect("parse");
    assert_eq!(inv.groups.get("web").unwrap(), &vec!["host1".to_string()]);
}

#[test]
fn comments_and_blank_lines_are_ignored() {
    let text = "# a comment\n\n[web]\n; also a comment\nhost1\n";
    let inv = parse_inventory(text).expect("parse");
    assert_eq!(inv.groups.get("web").unwrap(), &vec!["host1".to_string()]);
}

#[test]
fn entry_before_any_section_is_an_error() {
    let text = "host1\n[web]\n";
    let err = parse_inventory(text).unwrap_err();
    assert!(matches!(err, ConfigError::InventoryParse(_)));
}
