// SPDX-License-Identifier: MIT OR Apache-2.0

//! INI-like inventory format (spec §6 "Inventory (INI-like)").
//!
//! ```text
//! [web]
//! host1 actoriac_port=2222
//! host2
//!
//! [web:vars]
//! actoriac_user=deploy
//!
//! [all:vars]
//! actoriac_user=root
//! ```
//!
//! `:children` sections and bracket-range hostnames (`host[1:3]`) are not
//! supported; lines using them are skipped with a `tracing::warn!`, not a
//! hard parse error, so a document written for a richer inventory tool
//! still loads with reduced scope.

use std::collections::HashMap;

use actoriac_core::{ConfigError, Inventory};

#[derive(Debug, PartialEq)]
enum Section {
    Group(String),
    GroupVars(String),
    GlobalVars,
}

fn parse_section_header(line: &str) -> Option<Section> {
    let inner = line.strip_prefix('[')?.strip_suffix(']')?;
    if inner.ends_with(":children") {
        None
    } else if inner == "all:vars" {
        Some(Section::GlobalVars)
    } else if let Some(name) = inner.strip_suffix(":vars") {
        Some(Section::GroupVars(name.to_string()))
    } else {
        Some(Section::Group(inner.to_string()))
    }
}

/// Split `key=value key2=value2` tokens from a line's tail, tolerating
/// values containing `=` (split only on the first `=` per token).
fn parse_kv_tokens(rest: &str) -> HashMap<String, String> {
    let mut vars = HashMap::new();
    for token in rest.split_whitespace() {
        if let Some((k, v)) = token.split_once('=') {
            vars.insert(k.to_string(), v.trim_matches('"').to_string());
        }
    }
    vars
}

pub fn parse_inventory(text: &str) -> Result<Inventory, ConfigError> {
    let mut inventory = Inventory::new();
    let mut section: Option<Section> = None;

    for (lineno, raw) in text.lines().enumerate() {
        let line = raw.trim();
        if line.is_empty() || line.starts_with('#') || line.starts_with(';') {
            continue;
        }

        if line.starts_with('[') {
            match parse_section_header(line) {
                Some(s) => {
                    if let Section::Group(name) = &s {
                        inventory.groups.entry(name.clone()).or_default();
                    }
                    section = Some(s);
                }
                None => {
                    tracing::warn!(line = lineno + 1, %line, "unsupported `:children` section, skipping");
                    section = None;
                }
            }
            continue;
        }

        let Some(section) = &section else {
            return Err(ConfigError::InventoryParse(format!(
                "line {}: host/var entry outside any [section]",
                lineno + 1
            )));
        };

        if line.contains('[') && line.contains(':') && line.contains(']') {
            tracing::warn!(line = lineno + 1, %line, "bracket host ranges are not supported, skipping");
            continue;
        }

        match section {
            Section::Group(name) => {
                let (host, rest) = line.split_once(char::is_whitespace).unwrap_or((line, ""));
                inventory.groups.entry(name.clone()).or_default().push(host.to_string());
                let vars = parse_kv_tokens(rest);
                if !vars.is_empty() {
                    inventory.host_vars.entry(host.to_string()).or_default().extend(vars);
                }
            }
            Section::GroupVars(name) => {
                let vars = parse_kv_tokens(line);
                inventory.group_vars.entry(name.clone()).or_default().extend(vars);
            }
            Section::GlobalVars => {
                inventory.global_vars.extend(parse_kv_tokens(line));
            }
        }
    }

    Ok(inventory)
}

#[cfg(test)]
#[path = "inventory_parse_tests.rs"]
mod tests;
