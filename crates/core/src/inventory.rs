// SPDX-License-Identifier: MIT OR Apache-2.0

//! Inventory model (spec §3 "Inventory", §6 "Inventory (INI-like)").
//!
//! This module only holds the *model* and its variable-precedence rules.
//! Parsing the on-disk INI-like format lives in `actoriac-workflow`, which
//! is the crate that owns document loading for both inventories and
//! workflows (see `SPEC_FULL.md` §2).

use indexmap::IndexMap;
use std::collections::HashMap;

use crate::host::{Connection, Host};

/// `groups: map<groupName, ordered list<hostname>>` plus the three
/// variable scopes. `IndexMap` preserves insertion order so host
/// iteration (and therefore `apply`'s fan-out order within a host's own
/// bookkeeping) is deterministic.
#[derive(Debug, Clone, Default)]
pub struct Inventory {
    pub groups: IndexMap<String, Vec<String>>,
    pub global_vars: HashMap<String, String>,
    pub group_vars: HashMap<String, HashMap<String, String>>,
    pub host_vars: HashMap<String, HashMap<String, String>>,
}

/// Keys recognised in host/group/global variable blocks. Both an
/// `actoriac_*` and an `ansible_*` spelling are accepted; `actoriac_*`
/// takes precedence when both are present on the same scope.
const RECOGNISED_SUFFIXES: &[&str] = &["host", "user", "port", "connection"];

impl Inventory {
    pub fn new() -> Self {
        Self::default()
    }

    /// The group a host belongs to, if any (first match in insertion order).
    pub fn group_of(&self, hostname: &str) -> Option<&str> {
        self.groups
            .iter()
            .find(|(_, hosts)| hosts.iter().any(|h| h == hostname))
            .map(|(g, _)| g.as_str())
    }

    /// Effective variables for a host: `hostVars[host] ▷ groupVars[group]
    /// ▷ globalVars`, right-biased (host wins over group wins over
    /// global).
    pub fn effective_vars(&self, hostname: &str) -> HashMap<String, String> {
        let mut effective = self.global_vars.clone();
        if let Some(group) = self.group_of(hostname) {
            if let Some(vars) = self.group_vars.get(group) {
                effective.extend(vars.clone());
            }
        }
        if let Some(vars) = self.host_vars.get(hostname) {
            effective.extend(vars.clone());
        }
        effective
    }

    /// Resolve one recognised option key, preferring `actoriac_<suffix>`
    /// over `ansible_<suffix>`.
    fn recognised(vars: &HashMap<String, String>, suffix: &str) -> Option<String> {
        vars.get(&format!("actoriac_{suffix}"))
            .or_else(|| vars.get(&format!("ansible_{suffix}")))
            .cloned()
    }

    /// Build a `Host` for a named inventory entry, applying the merged
    /// variables. `"local"` is handled by callers before reaching here
    /// (spec §4.8: `createNodeActors("local")` bypasses inventory lookup
    /// entirely).
    pub fn build_host(&self, hostname: &str) -> Host {
        let vars = self.effective_vars(hostname);
        let address = Self::recognised(&vars, "host").unwrap_or_else(|| hostname.to_string());
        let is_local = Self::recognised(&vars, "connection").as_deref() == Some("local");

        let connection = if is_local {
            Connection::Local
        } else {
            let user = Self::recognised(&vars, "user").unwrap_or_else(|| "root".to_string());
            let port = Self::recognised(&vars, "port")
                .and_then(|p| p.parse::<u16>().ok())
                .unwrap_or(22);
            Connection::Ssh { user, port, password: None, proxy_jump: None }
        };

        Host { hostname: hostname.to_string(), address, connection }
    }

    /// Hosts named by a group, or all hosts across all groups if `group`
    /// is `None`. Preserves group-then-insertion order; duplicates across
    /// groups are not de-duplicated (callers rarely list a host twice).
    pub fn hosts_in(&self, group: Option<&str>) -> Result<Vec<String>, crate::ConfigError> {
        match group {
            Some(g) => self
                .groups
                .get(g)
                .cloned()
                .ok_or_else(|| crate::ConfigError::UnknownGroup(g.to_string())),
            None => Ok(self.groups.values().flatten().cloned().collect()),
        }
    }

    pub fn recognised_suffixes() -> &'static [&'static str] {
        RECOGNISED_SUFFIXES
    }
}

#[cfg(test)]
#[path = "inventory_tests.rs"]
mod tests;
