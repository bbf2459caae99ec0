// SPDX-License-Identifier: MIT OR Apache-2.0

//! Workflow document model (spec §6 "Workflow document").

use serde::{Deserialize, Serialize};
use serde_json::Value;

/// An action as written in a workflow document, before `${...}`
/// substitution: `{actor, method, arguments}`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ActionSpec {
    /// A literal actor name, a wildcard pattern (only honoured by
    /// `apply`), or the literal `"this"` meaning the acting interpreter's
    /// own actor.
    pub actor: String,
    pub method: String,
    #[serde(default)]
    pub arguments: Vec<Value>,
}

/// One `from -> to` edge with its ordered action list.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Transition {
    pub states: [String; 2],
    #[serde(default)]
    pub label: Option<String>,
    #[serde(default)]
    pub actions: Vec<ActionSpec>,
}

impl Transition {
    pub fn from(&self) -> &str {
        &self.states[0]
    }

    pub fn to(&self) -> &str {
        &self.states[1]
    }
}

/// A named document with an ordered list of transitions (spec §3
/// "Workflow").
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct WorkflowDocument {
    pub name: String,
    #[serde(rename = "steps")]
    pub transitions: Vec<Transition>,
}

impl WorkflowDocument {
    /// The initial state is `"0"` unless a transition is tagged as the
    /// entry point by convention of being the first transition whose
    /// `from` has no incoming edge; spec §3 fixes it at the literal `"0"`.
    pub const INITIAL_STATE: &'static str = "0";

    pub const TERMINAL_STATE: &'static str = "end";

    /// All transitions whose `from` equals `state`, in document order —
    /// candidates for guard evaluation when more than one shares a
    /// `from` (spec §3, §9 Open Question i).
    pub fn transitions_from<'a>(&'a self, state: &str) -> Vec<&'a Transition> {
        self.transitions.iter().filter(|t| t.from() == state).collect()
    }
}

#[cfg(test)]
#[path = "document_tests.rs"]
mod tests;
