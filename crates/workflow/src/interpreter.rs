// SPDX-License-Identifier: MIT OR Apache-2.0

//! The workflow interpreter (spec §3 "Workflow", §4.5 "Workflow
//! Interpreter", C7).
//!
//! This crate never talks to actors directly — [`ActionDispatcher`] is the
//! seam the `actoriac-actor` crate implements, which keeps `actoriac-actor`
//! depending on `actoriac-workflow` rather than the reverse (spec §9
//! "composition over inheritance").

use async_trait::async_trait;
use serde_json::Value;

use actoriac_core::{ActionResult, ConfigError, IacError, JsonState};

use crate::document::{ActionSpec, Transition, WorkflowDocument};

/// Bound on transitions fired by a single `run_until_end` before it is
/// treated as non-terminating (spec §9 Open Question iii, resolved as a
/// documented default rather than an unbounded loop).
pub const DEFAULT_MAX_ITERATIONS: usize = 10_000;

/// The seam between a workflow document and whatever can actually run an
/// action (an actor tree, a test double). Implementors own the identity
/// of `"this"`.
#[async_trait]
pub trait ActionDispatcher: Send {
    async fn dispatch(&mut self, actor: &str, method: &str, arguments: &[Value]) -> ActionResult;

    /// Called before a transition's actions run, with its `label` if any.
    /// Default is a no-op; an actor-backed dispatcher uses this to log the
    /// step boundary (spec §4.7 session logging).
    async fn on_enter_transition(&mut self, _label: Option<&str>) {}
}

/// Recursively expand `${...}` placeholders through a JSON value (spec
/// §4.6): strings are interpolated in place, arrays/objects recurse
/// element-wise, other scalars pass through unchanged.
pub fn substitute_value(value: &Value, state: &JsonState, last_result: Option<&str>) -> Value {
    match value {
        Value::String(s) => Value::String(actoriac_core::template::interpolate(s, state, last_result)),
        Value::Array(items) => {
            Value::Array(items.iter().map(|v| substitute_value(v, state, last_result)).collect())
        }
        Value::Object(map) => Value::Object(
            map.iter().map(|(k, v)| (k.clone(), substitute_value(v, state, last_result))).collect(),
        ),
        other => other.clone(),
    }
}

/// Owns one workflow document's run: current state, the shared JSON state
/// tree, and the scratch `${result}` value (spec §4.6: "not stored in the
/// tree; overwritten after every action").
pub struct WorkflowInterpreter {
    document: WorkflowDocument,
    current_state: String,
    max_iterations: usize,
    state: JsonState,
    last_result: Option<String>,
}

impl WorkflowInterpreter {
    pub fn new(document: WorkflowDocument) -> Self {
        Self::with_max_iterations(document, DEFAULT_MAX_ITERATIONS)
    }

    pub fn with_max_iterations(document: WorkflowDocument, max_iterations: usize) -> Self {
        WorkflowInterpreter {
            document,
            current_state: WorkflowDocument::INITIAL_STATE.to_string(),
            max_iterations,
            state: JsonState::new(),
            last_result: None,
        }
    }

    pub fn document(&self) -> &WorkflowDocument {
        &self.document
    }

    pub fn current_state(&self) -> &str {
        &self.current_state
    }

    pub fn state(&self) -> &JsonState {
        &self.state
    }

    pub fn state_mut(&mut self) -> &mut JsonState {
        &mut self.state
    }

    pub fn last_result(&self) -> Option<&str> {
        self.last_result.as_deref()
    }

    /// Override the iteration bound for a single `runUntilEnd` call (spec
    /// §4.7: `runUntilEnd(max?)` takes an optional override).
    pub fn set_max_iterations(&mut self, max: usize) {
        self.max_iterations = max;
    }

    /// Rewind to the initial state without touching the JSON state tree
    /// (the `reset` action, spec §4.7, only resets the state *machine*;
    /// clearing the tree is the separate `clearJson` action).
    pub fn reset(&mut self) {
        self.current_state = WorkflowDocument::INITIAL_STATE.to_string();
        self.last_result = None;
    }

    async fn run_action<D: ActionDispatcher>(&mut self, dispatcher: &mut D, action: &ActionSpec) -> ActionResult {
        let actor = actoriac_core::template::interpolate(&action.actor, &self.state, self.last_result.as_deref());
        let arguments: Vec<Value> =
            action.arguments.iter().map(|v| substitute_value(v, &self.state, self.last_result.as_deref())).collect();
        let result = dispatcher.dispatch(&actor, &action.method, &arguments).await;
        self.last_result = Some(result.result.clone());
        result
    }

    /// Try one candidate transition: when it is one of several sharing a
    /// `from`, its first action acts as a guard and a failure skips it in
    /// favor of the next candidate (spec §9 Open Question i, resolved as
    /// first-match-success; spec §3: guard selection only applies when
    /// there is something to select *between*). With a single outgoing
    /// transition there is no alternative to fall through to, so it is
    /// always taken and every one of its actions runs regardless of the
    /// first action's result.
    async fn try_transition<D: ActionDispatcher>(
        &mut self,
        dispatcher: &mut D,
        transition: &Transition,
        is_sole_candidate: bool,
    ) -> Option<ActionResult> {
        let mut actions = transition.actions.iter();
        let guard_result = match actions.next() {
            Some(first) => {
                let result = self.run_action(dispatcher, first).await;
                if !result.success && !is_sole_candidate {
                    return None;
                }
                result
            }
            None => ActionResult::ok(""),
        };

        let mut last = guard_result;
        for action in actions {
            last = self.run_action(dispatcher, action).await;
        }
        Some(last)
    }

    /// Run transitions until the terminal state is reached, bounded by
    /// `max_iterations` (spec §3).
    pub async fn run_until_end<D: ActionDispatcher>(&mut self, dispatcher: &mut D) -> Result<ActionResult, IacError> {
        let mut last = ActionResult::ok("");
        let mut iterations = 0usize;

        while self.current_state != WorkflowDocument::TERMINAL_STATE {
            iterations += 1;
            if iterations > self.max_iterations {
                return Err(ConfigError::NoTransition(
                    self.document.name.clone(),
                    format!("workflow did not terminate within {} iterations", self.max_iterations),
                )
                .into());
            }

            let candidates: Vec<Transition> =
                self.document.transitions_from(&self.current_state).into_iter().cloned().collect();
            if candidates.is_empty() {
                // spec §4.5 step 2: no transition from the current state is a
                // dead end, not a failure — return success with the state as-is.
                return Ok(last);
            }

            let is_sole_candidate = candidates.len() == 1;
            let mut fired = false;
            for transition in &candidates {
                dispatcher.on_enter_transition(transition.label.as_deref()).await;
                if let Some(result) = self.try_transition(dispatcher, transition, is_sole_candidate).await {
                    last = result;
                    self.current_state = transition.to().to_string();
                    fired = true;
                    break;
                }
            }

            if !fired {
                return Err(ConfigError::NoTransition(
                    self.document.name.clone(),
                    format!("no transition guard succeeded from state {:?}", self.current_state),
                )
                .into());
            }
        }

        Ok(last)
    }

    /// Run a sub-workflow to completion, sharing this interpreter's JSON
    /// state and `${result}` scratch value rather than starting either
    /// fresh (the `runWorkflow` action, spec §4.7).
    pub async fn run_workflow<D: ActionDispatcher>(
        &mut self,
        dispatcher: &mut D,
        document: WorkflowDocument,
    ) -> Result<ActionResult, IacError> {
        let mut sub = WorkflowInterpreter::with_max_iterations(document, self.max_iterations);
        sub.state = std::mem::take(&mut self.state);
        sub.last_result = self.last_result.take();

        let result = sub.run_until_end(dispatcher).await;

        self.state = sub.state;
        self.last_result = sub.last_result;
        result
    }
}

#[cfg(test)]
#[path = "interpreter_tests.rs"]
mod tests;
