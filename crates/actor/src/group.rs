// SPDX-License-Identifier: MIT OR Apache-2.0

//! Group actor: the coordinator binding (spec §4.8, C10) plus the fan-out
//! dispatcher (spec §4.4, C8).
//!
//! Unlike a node actor, the group actor has exactly one caller — the CLI
//! driving the main workflow — so it carries no mailbox of its own (spec
//! §4.3: ordering only matters under concurrent senders, and there are
//! none here). Its children, one per host, are real mailbox-backed
//! [`NodeActorHandle`]s since `apply` dispatches to them concurrently.

use std::path::PathBuf;
use std::sync::Arc;

use async_trait::async_trait;
use indexmap::IndexMap;
use serde_json::Value;
use tokio::task::JoinSet;

use actoriac_core::{
    ActionResult, Clock, Host, IacError, Inventory, InternalError, LogLevel, SessionId,
    SessionStatus, SystemClock,
};
use actoriac_exec::{CommandExecutor, LocalExecutor, SshExecutor};
use actoriac_store::SessionStore;
use actoriac_workflow::{ActionDispatcher, ActionSpec, WorkflowDocument, WorkflowInterpreter};

use crate::node::{spawn_node_actor, NodeActorHandle, NodeBinding};
use crate::output::{format_summary_table, summarize_by_label, OutputKind, OutputMultiplexer};
use crate::pattern;

enum Format {
    Json,
    Yaml,
}

fn describe_value(v: &Value) -> String {
    match v {
        Value::String(s) => s.clone(),
        other => other.to_string(),
    }
}

fn executor_for(host: &Host) -> Arc<dyn CommandExecutor> {
    if host.is_local() {
        Arc::new(LocalExecutor)
    } else {
        Arc::new(SshExecutor::new(host.clone()))
    }
}

/// Tally kept by the last `apply` call (spec §4.4: "thread-safe counters
/// (successCount, failures map)"), queryable through `hasAccumulator` /
/// `getAccumulatorSummary` (spec §4.8).
#[derive(Debug, Clone, Default)]
struct ApplyTally {
    success_count: usize,
    failures: IndexMap<String, String>,
}

impl ApplyTally {
    fn summary(&self) -> String {
        if self.failures.is_empty() {
            format!("success={}, failures=none", self.success_count)
        } else {
            let detail: Vec<String> = self.failures.iter().map(|(a, m)| format!("{a}: {m}")).collect();
            format!("success={}, failures={{{}}}", self.success_count, detail.join(", "))
        }
    }
}

/// The group-facing action set (spec §4.8), the fan-out dispatcher (spec
/// §4.4), and the group's own workflow interpreter so the main workflow
/// runs the same `runUntilEnd`/`runWorkflow`/`call` primitives as a node.
pub struct GroupBinding<C: Clock = SystemClock> {
    children: IndexMap<String, NodeActorHandle>,
    inventory: Option<Inventory>,
    limit_hosts: Option<Vec<String>>,
    store: SessionStore,
    output: Arc<OutputMultiplexer>,
    session_id: SessionId,
    workflow_base_dir: PathBuf,
    overlay_dir: Option<PathBuf>,
    interpreter: WorkflowInterpreter,
    clock: C,
    last_apply: Option<ApplyTally>,
}

impl<C: Clock> GroupBinding<C> {
    #[allow(clippy::too_many_arguments)]
    pub fn new(
        inventory: Option<Inventory>,
        limit_hosts: Option<Vec<String>>,
        store: SessionStore,
        output: Arc<OutputMultiplexer>,
        session_id: SessionId,
        workflow_base_dir: PathBuf,
        overlay_dir: Option<PathBuf>,
        document: WorkflowDocument,
        clock: C,
    ) -> Self {
        GroupBinding {
            children: IndexMap::new(),
            inventory,
            limit_hosts,
            store,
            output,
            session_id,
            workflow_base_dir,
            overlay_dir,
            interpreter: WorkflowInterpreter::new(document),
            clock,
            last_apply: None,
        }
    }

    pub fn interpreter(&self) -> &WorkflowInterpreter {
        &self.interpreter
    }

    /// Ordered child actor names (spec §4.3 `getNamesOfChildren`).
    pub fn child_names(&self) -> Vec<&str> {
        self.children.keys().map(String::as_str).collect()
    }
}

impl<C: Clock + 'static> GroupBinding<C> {
    async fn run_action(&mut self, method: &str, args: &[Value]) -> ActionResult {
        match method {
            "hasInventory" => ActionResult::ok(self.inventory.is_some().to_string()),
            "createNodeActors" => self.create_node_actors(args).await,
            "apply" => self.apply(args).await,
            "executeCommandOnAllNodes" => self.execute_command_on_all_nodes(args).await,
            "hasAccumulator" => ActionResult::ok(self.last_apply.is_some().to_string()),
            "getAccumulatorSummary" => match &self.last_apply {
                Some(tally) => ActionResult::ok(tally.summary()),
                None => ActionResult::fail("no apply has run yet"),
            },
            "printSessionSummary" => self.print_session_summary(),
            "getSessionId" => ActionResult::ok(self.session_id.to_string()),
            "getWorkflowPath" => ActionResult::ok(self.workflow_base_dir.display().to_string()),
            "printJson" => self.print_subtree(args, Format::Json),
            "printYaml" => self.print_subtree(args, Format::Yaml),
            "sleep" => {
                let millis = args.first().and_then(Value::as_u64).unwrap_or(0);
                tokio::time::sleep(std::time::Duration::from_millis(millis)).await;
                ActionResult::ok(format!("slept {millis}ms"))
            }
            "print" => {
                let text = args.first().map(describe_value).unwrap_or_default();
                self.output.push("group", OutputKind::Info, text.clone());
                ActionResult::ok(text)
            }
            "doNothing" => ActionResult::ok(args.first().map(describe_value).unwrap_or_default()),
            "reset" => {
                self.interpreter.reset();
                ActionResult::ok("")
            }
            "runUntilEnd" => self.run_until_end(args).await,
            "runWorkflow" => self.run_workflow(args).await,
            "call" => self.call(args).await,
            other => ActionResult::fail(format!("unknown action: {other}")),
        }
    }

    /// `createNodeActors(groupName)` (spec §4.8): `"local"` bypasses the
    /// inventory entirely and creates one localhost child; otherwise hosts
    /// come from the named inventory group, filtered by `--limit` if set.
    async fn create_node_actors(&mut self, args: &[Value]) -> ActionResult {
        let Some(group_name) = args.first().and_then(Value::as_str) else {
            return ActionResult::fail("missing group name argument");
        };

        let hostnames: Vec<String> = if group_name == "local" {
            vec!["local".to_string()]
        } else {
            let Some(inventory) = &self.inventory else {
                return ActionResult::fail("no inventory configured");
            };
            match inventory.hosts_in(Some(group_name)) {
                Ok(hosts) => hosts,
                Err(e) => return ActionResult::fail(e.to_string()),
            }
        };

        let limited: Vec<String> = match &self.limit_hosts {
            Some(limit) => hostnames.into_iter().filter(|h| limit.contains(h)).collect(),
            None => hostnames,
        };

        let mut created = 0usize;
        for hostname in &limited {
            let host = if hostname == "local" {
                Host::local("local")
            } else {
                #[allow(clippy::expect_used)]
                self.inventory.as_ref().expect("checked above").build_host(hostname)
            };
            let name = host.actor_name();
            if self.children.contains_key(&name) {
                return ActionResult::fail(InternalError::DuplicateChild("group".into(), name).to_string());
            }

            let executor = executor_for(&host);
            let node_doc = self.interpreter.document().clone();
            let binding = NodeBinding::new(
                &host,
                executor,
                self.store.clone(),
                self.output.clone(),
                self.session_id,
                self.workflow_base_dir.clone(),
                self.overlay_dir.clone(),
                node_doc,
                self.clock.clone(),
            );
            let handle = spawn_node_actor(binding);
            self.children.insert(name, handle);
            created += 1;
        }

        ActionResult::ok(format!("created {created} node actor(s)"))
    }

    /// `apply(actionDef)` (spec §4.4): fan out `method(arguments)` to every
    /// child whose name matches `actor` (a wildcard pattern), in parallel,
    /// aggregating successes/failures. `actionDef` reuses the workflow
    /// document's own `ActionSpec` shape.
    async fn apply(&mut self, args: &[Value]) -> ActionResult {
        let Some(spec) = args.first().cloned().and_then(|v| serde_json::from_value::<ActionSpec>(v).ok()) else {
            return ActionResult::fail("apply requires an {actor, method, arguments} argument");
        };

        let matched: Vec<NodeActorHandle> = self
            .children
            .iter()
            .filter(|(name, _)| pattern::matches(&spec.actor, name.as_str()))
            .map(|(_, handle)| handle.clone())
            .collect();

        if matched.is_empty() {
            return ActionResult::fail(format!("No actors matched pattern: {}", spec.actor));
        }

        let mut tasks = JoinSet::new();
        for handle in matched {
            let method = spec.method.clone();
            let arguments = spec.arguments.clone();
            tasks.spawn(async move {
                let result = handle.dispatch(&method, &arguments).await;
                (handle.name().to_string(), result)
            });
        }

        let mut tally = ApplyTally::default();
        while let Some(joined) = tasks.join_next().await {
            let (actor_name, result) = match joined {
                Ok(pair) => pair,
                Err(e) => (String::from("<panicked>"), ActionResult::fail(e.to_string())),
            };
            let now = self.clock.epoch_ms();
            if result.success {
                tally.success_count += 1;
                let _ = self.store.mark_node_success(self.session_id, &actor_name, None, now);
            } else {
                tally.failures.insert(actor_name.clone(), result.result.clone());
                let _ = self.store.mark_node_failed(self.session_id, &actor_name, Some(result.result.clone()), now);
            }
        }

        let message = if tally.failures.is_empty() {
            format!("Applied to {} actors", tally.success_count)
        } else {
            let detail: Vec<String> =
                tally.failures.iter().map(|(a, m)| format!("{a}: {}", m.lines().next().unwrap_or(""))).collect();
            format!("{} succeeded, {} failed: {}", tally.success_count, tally.failures.len(), detail.join("; "))
        };
        let success = tally.failures.is_empty();
        self.last_apply = Some(tally);
        ActionResult { success, result: message }
    }

    async fn execute_command_on_all_nodes(&mut self, args: &[Value]) -> ActionResult {
        let Some(command) = args.first().and_then(Value::as_str) else {
            return ActionResult::fail("missing command argument");
        };
        let spec = ActionSpec {
            actor: "node-*".to_string(),
            method: "executeCommand".to_string(),
            arguments: vec![Value::String(command.to_string())],
        };
        #[allow(clippy::expect_used)]
        let value = serde_json::to_value(&spec).expect("ActionSpec always serialises");
        self.apply(&[value]).await
    }

    /// `printSessionSummary` (spec §4.8): DEBUG-or-above entries for this
    /// session, grouped by label, counted by `[OK]`/`[WARN]`/`[ERROR]`/
    /// `[INFO]` marker, rendered as a fixed-width table.
    fn print_session_summary(&mut self) -> ActionResult {
        let entries = self.store.get_logs_by_level(self.session_id, LogLevel::Debug);
        let grouped = summarize_by_label(&entries);
        let table = format_summary_table(&grouped);
        for line in table.lines() {
            self.output.push("group", OutputKind::Info, line);
        }
        ActionResult::ok(table)
    }

    fn print_subtree(&mut self, args: &[Value], format: Format) -> ActionResult {
        let path = args.first().and_then(Value::as_str).unwrap_or("");
        let Some(subtree) = self.interpreter.state().subtree(path) else {
            return ActionResult::fail(format!("no such path in JSON state: {path}"));
        };
        let rendered = match format {
            Format::Json => serde_json::to_string_pretty(subtree).unwrap_or_default(),
            Format::Yaml => serde_yaml::to_string(subtree).unwrap_or_default(),
        };
        for line in rendered.lines() {
            self.output.push("group", OutputKind::Info, line);
        }
        ActionResult::ok(rendered)
    }

    /// Runs the interpreter's own workflow to completion, swapping it out
    /// for the duration so `self` can still be borrowed as the dispatcher.
    async fn run_interpreter_to_end(&mut self) -> Result<ActionResult, IacError> {
        let placeholder = WorkflowDocument { name: String::new(), transitions: Vec::new() };
        let mut interp = std::mem::replace(&mut self.interpreter, WorkflowInterpreter::new(placeholder));
        let result = interp.run_until_end(self).await;
        self.interpreter = interp;
        result
    }

    async fn run_until_end(&mut self, args: &[Value]) -> ActionResult {
        if let Some(max) = args.first().and_then(Value::as_u64) {
            self.interpreter.set_max_iterations(max as usize);
        }
        self.run_interpreter_to_end().await.unwrap_or_else(|e| ActionResult::fail(e.to_string()))
    }

    async fn run_workflow(&mut self, args: &[Value]) -> ActionResult {
        let Some(path) = args.first().and_then(Value::as_str) else {
            return ActionResult::fail("missing path argument");
        };
        let full_path = self.workflow_base_dir.join(path);
        let doc = match actoriac_workflow::load_workflow(&full_path, self.overlay_dir.as_deref()) {
            Ok(d) => d,
            Err(e) => return ActionResult::fail(e.to_string()),
        };
        if let Some(max) = args.get(1).and_then(Value::as_u64) {
            self.interpreter.set_max_iterations(max as usize);
        }
        let placeholder = WorkflowDocument { name: String::new(), transitions: Vec::new() };
        let mut interp = std::mem::replace(&mut self.interpreter, WorkflowInterpreter::new(placeholder));
        let result = interp.run_workflow(self, doc).await;
        self.interpreter = interp;
        result.unwrap_or_else(|e| ActionResult::fail(e.to_string()))
    }

    async fn call(&mut self, args: &[Value]) -> ActionResult {
        let Some(path) = args.first().and_then(Value::as_str) else {
            return ActionResult::fail("missing path argument");
        };
        let full_path = self.workflow_base_dir.join(path);
        let doc = match actoriac_workflow::load_workflow(&full_path, self.overlay_dir.as_deref()) {
            Ok(d) => d,
            Err(e) => return ActionResult::fail(e.to_string()),
        };
        let mut child = WorkflowInterpreter::new(doc);
        let result = child.run_until_end(self).await;
        result.unwrap_or_else(|e| ActionResult::fail(e.to_string()))
    }

    /// Runs the group's main workflow to completion and marks the session
    /// COMPLETED/FAILED accordingly, matching the CLI's exit-code contract
    /// (spec §6/§7). Completion is driven by whether the interpreter reached
    /// a stable stopping point at all, not by the last action's own outcome —
    /// a workflow whose final action fails still finishes COMPLETED.
    pub async fn run_main_workflow(&mut self) -> (ActionResult, SessionStatus) {
        let (result, status) = match self.run_interpreter_to_end().await {
            Ok(result) => (result, SessionStatus::Completed),
            Err(e) => (ActionResult::fail(e.to_string()), SessionStatus::Failed),
        };
        let _ = self.store.end_session(self.session_id, status, self.clock.epoch_ms());
        (result, status)
    }
}

#[async_trait]
impl<C: Clock + 'static> ActionDispatcher for GroupBinding<C> {
    async fn dispatch(&mut self, actor: &str, method: &str, arguments: &[Value]) -> ActionResult {
        if actor == "this" {
            return self.run_action(method, arguments).await;
        }
        let Some(handle) = self.children.get(actor).cloned() else {
            return ActionResult::fail(format!("unknown actor: {actor}"));
        };
        handle.dispatch(method, arguments).await
    }

    async fn on_enter_transition(&mut self, label: Option<&str>) {
        if let Some(label) = label {
            let _ = self.store.log(
                self.session_id,
                "group",
                Some(label.to_string()),
                LogLevel::Info,
                format!("entering transition: {label}"),
                self.clock.epoch_ms(),
            );
        }
    }
}

#[cfg(test)]
#[path = "group_tests.rs"]
mod tests;
