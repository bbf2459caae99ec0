// SPDX-License-Identifier: MIT OR Apache-2.0

//! Node actor: the host-facing binding (spec §4.7, C9) plus the real
//! per-actor mailbox (C6) that gives it FIFO message ordering under
//! concurrent `apply` fan-out.

use std::path::PathBuf;
use std::sync::Arc;

use async_trait::async_trait;
use serde_json::Value;
use tokio::sync::{mpsc, oneshot};

use actoriac_core::{ActionResult, Clock, Host, LogLevel, SessionId, SystemClock, TransportError};
use actoriac_exec::{CommandExecutor, LineCallback, LineSource};
use actoriac_store::SessionStore;
use actoriac_workflow::{ActionDispatcher, WorkflowDocument, WorkflowInterpreter};

use crate::output::{OutputKind, OutputMultiplexer};

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

/// The node-facing action set (spec §4.7), plus the node's own workflow
/// interpreter so `runUntilEnd`/`runWorkflow`/`call` on "this" actor work
/// the same as on the group actor.
pub struct NodeBinding<C: Clock = SystemClock> {
    name: String,
    executor: Arc<dyn CommandExecutor>,
    store: SessionStore,
    output: Arc<OutputMultiplexer>,
    session_id: SessionId,
    workflow_base_dir: PathBuf,
    overlay_dir: Option<PathBuf>,
    interpreter: WorkflowInterpreter,
    clock: C,
    current_label: Option<String>,
}

impl<C: Clock> NodeBinding<C> {
    #[allow(clippy::too_many_arguments)]
    pub fn new(
        host: &Host,
        executor: Arc<dyn CommandExecutor>,
        store: SessionStore,
        output: Arc<OutputMultiplexer>,
        session_id: SessionId,
        workflow_base_dir: PathBuf,
        overlay_dir: Option<PathBuf>,
        document: WorkflowDocument,
        clock: C,
    ) -> Self {
        NodeBinding {
            name: host.actor_name(),
            executor,
            store,
            output,
            session_id,
            workflow_base_dir,
            overlay_dir,
            interpreter: WorkflowInterpreter::new(document),
            clock,
            current_label: None,
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn interpreter(&self) -> &WorkflowInterpreter {
        &self.interpreter
    }

    async fn run_action(&mut self, method: &str, args: &[Value]) -> ActionResult {
        match method {
            "executeCommand" => self.execute_reported(args, false).await,
            "executeCommandQuiet" => self.execute_quiet(args, false).await,
            "executeSudoCommand" => self.execute_reported(args, true).await,
            "executeSudoCommandQuiet" => self.execute_quiet(args, true).await,
            "sleep" => self.do_sleep(args).await,
            "print" => self.do_print(args),
            "doNothing" => ActionResult::ok(args.first().map(describe_value).unwrap_or_default()),
            "readJson" => self.read_structured(args, Format::Json).await,
            "readYaml" => self.read_structured(args, Format::Yaml).await,
            "readXml" => {
                ActionResult::fail("readXml is not implemented: XML parsing is an external collaborator")
            }
            "reset" => {
                self.interpreter.reset();
                ActionResult::ok("")
            }
            // No scripting host is part of the core; `execCode` reuses the
            // one "run some code" primitive the system has (spec §1 out
            // of scope: anything beyond plain SSH/local command exec).
            "execCode" => self.execute_quiet(args, false).await,
            "runUntilEnd" => self.run_until_end(args).await,
            "runWorkflow" => self.run_workflow(args).await,
            "call" => self.call(args).await,
            "printJson" => self.print_subtree(args, Format::Json),
            "printYaml" => self.print_subtree(args, Format::Yaml),
            other => ActionResult::fail(format!("unknown action: {other}")),
        }
    }

    fn line_callback(&self) -> LineCallback {
        let output = self.output.clone();
        let node = self.name.clone();
        Arc::new(move |src, line| {
            let kind = match src {
                LineSource::Stdout => OutputKind::Stdout,
                LineSource::Stderr => OutputKind::Stderr,
            };
            output.push(&node, kind, line);
        })
    }

    async fn execute_reported(&mut self, args: &[Value], sudo: bool) -> ActionResult {
        let Some(command) = args.first().and_then(Value::as_str) else {
            return ActionResult::fail("missing command argument");
        };
        let label = self.current_label.clone().unwrap_or_default();
        let cb = self.line_callback();
        let start = self.clock.now();

        let result =
            if sudo { self.executor.execute_sudo(command, Some(cb)).await } else { self.executor.execute(command, Some(cb)).await };
        let duration_ms = self.clock.now().duration_since(start).as_millis() as u64;

        match result {
            Ok(cmd_result) => {
                let action_name = if sudo { "executeSudoCommand" } else { "executeCommand" };
                let _ = self.store.log_action(
                    self.session_id,
                    &self.name,
                    label,
                    action_name,
                    cmd_result.exit_code,
                    duration_ms,
                    cmd_result.combined(),
                    self.clock.epoch_ms(),
                );
                cmd_result.into_action_result()
            }
            Err(TransportError::SudoPasswordMissing) => {
                self.output.push(&self.name, OutputKind::Info, "[FAIL] SUDO_PASSWORD not set");
                ActionResult::fail("SUDO_PASSWORD not set")
            }
            Err(e) => {
                self.output.push(&self.name, OutputKind::Info, format!("[FAIL] {e}"));
                ActionResult::fail(e.to_string())
            }
        }
    }

    async fn execute_quiet(&mut self, args: &[Value], sudo: bool) -> ActionResult {
        let Some(command) = args.first().and_then(Value::as_str) else {
            return ActionResult::fail("missing command argument");
        };
        let result = if sudo { self.executor.execute_sudo(command, None).await } else { self.executor.execute(command, None).await };
        match result {
            Ok(cmd_result) => ActionResult::ok(cmd_result.quiet_summary()),
            Err(TransportError::SudoPasswordMissing) => ActionResult::fail("SUDO_PASSWORD not set"),
            Err(e) => ActionResult::fail(e.to_string()),
        }
    }

    async fn do_sleep(&mut self, args: &[Value]) -> ActionResult {
        let millis = args.first().and_then(Value::as_u64).unwrap_or(0);
        tokio::time::sleep(std::time::Duration::from_millis(millis)).await;
        ActionResult::ok(format!("slept {millis}ms"))
    }

    fn do_print(&mut self, args: &[Value]) -> ActionResult {
        let text = args.first().map(describe_value).unwrap_or_default();
        self.output.push(&self.name, OutputKind::Info, text.clone());
        ActionResult::ok(text)
    }

    async fn read_structured(&mut self, args: &[Value], format: Format) -> ActionResult {
        let Some(path) = args.first().and_then(Value::as_str) else {
            return ActionResult::fail("missing path argument");
        };
        let text = match tokio::fs::read_to_string(path).await {
            Ok(t) => t,
            Err(e) => return ActionResult::fail(e.to_string()),
        };
        let parsed: Result<Value, String> = match format {
            Format::Json => serde_json::from_str(&text).map_err(|e| e.to_string()),
            Format::Yaml => serde_yaml::from_str(&text).map_err(|e| e.to_string()),
        };
        match parsed {
            Ok(value) => {
                let rendered = value.to_string();
                self.interpreter.state_mut().put("data", value);
                ActionResult::ok(rendered)
            }
            Err(e) => ActionResult::fail(e),
        }
    }

    async fn run_until_end(&mut self, args: &[Value]) -> ActionResult {
        if let Some(max) = args.first().and_then(Value::as_u64) {
            self.interpreter.set_max_iterations(max as usize);
        }
        let placeholder = WorkflowDocument { name: String::new(), transitions: Vec::new() };
        let mut interp = std::mem::replace(&mut self.interpreter, WorkflowInterpreter::new(placeholder));
        let result = interp.run_until_end(self).await;
        self.interpreter = interp;
        result.unwrap_or_else(|e| ActionResult::fail(e.to_string()))
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

    /// `call(path)`: unlike `runWorkflow`, the sub-workflow gets a fresh,
    /// isolated JSON state rather than sharing the caller's (spec §4.5).
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
            self.output.push(&self.name, OutputKind::Info, line);
        }
        ActionResult::ok(rendered)
    }
}

#[async_trait]
impl<C: Clock + 'static> ActionDispatcher for NodeBinding<C> {
    async fn dispatch(&mut self, actor: &str, method: &str, arguments: &[Value]) -> ActionResult {
        if actor != "this" {
            return ActionResult::fail(format!("unknown actor: {actor}"));
        }
        self.run_action(method, arguments).await
    }

    async fn on_enter_transition(&mut self, label: Option<&str>) {
        self.current_label = label.map(str::to_string);
        if let Some(label) = label {
            let _ = self.store.log(
                self.session_id,
                &self.name,
                Some(label.to_string()),
                LogLevel::Info,
                format!("entering transition: {label}"),
                self.clock.epoch_ms(),
            );
        }
    }
}

enum NodeCommand {
    Dispatch { method: String, arguments: Vec<Value>, reply: oneshot::Sender<ActionResult> },
}

/// A handle to a running node actor's mailbox (spec §4.3 C6): messages
/// sent through this handle are processed one at a time, in send order,
/// by the single task that owns the [`NodeBinding`].
#[derive(Clone)]
pub struct NodeActorHandle {
    name: String,
    tx: mpsc::UnboundedSender<NodeCommand>,
}

impl NodeActorHandle {
    pub fn name(&self) -> &str {
        &self.name
    }

    /// `ask(actor, method, arguments)`: waits for the actor's mailbox to
    /// reach this message and run it to completion.
    pub async fn dispatch(&self, method: &str, arguments: &[Value]) -> ActionResult {
        let (reply, rx) = oneshot::channel();
        if self
            .tx
            .send(NodeCommand::Dispatch { method: method.to_string(), arguments: arguments.to_vec(), reply })
            .is_err()
        {
            return ActionResult::fail(format!("mailbox closed for actor {:?}", self.name));
        }
        rx.await.unwrap_or_else(|_| ActionResult::fail(format!("mailbox closed for actor {:?}", self.name)))
    }
}

/// Spawn the actor task owning `binding`'s mailbox.
pub fn spawn_node_actor<C: Clock + 'static>(binding: NodeBinding<C>) -> NodeActorHandle {
    let name = binding.name.clone();
    let (tx, mut rx) = mpsc::unbounded_channel::<NodeCommand>();

    tokio::spawn(async move {
        let mut binding = binding;
        while let Some(cmd) = rx.recv().await {
            match cmd {
                NodeCommand::Dispatch { method, arguments, reply } => {
                    let result = binding.dispatch("this", &method, &arguments).await;
                    let _ = reply.send(result);
                }
            }
        }
    });

    NodeActorHandle { name, tx }
}

#[cfg(test)]
#[path = "node_tests.rs"]
mod tests;
