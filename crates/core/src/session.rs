// SPDX-License-Identifier: MIT OR Apache-2.0

//! Session, log entry, and node-result types (spec §3 "Session", §6
//! "Session store external form").

use serde::{Deserialize, Serialize};

crate::define_id! {
    /// Unique identifier for one execution of a main workflow.
    pub struct SessionId("ses-");
}

/// Ordered so `getLogsByLevel(minLevel)` can compare with `>=`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum LogLevel {
    Trace,
    Debug,
    Info,
    Warn,
    Error,
}

impl std::fmt::Display for LogLevel {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let s = match self {
            LogLevel::Trace => "TRACE",
            LogLevel::Debug => "DEBUG",
            LogLevel::Info => "INFO",
            LogLevel::Warn => "WARN",
            LogLevel::Error => "ERROR",
        };
        f.write_str(s)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum SessionStatus {
    Completed,
    Failed,
    Aborted,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum NodeStatus {
    Success,
    Failed,
}

/// Immutable header written once at `startSession`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SessionHeader {
    pub session_id: SessionId,
    pub workflow_name: String,
    pub overlay_name: Option<String>,
    pub inventory_name: Option<String>,
    pub node_count: Option<usize>,
    pub started_at_ms: u64,
    pub cwd: String,
    pub git_commit: Option<String>,
    pub git_branch: Option<String>,
    pub command_line: String,
    pub runner_version: String,
    pub runner_commit: Option<String>,
}

/// Mutable trailer written once at `endSession`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SessionTrailer {
    pub ended_at_ms: u64,
    pub status: SessionStatus,
}

/// Full session record: header, optional trailer (absent while running),
/// and the two append-only collections.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Session {
    pub header: SessionHeader,
    pub trailer: Option<SessionTrailer>,
    pub logs: Vec<LogEntry>,
    pub node_results: Vec<NodeResult>,
}

/// `{sessionId, nodeId, label?, level, actionName?, exitCode?, durationMs?,
/// message, timestamp}`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LogEntry {
    pub session_id: SessionId,
    pub node_id: String,
    pub label: Option<String>,
    pub level: LogLevel,
    pub action_name: Option<String>,
    pub exit_code: Option<i32>,
    pub duration_ms: Option<u64>,
    pub message: String,
    pub timestamp_ms: u64,
}

/// `{sessionId, nodeId, status, reason?}`. Multiple markers may exist for
/// the same `(sessionId, nodeId)`; the latest one wins for aggregation,
/// but all are persisted for audit (spec §4.2).
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct NodeResult {
    pub session_id: SessionId,
    pub node_id: String,
    pub status: NodeStatus,
    pub reason: Option<String>,
    pub updated_at_ms: u64,
}

/// Summary returned by `getSummary(sessionId)` (spec §4.2).
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SessionSummary {
    pub session_id: SessionId,
    pub node_count: usize,
    pub success_count: usize,
    pub failed_count: usize,
    pub status: Option<SessionStatus>,
}

#[cfg(test)]
#[path = "session_tests.rs"]
mod tests;
