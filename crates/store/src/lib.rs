// SPDX-License-Identifier: MIT OR Apache-2.0

//! actoriac-store: the Session Log Store (spec §4.2).
//!
//! All writes are routed through a single dedicated OS thread draining an
//! `mpsc` channel — this is the "db-writer pool" of one worker referenced
//! by spec §4.3/§5, realized here as a plain thread since this crate has
//! no dependency on the actor kernel crate. Reads bypass the writer and
//! lock the shared in-memory index directly, which is safe because only
//! the writer thread ever mutates it (spec: "Reads are direct... they are
//! naturally concurrency-safe against the single writer").

mod error;
mod record;

use std::collections::HashMap;
use std::fs::{File, OpenOptions};
use std::io::{BufRead, BufReader, Write};
use std::path::{Path, PathBuf};
use std::sync::mpsc::{self, Sender};
use std::sync::{Arc, RwLock};

pub use error::StoreError;
use record::StoreRecord;

use actoriac_core::{
    LogEntry, LogLevel, NodeResult, NodeStatus, Session, SessionHeader, SessionId, SessionStatus,
    SessionSummary, SessionTrailer,
};

enum Command {
    Append(SessionId, StoreRecord),
    EndSession(SessionId, SessionStatus, u64),
    Sync(mpsc::Sender<()>),
}

/// A durable, queryable log of every session's messages and action
/// results (spec §4.2).
#[derive(Clone)]
pub struct SessionStore {
    dir: PathBuf,
    index: Arc<RwLock<HashMap<SessionId, Session>>>,
    tx: Sender<Command>,
}

impl SessionStore {
    /// Open (or create) a store rooted at `dir`, replaying every
    /// `*.jsonl`/`*.jsonl.zst` segment file found there to rebuild the
    /// in-memory index, then spawning the single writer thread.
    pub fn open(dir: impl AsRef<Path>) -> Result<Self, StoreError> {
        let dir = dir.as_ref().to_path_buf();
        std::fs::create_dir_all(&dir)?;

        let mut index = HashMap::new();
        if let Ok(entries) = std::fs::read_dir(&dir) {
            for entry in entries.flatten() {
                let path = entry.path();
                if path.extension().is_some_and(|e| e == "jsonl") || path_is_compressed_segment(&path) {
                    replay_segment(&path, &mut index)?;
                }
            }
        }

        let index = Arc::new(RwLock::new(index));
        let (tx, rx) = mpsc::channel::<Command>();
        let writer_dir = dir.clone();
        let writer_index = index.clone();
        std::thread::Builder::new()
            .name("actoriac-log-writer".into())
            .spawn(move || writer_loop(writer_dir, writer_index, rx))
            .map_err(StoreError::Io)?;

        Ok(SessionStore { dir, index, tx })
    }

    fn send(&self, cmd: Command) -> Result<(), StoreError> {
        self.tx.send(cmd).map_err(|_| StoreError::WriterGone)
    }

    /// Blocks until every command sent so far has been applied. Tests use
    /// this to make writer-thread effects observable deterministically.
    pub fn flush(&self) -> Result<(), StoreError> {
        let (ack_tx, ack_rx) = mpsc::channel();
        self.send(Command::Sync(ack_tx))?;
        ack_rx.recv().map_err(|_| StoreError::WriterGone)
    }

    pub fn start_session(
        &self,
        workflow_name: impl Into<String>,
        overlay_name: Option<String>,
        inventory_name: Option<String>,
        node_count: Option<usize>,
        cwd: impl Into<String>,
        command_line: impl Into<String>,
        started_at_ms: u64,
    ) -> Result<SessionId, StoreError> {
        let session_id = SessionId::new();
        let header = SessionHeader {
            session_id,
            workflow_name: workflow_name.into(),
            overlay_name,
            inventory_name,
            node_count,
            started_at_ms,
            cwd: cwd.into(),
            git_commit: None,
            git_branch: None,
            command_line: command_line.into(),
            runner_version: env!("CARGO_PKG_VERSION").to_string(),
            runner_commit: None,
        };
        self.send(Command::Append(session_id, StoreRecord::Header(header)))?;
        Ok(session_id)
    }

    /// `log()` uses the caller-supplied level verbatim (spec §4.2).
    #[allow(clippy::too_many_arguments)]
    pub fn log(
        &self,
        session_id: SessionId,
        node_id: impl Into<String>,
        label: Option<String>,
        level: LogLevel,
        message: impl Into<String>,
        timestamp_ms: u64,
    ) -> Result<(), StoreError> {
        let entry = LogEntry {
            session_id,
            node_id: node_id.into(),
            label,
            level,
            action_name: None,
            exit_code: None,
            duration_ms: None,
            message: message.into(),
            timestamp_ms,
        };
        self.send(Command::Append(session_id, StoreRecord::Log(entry)))
    }

    /// `logAction()`: level is derived from `exit_code` — `INFO` when
    /// zero, `ERROR` otherwise (spec §4.2).
    #[allow(clippy::too_many_arguments)]
    pub fn log_action(
        &self,
        session_id: SessionId,
        node_id: impl Into<String>,
        label: impl Into<String>,
        action_name: impl Into<String>,
        exit_code: i32,
        duration_ms: u64,
        output: impl Into<String>,
        timestamp_ms: u64,
    ) -> Result<(), StoreError> {
        let level = if exit_code == 0 { LogLevel::Info } else { LogLevel::Error };
        let entry = LogEntry {
            session_id,
            node_id: node_id.into(),
            label: Some(label.into()),
            level,
            action_name: Some(action_name.into()),
            exit_code: Some(exit_code),
            duration_ms: Some(duration_ms),
            message: output.into(),
            timestamp_ms,
        };
        self.send(Command::Append(session_id, StoreRecord::Log(entry)))
    }

    fn mark_node(
        &self,
        session_id: SessionId,
        node_id: impl Into<String>,
        status: NodeStatus,
        reason: Option<String>,
        updated_at_ms: u64,
    ) -> Result<(), StoreError> {
        let result = NodeResult { session_id, node_id: node_id.into(), status, reason, updated_at_ms };
        self.send(Command::Append(session_id, StoreRecord::NodeResult(result)))
    }

    pub fn mark_node_success(
        &self,
        session_id: SessionId,
        node_id: impl Into<String>,
        reason: Option<String>,
        updated_at_ms: u64,
    ) -> Result<(), StoreError> {
        self.mark_node(session_id, node_id, NodeStatus::Success, reason, updated_at_ms)
    }

    pub fn mark_node_failed(
        &self,
        session_id: SessionId,
        node_id: impl Into<String>,
        reason: Option<String>,
        updated_at_ms: u64,
    ) -> Result<(), StoreError> {
        self.mark_node(session_id, node_id, NodeStatus::Failed, reason, updated_at_ms)
    }

    pub fn end_session(&self, session_id: SessionId, status: SessionStatus, ended_at_ms: u64) -> Result<(), StoreError> {
        self.send(Command::EndSession(session_id, status, ended_at_ms))
    }

    // --- direct reads: bypass the writer thread entirely ---

    #[allow(clippy::expect_used)]
    pub fn get_logs_by_node(&self, session_id: SessionId, node_id: &str) -> Vec<LogEntry> {
        let index = self.index.read().expect("index lock poisoned");
        index
            .get(&session_id)
            .map(|s| s.logs.iter().filter(|l| l.node_id == node_id).cloned().collect())
            .unwrap_or_default()
    }

    #[allow(clippy::expect_used)]
    pub fn get_logs_by_level(&self, session_id: SessionId, min_level: LogLevel) -> Vec<LogEntry> {
        let index = self.index.read().expect("index lock poisoned");
        index
            .get(&session_id)
            .map(|s| s.logs.iter().filter(|l| l.level >= min_level).cloned().collect())
            .unwrap_or_default()
    }

    /// `nodeCount` is the number of distinct `nodeId`s in `nodeResults` if
    /// non-empty, else the session header's value (spec §4.2).
    #[allow(clippy::expect_used)]
    pub fn get_summary(&self, session_id: SessionId) -> Option<SessionSummary> {
        let index = self.index.read().expect("index lock poisoned");
        let session = index.get(&session_id)?;

        let mut latest: HashMap<&str, NodeStatus> = HashMap::new();
        for result in &session.node_results {
            latest.insert(result.node_id.as_str(), result.status);
        }

        let node_count = if latest.is_empty() {
            session.header.node_count.unwrap_or(0)
        } else {
            latest.len()
        };
        let success_count = latest.values().filter(|s| matches!(s, NodeStatus::Success)).count();
        let failed_count = latest.values().filter(|s| matches!(s, NodeStatus::Failed)).count();

        Some(SessionSummary {
            session_id,
            node_count,
            success_count,
            failed_count,
            status: session.trailer.as_ref().map(|t| t.status),
        })
    }

    #[allow(clippy::expect_used)]
    pub fn list_sessions(&self, limit: usize) -> Vec<SessionId> {
        let index = self.index.read().expect("index lock poisoned");
        let mut sessions: Vec<_> = index.values().collect();
        sessions.sort_by_key(|s| s.header.started_at_ms);
        sessions.into_iter().rev().take(limit).map(|s| s.header.session_id).collect()
    }

    pub fn get_latest_session_id(&self) -> Option<SessionId> {
        self.list_sessions(1).into_iter().next()
    }

    pub fn dir(&self) -> &Path {
        &self.dir
    }
}

/// Compress an ended session's `.jsonl` segment into `.jsonl.zst` and
/// remove the plain file (spec `SPEC_FULL.md` §4.2: "ended sessions are
/// compacted with zstd on `endSession`").
fn compact_segment(dir: &Path, session_id: SessionId) -> Result<(), StoreError> {
    let plain = segment_path(dir, session_id);
    if !plain.exists() {
        return Ok(());
    }
    let compressed = PathBuf::from(format!("{}.zst", plain.display()));
    let mut input = File::open(&plain)?;
    let output = File::create(&compressed)?;
    zstd::stream::copy_encode(&mut input, output, 0)?;
    drop(input);
    std::fs::remove_file(&plain)?;
    Ok(())
}

fn path_is_compressed_segment(path: &Path) -> bool {
    path.to_string_lossy().ends_with(".jsonl.zst")
}

fn segment_path(dir: &Path, session_id: SessionId) -> PathBuf {
    dir.join(format!("{}.jsonl", session_id.as_str()))
}

fn replay_segment(path: &Path, index: &mut HashMap<SessionId, Session>) -> Result<(), StoreError> {
    let raw: Box<dyn std::io::Read> = if path_is_compressed_segment(path) {
        Box::new(zstd::Decoder::new(File::open(path)?)?)
    } else {
        Box::new(File::open(path)?)
    };
    for line in BufReader::new(raw).lines() {
        let line = line?;
        if line.trim().is_empty() {
            continue;
        }
        let record: StoreRecord = serde_json::from_str(&line)?;
        apply_record(index, record);
    }
    Ok(())
}

fn apply_record(index: &mut HashMap<SessionId, Session>, record: StoreRecord) {
    match record {
        StoreRecord::Header(header) => {
            index.entry(header.session_id).or_insert_with(|| Session {
                header: header.clone(),
                trailer: None,
                logs: Vec::new(),
                node_results: Vec::new(),
            });
        }
        StoreRecord::Log(entry) => {
            if let Some(session) = index.get_mut(&entry.session_id) {
                session.logs.push(entry);
            }
        }
        StoreRecord::NodeResult(result) => {
            if let Some(session) = index.get_mut(&result.session_id) {
                session.node_results.push(result);
            }
        }
        StoreRecord::Trailer { session_id, trailer } => {
            if let Some(session) = index.get_mut(&session_id) {
                session.trailer = Some(trailer);
            }
        }
    }
}

/// The writer loop: the single thread allowed to append to segment files
/// or mutate the shared index (spec §4.2/§5).
fn writer_loop(dir: PathBuf, index: Arc<RwLock<HashMap<SessionId, Session>>>, rx: mpsc::Receiver<Command>) {
    let mut open_files: HashMap<SessionId, File> = HashMap::new();

    for cmd in rx {
        match cmd {
            Command::Append(session_id, record) => {
                if let Err(e) = append_and_index(&dir, &mut open_files, &index, session_id, record) {
                    tracing::error!(session = %session_id, error = %e, "session log write failed");
                }
            }
            Command::EndSession(session_id, status, ended_at_ms) => {
                let trailer = SessionTrailer { ended_at_ms, status };
                let record = StoreRecord::Trailer { session_id, trailer };
                if let Err(e) = append_and_index(&dir, &mut open_files, &index, session_id, record) {
                    tracing::error!(session = %session_id, error = %e, "session end write failed");
                }
                // Dropping the handle lets the OS flush before the plain
                // segment is compacted into `.jsonl.zst`.
                open_files.remove(&session_id);
                if let Err(e) = compact_segment(&dir, session_id) {
                    tracing::error!(session = %session_id, error = %e, "session log compaction failed");
                }
            }
            Command::Sync(ack) => {
                let _ = ack.send(());
            }
        }
    }
}

fn append_and_index(
    dir: &Path,
    open_files: &mut HashMap<SessionId, File>,
    index: &Arc<RwLock<HashMap<SessionId, Session>>>,
    session_id: SessionId,
    record: StoreRecord,
) -> Result<(), StoreError> {
    let file = match open_files.get_mut(&session_id) {
        Some(f) => f,
        None => {
            let file = OpenOptions::new().create(true).append(true).open(segment_path(dir, session_id))?;
            open_files.insert(session_id, file);
            #[allow(clippy::expect_used)]
            {
                open_files.get_mut(&session_id).expect("just inserted")
            }
        }
    };
    let mut line = serde_json::to_string(&record)?;
    line.push('\n');
    file.write_all(line.as_bytes())?;

    #[allow(clippy::expect_used)]
    let mut index = index.write().expect("index lock poisoned");
    apply_record(&mut index, record);
    Ok(())
}

#[cfg(test)]
#[path = "lib_tests.rs"]
mod tests;
