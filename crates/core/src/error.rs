// SPDX-License-Identifier: MIT OR Apache-2.0

//! Error taxonomy (spec §7).
//!
//! Every action returns an [`crate::ActionResult`] rather than unwinding —
//! these error types exist for the layers *around* action dispatch
//! (loading an inventory, resolving a workflow, kernel invariants) where a
//! typed `Result` is the right shape.

use thiserror::Error;

/// Unparseable inventory/workflow, unknown group, or an `apply` pattern
/// with no match.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("unknown group: {0}")]
    UnknownGroup(String),
    #[error("no hosts matched pattern: {0}")]
    NoMatch(String),
    #[error("failed to parse inventory: {0}")]
    InventoryParse(String),
    #[error("failed to parse workflow document: {0}")]
    WorkflowParse(String),
    #[error("workflow {0:?} has no transition for state {1:?}")]
    NoTransition(String, String),
}

/// SSH auth, connect, timeout, unknown host, or I/O interruption.
#[derive(Debug, Error)]
pub enum TransportError {
    #[error("authentication failed for {user}@{host}: {hint}")]
    AuthFailed { host: String, user: String, hint: String },
    #[error("connection refused or timed out: {0}")]
    ConnectFailed(String),
    #[error("unknown host: {0}")]
    UnknownHost(String),
    #[error("SUDO_PASSWORD not set")]
    SudoPasswordMissing,
    #[error("interrupted: {0}")]
    Interrupted(String),
    #[error("ssh failure: {0}")]
    Generic(String),
}

/// A referenced `${var}` is missing from JSON state.
#[derive(Debug, Error)]
pub enum StateError {
    #[error("no such path in JSON state: {0}")]
    MissingPath(String),
}

/// A kernel invariant was violated (e.g. a self-deadlock attempt, a
/// duplicate child name). Terminates the session as `ABORTED`.
#[derive(Debug, Error)]
pub enum InternalError {
    #[error("actor {0:?} already has a child named {1:?}")]
    DuplicateChild(String, String),
    #[error("no actor named {0:?}")]
    UnknownActor(String),
    #[error("self-call deadlock: {0} cannot `tell(self, ...).get()` from within its own action")]
    SelfDeadlock(String),
    #[error("mailbox closed for actor {0:?}")]
    MailboxClosed(String),
}

/// The union of every error kind, used at crate boundaries that can fail
/// for more than one reason (loading a session, running the CLI).
#[derive(Debug, Error)]
pub enum IacError {
    #[error(transparent)]
    Config(#[from] ConfigError),
    #[error(transparent)]
    Transport(#[from] TransportError),
    #[error(transparent)]
    State(#[from] StateError),
    #[error(transparent)]
    Internal(#[from] InternalError),
    #[error("io error: {0}")]
    Io(#[from] std::io::Error),
}
