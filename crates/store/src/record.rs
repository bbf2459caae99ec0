// SPDX-License-Identifier: MIT OR Apache-2.0

//! The on-disk shape of one session's append-only segment file: a
//! sequence of newline-delimited JSON [`StoreRecord`]s, replayed in order
//! on [`crate::SessionStore::open`] to rebuild the in-memory index.

use serde::{Deserialize, Serialize};

use actoriac_core::{LogEntry, NodeResult, SessionHeader, SessionTrailer};

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "kind")]
pub enum StoreRecord {
    Header(SessionHeader),
    Log(LogEntry),
    NodeResult(NodeResult),
    Trailer { session_id: actoriac_core::SessionId, trailer: SessionTrailer },
}
