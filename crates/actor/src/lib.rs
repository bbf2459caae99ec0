// SPDX-License-Identifier: MIT OR Apache-2.0

#![cfg_attr(test, allow(clippy::panic))]
#![cfg_attr(test, allow(clippy::unwrap_used))]
#![cfg_attr(test, allow(clippy::expect_used))]

//! actoriac-actor: the actor kernel (C6), output multiplexer (C4), group
//! fan-out dispatcher (C8), and the node/group action bindings (C9/C10).
//!
//! This crate is the one place `actoriac-workflow`'s [`ActionDispatcher`]
//! seam is implemented against real hosts — everything here either runs a
//! command, streams output, or writes session log records.

pub mod group;
pub mod node;
pub mod output;
pub mod pattern;

pub use group::GroupBinding;
pub use node::{spawn_node_actor, NodeActorHandle, NodeBinding};
pub use output::{format_summary_table, summarize_by_label, LabelSummary, OutputKind, OutputLine, OutputMultiplexer};
pub use pattern::{glob_match, matches};
