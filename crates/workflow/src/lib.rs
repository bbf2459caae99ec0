// SPDX-License-Identifier: MIT OR Apache-2.0

#![cfg_attr(test, allow(clippy::panic))]
#![cfg_attr(test, allow(clippy::unwrap_used))]
#![cfg_attr(test, allow(clippy::expect_used))]

//! actoriac-workflow: the workflow document model and interpreter (C7),
//! plus the document-shaped inputs loaded before any actor exists: the
//! workflow document itself and the INI-like inventory (spec §6).
//!
//! `actoriac-actor` depends on this crate and implements
//! [`ActionDispatcher`]; this crate never depends on `actoriac-actor`
//! (spec §9 "composition over inheritance").

pub mod document;
pub mod interpreter;
pub mod inventory_parse;
pub mod load;

pub use document::{ActionSpec, Transition, WorkflowDocument};
pub use interpreter::{substitute_value, ActionDispatcher, WorkflowInterpreter, DEFAULT_MAX_ITERATIONS};
pub use inventory_parse::parse_inventory;
pub use load::load_workflow;
