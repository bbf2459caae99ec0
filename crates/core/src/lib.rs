// SPDX-License-Identifier: MIT OR Apache-2.0

// Allow panic!/unwrap/expect in test code
#![cfg_attr(test, allow(clippy::panic))]
#![cfg_attr(test, allow(clippy::unwrap_used))]
#![cfg_attr(test, allow(clippy::expect_used))]

//! actoriac-core: domain types shared by every other actoriac crate.
//!
//! Nothing in this crate talks to the network, the filesystem, or a
//! worker pool — it only defines the data model from the specification
//! (hosts, inventory, actions, sessions, JSON state) and the error
//! taxonomy every other crate maps its failures onto.

pub mod action;
pub mod clock;
pub mod error;
pub mod host;
pub mod id;
pub mod inventory;
pub mod json_state;
pub mod macros;
pub mod session;
pub mod template;

pub use action::{ActionResult, CommandResult};
pub use clock::{Clock, FakeClock, SystemClock};
pub use error::{ConfigError, IacError, InternalError, StateError, TransportError};
pub use host::{Connection, Host};
pub use id::short;
pub use inventory::Inventory;
pub use json_state::JsonState;
pub use session::{
    LogEntry, LogLevel, NodeResult, NodeStatus, Session, SessionHeader, SessionId, SessionStatus,
    SessionSummary, SessionTrailer,
};
