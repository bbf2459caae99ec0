// SPDX-License-Identifier: MIT OR Apache-2.0

//! Host identity and connection parameters (spec §3 "Host").

use serde::{Deserialize, Serialize};

/// How to reach a host's shell.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum Connection {
    /// Bypass SSH entirely and spawn a local subprocess.
    Local,
    /// Reach the host over SSH.
    Ssh {
        user: String,
        port: u16,
        /// Non-empty only when password auth should be attempted.
        password: Option<String>,
        /// A single `ProxyJump` hop, itself a full host to connect through.
        proxy_jump: Option<Box<Host>>,
    },
}

impl Connection {
    pub fn default_ssh(user: impl Into<String>) -> Self {
        Connection::Ssh { user: user.into(), port: 22, password: None, proxy_jump: None }
    }
}

/// One inventory entry. Immutable after construction; identity is
/// `hostname` (the address actually dialed may differ, see `actoriac_host`
/// / `ansible_host` in the inventory format).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Host {
    /// The name used in the inventory and as the actor name suffix
    /// (`node-<hostname>`).
    pub hostname: String,
    /// The address actually dialed, if different from `hostname`.
    pub address: String,
    pub connection: Connection,
}

impl Host {
    pub fn new(hostname: impl Into<String>) -> Self {
        let hostname = hostname.into();
        Host { address: hostname.clone(), hostname, connection: Connection::default_ssh("root") }
    }

    pub fn local(hostname: impl Into<String>) -> Self {
        let hostname = hostname.into();
        Host { address: hostname.clone(), hostname, connection: Connection::Local }
    }

    pub fn is_local(&self) -> bool {
        matches!(self.connection, Connection::Local)
    }

    /// A stable identifier suitable for a child-actor name: `node-<hostname>`.
    pub fn actor_name(&self) -> String {
        format!("node-{}", self.hostname)
    }
}

#[cfg(test)]
#[path = "host_tests.rs"]
mod tests;
