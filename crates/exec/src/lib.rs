// SPDX-License-Identifier: MIT OR Apache-2.0

//! actoriac-exec: the Command Executor (spec §4.1).
//!
//! `execute`/`executeSudo` run a shell command either on the local
//! machine or over SSH, streaming completed lines to an optional
//! callback before they are appended to the captured buffer, and finally
//! returning a [`CommandResult`].

pub mod local;
pub mod ssh;
pub mod sudo;

use async_trait::async_trait;

pub use actoriac_core::CommandResult;
use actoriac_core::TransportError;
pub use local::LocalExecutor;
pub use ssh::SshExecutor;

/// Which stream a streamed line came from.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LineSource {
    Stdout,
    Stderr,
}

/// Invoked once per completed line, before it is appended to the
/// captured buffer (spec §4.1: "each completed line is forwarded to the
/// callback before being appended to the captured buffer").
pub type LineCallback = std::sync::Arc<dyn Fn(LineSource, &str) + Send + Sync>;

/// Implemented by the local and SSH executors; `executeSudo` wraps
/// `execute` with the `sudo` module's command-rewriting rather than
/// being a separate trait method on every implementor.
#[async_trait]
pub trait CommandExecutor: Send + Sync {
    async fn execute(
        &self,
        command: &str,
        on_line: Option<LineCallback>,
    ) -> Result<CommandResult, TransportError>;

    /// A stable label for this executor (hostname, or `"local"`), used in
    /// log records and error messages.
    fn identifier(&self) -> &str;

    /// `executeSudo` (spec §4.1): require `SUDO_PASSWORD`, build the
    /// `echo '<pw>' | sudo -S bash -c '<cmd>'` pipeline, and delegate to
    /// `execute`.
    async fn execute_sudo(
        &self,
        command: &str,
        on_line: Option<LineCallback>,
    ) -> Result<CommandResult, TransportError> {
        let wrapped = sudo::wrap(command)?;
        self.execute(&wrapped, on_line).await
    }
}
