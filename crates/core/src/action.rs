// SPDX-License-Identifier: MIT OR Apache-2.0

//! `ActionResult` and `CommandResult` (spec §3).

use serde::{Deserialize, Serialize};

/// `{success, result-string}` returned by every action (spec GLOSSARY).
///
/// The `result` string carries data — command output, an error message, a
/// returned value — and is consumed both by `${result}` substitution
/// (`JsonState`) and by the session log store.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ActionResult {
    pub success: bool,
    pub result: String,
}

impl ActionResult {
    pub fn ok(result: impl Into<String>) -> Self {
        ActionResult { success: true, result: result.into() }
    }

    pub fn fail(result: impl Into<String>) -> Self {
        ActionResult { success: false, result: result.into() }
    }
}

impl std::fmt::Display for ActionResult {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.result)
    }
}

/// `{stdout, stderr, exitCode, success = exitCode==0}`. Producers trim
/// trailing whitespace once per stream before returning.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CommandResult {
    pub stdout: String,
    pub stderr: String,
    pub exit_code: i32,
}

impl CommandResult {
    pub fn success(&self) -> bool {
        self.exit_code == 0
    }

    /// `combined(stdout, stderr)` as referenced by the `executeCommand`
    /// action's `ActionResult.result` (spec §4.7).
    pub fn combined(&self) -> String {
        if self.stderr.is_empty() {
            self.stdout.clone()
        } else if self.stdout.is_empty() {
            self.stderr.clone()
        } else {
            format!("{}\n{}", self.stdout, self.stderr)
        }
    }

    pub fn quiet_summary(&self) -> String {
        format!("exitCode={}, stdout={}, stderr={}", self.exit_code, self.stdout, self.stderr)
    }

    pub fn into_action_result(self) -> ActionResult {
        let success = self.success();
        ActionResult { success, result: self.combined() }
    }
}

#[cfg(test)]
#[path = "action_tests.rs"]
mod tests;
