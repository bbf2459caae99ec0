// SPDX-License-Identifier: MIT OR Apache-2.0

//! `executeSudoCommand` wrapping (spec §4.1).

use actoriac_core::TransportError;

/// Environment variable consulted for the sudo password (spec §6).
pub const SUDO_PASSWORD_VAR: &str = "SUDO_PASSWORD";

/// Escape a string for embedding inside a single-quoted shell argument by
/// doubling: `'` becomes `'\''` (end quote, escaped literal quote, start
/// quote). Used for both the password and the inner command so
/// multi-line scripts survive the `bash -c '<cmd>'` wrapper.
fn single_quote_escape(s: &str) -> String {
    s.replace('\'', r"'\''")
}

/// Build `echo '<escaped-pw>' | sudo -S bash -c '<escaped-cmd>'`.
///
/// Returns [`TransportError::SudoPasswordMissing`] if `SUDO_PASSWORD` is
/// unset (spec: "Fail with a typed 'SUDO_PASSWORD not set' error the
/// caller translates to a node-visible failure line").
pub fn wrap(command: &str) -> Result<String, TransportError> {
    let password = std::env::var(SUDO_PASSWORD_VAR).map_err(|_| TransportError::SudoPasswordMissing)?;
    Ok(format!(
        "echo '{}' | sudo -S bash -c '{}'",
        single_quote_escape(&password),
        single_quote_escape(command),
    ))
}

#[cfg(test)]
#[path = "sudo_tests.rs"]
mod tests;
