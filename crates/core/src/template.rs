// SPDX-License-Identifier: MIT OR Apache-2.0

//! `${name}` / `${a.b}` variable interpolation over a [`JsonState`] tree
//! (spec §4.6).

use std::sync::LazyLock;

use regex::Regex;

use crate::json_state::JsonState;

/// Matches `${name}` or `${a.b.c}`. `result` is handled specially by
/// [`interpolate`] rather than by this pattern matching more loosely.
#[allow(clippy::expect_used)]
static VAR_PATTERN: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"\$\{([a-zA-Z_][a-zA-Z0-9_]*(?:\.[a-zA-Z_][a-zA-Z0-9_-]*)*)\}")
        .expect("constant regex pattern is valid")
});

/// Expand every `${...}` reference in `template`.
///
/// `${result}` expands to `last_result` (the acting interpreter's last
/// `ActionResult.result`, not part of `state`); every other `${name}` or
/// `${a.b}` expands via `state.get(name)`. Unknown variables are left
/// untouched, and a template containing no `${...}` is returned unchanged
/// (spec §8 idempotence property).
pub fn interpolate(template: &str, state: &JsonState, last_result: Option<&str>) -> String {
    VAR_PATTERN
        .replace_all(template, |caps: &regex::Captures| {
            let name = &caps[1];
            if name == "result" {
                return last_result.map(str::to_string).unwrap_or_else(|| caps[0].to_string());
            }
            state.get(name).unwrap_or_else(|| caps[0].to_string())
        })
        .to_string()
}

#[cfg(test)]
#[path = "template_tests.rs"]
mod tests;
