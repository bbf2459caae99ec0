// SPDX-License-Identifier: MIT OR Apache-2.0

//! Output Multiplexer (spec §4 C4): an in-memory, per-source sink for
//! stdout/stderr lines, plus a formatted session summary (spec §4.8
//! `printSessionSummary`).

use std::collections::HashMap;
use std::sync::Mutex;

use actoriac_core::{LogEntry, LogLevel};

/// Which stream a line came from, tagged per spec §4.7
/// (`source=actorName, type="stdout"|"stderr"`).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OutputKind {
    Stdout,
    Stderr,
    /// A non-command line: a summary record, a `print`, a `printJson` row.
    Info,
}

#[derive(Debug, Clone)]
pub struct OutputLine {
    pub kind: OutputKind,
    pub text: String,
}

/// Per-source line order is preserved; no ordering is guaranteed across
/// sources (spec §5 "Ordering guarantees" (c)).
#[derive(Debug, Default)]
pub struct OutputMultiplexer {
    lines: Mutex<HashMap<String, Vec<OutputLine>>>,
}

impl OutputMultiplexer {
    pub fn new() -> Self {
        OutputMultiplexer::default()
    }

    #[allow(clippy::expect_used)]
    pub fn push(&self, source: &str, kind: OutputKind, text: impl Into<String>) {
        let mut lines = self.lines.lock().expect("output multiplexer lock poisoned");
        lines.entry(source.to_string()).or_default().push(OutputLine { kind, text: text.into() });
    }

    #[allow(clippy::expect_used)]
    pub fn lines_for(&self, source: &str) -> Vec<OutputLine> {
        self.lines.lock().expect("output multiplexer lock poisoned").get(source).cloned().unwrap_or_default()
    }

    /// Render one `source`'s lines back-to-back, used by `executeCommand`'s
    /// summary record.
    pub fn combined_for(&self, source: &str) -> String {
        self.lines_for(source).iter().map(|l| l.text.as_str()).collect::<Vec<_>>().join("\n")
    }

    /// Every source name that has received at least one line, in first-seen
    /// order. The CLI uses this to drain everything collected during a run.
    #[allow(clippy::expect_used)]
    pub fn sources(&self) -> Vec<String> {
        self.lines.lock().expect("output multiplexer lock poisoned").keys().cloned().collect()
    }
}

/// Counts of literal `[OK]`/`[WARN]`/`[ERROR]`/`[INFO]` markers within a
/// label group's messages, plus the first lines bearing each marker (spec
/// §4.8 `printSessionSummary`).
#[derive(Debug, Default, Clone)]
pub struct LabelSummary {
    pub ok: usize,
    pub warn: usize,
    pub error: usize,
    pub info: usize,
    pub error_lines: Vec<String>,
    pub warning_lines: Vec<String>,
}

/// Group DEBUG-or-above log entries by `label`, counting marker prefixes.
pub fn summarize_by_label(entries: &[LogEntry]) -> HashMap<String, LabelSummary> {
    let mut grouped: HashMap<String, LabelSummary> = HashMap::new();

    for entry in entries {
        if entry.level < LogLevel::Debug {
            continue;
        }
        let label = entry.label.clone().unwrap_or_else(|| "(unlabeled)".to_string());
        let summary = grouped.entry(label).or_default();

        if entry.message.contains("[OK]") {
            summary.ok += 1;
        } else if entry.message.contains("[WARN]") {
            summary.warn += 1;
            summary.warning_lines.push(entry.message.clone());
        } else if entry.message.contains("[ERROR]") {
            summary.error += 1;
            summary.error_lines.push(entry.message.clone());
        } else if entry.message.contains("[INFO]") {
            summary.info += 1;
        }
    }

    grouped
}

/// Render the fixed-width table plus `--- Errors ---` / `--- Warnings
/// ---` sections (spec §4.8).
pub fn format_summary_table(grouped: &HashMap<String, LabelSummary>) -> String {
    let mut labels: Vec<&String> = grouped.keys().collect();
    labels.sort();

    let mut out = String::new();
    out.push_str(&format!("{:<24}{:>6}{:>6}{:>6}{:>6}\n", "LABEL", "OK", "WARN", "ERROR", "INFO"));
    for label in &labels {
        let s = &grouped[*label];
        out.push_str(&format!("{:<24}{:>6}{:>6}{:>6}{:>6}\n", label, s.ok, s.warn, s.error, s.info));
    }

    let errors: Vec<&String> = labels.iter().flat_map(|l| grouped[*l].error_lines.iter()).collect();
    if !errors.is_empty() {
        out.push_str("--- Errors ---\n");
        for line in errors {
            out.push_str(line);
            out.push('\n');
        }
    }

    let warnings: Vec<&String> = labels.iter().flat_map(|l| grouped[*l].warning_lines.iter()).collect();
    if !warnings.is_empty() {
        out.push_str("--- Warnings ---\n");
        for line in warnings {
            out.push_str(line);
            out.push('\n');
        }
    }

    out
}

#[cfg(test)]
#[path = "output_tests.rs"]
mod tests;
