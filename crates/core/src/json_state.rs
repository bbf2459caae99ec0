// SPDX-License-Identifier: MIT OR Apache-2.0

//! Per-actor JSON state tree (spec §4.6 "JSON State & Variable
//! Substitution").
//!
//! `${result}` is deliberately *not* stored here: spec §4.6 calls it out
//! as "not stored in the tree; overwritten after every action" — it lives
//! on the workflow interpreter as the last `ActionResult`, and
//! `crate::template` is handed both this tree and that scratch value when
//! it expands a string.

use serde_json::Value;

/// A mutable tree of named values, keyed by `.`-separated paths
/// (`putJson`/`getJson`/`hasJson`/`clearJson` in spec §4.6).
#[derive(Debug, Clone, Default)]
pub struct JsonState {
    root: Value,
}

impl JsonState {
    pub fn new() -> Self {
        JsonState { root: Value::Object(serde_json::Map::new()) }
    }

    fn segments(path: &str) -> Vec<&str> {
        path.split('.').filter(|s| !s.is_empty()).collect()
    }

    /// Insert or overwrite the value at `path`, creating intermediate
    /// objects as needed.
    pub fn put(&mut self, path: &str, value: Value) {
        let segments = Self::segments(path);
        if segments.is_empty() {
            return;
        }
        let mut cursor = &mut self.root;
        for seg in &segments[..segments.len() - 1] {
            if !matches!(cursor, Value::Object(_)) {
                *cursor = Value::Object(serde_json::Map::new());
            }
            #[allow(clippy::expect_used)]
            let map = cursor.as_object_mut().expect("just ensured Object above");
            cursor = map.entry(seg.to_string()).or_insert_with(|| Value::Object(serde_json::Map::new()));
        }
        if !matches!(cursor, Value::Object(_)) {
            *cursor = Value::Object(serde_json::Map::new());
        }
        #[allow(clippy::expect_used)]
        let map = cursor.as_object_mut().expect("just ensured Object above");
        #[allow(clippy::expect_used)]
        map.insert(segments.last().expect("checked non-empty above").to_string(), value);
    }

    /// Convenience wrapper over `put` for plain string values.
    pub fn put_str(&mut self, path: &str, value: impl Into<String>) {
        self.put(path, Value::String(value.into()));
    }

    fn get_value(&self, path: &str) -> Option<&Value> {
        let segments = Self::segments(path);
        let mut cursor = &self.root;
        for seg in &segments {
            cursor = cursor.as_object()?.get(*seg)?;
        }
        Some(cursor)
    }

    /// The scalar at `path` rendered as text (spec: "`getJson(path)`
    /// returns the scalar as text"). Non-scalar values are rendered as
    /// compact JSON.
    pub fn get(&self, path: &str) -> Option<String> {
        self.get_value(path).map(Self::render)
    }

    fn render(value: &Value) -> String {
        match value {
            Value::String(s) => s.clone(),
            Value::Null => String::new(),
            other => other.to_string(),
        }
    }

    pub fn has(&self, path: &str) -> bool {
        self.get_value(path).is_some()
    }

    pub fn clear(&mut self) {
        self.root = Value::Object(serde_json::Map::new());
    }

    /// The subtree rooted at `path` (or the whole tree for `""`), used by
    /// `printJson`/`printYaml` (spec §4.7).
    pub fn subtree(&self, path: &str) -> Option<&Value> {
        if path.is_empty() {
            Some(&self.root)
        } else {
            self.get_value(path)
        }
    }
}

#[cfg(test)]
#[path = "json_state_tests.rs"]
mod tests;
