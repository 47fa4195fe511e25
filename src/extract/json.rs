use serde_json::Value;

use super::{visible_text, NOT_AVAILABLE};

/// Walk a path of nested keys into `data` and return the cleaned value.
///
/// An absent key anywhere along the path, a null, or an empty string all
/// yield the `"N/A"` sentinel; this never errors. String values are
/// entity-decoded and tag-stripped on the way out.
pub fn get_value(data: &Value, path: &[&str]) -> String {
    let mut node = data;
    for key in path {
        match node.get(key) {
            Some(next) => node = next,
            None => return NOT_AVAILABLE.to_string(),
        }
    }
    match node {
        Value::String(s) if !s.is_empty() => visible_text(s),
        Value::Number(n) => n.to_string(),
        Value::Bool(b) => b.to_string(),
        _ => NOT_AVAILABLE.to_string(),
    }
}

// ── Tests ──
