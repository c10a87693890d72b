// SPDX-License-Identifier: Apache-2.0

//! Shared display helpers for loosely typed platform payloads.

use comfy_table::presets::UTF8_FULL_CONDENSED;
use comfy_table::{ContentArrangement, Table};
use serde_json::Value;

/// Longest cell text before truncation.
const MAX_CELL_CHARS: usize = 60;

/// Table with the house style.
pub fn new_table(header: &[&str]) -> Table {
    let mut table = Table::new();
    table
        .load_preset(UTF8_FULL_CONDENSED)
        .set_content_arrangement(ContentArrangement::Dynamic)
        .set_header(header.iter().copied());
    table
}

/// Scalar rendered without JSON quoting; `-` for null/missing.
pub fn scalar(value: Option<&Value>) -> String {
    match value {
        None | Some(Value::Null) => "-".to_string(),
        Some(Value::String(s)) if s.is_empty() => "-".to_string(),
        Some(Value::String(s)) => s.clone(),
        Some(other) => other.to_string(),
    }
}

/// First present field among `paths`; each path is dot-separated.
pub fn field(value: &Value, paths: &[&str]) -> String {
    paths
        .iter()
        .find_map(|path| {
            path.split('.')
                .try_fold(value, |current, key| current.get(key))
                .filter(|v| !v.is_null())
        })
        .map_or_else(|| "-".to_string(), |v| truncate(&scalar(Some(v))))
}

/// Shortens text to the cell limit on a char boundary.
pub fn truncate(text: &str) -> String {
    let flat = text.split_whitespace().collect::<Vec<_>>().join(" ");
    if flat.chars().count() <= MAX_CELL_CHARS {
        flat
    } else {
        let cut: String = flat.chars().take(MAX_CELL_CHARS - 1).collect();
        format!("{cut}…")
    }
}
