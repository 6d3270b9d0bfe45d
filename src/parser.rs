//! Reading and writing the flat `key=value` auth file.
//!
//! The auth file is the subset of `.npmrc` syntax this tool needs: one
//! `key=value` pair per line, no sections, no quoting or escaping.
//!
//! Note: the split is on the *first* `=` only. Base64 `_auth` values end
//! in `=` padding, and splitting on every `=` would drop them on re-read.

use std::collections::BTreeMap;

/// Parse auth file content into key-value pairs.
///
/// Ignored lines:
/// - blank lines
/// - comments starting with `#` or `;`
/// - lines without `=`, or with an empty key
///
/// A repeated key keeps its last value.
pub fn parse_auth_file(content: &str) -> BTreeMap<String, String> {
    let mut result = BTreeMap::new();

    for line in content.lines() {
        let line = line.trim();

        if line.is_empty() || line.starts_with('#') || line.starts_with(';') {
            continue;
        }

        let Some((key, value)) = line.split_once('=') else {
            continue;
        };

        let key = key.trim();
        if key.is_empty() {
            continue;
        }

        result.insert(key.to_string(), value.trim().to_string());
    }

    result
}

/// Serialize pairs as `key=value` lines, in key order.
pub fn write_auth_file(entries: &BTreeMap<String, String>) -> String {
    let mut out = String::new();
    for (key, value) in entries {
        out.push_str(key);
        out.push('=');
        out.push_str(value);
        out.push('\n');
    }
    out
}

/// Parse a boolean value from a string.
///
/// Returns `Some(true)` for "true", `Some(false)` for "false", and `None` for other values.
pub fn parse_bool(value: &str) -> Option<bool> {
    match value.to_lowercase().as_str() {
        "true" => Some(true),
        "false" => Some(false),
        _ => None,
    }
}
