//! Dot-path resolution against the parameter document.
//!
//! Segments are joined with `.` and the joined path is split again, so a
//! single segment may itself carry several levels (`"params.name"`) and
//! callers can mix both styles (`"params", "filters", "0", "value"`).
//!
//! Array elements are addressed by plain integer segments. A literal dot
//! inside an object key is written as `\.`.
//!
//! # Example
//!
//! ```
//! use qsql::{Value, path};
//!
//! let doc = Value::from(serde_json::json!({"params": {"ids": [7, 8], "gone": null}}));
//!
//! assert_eq!(path::resolve(&doc, &["params.ids", "1"]), Some(&Value::Number(8.0)));
//! assert_eq!(path::resolve(&doc, &["params.gone"]), Some(&Value::Null)); // exists, null
//! assert_eq!(path::resolve(&doc, &["params.missing"]), None); // absent
//! ```

use crate::constants::PATH_SEPARATOR;
use crate::value::Value;

/// Join path segments with `.`.
#[must_use]
pub fn join<S: AsRef<str>>(segments: &[S]) -> String {
    let mut joined = String::new();
    for (i, segment) in segments.iter().enumerate() {
        if i > 0 {
            joined.push(PATH_SEPARATOR);
        }
        joined.push_str(segment.as_ref());
    }
    joined
}

/// Resolve `segments` against `doc`.
///
/// Returns `None` when the path does not exist and `Some(&Value::Null)` when
/// it exists with an explicit JSON `null`. An empty path never exists.
#[must_use]
pub fn resolve<'a, S: AsRef<str>>(doc: &'a Value, segments: &[S]) -> Option<&'a Value> {
    let joined = join(segments);
    if joined.is_empty() {
        return None;
    }

    let mut current = doc;
    for key in split(&joined) {
        current = step(current, &key)?;
    }
    Some(current)
}

/// Resolve and report existence separately, mirroring the `(value, exists)`
/// pair exposed to template authors. Absent paths yield `(Null, false)`.
#[must_use]
pub fn lookup<S: AsRef<str>>(doc: &Value, segments: &[S]) -> (Value, bool) {
    match resolve(doc, segments) {
        Some(value) => (value.clone(), true),
        None => (Value::Null, false),
    }
}

/// Descend one level.
fn step<'a>(current: &'a Value, key: &str) -> Option<&'a Value> {
    match current {
        Value::Object(map) => map.get(key),
        Value::Array(items) => {
            let index: usize = key.parse().ok()?;
            items.get(index)
        },
        _ => None,
    }
}

/// Split a joined path on unescaped dots.
fn split(path: &str) -> Vec<String> {
    let mut keys = Vec::new();
    let mut current = String::new();
    let mut chars = path.chars().peekable();

    while let Some(c) = chars.next() {
        match c {
            '\\' if chars.peek() == Some(&PATH_SEPARATOR) => {
                current.push(PATH_SEPARATOR);
                chars.next();
            },
            PATH_SEPARATOR => keys.push(std::mem::take(&mut current)),
            _ => current.push(c),
        }
    }
    keys.push(current);
    keys
}
