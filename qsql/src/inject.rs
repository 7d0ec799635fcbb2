//! Value injection and lookup helpers: `val`, `getValue`, `isEmpty`.
//!
//! # Security
//!
//! `val` binds a literal value. It must not be used for identifiers (table or
//! column names, sort directions): most drivers reject bound identifiers, and
//! anything interpolated into the SQL text instead bypasses parameterization.
//! Choose dynamic identifiers from an allow-list in the template.

use crate::state::ExecutionState;
use crate::value::Value;

/// Bind the value at the path and return its placeholder.
///
/// Always binds exactly one argument: the resolved value, or `NULL` when the
/// path is absent. Absence is not a diagnostic here.
pub fn inject(state: &mut ExecutionState, args: &[Value]) -> String {
    let value = get_value(state, args);
    state.bind(value)
}

/// The value at the path, `Null` when absent.
pub fn get_value(state: &ExecutionState, args: &[Value]) -> Value {
    let segments: Vec<String> = args.iter().map(Value::to_segment).collect();
    state.resolve(&segments).cloned().unwrap_or_default()
}

/// The `isEmpty` predicate.
#[inline]
pub fn is_empty(value: &Value) -> bool {
    value.is_empty()
}
