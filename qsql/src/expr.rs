//! Expression builder behind `expr` and `optExpr`.
//!
//! An expression call takes a field, an operator and one or more path
//! segments, resolves the value and renders a parameterized condition:
//!
//! | operator                 | value        | fragment                 |
//! |--------------------------|--------------|--------------------------|
//! | `IN` / `NOT IN`          | array of N   | `field IN (?, ?, ...)`   |
//! | `BETWEEN` / `NOT BETWEEN`| array of 2   | `field BETWEEN ? AND ?`  |
//! | anything else            | any          | `field op ?`             |
//!
//! Operator family matching is case-insensitive; the operator text itself is
//! copied into the fragment verbatim. Values are always bound, never inlined.

use crate::config::OptionalExpr;
use crate::path;
use crate::state::{Diagnostic, ExecutionState};
use crate::value::Value;

/// Operator families with special placeholder layouts.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OperatorKind {
    /// `IN`: one placeholder per element.
    In,
    /// `NOT IN`: one placeholder per element.
    NotIn,
    /// `BETWEEN`: exactly two placeholders.
    Between,
    /// `NOT BETWEEN`: exactly two placeholders.
    NotBetween,
    /// Any other operator: a single placeholder bound to the first value.
    Comparison,
}

impl OperatorKind {
    /// Classify operator text (trimmed, case-insensitive).
    #[must_use]
    pub fn classify(op: &str) -> Self {
        match op.trim().to_ascii_uppercase().as_str() {
            "IN" => Self::In,
            "NOT IN" => Self::NotIn,
            "BETWEEN" => Self::Between,
            "NOT BETWEEN" => Self::NotBetween,
            _ => Self::Comparison,
        }
    }
}

/// Build an expression fragment from raw template arguments.
///
/// `args` is `[field, op, path...]`. With fewer than three arguments the call
/// is malformed: it still renders `field op ?` bound to `NULL`, and a required
/// expression records a diagnostic.
pub fn build_expr(state: &mut ExecutionState, required: bool, args: &[Value]) -> String {
    let Some(field) = args.first().map(Value::to_string) else {
        return String::new();
    };
    let op = args.get(1).map(Value::to_string).unwrap_or_default();

    let segments: Vec<String> = args.iter().skip(2).map(Value::to_segment).collect();
    if segments.is_empty() {
        if required {
            state.diagnose(Diagnostic::MalformedExpr {
                field: field.clone(),
                got: args.len(),
            });
        }
        return render(state, &field, &op, vec![Value::Null]);
    }

    let resolved = state.resolve(&segments).cloned();
    if resolved.is_none() {
        if required {
            state.diagnose(Diagnostic::MissingValue {
                field: field.clone(),
                path: path::join(&segments),
            });
        } else if state.optional_expr() == OptionalExpr::Suppress {
            return String::new();
        }
    }

    let mut values = normalize(resolved);
    if values.is_empty() {
        // An empty array: required expressions still render a NULL-bound
        // placeholder, optional ones drop out.
        if !required {
            return String::new();
        }
        values.push(Value::Null);
    }

    render(state, &field, &op, values)
}

/// Flatten a resolved value into the operand list.
///
/// Arrays contribute their elements in order; a scalar, a `null` or a
/// missing value contributes exactly one element.
fn normalize(value: Option<Value>) -> Vec<Value> {
    match value {
        Some(Value::Array(items)) => items,
        Some(scalar) => vec![scalar],
        None => vec![Value::Null],
    }
}

/// Bind operands and lay out the fragment for the operator family.
fn render(state: &mut ExecutionState, field: &str, op: &str, values: Vec<Value>) -> String {
    match OperatorKind::classify(op) {
        OperatorKind::In | OperatorKind::NotIn => {
            let placeholders: Vec<String> = values.into_iter().map(|v| state.bind(v)).collect();
            format!("{field} {op} ({})", placeholders.join(", "))
        },
        OperatorKind::Between | OperatorKind::NotBetween => {
            let mut operands = values.into_iter();
            match (operands.next(), operands.next()) {
                (Some(low), Some(high)) => {
                    let low = state.bind(low);
                    let high = state.bind(high);
                    format!("{field} {op} {low} AND {high}")
                },
                (first, _) => {
                    state.diagnose(Diagnostic::BetweenOperands {
                        field: field.to_string(),
                        got: usize::from(first.is_some()),
                    });
                    String::new()
                },
            }
        },
        OperatorKind::Comparison => {
            let first = values.into_iter().next().unwrap_or_default();
            let placeholder = state.bind(first);
            format!("{field} {op} {placeholder}")
        },
    }
}
