//! Field validators: `requiredCheck`, `strCheck`, `intCheck`, `floatCheck`,
//! `strLenCheck`, `arrLenCheck` and `regexCheck`.
//!
//! Validators are a side channel. They always render as an empty fragment,
//! never touch the bound arguments and never stop rendering; each failed
//! check appends one [`ValidatorError`] to the execution state. Several
//! checks on the same field accumulate independently.
//!
//! Apart from `requiredCheck`, a check on an absent path passes: presence is
//! `requiredCheck`'s job.
//!
//! # Example
//!
//! ```
//! let tpl = qsql::compile(
//!     "users",
//!     r#"{requiredCheck "name" "E_NAME" "name is required" "params.name"}SELECT 1"#,
//! )
//! .unwrap();
//!
//! let stmt = tpl.execute(r#"{"params": {}}"#).unwrap();
//! assert_eq!(stmt.sql, "SELECT 1");
//! assert_eq!(stmt.validator_errors[0].code, "E_NAME");
//! ```

use crate::path;
use crate::state::{Diagnostic, ExecutionState};
use crate::value::Value;
use regex::Regex;
use serde::Serialize;
use std::fmt;

/// The kind of check that failed.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub enum CheckKind {
    /// The path must exist (an explicit `null` counts as present).
    Required,
    /// The value must be a string.
    Str,
    /// The value must be an integer.
    Int,
    /// The value must be a number.
    Float,
    /// The value must be a string within length bounds.
    StrLen,
    /// The value must be an array within length bounds.
    ArrLen,
    /// The value must be a string matching a pattern.
    #[serde(rename = "reg")]
    Regex,
}

impl CheckKind {
    /// Machine-readable name, as serialized in [`ValidatorError::kind`].
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Required => "required",
            Self::Str => "str",
            Self::Int => "int",
            Self::Float => "float",
            Self::StrLen => "strLen",
            Self::ArrLen => "arrLen",
            Self::Regex => "reg",
        }
    }
}

impl fmt::Display for CheckKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A failed field check.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, thiserror::Error)]
#[error("validator error: {kind}, code: {code}, msg: {message}, paths: {path}")]
pub struct ValidatorError {
    /// Which check failed.
    #[serde(rename = "type")]
    pub kind: CheckKind,
    /// Business field name.
    #[serde(rename = "field")]
    pub field_name: String,
    /// Machine-readable error code.
    pub code: String,
    /// Human-readable message.
    pub message: String,
    /// Dot-joined path that was checked.
    pub path: String,
}

/// Shared arguments of every check: field name, code, message, path...
struct CheckArgs {
    field_name: String,
    code: String,
    message: String,
    segments: Vec<String>,
}

impl CheckArgs {
    fn parse(args: &[Value]) -> Self {
        let text = |i: usize| args.get(i).map(Value::to_string).unwrap_or_default();
        Self {
            field_name: text(0),
            code: text(1),
            message: text(2),
            segments: args.iter().skip(3).map(Value::to_segment).collect(),
        }
    }

    fn fail(self, state: &mut ExecutionState, kind: CheckKind) {
        state.report(ValidatorError {
            kind,
            field_name: self.field_name,
            code: self.code,
            message: self.message,
            path: path::join(&self.segments),
        });
    }
}

/// `requiredCheck`, `strCheck`, `intCheck` and `floatCheck`.
///
/// `args` is `[fieldName, code, message, path...]`.
pub fn check_type(state: &mut ExecutionState, kind: CheckKind, args: &[Value]) -> String {
    let check = CheckArgs::parse(args);
    let passed = match state.resolve(&check.segments) {
        None => kind != CheckKind::Required,
        Some(value) => match kind {
            CheckKind::Required => true,
            CheckKind::Str => matches!(value, Value::String(_)),
            CheckKind::Float => matches!(value, Value::Number(_)),
            // Parameter JSON numbers are always parsed as floats, so a strict
            // integer check cannot be satisfied by document values.
            CheckKind::Int => false,
            CheckKind::StrLen | CheckKind::ArrLen | CheckKind::Regex => true,
        },
    };

    if !passed {
        check.fail(state, kind);
    }
    String::new()
}

/// `strLenCheck` and `arrLenCheck`.
///
/// `args` is `[min, max, fieldName, code, message, path...]`; a `nil` bound
/// is unbounded. String length is counted in UTF-8 bytes.
pub fn check_len(state: &mut ExecutionState, kind: CheckKind, args: &[Value]) -> String {
    let min = args.first().and_then(bound);
    let max = args.get(1).and_then(bound);
    let check = CheckArgs::parse(args.get(2..).unwrap_or_default());

    let Some(value) = state.resolve(&check.segments) else {
        return String::new();
    };

    let len = match (kind, value) {
        (CheckKind::ArrLen, Value::Array(items)) => Some(items.len()),
        (CheckKind::StrLen, Value::String(s)) => Some(s.len()),
        _ => None,
    };

    let passed = len.is_some_and(|len| {
        min.is_none_or(|min| len >= min) && max.is_none_or(|max| len <= max)
    });
    if !passed {
        check.fail(state, kind);
    }
    String::new()
}

/// `regexCheck`.
///
/// `args` is `[pattern, fieldName, code, message, path...]`. `compiled` is the
/// pattern precompiled at template compile time when it was a literal;
/// otherwise it is compiled here, and an invalid pattern becomes a diagnostic.
pub fn check_regex(state: &mut ExecutionState, args: &[Value], compiled: Option<&Regex>) -> String {
    let pattern = args.first().map(Value::to_string).unwrap_or_default();
    let check = CheckArgs::parse(args.get(1..).unwrap_or_default());

    let Some(value) = state.resolve(&check.segments).cloned() else {
        return String::new();
    };

    let owned;
    let regex = match compiled {
        Some(regex) => regex,
        None => match Regex::new(&pattern) {
            Ok(regex) => {
                owned = regex;
                &owned
            },
            Err(e) => {
                state.diagnose(Diagnostic::InvalidPattern {
                    pattern,
                    message: e.to_string(),
                });
                return String::new();
            },
        },
    };

    let passed = match &value {
        Value::String(s) => regex.is_match(s),
        _ => false,
    };
    if !passed {
        check.fail(state, CheckKind::Regex);
    }
    String::new()
}

/// A length bound: `nil` is unbounded, negative numbers clamp to zero.
#[allow(clippy::cast_possible_truncation, clippy::cast_sign_loss)]
fn bound(value: &Value) -> Option<usize> {
    match value {
        Value::Number(n) if n.is_finite() => Some(n.max(0.0) as usize),
        _ => None,
    }
}
