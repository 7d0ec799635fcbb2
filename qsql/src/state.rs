//! Per-call execution state.
//!
//! An [`ExecutionState`] is created by [`Template::execute`](crate::Template::execute)
//! for a single render and discarded afterwards. It owns the parsed parameter
//! document and accumulates, in evaluation order, the bound arguments, the
//! generation diagnostics and the validator errors. It is never shared
//! between calls.

use crate::config::OptionalExpr;
use crate::dialect::Placeholder;
use crate::logic::Logic;
use crate::path;
use crate::validate::ValidatorError;
use crate::value::Value;
use serde::{Serialize, Serializer};
use std::fmt;

/// A non-fatal generation problem.
///
/// Diagnostics never abort rendering; the statement is still produced,
/// usually with `NULL`-bound placeholders.
#[derive(Debug, Clone, PartialEq, Eq)]
#[non_exhaustive]
pub enum Diagnostic {
    /// A required expression's value path does not exist.
    MissingValue {
        /// Field name of the expression.
        field: String,
        /// Dot-joined path that was not found.
        path: String,
    },
    /// An expression was called with fewer than field, operator and path.
    MalformedExpr {
        /// Field name of the expression, possibly empty.
        field: String,
        /// Number of arguments supplied.
        got: usize,
    },
    /// `BETWEEN` resolved fewer than two operands.
    BetweenOperands {
        /// Field name of the expression.
        field: String,
        /// Number of operands resolved.
        got: usize,
    },
    /// A logical group had no non-empty fragments.
    EmptyGroup {
        /// The combinator that came up empty.
        logic: Logic,
    },
    /// `range` was given a value that cannot be iterated.
    RangeOverScalar {
        /// Type name of the value.
        kind: &'static str,
    },
    /// A dynamic `regexCheck` pattern failed to compile.
    InvalidPattern {
        /// The pattern as given.
        pattern: String,
        /// Regex engine message.
        message: String,
    },
    /// `len` was given a value that has no length.
    NoLength {
        /// Type name of the value.
        kind: &'static str,
    },
}

impl fmt::Display for Diagnostic {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::MissingValue { field, path } => {
                write!(f, "expr: no values for '{field}' at path '{path}'")
            },
            Self::MalformedExpr { field, got } => write!(
                f,
                "expr: no values for '{field}' (expected field, operator and value path, got {got} arguments)"
            ),
            Self::BetweenOperands { field, got } => {
                write!(f, "between: not enough values for '{field}' (need 2, got {got})")
            },
            Self::EmptyGroup { logic } => write!(f, "{logic}: no valid conditions"),
            Self::RangeOverScalar { kind } => write!(f, "range: can't iterate over {kind}"),
            Self::InvalidPattern { pattern, message } => {
                write!(f, "regexCheck: invalid pattern '{pattern}': {message}")
            },
            Self::NoLength { kind } => write!(f, "len: can't take length of {kind}"),
        }
    }
}

impl Serialize for Diagnostic {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_str(self)
    }
}

/// Mutable context threaded through one render.
#[derive(Debug)]
pub struct ExecutionState {
    doc: Value,
    args: Vec<Value>,
    errors: Vec<Diagnostic>,
    validator_errors: Vec<ValidatorError>,
    placeholder: Placeholder,
    optional_expr: OptionalExpr,
}

impl ExecutionState {
    /// Create a fresh state over a parsed parameter document.
    #[must_use]
    pub const fn new(doc: Value, placeholder: Placeholder, optional_expr: OptionalExpr) -> Self {
        Self {
            doc,
            args: Vec::new(),
            errors: Vec::new(),
            validator_errors: Vec::new(),
            placeholder,
            optional_expr,
        }
    }

    /// The parameter document.
    #[inline]
    #[must_use]
    pub const fn document(&self) -> &Value {
        &self.doc
    }

    /// Resolve path segments against the document.
    #[inline]
    #[must_use]
    pub fn resolve<S: AsRef<str>>(&self, segments: &[S]) -> Option<&Value> {
        path::resolve(&self.doc, segments)
    }

    /// Bind an argument and return the placeholder that refers to it.
    pub fn bind(&mut self, value: Value) -> String {
        self.args.push(value);
        self.placeholder.param(self.args.len())
    }

    /// Arguments bound so far, in emission order.
    #[inline]
    #[must_use]
    pub fn args(&self) -> &[Value] {
        &self.args
    }

    /// Record a generation diagnostic.
    pub fn diagnose(&mut self, diagnostic: Diagnostic) {
        tracing::trace!(%diagnostic, "generation diagnostic");
        self.errors.push(diagnostic);
    }

    /// Diagnostics recorded so far.
    #[inline]
    #[must_use]
    pub fn diagnostics(&self) -> &[Diagnostic] {
        &self.errors
    }

    /// Record a validator failure.
    pub fn report(&mut self, error: ValidatorError) {
        self.validator_errors.push(error);
    }

    /// Validator failures recorded so far.
    #[inline]
    #[must_use]
    pub fn validator_errors(&self) -> &[ValidatorError] {
        &self.validator_errors
    }

    /// How optional expressions treat missing values.
    #[inline]
    #[must_use]
    pub const fn optional_expr(&self) -> OptionalExpr {
        self.optional_expr
    }

    /// Consume the state, returning arguments, diagnostics and validator errors.
    #[must_use]
    pub fn into_parts(self) -> (Vec<Value>, Vec<Diagnostic>, Vec<ValidatorError>) {
        (self.args, self.errors, self.validator_errors)
    }
}
