//! The result of one execution.

use crate::dialect::Placeholder;
use crate::state::Diagnostic;
use crate::validate::ValidatorError;
use crate::value::Value;
use serde::Serialize;

/// A rendered statement ready for a prepared-statement call.
///
/// `sql` carries exactly one placeholder per entry in `args`, in order.
/// Check [`has_errors`](Self::has_errors) and
/// [`has_validator_errors`](Self::has_validator_errors) before running it
/// against a database: generation never aborts, so a statement with
/// diagnostics is still well-formed but may bind `NULL` where a value was
/// expected.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SqlStmt {
    /// The template text this statement was rendered from.
    pub raw_template: String,
    /// Rendered, whitespace-normalized SQL.
    pub sql: String,
    /// Bound arguments in placeholder order.
    pub args: Vec<Value>,
    /// Generation diagnostics in evaluation order.
    pub errors: Vec<Diagnostic>,
    /// Failed field checks in evaluation order.
    pub validator_errors: Vec<ValidatorError>,
    #[serde(skip)]
    pub(crate) placeholder: Placeholder,
}

impl SqlStmt {
    /// Were any generation diagnostics recorded?
    #[inline]
    #[must_use]
    pub fn has_errors(&self) -> bool {
        !self.errors.is_empty()
    }

    /// Did any field check fail?
    #[inline]
    #[must_use]
    pub fn has_validator_errors(&self) -> bool {
        !self.validator_errors.is_empty()
    }

    /// Placeholders in `sql`, ignoring any inside single-quoted literals.
    #[must_use]
    pub fn placeholder_count(&self) -> usize {
        self.placeholder.count(&self.sql)
    }

    /// SQL text and arguments, for handing to a driver.
    #[must_use]
    pub fn into_parts(self) -> (String, Vec<Value>) {
        (self.sql, self.args)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn stmt(sql: &str, args: Vec<Value>) -> SqlStmt {
        SqlStmt {
            raw_template: String::new(),
            sql: sql.to_string(),
            args,
            errors: Vec::new(),
            validator_errors: Vec::new(),
            placeholder: Placeholder::Question,
        }
    }

    #[test]
    fn test_predicates() {
        let mut s = stmt("SELECT 1", Vec::new());
        assert!(!s.has_errors());
        assert!(!s.has_validator_errors());
        s.errors.push(Diagnostic::RangeOverScalar { kind: "number" });
        assert!(s.has_errors());
    }

    #[test]
    fn test_placeholder_count_skips_literals() {
        let s = stmt("SELECT '?' FROM t WHERE a = ? AND b = ?", vec![1.into(), 2.into()]);
        assert_eq!(s.placeholder_count(), 2);
    }

    #[test]
    fn test_serializes_without_placeholder_style() {
        let s = stmt("SELECT ?", vec![Value::from("x")]);
        let json = serde_json::to_value(&s).unwrap();
        assert_eq!(
            json,
            serde_json::json!({
                "raw_template": "",
                "sql": "SELECT ?",
                "args": ["x"],
                "errors": [],
                "validator_errors": []
            })
        );
    }

    #[test]
    fn test_into_parts() {
        let (sql, args) = stmt("LIMIT ?", vec![10.into()]).into_parts();
        assert_eq!(sql, "LIMIT ?");
        assert_eq!(args, vec![Value::Number(10.0)]);
    }
}
