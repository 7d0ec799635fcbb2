//! Logical combinator behind `and` and `or`.

use crate::constants::{LOGIC_AND, LOGIC_OR};
use crate::state::{Diagnostic, ExecutionState};
use crate::value::Value;
use std::fmt;

/// Logical operators for compound conditions.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Logic {
    /// All conditions must match: `and`
    And,
    /// At least one condition must match: `or`
    Or,
}

impl Logic {
    /// The word placed between fragments.
    #[inline]
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::And => LOGIC_AND,
            Self::Or => LOGIC_OR,
        }
    }
}

impl fmt::Display for Logic {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Join fragments with `logic`, dropping blank ones.
///
/// - no surviving fragment: empty string and an [`Diagnostic::EmptyGroup`]
/// - one: `(<fragment>)`
/// - several: `(<f1> <logic> <f2> ...)`
///
/// No `1=1` is substituted for an empty group; the enclosing template has to
/// carry its own base predicate.
pub fn combine(state: &mut ExecutionState, logic: Logic, fragments: &[Value]) -> String {
    let rendered: Vec<String> = fragments.iter().map(Value::to_string).collect();
    let valid: Vec<&str> = rendered
        .iter()
        .map(|f| f.trim())
        .filter(|f| !f.is_empty())
        .collect();

    if valid.is_empty() {
        state.diagnose(Diagnostic::EmptyGroup { logic });
        return String::new();
    }

    let separator = format!(" {logic} ");
    format!("({})", valid.join(&separator))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::OptionalExpr;
    use crate::dialect::Placeholder;

    fn state() -> ExecutionState {
        ExecutionState::new(Value::Null, Placeholder::Question, OptionalExpr::Emit)
    }

    fn fragments(items: &[&str]) -> Vec<Value> {
        items.iter().map(|s| Value::from(*s)).collect()
    }

    #[test]
    fn test_no_conditions() {
        let mut s = state();
        assert_eq!(combine(&mut s, Logic::And, &[]), "");
        assert_eq!(s.diagnostics(), &[Diagnostic::EmptyGroup { logic: Logic::And }]);
    }

    #[test]
    fn test_all_blank_conditions() {
        let mut s = state();
        assert_eq!(combine(&mut s, Logic::Or, &fragments(&["", "  ", ""])), "");
        assert_eq!(s.diagnostics().len(), 1);
    }

    #[test]
    fn test_single_condition_is_parenthesized() {
        let mut s = state();
        assert_eq!(combine(&mut s, Logic::And, &fragments(&["name = ?"])), "(name = ?)");
        assert!(s.diagnostics().is_empty());
    }

    #[test]
    fn test_multiple_conditions() {
        let mut s = state();
        assert_eq!(
            combine(&mut s, Logic::And, &fragments(&["a = ?", "b = ?", "c = ?"])),
            "(a = ? and b = ? and c = ?)"
        );
        assert_eq!(
            combine(&mut s, Logic::Or, &fragments(&["name = ?", "age > ?"])),
            "(name = ? or age > ?)"
        );
    }

    #[test]
    fn test_blank_conditions_are_dropped() {
        let mut s = state();
        assert_eq!(
            combine(&mut s, Logic::And, &fragments(&["name = ?", "", " age > ? ", "  "])),
            "(name = ? and age > ?)"
        );
        assert!(s.diagnostics().is_empty());
    }

    #[test]
    fn test_nested_groups_balance() {
        let mut s = state();
        let inner = combine(&mut s, Logic::Or, &fragments(&["a = ?", "b = ?"]));
        let outer = combine(&mut s, Logic::And, &[Value::from("c = ?"), Value::from(inner)]);
        assert_eq!(outer, "(c = ? and (a = ? or b = ?))");
    }
}
