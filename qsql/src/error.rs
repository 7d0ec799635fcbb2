//! Fatal errors: template compilation and parameter parsing.
//!
//! Everything else (missing values, empty groups, failed checks) is
//! accumulated on the statement instead; see [`Diagnostic`](crate::Diagnostic)
//! and [`ValidatorError`](crate::ValidatorError).

use thiserror::Error;

/// A template could not be compiled.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[non_exhaustive]
pub enum CompileError {
    /// Malformed action, literal or delimiter.
    #[error("{name}:{line}:{column}: {message}")]
    Syntax {
        /// Template name.
        name: String,
        /// 1-based line.
        line: usize,
        /// 1-based column, in characters.
        column: usize,
        /// What went wrong.
        message: String,
    },

    /// Call to a function missing from the engine's table.
    #[error("{name}: function \"{function}\" not defined{}", did_you_mean(.suggestion))]
    UnknownFunction {
        /// Template name.
        name: String,
        /// The called name.
        function: String,
        /// Closest registered name, if any is close.
        suggestion: Option<String>,
    },

    /// Wrong number of arguments.
    #[error("{name}: wrong number of args for {function}: want {expected} got {got}")]
    Arity {
        /// Template name.
        name: String,
        /// The called name.
        function: String,
        /// Accepted counts, human readable.
        expected: String,
        /// Supplied count.
        got: usize,
    },

    /// A literal `regexCheck` pattern does not compile.
    #[error("{name}: invalid regexCheck pattern {pattern:?}: {message}")]
    InvalidRegex {
        /// Template name.
        name: String,
        /// The pattern.
        pattern: String,
        /// Regex engine message.
        message: String,
    },

    /// `if`/`range`/`else`/`end` do not pair up.
    #[error("{name}: {message}")]
    UnbalancedBlock {
        /// Template name.
        name: String,
        /// What went wrong.
        message: String,
    },

    /// Reference to a `$variable` that no enclosing `range` declares.
    #[error("{name}: undefined variable \"${variable}\"")]
    UndefinedVariable {
        /// Template name.
        name: String,
        /// Variable name without the `$`.
        variable: String,
    },
}

/// A compiled template could not run against the given parameters.
#[derive(Debug, Error)]
#[non_exhaustive]
pub enum ExecutionError {
    /// The parameter document is not valid JSON.
    #[error("invalid parameter JSON: {0}")]
    InvalidJson(#[from] serde_json::Error),

    /// The parameter document exceeds the configured size.
    #[error("parameter JSON is {size} bytes, limit is {max}")]
    InputTooLarge {
        /// Input size in bytes.
        size: usize,
        /// Configured maximum.
        max: usize,
    },

    /// The parameter document nests deeper than the configured depth.
    #[error("parameter JSON nests deeper than {max} levels")]
    NestingTooDeep {
        /// Configured maximum.
        max: usize,
    },
}

// =============================================================================
// FUZZY MATCHING ("DID YOU MEAN?")
// =============================================================================

/// Levenshtein edit distance, by characters.
fn levenshtein_distance(a: &str, b: &str) -> usize {
    let b_chars: Vec<char> = b.chars().collect();
    let mut prev_row: Vec<usize> = (0..=b_chars.len()).collect();

    for (i, a_char) in a.chars().enumerate() {
        let mut curr_row = Vec::with_capacity(prev_row.len());
        curr_row.push(i + 1);
        for (pair, b_char) in prev_row.windows(2).zip(&b_chars) {
            if let &[diagonal, above] = pair {
                let left = curr_row.last().copied().unwrap_or(0);
                let cost = usize::from(a_char != *b_char);
                curr_row.push((above + 1).min(left + 1).min(diagonal + cost));
            }
        }
        prev_row = curr_row;
    }

    prev_row.last().copied().unwrap_or(0)
}

/// Find the registered name closest to `input`, if it is close enough.
pub(crate) fn find_similar<'a>(input: &str, options: &[&'a str]) -> Option<&'a str> {
    let threshold = (input.chars().count() / 2).clamp(2, 4);

    options
        .iter()
        .map(|opt| (*opt, levenshtein_distance(input, opt)))
        .filter(|(_, dist)| *dist <= threshold && *dist > 0)
        .min_by_key(|(_, dist)| *dist)
        .map(|(opt, _)| opt)
}

#[allow(clippy::ref_option)]
fn did_you_mean(suggestion: &Option<String>) -> String {
    suggestion
        .as_ref()
        .map_or_else(String::new, |s| format!(", did you mean \"{s}\"?"))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_levenshtein() {
        assert_eq!(levenshtein_distance("expr", "expr"), 0);
        assert_eq!(levenshtein_distance("exp", "expr"), 1);
        assert_eq!(levenshtein_distance("", "abc"), 3);
        assert_eq!(levenshtein_distance("kitten", "sitting"), 3);
    }

    #[test]
    fn test_find_similar() {
        let names = ["expr", "optExpr", "strCheck", "strLenCheck"];
        assert_eq!(find_similar("exrp", &names), Some("expr"));
        assert_eq!(find_similar("strChek", &names), Some("strCheck"));
        assert_eq!(find_similar("zzzzzzzz", &names), None);
        assert_eq!(find_similar("expr", &names), None);
    }

    #[test]
    fn test_unknown_function_message() {
        let err = CompileError::UnknownFunction {
            name: "users".into(),
            function: "exrp".into(),
            suggestion: Some("expr".into()),
        };
        assert_eq!(
            err.to_string(),
            "users: function \"exrp\" not defined, did you mean \"expr\"?"
        );

        let err = CompileError::UnknownFunction {
            name: "users".into(),
            function: "nope".into(),
            suggestion: None,
        };
        assert_eq!(err.to_string(), "users: function \"nope\" not defined");
    }

    #[test]
    fn test_syntax_message_has_position() {
        let err = CompileError::Syntax {
            name: "t".into(),
            line: 2,
            column: 7,
            message: "unclosed action".into(),
        };
        assert_eq!(err.to_string(), "t:2:7: unclosed action");
    }

    #[test]
    fn test_execution_error_from_serde() {
        let parse_err = serde_json::from_str::<serde_json::Value>("{").unwrap_err();
        let err = ExecutionError::from(parse_err);
        assert!(err.to_string().starts_with("invalid parameter JSON"));
    }
}
