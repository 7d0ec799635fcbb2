//! Compiled template tree.
//!
//! Function names are resolved and arities checked while parsing, so the
//! evaluator never looks anything up by name.

use crate::funcs::Function;
use crate::value::Value;
use regex::Regex;

/// A node of the template body.
#[derive(Debug, Clone)]
pub enum Node {
    /// Verbatim text.
    Text(String),
    /// `{pipeline}`: evaluate and write the result.
    Output(Expr),
    /// `{if}...{else if}...{else}...{end}`.
    If {
        branches: Vec<Branch>,
        otherwise: Vec<Node>,
    },
    /// `{range [$k,] [$v :=] pipeline}...{else}...{end}`.
    Range {
        key: Option<String>,
        value: Option<String>,
        source: Expr,
        body: Vec<Node>,
        otherwise: Vec<Node>,
    },
}

/// One `if` / `else if` arm.
#[derive(Debug, Clone)]
pub struct Branch {
    pub condition: Expr,
    pub body: Vec<Node>,
}

/// An evaluable expression.
#[derive(Debug, Clone)]
pub enum Expr {
    /// String, number, `true`, `false` or `nil`.
    Literal(Value),
    /// `$name.field...`; an empty name is the root document.
    Variable { name: String, fields: Vec<String> },
    /// `.field...` relative to the current element.
    Dot { fields: Vec<String> },
    /// Function call, pipes already folded into the last argument.
    Call(Call),
}

/// A resolved function call.
#[derive(Debug, Clone)]
pub struct Call {
    pub name: String,
    pub function: Function,
    pub args: Vec<Expr>,
    /// Literal `regexCheck` pattern, compiled once.
    pub pattern: Option<Regex>,
}

impl Node {
    /// Nodes in this subtree, including itself.
    pub fn count(&self) -> usize {
        let nested = match self {
            Self::Text(_) | Self::Output(_) => 0,
            Self::If { branches, otherwise } => {
                branches.iter().map(|b| count_all(&b.body)).sum::<usize>() + count_all(otherwise)
            },
            Self::Range {
                body, otherwise, ..
            } => count_all(body) + count_all(otherwise),
        };
        nested + 1
    }
}

/// Nodes in a list of subtrees.
pub fn count_all(nodes: &[Node]) -> usize {
    nodes.iter().map(Node::count).sum()
}
