//! Template compiler and executor.
//!
//! Template text is plain SQL with actions between `{` and `}`:
//!
//! ```text
//! SELECT * FROM users
//! WHERE {and (expr "name" "=" "params.name") (optExpr "age" ">=" "params.age")}
//! ORDER BY {range $v := .params.sort}{if eq $v "created_at" "age"}{$v}, {end}{end}id
//! ```
//!
//! Rendered values become SQL text verbatim. Anything the caller supplies
//! for an identifier, such as a sort column, goes through an allow-list
//! (`eq`) first; values only ever reach the database through `expr`/`val`.
//!
//! Compilation resolves every function against the engine's
//! [`FunctionTable`](crate::FunctionTable) and checks arities, so a compiled
//! [`Template`] can no longer fail on its own structure. Execution parses the
//! parameter JSON, renders, and normalizes whitespace.

mod ast;
mod eval;
mod lexer;
mod parser;
mod printf;

use crate::config::EngineConfig;
use crate::error::{CompileError, ExecutionError};
use crate::format::clean_sql;
use crate::state::ExecutionState;
use crate::stmt::SqlStmt;
use crate::value::Value;
use crate::vars::Vars;
use ast::Node;
use eval::Evaluator;
use std::sync::Arc;

/// A compiled, immutable template.
///
/// Cheap to share: execute it from as many threads as needed, each call
/// gets its own [`ExecutionState`].
#[derive(Debug, Clone)]
pub struct Template {
    name: String,
    raw: String,
    nodes: Vec<Node>,
    config: Arc<EngineConfig>,
}

impl Template {
    pub(crate) fn compile(
        name: &str,
        text: &str,
        config: Arc<EngineConfig>,
    ) -> Result<Self, CompileError> {
        let nodes = parser::parse(name, text, &config.functions)?;
        tracing::debug!(
            template = name,
            nodes = ast::count_all(&nodes),
            "compiled template"
        );
        Ok(Self {
            name: name.to_string(),
            raw: text.to_string(),
            nodes,
            config,
        })
    }

    /// The name given at compile time.
    #[inline]
    #[must_use]
    pub fn name(&self) -> &str {
        &self.name
    }

    /// The template text.
    #[inline]
    #[must_use]
    pub fn raw(&self) -> &str {
        &self.raw
    }

    /// Render against a parameter JSON document.
    ///
    /// # Errors
    ///
    /// Fails only if the input exceeds the configured limits or is not valid
    /// JSON. Missing values, empty groups and failed checks are reported on
    /// the returned [`SqlStmt`] instead.
    ///
    /// # Examples
    ///
    /// ```
    /// let tpl = qsql::compile(
    ///     "find_users",
    ///     r#"SELECT * FROM users WHERE {expr "id" "IN" "params.ids"}"#,
    /// )
    /// .unwrap();
    ///
    /// let stmt = tpl.execute(r#"{"params": {"ids": [1, 2, 3]}}"#).unwrap();
    /// assert_eq!(stmt.sql, "SELECT * FROM users WHERE id IN (?, ?, ?)");
    /// assert_eq!(stmt.args.len(), 3);
    /// ```
    pub fn execute(&self, params: &str) -> Result<SqlStmt, ExecutionError> {
        self.config.limits.check(params)?;
        let doc: serde_json::Value = serde_json::from_str(params)?;

        let state = ExecutionState::new(
            Value::from(doc),
            self.config.placeholder,
            self.config.optional_expr,
        );
        let (text, state) = Evaluator::new(state).run(&self.nodes);
        let (args, errors, validator_errors) = state.into_parts();

        tracing::debug!(
            template = %self.name,
            args = args.len(),
            diagnostics = errors.len(),
            validator_errors = validator_errors.len(),
            "executed template"
        );
        if let Some(first) = errors.first() {
            tracing::warn!(
                template = %self.name,
                count = errors.len(),
                first = %first,
                "template rendered with diagnostics"
            );
        }

        Ok(SqlStmt {
            raw_template: self.raw.clone(),
            sql: clean_sql(&text),
            args,
            errors,
            validator_errors,
            placeholder: self.config.placeholder,
        })
    }

    /// Render against any parameter provider.
    ///
    /// # Errors
    ///
    /// See [`execute`](Self::execute).
    pub fn execute_vars<V: Vars + ?Sized>(&self, vars: &V) -> Result<SqlStmt, ExecutionError> {
        self.execute(&vars.json())
    }
}
