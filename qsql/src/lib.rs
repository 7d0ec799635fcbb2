//! # qsql
//!
//! Template-driven dynamic SQL. A template is SQL text with `{ }` actions
//! that call a small function vocabulary; executing it against a JSON
//! parameter document yields parameterized SQL plus the positional argument
//! list for a prepared statement. Untrusted values are only ever bound, never
//! spliced into the text.
//!
//! ```
//! let tpl = qsql::compile(
//!     "search",
//!     r#"
//!     SELECT * FROM users
//!     WHERE {and (expr "name" "=" "params.name") (or (expr "age" ">" "params.min") (expr "vip" "=" "params.vip"))}
//!     LIMIT {val "params.limit"}
//!     "#,
//! )
//! .unwrap();
//!
//! let stmt = tpl
//!     .execute(r#"{"params": {"name": "张三", "min": 18, "vip": true, "limit": 10}}"#)
//!     .unwrap();
//!
//! assert_eq!(
//!     stmt.sql,
//!     "SELECT * FROM users WHERE (name = ? and (age > ? or vip = ?)) LIMIT ?"
//! );
//! assert_eq!(stmt.args.len(), 4);
//! assert!(!stmt.has_errors());
//! ```
//!
//! ## Functions
//!
//! | Function | Renders |
//! |----------|---------|
//! | `expr field op path...` | `field op ?`, `field IN (?, ?)`, `field BETWEEN ? AND ?` |
//! | `optExpr field op path...` | like `expr`, missing values are not diagnosed |
//! | `and cond...` / `or cond...` | parenthesized join of the non-empty conditions |
//! | `val path...` | `?` bound to the value (literals only, never identifiers) |
//! | `getValue path...` | the value itself, for `if` and `range` |
//! | `isEmpty v`, `not v`, `eq a b...`, `ne a b`, `len v`, `printf fmt args...` | helpers |
//! | `requiredCheck`, `strCheck`, `intCheck`, `floatCheck` | nothing; records failures |
//! | `regexCheck`, `strLenCheck`, `arrLenCheck` | nothing; records failures |
//!
//! ## Errors
//!
//! Compilation fails with [`CompileError`]; execution fails with
//! [`ExecutionError`] only for unusable input. Everything else accumulates on
//! the [`SqlStmt`]: generation [`Diagnostic`]s in `errors` and failed checks
//! in `validator_errors`. Check both before running the statement.

pub mod constants;
pub mod path;

mod config;
mod dialect;
mod error;
mod expr;
mod format;
mod funcs;
mod inject;
mod logic;
mod state;
mod stmt;
mod template;
mod validate;
mod value;
mod vars;

pub use config::{EngineConfig, EngineSettings, Limits, OptionalExpr};
pub use dialect::Placeholder;
pub use error::{CompileError, ExecutionError};
pub use expr::OperatorKind;
pub use format::clean_sql;
pub use funcs::{Arity, Builtin, CustomFn, Function, FunctionTable};
pub use logic::Logic;
pub use state::{Diagnostic, ExecutionState};
pub use stmt::SqlStmt;
pub use template::Template;
pub use validate::{CheckKind, ValidatorError};
pub use value::Value;
pub use vars::{JsonVars, ValueVars, Vars};

use std::sync::Arc;

/// Compiles templates against one shared configuration.
///
/// ```
/// use qsql::{Engine, EngineConfig, Placeholder};
///
/// let engine = Engine::new(EngineConfig::default().placeholder(Placeholder::Dollar));
/// let tpl = engine
///     .compile("q", r#"SELECT * FROM t WHERE {expr "a" "BETWEEN" "params.r"}"#)
///     .unwrap();
///
/// let stmt = tpl.execute(r#"{"params": {"r": [1, 9]}}"#).unwrap();
/// assert_eq!(stmt.sql, "SELECT * FROM t WHERE a BETWEEN $1 AND $2");
/// ```
#[derive(Debug, Clone, Default)]
pub struct Engine {
    config: Arc<EngineConfig>,
}

impl Engine {
    /// An engine with the given configuration.
    #[must_use]
    pub fn new(config: EngineConfig) -> Self {
        Self {
            config: Arc::new(config),
        }
    }

    /// The configuration templates from this engine share.
    #[must_use]
    pub fn config(&self) -> &EngineConfig {
        &self.config
    }

    /// Compile template text.
    ///
    /// # Errors
    ///
    /// [`CompileError`] on malformed syntax, unknown functions, wrong
    /// argument counts, unbalanced blocks, undefined variables or invalid
    /// literal regex patterns.
    pub fn compile(&self, name: &str, text: &str) -> Result<Template, CompileError> {
        Template::compile(name, text, Arc::clone(&self.config))
    }
}

/// Compile with the default configuration.
///
/// # Errors
///
/// See [`Engine::compile`].
pub fn compile(name: &str, text: &str) -> Result<Template, CompileError> {
    Engine::default().compile(name, text)
}
