//! The function vocabulary available to templates.
//!
//! A [`FunctionTable`] is an explicit configuration object handed to the
//! engine; templates compiled by that engine can only call the functions in
//! its table. Several engines with different tables can coexist.
//!
//! # Example
//!
//! ```
//! use qsql::{Arity, Engine, EngineConfig, FunctionTable, Value};
//!
//! let functions = FunctionTable::standard()
//!     .remove("val")
//!     .register("upper", Arity::exactly(1), |_state, args| {
//!         Value::from(args[0].to_string().to_uppercase())
//!     });
//!
//! let engine = Engine::new(EngineConfig::default().functions(functions));
//! assert!(engine.compile("q", "LIMIT {val \"params.limit\"}").is_err());
//!
//! let tpl = engine.compile("q", "SELECT '{upper \"abc\"}'").unwrap();
//! assert_eq!(tpl.execute("{}").unwrap().sql, "SELECT 'ABC'");
//! ```

use crate::state::ExecutionState;
use crate::value::Value;
use std::collections::HashMap;
use std::fmt;
use std::sync::Arc;

/// Accepted argument counts.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Arity {
    /// Minimum number of arguments.
    pub min: usize,
    /// Maximum number of arguments, `None` if variadic.
    pub max: Option<usize>,
}

impl Arity {
    /// Exactly `n` arguments.
    #[must_use]
    pub const fn exactly(n: usize) -> Self {
        Self {
            min: n,
            max: Some(n),
        }
    }

    /// At least `n` arguments.
    #[must_use]
    pub const fn at_least(n: usize) -> Self {
        Self { min: n, max: None }
    }

    /// Any number of arguments.
    #[must_use]
    pub const fn variadic() -> Self {
        Self::at_least(0)
    }

    /// Does `n` arguments satisfy this arity?
    #[must_use]
    pub fn accepts(self, n: usize) -> bool {
        n >= self.min && self.max.is_none_or(|max| n <= max)
    }
}

impl fmt::Display for Arity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.max {
            Some(max) if max == self.min => write!(f, "{max}"),
            Some(max) => write!(f, "{} to {max}", self.min),
            None => write!(f, "at least {}", self.min),
        }
    }
}

/// Built-in template functions.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Builtin {
    /// `expr field op path...`: required condition.
    Expr,
    /// `optExpr field op path...`: optional condition.
    OptExpr,
    /// `and cond...`
    And,
    /// `or cond...`
    Or,
    /// `val path...`: bind a value.
    Val,
    /// `getValue path...`
    GetValue,
    /// `isEmpty value`
    IsEmpty,
    /// `not value`
    Not,
    /// `eq a b...`: true if `a` equals any of the rest.
    Eq,
    /// `ne a b`
    Ne,
    /// `len value`
    Len,
    /// `printf format args...`
    Printf,
    /// `requiredCheck fieldName code message path...`
    RequiredCheck,
    /// `strCheck fieldName code message path...`
    StrCheck,
    /// `intCheck fieldName code message path...`
    IntCheck,
    /// `floatCheck fieldName code message path...`
    FloatCheck,
    /// `regexCheck pattern fieldName code message path...`
    RegexCheck,
    /// `strLenCheck min max fieldName code message path...`
    StrLenCheck,
    /// `arrLenCheck min max fieldName code message path...`
    ArrLenCheck,
}

impl Builtin {
    /// Every built-in, in registration order.
    pub const ALL: [Self; 19] = [
        Self::Expr,
        Self::OptExpr,
        Self::And,
        Self::Or,
        Self::Val,
        Self::GetValue,
        Self::IsEmpty,
        Self::Not,
        Self::Eq,
        Self::Ne,
        Self::Len,
        Self::Printf,
        Self::RequiredCheck,
        Self::StrCheck,
        Self::IntCheck,
        Self::FloatCheck,
        Self::RegexCheck,
        Self::StrLenCheck,
        Self::ArrLenCheck,
    ];

    /// The name templates call it by.
    #[must_use]
    pub const fn name(self) -> &'static str {
        match self {
            Self::Expr => "expr",
            Self::OptExpr => "optExpr",
            Self::And => "and",
            Self::Or => "or",
            Self::Val => "val",
            Self::GetValue => "getValue",
            Self::IsEmpty => "isEmpty",
            Self::Not => "not",
            Self::Eq => "eq",
            Self::Ne => "ne",
            Self::Len => "len",
            Self::Printf => "printf",
            Self::RequiredCheck => "requiredCheck",
            Self::StrCheck => "strCheck",
            Self::IntCheck => "intCheck",
            Self::FloatCheck => "floatCheck",
            Self::RegexCheck => "regexCheck",
            Self::StrLenCheck => "strLenCheck",
            Self::ArrLenCheck => "arrLenCheck",
        }
    }

    /// Argument counts checked at compile time.
    #[must_use]
    pub const fn arity(self) -> Arity {
        match self {
            Self::Expr | Self::OptExpr | Self::And | Self::Or | Self::Val | Self::GetValue => {
                Arity::variadic()
            },
            Self::IsEmpty | Self::Not | Self::Len => Arity::exactly(1),
            Self::Eq => Arity::at_least(2),
            Self::Ne => Arity::exactly(2),
            Self::Printf => Arity::at_least(1),
            Self::RequiredCheck | Self::StrCheck | Self::IntCheck | Self::FloatCheck => {
                Arity::at_least(3)
            },
            Self::RegexCheck => Arity::at_least(4),
            Self::StrLenCheck | Self::ArrLenCheck => Arity::at_least(5),
        }
    }
}

/// Signature of a user-registered function.
pub type CustomFn = dyn Fn(&mut ExecutionState, &[Value]) -> Value + Send + Sync;

/// A callable entry in a [`FunctionTable`].
#[derive(Clone)]
pub enum Function {
    /// One of the built-in functions.
    Builtin(Builtin),
    /// A user-registered function.
    Custom {
        /// Accepted argument counts.
        arity: Arity,
        /// The implementation.
        func: Arc<CustomFn>,
    },
}

impl Function {
    /// Argument counts checked at compile time.
    #[must_use]
    pub const fn arity(&self) -> Arity {
        match self {
            Self::Builtin(builtin) => builtin.arity(),
            Self::Custom { arity, .. } => *arity,
        }
    }
}

impl fmt::Debug for Function {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Builtin(builtin) => f.debug_tuple("Builtin").field(builtin).finish(),
            Self::Custom { arity, .. } => f.debug_struct("Custom").field("arity", arity).finish(),
        }
    }
}

/// Named functions a template may call.
#[derive(Clone)]
pub struct FunctionTable {
    entries: HashMap<String, Function>,
}

impl FunctionTable {
    /// A table with no functions.
    #[must_use]
    pub fn empty() -> Self {
        Self {
            entries: HashMap::new(),
        }
    }

    /// The standard vocabulary: every [`Builtin`].
    #[must_use]
    pub fn standard() -> Self {
        let entries = Builtin::ALL
            .iter()
            .map(|b| (b.name().to_string(), Function::Builtin(*b)))
            .collect();
        Self { entries }
    }

    /// Add (or replace) a custom function.
    #[must_use]
    pub fn register<F>(mut self, name: impl Into<String>, arity: Arity, func: F) -> Self
    where
        F: Fn(&mut ExecutionState, &[Value]) -> Value + Send + Sync + 'static,
    {
        self.entries.insert(
            name.into(),
            Function::Custom {
                arity,
                func: Arc::new(func),
            },
        );
        self
    }

    /// Add (or replace) a built-in under a name of your choosing.
    #[must_use]
    pub fn alias(mut self, name: impl Into<String>, builtin: Builtin) -> Self {
        self.entries.insert(name.into(), Function::Builtin(builtin));
        self
    }

    /// Remove a function by name.
    #[must_use]
    pub fn remove(mut self, name: &str) -> Self {
        self.entries.remove(name);
        self
    }

    /// Look up a function by name.
    #[must_use]
    pub fn get(&self, name: &str) -> Option<&Function> {
        self.entries.get(name)
    }

    /// Registered names, sorted.
    #[must_use]
    pub fn names(&self) -> Vec<&str> {
        let mut names: Vec<&str> = self.entries.keys().map(String::as_str).collect();
        names.sort_unstable();
        names
    }
}

impl Default for FunctionTable {
    fn default() -> Self {
        Self::standard()
    }
}

impl fmt::Debug for FunctionTable {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("FunctionTable")
            .field("names", &self.names())
            .finish()
    }
}
