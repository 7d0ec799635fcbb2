//! Engine configuration.
//!
//! [`EngineConfig`] is built once and handed to [`Engine::new`](crate::Engine::new);
//! every template compiled by that engine shares it read-only. The
//! serializable subset lives in [`EngineSettings`] so it can be loaded from
//! TOML or JSON.

use crate::constants::{MAX_JSON_DEPTH, MAX_JSON_SIZE};
use crate::dialect::Placeholder;
use crate::error::ExecutionError;
use crate::funcs::FunctionTable;
use serde::{Deserialize, Serialize};

/// How `optExpr` renders when its value path is absent.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum OptionalExpr {
    /// Render like `expr` (one `NULL`-bound placeholder), without a diagnostic.
    #[default]
    Emit,
    /// Render an empty fragment and bind nothing, so an enclosing `and`/`or`
    /// drops the condition.
    Suppress,
}

/// Resource bounds applied to parameter JSON before parsing.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct Limits {
    /// Maximum input size in bytes.
    pub max_input_bytes: usize,
    /// Maximum nesting depth of arrays and objects.
    pub max_depth: usize,
}

impl Limits {
    /// Reject input that is too large or nests too deep, without parsing it.
    ///
    /// # Errors
    ///
    /// [`ExecutionError::InputTooLarge`] or [`ExecutionError::NestingTooDeep`].
    pub fn check(&self, input: &str) -> Result<(), ExecutionError> {
        if input.len() > self.max_input_bytes {
            return Err(ExecutionError::InputTooLarge {
                size: input.len(),
                max: self.max_input_bytes,
            });
        }
        if depth_exceeds(input.as_bytes(), self.max_depth) {
            return Err(ExecutionError::NestingTooDeep {
                max: self.max_depth,
            });
        }
        Ok(())
    }
}

/// Scan for bracket nesting deeper than `max`, skipping string contents.
fn depth_exceeds(data: &[u8], max: usize) -> bool {
    let mut depth: usize = 0;
    let mut in_string = false;
    let mut escape = false;

    for &byte in data {
        if escape {
            escape = false;
            continue;
        }

        match byte {
            b'\\' if in_string => escape = true,
            b'"' => in_string = !in_string,
            b'[' | b'{' if !in_string => {
                depth += 1;
                if depth > max {
                    return true;
                }
            },
            b']' | b'}' if !in_string => {
                depth = depth.saturating_sub(1);
            },
            _ => {},
        }
    }

    false
}

impl Default for Limits {
    fn default() -> Self {
        Self {
            max_input_bytes: MAX_JSON_SIZE,
            max_depth: MAX_JSON_DEPTH,
        }
    }
}

/// The serializable part of [`EngineConfig`].
///
/// ```
/// use qsql::{EngineSettings, OptionalExpr, Placeholder};
///
/// let settings: EngineSettings =
///     serde_json::from_str(r#"{"placeholder": "dollar", "optional_expr": "suppress"}"#).unwrap();
/// assert_eq!(settings.placeholder, Placeholder::Dollar);
/// assert_eq!(settings.optional_expr, OptionalExpr::Suppress);
/// assert_eq!(settings.limits.max_depth, 20);
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct EngineSettings {
    /// Placeholder style.
    pub placeholder: Placeholder,
    /// Input bounds.
    pub limits: Limits,
    /// `optExpr` behavior on missing values.
    pub optional_expr: OptionalExpr,
}

/// Everything an [`Engine`](crate::Engine) needs to compile and run templates.
#[derive(Debug, Clone, Default)]
pub struct EngineConfig {
    /// Functions templates may call.
    pub functions: FunctionTable,
    /// Placeholder style.
    pub placeholder: Placeholder,
    /// Input bounds.
    pub limits: Limits,
    /// `optExpr` behavior on missing values.
    pub optional_expr: OptionalExpr,
}

impl EngineConfig {
    /// Standard functions plus the given settings.
    #[must_use]
    pub fn from_settings(settings: EngineSettings) -> Self {
        Self {
            functions: FunctionTable::standard(),
            placeholder: settings.placeholder,
            limits: settings.limits,
            optional_expr: settings.optional_expr,
        }
    }

    /// Replace the function table.
    #[must_use]
    pub fn functions(mut self, functions: FunctionTable) -> Self {
        self.functions = functions;
        self
    }

    /// Set the placeholder style.
    #[must_use]
    pub const fn placeholder(mut self, placeholder: Placeholder) -> Self {
        self.placeholder = placeholder;
        self
    }

    /// Set the input bounds.
    #[must_use]
    pub const fn limits(mut self, limits: Limits) -> Self {
        self.limits = limits;
        self
    }

    /// Set `optExpr` behavior.
    #[must_use]
    pub const fn optional_expr(mut self, optional_expr: OptionalExpr) -> Self {
        self.optional_expr = optional_expr;
        self
    }

    /// The serializable part of this configuration.
    #[must_use]
    pub const fn settings(&self) -> EngineSettings {
        EngineSettings {
            placeholder: self.placeholder,
            limits: self.limits,
            optional_expr: self.optional_expr,
        }
    }
}
