//! Centralized constants for the qsql crate.
//!
//! Limits and vocabulary names are defined here so that the compiler, the
//! evaluator and the configuration layer agree on them.

// ============================================================================
// PARAMETER DOCUMENT LIMITS
// ============================================================================

/// Maximum parameter JSON size (1MB) - prevents memory exhaustion.
pub const MAX_JSON_SIZE: usize = 1_000_000;

/// Maximum parameter JSON nesting depth.
///
/// Real-world parameter documents are shallow (`params.filters.0.value` is
/// four levels), so 20 leaves plenty of headroom.
pub const MAX_JSON_DEPTH: usize = 20;

// ============================================================================
// TEMPLATE SYNTAX
// ============================================================================

/// Opening action delimiter.
pub const LEFT_DELIM: char = '{';

/// Closing action delimiter.
pub const RIGHT_DELIM: char = '}';

/// Separator used to join path segments.
pub const PATH_SEPARATOR: char = '.';

// ============================================================================
// LOGIC WORDS
// ============================================================================

/// Word placed between fragments by `and`.
pub const LOGIC_AND: &str = "and";

/// Word placed between fragments by `or`.
pub const LOGIC_OR: &str = "or";
