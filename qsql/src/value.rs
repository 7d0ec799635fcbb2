//! Dynamic values flowing through template evaluation.
//!
//! Every value resolved from the parameter document, every literal in a
//! template and every bound argument is a [`Value`]. JSON numbers are always
//! parsed as `f64`, so there is no separate integer variant.

use serde::ser::{Serialize, SerializeMap, SerializeSeq, Serializer};
use std::collections::BTreeMap;
use std::fmt;

/// Largest integer that round-trips through `f64` without loss (2^53).
const MAX_SAFE_INT: f64 = 9_007_199_254_740_992.0;

/// A JSON-shaped value.
#[derive(Debug, Clone, PartialEq, Default)]
pub enum Value {
    /// JSON `null`, also used for absent values bound as arguments.
    #[default]
    Null,
    /// JSON boolean.
    Bool(bool),
    /// JSON number. Integers are represented exactly up to 2^53.
    Number(f64),
    /// JSON string.
    String(String),
    /// JSON array.
    Array(Vec<Value>),
    /// JSON object, iterated in key order.
    Object(BTreeMap<String, Value>),
}

impl Value {
    /// Short type name used in diagnostics.
    #[must_use]
    pub const fn type_name(&self) -> &'static str {
        match self {
            Self::Null => "null",
            Self::Bool(_) => "bool",
            Self::Number(_) => "number",
            Self::String(_) => "string",
            Self::Array(_) => "array",
            Self::Object(_) => "object",
        }
    }

    /// Is this value `null`?
    #[must_use]
    pub const fn is_null(&self) -> bool {
        matches!(self, Self::Null)
    }

    /// As string slice, `None` if not a string.
    #[must_use]
    pub fn as_str(&self) -> Option<&str> {
        match self {
            Self::String(s) => Some(s),
            _ => None,
        }
    }

    /// As number, `None` if not a number.
    #[must_use]
    pub const fn as_f64(&self) -> Option<f64> {
        match self {
            Self::Number(n) => Some(*n),
            _ => None,
        }
    }

    /// As array slice, `None` if not an array.
    #[must_use]
    pub fn as_array(&self) -> Option<&[Value]> {
        match self {
            Self::Array(items) => Some(items),
            _ => None,
        }
    }

    /// Integral value of a number, if it has no fractional part and fits
    /// in the exactly-representable range.
    #[must_use]
    pub fn as_integer(&self) -> Option<i64> {
        match self {
            Self::Number(n) => integral(*n),
            _ => None,
        }
    }

    /// Template truthiness: `null`, `false`, `0`, and empty strings, arrays
    /// and objects are false.
    #[must_use]
    pub fn is_truthy(&self) -> bool {
        match self {
            Self::Null => false,
            Self::Bool(b) => *b,
            Self::Number(n) => *n != 0.0,
            Self::String(s) => !s.is_empty(),
            Self::Array(items) => !items.is_empty(),
            Self::Object(map) => !map.is_empty(),
        }
    }

    /// The `isEmpty` predicate.
    ///
    /// Differs from truthiness on numbers: `0` is not empty.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        match self {
            Self::Null => true,
            Self::Bool(b) => !b,
            Self::Number(_) => false,
            Self::String(s) => s.is_empty(),
            Self::Array(items) => items.is_empty(),
            Self::Object(map) => map.is_empty(),
        }
    }

    /// Length of a string (in UTF-8 bytes), array or object.
    #[must_use]
    pub fn len(&self) -> Option<usize> {
        match self {
            Self::String(s) => Some(s.len()),
            Self::Array(items) => Some(items.len()),
            Self::Object(map) => Some(map.len()),
            _ => None,
        }
    }

    /// Render as a path segment: strings verbatim, integral numbers without
    /// a fractional part.
    #[must_use]
    pub fn to_segment(&self) -> String {
        self.to_string()
    }
}

/// Integral value of `n` when it is exactly representable.
#[allow(clippy::cast_possible_truncation)]
fn integral(n: f64) -> Option<i64> {
    if n.is_finite() && n.fract() == 0.0 && n.abs() <= MAX_SAFE_INT {
        Some(n as i64)
    } else {
        None
    }
}

/// Renders the value the way it appears in generated text.
///
/// `null` renders empty; arrays and objects render as compact JSON.
impl fmt::Display for Value {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Null => Ok(()),
            Self::Bool(b) => write!(f, "{b}"),
            Self::Number(n) => match integral(*n) {
                Some(i) => write!(f, "{i}"),
                None => write!(f, "{n}"),
            },
            Self::String(s) => f.write_str(s),
            Self::Array(_) | Self::Object(_) => {
                let json = serde_json::to_string(self).map_err(|_| fmt::Error)?;
                f.write_str(&json)
            },
        }
    }
}

impl Serialize for Value {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        match self {
            Self::Null => serializer.serialize_unit(),
            Self::Bool(b) => serializer.serialize_bool(*b),
            Self::Number(n) => match integral(*n) {
                Some(i) => serializer.serialize_i64(i),
                None => serializer.serialize_f64(*n),
            },
            Self::String(s) => serializer.serialize_str(s),
            Self::Array(items) => {
                let mut seq = serializer.serialize_seq(Some(items.len()))?;
                for item in items {
                    seq.serialize_element(item)?;
                }
                seq.end()
            },
            Self::Object(map) => {
                let mut out = serializer.serialize_map(Some(map.len()))?;
                for (key, value) in map {
                    out.serialize_entry(key, value)?;
                }
                out.end()
            },
        }
    }
}

impl From<serde_json::Value> for Value {
    fn from(value: serde_json::Value) -> Self {
        match value {
            serde_json::Value::Null => Self::Null,
            serde_json::Value::Bool(b) => Self::Bool(b),
            serde_json::Value::Number(n) => n.as_f64().map_or(Self::Null, Self::Number),
            serde_json::Value::String(s) => Self::String(s),
            serde_json::Value::Array(items) => {
                Self::Array(items.into_iter().map(Self::from).collect())
            },
            serde_json::Value::Object(map) => {
                Self::Object(map.into_iter().map(|(k, v)| (k, Self::from(v))).collect())
            },
        }
    }
}

impl From<&str> for Value {
    #[inline]
    fn from(value: &str) -> Self {
        Self::String(value.to_string())
    }
}

impl From<String> for Value {
    #[inline]
    fn from(value: String) -> Self {
        Self::String(value)
    }
}

impl From<bool> for Value {
    #[inline]
    fn from(value: bool) -> Self {
        Self::Bool(value)
    }
}

impl From<f64> for Value {
    #[inline]
    fn from(value: f64) -> Self {
        Self::Number(value)
    }
}

impl From<i32> for Value {
    #[inline]
    fn from(value: i32) -> Self {
        Self::Number(f64::from(value))
    }
}

impl From<usize> for Value {
    #[inline]
    #[allow(clippy::cast_precision_loss)]
    fn from(value: usize) -> Self {
        Self::Number(value as f64)
    }
}

impl<T: Into<Value>> From<Vec<T>> for Value {
    fn from(values: Vec<T>) -> Self {
        Self::Array(values.into_iter().map(Into::into).collect())
    }
}

impl<T: Into<Value>> From<Option<T>> for Value {
    fn from(value: Option<T>) -> Self {
        value.map_or(Self::Null, Into::into)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn parse(json: &str) -> Value {
        Value::from(serde_json::from_str::<serde_json::Value>(json).unwrap())
    }

    #[test]
    fn test_numbers_parse_as_floats() {
        assert_eq!(parse("18"), Value::Number(18.0));
        assert_eq!(parse("-2.5"), Value::Number(-2.5));
        assert_eq!(parse("[1, 2]"), Value::from(vec![1, 2]));
    }

    #[test]
    fn test_display_renders_integral_numbers_without_fraction() {
        assert_eq!(Value::Number(3.0).to_string(), "3");
        assert_eq!(Value::Number(3.5).to_string(), "3.5");
        assert_eq!(Value::Null.to_string(), "");
        assert_eq!(Value::from("abc").to_string(), "abc");
        assert_eq!(parse(r#"{"b":[1,"x"],"a":null}"#).to_string(), r#"{"a":null,"b":[1,"x"]}"#);
    }

    #[test]
    fn test_serialize_integral_numbers_as_integers() {
        let json = serde_json::to_string(&Value::from(vec![1, 2, 3])).unwrap();
        assert_eq!(json, "[1,2,3]");
        let json = serde_json::to_string(&Value::Number(0.25)).unwrap();
        assert_eq!(json, "0.25");
    }

    #[test]
    fn test_truthiness_and_emptiness_differ_on_zero() {
        let zero = Value::Number(0.0);
        assert!(!zero.is_truthy());
        assert!(!zero.is_empty());

        assert!(Value::Null.is_empty());
        assert!(Value::from("").is_empty());
        assert!(Value::Bool(false).is_empty());
        assert!(parse("[]").is_empty());
        assert!(parse("{}").is_empty());
        assert!(!parse("[0]").is_empty());
    }

    #[test]
    fn test_len_counts_bytes() {
        assert_eq!(Value::from("张三").len(), Some(6));
        assert_eq!(Value::from("ab").len(), Some(2));
        assert_eq!(parse("[1,2,3]").len(), Some(3));
        assert_eq!(Value::Number(1.0).len(), None);
    }

    #[test]
    fn test_as_integer_rejects_fractions_and_huge_values() {
        assert_eq!(Value::Number(42.0).as_integer(), Some(42));
        assert_eq!(Value::Number(4.2).as_integer(), None);
        assert_eq!(Value::Number(1e300).as_integer(), None);
        assert_eq!(Value::from("42").as_integer(), None);
    }
}
