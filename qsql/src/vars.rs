//! Parameter providers.
//!
//! Anything that can produce the parameter JSON document implements [`Vars`]
//! and can be passed to [`Template::execute_vars`](crate::Template::execute_vars).
//! Two builders cover the usual cases: [`ValueVars`] serializes Rust values
//! at dotted paths, [`JsonVars`] splices raw JSON fragments.
//!
//! ```
//! use qsql::{ValueVars, Vars};
//!
//! let mut vars = ValueVars::new();
//! vars.params("name", "张三").unwrap();
//! vars.params("ids", [1, 2, 3]).unwrap();
//! vars.sys("tenant.id", 7).unwrap();
//!
//! assert_eq!(
//!     vars.json(),
//!     r#"{"params":{"ids":[1,2,3],"name":"张三"},"sys":{"tenant":{"id":7}}}"#
//! );
//! ```

use serde::Serialize;
use serde_json::{Map, Value as Json};

/// Namespace for request parameters.
const PARAMS: &str = "params";
/// Namespace for system values (tenant, clock, ...).
const SYS: &str = "sys";
/// Namespace for the calling user.
const USERS: &str = "users";

/// A source of parameter JSON.
pub trait Vars {
    /// The parameter document as JSON text.
    fn json(&self) -> String;
}

impl Vars for str {
    fn json(&self) -> String {
        self.to_string()
    }
}

impl Vars for String {
    fn json(&self) -> String {
        self.clone()
    }
}

impl Vars for Json {
    fn json(&self) -> String {
        self.to_string()
    }
}

// =============================================================================
// ValueVars
// =============================================================================

/// Incremental builder that serializes values at dotted paths.
#[derive(Debug, Clone, Default)]
pub struct ValueVars {
    root: Map<String, Json>,
}

impl ValueVars {
    /// An empty document.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Serialize `value` at `path`, creating intermediate objects.
    ///
    /// # Errors
    ///
    /// Returns the serializer's error if `value` cannot be represented as JSON.
    pub fn set<T: Serialize>(
        &mut self,
        path: &str,
        value: T,
    ) -> Result<&mut Self, serde_json::Error> {
        let value = serde_json::to_value(value)?;
        set_path(&mut self.root, path, value);
        Ok(self)
    }

    /// [`set`](Self::set) under `params`.
    ///
    /// # Errors
    ///
    /// See [`set`](Self::set).
    pub fn params<T: Serialize>(
        &mut self,
        path: &str,
        value: T,
    ) -> Result<&mut Self, serde_json::Error> {
        self.set(&namespaced(PARAMS, path), value)
    }

    /// [`set`](Self::set) under `sys`.
    ///
    /// # Errors
    ///
    /// See [`set`](Self::set).
    pub fn sys<T: Serialize>(
        &mut self,
        path: &str,
        value: T,
    ) -> Result<&mut Self, serde_json::Error> {
        self.set(&namespaced(SYS, path), value)
    }

    /// [`set`](Self::set) under `users`.
    ///
    /// # Errors
    ///
    /// See [`set`](Self::set).
    pub fn users<T: Serialize>(
        &mut self,
        path: &str,
        value: T,
    ) -> Result<&mut Self, serde_json::Error> {
        self.set(&namespaced(USERS, path), value)
    }
}

impl Vars for ValueVars {
    fn json(&self) -> String {
        Json::Object(self.root.clone()).to_string()
    }
}

// =============================================================================
// JsonVars
// =============================================================================

/// Builder that splices raw JSON fragments at dotted paths.
#[derive(Debug, Clone, Default)]
pub struct JsonVars {
    root: Map<String, Json>,
}

impl JsonVars {
    /// An empty document.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Place the raw JSON fragment `raw` at `path`.
    ///
    /// # Errors
    ///
    /// Returns the parse error if `raw` is not valid JSON; the document is
    /// left unchanged.
    pub fn set_raw(&mut self, path: &str, raw: &str) -> Result<&mut Self, serde_json::Error> {
        let value: Json = serde_json::from_str(raw)?;
        set_path(&mut self.root, path, value);
        Ok(self)
    }

    /// [`set_raw`](Self::set_raw) under `params`.
    ///
    /// # Errors
    ///
    /// See [`set_raw`](Self::set_raw).
    pub fn params(&mut self, path: &str, raw: &str) -> Result<&mut Self, serde_json::Error> {
        self.set_raw(&namespaced(PARAMS, path), raw)
    }

    /// [`set_raw`](Self::set_raw) under `sys`.
    ///
    /// # Errors
    ///
    /// See [`set_raw`](Self::set_raw).
    pub fn sys(&mut self, path: &str, raw: &str) -> Result<&mut Self, serde_json::Error> {
        self.set_raw(&namespaced(SYS, path), raw)
    }

    /// [`set_raw`](Self::set_raw) under `users`.
    ///
    /// # Errors
    ///
    /// See [`set_raw`](Self::set_raw).
    pub fn users(&mut self, path: &str, raw: &str) -> Result<&mut Self, serde_json::Error> {
        self.set_raw(&namespaced(USERS, path), raw)
    }
}

impl Vars for JsonVars {
    fn json(&self) -> String {
        Json::Object(self.root.clone()).to_string()
    }
}

fn namespaced(namespace: &str, path: &str) -> String {
    if path.is_empty() {
        namespace.to_string()
    } else {
        format!("{namespace}.{path}")
    }
}

/// Write `value` at the dotted `path`.
///
/// Missing or non-container intermediates become objects. A numeric segment
/// addresses an existing array element, or appends when it equals the length.
fn set_path(root: &mut Map<String, Json>, path: &str, value: Json) {
    let segments: Vec<&str> = path.split('.').collect();
    let Some((head, rest)) = segments.split_first() else {
        return;
    };
    let slot = root.entry((*head).to_string()).or_insert(Json::Null);
    set_in(slot, rest, value);
}

fn set_in(slot: &mut Json, segments: &[&str], value: Json) {
    let Some((head, rest)) = segments.split_first() else {
        *slot = value;
        return;
    };

    if let (Json::Array(items), Ok(index)) = (&mut *slot, head.parse::<usize>()) {
        if index == items.len() {
            items.push(Json::Null);
        }
        if let Some(item) = items.get_mut(index) {
            set_in(item, rest, value);
            return;
        }
    }

    if !slot.is_object() {
        *slot = Json::Object(Map::new());
    }
    if let Json::Object(map) = slot {
        let child = map.entry((*head).to_string()).or_insert(Json::Null);
        set_in(child, rest, value);
    }
}
