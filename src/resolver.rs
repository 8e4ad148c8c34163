//! `$ref` inlining.
//!
//! Every mapping that carries a `$ref` is replaced wholesale by the document
//! the reference names, itself fully inlined and stripped of its top-level
//! `$schema` key. Sibling keys next to `$ref` are dropped.

use serde_json::{Map, Value};
use tracing::{debug, warn};

use crate::error::{ResolveError, UnresolvedReference};
use crate::index::SchemaStore;

/// Key holding a reference to another schema file.
pub const REF_KEY: &str = "$ref";

/// Top-level key removed from every inlined document.
pub const SCHEMA_KEY: &str = "$schema";

/// Default nesting limit for inlining.
pub const DEFAULT_MAX_DEPTH: usize = 128;

/// Result of a resolution pass that tolerates missing references.
#[derive(Debug, Clone)]
pub struct Resolution {
    /// The inlined schema. Unresolvable references are replaced by `null`.
    pub schema: Value,
    /// Every reference no store entry answered to, in traversal order.
    pub unresolved: Vec<UnresolvedReference>,
}

impl Resolution {
    pub fn is_complete(&self) -> bool {
        self.unresolved.is_empty()
    }
}

/// Inlines `$ref` pointers using documents from a [`SchemaStore`].
#[derive(Debug)]
pub struct Resolver<'a, S: SchemaStore> {
    store: &'a S,
    max_depth: usize,
}

impl<'a, S: SchemaStore> Resolver<'a, S> {
    pub fn new(store: &'a S) -> Self {
        Self {
            store,
            max_depth: DEFAULT_MAX_DEPTH,
        }
    }

    /// Set the nesting limit. A reference cycle surfaces as
    /// `ResolveError::DepthExceeded` once this many levels are open.
    pub fn with_max_depth(mut self, max_depth: usize) -> Self {
        self.max_depth = max_depth;
        self
    }

    /// Inline every `$ref` below `schema`.
    ///
    /// # Errors
    ///
    /// Returns `ResolveError::UnresolvedReferences` listing every reference
    /// the store can't answer, after the whole tree has been walked. Load
    /// failures and `DepthExceeded` abort immediately.
    pub fn resolve(&self, schema: &Value) -> Result<Value, ResolveError> {
        let resolution = self.resolve_partial(schema)?;
        if resolution.is_complete() {
            Ok(resolution.schema)
        } else {
            Err(ResolveError::UnresolvedReferences {
                references: resolution.unresolved,
            })
        }
    }

    /// Inline every `$ref` below `schema`, collecting unresolvable ones
    /// instead of failing on them.
    pub fn resolve_partial(&self, schema: &Value) -> Result<Resolution, ResolveError> {
        let mut unresolved = Vec::new();
        let schema = self.resolve_value(schema, "", 0, &mut unresolved)?;
        Ok(Resolution { schema, unresolved })
    }

    fn resolve_value(
        &self,
        value: &Value,
        path: &str,
        depth: usize,
        unresolved: &mut Vec<UnresolvedReference>,
    ) -> Result<Value, ResolveError> {
        if depth > self.max_depth {
            return Err(ResolveError::DepthExceeded {
                path: display_path(path),
                limit: self.max_depth,
            });
        }

        match value {
            Value::Object(map) => match map.get(REF_KEY) {
                Some(reference) => self.inline(reference, path, depth, unresolved),
                None => {
                    let mut result = Map::new();
                    for (key, child) in map {
                        let child_path = format!("{}/{}", path, escape_pointer(key));
                        let resolved = self.resolve_value(child, &child_path, depth + 1, unresolved)?;
                        result.insert(key.clone(), resolved);
                    }
                    Ok(Value::Object(result))
                }
            },
            Value::Array(items) => {
                let mut result = Vec::with_capacity(items.len());
                for (i, item) in items.iter().enumerate() {
                    let item_path = format!("{}/{}", path, i);
                    result.push(self.resolve_value(item, &item_path, depth + 1, unresolved)?);
                }
                Ok(Value::Array(result))
            }
            other => Ok(other.clone()),
        }
    }

    fn inline(
        &self,
        reference: &Value,
        path: &str,
        depth: usize,
        unresolved: &mut Vec<UnresolvedReference>,
    ) -> Result<Value, ResolveError> {
        let reference = match reference {
            Value::String(s) => s.clone(),
            other => other.to_string(),
        };

        let Some(target) = self.store.load(&reference)? else {
            warn!(path = %display_path(path), reference = %reference, "no schema file for reference");
            unresolved.push(UnresolvedReference {
                path: display_path(path),
                reference,
            });
            return Ok(Value::Null);
        };

        debug!(path = %display_path(path), reference = %reference, "inlining reference");
        let mut resolved = self.resolve_value(&target, path, depth + 1, unresolved)?;
        if let Value::Object(map) = &mut resolved {
            map.shift_remove(SCHEMA_KEY);
        }
        Ok(resolved)
    }
}

/// Convenience wrapper: resolve `schema` against `store` with default limits.
pub fn resolve_refs<S: SchemaStore>(schema: &Value, store: &S) -> Result<Value, ResolveError> {
    Resolver::new(store).resolve(schema)
}

/// Returns true if any mapping below `value` still carries a `$ref`.
pub fn contains_refs(value: &Value) -> bool {
    match value {
        Value::Object(map) => map.contains_key(REF_KEY) || map.values().any(contains_refs),
        Value::Array(items) => items.iter().any(contains_refs),
        _ => false,
    }
}

/// Escape a key for use as a JSON Pointer segment (`~` → `~0`, `/` → `~1`).
pub(crate) fn escape_pointer(key: &str) -> String {
    key.replace('~', "~0").replace('/', "~1")
}

pub(crate) fn display_path(path: &str) -> String {
    if path.is_empty() {
        "/".to_string()
    } else {
        path.to_string()
    }
}
