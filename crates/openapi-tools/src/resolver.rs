//! `OpenAPI` `$ref` dereferencing.
//!
//! Every internal reference (`#/...` JSON pointer) is replaced by a copy of the subtree it
//! points to, recursively, so the walker can assume a fully expanded tree. Keys next to a
//! `$ref` (allowed in 3.1, e.g. `description`) are merged over the resolved object.
//!
//! Only references into the same document are supported; file and URL refs are rejected.

use crate::error::DelegateError;
use serde_json::{Map, Value};
use std::collections::HashMap;

/// Expands internal `$ref`s of one document.
#[derive(Debug)]
pub struct RefResolver<'a> {
    root: &'a Value,
    /// Fully expanded targets, keyed by JSON pointer.
    resolved: HashMap<String, Value>,
    /// Pointers currently being expanded (cycle detection).
    in_progress: Vec<String>,
}

impl<'a> RefResolver<'a> {
    #[must_use]
    pub fn new(root: &'a Value) -> Self {
        Self {
            root,
            resolved: HashMap::new(),
            in_progress: Vec::new(),
        }
    }

    /// Return a copy of `value` with every `$ref` expanded.
    ///
    /// # Errors
    ///
    /// Returns an error for cyclic, dangling, external or malformed references.
    pub fn expand(&mut self, value: &Value) -> Result<Value, DelegateError> {
        match value {
            Value::Object(obj) => {
                if let Some(reference) = obj.get("$ref") {
                    let Some(reference) = reference.as_str() else {
                        return Err(DelegateError::new("$ref must be a string"));
                    };
                    let target = self.resolve_pointer(reference)?;
                    return self.merge_siblings(target, obj);
                }

                let mut out = Map::with_capacity(obj.len());
                for (k, v) in obj {
                    out.insert(k.clone(), self.expand(v)?);
                }
                Ok(Value::Object(out))
            }
            Value::Array(items) => items
                .iter()
                .map(|v| self.expand(v))
                .collect::<Result<Vec<_>, _>>()
                .map(Value::Array),
            other => Ok(other.clone()),
        }
    }

    fn resolve_pointer(&mut self, reference: &str) -> Result<Value, DelegateError> {
        let pointer = parse_ref(reference)?;

        if let Some(v) = self.resolved.get(&pointer) {
            return Ok(v.clone());
        }

        if self.in_progress.contains(&pointer) {
            return Err(DelegateError::new(format!(
                "Cyclic $ref detected while resolving: {reference}",
            )));
        }

        let root = self.root;
        let target = root.pointer(&pointer).ok_or_else(|| {
            DelegateError::new(format!(
                "Unresolved $ref '{reference}' (missing pointer '{pointer}')",
            ))
        })?;

        self.in_progress.push(pointer.clone());
        let expanded = self.expand(target);
        self.in_progress.pop();

        let expanded = expanded?;
        self.resolved.insert(pointer, expanded.clone());
        Ok(expanded)
    }

    fn merge_siblings(
        &mut self,
        target: Value,
        ref_obj: &Map<String, Value>,
    ) -> Result<Value, DelegateError> {
        if ref_obj.len() == 1 {
            return Ok(target);
        }
        let Value::Object(mut merged) = target else {
            return Ok(target);
        };
        for (k, v) in ref_obj {
            if k != "$ref" {
                merged.insert(k.clone(), self.expand(v)?);
            }
        }
        Ok(Value::Object(merged))
    }
}

/// Dereference a whole document.
///
/// # Errors
///
/// Returns an error if any reference cannot be resolved.
pub fn dereference_document(doc: &Value) -> Result<Value, DelegateError> {
    RefResolver::new(doc).expand(doc)
}

/// Turn a `$ref` string into a JSON pointer into the current document.
fn parse_ref(reference: &str) -> Result<String, DelegateError> {
    let Some(fragment) = reference.strip_prefix('#') else {
        return Err(DelegateError::new(format!(
            "Unsupported external $ref (only references within the document are supported): {reference}",
        )));
    };

    if fragment.is_empty() || fragment.starts_with('/') {
        Ok(fragment.to_string())
    } else {
        Err(DelegateError::new(format!(
            "Unsupported $ref fragment (expected JSON pointer starting with '/'): {reference}",
        )))
    }
}
