//! Tool annotations.
//!
//! Annotations come from `x-mcp-*` vendor extensions on the operation. Optionally, hints can
//! be seeded from RFC 9110-style HTTP method semantics first.

use crate::tool::ToolAnnotations;
use serde_json::{Map, Value};

/// Output field of an annotation extension; each field implies the expected JSON type.
#[derive(Debug, Clone, Copy)]
enum Hint {
    Title,
    ReadOnly,
    Destructive,
    Idempotent,
    OpenWorld,
}

impl Hint {
    /// Copy `value` into the matching field. Returns `false` when the type is wrong.
    fn apply(self, annotations: &mut ToolAnnotations, value: &Value) -> bool {
        let slot = match self {
            Hint::Title => {
                let Some(title) = value.as_str() else {
                    return false;
                };
                annotations.title = Some(title.to_string());
                return true;
            }
            Hint::ReadOnly => &mut annotations.read_only_hint,
            Hint::Destructive => &mut annotations.destructive_hint,
            Hint::Idempotent => &mut annotations.idempotent_hint,
            Hint::OpenWorld => &mut annotations.open_world_hint,
        };
        let Some(flag) = value.as_bool() else {
            return false;
        };
        *slot = Some(flag);
        true
    }
}

/// Recognized extension keys and the field each one sets.
const ANNOTATION_EXTENSIONS: [(&str, Hint); 5] = [
    ("x-mcp-title", Hint::Title),
    ("x-mcp-readOnlyHint", Hint::ReadOnly),
    ("x-mcp-destructiveHint", Hint::Destructive),
    ("x-mcp-idempotentHint", Hint::Idempotent),
    ("x-mcp-openWorldHint", Hint::OpenWorld),
];

/// Build annotations for an operation.
///
/// Values with the wrong type are ignored field by field. Returns `None` when nothing was set.
#[must_use]
pub fn extract_annotations(
    operation: &Map<String, Value>,
    method: &str,
    infer_from_method: bool,
) -> Option<ToolAnnotations> {
    let mut annotations = if infer_from_method {
        annotations_for_method(method)
    } else {
        ToolAnnotations::default()
    };

    for (key, hint) in ANNOTATION_EXTENSIONS {
        let Some(value) = operation.get(key) else {
            continue;
        };
        if !hint.apply(&mut annotations, value) {
            tracing::debug!(extension = key, "ignoring mistyped annotation extension");
        }
    }

    (!annotations.is_empty()).then_some(annotations)
}

/// Hints implied by the HTTP method. Unknown methods get no hints.
#[must_use]
pub fn annotations_for_method(method: &str) -> ToolAnnotations {
    let (read_only, destructive, idempotent) = match method.to_ascii_uppercase().as_str() {
        "GET" | "HEAD" | "OPTIONS" => (Some(true), Some(false), Some(true)),
        "POST" => (Some(false), Some(false), Some(false)),
        "PUT" | "DELETE" => (Some(false), Some(true), Some(true)),
        // PATCH may or may not be idempotent; do not guess.
        "PATCH" => (Some(false), Some(true), None),
        _ => (None, None, None),
    };

    ToolAnnotations {
        title: None,
        read_only_hint: read_only,
        destructive_hint: destructive,
        idempotent_hint: idempotent,
        open_world_hint: None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn op(value: Value) -> Map<String, Value> {
        value.as_object().cloned().unwrap()
    }

    #[test]
    fn test_copies_recognized_extensions() {
        let operation = op(json!({
            "x-mcp-title": "Get user",
            "x-mcp-readOnlyHint": true,
            "x-mcp-openWorldHint": false,
            "x-mcp-unknown": true
        }));
        let a = extract_annotations(&operation, "get", false).unwrap();
        assert_eq!(a.title.as_deref(), Some("Get user"));
        assert_eq!(a.read_only_hint, Some(true));
        assert_eq!(a.open_world_hint, Some(false));
        assert_eq!(a.destructive_hint, None);
        assert_eq!(a.idempotent_hint, None);
    }

    #[test]
    fn test_ignores_mistyped_values_field_by_field() {
        let operation = op(json!({
            "x-mcp-title": 42,
            "x-mcp-destructiveHint": "yes",
            "x-mcp-idempotentHint": true
        }));
        let a = extract_annotations(&operation, "put", false).unwrap();
        assert_eq!(a.title, None);
        assert_eq!(a.destructive_hint, None);
        assert_eq!(a.idempotent_hint, Some(true));
    }

    #[test]
    fn test_absent_when_nothing_recognized() {
        assert!(extract_annotations(&op(json!({ "summary": "x" })), "get", false).is_none());
        assert!(extract_annotations(&op(json!({ "x-mcp-title": false })), "get", false).is_none());
    }

    #[test]
    fn test_method_semantics_are_overridden_by_extensions() {
        let a = extract_annotations(&op(json!({ "x-mcp-destructiveHint": false })), "delete", true)
            .unwrap();
        assert_eq!(a.read_only_hint, Some(false));
        assert_eq!(a.idempotent_hint, Some(true));
        assert_eq!(a.destructive_hint, Some(false));
    }

    #[test]
    fn test_annotations_for_method() {
        let get = annotations_for_method("get");
        assert_eq!(get.read_only_hint, Some(true));
        assert_eq!(get.destructive_hint, Some(false));

        let patch = annotations_for_method("PATCH");
        assert_eq!(patch.idempotent_hint, None);

        assert!(annotations_for_method("PROPFIND").is_empty());
    }
}
