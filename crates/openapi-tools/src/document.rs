//! Raw spec text → document tree.
//!
//! JSON is a valid subset of YAML, so `serde_yaml` alone is enough. The YAML value is then
//! converted to `serde_json::Value`, which is what the rest of the pipeline works on.

use crate::error::Result;
use serde_json::{Map, Number, Value};
use serde_yaml::Value as YamlValue;

/// Parse a YAML or JSON spec into a JSON document tree.
///
/// Mapping order is preserved. Merge keys (`<<: *anchor`) are applied. Non-string mapping
/// keys (e.g. unquoted `200:` response codes) are converted to their string form.
///
/// # Errors
///
/// Returns an error if the text is not well-formed YAML/JSON or a merge key is malformed.
pub fn parse_document(text: &str) -> Result<Value> {
    let mut yaml: YamlValue = serde_yaml::from_str(text)?;
    yaml.apply_merge()?;
    Ok(yaml_to_json(yaml))
}

/// Whether a parsed document is "empty" (null, false, zero or an empty string).
///
/// Such documents convert to no tools and no errors.
#[must_use]
pub fn is_empty_document(doc: &Value) -> bool {
    match doc {
        Value::Null => true,
        Value::Bool(b) => !b,
        Value::Number(n) => n.as_f64() == Some(0.0),
        Value::String(s) => s.is_empty(),
        Value::Array(_) | Value::Object(_) => false,
    }
}

fn yaml_to_json(value: YamlValue) -> Value {
    match value {
        YamlValue::Null => Value::Null,
        YamlValue::Bool(b) => Value::Bool(b),
        YamlValue::Number(n) => {
            if let Some(i) = n.as_i64() {
                Value::Number(i.into())
            } else if let Some(u) = n.as_u64() {
                Value::Number(u.into())
            } else {
                n.as_f64()
                    .and_then(Number::from_f64)
                    .map_or(Value::Null, Value::Number)
            }
        }
        YamlValue::String(s) => Value::String(s),
        YamlValue::Sequence(seq) => Value::Array(seq.into_iter().map(yaml_to_json).collect()),
        YamlValue::Mapping(mapping) => {
            let mut obj = Map::with_capacity(mapping.len());
            for (k, v) in mapping {
                obj.insert(yaml_key_to_string(k), yaml_to_json(v));
            }
            Value::Object(obj)
        }
        YamlValue::Tagged(tagged) => yaml_to_json(tagged.value),
    }
}

fn yaml_key_to_string(key: YamlValue) -> String {
    match key {
        YamlValue::String(s) => s,
        YamlValue::Number(n) => n.to_string(),
        YamlValue::Bool(b) => b.to_string(),
        YamlValue::Null => "null".to_string(),
        YamlValue::Tagged(tagged) => yaml_key_to_string(tagged.value),
        other => serde_yaml::to_string(&other)
            .map(|s| s.trim_end().to_string())
            .unwrap_or_default(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::OpenApiToolsError;
    use serde_json::json;

    #[test]
    fn test_parses_json_and_yaml_to_same_tree() {
        let from_json = parse_document(r#"{"openapi":"3.0.0","paths":{"/a":{"get":{}}}}"#).unwrap();
        let from_yaml = parse_document(
            r"
openapi: 3.0.0
paths:
  /a:
    get: {}
",
        )
        .unwrap();
        assert_eq!(from_json, from_yaml);
        assert_eq!(from_json["openapi"], json!("3.0.0"));
    }

    #[test]
    fn test_numeric_response_codes_become_string_keys() {
        let doc = parse_document(
            r"
responses:
  200:
    description: ok
  404:
    description: missing
",
        )
        .unwrap();
        let keys: Vec<&String> = doc["responses"].as_object().unwrap().keys().collect();
        assert_eq!(keys, ["200", "404"]);
    }

    #[test]
    fn test_preserves_declaration_order() {
        let doc = parse_document(
            r"
content:
  application/xml: {}
  application/json: {}
",
        )
        .unwrap();
        let first = doc["content"].as_object().unwrap().keys().next().unwrap();
        assert_eq!(first, "application/xml");
    }

    #[test]
    fn test_rejects_malformed_input() {
        assert!(parse_document("openapi: 3.0.0\ninfo:\n  title: x\n  version\npaths:\n").is_err());
        assert!(parse_document(r#"{"openapi": "3.0.0", "paths": {"#).is_err());
    }

    #[test]
    fn test_applies_merge_keys() {
        let doc = parse_document(
            r"
components:
  idParam: &idParam
    name: id
    in: path
    required: true
parameters:
  - <<: *idParam
    description: User id
",
        )
        .unwrap();
        assert_eq!(
            doc["parameters"][0],
            json!({ "name": "id", "in": "path", "required": true, "description": "User id" })
        );
        assert!(doc["parameters"][0].get("<<").is_none());
    }

    #[test]
    fn test_rejects_malformed_merge_key() {
        let err = parse_document("a:\n  <<: not-a-mapping\n").unwrap_err();
        assert!(matches!(err, OpenApiToolsError::Parse(_)), "{err}");
    }

    #[test]
    fn test_empty_documents() {
        assert!(is_empty_document(&parse_document("").unwrap()));
        assert!(is_empty_document(&json!(false)));
        assert!(is_empty_document(&json!(0)));
        assert!(is_empty_document(&json!("")));
        assert!(!is_empty_document(&json!({})));
        assert!(!is_empty_document(&json!("openapi")));
    }
}
