//! Operation walk over a dereferenced document.
//!
//! Produces one [`OperationRecord`] per `(path, verb)` under `paths`, in declaration order.
//! Path-item level keys other than the HTTP verbs (`parameters`, `servers`, extensions, ...)
//! are not read here.

use crate::config::ConvertOptions;
use crate::semantics::extract_annotations;
use crate::tool::{ErrorKey, ToolAnnotations, ToolGenerationError};
use heck::ToSnakeCase;
use regex::Regex;
use serde_json::{Map, Value, json};
use std::collections::HashSet;
use std::sync::LazyLock;

/// Verbs turned into tools.
pub const HTTP_METHODS: [&str; 7] = ["get", "post", "put", "delete", "patch", "options", "head"];

/// Input/output schema property holding the JSON body schema.
pub const BODY_SCHEMA_PROPERTY: &str = "bodySchema";

const JSON_CONTENT_TYPE: &str = "application/json";

static PATH_TEMPLATE_PARAM: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\{([^{}/]+)\}").expect("valid path template regex"));

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ParamLocation {
    Path,
    Query,
    Header,
}

impl ParamLocation {
    fn parse(location: &str) -> Option<Self> {
        match location {
            "path" => Some(Self::Path),
            "query" => Some(Self::Query),
            "header" => Some(Self::Header),
            _ => None,
        }
    }
}

/// Parameter schemas bucketed by location.
///
/// A name lives in exactly one bucket; a later declaration of the same name moves it.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ParameterSchema {
    pub path: Map<String, Value>,
    pub query: Map<String, Value>,
    pub header: Map<String, Value>,
    pub required: Vec<String>,
}

impl ParameterSchema {
    pub fn insert(&mut self, location: ParamLocation, name: String, schema: Value, required: bool) {
        for bucket in [&mut self.path, &mut self.query, &mut self.header] {
            bucket.shift_remove(&name);
        }
        self.required.retain(|r| *r != name);
        if required {
            self.required.push(name.clone());
        }

        let bucket = match location {
            ParamLocation::Path => &mut self.path,
            ParamLocation::Query => &mut self.query,
            ParamLocation::Header => &mut self.header,
        };
        bucket.insert(name, schema);
    }

    pub fn is_empty(&self) -> bool {
        self.path.is_empty() && self.query.is_empty() && self.header.is_empty()
    }
}

/// Everything the emitter needs for one operation.
#[derive(Debug, Clone, PartialEq)]
pub struct OperationRecord {
    pub name: String,
    pub description: String,
    /// Uppercase HTTP verb.
    pub method: String,
    /// Path template as declared (`/user/{id}`).
    pub path: String,
    /// Path template with colon placeholders (`/user/:id`).
    pub gateway_path: String,
    pub parameters: ParameterSchema,
    pub body_schema: Option<Value>,
    pub body_required: bool,
    pub content_type: Option<String>,
    pub output_schema: Option<Value>,
    pub annotations: Option<ToolAnnotations>,
}

/// Walks operations and tracks tool names across one document.
#[derive(Debug)]
pub struct OperationWalker<'a> {
    options: &'a ConvertOptions,
    seen_names: HashSet<String>,
    errors: Vec<ToolGenerationError>,
}

impl<'a> OperationWalker<'a> {
    #[must_use]
    pub fn new(options: &'a ConvertOptions) -> Self {
        Self {
            options,
            seen_names: HashSet::new(),
            errors: Vec::new(),
        }
    }

    /// Walk `paths` and return the records plus non-fatal errors (duplicate names).
    #[must_use]
    pub fn walk(mut self, doc: &Value) -> (Vec<OperationRecord>, Vec<ToolGenerationError>) {
        let mut records = Vec::new();
        let Some(paths) = doc.get("paths").and_then(Value::as_object) else {
            return (records, self.errors);
        };

        for (path, item) in paths {
            let Some(item) = item.as_object() else {
                continue;
            };
            for (verb, operation) in item {
                if !HTTP_METHODS.contains(&verb.as_str()) {
                    continue;
                }
                let Some(operation) = operation.as_object() else {
                    continue;
                };
                if !self.options.auto_discover.should_discover(verb, path) {
                    tracing::debug!(method = %verb, path = %path, "operation filtered out");
                    continue;
                }
                records.push(self.walk_operation(path, verb, operation));
            }
        }

        (records, self.errors)
    }

    fn walk_operation(
        &mut self,
        path: &str,
        verb: &str,
        operation: &Map<String, Value>,
    ) -> OperationRecord {
        let name = tool_name(operation, verb, path);
        if !self.seen_names.insert(name.clone()) {
            tracing::warn!(tool = %name, method = %verb, path = %path, "duplicate tool name");
            self.errors.push(ToolGenerationError::new(
                ErrorKey::DuplicateName,
                format!("Duplicate tool name detected: {name}"),
            ));
        }

        let (body_schema, body_required, content_type) = request_body(operation);

        OperationRecord {
            description: tool_description(operation, verb, path),
            method: verb.to_uppercase(),
            path: path.to_string(),
            gateway_path: gateway_path(path),
            parameters: collect_parameters(operation),
            body_schema,
            body_required,
            content_type,
            output_schema: output_schema(operation),
            annotations: extract_annotations(operation, verb, self.options.infer_annotations),
            name,
        }
    }
}

/// `operationId` verbatim, otherwise snake_case of verb + path (`post /user` → `post_user`).
fn tool_name(operation: &Map<String, Value>, verb: &str, path: &str) -> String {
    match non_empty_str(operation, "operationId") {
        Some(id) => id.to_string(),
        None => format!("{verb}{path}").to_snake_case(),
    }
}

fn tool_description(operation: &Map<String, Value>, verb: &str, path: &str) -> String {
    non_empty_str(operation, "summary")
        .or_else(|| non_empty_str(operation, "description"))
        .map_or_else(
            || format!("API for {} {}", verb.to_uppercase(), path),
            str::to_string,
        )
}

fn gateway_path(path: &str) -> String {
    PATH_TEMPLATE_PARAM.replace_all(path, ":$1").into_owned()
}

fn collect_parameters(operation: &Map<String, Value>) -> ParameterSchema {
    let mut params = ParameterSchema::default();
    let Some(declared) = operation.get("parameters").and_then(Value::as_array) else {
        return params;
    };

    for param in declared {
        let Some(param) = param.as_object() else {
            continue;
        };
        let Some(name) = param.get("name").and_then(Value::as_str) else {
            continue;
        };
        let location = param.get("in").and_then(Value::as_str).unwrap_or_default();
        let Some(location) = ParamLocation::parse(location) else {
            tracing::debug!(parameter = name, location, "dropping parameter");
            continue;
        };
        let required = param.get("required").and_then(Value::as_bool) == Some(true);
        params.insert(location, name.to_string(), parameter_schema(param), required);
    }

    params
}

/// The parameter's schema with its description, or just the description when it has none.
fn parameter_schema(param: &Map<String, Value>) -> Value {
    let schema = param.get("schema").or_else(|| {
        // 3.x parameters may use `content` instead of `schema`.
        param
            .get("content")
            .and_then(Value::as_object)
            .and_then(|c| c.values().next())
            .and_then(|media| media.get("schema"))
    });

    let mut out = match schema {
        Some(Value::Object(schema)) => schema.clone(),
        Some(other) => return other.clone(),
        None => Map::new(),
    };
    if let Some(description) = param.get("description") {
        out.insert("description".to_string(), description.clone());
    }
    Value::Object(out)
}

/// `(json body schema, body required, first declared content type)`.
fn request_body(operation: &Map<String, Value>) -> (Option<Value>, bool, Option<String>) {
    let Some(body) = operation.get("requestBody").and_then(Value::as_object) else {
        return (None, false, None);
    };
    let content = body.get("content").and_then(Value::as_object);

    let content_type = content.and_then(|c| c.keys().next().cloned());
    let schema = content
        .and_then(|c| c.get(JSON_CONTENT_TYPE))
        .and_then(|media| media.get("schema"))
        .cloned();
    let required = schema.is_some() && body.get("required").and_then(Value::as_bool) == Some(true);

    (schema, required, content_type)
}

/// Output schema from the first qualifying 2xx response.
///
/// Explicit codes are scanned in ascending order, then the `2XX` range. The first response
/// with a JSON body wins (with its headers); failing that, the first response with headers.
fn output_schema(operation: &Map<String, Value>) -> Option<Value> {
    let responses = operation.get("responses").and_then(Value::as_object)?;

    let mut explicit: Vec<(u16, &Map<String, Value>)> = responses
        .iter()
        .filter_map(|(code, resp)| {
            let code: u16 = code.parse().ok()?;
            if !(200..300).contains(&code) {
                return None;
            }
            Some((code, resp.as_object()?))
        })
        .collect();
    explicit.sort_by_key(|(code, _)| *code);

    let mut candidates: Vec<&Map<String, Value>> = explicit.into_iter().map(|(_, r)| r).collect();
    if let Some(range) = responses
        .get("2XX")
        .or_else(|| responses.get("2xx"))
        .and_then(Value::as_object)
    {
        candidates.push(range);
    }

    let (response, body) = match candidates
        .iter()
        .find_map(|r| json_content(r).map(|content| (*r, content.get("schema").cloned())))
    {
        Some(found) => found,
        None => (candidates.into_iter().find(|r| has_headers(r))?, None),
    };

    let mut properties = header_properties(response);
    if let Some(body) = body {
        properties.insert(BODY_SCHEMA_PROPERTY.to_string(), body);
    }
    if properties.is_empty() {
        return None;
    }

    Some(json!({ "type": "object", "properties": properties }))
}

fn json_content(response: &Map<String, Value>) -> Option<&Value> {
    response.get("content")?.get(JSON_CONTENT_TYPE)
}

fn has_headers(response: &Map<String, Value>) -> bool {
    response
        .get("headers")
        .and_then(Value::as_object)
        .is_some_and(|h| !h.is_empty())
}

fn header_properties(response: &Map<String, Value>) -> Map<String, Value> {
    let mut properties = Map::new();
    let Some(headers) = response.get("headers").and_then(Value::as_object) else {
        return properties;
    };

    for (name, header) in headers {
        let Some(header) = header.as_object() else {
            continue;
        };
        let mut prop = Map::new();
        if let Some(schema) = header.get("schema").and_then(Value::as_object) {
            for key in ["type", "format"] {
                if let Some(v) = schema.get(key) {
                    prop.insert(key.to_string(), v.clone());
                }
            }
        }
        if let Some(description) = header.get("description") {
            prop.insert("description".to_string(), description.clone());
        }
        properties.insert(name.clone(), Value::Object(prop));
    }

    properties
}

fn non_empty_str<'v>(obj: &'v Map<String, Value>, key: &str) -> Option<&'v str> {
    obj.get(key)
        .and_then(Value::as_str)
        .filter(|s| !s.is_empty())
}
