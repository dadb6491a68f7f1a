//! Swagger 2.0 → `OpenAPI` 3.0 normalization.
//!
//! Only the parts the rest of the pipeline relies on are upgraded: body and form parameters
//! become request bodies, inline parameter/response types move under `schema`, definitions
//! move under `components`, and the version discriminator is switched.
//!
//! Operation-level references into the document's shared `parameters` and `responses` maps
//! are inlined first, since a body parameter can only be recognised once its `in` is visible.

use serde_json::{Map, Value, json};

/// Version written into upgraded documents.
pub const UPGRADED_OPENAPI_VERSION: &str = "3.0.3";

const LEGACY_VERSION: &str = "2.0";
const JSON_CONTENT_TYPE: &str = "application/json";
const FORM_URLENCODED: &str = "application/x-www-form-urlencoded";
const MULTIPART_FORM: &str = "multipart/form-data";
const PARAMETERS_PREFIX: &str = "#/parameters/";
const RESPONSES_PREFIX: &str = "#/responses/";
const OPERATION_KEYS: [&str; 7] = ["get", "put", "post", "delete", "options", "head", "patch"];
/// Keys of a 2.0 non-body parameter (or header) that belong in a 3.x `schema`.
const INLINE_SCHEMA_KEYS: [&str; 14] = [
    "type",
    "format",
    "items",
    "enum",
    "default",
    "minimum",
    "maximum",
    "exclusiveMinimum",
    "exclusiveMaximum",
    "minLength",
    "maxLength",
    "pattern",
    "minItems",
    "maxItems",
];

/// Whether the document declares the Swagger 2.0 dialect.
#[must_use]
pub fn is_legacy(doc: &Value) -> bool {
    match doc.get("swagger") {
        Some(Value::String(s)) => s == LEGACY_VERSION,
        Some(Value::Number(n)) => n.as_f64() == Some(2.0),
        _ => false,
    }
}

/// Upgrade a Swagger 2.0 document in place. Documents in other dialects are left untouched.
pub fn normalize(doc: &mut Value) {
    if !is_legacy(doc) {
        return;
    }
    let Some(root) = doc.as_object_mut() else {
        return;
    };

    let global_consumes = string_list(root.get("consumes"));
    let shared = SharedObjects::from_root(root);

    if let Some(Value::Object(paths)) = root.get_mut("paths") {
        for (path, item) in paths.iter_mut() {
            let Some(item) = item.as_object_mut() else {
                continue;
            };
            let inherited = split_path_parameters(item, &shared);
            for method in OPERATION_KEYS {
                if let Some(Value::Object(operation)) = item.get_mut(method) {
                    tracing::debug!(method, path = %path, "upgrading Swagger 2.0 operation");
                    inherit_parameters(operation, &inherited, &shared);
                    upgrade_operation(operation, &global_consumes, &shared);
                }
            }
        }
    }

    move_to_components(root, shared);
    upgrade_servers(root);
    rewrite_refs(doc);

    if let Some(root) = doc.as_object_mut() {
        root.remove("swagger");
        root.insert(
            "openapi".to_string(),
            Value::String(UPGRADED_OPENAPI_VERSION.to_string()),
        );
    }
}

/// Root-level `parameters` and `responses` maps, the targets of `#/parameters/*` and
/// `#/responses/*` references.
#[derive(Debug, Default)]
struct SharedObjects {
    parameters: Map<String, Value>,
    responses: Map<String, Value>,
}

impl SharedObjects {
    fn from_root(root: &mut Map<String, Value>) -> Self {
        let take = |root: &mut Map<String, Value>, key: &str| match root.remove(key) {
            Some(Value::Object(map)) => map,
            _ => Map::new(),
        };
        Self {
            parameters: take(root, "parameters"),
            responses: take(root, "responses"),
        }
    }

    fn parameter(&self, value: Value) -> Value {
        inline_shared(value, PARAMETERS_PREFIX, &self.parameters)
    }

    fn response(&self, value: Value) -> Value {
        inline_shared(value, RESPONSES_PREFIX, &self.responses)
    }
}

/// Replace a `$ref` into `shared` with a copy of its target, following chains.
///
/// Unknown or cyclic references are left in place for the dereferencer to report.
fn inline_shared(mut value: Value, prefix: &str, shared: &Map<String, Value>) -> Value {
    let mut seen: Vec<String> = Vec::new();
    loop {
        let Some(name) = value
            .get("$ref")
            .and_then(Value::as_str)
            .and_then(|r| r.strip_prefix(prefix))
            .map(unescape_pointer_token)
        else {
            return value;
        };
        if seen.contains(&name) {
            return value;
        }
        let Some(target) = shared.get(&name) else {
            return value;
        };
        value = target.clone();
        seen.push(name);
    }
}

fn unescape_pointer_token(token: &str) -> String {
    token.replace("~1", "/").replace("~0", "~")
}

/// Inline the path item's shared parameter refs and pull out the body/form parameters, which
/// have no path-level equivalent in 3.x. Those are handed down to every operation.
fn split_path_parameters(item: &mut Map<String, Value>, shared: &SharedObjects) -> Vec<Value> {
    if !matches!(item.get("parameters"), Some(Value::Array(_))) {
        return Vec::new();
    }
    // Verb order within the path item is declaration order; keep it.
    let Some(Value::Array(params)) = item.shift_remove("parameters") else {
        return Vec::new();
    };

    let mut kept = Vec::with_capacity(params.len());
    let mut inherited = Vec::new();
    for param in params {
        let mut param = shared.parameter(param);
        match param.get("in").and_then(Value::as_str) {
            Some("body" | "formData") => inherited.push(param),
            _ => {
                if let Some(obj) = param.as_object_mut() {
                    move_inline_schema(obj);
                }
                kept.push(param);
            }
        }
    }
    item.insert("parameters".to_string(), Value::Array(kept));
    inherited
}

/// Add path-level parameters the operation does not override by `name` + `in`.
fn inherit_parameters(
    operation: &mut Map<String, Value>,
    inherited: &[Value],
    shared: &SharedObjects,
) {
    if inherited.is_empty() {
        return;
    }
    let declared: Vec<(Option<String>, Option<String>)> = operation
        .get("parameters")
        .and_then(Value::as_array)
        .map(|params| {
            params
                .iter()
                .map(|p| parameter_identity(&shared.parameter(p.clone())))
                .collect()
        })
        .unwrap_or_default();

    let mut merged: Vec<Value> = inherited
        .iter()
        .filter(|p| !declared.contains(&parameter_identity(p)))
        .cloned()
        .collect();
    if let Some(Value::Array(own)) = operation.remove("parameters") {
        merged.extend(own);
    }
    operation.insert("parameters".to_string(), Value::Array(merged));
}

fn parameter_identity(param: &Value) -> (Option<String>, Option<String>) {
    let field = |key: &str| param.get(key).and_then(Value::as_str).map(str::to_string);
    (field("name"), field("in"))
}

fn upgrade_operation(
    operation: &mut Map<String, Value>,
    global_consumes: &[String],
    shared: &SharedObjects,
) {
    let consumes = match operation.remove("consumes") {
        Some(v) => string_list(Some(&v)),
        None => global_consumes.to_vec(),
    };
    operation.remove("produces");

    let had_params = matches!(operation.get("parameters"), Some(Value::Array(_)));
    let params = if had_params {
        match operation.remove("parameters") {
            Some(Value::Array(params)) => params,
            _ => Vec::new(),
        }
    } else {
        Vec::new()
    };

    let mut kept = Vec::with_capacity(params.len());
    let mut body: Option<Map<String, Value>> = None;
    let mut form_fields: Vec<Map<String, Value>> = Vec::new();

    for param in params {
        let param = shared.parameter(param);
        let Value::Object(mut param) = param else {
            kept.push(param);
            continue;
        };
        match param.get("in").and_then(Value::as_str) {
            Some("body") => {
                // Only one body parameter is allowed in 2.0; keep the first.
                if body.is_none() {
                    body = Some(param);
                }
            }
            Some("formData") => form_fields.push(param),
            _ => {
                move_inline_schema(&mut param);
                kept.push(Value::Object(param));
            }
        }
    }

    if had_params {
        operation.insert("parameters".to_string(), Value::Array(kept));
    }

    if let Some(body) = body {
        operation.insert("requestBody".to_string(), body_to_request_body(body));
    } else if !form_fields.is_empty() {
        let content_type = if consumes.iter().any(|c| c == MULTIPART_FORM) {
            MULTIPART_FORM
        } else {
            FORM_URLENCODED
        };
        operation.insert(
            "requestBody".to_string(),
            form_to_request_body(form_fields, content_type),
        );
    }

    if let Some(Value::Object(responses)) = operation.get_mut("responses") {
        for response in responses.values_mut() {
            *response = shared.response(std::mem::take(response));
            if let Some(response) = response.as_object_mut() {
                upgrade_response(response);
            }
        }
    }
}

fn body_to_request_body(mut body: Map<String, Value>) -> Value {
    let schema = body.remove("schema").unwrap_or_else(|| json!({}));
    let mut request_body = Map::new();
    if let Some(description) = body.remove("description") {
        request_body.insert("description".to_string(), description);
    }
    if let Some(required) = body.remove("required") {
        request_body.insert("required".to_string(), required);
    }
    request_body.insert(
        "content".to_string(),
        json!({ JSON_CONTENT_TYPE: { "schema": schema } }),
    );
    Value::Object(request_body)
}

fn form_to_request_body(fields: Vec<Map<String, Value>>, content_type: &str) -> Value {
    let mut properties = Map::new();
    let mut required = Vec::new();
    for mut field in fields {
        let Some(name) = field.get("name").and_then(Value::as_str).map(str::to_string) else {
            continue;
        };
        if field.get("required").and_then(Value::as_bool) == Some(true) {
            required.push(Value::String(name.clone()));
        }
        let mut schema = take_inline_schema(&mut field);
        if let Some(description) = field.remove("description") {
            schema.insert("description".to_string(), description);
        }
        properties.insert(name, Value::Object(schema));
    }

    let mut schema = json!({ "type": "object", "properties": properties });
    if !required.is_empty() {
        schema["required"] = Value::Array(required);
    }
    json!({ "content": { content_type: { "schema": schema } } })
}

fn upgrade_response(response: &mut Map<String, Value>) {
    if let Some(schema) = response.remove("schema") {
        response.insert(
            "content".to_string(),
            json!({ JSON_CONTENT_TYPE: { "schema": schema } }),
        );
    }
    response.remove("examples");

    if let Some(Value::Object(headers)) = response.get_mut("headers") {
        for header in headers.values_mut() {
            if let Some(header) = header.as_object_mut() {
                move_inline_schema(header);
            }
        }
    }
}

/// Move inline type keywords of a parameter/header into a `schema` object.
fn move_inline_schema(param: &mut Map<String, Value>) {
    if param.contains_key("schema") {
        return;
    }
    let schema = take_inline_schema(param);
    if !schema.is_empty() {
        param.insert("schema".to_string(), Value::Object(schema));
    }
    param.remove("collectionFormat");
    param.remove("allowEmptyValue");
}

fn take_inline_schema(param: &mut Map<String, Value>) -> Map<String, Value> {
    let mut schema = Map::new();
    for key in INLINE_SCHEMA_KEYS {
        if let Some(v) = param.remove(key) {
            schema.insert(key.to_string(), v);
        }
    }
    // `file` has no 3.x type; it is a binary string.
    if schema.get("type").and_then(Value::as_str) == Some("file") {
        schema.insert("type".to_string(), json!("string"));
        schema.insert("format".to_string(), json!("binary"));
    }
    schema
}

fn move_to_components(root: &mut Map<String, Value>, shared: SharedObjects) {
    let definitions = root.remove("definitions");
    let security = root.remove("securityDefinitions");

    // Body and form parameters were inlined into operations; 3.x has no component for them.
    let parameters: Map<String, Value> = shared
        .parameters
        .into_iter()
        .filter(|(_, p)| !matches!(p.get("in").and_then(Value::as_str), Some("body" | "formData")))
        .map(|(name, mut p)| {
            if let Some(obj) = p.as_object_mut() {
                move_inline_schema(obj);
            }
            (name, p)
        })
        .collect();
    let responses: Map<String, Value> = shared
        .responses
        .into_iter()
        .map(|(name, mut r)| {
            if let Some(obj) = r.as_object_mut() {
                upgrade_response(obj);
            }
            (name, r)
        })
        .collect();

    let mut moved = Map::new();
    if let Some(definitions) = definitions {
        moved.insert("schemas".to_string(), definitions);
    }
    if !parameters.is_empty() {
        moved.insert("parameters".to_string(), Value::Object(parameters));
    }
    if !responses.is_empty() {
        moved.insert("responses".to_string(), Value::Object(responses));
    }
    if let Some(security) = security {
        moved.insert("securitySchemes".to_string(), security);
    }
    if moved.is_empty() {
        return;
    }

    let components = root
        .entry("components")
        .or_insert_with(|| Value::Object(Map::new()));
    if let Some(components) = components.as_object_mut() {
        components.extend(moved);
    }
}

fn upgrade_servers(root: &mut Map<String, Value>) {
    let host = root.remove("host");
    let base_path = root.remove("basePath");
    let schemes = root.remove("schemes");

    let Some(host) = host.as_ref().and_then(Value::as_str) else {
        return;
    };
    let base_path = base_path.as_ref().and_then(Value::as_str).unwrap_or("");
    let schemes = string_list(schemes.as_ref());
    let schemes = if schemes.is_empty() {
        vec!["https".to_string()]
    } else {
        schemes
    };

    let servers: Vec<Value> = schemes
        .iter()
        .map(|scheme| json!({ "url": format!("{scheme}://{host}{base_path}") }))
        .collect();
    root.insert("servers".to_string(), Value::Array(servers));
}

/// 2.0 reference prefixes and their 3.x locations.
const REF_REWRITES: [(&str, &str); 3] = [
    ("#/definitions/", "#/components/schemas/"),
    (PARAMETERS_PREFIX, "#/components/parameters/"),
    (RESPONSES_PREFIX, "#/components/responses/"),
];

fn rewrite_refs(value: &mut Value) {
    match value {
        Value::Object(obj) => {
            for (key, v) in obj.iter_mut() {
                if key == "$ref"
                    && let Value::String(reference) = v
                {
                    if let Some(rewritten) = REF_REWRITES.iter().find_map(|(from, to)| {
                        reference.strip_prefix(from).map(|name| format!("{to}{name}"))
                    }) {
                        *reference = rewritten;
                    }
                } else {
                    rewrite_refs(v);
                }
            }
        }
        Value::Array(items) => items.iter_mut().for_each(rewrite_refs),
        _ => {}
    }
}

fn string_list(value: Option<&Value>) -> Vec<String> {
    value
        .and_then(Value::as_array)
        .map(|items| {
            items
                .iter()
                .filter_map(Value::as_str)
                .map(str::to_string)
                .collect()
        })
        .unwrap_or_default()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::document::parse_document;

    fn upgrade(yaml: &str) -> Value {
        let mut doc = parse_document(yaml).unwrap();
        normalize(&mut doc);
        doc
    }

    #[test]
    fn test_body_parameter_becomes_json_request_body() {
        let doc = upgrade(
            r"
swagger: '2.0'
info: { title: t, version: '1' }
paths:
  /upload/{fileId}:
    put:
      parameters:
        - name: fileId
          in: path
          required: true
          type: string
        - name: body
          in: body
          required: true
          schema:
            type: object
            properties:
              fileName: { type: string }
      responses:
        204:
          description: No content
",
        );

        assert!(doc.get("swagger").is_none());
        assert_eq!(doc["openapi"], json!(UPGRADED_OPENAPI_VERSION));

        let op = &doc["paths"]["/upload/{fileId}"]["put"];
        let params = op["parameters"].as_array().unwrap();
        assert_eq!(params.len(), 1);
        assert_eq!(params[0]["schema"], json!({ "type": "string" }));
        assert!(params[0].get("type").is_none());

        assert_eq!(op["requestBody"]["required"], json!(true));
        assert_eq!(
            op["requestBody"]["content"]["application/json"]["schema"]["properties"]["fileName"],
            json!({ "type": "string" })
        );
    }

    #[test]
    fn test_form_data_becomes_form_request_body() {
        let doc = upgrade(
            r"
swagger: '2.0'
paths:
  /avatar:
    post:
      consumes: [multipart/form-data]
      parameters:
        - { name: file, in: formData, type: file, required: true }
        - { name: note, in: formData, type: string, description: free text }
      responses:
        200: { description: ok }
",
        );

        let body = &doc["paths"]["/avatar"]["post"]["requestBody"]["content"];
        let schema = &body["multipart/form-data"]["schema"];
        assert_eq!(
            schema["properties"]["file"],
            json!({ "type": "string", "format": "binary" })
        );
        assert_eq!(schema["properties"]["note"]["description"], json!("free text"));
        assert_eq!(schema["required"], json!(["file"]));
    }

    #[test]
    fn test_response_schema_and_headers_are_upgraded() {
        let doc = upgrade(
            r"
swagger: '2.0'
paths:
  /pets:
    get:
      responses:
        200:
          description: ok
          headers:
            X-Rate-Limit: { type: integer, format: int32, description: calls per hour }
          schema:
            type: array
            items: { $ref: '#/definitions/Pet' }
definitions:
  Pet:
    type: object
",
        );

        let resp = &doc["paths"]["/pets"]["get"]["responses"]["200"];
        assert_eq!(
            resp["content"]["application/json"]["schema"]["items"]["$ref"],
            json!("#/components/schemas/Pet")
        );
        assert_eq!(
            resp["headers"]["X-Rate-Limit"],
            json!({ "description": "calls per hour", "schema": { "type": "integer", "format": "int32" } })
        );
        assert_eq!(doc["components"]["schemas"]["Pet"], json!({ "type": "object" }));
        assert!(doc.get("definitions").is_none());
    }

    #[test]
    fn test_shared_parameters_and_responses_are_inlined() {
        let doc = upgrade(
            r"
swagger: '2.0'
paths:
  /users/{id}:
    put:
      parameters:
        - $ref: '#/parameters/UserId'
        - $ref: '#/parameters/UserBody'
      responses:
        200: { $ref: '#/responses/UserOk' }
parameters:
  UserId: { name: id, in: path, required: true, type: string }
  UserBody:
    name: body
    in: body
    required: true
    schema: { $ref: '#/definitions/User' }
responses:
  UserOk:
    description: ok
    schema: { $ref: '#/definitions/User' }
definitions:
  User: { type: object }
",
        );

        let op = &doc["paths"]["/users/{id}"]["put"];
        assert_eq!(
            op["parameters"],
            json!([{ "name": "id", "in": "path", "required": true, "schema": { "type": "string" } }])
        );
        assert_eq!(
            op["requestBody"]["content"]["application/json"]["schema"],
            json!({ "$ref": "#/components/schemas/User" })
        );
        assert_eq!(
            op["responses"]["200"]["content"]["application/json"]["schema"],
            json!({ "$ref": "#/components/schemas/User" })
        );

        assert!(doc.get("parameters").is_none());
        assert!(doc.get("responses").is_none());
        assert_eq!(
            doc["components"]["parameters"],
            json!({ "UserId": { "name": "id", "in": "path", "required": true, "schema": { "type": "string" } } })
        );
        assert_eq!(
            doc["components"]["responses"]["UserOk"]["content"]["application/json"]["schema"],
            json!({ "$ref": "#/components/schemas/User" })
        );
    }

    #[test]
    fn test_path_level_body_parameter_is_inherited() {
        let doc = upgrade(
            r"
swagger: '2.0'
paths:
  /items:
    parameters:
      - { name: tenant, in: header, type: string }
      - { name: body, in: body, schema: { type: object } }
    post:
      responses:
        201: { description: created }
    put:
      parameters:
        - { name: body, in: body, schema: { type: array } }
      responses:
        204: { description: updated }
",
        );

        let item = &doc["paths"]["/items"];
        let verbs: Vec<&String> = item.as_object().unwrap().keys().collect();
        assert_eq!(verbs, ["post", "put", "parameters"]);
        assert_eq!(
            item["parameters"],
            json!([{ "name": "tenant", "in": "header", "schema": { "type": "string" } }])
        );
        assert_eq!(
            item["post"]["requestBody"]["content"]["application/json"]["schema"],
            json!({ "type": "object" })
        );
        assert_eq!(
            item["put"]["requestBody"]["content"]["application/json"]["schema"],
            json!({ "type": "array" })
        );
    }

    #[test]
    fn test_unknown_shared_ref_is_left_for_dereferencing() {
        let doc = upgrade(
            r"
swagger: '2.0'
paths:
  /a:
    get:
      parameters:
        - $ref: '#/parameters/Missing'
      responses:
        200: { description: ok }
",
        );
        assert_eq!(
            doc["paths"]["/a"]["get"]["parameters"],
            json!([{ "$ref": "#/components/parameters/Missing" }])
        );
    }

    #[test]
    fn test_host_and_base_path_become_servers() {
        let doc = upgrade(
            r"
swagger: '2.0'
host: api.example.com
basePath: /v1
schemes: [https, http]
paths: {}
",
        );
        assert_eq!(
            doc["servers"],
            json!([{ "url": "https://api.example.com/v1" }, { "url": "http://api.example.com/v1" }])
        );
    }

    #[test]
    fn test_openapi3_documents_are_untouched() {
        let original = parse_document("openapi: 3.0.0\npaths: {}\n").unwrap();
        let mut doc = original.clone();
        normalize(&mut doc);
        assert_eq!(doc, original);
    }
}
