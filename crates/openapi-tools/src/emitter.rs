//! Walked operation → [`McpTool`].

use crate::tool::{GatewayMapping, HttpMapping, McpTool, ToolDefinition};
use crate::walker::{BODY_SCHEMA_PROPERTY, OperationRecord, ParameterSchema};
use serde_json::{Map, Value, json};

#[must_use]
pub fn emit_tool(record: OperationRecord) -> McpTool {
    let input_schema = build_input_schema(
        &record.parameters,
        record.body_schema.as_ref(),
        record.body_required,
    );

    let http = HttpMapping {
        method: record.method,
        path: record.gateway_path,
        path_params: names(&record.parameters.path),
        query_params: names(&record.parameters.query),
        headers: names(&record.parameters.header),
        content_type: record.content_type,
    };

    McpTool {
        tool_definition: ToolDefinition {
            name: record.name,
            description: record.description,
            input_schema,
            output_schema: record.output_schema,
            annotations: record.annotations,
        },
        gateway_mapping: GatewayMapping { http },
    }
}

/// Flat object schema: all parameters by name plus `bodySchema` for a JSON body.
///
/// `required` is omitted when empty.
fn build_input_schema(
    parameters: &ParameterSchema,
    body_schema: Option<&Value>,
    body_required: bool,
) -> Value {
    let mut properties = Map::new();
    for bucket in [&parameters.path, &parameters.query, &parameters.header] {
        for (name, schema) in bucket {
            properties.insert(name.clone(), schema.clone());
        }
    }

    let mut required = parameters.required.clone();
    if let Some(body) = body_schema {
        properties.insert(BODY_SCHEMA_PROPERTY.to_string(), body.clone());
        if body_required {
            required.push(BODY_SCHEMA_PROPERTY.to_string());
        }
    }

    let mut schema = json!({
        "type": "object",
        "properties": properties,
    });
    if !required.is_empty() {
        schema["required"] = json!(required);
    }
    schema
}

fn names(bucket: &Map<String, Value>) -> Option<Vec<String>> {
    (!bucket.is_empty()).then(|| bucket.keys().cloned().collect())
}
