//! Structural validation of normalized `OpenAPI` documents.
//!
//! The check covers the document skeleton the converter walks (version, paths, operations,
//! parameters). Schemas themselves are not validated, so 3.0 and 3.1 schema dialects both pass.

use crate::error::DelegateError;
use serde_json::{Value, json};
use std::sync::LazyLock;

static DOCUMENT_VALIDATOR: LazyLock<Result<jsonschema::Validator, String>> =
    LazyLock::new(|| jsonschema::validator_for(&document_schema()).map_err(|e| e.to_string()));

/// Validate a normalized document against the structural `OpenAPI` schema.
///
/// # Errors
///
/// Returns the first violation, prefixed with its location in the document.
pub fn validate_document(doc: &Value) -> Result<(), DelegateError> {
    let validator = DOCUMENT_VALIDATOR.as_ref().map_err(|e| {
        DelegateError::new(format!("Invalid built-in OpenAPI document schema: {e}"))
    })?;

    let Some(error) = validator.iter_errors(doc).next() else {
        return Ok(());
    };

    let location = error.instance_path().to_string();
    let message = if location.is_empty() {
        error.to_string()
    } else {
        format!("{error} (at {location})")
    };
    Err(DelegateError::new(message))
}

fn document_schema() -> Value {
    json!({
        "$schema": "https://json-schema.org/draft/2020-12/schema",
        "type": "object",
        "required": ["openapi"],
        "properties": {
            "openapi": { "type": "string", "pattern": "^3\\.[01]\\.\\d+" },
            "info": {
                "type": "object",
                "required": ["title", "version"],
                "properties": {
                    "title": { "type": "string" },
                    "version": { "type": ["string", "number"] }
                }
            },
            "paths": {
                "type": "object",
                "propertyNames": { "pattern": "^(/|x-)" },
                "additionalProperties": { "$ref": "#/$defs/pathItem" }
            },
            "webhooks": { "type": "object" },
            "components": { "type": "object" },
            "servers": { "type": "array" }
        },
        "$defs": {
            "pathItem": {
                "type": "object",
                "properties": {
                    "get": { "$ref": "#/$defs/operation" },
                    "put": { "$ref": "#/$defs/operation" },
                    "post": { "$ref": "#/$defs/operation" },
                    "delete": { "$ref": "#/$defs/operation" },
                    "options": { "$ref": "#/$defs/operation" },
                    "head": { "$ref": "#/$defs/operation" },
                    "patch": { "$ref": "#/$defs/operation" },
                    "trace": { "$ref": "#/$defs/operation" },
                    "parameters": { "$ref": "#/$defs/parameters" }
                }
            },
            "operation": {
                "type": "object",
                "properties": {
                    "operationId": { "type": "string" },
                    "summary": { "type": "string" },
                    "description": { "type": "string" },
                    "parameters": { "$ref": "#/$defs/parameters" },
                    "requestBody": { "type": "object" },
                    "responses": { "type": "object" }
                }
            },
            "parameters": {
                "type": "array",
                "items": {
                    "anyOf": [
                        { "type": "object", "required": ["$ref"] },
                        { "$ref": "#/$defs/parameter" }
                    ]
                }
            },
            "parameter": {
                "type": "object",
                "required": ["name", "in"],
                "properties": {
                    "name": { "type": "string" },
                    "in": { "enum": ["path", "query", "header", "cookie"] },
                    "required": { "type": "boolean" },
                    "description": { "type": "string" },
                    "schema": { "type": ["object", "boolean"] }
                }
            }
        }
    })
}
