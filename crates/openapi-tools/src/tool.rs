//! Conversion output types.

use crate::error::Result;
use rmcp::model::{JsonObject, Tool};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::sync::Arc;

/// Result of one conversion. Always produced, whatever the input.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ToolGenerationResult {
    pub result: Vec<McpTool>,
    pub errors: Vec<ToolGenerationError>,
}

impl ToolGenerationResult {
    /// A result carrying a single fatal error and no tools.
    #[must_use]
    pub fn fatal(key: ErrorKey, message: impl Into<String>) -> Self {
        Self {
            result: Vec::new(),
            errors: vec![ToolGenerationError::new(key, message)],
        }
    }

    /// Whether any error should block committing the tool list.
    #[must_use]
    pub fn has_fatal_errors(&self) -> bool {
        self.errors.iter().any(|e| e.key.is_fatal())
    }
}

/// One generated tool: what the MCP client sees plus how the gateway routes it.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct McpTool {
    pub tool_definition: ToolDefinition,
    pub gateway_mapping: GatewayMapping,
}

impl McpTool {
    /// Convert the tool definition into the MCP SDK `Tool` type.
    ///
    /// # Errors
    ///
    /// Returns an error if the input or output schema is not a JSON object.
    pub fn to_rmcp_tool(&self) -> Result<Tool> {
        let def = &self.tool_definition;
        let input_schema: JsonObject = serde_json::from_value(def.input_schema.clone())?;
        let mut tool = Tool::new(
            def.name.clone(),
            def.description.clone(),
            Arc::new(input_schema),
        );
        if let Some(output) = &def.output_schema {
            let output: JsonObject = serde_json::from_value(output.clone())?;
            tool.output_schema = Some(Arc::new(output));
        }
        tool.annotations = def.annotations.clone().map(ToolAnnotations::into_rmcp);
        Ok(tool)
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ToolDefinition {
    pub name: String,
    pub description: String,
    pub input_schema: Value,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub output_schema: Option<Value>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub annotations: Option<ToolAnnotations>,
}

/// Sparse MCP tool hints.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ToolAnnotations {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub title: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub read_only_hint: Option<bool>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub destructive_hint: Option<bool>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub idempotent_hint: Option<bool>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub open_world_hint: Option<bool>,
}

impl ToolAnnotations {
    #[must_use]
    pub fn is_empty(&self) -> bool {
        *self == Self::default()
    }

    #[must_use]
    pub fn into_rmcp(self) -> rmcp::model::ToolAnnotations {
        rmcp::model::ToolAnnotations {
            title: self.title,
            read_only_hint: self.read_only_hint,
            destructive_hint: self.destructive_hint,
            idempotent_hint: self.idempotent_hint,
            open_world_hint: self.open_world_hint,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct GatewayMapping {
    pub http: HttpMapping,
}

/// How a tool call maps back onto the HTTP API.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct HttpMapping {
    /// Uppercase HTTP verb.
    pub method: String,
    /// Path template with `:name` placeholders (e.g. `/user/:id`).
    pub path: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub path_params: Option<Vec<String>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub query_params: Option<Vec<String>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub headers: Option<Vec<String>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub content_type: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ToolGenerationError {
    pub key: ErrorKey,
    pub message: String,
}

impl ToolGenerationError {
    pub fn new(key: ErrorKey, message: impl Into<String>) -> Self {
        Self {
            key,
            message: message.into(),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum ErrorKey {
    /// The text is not YAML/JSON.
    InvalidFormat,
    /// The document failed structural validation.
    InvalidSpec,
    /// `$ref` dereferencing failed.
    InvalidRefs,
    /// Two operations map to the same tool name. Both are still emitted.
    DuplicateName,
}

impl ErrorKey {
    /// Fatal errors come with an empty tool list.
    #[must_use]
    pub fn is_fatal(self) -> bool {
        !matches!(self, ErrorKey::DuplicateName)
    }

    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            ErrorKey::InvalidFormat => "invalidFormat",
            ErrorKey::InvalidSpec => "invalidSpec",
            ErrorKey::InvalidRefs => "invalidRefs",
            ErrorKey::DuplicateName => "duplicateName",
        }
    }
}

impl std::fmt::Display for ErrorKey {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}
