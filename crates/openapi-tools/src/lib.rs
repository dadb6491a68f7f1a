//! `OpenAPI` → MCP tool conversion.
//!
//! Turns an `OpenAPI` 3.0/3.1 or Swagger 2.0 document (YAML or JSON text) into MCP tool
//! definitions plus the gateway mapping needed to route a tool call back to the HTTP API.
//!
//! Pipeline: parse → normalize (Swagger 2.0 upgrade) → validate → dereference → walk → emit.
//! Validation and dereferencing go through a [`delegate::SpecDelegate`], so callers can swap
//! in their own implementation.
//!
//! It intentionally contains **no** HTTP execution logic; tools are described, not invoked.

pub mod config;
pub mod convert;
pub mod delegate;
pub mod document;
pub mod emitter;
pub mod error;
pub mod resolver;
pub mod semantics;
pub mod swagger;
pub mod tool;
pub mod validator;
pub mod walker;

pub use config::{AutoDiscoverConfig, ConvertOptions};
pub use convert::{OpenApiToolConverter, convert_openapi_to_mcp_tools};
pub use delegate::{BuiltinDelegate, SpecDelegate};
pub use error::{DelegateError, OpenApiToolsError, Result};
pub use tool::{
    ErrorKey, GatewayMapping, HttpMapping, McpTool, ToolAnnotations, ToolDefinition,
    ToolGenerationError, ToolGenerationResult,
};
