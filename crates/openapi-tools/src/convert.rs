//! Conversion pipeline.

use crate::config::ConvertOptions;
use crate::delegate::{BuiltinDelegate, SpecDelegate};
use crate::emitter::emit_tool;
use crate::tool::{ErrorKey, ToolGenerationResult};
use crate::walker::OperationWalker;
use crate::{document, swagger};

/// Converts spec text into MCP tools.
///
/// Stateless between calls; one converter can serve concurrent conversions.
#[derive(Debug, Clone, Default)]
pub struct OpenApiToolConverter<D = BuiltinDelegate> {
    delegate: D,
    options: ConvertOptions,
}

impl<D: SpecDelegate> OpenApiToolConverter<D> {
    pub fn new(delegate: D, options: ConvertOptions) -> Self {
        Self { delegate, options }
    }

    #[must_use]
    pub fn options(&self) -> &ConvertOptions {
        &self.options
    }

    /// Convert YAML or JSON spec text.
    ///
    /// Never fails: problems are reported in [`ToolGenerationResult::errors`]. Parse,
    /// validation and dereference failures are fatal and come with an empty tool list.
    pub async fn convert(&self, spec: &str) -> ToolGenerationResult {
        let mut doc = match document::parse_document(spec) {
            Ok(doc) => doc,
            Err(e) => {
                tracing::debug!(error = %e, "spec text is not YAML/JSON");
                return ToolGenerationResult::fatal(
                    ErrorKey::InvalidFormat,
                    "Failed to parse specification",
                );
            }
        };

        if document::is_empty_document(&doc) {
            tracing::debug!("empty spec, nothing to convert");
            return ToolGenerationResult::default();
        }

        if swagger::is_legacy(&doc) {
            tracing::debug!("upgrading Swagger 2.0 document");
            swagger::normalize(&mut doc);
        }

        if let Err(e) = self.delegate.validate(&doc).await {
            tracing::warn!(error = %e, "spec failed validation");
            return ToolGenerationResult::fatal(ErrorKey::InvalidSpec, e.message());
        }

        let doc = match self.delegate.dereference(doc).await {
            Ok(doc) => doc,
            Err(e) => {
                tracing::warn!(error = %e, "spec failed dereferencing");
                return ToolGenerationResult::fatal(
                    ErrorKey::InvalidRefs,
                    format!("Failed to dereference OpenAPI spec: {}", e.message()),
                );
            }
        };

        let (records, errors) = OperationWalker::new(&self.options).walk(&doc);
        let result: Vec<_> = records.into_iter().map(emit_tool).collect();

        tracing::debug!(
            tools = result.len(),
            errors = errors.len(),
            "spec converted"
        );

        ToolGenerationResult { result, errors }
    }
}

/// Convert with the built-in delegate and default options.
pub async fn convert_openapi_to_mcp_tools(spec: &str) -> ToolGenerationResult {
    OpenApiToolConverter::<BuiltinDelegate>::default()
        .convert(spec)
        .await
}
