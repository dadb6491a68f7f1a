//! Validation + dereferencing seam.
//!
//! The converter only observes "resolves" or "rejects with a message" from these two steps,
//! so any implementation satisfying [`SpecDelegate`] can be plugged in.

use crate::error::DelegateError;
use crate::{resolver, validator};
use async_trait::async_trait;
use serde_json::Value;

#[async_trait]
pub trait SpecDelegate: Send + Sync {
    /// Check the structural validity of a normalized document.
    async fn validate(&self, document: &Value) -> Result<(), DelegateError>;

    /// Return the document with every `$ref` replaced by the referenced subtree.
    async fn dereference(&self, document: Value) -> Result<Value, DelegateError>;
}

/// Built-in delegate: JSON Schema structural validation and in-document `$ref` expansion.
#[derive(Debug, Clone, Copy, Default)]
pub struct BuiltinDelegate;

#[async_trait]
impl SpecDelegate for BuiltinDelegate {
    async fn validate(&self, document: &Value) -> Result<(), DelegateError> {
        validator::validate_document(document)
    }

    async fn dereference(&self, document: Value) -> Result<Value, DelegateError> {
        resolver::dereference_document(&document)
    }
}

#[async_trait]
impl<T: SpecDelegate + ?Sized> SpecDelegate for std::sync::Arc<T> {
    async fn validate(&self, document: &Value) -> Result<(), DelegateError> {
        (**self).validate(document).await
    }

    async fn dereference(&self, document: Value) -> Result<Value, DelegateError> {
        (**self).dereference(document).await
    }
}
