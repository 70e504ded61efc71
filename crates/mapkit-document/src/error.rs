//! Error types for the document model.

use mapkit_history::ChangesetError;
use thiserror::Error;

use crate::model::{FeatureId, LayerId, LayoutId, SharedViewId};

/// Errors raised by document mutation and query primitives.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum DocumentError {
    #[error("Layer {0} not found")]
    LayerNotFound(LayerId),

    #[error("Feature {0} not found")]
    FeatureNotFound(FeatureId),

    #[error("Layout page {0} not found")]
    LayoutNotFound(LayoutId),

    #[error("Shared view {0} not found")]
    SharedViewNotFound(SharedViewId),

    /// An entity with the same id is already part of the document.
    #[error("Duplicate id: {0}")]
    DuplicateId(String),

    #[error("Index {index} out of bounds (len {len})")]
    IndexOutOfBounds { index: usize, len: usize },

    #[error("Invalid value for {field}: {reason}")]
    InvalidValue { field: String, reason: String },
}

impl DocumentError {
    pub fn invalid(field: impl Into<String>, reason: impl Into<String>) -> Self {
        DocumentError::InvalidValue {
            field: field.into(),
            reason: reason.into(),
        }
    }
}

/// Result type alias for document operations.
pub type DocumentResult<T> = Result<T, DocumentError>;

impl From<DocumentError> for ChangesetError {
    fn from(err: DocumentError) -> Self {
        match err {
            DocumentError::LayerNotFound(id) => ChangesetError::not_found("Layer", id),
            DocumentError::FeatureNotFound(id) => ChangesetError::not_found("Feature", id),
            DocumentError::LayoutNotFound(id) => ChangesetError::not_found("Layout page", id),
            DocumentError::SharedViewNotFound(id) => ChangesetError::not_found("Shared view", id),
            other => ChangesetError::Model(Box::new(other)),
        }
    }
}
