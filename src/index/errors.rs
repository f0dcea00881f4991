//! # Index Errors
//!
//! Errors of the index descriptor translator, plus the typed decode failure
//! of the native index-name codec.

use thiserror::Error;

use crate::store::StoreError;

/// Result type for index operations
pub type IndexResult<T> = Result<T, IndexError>;

/// Index translator errors
#[derive(Debug, Clone, PartialEq, Error)]
pub enum IndexError {
    /// Requested index type is not one of hashed/ascending/descending/text
    #[error("Unknown indexType {0}")]
    InvalidIndexType(String),

    #[error("No {index_type} index found for field '{field}'")]
    IndexNotFound { field: String, index_type: String },

    #[error("Annotation Container '{0}' not found")]
    ContainerNotFound(String),

    #[error("{0}")]
    Store(StoreError),
}

impl From<StoreError> for IndexError {
    fn from(err: StoreError) -> Self {
        match err {
            StoreError::ContainerNotFound(name) => IndexError::ContainerNotFound(name),
            other => IndexError::Store(other),
        }
    }
}

/// Native index names that do not encode an annotation index
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum IndexNameError {
    /// Outside the annotation namespace, e.g. the primary key index
    #[error("Index '{0}' is not an annotation index")]
    NotAnnotationIndex(String),

    /// No `_<suffix>` part
    #[error("Index '{0}' has no type suffix")]
    MissingSuffix(String),

    #[error("Unexpected index type '{suffix}' in '{name}'")]
    UnrecognizedSuffix { name: String, suffix: String },
}
