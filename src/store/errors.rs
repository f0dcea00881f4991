//! # Store Errors

use thiserror::Error;

/// Result type for store operations
pub type StoreResult<T> = Result<T, StoreError>;

/// Errors reported by the document store
#[derive(Debug, Clone, PartialEq, Error)]
pub enum StoreError {
    #[error("Container not found: {0}")]
    ContainerNotFound(String),

    #[error("Container already exists: {0}")]
    ContainerExists(String),

    #[error("Index not found: {0}")]
    IndexNotFound(String),

    /// Pipeline or backend failure (timeouts, connectivity, bad stages)
    #[error("Execution failed: {0}")]
    Execution(String),

    /// Failure loading seed data
    #[error("Seed error: {0}")]
    Seed(String),

    #[error("Store lock poisoned")]
    LockPoisoned,
}
