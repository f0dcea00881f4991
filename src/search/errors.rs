//! # Search Errors

use thiserror::Error;

use crate::query::QueryError;
use crate::store::StoreError;

/// Result type for search operations
pub type SearchResult<T> = Result<T, SearchError>;

#[derive(Debug, Clone, PartialEq, Error)]
pub enum SearchError {
    /// The query failed to compile; nothing was executed or cached
    #[error("{0}")]
    InvalidQuery(#[from] QueryError),

    #[error("Annotation Container '{0}' not found")]
    ContainerNotFound(String),

    /// Unknown, expired or evicted session id
    #[error("No search results found for this search id. The search might have expired.")]
    SearchExpired(String),

    /// Backend failure, never retried here
    #[error("{0}")]
    Store(StoreError),
}

impl From<StoreError> for SearchError {
    fn from(err: StoreError) -> Self {
        match err {
            StoreError::ContainerNotFound(name) => SearchError::ContainerNotFound(name),
            other => SearchError::Store(other),
        }
    }
}
