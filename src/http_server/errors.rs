//! # HTTP API Errors
//!
//! Maps service errors onto status codes and a JSON error body.

use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use serde::Serialize;
use thiserror::Error;

use crate::index::IndexError;
use crate::query::QueryError;
use crate::search::SearchError;
use crate::store::StoreError;

/// Result type for HTTP handlers
pub type ApiResult<T> = Result<T, ApiError>;

#[derive(Debug, Clone, PartialEq, Error)]
pub enum ApiError {
    // ==================
    // Client Errors (4xx)
    // ==================
    /// Request body is not usable
    #[error("{0}")]
    InvalidBody(String),

    #[error("Invalid query parameter: {0}")]
    InvalidQueryParam(String),

    #[error("{0}")]
    InvalidQuery(QueryError),

    #[error("Annotation Container '{0}' not found")]
    ContainerNotFound(String),

    #[error("Unknown indexType {0}")]
    InvalidIndexType(String),

    #[error("No search results found for this search id. The search might have expired.")]
    SearchExpired(String),

    #[error("No {index_type} index found for field '{field}'")]
    IndexNotFound { field: String, index_type: String },

    // ==================
    // Server Errors (5xx)
    // ==================
    #[error("{0}")]
    Store(StoreError),

    #[error("Internal error: {0}")]
    Internal(String),
}

impl ApiError {
    /// Get HTTP status code for this error
    pub fn status_code(&self) -> StatusCode {
        match self {
            // 400 Bad Request
            ApiError::InvalidBody(_) => StatusCode::BAD_REQUEST,
            ApiError::InvalidQueryParam(_) => StatusCode::BAD_REQUEST,
            ApiError::InvalidQuery(_) => StatusCode::BAD_REQUEST,
            ApiError::ContainerNotFound(_) => StatusCode::BAD_REQUEST,
            ApiError::InvalidIndexType(_) => StatusCode::BAD_REQUEST,

            // 404 Not Found
            ApiError::SearchExpired(_) => StatusCode::NOT_FOUND,
            ApiError::IndexNotFound { .. } => StatusCode::NOT_FOUND,

            // 500 Internal Server Error
            ApiError::Store(_) => StatusCode::INTERNAL_SERVER_ERROR,
            ApiError::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

impl From<StoreError> for ApiError {
    fn from(err: StoreError) -> Self {
        match err {
            StoreError::ContainerNotFound(name) => ApiError::ContainerNotFound(name),
            other => ApiError::Store(other),
        }
    }
}

impl From<QueryError> for ApiError {
    fn from(err: QueryError) -> Self {
        ApiError::InvalidQuery(err)
    }
}

impl From<SearchError> for ApiError {
    fn from(err: SearchError) -> Self {
        match err {
            SearchError::InvalidQuery(e) => ApiError::InvalidQuery(e),
            SearchError::ContainerNotFound(name) => ApiError::ContainerNotFound(name),
            SearchError::SearchExpired(id) => ApiError::SearchExpired(id),
            SearchError::Store(e) => ApiError::Store(e),
        }
    }
}

impl From<IndexError> for ApiError {
    fn from(err: IndexError) -> Self {
        match err {
            IndexError::InvalidIndexType(t) => ApiError::InvalidIndexType(t),
            IndexError::IndexNotFound { field, index_type } => {
                ApiError::IndexNotFound { field, index_type }
            }
            IndexError::ContainerNotFound(name) => ApiError::ContainerNotFound(name),
            IndexError::Store(e) => ApiError::Store(e),
        }
    }
}

/// Error response body
#[derive(Debug, Serialize)]
pub struct ErrorResponse {
    pub error: String,
    pub code: u16,
}

impl From<ApiError> for ErrorResponse {
    fn from(err: ApiError) -> Self {
        Self {
            code: err.status_code().as_u16(),
            error: err.to_string(),
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status = self.status_code();
        let body = Json(ErrorResponse::from(self));
        (status, body).into_response()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_status_codes() {
        assert_eq!(
            ApiError::ContainerNotFound("c".to_string()).status_code(),
            StatusCode::BAD_REQUEST
        );
        assert_eq!(
            ApiError::SearchExpired("id".to_string()).status_code(),
            StatusCode::NOT_FOUND
        );
        assert_eq!(
            ApiError::Store(StoreError::Execution("timeout".to_string())).status_code(),
            StatusCode::INTERNAL_SERVER_ERROR
        );
    }

    #[test]
    fn test_query_error_keeps_message() {
        let err = ApiError::from(SearchError::InvalidQuery(QueryError::UnknownFunction(
            ":myQueryFunction".to_string(),
        )));
        assert_eq!(err.status_code(), StatusCode::BAD_REQUEST);
        assert_eq!(
            err.to_string(),
            "Unknown query function: ':myQueryFunction'"
        );
    }

    #[test]
    fn test_index_errors() {
        let err = ApiError::from(IndexError::InvalidIndexType("sideways".to_string()));
        assert_eq!(err.status_code(), StatusCode::BAD_REQUEST);

        let err = ApiError::from(IndexError::IndexNotFound {
            field: "body.type".to_string(),
            index_type: "hashed".to_string(),
        });
        assert_eq!(err.status_code(), StatusCode::NOT_FOUND);
    }

    #[test]
    fn test_error_body() {
        let body = ErrorResponse::from(ApiError::ContainerNotFound("letters".to_string()));
        assert_eq!(body.code, 400);
        assert_eq!(body.error, "Annotation Container 'letters' not found");
    }
}
