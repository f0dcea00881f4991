//! Index HTTP Routes
//!
//! Endpoints for managing annotation field indexes of a container.

use std::sync::Arc;

use axum::{
    extract::{Path, State},
    http::{header, HeaderValue, StatusCode},
    response::{IntoResponse, Response},
    routing::get,
    Router,
};

use super::errors::{ApiError, ApiResult};
use super::state::AppState;

/// Index routes
pub fn index_routes(state: Arc<AppState>) -> Router {
    Router::new()
        .route("/services/{container}/indexes", get(list_indexes_handler))
        .route(
            "/services/{container}/indexes/{field}/{index_type}",
            get(get_index_handler)
                .put(add_index_handler)
                .delete(delete_index_handler),
        )
        .with_state(state)
}

async fn list_indexes_handler(
    State(state): State<Arc<AppState>>,
    Path(container): Path<String>,
) -> ApiResult<Response> {
    let indexes = state.indexes.list_indexes(&container)?;
    state.json(StatusCode::OK, &indexes)
}

async fn add_index_handler(
    State(state): State<Arc<AppState>>,
    Path((container, field, index_type)): Path<(String, String, String)>,
) -> ApiResult<Response> {
    let descriptor = state.indexes.add_index(&container, &field, &index_type)?;
    let location =
        HeaderValue::from_str(&descriptor.url).map_err(|e| ApiError::Internal(e.to_string()))?;

    let mut response = state.json(StatusCode::CREATED, &descriptor)?;
    response.headers_mut().insert(header::LOCATION, location);
    Ok(response)
}

async fn get_index_handler(
    State(state): State<Arc<AppState>>,
    Path((container, field, index_type)): Path<(String, String, String)>,
) -> ApiResult<Response> {
    let descriptor = state.indexes.get_index(&container, &field, &index_type)?;
    state.json(StatusCode::OK, &descriptor)
}

async fn delete_index_handler(
    State(state): State<Arc<AppState>>,
    Path((container, field, index_type)): Path<(String, String, String)>,
) -> ApiResult<Response> {
    state.indexes.delete_index(&container, &field, &index_type)?;
    Ok(StatusCode::NO_CONTENT.into_response())
}
