//! Listing HTTP Routes
//!
//! - `GET /list/containers` - URLs of all containers
//! - `GET /list/{container}/annotations?start=N` - one page of annotation
//!   URLs, sorted

use std::sync::Arc;

use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    response::Response,
    routing::get,
    Router,
};
use serde::Deserialize;
use serde_json::Value;

use crate::store::ANNOTATION_NAME_FIELD;

use super::errors::{ApiError, ApiResult};
use super::state::AppState;

#[derive(Debug, Deserialize)]
pub struct StartQuery {
    #[serde(default)]
    pub start: Option<String>,
}

/// Listing routes
pub fn list_routes(state: Arc<AppState>) -> Router {
    Router::new()
        .route("/list/containers", get(containers_handler))
        .route("/list/{container}/annotations", get(annotations_handler))
        .with_state(state)
}

async fn containers_handler(State(state): State<Arc<AppState>>) -> ApiResult<Response> {
    let mut urls: Vec<String> = state
        .store
        .container_names()?
        .iter()
        .map(|name| state.uris.container_url(name))
        .collect();
    urls.sort();
    state.json(StatusCode::OK, &urls)
}

async fn annotations_handler(
    State(state): State<Arc<AppState>>,
    Path(container): Path<String>,
    Query(query): Query<StartQuery>,
) -> ApiResult<Response> {
    let start = match query.start.as_deref() {
        None | Some("") => 0,
        Some(raw) => raw
            .parse::<usize>()
            .map_err(|_| ApiError::InvalidQueryParam(format!("start={}", raw)))?,
    };
    state.search.check_container(&container)?;

    let mut urls: Vec<String> = state
        .store
        .aggregate(&container, &[])?
        .iter()
        .filter_map(|record| record.get(ANNOTATION_NAME_FIELD).and_then(Value::as_str))
        .map(|name| state.uris.annotation_url(&container, name))
        .collect();
    urls.sort();

    let page_size = usize::try_from(state.search.page_size()).unwrap_or(usize::MAX);
    let page: Vec<String> = urls.into_iter().skip(start).take(page_size).collect();
    state.json(StatusCode::OK, &page)
}
