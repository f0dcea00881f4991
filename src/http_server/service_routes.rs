//! Service HTTP Routes
//!
//! Server information, health check, and per-container metadata and field
//! listing.

use std::collections::BTreeMap;
use std::sync::Arc;

use axum::{
    extract::{Path, State},
    http::StatusCode,
    response::{IntoResponse, Response},
    routing::get,
    Json, Router,
};
use serde::Serialize;

use crate::index::IndexDescriptor;
use crate::search::CacheStats;

use super::errors::ApiResult;
use super::state::AppState;

/// Health check response
#[derive(Debug, Serialize)]
pub struct HealthResponse {
    pub status: String,
}

#[derive(Debug, Serialize)]
pub struct AboutResponse {
    #[serde(rename = "appName")]
    pub app_name: String,
    pub version: String,
    #[serde(rename = "startedAt")]
    pub started_at: String,
    #[serde(rename = "baseURI")]
    pub base_uri: String,
    #[serde(rename = "searchSessions")]
    pub search_sessions: SessionReport,
}

/// Live search sessions and cache counters
#[derive(Debug, Serialize)]
pub struct SessionReport {
    pub live: usize,
    #[serde(flatten)]
    pub stats: CacheStats,
}

#[derive(Debug, Serialize)]
pub struct ContainerMetadata {
    pub id: String,
    /// Number of stored annotations
    pub size: u64,
    pub indexes: Vec<IndexDescriptor>,
}

/// Service routes
pub fn service_routes(state: Arc<AppState>) -> Router {
    Router::new()
        .route("/about", get(about_handler))
        .route("/services/{container}/metadata", get(metadata_handler))
        .route("/services/{container}/fields", get(fields_handler))
        .with_state(state)
}

/// Health check route
pub fn health_routes() -> Router {
    Router::new().route("/health", get(health_handler))
}

async fn health_handler() -> impl IntoResponse {
    let response = HealthResponse {
        status: "ok".to_string(),
    };

    (StatusCode::OK, Json(response))
}

async fn about_handler(State(state): State<Arc<AppState>>) -> ApiResult<Response> {
    let about = AboutResponse {
        app_name: env!("CARGO_PKG_NAME").to_string(),
        version: env!("CARGO_PKG_VERSION").to_string(),
        started_at: state.started_at.to_rfc3339(),
        base_uri: state.uris.base().to_string(),
        search_sessions: SessionReport {
            live: state.cache().len(),
            stats: state.cache().stats(),
        },
    };
    state.json(StatusCode::OK, &about)
}

async fn metadata_handler(
    State(state): State<Arc<AppState>>,
    Path(container): Path<String>,
) -> ApiResult<Response> {
    let indexes = state.indexes.list_indexes(&container)?;
    let metadata = ContainerMetadata {
        id: state.uris.container_url(&container),
        size: state.store.count(&container, &[])?,
        indexes,
    };
    state.json(StatusCode::OK, &metadata)
}

/// Dotted annotation field paths with the number of annotations using each
async fn fields_handler(
    State(state): State<Arc<AppState>>,
    Path(container): Path<String>,
) -> ApiResult<Response> {
    let counts: BTreeMap<String, u64> = state.store.field_counts(&container)?;
    state.json(StatusCode::OK, &counts)
}
