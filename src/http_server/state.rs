//! Shared handler state

use std::sync::Arc;

use axum::http::{header, HeaderValue, StatusCode};
use axum::response::{IntoResponse, Response};
use chrono::{DateTime, Utc};
use serde::Serialize;

use crate::config::Config;
use crate::index::IndexTranslator;
use crate::query::{FilterCompiler, QueryAssembler};
use crate::search::{Clock, SearchService, SessionCache, SystemClock};
use crate::store::DocumentStore;
use crate::uri::UriFactory;

use super::errors::{ApiError, ApiResult};

/// Media type of annotation pages
pub const ANNOTATION_PAGE_CONTENT_TYPE: &str =
    "application/ld+json; profile=\"http://www.w3.org/ns/anno.jsonld\"";

/// State shared by every handler
pub struct AppState {
    pub store: Arc<dyn DocumentStore>,
    pub search: SearchService,
    pub indexes: IndexTranslator,
    pub uris: UriFactory,
    pub pretty_print: bool,
    pub started_at: DateTime<Utc>,
}

impl AppState {
    /// Wire services from configuration on the wall clock
    pub fn new(config: &Config, store: Arc<dyn DocumentStore>) -> Self {
        Self::with_clock(config, store, Arc::new(SystemClock))
    }

    /// Wire services with an explicit session clock
    pub fn with_clock(config: &Config, store: Arc<dyn DocumentStore>, clock: Arc<dyn Clock>) -> Self {
        let uris = UriFactory::new(config.external_base_url.clone());
        let cache = Arc::new(SessionCache::new(config.search.cache_config(), clock));
        let assembler = QueryAssembler::new(FilterCompiler::new(config.range_selector_type.clone()));
        let search = SearchService::new(
            Arc::clone(&store),
            assembler,
            cache,
            uris.clone(),
            config.page_size,
        );
        let indexes = IndexTranslator::new(Arc::clone(&store), uris.clone());

        Self {
            store,
            search,
            indexes,
            uris,
            pretty_print: config.pretty_print,
            started_at: Utc::now(),
        }
    }

    pub fn cache(&self) -> &Arc<SessionCache> {
        self.search.cache()
    }

    /// Serialize a JSON response body, indented when configured
    pub fn json<T: Serialize>(&self, status: StatusCode, value: &T) -> ApiResult<Response> {
        self.render(status, value, "application/json")
    }

    pub fn render<T: Serialize>(&self, status: StatusCode, value: &T, content_type: &'static str) -> ApiResult<Response> {
        let body = if self.pretty_print {
            serde_json::to_vec_pretty(value)
        } else {
            serde_json::to_vec(value)
        }
        .map_err(|e| ApiError::Internal(e.to_string()))?;

        Ok((
            status,
            [(header::CONTENT_TYPE, HeaderValue::from_static(content_type))],
            body,
        )
            .into_response())
    }
}
