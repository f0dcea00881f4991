//! Search HTTP Routes
//!
//! - `POST /services/{container}/search` - create a search session
//! - `GET /services/{container}/search/{search_id}?page=N` - result page
//! - `GET /services/{container}/search/{search_id}/info` - query and hits

use std::sync::Arc;

use axum::{
    body::Bytes,
    extract::{Path, Query, State},
    http::{header, HeaderValue, StatusCode},
    response::Response,
    routing::{get, post},
    Router,
};
use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::query::QueryExpression;

use super::errors::{ApiError, ApiResult};
use super::state::{AppState, ANNOTATION_PAGE_CONTENT_TYPE};

#[derive(Debug, Serialize)]
pub struct SearchCreatedResponse {
    pub hits: u64,
}

#[derive(Debug, Deserialize)]
pub struct PageQuery {
    #[serde(default)]
    pub page: Option<String>,
}

/// Search routes
pub fn search_routes(state: Arc<AppState>) -> Router {
    Router::new()
        .route("/services/{container}/search", post(create_search_handler))
        .route(
            "/services/{container}/search/{search_id}",
            get(result_page_handler),
        )
        .route(
            "/services/{container}/search/{search_id}/info",
            get(search_info_handler),
        )
        .with_state(state)
}

/// Parse a request body as a query expression
fn parse_query(body: &[u8]) -> ApiResult<QueryExpression> {
    let value: Value = serde_json::from_slice(body)
        .map_err(|e| ApiError::InvalidBody(format!("Invalid JSON: {}", e)))?;
    Ok(QueryExpression::from_json(value)?)
}

fn header_value(value: &str) -> ApiResult<HeaderValue> {
    HeaderValue::from_str(value).map_err(|e| ApiError::Internal(e.to_string()))
}

async fn create_search_handler(
    State(state): State<Arc<AppState>>,
    Path(container): Path<String>,
    body: Bytes,
) -> ApiResult<Response> {
    state.search.check_container(&container)?;
    let query = parse_query(&body)?;
    let created = state.search.create_search(&container, query)?;

    let location = state.uris.search_url(&container, &created.id);
    let info = state.uris.search_info_url(&container, &created.id);

    let mut response = state.json(
        StatusCode::CREATED,
        &SearchCreatedResponse { hits: created.hits },
    )?;
    let headers = response.headers_mut();
    headers.insert(header::LOCATION, header_value(&location)?);
    headers.insert(header::LINK, header_value(&format!("<{}>; rel=\"info\"", info))?);
    Ok(response)
}

async fn result_page_handler(
    State(state): State<Arc<AppState>>,
    Path((container, search_id)): Path<(String, String)>,
    Query(query): Query<PageQuery>,
) -> ApiResult<Response> {
    let page = match query.page.as_deref() {
        None | Some("") => 0,
        Some(raw) => raw
            .parse::<u64>()
            .map_err(|_| ApiError::InvalidQueryParam(format!("page={}", raw)))?,
    };

    let result = state.search.get_result_page(&container, &search_id, page)?;
    state.render(StatusCode::OK, &result, ANNOTATION_PAGE_CONTENT_TYPE)
}

async fn search_info_handler(
    State(state): State<Arc<AppState>>,
    Path((container, search_id)): Path<(String, String)>,
) -> ApiResult<Response> {
    let info = state.search.get_search_info(&container, &search_id)?;
    state.json(StatusCode::OK, &info)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::query::QueryError;

    #[test]
    fn test_parse_query_object() {
        let query = parse_query(br#"{"type": "Annotation"}"#).unwrap();
        assert_eq!(query.len(), 1);
    }

    #[test]
    fn test_parse_query_rejects_array() {
        assert_eq!(
            parse_query(b"[1, 2]").unwrap_err(),
            ApiError::InvalidQuery(QueryError::NotAnObject("list".to_string()))
        );
    }

    #[test]
    fn test_parse_query_rejects_garbage() {
        assert!(matches!(
            parse_query(b"{nope"),
            Err(ApiError::InvalidBody(_))
        ));
    }
}
