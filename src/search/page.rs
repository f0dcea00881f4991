//! Result pages and their pagination arithmetic.

use serde::Serialize;
use serde_json::Value;

use crate::uri::with_page;

/// JSON-LD context of Web Annotation documents
pub const ANNO_JSONLD_URL: &str = "http://www.w3.org/ns/anno.jsonld";

/// Position of one page within a result set
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PageBounds {
    pub prev: Option<u64>,
    pub start_index: u64,
    pub next: Option<u64>,
}

impl PageBounds {
    /// `page` is 0-based; `returned` is the number of items on this page
    pub fn compute(page: u64, page_size: u64, total: u64, returned: u64) -> Self {
        let start_index = page.saturating_mul(page_size);
        Self {
            prev: page.checked_sub(1),
            start_index,
            next: (start_index.saturating_add(returned) < total).then(|| page + 1),
        }
    }
}

/// One page of search results
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct AnnotationPage {
    #[serde(rename = "@context")]
    pub context: Vec<String>,
    pub id: String,
    #[serde(rename = "partOf")]
    pub part_of: String,
    #[serde(rename = "startIndex")]
    pub start_index: u64,
    pub items: Vec<Value>,
    pub prev: Option<String>,
    pub next: Option<String>,
}

impl AnnotationPage {
    /// Build the page document; links are `search_url` with a rewritten
    /// `page` parameter
    pub fn build(search_url: &str, page: u64, page_size: u64, total: u64, items: Vec<Value>) -> Self {
        let bounds = PageBounds::compute(page, page_size, total, items.len() as u64);
        Self {
            context: vec![ANNO_JSONLD_URL.to_string()],
            id: with_page(search_url, page),
            part_of: search_url.to_string(),
            start_index: bounds.start_index,
            items,
            prev: bounds.prev.map(|p| with_page(search_url, p)),
            next: bounds.next.map(|p| with_page(search_url, p)),
        }
    }
}
