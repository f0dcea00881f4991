//! # URI Factory
//!
//! Builds the externally visible URLs of containers, annotations, searches
//! and indexes from the configured external base URL. Names taken from
//! requests or the store are percent-encoded as path segments.

use std::borrow::Cow;

/// Path segment of the W3C annotation protocol resources
pub const W3C_PATH: &str = "w3c";

/// Path segment of the search and index services
pub const SERVICES_PATH: &str = "services";

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UriFactory {
    base: String,
}

impl UriFactory {
    pub fn new(external_base_url: impl Into<String>) -> Self {
        let base: String = external_base_url.into();
        Self {
            base: base.trim_end_matches('/').to_string(),
        }
    }

    pub fn base(&self) -> &str {
        &self.base
    }

    pub fn container_url(&self, container: &str) -> String {
        format!("{}/{}/{}/", self.base, W3C_PATH, encode_segment(container))
    }

    pub fn annotation_url(&self, container: &str, annotation_name: &str) -> String {
        format!(
            "{}/{}/{}/{}",
            self.base,
            W3C_PATH,
            encode_segment(container),
            encode_segment(annotation_name)
        )
    }

    /// Canonical result-page URL of a search session (page 0)
    pub fn search_url(&self, container: &str, search_id: &str) -> String {
        format!(
            "{}/{}/{}/search/{}",
            self.base,
            SERVICES_PATH,
            encode_segment(container),
            encode_segment(search_id)
        )
    }

    pub fn search_info_url(&self, container: &str, search_id: &str) -> String {
        format!("{}/info", self.search_url(container, search_id))
    }

    pub fn index_url(&self, container: &str, field: &str, index_type: &str) -> String {
        format!(
            "{}/{}/{}/indexes/{}/{}",
            self.base,
            SERVICES_PATH,
            encode_segment(container),
            encode_segment(field),
            encode_segment(index_type)
        )
    }
}

/// Percent-encode everything outside the RFC 3986 unreserved set
pub fn encode_segment(segment: &str) -> Cow<'_, str> {
    let unreserved = |b: u8| b.is_ascii_alphanumeric() || matches!(b, b'-' | b'.' | b'_' | b'~');
    if segment.bytes().all(unreserved) {
        return Cow::Borrowed(segment);
    }

    let mut encoded = String::with_capacity(segment.len() * 3);
    for b in segment.bytes() {
        if unreserved(b) {
            encoded.push(b as char);
        } else {
            encoded.push_str(&format!("%{:02X}", b));
        }
    }
    Cow::Owned(encoded)
}

/// Rewrite `uri` so its `page` query parameter is `page`, keeping any other
/// query parameters in place
pub fn with_page(uri: &str, page: u64) -> String {
    let (path, query) = match uri.split_once('?') {
        Some((path, query)) => (path, query),
        None => (uri, ""),
    };

    let mut params: Vec<String> = query
        .split('&')
        .filter(|p| !p.is_empty() && p.split('=').next() != Some("page"))
        .map(str::to_string)
        .collect();
    params.push(format!("page={}", page));

    format!("{}?{}", path, params.join("&"))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_trailing_slash_trimmed() {
        let uris = UriFactory::new("https://annorepo.example.org/");
        assert_eq!(
            uris.annotation_url("letters", "a1"),
            "https://annorepo.example.org/w3c/letters/a1"
        );
    }

    #[test]
    fn test_search_urls() {
        let uris = UriFactory::new("http://localhost:8080");
        assert_eq!(
            uris.search_url("letters", "abc"),
            "http://localhost:8080/services/letters/search/abc"
        );
        assert_eq!(
            uris.search_info_url("letters", "abc"),
            "http://localhost:8080/services/letters/search/abc/info"
        );
    }

    #[test]
    fn test_with_page_appends() {
        assert_eq!(with_page("http://h/s/1", 2), "http://h/s/1?page=2");
    }

    #[test]
    fn test_with_page_replaces() {
        assert_eq!(
            with_page("http://h/s/1?x=1&page=5", 6),
            "http://h/s/1?x=1&page=6"
        );
    }

    #[test]
    fn test_segments_are_encoded() {
        let uris = UriFactory::new("http://h");
        assert_eq!(
            uris.annotation_url("my letters", "a?b#c"),
            "http://h/w3c/my%20letters/a%3Fb%23c"
        );
        assert_eq!(
            uris.index_url("letters", "body.type", "hashed"),
            "http://h/services/letters/indexes/body.type/hashed"
        );
        assert_eq!(uris.container_url("brief/1"), "http://h/w3c/brief%2F1/");
    }

    #[test]
    fn test_encode_non_ascii() {
        assert_eq!(encode_segment("café"), "caf%C3%A9");
        assert!(matches!(encode_segment("plain-name_1.x~"), Cow::Borrowed(_)));
    }

    #[test]
    fn test_with_page_keeps_encoded_path() {
        let uris = UriFactory::new("http://h");
        assert_eq!(
            with_page(&uris.search_url("my letters", "abc"), 1),
            "http://h/services/my%20letters/search/abc?page=1"
        );
    }
}
