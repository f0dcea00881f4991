//! # Search Service
//!
//! - `create_search(container, expr)` - compile, count, cache
//! - `get_result_page(container, id, page)` - re-run the cached pipeline
//!   for one page
//! - `get_search_info(container, id)` - the query and its hit count
//!
//! Compilation happens before anything touches the store or the cache, so
//! a rejected query leaves no trace.

use std::sync::Arc;

use serde::Serialize;
use serde_json::{Map, Value};
use tracing::{debug, error, info, warn};
use uuid::Uuid;

use crate::query::{QueryAssembler, QueryExpression, Stage, ANNOTATION_FIELD};
use crate::store::{DocumentStore, StoreError, ANNOTATION_NAME_FIELD};
use crate::uri::UriFactory;

use super::cache::SessionCache;
use super::errors::{SearchError, SearchResult};
use super::page::AnnotationPage;
use super::session::SearchSession;

/// Outcome of creating a search
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SearchCreated {
    pub id: String,
    pub hits: u64,
}

/// Body of the search info resource
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SearchInfo {
    pub query: QueryExpression,
    pub hits: u64,
}

pub struct SearchService {
    store: Arc<dyn DocumentStore>,
    assembler: QueryAssembler,
    cache: Arc<SessionCache>,
    uris: UriFactory,
    page_size: u64,
}

impl SearchService {
    pub fn new(
        store: Arc<dyn DocumentStore>,
        assembler: QueryAssembler,
        cache: Arc<SessionCache>,
        uris: UriFactory,
        page_size: u64,
    ) -> Self {
        Self {
            store,
            assembler,
            cache,
            uris,
            page_size: page_size.max(1),
        }
    }

    pub fn cache(&self) -> &Arc<SessionCache> {
        &self.cache
    }

    pub fn page_size(&self) -> u64 {
        self.page_size
    }

    /// Compile `query`, count its matches and cache the session.
    ///
    /// Session ids are random UUID v4 values; collisions are not checked.
    pub fn create_search(&self, container: &str, query: QueryExpression) -> SearchResult<SearchCreated> {
        self.check_container(container)?;
        let stages = self.assembler.compile_query(&query)?;
        let hits = self
            .store
            .count(container, &stages)
            .map_err(|e| log_store_error(container, e))?;

        let id = Uuid::new_v4().to_string();
        let session = SearchSession::new(&id, container, query, stages, hits, self.cache.now());
        self.cache.put(session);
        info!(container, search_id = %id, hits, "search created");

        Ok(SearchCreated { id, hits })
    }

    /// One page of results, evaluated against the current store contents.
    /// `page` is 0-based.
    pub fn get_result_page(&self, container: &str, search_id: &str, page: u64) -> SearchResult<AnnotationPage> {
        let session = self.lookup(container, search_id)?;

        let mut stages: Vec<Stage> = session.stages().to_vec();
        stages.push(Stage::Skip(page.saturating_mul(self.page_size)));
        stages.push(Stage::Limit(self.page_size));

        let records = self
            .store
            .aggregate(container, &stages)
            .map_err(|e| log_store_error(container, e))?;
        let items: Vec<Value> = records
            .into_iter()
            .map(|record| self.materialize(container, record))
            .collect();
        debug!(container, search_id, page, items = items.len(), "result page");

        Ok(AnnotationPage::build(
            &self.uris.search_url(container, search_id),
            page,
            self.page_size,
            session.total_count(),
            items,
        ))
    }

    /// The submitted query and hit count; never re-runs the pipeline
    pub fn get_search_info(&self, container: &str, search_id: &str) -> SearchResult<SearchInfo> {
        let session = self.lookup(container, search_id)?;
        Ok(SearchInfo {
            query: session.query().clone(),
            hits: session.total_count(),
        })
    }

    fn lookup(&self, container: &str, search_id: &str) -> SearchResult<Arc<SearchSession>> {
        self.check_container(container)?;
        self.cache
            .get(search_id)
            .filter(|s| s.container_name() == container)
            .ok_or_else(|| SearchError::SearchExpired(search_id.to_string()))
    }

    /// Fails with `ContainerNotFound` unless the container exists
    pub fn check_container(&self, container: &str) -> SearchResult<()> {
        match self.store.container_exists(container) {
            Ok(true) => Ok(()),
            Ok(false) => Err(SearchError::ContainerNotFound(container.to_string())),
            Err(e) => Err(log_store_error(container, e)),
        }
    }

    /// Stored record -> annotation body with its public `id`. A record
    /// without a name still yields an item, just without an `id`, so the
    /// page keeps the size the store returned.
    fn materialize(&self, container: &str, record: Value) -> Value {
        let Value::Object(mut record) = record else {
            warn!(container, "store returned a non-object record");
            return Value::Object(Map::new());
        };
        let mut body = match record.remove(ANNOTATION_FIELD) {
            Some(Value::Object(body)) => body,
            _ => Map::new(),
        };
        match record.get(ANNOTATION_NAME_FIELD).and_then(Value::as_str) {
            Some(name) => {
                body.insert(
                    "id".to_string(),
                    Value::String(self.uris.annotation_url(container, name)),
                );
            }
            None => warn!(container, "stored record has no annotation name"),
        }
        Value::Object(body)
    }
}

fn log_store_error(container: &str, err: StoreError) -> SearchError {
    if !matches!(err, StoreError::ContainerNotFound(_)) {
        error!(container, error = %err, "store failure");
    }
    SearchError::from(err)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::query::{FilterCompiler, QueryError, QueryValue};
    use crate::search::{ManualClock, SessionCacheConfig};
    use crate::store::{MemoryStore, NativeIndex, NativeIndexSpec, StoreResult};
    use chrono::Duration;
    use serde_json::json;
    use std::collections::BTreeMap;

    const SELECTOR: &str = "urn:republic:TextAnchorSelector";

    struct Fixture {
        store: Arc<MemoryStore>,
        clock: Arc<ManualClock>,
        service: SearchService,
    }

    fn service_over(store: Arc<dyn DocumentStore>, clock: Arc<ManualClock>, page_size: u64) -> SearchService {
        let cache = Arc::new(SessionCache::new(
            SessionCacheConfig {
                idle_timeout: Duration::minutes(30),
                capacity: 10,
            },
            clock,
        ));
        SearchService::new(
            store,
            QueryAssembler::new(FilterCompiler::new(SELECTOR)),
            cache,
            UriFactory::new("http://h"),
            page_size,
        )
    }

    fn fixture(page_size: u64) -> Fixture {
        let store = Arc::new(MemoryStore::new());
        store.create_container("letters").unwrap();
        for i in 0..25 {
            store
                .insert_annotation(
                    "letters",
                    &format!("a{:02}", i),
                    json!({"type": "Annotation", "body": {"n": i}}),
                )
                .unwrap();
        }
        let clock = Arc::new(ManualClock::default());
        let service = service_over(store.clone(), clock.clone(), page_size);
        Fixture {
            store,
            clock,
            service,
        }
    }

    /// Store with canned pipeline results
    struct CannedStore {
        count: StoreResult<u64>,
        records: StoreResult<Vec<Value>>,
    }

    impl DocumentStore for CannedStore {
        fn container_exists(&self, _: &str) -> StoreResult<bool> {
            Ok(true)
        }
        fn container_names(&self) -> StoreResult<Vec<String>> {
            Ok(vec!["letters".to_string()])
        }
        fn aggregate(&self, _: &str, _: &[Stage]) -> StoreResult<Vec<Value>> {
            self.records.clone()
        }
        fn count(&self, _: &str, _: &[Stage]) -> StoreResult<u64> {
            self.count.clone()
        }
        fn list_indexes(&self, _: &str) -> StoreResult<Vec<NativeIndex>> {
            Ok(vec![NativeIndex::primary()])
        }
        fn create_index(&self, _: &str, spec: NativeIndexSpec) -> StoreResult<String> {
            Ok(spec.native_name())
        }
        fn drop_index(&self, _: &str, _: &str) -> StoreResult<()> {
            Ok(())
        }
        fn field_counts(&self, _: &str) -> StoreResult<BTreeMap<String, u64>> {
            Ok(BTreeMap::new())
        }
    }

    #[test]
    fn test_create_counts_matches() {
        let f = fixture(10);
        let created = f
            .service
            .create_search("letters", QueryExpression::new().clause("type", "Annotation"))
            .unwrap();
        assert_eq!(created.hits, 25);
        assert_eq!(f.service.cache().len(), 1);
    }

    #[test]
    fn test_compile_error_caches_nothing() {
        let f = fixture(10);
        let err = f
            .service
            .create_search("letters", QueryExpression::new().clause(":nope", "x"))
            .unwrap_err();
        assert_eq!(
            err,
            SearchError::InvalidQuery(QueryError::UnknownFunction(":nope".to_string()))
        );
        assert!(f.service.cache().is_empty());
    }

    #[test]
    fn test_missing_container() {
        let f = fixture(10);
        let err = f
            .service
            .create_search("nope", QueryExpression::new())
            .unwrap_err();
        assert_eq!(err.to_string(), "Annotation Container 'nope' not found");
    }

    #[test]
    fn test_pages() {
        let f = fixture(10);
        let id = f
            .service
            .create_search("letters", QueryExpression::new().clause("type", "Annotation"))
            .unwrap()
            .id;

        let first = f.service.get_result_page("letters", &id, 0).unwrap();
        assert_eq!(first.items.len(), 10);
        assert_eq!(first.prev, None);
        assert!(first.next.is_some());
        assert_eq!(first.items[0]["id"], "http://h/w3c/letters/a00");

        let last = f.service.get_result_page("letters", &id, 2).unwrap();
        assert_eq!(last.items.len(), 5);
        assert_eq!(last.start_index, 20);
        assert_eq!(last.next, None);
        assert_eq!(
            last.prev.as_deref(),
            Some(format!("http://h/services/letters/search/{}?page=1", id).as_str())
        );
    }

    #[test]
    fn test_pages_see_live_data() {
        let f = fixture(100);
        let id = f
            .service
            .create_search("letters", QueryExpression::new().clause("type", "Annotation"))
            .unwrap()
            .id;
        f.store
            .remove_annotations("letters", |annotation| annotation["body"]["n"] == 0)
            .unwrap();

        let page = f.service.get_result_page("letters", &id, 0).unwrap();
        assert_eq!(page.items.len(), 24);
        // hit count is fixed at creation
        assert_eq!(f.service.get_search_info("letters", &id).unwrap().hits, 25);
    }

    #[test]
    fn test_expired_session() {
        let f = fixture(10);
        let id = f
            .service
            .create_search("letters", QueryExpression::new())
            .unwrap()
            .id;
        f.clock.advance(Duration::minutes(31));
        assert_eq!(
            f.service.get_search_info("letters", &id).unwrap_err(),
            SearchError::SearchExpired(id)
        );
    }

    #[test]
    fn test_session_bound_to_container() {
        let f = fixture(10);
        f.store.create_container("other").unwrap();
        let id = f
            .service
            .create_search("letters", QueryExpression::new())
            .unwrap()
            .id;
        assert!(matches!(
            f.service.get_result_page("other", &id, 0),
            Err(SearchError::SearchExpired(_))
        ));
    }

    #[test]
    fn test_info_returns_query_as_submitted() {
        let f = fixture(10);
        let query = QueryExpression::new()
            .clause("type", "Annotation")
            .clause(
                "body.n",
                QueryValue::mapping([(
                    "isIn",
                    QueryValue::list([QueryValue::integer(1), QueryValue::integer(2)]),
                )]),
            );
        let id = f.service.create_search("letters", query.clone()).unwrap().id;

        let info = f.service.get_search_info("letters", &id).unwrap();
        assert_eq!(info.query, query);
        assert_eq!(info.hits, 2);
        assert_eq!(
            serde_json::to_value(&info).unwrap(),
            json!({"query": {"type": "Annotation", "body.n": {"isIn": [1, 2]}}, "hits": 2})
        );
    }

    #[test]
    fn test_store_failure_on_count_caches_nothing() {
        let failure = StoreError::Execution("operation exceeded time limit".to_string());
        let store = CannedStore {
            count: Err(failure.clone()),
            records: Ok(Vec::new()),
        };
        let service = service_over(Arc::new(store), Arc::new(ManualClock::default()), 10);

        let err = service
            .create_search("letters", QueryExpression::new().clause("type", "Annotation"))
            .unwrap_err();
        assert_eq!(err, SearchError::Store(failure));
        assert!(service.cache().is_empty());
    }

    #[test]
    fn test_store_failure_on_page() {
        let failure = StoreError::Execution("connection reset".to_string());
        let store = CannedStore {
            count: Ok(3),
            records: Err(failure.clone()),
        };
        let service = service_over(Arc::new(store), Arc::new(ManualClock::default()), 10);

        let id = service.create_search("letters", QueryExpression::new()).unwrap().id;
        assert_eq!(
            service.get_result_page("letters", &id, 0).unwrap_err(),
            SearchError::Store(failure)
        );
        // the session itself survives a failed page
        assert!(service.get_search_info("letters", &id).is_ok());
    }

    #[test]
    fn test_unnamed_record_keeps_its_slot() {
        let store = CannedStore {
            count: Ok(2),
            records: Ok(vec![
                json!({"annotation_name": "a1", "annotation": {"type": "Annotation"}}),
                json!({"annotation": {"type": "Annotation"}}),
            ]),
        };
        let service = service_over(Arc::new(store), Arc::new(ManualClock::default()), 10);

        let id = service.create_search("letters", QueryExpression::new()).unwrap().id;
        let page = service.get_result_page("letters", &id, 0).unwrap();
        assert_eq!(page.items.len(), 2);
        assert_eq!(page.items[0]["id"], "http://h/w3c/letters/a1");
        assert_eq!(page.items[1], json!({"type": "Annotation"}));
    }
}
