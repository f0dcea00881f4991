//! # Search Sessions
//!
//! A search compiles a query once, counts its matches once, and keeps the
//! compiled pipeline under an opaque session id. Result pages re-run the
//! stored pipeline with skip/limit stages against the live store, so pages
//! reflect writes made after the search was created.
//!
//! # Session lifecycle
//!
//! `Created -> (Accessed)* -> Expired | Evicted`
//!
//! Sessions live only in process memory. Expiry (idle timeout) and eviction
//! (capacity, least recently accessed first) may happen at any time; clients
//! must handle `SearchExpired`.

mod cache;
mod clock;
mod errors;
mod page;
mod service;
mod session;

pub use cache::{CacheStats, SessionCache, SessionCacheConfig};
pub use clock::{Clock, ManualClock, SystemClock};
pub use errors::{SearchError, SearchResult};
pub use page::{AnnotationPage, PageBounds, ANNO_JSONLD_URL};
pub use service::{SearchCreated, SearchInfo, SearchService};
pub use session::SearchSession;
