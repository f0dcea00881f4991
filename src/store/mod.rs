//! # Document Store
//!
//! The backend collaborator: pipeline execution over a container's stored
//! records and management of the container's native index catalog.
//!
//! Stored records have the shape
//! `{"annotation_name": <name>, "annotation": <web annotation body>}` so that
//! every compiled field path under `annotation.` resolves against the body.

mod errors;
mod matcher;
mod memory;
mod native_index;

use std::collections::BTreeMap;

use serde_json::Value;

use crate::query::Stage;

pub use errors::{StoreError, StoreResult};
pub use matcher::matches;
pub use memory::MemoryStore;
pub use native_index::{NativeIndex, NativeIndexKind, NativeIndexSpec, PRIMARY_INDEX_NAME};

/// Field holding the annotation's name within its container
pub const ANNOTATION_NAME_FIELD: &str = "annotation_name";

/// Backend operations used by the search and index services.
///
/// Calls are synchronous and may block on the backend.
pub trait DocumentStore: Send + Sync {
    /// Whether a container with this name exists
    fn container_exists(&self, container: &str) -> StoreResult<bool>;

    /// All container names, sorted
    fn container_names(&self) -> StoreResult<Vec<String>>;

    /// Run a pipeline and materialize the resulting records
    fn aggregate(&self, container: &str, stages: &[Stage]) -> StoreResult<Vec<Value>>;

    /// Run a pipeline and count the resulting records
    fn count(&self, container: &str, stages: &[Stage]) -> StoreResult<u64>;

    /// The container's native index catalog
    fn list_indexes(&self, container: &str) -> StoreResult<Vec<NativeIndex>>;

    /// Create an index, returning its native name. Creating an index that
    /// already exists is a no-op.
    fn create_index(&self, container: &str, spec: NativeIndexSpec) -> StoreResult<String>;

    /// Drop an index by native name
    fn drop_index(&self, container: &str, name: &str) -> StoreResult<()>;

    /// Number of annotations using each dotted annotation field path
    fn field_counts(&self, container: &str) -> StoreResult<BTreeMap<String, u64>>;
}
