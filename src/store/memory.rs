//! # In-Memory Document Store
//!
//! A `DocumentStore` keeping every container in process memory. Pipelines
//! are evaluated stage by stage over the container's records in insertion
//! order. The index catalog is bookkeeping only; lookups always scan.

use std::collections::{BTreeMap, BTreeSet};
use std::fs;
use std::path::Path;
use std::sync::RwLock;

use serde_json::{json, Value};
use uuid::Uuid;

use crate::query::{Stage, ANNOTATION_FIELD};

use super::errors::{StoreError, StoreResult};
use super::matcher::matches;
use super::native_index::{NativeIndex, NativeIndexSpec};
use super::{DocumentStore, ANNOTATION_NAME_FIELD};

#[derive(Debug)]
struct Collection {
    records: Vec<Value>,
    indexes: Vec<NativeIndex>,
}

impl Collection {
    fn new() -> Self {
        Self {
            records: Vec::new(),
            indexes: vec![NativeIndex::primary()],
        }
    }

    fn run<'a>(&'a self, stages: &[Stage]) -> Vec<&'a Value> {
        let mut current: Vec<&Value> = self.records.iter().collect();
        for stage in stages {
            current = match stage {
                Stage::Match(condition) => current
                    .into_iter()
                    .filter(|record| matches(condition, record))
                    .collect(),
                Stage::Skip(n) => current.into_iter().skip(to_usize(*n)).collect(),
                Stage::Limit(n) => current.into_iter().take(to_usize(*n)).collect(),
            };
        }
        current
    }
}

fn to_usize(n: u64) -> usize {
    usize::try_from(n).unwrap_or(usize::MAX)
}

/// Process-local document store
#[derive(Debug)]
pub struct MemoryStore {
    containers: RwLock<BTreeMap<String, Collection>>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self {
            containers: RwLock::new(BTreeMap::new()),
        }
    }

    pub fn create_container(&self, name: &str) -> StoreResult<()> {
        let mut containers = self.containers.write().map_err(|_| StoreError::LockPoisoned)?;
        if containers.contains_key(name) {
            return Err(StoreError::ContainerExists(name.to_string()));
        }
        containers.insert(name.to_string(), Collection::new());
        Ok(())
    }

    /// Store an annotation under the given name, replacing any previous
    /// annotation with that name
    pub fn insert_annotation(&self, container: &str, name: &str, annotation: Value) -> StoreResult<()> {
        let mut containers = self.containers.write().map_err(|_| StoreError::LockPoisoned)?;
        let collection = containers
            .get_mut(container)
            .ok_or_else(|| StoreError::ContainerNotFound(container.to_string()))?;

        let record = json!({ ANNOTATION_NAME_FIELD: name, ANNOTATION_FIELD: annotation });
        let existing = collection
            .records
            .iter()
            .position(|r| r.get(ANNOTATION_NAME_FIELD).and_then(Value::as_str) == Some(name));
        match existing {
            Some(position) => collection.records[position] = record,
            None => collection.records.push(record),
        }
        Ok(())
    }

    /// Remove all annotations whose annotation body matches `predicate`
    pub fn remove_annotations(&self, container: &str, predicate: impl Fn(&Value) -> bool) -> StoreResult<usize> {
        let mut containers = self.containers.write().map_err(|_| StoreError::LockPoisoned)?;
        let collection = containers
            .get_mut(container)
            .ok_or_else(|| StoreError::ContainerNotFound(container.to_string()))?;

        let before = collection.records.len();
        collection
            .records
            .retain(|r| !r.get(ANNOTATION_FIELD).map(&predicate).unwrap_or(false));
        Ok(before - collection.records.len())
    }

    /// Load every `<container>.json` file in `dir`. Each file holds a JSON
    /// array of annotations; an annotation's name is the last path segment
    /// of its `id`, or a fresh UUID when it has none.
    pub fn seed_from_dir(&self, dir: &Path) -> StoreResult<usize> {
        let entries = fs::read_dir(dir)
            .map_err(|e| StoreError::Seed(format!("Failed to read {}: {}", dir.display(), e)))?;

        let mut paths: Vec<_> = entries
            .filter_map(|entry| entry.ok().map(|e| e.path()))
            .filter(|p| p.extension().map(|ext| ext == "json").unwrap_or(false))
            .collect();
        paths.sort();

        let mut loaded = 0;
        for path in paths {
            let container = path
                .file_stem()
                .and_then(|s| s.to_str())
                .ok_or_else(|| StoreError::Seed(format!("Bad file name: {}", path.display())))?
                .to_string();

            let content = fs::read_to_string(&path)
                .map_err(|e| StoreError::Seed(format!("Failed to read {}: {}", path.display(), e)))?;
            let annotations: Vec<Value> = serde_json::from_str(&content)
                .map_err(|e| StoreError::Seed(format!("Invalid JSON in {}: {}", path.display(), e)))?;

            match self.create_container(&container) {
                Ok(()) | Err(StoreError::ContainerExists(_)) => {}
                Err(e) => return Err(e),
            }
            for annotation in annotations {
                let name = annotation_name(&annotation);
                self.insert_annotation(&container, &name, annotation)?;
                loaded += 1;
            }
        }
        Ok(loaded)
    }

    fn with_collection<T>(&self, container: &str, f: impl FnOnce(&Collection) -> T) -> StoreResult<T> {
        let containers = self.containers.read().map_err(|_| StoreError::LockPoisoned)?;
        containers
            .get(container)
            .map(f)
            .ok_or_else(|| StoreError::ContainerNotFound(container.to_string()))
    }
}

impl Default for MemoryStore {
    fn default() -> Self {
        Self::new()
    }
}

fn annotation_name(annotation: &Value) -> String {
    annotation
        .get("id")
        .and_then(Value::as_str)
        .and_then(|id| id.trim_end_matches('/').rsplit('/').next())
        .filter(|name| !name.is_empty())
        .map(str::to_string)
        .unwrap_or_else(|| Uuid::new_v4().to_string())
}

fn collect_paths(value: &Value, prefix: &str, out: &mut BTreeSet<String>) {
    match value {
        Value::Object(map) => {
            for (key, child) in map {
                let path = if prefix.is_empty() {
                    key.clone()
                } else {
                    format!("{}.{}", prefix, key)
                };
                out.insert(path.clone());
                collect_paths(child, &path, out);
            }
        }
        Value::Array(items) => {
            for item in items {
                collect_paths(item, prefix, out);
            }
        }
        _ => {}
    }
}

impl DocumentStore for MemoryStore {
    fn container_exists(&self, container: &str) -> StoreResult<bool> {
        let containers = self.containers.read().map_err(|_| StoreError::LockPoisoned)?;
        Ok(containers.contains_key(container))
    }

    fn container_names(&self) -> StoreResult<Vec<String>> {
        let containers = self.containers.read().map_err(|_| StoreError::LockPoisoned)?;
        Ok(containers.keys().cloned().collect())
    }

    fn aggregate(&self, container: &str, stages: &[Stage]) -> StoreResult<Vec<Value>> {
        self.with_collection(container, |c| c.run(stages).into_iter().cloned().collect())
    }

    fn count(&self, container: &str, stages: &[Stage]) -> StoreResult<u64> {
        self.with_collection(container, |c| c.run(stages).len() as u64)
    }

    fn list_indexes(&self, container: &str) -> StoreResult<Vec<NativeIndex>> {
        self.with_collection(container, |c| c.indexes.clone())
    }

    fn create_index(&self, container: &str, spec: NativeIndexSpec) -> StoreResult<String> {
        let mut containers = self.containers.write().map_err(|_| StoreError::LockPoisoned)?;
        let collection = containers
            .get_mut(container)
            .ok_or_else(|| StoreError::ContainerNotFound(container.to_string()))?;

        let index = NativeIndex::from_spec(spec);
        let name = index.name.clone();
        if !collection.indexes.iter().any(|i| i.name == name) {
            collection.indexes.push(index);
        }
        Ok(name)
    }

    fn drop_index(&self, container: &str, name: &str) -> StoreResult<()> {
        let mut containers = self.containers.write().map_err(|_| StoreError::LockPoisoned)?;
        let collection = containers
            .get_mut(container)
            .ok_or_else(|| StoreError::ContainerNotFound(container.to_string()))?;

        let position = collection
            .indexes
            .iter()
            .position(|i| i.name == name)
            .ok_or_else(|| StoreError::IndexNotFound(name.to_string()))?;
        collection.indexes.remove(position);
        Ok(())
    }

    fn field_counts(&self, container: &str) -> StoreResult<BTreeMap<String, u64>> {
        self.with_collection(container, |c| {
            let mut counts = BTreeMap::new();
            for record in &c.records {
                let mut paths = BTreeSet::new();
                if let Some(annotation) = record.get(ANNOTATION_FIELD) {
                    collect_paths(annotation, "", &mut paths);
                }
                for path in paths {
                    *counts.entry(path).or_insert(0) += 1;
                }
            }
            counts
        })
    }
}
