//! # Index Descriptor Translator
//!
//! - `add_index(container, field, type)` - create a partial native index
//! - `list_indexes(container)` - decode the native catalog
//! - `get_index` / `delete_index` - exact `(field, type)` lookup

use std::sync::Arc;

use tracing::{debug, info, warn};

use crate::query::{annotation_path, Condition};
use crate::store::{DocumentStore, NativeIndexSpec};
use crate::uri::UriFactory;

use super::codec::IndexNameCodec;
use super::descriptor::{IndexDescriptor, IndexType};
use super::errors::{IndexError, IndexNameError, IndexResult};

pub struct IndexTranslator {
    store: Arc<dyn DocumentStore>,
    uris: UriFactory,
}

impl IndexTranslator {
    pub fn new(store: Arc<dyn DocumentStore>, uris: UriFactory) -> Self {
        Self { store, uris }
    }

    /// Create an index on `annotation.<field>`. Records lacking the field
    /// are excluded through a partial filter.
    pub fn add_index(&self, container: &str, field: &str, index_type: &str) -> IndexResult<IndexDescriptor> {
        self.check_container(container)?;
        let index_type: IndexType = index_type.parse()?;

        let key = annotation_path(field);
        let spec = NativeIndexSpec::new(key.clone(), index_type.native_kind())
            .with_partial_filter(Condition::exists(key));
        let name = self.store.create_index(container, spec)?;
        info!(container, index = %name, "index created");

        Ok(self.descriptor(container, field, index_type))
    }

    /// Annotation indexes of the container. Catalog entries outside the
    /// annotation namespace are ignored; entries whose type suffix cannot be
    /// decoded are skipped with a warning.
    pub fn list_indexes(&self, container: &str) -> IndexResult<Vec<IndexDescriptor>> {
        self.check_container(container)?;

        let mut descriptors = Vec::new();
        for native in self.store.list_indexes(container)? {
            match IndexNameCodec::decode(&native.name) {
                Ok((field, index_type)) => {
                    descriptors.push(self.descriptor(container, &field, index_type))
                }
                Err(IndexNameError::NotAnnotationIndex(name)) => {
                    debug!(container, index = %name, "skipping non-annotation index");
                }
                Err(e) => {
                    warn!(container, error = %e, "skipping undecodable index");
                }
            }
        }
        Ok(descriptors)
    }

    pub fn get_index(&self, container: &str, field: &str, index_type: &str) -> IndexResult<IndexDescriptor> {
        self.check_container(container)?;
        let not_found = || IndexError::IndexNotFound {
            field: field.to_string(),
            index_type: index_type.to_string(),
        };
        let wanted: IndexType = index_type.parse().map_err(|_| not_found())?;

        self.list_indexes(container)?
            .into_iter()
            .find(|d| d.field == field && d.index_type == wanted)
            .ok_or_else(not_found)
    }

    pub fn delete_index(&self, container: &str, field: &str, index_type: &str) -> IndexResult<()> {
        let descriptor = self.get_index(container, field, index_type)?;
        let name = IndexNameCodec::encode(&descriptor.field, descriptor.index_type);
        self.store.drop_index(container, &name)?;
        info!(container, index = %name, "index dropped");
        Ok(())
    }

    fn check_container(&self, container: &str) -> IndexResult<()> {
        if self.store.container_exists(container)? {
            Ok(())
        } else {
            Err(IndexError::ContainerNotFound(container.to_string()))
        }
    }

    fn descriptor(&self, container: &str, field: &str, index_type: IndexType) -> IndexDescriptor {
        IndexDescriptor {
            field: field.to_string(),
            index_type,
            url: self.uris.index_url(container, field, index_type.as_str()),
        }
    }
}
