//! # Annotation Indexes
//!
//! Translates between domain index descriptors ("index on field F of type
//! T") and the backend's native index catalog.
//!
//! # Design Principles
//!
//! - The backend catalog is the only source of truth; descriptors are
//!   derived from native index names on every listing
//! - Name encoding lives in `IndexNameCodec` and fails with typed errors

mod codec;
mod descriptor;
mod errors;
mod translator;

pub use codec::IndexNameCodec;
pub use descriptor::{IndexDescriptor, IndexType};
pub use errors::{IndexError, IndexNameError, IndexResult};
pub use translator::IndexTranslator;
