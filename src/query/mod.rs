//! # Query Compilation
//!
//! Turns client-supplied query expressions into ordered match pipelines.
//!
//! - `FilterCompiler` compiles one root clause into one `Stage`
//! - `QueryAssembler` compiles a whole expression, preserving clause order
//!
//! Both are pure: no I/O, no shared mutable state.

mod assembler;
mod compiler;
mod errors;
mod stage;
mod value;

pub use assembler::QueryAssembler;
pub use compiler::{FieldOperator, FilterCompiler, QueryFunction, RangeParameters};
pub use errors::{QueryError, QueryResult};
pub use stage::{ComparisonOperator, Condition, Stage};
pub use value::{QueryExpression, QueryValue, Scalar};

/// Field under which stored records keep the annotation body
pub const ANNOTATION_FIELD: &str = "annotation";

/// Prefix applied to every client-supplied field path
pub const ANNOTATION_PREFIX: &str = "annotation.";

/// Prefix marking a root key as a query function reference
pub const FUNCTION_PREFIX: char = ':';

/// Prefix a client field path with the annotation namespace
pub fn annotation_path(field: &str) -> String {
    format!("{}{}", ANNOTATION_PREFIX, field)
}
