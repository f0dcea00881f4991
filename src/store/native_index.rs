//! Native index catalog entries.
//!
//! Native names follow `<key>_<suffix>`, with `_id_` reserved for the
//! primary key index.

use crate::query::Condition;

/// Name of the always-present primary key index
pub const PRIMARY_INDEX_NAME: &str = "_id_";

/// Kind of a native single-field index
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NativeIndexKind {
    Hashed,
    Ascending,
    Descending,
    Text,
}

impl NativeIndexKind {
    /// Suffix appended to the key in the native index name
    pub fn suffix(&self) -> &'static str {
        match self {
            NativeIndexKind::Hashed => "hashed",
            NativeIndexKind::Ascending => "1",
            NativeIndexKind::Descending => "-1",
            NativeIndexKind::Text => "text",
        }
    }
}

/// Request to create an index
#[derive(Debug, Clone, PartialEq)]
pub struct NativeIndexSpec {
    /// Full record path, e.g. `annotation.body.type`
    pub key: String,
    pub kind: NativeIndexKind,
    /// Only records matching this condition are indexed
    pub partial_filter: Option<Condition>,
}

impl NativeIndexSpec {
    pub fn new(key: impl Into<String>, kind: NativeIndexKind) -> Self {
        Self {
            key: key.into(),
            kind,
            partial_filter: None,
        }
    }

    pub fn with_partial_filter(mut self, condition: Condition) -> Self {
        self.partial_filter = Some(condition);
        self
    }

    /// The name the backend gives an index built from this spec
    pub fn native_name(&self) -> String {
        format!("{}_{}", self.key, self.kind.suffix())
    }
}

/// An entry of a container's index catalog
#[derive(Debug, Clone, PartialEq)]
pub struct NativeIndex {
    pub name: String,
    pub key: String,
    pub kind: NativeIndexKind,
    pub partial_filter: Option<Condition>,
}

impl NativeIndex {
    pub fn primary() -> Self {
        Self {
            name: PRIMARY_INDEX_NAME.to_string(),
            key: "_id".to_string(),
            kind: NativeIndexKind::Ascending,
            partial_filter: None,
        }
    }

    pub fn from_spec(spec: NativeIndexSpec) -> Self {
        Self {
            name: spec.native_name(),
            key: spec.key,
            kind: spec.kind,
            partial_filter: spec.partial_filter,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_native_names() {
        assert_eq!(
            NativeIndexSpec::new("annotation.year", NativeIndexKind::Ascending).native_name(),
            "annotation.year_1"
        );
        assert_eq!(
            NativeIndexSpec::new("annotation.year", NativeIndexKind::Descending).native_name(),
            "annotation.year_-1"
        );
        assert_eq!(
            NativeIndexSpec::new("annotation.body.id", NativeIndexKind::Hashed).native_name(),
            "annotation.body.id_hashed"
        );
    }
}
