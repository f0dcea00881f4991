//! Domain view of annotation indexes.

use std::fmt;
use std::str::FromStr;

use serde::Serialize;

use crate::store::NativeIndexKind;

use super::errors::IndexError;

/// Kind of index a client can request on an annotation field
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum IndexType {
    Hashed,
    Ascending,
    Descending,
    Text,
}

impl IndexType {
    pub const ALL: [IndexType; 4] = [
        IndexType::Hashed,
        IndexType::Ascending,
        IndexType::Descending,
        IndexType::Text,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            IndexType::Hashed => "hashed",
            IndexType::Ascending => "ascending",
            IndexType::Descending => "descending",
            IndexType::Text => "text",
        }
    }

    pub fn native_kind(&self) -> NativeIndexKind {
        match self {
            IndexType::Hashed => NativeIndexKind::Hashed,
            IndexType::Ascending => NativeIndexKind::Ascending,
            IndexType::Descending => NativeIndexKind::Descending,
            IndexType::Text => NativeIndexKind::Text,
        }
    }

    /// Inverse of `native_kind().suffix()`
    pub fn from_native_suffix(suffix: &str) -> Option<Self> {
        Self::ALL
            .into_iter()
            .find(|t| t.native_kind().suffix() == suffix)
    }
}

impl FromStr for IndexType {
    type Err = IndexError;

    /// Case-insensitive
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::ALL
            .into_iter()
            .find(|t| t.as_str().eq_ignore_ascii_case(s))
            .ok_or_else(|| IndexError::InvalidIndexType(s.to_string()))
    }
}

impl fmt::Display for IndexType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// An index on one annotation field
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct IndexDescriptor {
    /// Field path without the annotation namespace
    pub field: String,
    #[serde(rename = "type")]
    pub index_type: IndexType,
    pub url: String,
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_parse_case_insensitive() {
        assert_eq!("ASCENDING".parse::<IndexType>().unwrap(), IndexType::Ascending);
        assert_eq!("hashed".parse::<IndexType>().unwrap(), IndexType::Hashed);
        assert!(matches!(
            "sideways".parse::<IndexType>(),
            Err(IndexError::InvalidIndexType(_))
        ));
    }

    #[test]
    fn test_native_suffix_round_trip() {
        for t in IndexType::ALL {
            assert_eq!(IndexType::from_native_suffix(t.native_kind().suffix()), Some(t));
        }
        assert_eq!(IndexType::from_native_suffix("2dsphere"), None);
    }

    #[test]
    fn test_descriptor_json() {
        let descriptor = IndexDescriptor {
            field: "year".to_string(),
            index_type: IndexType::Descending,
            url: "http://h/services/c/indexes/year/descending".to_string(),
        };
        assert_eq!(
            serde_json::to_value(&descriptor).unwrap(),
            json!({
                "field": "year",
                "type": "descending",
                "url": "http://h/services/c/indexes/year/descending"
            })
        );
    }
}
