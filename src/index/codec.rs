//! # Index Name Codec
//!
//! Native index names encode `(field, type)` as
//! `annotation.<field>_<suffix>`, where the suffix is `hashed`, `1`, `-1`
//! or `text`. Fields may themselves contain underscores, so decoding splits
//! on the last one.

use crate::query::{annotation_path, ANNOTATION_PREFIX};

use super::descriptor::IndexType;
use super::errors::IndexNameError;

#[derive(Debug, Clone, Copy, Default)]
pub struct IndexNameCodec;

impl IndexNameCodec {
    pub fn encode(field: &str, index_type: IndexType) -> String {
        format!("{}_{}", annotation_path(field), index_type.native_kind().suffix())
    }

    pub fn decode(name: &str) -> Result<(String, IndexType), IndexNameError> {
        let rest = name
            .strip_prefix(ANNOTATION_PREFIX)
            .ok_or_else(|| IndexNameError::NotAnnotationIndex(name.to_string()))?;

        let (field, suffix) = rest
            .rsplit_once('_')
            .filter(|(field, _)| !field.is_empty())
            .ok_or_else(|| IndexNameError::MissingSuffix(name.to_string()))?;

        let index_type =
            IndexType::from_native_suffix(suffix).ok_or_else(|| IndexNameError::UnrecognizedSuffix {
                name: name.to_string(),
                suffix: suffix.to_string(),
            })?;

        Ok((field.to_string(), index_type))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_encode() {
        assert_eq!(
            IndexNameCodec::encode("year", IndexType::Ascending),
            "annotation.year_1"
        );
        assert_eq!(
            IndexNameCodec::encode("body.value", IndexType::Text),
            "annotation.body.value_text"
        );
    }

    #[test]
    fn test_decode_every_type() {
        for t in IndexType::ALL {
            let name = IndexNameCodec::encode("target.selector.start", t);
            assert_eq!(
                IndexNameCodec::decode(&name).unwrap(),
                ("target.selector.start".to_string(), t)
            );
        }
    }

    #[test]
    fn test_decode_field_with_underscore() {
        assert_eq!(
            IndexNameCodec::decode("annotation.created_by_-1").unwrap(),
            ("created_by".to_string(), IndexType::Descending)
        );
    }

    #[test]
    fn test_decode_primary_index() {
        assert_eq!(
            IndexNameCodec::decode("_id_").unwrap_err(),
            IndexNameError::NotAnnotationIndex("_id_".to_string())
        );
    }

    #[test]
    fn test_decode_unrecognized_suffix() {
        assert_eq!(
            IndexNameCodec::decode("annotation.location_2dsphere").unwrap_err(),
            IndexNameError::UnrecognizedSuffix {
                name: "annotation.location_2dsphere".to_string(),
                suffix: "2dsphere".to_string(),
            }
        );
    }

    #[test]
    fn test_decode_missing_suffix() {
        assert!(matches!(
            IndexNameCodec::decode("annotation.year"),
            Err(IndexNameError::MissingSuffix(_))
        ));
    }
}
