//! # Filter Compiler
//!
//! Compiles a single root clause `(key, value)` of a query expression into a
//! match stage. Rules, in order:
//!
//! 1. Non-string keys are rejected
//! 2. Keys starting with `:` are query functions
//! 3. Anything else is a field path under the annotation namespace

use serde_json::Value;

use super::errors::{QueryError, QueryResult};
use super::stage::{ComparisonOperator, Condition, Stage};
use super::value::QueryValue;
use super::{annotation_path, FUNCTION_PREFIX};

const TARGET_SOURCE: &str = "target.source";
const TARGET_SELECTOR_TYPE: &str = "target.selector.type";
const TARGET_SELECTOR_START: &str = "target.selector.start";
const TARGET_SELECTOR_END: &str = "target.selector.end";

/// Query functions callable as `:<name>` root keys
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum QueryFunction {
    /// Target range lies inside `[start, end]`
    WithinRange,
    /// Target range intersects `(start, end)`
    OverlappingWithRange,
}

impl QueryFunction {
    pub fn from_name(name: &str) -> Option<Self> {
        match name {
            "within_range" => Some(QueryFunction::WithinRange),
            "overlapping_with_range" => Some(QueryFunction::OverlappingWithRange),
            _ => None,
        }
    }

    pub fn name(&self) -> &'static str {
        match self {
            QueryFunction::WithinRange => "within_range",
            QueryFunction::OverlappingWithRange => "overlapping_with_range",
        }
    }
}

/// Operators accepted inside a field's operator mapping
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FieldOperator {
    /// `isEqualTo`: compiles to bare equality
    EqualTo,
    Compare(ComparisonOperator),
}

impl FieldOperator {
    pub fn from_key(key: &str) -> Option<Self> {
        let op = match key {
            "isEqualTo" => return Some(FieldOperator::EqualTo),
            "isIn" => ComparisonOperator::In,
            "isNotIn" => ComparisonOperator::NotIn,
            "isGreater" => ComparisonOperator::Greater,
            "isGreaterOrEqual" => ComparisonOperator::GreaterOrEqual,
            "isLess" => ComparisonOperator::Less,
            "isLessOrEqual" => ComparisonOperator::LessOrEqual,
            "isNot" => ComparisonOperator::NotEqual,
            _ => return None,
        };
        Some(FieldOperator::Compare(op))
    }
}

/// Parameters of the range query functions
#[derive(Debug, Clone, PartialEq)]
pub struct RangeParameters {
    pub source: String,
    pub start: f64,
    pub end: f64,
}

impl RangeParameters {
    fn parse(function: &str, value: &QueryValue) -> QueryResult<Self> {
        let invalid = |reason: String| QueryError::InvalidFunctionParameters {
            function: function.to_string(),
            reason,
        };

        if !matches!(value, QueryValue::Mapping(_)) {
            return Err(invalid(format!("expected a mapping, got {}", value.kind())));
        }

        let source = value
            .get("source")
            .ok_or_else(|| invalid("missing 'source'".to_string()))?
            .as_str()
            .ok_or_else(|| invalid("'source' should be a string".to_string()))?
            .to_string();

        let number = |name: &str| -> QueryResult<f64> {
            value
                .get(name)
                .ok_or_else(|| invalid(format!("missing '{}'", name)))?
                .as_f64()
                .ok_or_else(|| invalid(format!("'{}' should be a number", name)))
        };

        Ok(Self {
            source,
            start: number("start")?,
            end: number("end")?,
        })
    }
}

/// Compiles individual clauses. Holds only immutable configuration, so one
/// instance can be shared freely between workers.
#[derive(Debug, Clone)]
pub struct FilterCompiler {
    range_selector_type: String,
}

impl FilterCompiler {
    pub fn new(range_selector_type: impl Into<String>) -> Self {
        Self {
            range_selector_type: range_selector_type.into(),
        }
    }

    pub fn range_selector_type(&self) -> &str {
        &self.range_selector_type
    }

    /// Compile one root clause into a match stage
    pub fn compile_clause(&self, key: &QueryValue, value: &QueryValue) -> QueryResult<Stage> {
        let key = key
            .as_str()
            .ok_or_else(|| QueryError::UnexpectedField(key.to_string()))?;

        let condition = match key.strip_prefix(FUNCTION_PREFIX) {
            Some(name) => self.function_condition(key, name, value)?,
            None => field_condition(key, value)?,
        };
        Ok(Stage::Match(condition))
    }

    fn function_condition(&self, key: &str, name: &str, value: &QueryValue) -> QueryResult<Condition> {
        let function = QueryFunction::from_name(name)
            .ok_or_else(|| QueryError::UnknownFunction(key.to_string()))?;
        let params = RangeParameters::parse(key, value)?;

        let (start_bound, end_bound) = match function {
            QueryFunction::WithinRange => (
                (ComparisonOperator::GreaterOrEqual, params.start),
                (ComparisonOperator::LessOrEqual, params.end),
            ),
            QueryFunction::OverlappingWithRange => (
                (ComparisonOperator::Less, params.end),
                (ComparisonOperator::Greater, params.start),
            ),
        };

        Ok(Condition::And(vec![
            Condition::equals(annotation_path(TARGET_SOURCE), Value::String(params.source)),
            Condition::equals(
                annotation_path(TARGET_SELECTOR_TYPE),
                Value::String(self.range_selector_type.clone()),
            ),
            Condition::compare(
                annotation_path(TARGET_SELECTOR_START),
                start_bound.0,
                float(start_bound.1),
            ),
            Condition::compare(
                annotation_path(TARGET_SELECTOR_END),
                end_bound.0,
                float(end_bound.1),
            ),
        ]))
    }
}

fn field_condition(field: &str, value: &QueryValue) -> QueryResult<Condition> {
    let path = annotation_path(field);
    let entries = match value {
        QueryValue::Mapping(entries) => entries,
        scalar_or_list => return Ok(Condition::equals(path, scalar_or_list.to_json())),
    };

    let (op_key, operand) = match entries.as_slice() {
        [single] => single,
        _ => {
            return Err(QueryError::OperatorCount {
                field: field.to_string(),
                count: entries.len(),
            })
        }
    };

    match FieldOperator::from_key(op_key) {
        Some(FieldOperator::EqualTo) => Ok(Condition::equals(path, operand.to_json())),
        Some(FieldOperator::Compare(op)) => Ok(Condition::compare(path, op, operand.to_json())),
        None => Err(QueryError::UnknownOperator {
            field: field.to_string(),
            operator: op_key.clone(),
        }),
    }
}

fn float(f: f64) -> Value {
    serde_json::Number::from_f64(f)
        .map(Value::Number)
        .unwrap_or(Value::Null)
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn compiler() -> FilterCompiler {
        FilterCompiler::new("rangeSelectorType")
    }

    #[test]
    fn test_numeric_key_rejected() {
        let err = compiler()
            .compile_clause(&QueryValue::integer(1), &QueryValue::integer(2))
            .unwrap_err();
        assert_eq!(
            err.to_string(),
            "Unexpected field: '1' ; query root fields should be strings"
        );
    }

    #[test]
    fn test_unknown_function() {
        let params = QueryValue::mapping(vec![("parameter1", QueryValue::string("value1"))]);
        let err = compiler()
            .compile_clause(&":myQueryFunction".into(), &params)
            .unwrap_err();
        assert_eq!(err.to_string(), "Unknown query function: ':myQueryFunction'");
    }

    #[test]
    fn test_string_value() {
        let stage = compiler()
            .compile_clause(&"body.type".into(), &"Match".into())
            .unwrap();
        assert_eq!(
            stage.to_json(),
            json!({"$match": {"annotation.body.type": "Match"}})
        );
    }

    #[test]
    fn test_list_value_is_bare_equality() {
        let value = QueryValue::list(vec!["a".into(), "b".into()]);
        let stage = compiler().compile_clause(&"tags".into(), &value).unwrap();
        assert_eq!(stage.to_json(), json!({"$match": {"annotation.tags": ["a", "b"]}}));
    }

    #[test]
    fn test_unknown_operator() {
        let value = QueryValue::mapping(vec![("isAbout", QueryValue::integer(2000))]);
        let err = compiler().compile_clause(&"year".into(), &value).unwrap_err();
        assert!(matches!(err, QueryError::UnknownOperator { ref operator, .. } if operator == "isAbout"));
    }

    #[test]
    fn test_two_operators_rejected() {
        let value = QueryValue::mapping(vec![
            ("isGreater", QueryValue::integer(2000)),
            ("isLess", QueryValue::integer(2010)),
        ]);
        let err = compiler().compile_clause(&"year".into(), &value).unwrap_err();
        assert_eq!(
            err,
            QueryError::OperatorCount {
                field: "year".to_string(),
                count: 2
            }
        );
    }

    #[test]
    fn test_range_function_requires_numbers() {
        let params = QueryValue::mapping(vec![
            ("source", QueryValue::string("urn:x")),
            ("start", QueryValue::string("10")),
            ("end", QueryValue::integer(20)),
        ]);
        let err = compiler()
            .compile_clause(&":within_range".into(), &params)
            .unwrap_err();
        assert!(err.to_string().contains("'start' should be a number"));
    }

    #[test]
    fn test_range_function_requires_source() {
        let params = QueryValue::mapping(vec![
            ("start", QueryValue::integer(10)),
            ("end", QueryValue::integer(20)),
        ]);
        let err = compiler()
            .compile_clause(&":overlapping_with_range".into(), &params)
            .unwrap_err();
        assert!(err.to_string().contains("missing 'source'"));
    }

    #[test]
    fn test_overlapping_bounds_are_swapped() {
        let params = QueryValue::mapping(vec![
            ("source", QueryValue::string("http://example.com/some-id")),
            ("start", QueryValue::integer(200)),
            ("end", QueryValue::integer(300)),
        ]);
        let stage = compiler()
            .compile_clause(&":overlapping_with_range".into(), &params)
            .unwrap();
        assert_eq!(
            stage.to_json(),
            json!({"$match": {"$and": [
                {"annotation.target.source": "http://example.com/some-id"},
                {"annotation.target.selector.type": "rangeSelectorType"},
                {"annotation.target.selector.start": {"$lt": 300.0}},
                {"annotation.target.selector.end": {"$gt": 200.0}}
            ]}})
        );
    }
}
