//! # Pipeline Stages
//!
//! Backend aggregation instructions. Compiled queries only ever produce
//! match stages; skip and limit are appended for pagination.

use serde::{Serialize, Serializer};
use serde_json::{json, Map, Value};

/// Native comparison operators
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ComparisonOperator {
    In,
    NotIn,
    Greater,
    GreaterOrEqual,
    Less,
    LessOrEqual,
    NotEqual,
}

impl ComparisonOperator {
    /// The native operator keyword
    pub fn as_str(&self) -> &'static str {
        match self {
            ComparisonOperator::In => "$in",
            ComparisonOperator::NotIn => "$nin",
            ComparisonOperator::Greater => "$gt",
            ComparisonOperator::GreaterOrEqual => "$gte",
            ComparisonOperator::Less => "$lt",
            ComparisonOperator::LessOrEqual => "$lte",
            ComparisonOperator::NotEqual => "$ne",
        }
    }
}

/// A match condition over stored records
#[derive(Debug, Clone, PartialEq)]
pub enum Condition {
    /// Bare equality: `{field: value}`
    Equals { field: String, value: Value },

    /// Operator comparison: `{field: {op: value}}`
    Compare {
        field: String,
        operator: ComparisonOperator,
        value: Value,
    },

    /// Field presence: `{field: {"$exists": true}}`
    Exists { field: String },

    /// Conjunction: `{"$and": [...]}`
    And(Vec<Condition>),
}

impl Condition {
    pub fn equals(field: impl Into<String>, value: Value) -> Self {
        Condition::Equals {
            field: field.into(),
            value,
        }
    }

    pub fn compare(field: impl Into<String>, operator: ComparisonOperator, value: Value) -> Self {
        Condition::Compare {
            field: field.into(),
            operator,
            value,
        }
    }

    pub fn exists(field: impl Into<String>) -> Self {
        Condition::Exists {
            field: field.into(),
        }
    }

    pub fn to_json(&self) -> Value {
        match self {
            Condition::Equals { field, value } => single(field, value.clone()),
            Condition::Compare {
                field,
                operator,
                value,
            } => single(field, single(operator.as_str(), value.clone())),
            Condition::Exists { field } => single(field, json!({"$exists": true})),
            Condition::And(conditions) => {
                json!({"$and": conditions.iter().map(Condition::to_json).collect::<Vec<_>>()})
            }
        }
    }
}

fn single(key: &str, value: Value) -> Value {
    let mut map = Map::new();
    map.insert(key.to_string(), value);
    Value::Object(map)
}

/// One pipeline stage
#[derive(Debug, Clone, PartialEq)]
pub enum Stage {
    Match(Condition),
    Skip(u64),
    Limit(u64),
}

impl Stage {
    /// Native JSON form, e.g. `{"$match": {...}}`
    pub fn to_json(&self) -> Value {
        match self {
            Stage::Match(condition) => json!({"$match": condition.to_json()}),
            Stage::Skip(n) => json!({"$skip": n}),
            Stage::Limit(n) => json!({"$limit": n}),
        }
    }
}

impl Serialize for Stage {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        self.to_json().serialize(serializer)
    }
}
