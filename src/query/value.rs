//! # Query Values
//!
//! Tagged representation of client query expressions. Keys of the root
//! expression are arbitrary values so that non-string keys can be reported
//! instead of silently dropped.

use std::fmt;

use serde::{Serialize, Serializer};
use serde_json::{Map, Number, Value};

use super::errors::{QueryError, QueryResult};

/// Leaf value of a query expression
#[derive(Debug, Clone, PartialEq)]
pub enum Scalar {
    Null,
    Bool(bool),
    Integer(i64),
    Float(f64),
    String(String),
}

/// A clause value: scalar, list, or ordered mapping
#[derive(Debug, Clone, PartialEq)]
pub enum QueryValue {
    Scalar(Scalar),
    List(Vec<QueryValue>),
    /// Keys in insertion order
    Mapping(Vec<(String, QueryValue)>),
}

impl QueryValue {
    pub fn string(s: impl Into<String>) -> Self {
        QueryValue::Scalar(Scalar::String(s.into()))
    }

    pub fn integer(i: i64) -> Self {
        QueryValue::Scalar(Scalar::Integer(i))
    }

    pub fn float(f: f64) -> Self {
        QueryValue::Scalar(Scalar::Float(f))
    }

    pub fn list(items: impl IntoIterator<Item = QueryValue>) -> Self {
        QueryValue::List(items.into_iter().collect())
    }

    pub fn mapping<K: Into<String>>(entries: impl IntoIterator<Item = (K, QueryValue)>) -> Self {
        QueryValue::Mapping(entries.into_iter().map(|(k, v)| (k.into(), v)).collect())
    }

    /// The string payload, if this is a string scalar
    pub fn as_str(&self) -> Option<&str> {
        match self {
            QueryValue::Scalar(Scalar::String(s)) => Some(s),
            _ => None,
        }
    }

    /// Numeric payload widened to f64
    pub fn as_f64(&self) -> Option<f64> {
        match self {
            QueryValue::Scalar(Scalar::Integer(i)) => Some(*i as f64),
            QueryValue::Scalar(Scalar::Float(f)) => Some(*f),
            _ => None,
        }
    }

    /// Look up a key of a mapping value
    pub fn get(&self, key: &str) -> Option<&QueryValue> {
        match self {
            QueryValue::Mapping(entries) => entries.iter().find(|(k, _)| k == key).map(|(_, v)| v),
            _ => None,
        }
    }

    /// Name of the variant, for error messages
    pub fn kind(&self) -> &'static str {
        match self {
            QueryValue::Scalar(Scalar::Null) => "null",
            QueryValue::Scalar(Scalar::Bool(_)) => "boolean",
            QueryValue::Scalar(Scalar::Integer(_)) | QueryValue::Scalar(Scalar::Float(_)) => {
                "number"
            }
            QueryValue::Scalar(Scalar::String(_)) => "string",
            QueryValue::List(_) => "list",
            QueryValue::Mapping(_) => "mapping",
        }
    }

    /// Convert to the JSON form used inside compiled stages
    pub fn to_json(&self) -> Value {
        match self {
            QueryValue::Scalar(Scalar::Null) => Value::Null,
            QueryValue::Scalar(Scalar::Bool(b)) => Value::Bool(*b),
            QueryValue::Scalar(Scalar::Integer(i)) => Value::Number((*i).into()),
            QueryValue::Scalar(Scalar::Float(f)) => {
                Number::from_f64(*f).map(Value::Number).unwrap_or(Value::Null)
            }
            QueryValue::Scalar(Scalar::String(s)) => Value::String(s.clone()),
            QueryValue::List(items) => Value::Array(items.iter().map(QueryValue::to_json).collect()),
            QueryValue::Mapping(entries) => Value::Object(
                entries
                    .iter()
                    .map(|(k, v)| (k.clone(), v.to_json()))
                    .collect::<Map<String, Value>>(),
            ),
        }
    }
}

impl From<Value> for QueryValue {
    fn from(value: Value) -> Self {
        match value {
            Value::Null => QueryValue::Scalar(Scalar::Null),
            Value::Bool(b) => QueryValue::Scalar(Scalar::Bool(b)),
            Value::Number(n) => match n.as_i64() {
                Some(i) => QueryValue::Scalar(Scalar::Integer(i)),
                None => QueryValue::Scalar(Scalar::Float(n.as_f64().unwrap_or(f64::NAN))),
            },
            Value::String(s) => QueryValue::Scalar(Scalar::String(s)),
            Value::Array(items) => QueryValue::List(items.into_iter().map(QueryValue::from).collect()),
            Value::Object(map) => {
                QueryValue::Mapping(map.into_iter().map(|(k, v)| (k, QueryValue::from(v))).collect())
            }
        }
    }
}

impl From<&str> for QueryValue {
    fn from(s: &str) -> Self {
        QueryValue::string(s)
    }
}

impl From<i64> for QueryValue {
    fn from(i: i64) -> Self {
        QueryValue::integer(i)
    }
}

/// Printable form used in error messages: lists render as `[a, b]`,
/// mappings as `{k=v}`, strings without quotes.
impl fmt::Display for QueryValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            QueryValue::Scalar(Scalar::Null) => write!(f, "null"),
            QueryValue::Scalar(Scalar::Bool(b)) => write!(f, "{}", b),
            QueryValue::Scalar(Scalar::Integer(i)) => write!(f, "{}", i),
            QueryValue::Scalar(Scalar::Float(x)) => write!(f, "{}", x),
            QueryValue::Scalar(Scalar::String(s)) => write!(f, "{}", s),
            QueryValue::List(items) => {
                write!(f, "[")?;
                for (i, item) in items.iter().enumerate() {
                    if i > 0 {
                        write!(f, ", ")?;
                    }
                    write!(f, "{}", item)?;
                }
                write!(f, "]")
            }
            QueryValue::Mapping(entries) => {
                write!(f, "{{")?;
                for (i, (k, v)) in entries.iter().enumerate() {
                    if i > 0 {
                        write!(f, ", ")?;
                    }
                    write!(f, "{}={}", k, v)?;
                }
                write!(f, "}}")
            }
        }
    }
}

/// An ordered set of root clauses as submitted by a client
#[derive(Debug, Clone, PartialEq, Default)]
pub struct QueryExpression {
    clauses: Vec<(QueryValue, QueryValue)>,
}

impl QueryExpression {
    pub fn new() -> Self {
        Self::default()
    }

    /// Append a clause (builder style)
    pub fn clause(mut self, key: impl Into<QueryValue>, value: impl Into<QueryValue>) -> Self {
        self.clauses.push((key.into(), value.into()));
        self
    }

    /// Parse a JSON document; only objects are query expressions
    pub fn from_json(value: Value) -> QueryResult<Self> {
        match value {
            Value::Object(map) => Ok(Self {
                clauses: map
                    .into_iter()
                    .map(|(k, v)| (QueryValue::string(k), QueryValue::from(v)))
                    .collect(),
            }),
            other => Err(QueryError::NotAnObject(
                QueryValue::from(other).kind().to_string(),
            )),
        }
    }

    pub fn clauses(&self) -> &[(QueryValue, QueryValue)] {
        &self.clauses
    }

    pub fn len(&self) -> usize {
        self.clauses.len()
    }

    pub fn is_empty(&self) -> bool {
        self.clauses.is_empty()
    }

    /// The expression as a JSON object, keys in submission order
    pub fn to_json(&self) -> Value {
        Value::Object(
            self.clauses
                .iter()
                .map(|(k, v)| (k.to_string(), v.to_json()))
                .collect(),
        )
    }
}

impl Serialize for QueryExpression {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        self.to_json().serialize(serializer)
    }
}
