//! # Condition Matching
//!
//! Evaluates compiled match conditions against stored records.
//!
//! Dotted paths descend through objects; arrays on the way are traversed
//! element-wise, so a condition on `target.source` matches if any target
//! has that source. Numbers compare by value regardless of integer/float
//! representation.

use std::cmp::Ordering;

use serde_json::Value;

use crate::query::{ComparisonOperator, Condition};

/// Check whether a record satisfies a condition
pub fn matches(condition: &Condition, doc: &Value) -> bool {
    match condition {
        Condition::Equals { field, value } => any_equal(&resolve(doc, field), value),
        Condition::Compare {
            field,
            operator,
            value,
        } => compare(&resolve(doc, field), *operator, value),
        Condition::Exists { field } => !resolve(doc, field).is_empty(),
        Condition::And(conditions) => conditions.iter().all(|c| matches(c, doc)),
    }
}

fn compare(candidates: &[&Value], operator: ComparisonOperator, value: &Value) -> bool {
    match operator {
        ComparisonOperator::NotEqual => !any_equal(candidates, value),
        ComparisonOperator::In => in_list(candidates, value),
        ComparisonOperator::NotIn => !in_list(candidates, value),
        ComparisonOperator::Greater => any_ordering(candidates, value, |o| o == Ordering::Greater),
        ComparisonOperator::GreaterOrEqual => {
            any_ordering(candidates, value, |o| o != Ordering::Less)
        }
        ComparisonOperator::Less => any_ordering(candidates, value, |o| o == Ordering::Less),
        ComparisonOperator::LessOrEqual => {
            any_ordering(candidates, value, |o| o != Ordering::Greater)
        }
    }
}

/// Collect every value reachable by a dotted path
fn resolve<'a>(doc: &'a Value, path: &str) -> Vec<&'a Value> {
    let segments: Vec<&str> = path.split('.').collect();
    let mut out = Vec::new();
    collect(doc, &segments, &mut out);
    out
}

fn collect<'a>(value: &'a Value, segments: &[&str], out: &mut Vec<&'a Value>) {
    let (head, rest) = match segments.split_first() {
        Some(split) => split,
        None => {
            out.push(value);
            return;
        }
    };

    match value {
        Value::Object(map) => {
            if let Some(child) = map.get(*head) {
                collect(child, rest, out);
            }
        }
        Value::Array(items) => {
            if let Ok(position) = head.parse::<usize>() {
                if let Some(child) = items.get(position) {
                    collect(child, rest, out);
                }
            }
            for item in items.iter().filter(|i| i.is_object()) {
                collect(item, segments, out);
            }
        }
        _ => {}
    }
}

/// Candidate values plus, for array candidates, their elements
fn expanded<'a>(candidates: &[&'a Value]) -> Vec<&'a Value> {
    let mut out = Vec::with_capacity(candidates.len());
    for candidate in candidates {
        out.push(*candidate);
        if let Value::Array(items) = *candidate {
            out.extend(items.iter());
        }
    }
    out
}

fn any_equal(candidates: &[&Value], value: &Value) -> bool {
    expanded(candidates).iter().any(|c| values_equal(c, value))
}

fn in_list(candidates: &[&Value], list: &Value) -> bool {
    match list {
        Value::Array(options) => options.iter().any(|option| any_equal(candidates, option)),
        _ => false,
    }
}

fn any_ordering(candidates: &[&Value], value: &Value, accept: impl Fn(Ordering) -> bool) -> bool {
    expanded(candidates)
        .iter()
        .filter_map(|c| compare_values(c, value))
        .any(accept)
}

/// Order two values of the same type; mixed types are incomparable
fn compare_values(a: &Value, b: &Value) -> Option<Ordering> {
    match (a, b) {
        (Value::Number(a), Value::Number(b)) => a.as_f64()?.partial_cmp(&b.as_f64()?),
        (Value::String(a), Value::String(b)) => Some(a.cmp(b)),
        (Value::Bool(a), Value::Bool(b)) => Some(a.cmp(b)),
        _ => None,
    }
}

fn values_equal(a: &Value, b: &Value) -> bool {
    match (a, b) {
        (Value::Number(_), Value::Number(_)) => compare_values(a, b) == Some(Ordering::Equal),
        (Value::Array(a), Value::Array(b)) => {
            a.len() == b.len() && a.iter().zip(b).all(|(x, y)| values_equal(x, y))
        }
        (Value::Object(a), Value::Object(b)) => {
            a.len() == b.len()
                && a.iter()
                    .all(|(k, v)| b.get(k).map(|w| values_equal(v, w)).unwrap_or(false))
        }
        _ => a == b,
    }
}
