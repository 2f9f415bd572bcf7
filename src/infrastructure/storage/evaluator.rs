//! Evaluates a `DocumentQuery` against JSON documents

use std::cmp::Ordering;

use chrono::{DateTime, Utc};
use serde_json::Value;

use crate::domain::query::{
    DocumentQuery, FilterCondition, FilterOperator, FilterValue, SortDirection,
};

/// Resolve a dotted path inside a document
pub fn lookup<'a>(document: &'a Value, path: &[&str]) -> Option<&'a Value> {
    path.iter()
        .try_fold(document, |current, segment| current.get(*segment))
}

/// Values reached by a dotted path, stepping into every element of
/// intermediate arrays
fn resolve<'a>(document: &'a Value, path: &[&str]) -> Vec<&'a Value> {
    let Some((first, rest)) = path.split_first() else {
        return vec![document];
    };

    match document {
        Value::Object(map) => map
            .get(*first)
            .map(|value| resolve(value, rest))
            .unwrap_or_default(),
        Value::Array(items) => items.iter().flat_map(|item| resolve(item, path)).collect(),
        _ => Vec::new(),
    }
}

/// True when the document satisfies every condition
pub fn matches(document: &Value, conditions: &[FilterCondition]) -> bool {
    conditions
        .iter()
        .all(|condition| matches_condition(document, condition))
}

fn matches_condition(document: &Value, condition: &FilterCondition) -> bool {
    resolve(document, &condition.path())
        .into_iter()
        .any(|field| matches_value(field, condition))
}

fn matches_value(field: &Value, condition: &FilterCondition) -> bool {
    let ordered = matches!(
        condition.operator,
        FilterOperator::Gt | FilterOperator::Gte | FilterOperator::Lt | FilterOperator::Lte
    );

    if let (Value::Array(items), true) = (field, ordered) {
        return items.iter().any(|item| matches_value(item, condition));
    }

    match (&condition.operator, &condition.value) {
        (FilterOperator::Eq, value) => equals_or_contains(field, value),
        (FilterOperator::In, FilterValue::List(values)) => {
            values.iter().any(|value| equals_or_contains(field, value))
        }
        (FilterOperator::In, value) => equals_or_contains(field, value),
        (FilterOperator::Gt, value) => compare_filter(field, value) == Some(Ordering::Greater),
        (FilterOperator::Gte, value) => matches!(
            compare_filter(field, value),
            Some(Ordering::Greater | Ordering::Equal)
        ),
        (FilterOperator::Lt, value) => compare_filter(field, value) == Some(Ordering::Less),
        (FilterOperator::Lte, value) => matches!(
            compare_filter(field, value),
            Some(Ordering::Less | Ordering::Equal)
        ),
        (FilterOperator::Contains, FilterValue::Text(needle)) => field
            .as_str()
            .is_some_and(|text| text.to_lowercase().contains(&needle.to_lowercase())),
        (FilterOperator::WithinRadius, FilterValue::Circle(circle)) => point_of(field)
            .is_some_and(|(lng, lat)| circle.contains(lng, lat)),
        _ => false,
    }
}

/// Exact match; array fields match when any element matches
fn equals_or_contains(field: &Value, value: &FilterValue) -> bool {
    match field {
        Value::Array(items) => items.iter().any(|item| equals(item, value)),
        other => equals(other, value),
    }
}

fn equals(field: &Value, value: &FilterValue) -> bool {
    match (field, value) {
        (Value::String(text), FilterValue::Text(expected)) => text == expected,
        (Value::String(text), FilterValue::Number(expected)) => text
            .trim()
            .parse::<f64>()
            .is_ok_and(|number| number == *expected),
        (Value::String(text), FilterValue::Boolean(expected)) => {
            text == if *expected { "true" } else { "false" }
        }
        (Value::Number(number), FilterValue::Number(expected)) => {
            number.as_f64() == Some(*expected)
        }
        (Value::Bool(flag), FilterValue::Boolean(expected)) => flag == expected,
        _ => false,
    }
}

fn compare_filter(field: &Value, value: &FilterValue) -> Option<Ordering> {
    match (field, value) {
        (Value::Number(number), FilterValue::Number(expected)) => {
            number.as_f64()?.partial_cmp(expected)
        }
        (Value::String(text), FilterValue::Number(expected)) => {
            text.trim().parse::<f64>().ok()?.partial_cmp(expected)
        }
        (Value::String(text), FilterValue::Text(expected)) => {
            match (parse_date(text), parse_date(expected)) {
                (Some(left), Some(right)) => Some(left.cmp(&right)),
                _ => Some(text.as_str().cmp(expected.as_str())),
            }
        }
        _ => None,
    }
}

/// `[lng, lat]` from a GeoJSON point or a bare coordinate pair
fn point_of(field: &Value) -> Option<(f64, f64)> {
    let coordinates = field.get("coordinates").unwrap_or(field).as_array()?;

    match coordinates.as_slice() {
        [lng, lat] => Some((lng.as_f64()?, lat.as_f64()?)),
        _ => None,
    }
}

fn parse_date(text: &str) -> Option<DateTime<Utc>> {
    DateTime::parse_from_rfc3339(text)
        .ok()
        .map(|date| date.with_timezone(&Utc))
}

/// Total order over JSON values used for sorting; missing values sort first
pub fn compare_values(left: Option<&Value>, right: Option<&Value>) -> Ordering {
    match (left, right) {
        (None, None) => Ordering::Equal,
        (None, Some(_)) => Ordering::Less,
        (Some(_), None) => Ordering::Greater,
        (Some(left), Some(right)) => compare_present(left, right),
    }
}

fn compare_present(left: &Value, right: &Value) -> Ordering {
    match (left, right) {
        (Value::Number(a), Value::Number(b)) => a
            .as_f64()
            .partial_cmp(&b.as_f64())
            .unwrap_or(Ordering::Equal),
        (Value::String(a), Value::String(b)) => match (parse_date(a), parse_date(b)) {
            (Some(a), Some(b)) => a.cmp(&b),
            _ => a.cmp(b),
        },
        (Value::Bool(a), Value::Bool(b)) => a.cmp(b),
        (Value::Null, Value::Null) => Ordering::Equal,
        (Value::Null, _) => Ordering::Less,
        (_, Value::Null) => Ordering::Greater,
        _ => Ordering::Equal,
    }
}

/// Apply filter, sort and window to `(entity, document)` pairs
pub fn execute<E>(mut rows: Vec<(E, Value)>, query: &DocumentQuery) -> Vec<E> {
    rows.retain(|(_, document)| matches(document, query.conditions()));

    let sort = query.sort_fields();
    if !sort.is_empty() {
        rows.sort_by(|(_, a), (_, b)| {
            sort.iter()
                .map(|field| {
                    let path = field.path();
                    let ordering = compare_values(lookup(a, &path), lookup(b, &path));
                    match field.direction {
                        SortDirection::Ascending => ordering,
                        SortDirection::Descending => ordering.reverse(),
                    }
                })
                .find(|ordering| *ordering != Ordering::Equal)
                .unwrap_or(Ordering::Equal)
        });
    }

    let take = query.take().unwrap_or(usize::MAX);

    rows.into_iter()
        .skip(query.offset())
        .take(take)
        .map(|(entity, _)| entity)
        .collect()
}
