//! Raw request query parameters
//!
//! Query strings arrive as flat `(key, value)` pairs. Bracketed keys such as
//! `salary[gte]=50000` are folded into a nested mapping under `salary`, and
//! repeated keys become lists. A key used both plain and bracketed is
//! rejected rather than letting one form replace the other.

use std::collections::BTreeMap;

use crate::domain::DomainError;

/// Value of a single query parameter
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum QueryValue {
    /// `key=value`
    Single(String),
    /// `key=a&key=b`
    List(Vec<String>),
    /// `key[op]=value`
    Nested(BTreeMap<String, String>),
}

impl QueryValue {
    /// Scalar view of the value; for lists the last occurrence wins
    pub fn as_scalar(&self) -> Option<&str> {
        match self {
            Self::Single(value) => Some(value.as_str()),
            Self::List(values) => values.last().map(String::as_str),
            Self::Nested(_) => None,
        }
    }
}

/// Mapping of query parameter names to values
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct QueryParams {
    entries: BTreeMap<String, QueryValue>,
}

impl QueryParams {
    pub fn new() -> Self {
        Self::default()
    }

    /// Build parameters from decoded query-string pairs
    pub fn from_pairs<I, K, V>(pairs: I) -> Result<Self, DomainError>
    where
        I: IntoIterator<Item = (K, V)>,
        K: Into<String>,
        V: Into<String>,
    {
        let mut params = Self::new();

        for (key, value) in pairs {
            params.push(key.into(), value.into())?;
        }

        Ok(params)
    }

    fn push(&mut self, key: String, value: String) -> Result<(), DomainError> {
        if let Some((base, operator)) = split_bracketed(&key) {
            let entry = self
                .entries
                .entry(base.to_string())
                .or_insert_with(|| QueryValue::Nested(BTreeMap::new()));

            return match entry {
                QueryValue::Nested(map) => {
                    map.insert(operator.to_string(), value);
                    Ok(())
                }
                _ => Err(mixed_forms(base)),
            };
        }

        match self.entries.remove(&key) {
            None => {
                self.entries.insert(key, QueryValue::Single(value));
            }
            Some(QueryValue::Single(previous)) => {
                self.entries
                    .insert(key, QueryValue::List(vec![previous, value]));
            }
            Some(QueryValue::List(mut values)) => {
                values.push(value);
                self.entries.insert(key, QueryValue::List(values));
            }
            Some(QueryValue::Nested(_)) => return Err(mixed_forms(&key)),
        }

        Ok(())
    }

    pub fn insert(&mut self, key: impl Into<String>, value: QueryValue) {
        self.entries.insert(key.into(), value);
    }

    pub fn get(&self, key: &str) -> Option<&QueryValue> {
        self.entries.get(key)
    }

    pub fn get_scalar(&self, key: &str) -> Option<&str> {
        self.entries.get(key).and_then(QueryValue::as_scalar)
    }

    pub fn remove(&mut self, key: &str) -> Option<QueryValue> {
        self.entries.remove(key)
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&String, &QueryValue)> {
        self.entries.iter()
    }
}

fn mixed_forms(key: &str) -> DomainError {
    DomainError::invalid_query(format!(
        "Query parameter '{}' is given both as a value and with operators",
        key
    ))
}

/// Split `field[op]` into `("field", "op")`
fn split_bracketed(key: &str) -> Option<(&str, &str)> {
    let inner = key.strip_suffix(']')?;
    let open = inner.find('[')?;

    if open == 0 {
        return None;
    }

    Some((&inner[..open], &inner[open + 1..]))
}
