//! Query-string to document-query translation
//!
//! Applies, in order: filtering, sorting, field selection and pagination.
//! The result is a [`DocumentQuery`]; nothing is executed here.

use once_cell::sync::Lazy;
use regex::Regex;

use super::document::{DocumentQuery, Projection, SortField};
use super::filter::{FilterCondition, FilterOperator, FilterValue};
use super::params::{QueryParams, QueryValue};
use crate::domain::DomainError;

/// Control keys that never become filter predicates
pub const RESERVED_KEYS: [&str; 4] = ["sort", "fields", "page", "limit"];

pub const DEFAULT_PAGE: usize = 1;
pub const DEFAULT_LIMIT: usize = 10;

static FIELD_PATTERN: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^[A-Za-z_][A-Za-z0-9_]*(\.[A-Za-z_][A-Za-z0-9_]*)*$").unwrap());

/// Builder that refines a base query from request parameters
#[derive(Debug, Clone)]
pub struct QueryFilterTranslator {
    query: DocumentQuery,
    params: QueryParams,
}

impl QueryFilterTranslator {
    pub fn new(base: DocumentQuery, params: QueryParams) -> Self {
        Self {
            query: base,
            params,
        }
    }

    /// Turn every non-reserved parameter into a predicate
    pub fn filter(mut self) -> Result<Self, DomainError> {
        for (field, value) in self.params.iter() {
            if RESERVED_KEYS.contains(&field.as_str()) {
                continue;
            }

            validate_field(field)?;

            match value {
                QueryValue::Single(raw) => {
                    self.query = self
                        .query
                        .filter(FilterCondition::eq(field.as_str(), FilterValue::parse(raw)));
                }
                QueryValue::List(raws) => {
                    let values = raws.iter().map(|raw| FilterValue::parse(raw)).collect();
                    self.query = self
                        .query
                        .filter(FilterCondition::in_list(field.as_str(), values));
                }
                QueryValue::Nested(operators) => {
                    for (suffix, raw) in operators {
                        let operator = FilterOperator::from_suffix(suffix).ok_or_else(|| {
                            DomainError::invalid_query(format!(
                                "Unsupported operator '{}' for field '{}'",
                                suffix, field
                            ))
                        })?;

                        self.query = self.query.filter(FilterCondition::new(
                            field.as_str(),
                            operator,
                            FilterValue::parse(raw),
                        ));
                    }
                }
            }
        }

        Ok(self)
    }

    /// Apply `sort=a,-b`; the base query's default order is kept otherwise
    pub fn sort(mut self) -> Result<Self, DomainError> {
        if let Some(spec) = self.params.get_scalar("sort") {
            let fields = SortField::parse_list(spec);

            for field in &fields {
                validate_field(&field.field)?;
            }

            if !fields.is_empty() {
                self.query = self.query.sort_by(fields);
            }
        }

        Ok(self)
    }

    /// Apply `fields=a,b`
    pub fn limit_fields(mut self) -> Result<Self, DomainError> {
        if let Some(spec) = self.params.get_scalar("fields") {
            let fields: Vec<String> = spec
                .split(',')
                .map(str::trim)
                .filter(|f| !f.is_empty())
                .map(String::from)
                .collect();

            for field in &fields {
                validate_field(field)?;
            }

            if !fields.is_empty() {
                self.query = self.query.select(Projection::new(fields));
            }
        }

        Ok(self)
    }

    /// Apply `page` and `limit` as a skip/take window
    pub fn paginate(mut self) -> Result<Self, DomainError> {
        let page = parse_positive(&self.params, "page", DEFAULT_PAGE)?;
        let limit = parse_positive(&self.params, "limit", DEFAULT_LIMIT)?;

        let offset = (page - 1).saturating_mul(limit);
        self.query = self.query.paginate(offset, limit);

        Ok(self)
    }

    pub fn into_query(self) -> DocumentQuery {
        self.query
    }
}

/// Run all four refinements over `base`
pub fn translate(base: DocumentQuery, params: QueryParams) -> Result<DocumentQuery, DomainError> {
    Ok(QueryFilterTranslator::new(base, params)
        .filter()?
        .sort()?
        .limit_fields()?
        .paginate()?
        .into_query())
}

fn validate_field(field: &str) -> Result<(), DomainError> {
    if FIELD_PATTERN.is_match(field) {
        Ok(())
    } else {
        Err(DomainError::invalid_query(format!(
            "Invalid field name '{}'",
            field
        )))
    }
}

fn parse_positive(params: &QueryParams, key: &str, default: usize) -> Result<usize, DomainError> {
    let Some(raw) = params.get_scalar(key) else {
        return Ok(default);
    };

    match raw.trim().parse::<usize>() {
        Ok(value) if value > 0 => Ok(value),
        _ => Err(DomainError::invalid_query(format!(
            "'{}' must be a positive integer, got '{}'",
            key, raw
        ))),
    }
}
