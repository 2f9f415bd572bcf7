//! Store-agnostic description of a collection query

use serde::Serialize;
use serde_json::{Map, Value};

use super::filter::FilterCondition;

/// Field that is always kept by projections
pub const ID_FIELD: &str = "id";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum SortDirection {
    Ascending,
    Descending,
}

/// One component of a sort order
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct SortField {
    pub field: String,
    pub direction: SortDirection,
}

impl SortField {
    pub fn ascending(field: impl Into<String>) -> Self {
        Self {
            field: field.into(),
            direction: SortDirection::Ascending,
        }
    }

    pub fn descending(field: impl Into<String>) -> Self {
        Self {
            field: field.into(),
            direction: SortDirection::Descending,
        }
    }

    /// Parse `field` or `-field`
    pub fn parse(spec: &str) -> Option<Self> {
        let spec = spec.trim();

        if let Some(field) = spec.strip_prefix('-') {
            let field = field.trim();
            return (!field.is_empty()).then(|| Self::descending(field));
        }

        let field = spec.strip_prefix('+').unwrap_or(spec).trim();
        (!field.is_empty()).then(|| Self::ascending(field))
    }

    /// Parse a comma separated sort specification
    pub fn parse_list(spec: &str) -> Vec<Self> {
        spec.split(',').filter_map(Self::parse).collect()
    }

    pub fn path(&self) -> Vec<&str> {
        self.field.split('.').collect()
    }
}

/// Set of fields to return
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Projection {
    fields: Vec<String>,
}

impl Projection {
    pub fn new(fields: Vec<String>) -> Self {
        Self { fields }
    }

    pub fn fields(&self) -> &[String] {
        &self.fields
    }

    /// Keep only the projected fields (and the id) of a JSON document
    pub fn apply(&self, document: Value) -> Value {
        let Value::Object(source) = document else {
            return document;
        };

        let mut projected = Map::new();

        if let Some(id) = source.get(ID_FIELD) {
            projected.insert(ID_FIELD.to_string(), id.clone());
        }

        for field in &self.fields {
            let path: Vec<&str> = field.split('.').collect();
            if let Some(value) = lookup(&source, &path) {
                insert_path(&mut projected, &path, value.clone());
            }
        }

        Value::Object(projected)
    }
}

fn lookup<'a>(object: &'a Map<String, Value>, path: &[&str]) -> Option<&'a Value> {
    let (first, rest) = path.split_first()?;
    let value = object.get(*first)?;

    if rest.is_empty() {
        return Some(value);
    }

    match value {
        Value::Object(inner) => lookup(inner, rest),
        _ => None,
    }
}

fn insert_path(object: &mut Map<String, Value>, path: &[&str], value: Value) {
    let Some((first, rest)) = path.split_first() else {
        return;
    };

    if rest.is_empty() {
        object.insert(first.to_string(), value);
        return;
    }

    let entry = object
        .entry(first.to_string())
        .or_insert_with(|| Value::Object(Map::new()));

    if let Value::Object(inner) = entry {
        insert_path(inner, rest, value);
    }
}

/// A refinable query over one collection
///
/// Building a query never touches the store; execution is done by
/// [`crate::domain::storage::Storage::find`].
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct DocumentQuery {
    conditions: Vec<FilterCondition>,
    sort: Vec<SortField>,
    default_sort: Vec<SortField>,
    projection: Option<Projection>,
    offset: usize,
    take: Option<usize>,
}

impl DocumentQuery {
    pub fn new() -> Self {
        Self::default()
    }

    /// Order applied when no explicit sort is requested
    pub fn with_default_sort(mut self, spec: &str) -> Self {
        self.default_sort = SortField::parse_list(spec);
        self
    }

    pub fn filter(mut self, condition: FilterCondition) -> Self {
        self.conditions.push(condition);
        self
    }

    pub fn sort_by(mut self, fields: Vec<SortField>) -> Self {
        self.sort = fields;
        self
    }

    pub fn select(mut self, projection: Projection) -> Self {
        self.projection = Some(projection);
        self
    }

    pub fn paginate(mut self, offset: usize, take: usize) -> Self {
        self.offset = offset;
        self.take = Some(take);
        self
    }

    pub fn conditions(&self) -> &[FilterCondition] {
        &self.conditions
    }

    /// Explicit sort if any, otherwise the default sort
    pub fn sort_fields(&self) -> &[SortField] {
        if self.sort.is_empty() {
            &self.default_sort
        } else {
            &self.sort
        }
    }

    pub fn projection(&self) -> Option<&Projection> {
        self.projection.as_ref()
    }

    pub fn offset(&self) -> usize {
        self.offset
    }

    pub fn take(&self) -> Option<usize> {
        self.take
    }

    /// Apply the projection (if any) to a serialized document
    pub fn project(&self, document: Value) -> Value {
        match &self.projection {
            Some(projection) => projection.apply(document),
            None => document,
        }
    }
}

/// Entities returned by a query, with the projection to apply when rendering
#[derive(Debug, Clone)]
pub struct QueryPage<T> {
    pub items: Vec<T>,
    pub projection: Option<Projection>,
}

impl<T> QueryPage<T> {
    pub fn new(items: Vec<T>, query: &DocumentQuery) -> Self {
        Self {
            items,
            projection: query.projection().cloned(),
        }
    }

    pub fn len(&self) -> usize {
        self.items.len()
    }

    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    /// Apply the projection (if any) to one rendered item
    pub fn project(&self, document: Value) -> Value {
        match &self.projection {
            Some(projection) => projection.apply(document),
            None => document,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_sort_field_parse() {
        assert_eq!(SortField::parse("-salary"), Some(SortField::descending("salary")));
        assert_eq!(SortField::parse("title"), Some(SortField::ascending("title")));
        assert_eq!(SortField::parse(" "), None);
        assert_eq!(SortField::parse("-"), None);
    }

    #[test]
    fn test_sort_list_skips_empty_entries() {
        let fields = SortField::parse_list("salary,,-postingDate");
        assert_eq!(
            fields,
            vec![
                SortField::ascending("salary"),
                SortField::descending("postingDate")
            ]
        );
    }

    #[test]
    fn test_default_sort_used_when_no_sort() {
        let query = DocumentQuery::new().with_default_sort("-postingDate");
        assert_eq!(query.sort_fields(), &[SortField::descending("postingDate")]);

        let query = query.sort_by(vec![SortField::ascending("salary")]);
        assert_eq!(query.sort_fields(), &[SortField::ascending("salary")]);
    }

    #[test]
    fn test_projection_keeps_id_and_requested_fields() {
        let projection = Projection::new(vec!["title".to_string(), "location.city".to_string()]);
        let document = json!({
            "id": "job-1",
            "title": "Rust developer",
            "salary": 90000,
            "location": {"city": "Boston", "zipcode": "02101"}
        });

        let projected = projection.apply(document);
        assert_eq!(
            projected,
            json!({"id": "job-1", "title": "Rust developer", "location": {"city": "Boston"}})
        );
    }

    #[test]
    fn test_project_without_projection_is_identity() {
        let document = json!({"id": "1", "name": "x"});
        assert_eq!(DocumentQuery::new().project(document.clone()), document);
    }
}
