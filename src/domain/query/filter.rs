//! Filter predicates for document queries

use serde::Serialize;

/// Comparison operators understood by the document store
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum FilterOperator {
    /// Exact match (array fields match when they contain the value)
    Eq,
    /// Greater than
    Gt,
    /// Greater than or equal to
    Gte,
    /// Less than
    Lt,
    /// Less than or equal to
    Lte,
    /// Value is one of a list
    In,
    /// Case-insensitive substring match on text fields
    Contains,
    /// Point lies within a circle on the earth's surface
    WithinRadius,
}

impl FilterOperator {
    /// Parse a bracketed comparison suffix (`gt`, `gte`, `lt`, `lte`)
    pub fn from_suffix(suffix: &str) -> Option<Self> {
        match suffix {
            "gt" => Some(Self::Gt),
            "gte" => Some(Self::Gte),
            "lt" => Some(Self::Lt),
            "lte" => Some(Self::Lte),
            _ => None,
        }
    }

    /// Store-native spelling of the operator
    pub fn as_store_operator(&self) -> &'static str {
        match self {
            Self::Eq => "$eq",
            Self::Gt => "$gt",
            Self::Gte => "$gte",
            Self::Lt => "$lt",
            Self::Lte => "$lte",
            Self::In => "$in",
            Self::Contains => "$regex",
            Self::WithinRadius => "$geoWithin",
        }
    }
}

impl std::fmt::Display for FilterOperator {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_store_operator())
    }
}

/// Mean earth radius used for distance calculations
pub const EARTH_RADIUS_MILES: f64 = 3963.0;

/// Circle on the earth's surface, radius in miles
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct GeoCircle {
    pub longitude: f64,
    pub latitude: f64,
    pub radius_miles: f64,
}

impl GeoCircle {
    pub fn new(longitude: f64, latitude: f64, radius_miles: f64) -> Self {
        Self {
            longitude,
            latitude,
            radius_miles,
        }
    }

    /// Radius as an angle in radians
    pub fn radius_radians(&self) -> f64 {
        self.radius_miles / EARTH_RADIUS_MILES
    }

    /// Great-circle distance from the centre to a point, in miles
    pub fn distance_to(&self, longitude: f64, latitude: f64) -> f64 {
        let (lat1, lat2) = (self.latitude.to_radians(), latitude.to_radians());
        let d_lat = lat2 - lat1;
        let d_lng = (longitude - self.longitude).to_radians();

        let a = (d_lat / 2.0).sin().powi(2) + lat1.cos() * lat2.cos() * (d_lng / 2.0).sin().powi(2);
        2.0 * EARTH_RADIUS_MILES * a.sqrt().min(1.0).asin()
    }

    pub fn contains(&self, longitude: f64, latitude: f64) -> bool {
        self.distance_to(longitude, latitude) <= self.radius_miles
    }
}

/// Filter value
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(untagged)]
pub enum FilterValue {
    Text(String),
    Number(f64),
    Boolean(bool),
    List(Vec<FilterValue>),
    Circle(GeoCircle),
}

impl FilterValue {
    /// Interpret a raw query-string value: booleans, then numbers, then text
    pub fn parse(raw: &str) -> Self {
        match raw {
            "true" => return Self::Boolean(true),
            "false" => return Self::Boolean(false),
            _ => {}
        }

        match raw.trim().parse::<f64>() {
            Ok(number) if number.is_finite() => Self::Number(number),
            _ => Self::Text(raw.to_string()),
        }
    }

    /// JSON form of the value as stored in documents
    pub fn to_json(&self) -> serde_json::Value {
        match self {
            Self::Text(text) => serde_json::Value::String(text.clone()),
            Self::Number(number) => serde_json::json!(number),
            Self::Boolean(flag) => serde_json::Value::Bool(*flag),
            Self::List(values) => {
                serde_json::Value::Array(values.iter().map(FilterValue::to_json).collect())
            }
            Self::Circle(circle) => serde_json::json!({
                "center": [circle.longitude, circle.latitude],
                "radiusMiles": circle.radius_miles,
            }),
        }
    }
}

impl From<&str> for FilterValue {
    fn from(s: &str) -> Self {
        Self::Text(s.to_string())
    }
}

impl From<String> for FilterValue {
    fn from(s: String) -> Self {
        Self::Text(s)
    }
}

impl From<f64> for FilterValue {
    fn from(n: f64) -> Self {
        Self::Number(n)
    }
}

impl From<i64> for FilterValue {
    fn from(n: i64) -> Self {
        Self::Number(n as f64)
    }
}

impl From<bool> for FilterValue {
    fn from(b: bool) -> Self {
        Self::Boolean(b)
    }
}

/// A single predicate on a document field
///
/// Field names are dotted paths into the document (`location.city`).
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct FilterCondition {
    pub field: String,
    pub operator: FilterOperator,
    pub value: FilterValue,
}

impl FilterCondition {
    pub fn new(field: impl Into<String>, operator: FilterOperator, value: FilterValue) -> Self {
        Self {
            field: field.into(),
            operator,
            value,
        }
    }

    pub fn eq(field: impl Into<String>, value: impl Into<FilterValue>) -> Self {
        Self::new(field, FilterOperator::Eq, value.into())
    }

    pub fn gt(field: impl Into<String>, value: impl Into<FilterValue>) -> Self {
        Self::new(field, FilterOperator::Gt, value.into())
    }

    pub fn gte(field: impl Into<String>, value: impl Into<FilterValue>) -> Self {
        Self::new(field, FilterOperator::Gte, value.into())
    }

    pub fn lt(field: impl Into<String>, value: impl Into<FilterValue>) -> Self {
        Self::new(field, FilterOperator::Lt, value.into())
    }

    pub fn lte(field: impl Into<String>, value: impl Into<FilterValue>) -> Self {
        Self::new(field, FilterOperator::Lte, value.into())
    }

    pub fn in_list(field: impl Into<String>, values: Vec<FilterValue>) -> Self {
        Self::new(field, FilterOperator::In, FilterValue::List(values))
    }

    pub fn contains(field: impl Into<String>, text: impl Into<String>) -> Self {
        Self::new(field, FilterOperator::Contains, FilterValue::Text(text.into()))
    }

    pub fn within_radius(field: impl Into<String>, circle: GeoCircle) -> Self {
        Self::new(field, FilterOperator::WithinRadius, FilterValue::Circle(circle))
    }

    /// Path segments of the field
    pub fn path(&self) -> Vec<&str> {
        self.field.split('.').collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_operator_suffixes() {
        assert_eq!(FilterOperator::from_suffix("gte"), Some(FilterOperator::Gte));
        assert_eq!(FilterOperator::from_suffix("lt"), Some(FilterOperator::Lt));
        assert_eq!(FilterOperator::from_suffix("ne"), None);
        assert_eq!(FilterOperator::Gte.to_string(), "$gte");
    }

    #[test]
    fn test_value_parsing() {
        assert_eq!(FilterValue::parse("100"), FilterValue::Number(100.0));
        assert_eq!(FilterValue::parse("2.5"), FilterValue::Number(2.5));
        assert_eq!(FilterValue::parse("true"), FilterValue::Boolean(true));
        assert_eq!(
            FilterValue::parse("Permanent"),
            FilterValue::Text("Permanent".to_string())
        );
        assert_eq!(FilterValue::parse("NaN"), FilterValue::Text("NaN".to_string()));
    }

    #[test]
    fn test_geo_circle_contains() {
        // Boston centre, Cambridge is ~3 miles away, New York ~190
        let circle = GeoCircle::new(-71.0589, 42.3601, 10.0);

        assert!(circle.contains(-71.1097, 42.3736));
        assert!(!circle.contains(-74.0060, 40.7128));
        assert!(circle.distance_to(-71.0589, 42.3601) < 1e-9);
    }

    #[test]
    fn test_condition_path() {
        let condition = FilterCondition::eq("location.city", "Boston");
        assert_eq!(condition.path(), vec!["location", "city"]);
    }
}
