//! Query domain
//!
//! Request query parameters, filter predicates, and the translator that turns
//! the former into a [`DocumentQuery`] for the document store.

mod document;
mod filter;
mod params;
mod translator;

pub use document::{
    DocumentQuery, Projection, QueryPage, SortDirection, SortField, ID_FIELD,
};
pub use filter::{
    FilterCondition, FilterOperator, FilterValue, GeoCircle, EARTH_RADIUS_MILES,
};
pub use params::{QueryParams, QueryValue};
pub use translator::{
    translate, QueryFilterTranslator, DEFAULT_LIMIT, DEFAULT_PAGE, RESERVED_KEYS,
};
