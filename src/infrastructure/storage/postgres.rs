//! PostgreSQL storage: one JSONB table per collection

use std::fmt::Debug;
use std::marker::PhantomData;

use async_trait::async_trait;
use serde_json::Value;
use sqlx::postgres::{PgArguments, PgPool, PgPoolOptions};
use sqlx::query::Query;
use sqlx::{Postgres, Row};

use crate::domain::query::{
    DocumentQuery, FilterCondition, FilterOperator, FilterValue, SortDirection,
    EARTH_RADIUS_MILES,
};
use crate::domain::storage::{Storage, StorageEntity, StorageKey};
use crate::domain::DomainError;

/// PostgreSQL storage configuration
#[derive(Debug, Clone)]
pub struct PostgresConfig {
    pub url: String,
    pub max_connections: u32,
    pub min_connections: u32,
    /// Connection timeout in seconds
    pub connect_timeout_secs: u64,
    /// Idle timeout in seconds
    pub idle_timeout_secs: u64,
}

impl Default for PostgresConfig {
    fn default() -> Self {
        Self {
            url: "postgres://localhost/jobboard".to_string(),
            max_connections: 10,
            min_connections: 1,
            connect_timeout_secs: 30,
            idle_timeout_secs: 600,
        }
    }
}

impl PostgresConfig {
    pub fn new(url: impl Into<String>) -> Self {
        Self {
            url: url.into(),
            ..Default::default()
        }
    }

    pub fn with_max_connections(mut self, max: u32) -> Self {
        self.max_connections = max;
        self
    }
}

/// Opens the connection pool shared by all collections
pub async fn connect_pool(config: &PostgresConfig) -> Result<PgPool, DomainError> {
    PgPoolOptions::new()
        .max_connections(config.max_connections)
        .min_connections(config.min_connections)
        .acquire_timeout(std::time::Duration::from_secs(config.connect_timeout_secs))
        .idle_timeout(std::time::Duration::from_secs(config.idle_timeout_secs))
        .connect(&config.url)
        .await
        .map_err(|e| DomainError::storage(format!("Failed to connect to PostgreSQL: {}", e)))
}

/// Bound parameter of a compiled query
#[derive(Debug, Clone, PartialEq)]
pub enum SqlParam {
    Path(Vec<String>),
    Json(Value),
    Text(String),
    Float(f64),
    Int(i64),
}

impl SqlParam {
    /// Row count for `OFFSET`/`LIMIT`, saturated to the `bigint` range
    pub fn count(n: usize) -> Self {
        Self::Int(i64::try_from(n).unwrap_or(i64::MAX))
    }
}

/// SQL fragments produced from a [`DocumentQuery`]
///
/// Placeholders are numbered from `$1` in the order of `params`.
#[derive(Debug, Clone, PartialEq)]
pub struct CompiledQuery {
    pub where_clause: String,
    pub order_clause: String,
    pub window_clause: String,
    pub params: Vec<SqlParam>,
}

/// Translates document queries into SQL over a `data JSONB` column
#[derive(Debug, Default)]
pub struct JsonbQueryCompiler {
    params: Vec<SqlParam>,
}

impl JsonbQueryCompiler {
    pub fn compile(query: &DocumentQuery, with_window: bool) -> CompiledQuery {
        let mut compiler = Self::default();

        let predicates: Vec<String> = query
            .conditions()
            .iter()
            .map(|condition| compiler.predicate(condition))
            .collect();

        let where_clause = if predicates.is_empty() {
            String::new()
        } else {
            format!("WHERE {}", predicates.join(" AND "))
        };

        let order_clause = if with_window && !query.sort_fields().is_empty() {
            let terms: Vec<String> = query
                .sort_fields()
                .iter()
                .map(|field| {
                    let path = compiler.bind(SqlParam::Path(owned_path(&field.path())));
                    let direction = match field.direction {
                        SortDirection::Ascending => "ASC NULLS FIRST",
                        SortDirection::Descending => "DESC NULLS LAST",
                    };
                    format!("data #> {} {}", path, direction)
                })
                .collect();
            format!("ORDER BY {}", terms.join(", "))
        } else {
            String::new()
        };

        let window_clause = if with_window {
            let offset = compiler.bind(SqlParam::count(query.offset()));
            match query.take() {
                Some(take) => {
                    let limit = compiler.bind(SqlParam::count(take));
                    format!("OFFSET {} LIMIT {}", offset, limit)
                }
                None => format!("OFFSET {}", offset),
            }
        } else {
            String::new()
        };

        CompiledQuery {
            where_clause,
            order_clause,
            window_clause,
            params: compiler.params,
        }
    }

    fn bind(&mut self, param: SqlParam) -> String {
        self.params.push(param);
        format!("${}", self.params.len())
    }

    fn predicate(&mut self, condition: &FilterCondition) -> String {
        match (&condition.operator, &condition.value) {
            (FilterOperator::In, FilterValue::List(values)) => {
                if values.is_empty() {
                    return "FALSE".to_string();
                }
                let alternatives: Vec<String> = values
                    .iter()
                    .map(|value| self.json_path_predicate(condition, "==", value))
                    .collect();
                format!("({})", alternatives.join(" OR "))
            }
            (FilterOperator::Eq | FilterOperator::In, value) => {
                self.json_path_predicate(condition, "==", value)
            }
            (FilterOperator::Gt, value) => self.json_path_predicate(condition, ">", value),
            (FilterOperator::Gte, value) => self.json_path_predicate(condition, ">=", value),
            (FilterOperator::Lt, value) => self.json_path_predicate(condition, "<", value),
            (FilterOperator::Lte, value) => self.json_path_predicate(condition, "<=", value),
            (FilterOperator::Contains, FilterValue::Text(needle)) => {
                let path = self.bind(SqlParam::Path(owned_path(&condition.path())));
                let pattern = self.bind(SqlParam::Text(format!("%{}%", escape_like(needle))));
                format!("((data #>> {}::text[]) ILIKE {} ESCAPE '\\')", path, pattern)
            }
            (FilterOperator::WithinRadius, FilterValue::Circle(circle)) => {
                let path = self.bind(SqlParam::Path(owned_path(&condition.path())));
                let field = format!("(data #> {}::text[])", path);
                let lng = self.bind(SqlParam::Float(circle.longitude));
                let lat = self.bind(SqlParam::Float(circle.latitude));
                let radius = self.bind(SqlParam::Float(circle.radius_miles));
                let point_lng = format!("(({} -> 'coordinates' ->> 0)::float8)", field);
                let point_lat = format!("(({} -> 'coordinates' ->> 1)::float8)", field);

                format!(
                    "(jsonb_typeof({field} -> 'coordinates') = 'array' AND \
                     2 * {earth} * asin(least(1.0, sqrt(\
                     power(sin(radians({plat} - {lat}::float8) / 2), 2) + \
                     cos(radians({lat}::float8)) * cos(radians({plat})) * \
                     power(sin(radians({plng} - {lng}::float8) / 2), 2)))) <= {radius}::float8)",
                    field = field,
                    earth = EARTH_RADIUS_MILES,
                    plat = point_lat,
                    plng = point_lng,
                    lat = lat,
                    lng = lng,
                    radius = radius,
                )
            }
            _ => "FALSE".to_string(),
        }
    }

    /// Comparison through an SQL/JSON path
    ///
    /// Lax mode unwraps arrays at every step, so `industry == "Banking"` matches
    /// an array containing it and `applicantsApplied.id` looks inside each
    /// element. Numbers compare through `.double()` so numeric text such as a
    /// stored `"02101"` zipcode matches `2101`; booleans also match their text
    /// spelling. Items that cannot be converted compare as unknown and never
    /// match, and the `silent` flag keeps conversion errors out of the query.
    fn json_path_predicate(
        &mut self,
        condition: &FilterCondition,
        operator: &str,
        value: &FilterValue,
    ) -> String {
        let (filter, vars) = match value {
            FilterValue::Number(number) => (
                format!("@.double() {} $v", operator),
                serde_json::json!({ "v": number }),
            ),
            FilterValue::Boolean(flag) => (
                format!("@ {op} $v || @ {op} $s", op = operator),
                serde_json::json!({ "v": flag, "s": flag.to_string() }),
            ),
            other => (
                format!("@ {} $v", operator),
                serde_json::json!({ "v": other.to_json() }),
            ),
        };

        let path = self.bind(SqlParam::Text(json_path(&condition.path(), &filter)));
        let vars = self.bind(SqlParam::Json(vars));
        format!(
            "jsonb_path_exists(data, {}::jsonpath, {}::jsonb, true)",
            path, vars
        )
    }
}

/// `$."a"."b" ? (<filter>)`
fn json_path(path: &[&str], filter: &str) -> String {
    let accessors: String = path
        .iter()
        .map(|segment| format!(".\"{}\"", segment.replace('"', "")))
        .collect();
    format!("${} ? ({})", accessors, filter)
}

fn owned_path(path: &[&str]) -> Vec<String> {
    path.iter().map(|segment| segment.to_string()).collect()
}

fn escape_like(text: &str) -> String {
    text.replace('\\', "\\\\")
        .replace('%', "\\%")
        .replace('_', "\\_")
}

fn bind_all<'q>(
    mut query: Query<'q, Postgres, PgArguments>,
    params: &'q [SqlParam],
) -> Query<'q, Postgres, PgArguments> {
    for param in params {
        query = match param {
            SqlParam::Path(path) => query.bind(path),
            SqlParam::Json(json) => query.bind(json),
            SqlParam::Text(text) => query.bind(text),
            SqlParam::Float(number) => query.bind(*number),
            SqlParam::Int(number) => query.bind(*number),
        };
    }
    query
}

/// PostgreSQL document collection
///
/// Each entity is a row `(key, data JSONB)`; queries run against `data`.
pub struct PostgresStorage<E>
where
    E: StorageEntity,
{
    pool: PgPool,
    table_name: String,
    _phantom: PhantomData<E>,
}

impl<E> Debug for PostgresStorage<E>
where
    E: StorageEntity,
{
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("PostgresStorage")
            .field("table_name", &self.table_name)
            .finish()
    }
}

impl<E> PostgresStorage<E>
where
    E: StorageEntity,
{
    pub fn new(pool: PgPool, table_name: impl Into<String>) -> Self {
        Self {
            pool,
            table_name: table_name.into(),
            _phantom: PhantomData,
        }
    }

    /// Ensures the collection table exists
    pub async fn ensure_table(&self) -> Result<(), DomainError> {
        let query = format!(
            r#"
            CREATE TABLE IF NOT EXISTS {} (
                key VARCHAR(255) PRIMARY KEY,
                data JSONB NOT NULL,
                created_at TIMESTAMPTZ NOT NULL DEFAULT NOW(),
                updated_at TIMESTAMPTZ NOT NULL DEFAULT NOW()
            )
            "#,
            self.table_name
        );

        sqlx::query(&query)
            .execute(&self.pool)
            .await
            .map_err(|e| DomainError::storage(format!("Failed to create table: {}", e)))?;

        Ok(())
    }

    /// Case-insensitive unique index on a top-level text field
    ///
    /// Violations surface as `DomainError::DuplicateKey { field }`.
    pub async fn ensure_unique(&self, field: &str) -> Result<(), DomainError> {
        let query = format!(
            "CREATE UNIQUE INDEX IF NOT EXISTS {table}_{field}_key ON {table} ((lower(data ->> '{field}')))",
            table = self.table_name,
            field = field,
        );

        sqlx::query(&query)
            .execute(&self.pool)
            .await
            .map_err(|e| DomainError::storage(format!("Failed to create index: {}", e)))?;

        Ok(())
    }

    fn map_write_error(&self, error: sqlx::Error) -> DomainError {
        let constraint = error
            .as_database_error()
            .and_then(|db| db.constraint())
            .map(str::to_string);

        match constraint {
            Some(name) if name.ends_with("_pkey") => DomainError::duplicate_key("id"),
            Some(name) => {
                let field = name
                    .strip_prefix(&format!("{}_", self.table_name))
                    .and_then(|rest| rest.strip_suffix("_key"))
                    .unwrap_or(&name)
                    .to_string();
                DomainError::duplicate_key(field)
            }
            None => DomainError::storage(format!("Failed to write entity: {}", error)),
        }
    }

    fn decode(data: Value) -> Result<E, DomainError> {
        serde_json::from_value(data)
            .map_err(|e| DomainError::storage(format!("Failed to deserialize entity: {}", e)))
    }

    fn encode(entity: &E) -> Result<Value, DomainError> {
        serde_json::to_value(entity)
            .map_err(|e| DomainError::storage(format!("Failed to serialize entity: {}", e)))
    }
}

#[async_trait]
impl<E> Storage<E> for PostgresStorage<E>
where
    E: StorageEntity + 'static,
{
    async fn get(&self, key: &E::Key) -> Result<Option<E>, DomainError> {
        let query = format!("SELECT data FROM {} WHERE key = $1", self.table_name);

        let row = sqlx::query(&query)
            .bind(key.as_str())
            .fetch_optional(&self.pool)
            .await
            .map_err(|e| DomainError::storage(format!("Failed to get entity: {}", e)))?;

        row.map(|row| Self::decode(row.get("data"))).transpose()
    }

    async fn list(&self) -> Result<Vec<E>, DomainError> {
        let query = format!("SELECT data FROM {} ORDER BY created_at", self.table_name);

        let rows = sqlx::query(&query)
            .fetch_all(&self.pool)
            .await
            .map_err(|e| DomainError::storage(format!("Failed to list entities: {}", e)))?;

        rows.into_iter()
            .map(|row| Self::decode(row.get("data")))
            .collect()
    }

    async fn find(&self, query: &DocumentQuery) -> Result<Vec<E>, DomainError> {
        let compiled = JsonbQueryCompiler::compile(query, true);
        let sql = format!(
            "SELECT data FROM {} {} {} {}",
            self.table_name, compiled.where_clause, compiled.order_clause, compiled.window_clause
        );

        let rows = bind_all(sqlx::query(&sql), &compiled.params)
            .fetch_all(&self.pool)
            .await
            .map_err(|e| DomainError::storage(format!("Failed to query entities: {}", e)))?;

        rows.into_iter()
            .map(|row| Self::decode(row.get("data")))
            .collect()
    }

    async fn create(&self, entity: E) -> Result<E, DomainError> {
        let key = entity.key().as_str().to_string();
        let data = Self::encode(&entity)?;
        let query = format!("INSERT INTO {} (key, data) VALUES ($1, $2)", self.table_name);

        sqlx::query(&query)
            .bind(&key)
            .bind(&data)
            .execute(&self.pool)
            .await
            .map_err(|e| self.map_write_error(e))?;

        Ok(entity)
    }

    async fn update(&self, entity: E) -> Result<E, DomainError> {
        let key = entity.key().as_str().to_string();
        let data = Self::encode(&entity)?;
        let query = format!(
            "UPDATE {} SET data = $2, updated_at = NOW() WHERE key = $1",
            self.table_name
        );

        let result = sqlx::query(&query)
            .bind(&key)
            .bind(&data)
            .execute(&self.pool)
            .await
            .map_err(|e| self.map_write_error(e))?;

        if result.rows_affected() == 0 {
            return Err(DomainError::not_found(format!(
                "Entity with key '{}' not found",
                key
            )));
        }

        Ok(entity)
    }

    async fn delete(&self, key: &E::Key) -> Result<bool, DomainError> {
        let query = format!("DELETE FROM {} WHERE key = $1", self.table_name);

        let result = sqlx::query(&query)
            .bind(key.as_str())
            .execute(&self.pool)
            .await
            .map_err(|e| DomainError::storage(format!("Failed to delete entity: {}", e)))?;

        Ok(result.rows_affected() > 0)
    }

    async fn delete_many(&self, query: &DocumentQuery) -> Result<usize, DomainError> {
        let compiled = JsonbQueryCompiler::compile(query, false);
        let sql = format!("DELETE FROM {} {}", self.table_name, compiled.where_clause);

        let result = bind_all(sqlx::query(&sql), &compiled.params)
            .execute(&self.pool)
            .await
            .map_err(|e| DomainError::storage(format!("Failed to delete entities: {}", e)))?;

        Ok(result.rows_affected() as usize)
    }

    async fn exists(&self, key: &E::Key) -> Result<bool, DomainError> {
        let query = format!(
            "SELECT EXISTS(SELECT 1 FROM {} WHERE key = $1) as exists",
            self.table_name
        );

        let row = sqlx::query(&query)
            .bind(key.as_str())
            .fetch_one(&self.pool)
            .await
            .map_err(|e| DomainError::storage(format!("Failed to check existence: {}", e)))?;

        Ok(row.get("exists"))
    }

    async fn count(&self) -> Result<usize, DomainError> {
        let query = format!("SELECT COUNT(*) as count FROM {}", self.table_name);

        let row = sqlx::query(&query)
            .fetch_one(&self.pool)
            .await
            .map_err(|e| DomainError::storage(format!("Failed to count entities: {}", e)))?;

        let count: i64 = row.get("count");
        Ok(count as usize)
    }

    async fn clear(&self) -> Result<(), DomainError> {
        let query = format!("DELETE FROM {}", self.table_name);

        sqlx::query(&query)
            .execute(&self.pool)
            .await
            .map_err(|e| DomainError::storage(format!("Failed to clear storage: {}", e)))?;

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::query::{translate, GeoCircle, QueryParams, SortField};
    use crate::infrastructure::storage::evaluator;

    #[test]
    fn test_postgres_config_builder() {
        let config = PostgresConfig::new("postgres://localhost/test").with_max_connections(20);

        assert_eq!(config.url, "postgres://localhost/test");
        assert_eq!(config.max_connections, 20);
        assert_eq!(config.min_connections, 1);
    }

    #[test]
    fn test_compile_empty_query() {
        let compiled = JsonbQueryCompiler::compile(&DocumentQuery::new(), true);

        assert_eq!(compiled.where_clause, "");
        assert_eq!(compiled.order_clause, "");
        assert_eq!(compiled.window_clause, "OFFSET $1");
        assert_eq!(compiled.params, vec![SqlParam::Int(0)]);
    }

    #[test]
    fn test_compile_comparison_binds_values() {
        let query = DocumentQuery::new()
            .filter(FilterCondition::gte("salary", 100.0))
            .sort_by(vec![SortField::descending("postingDate")])
            .paginate(20, 10);

        let compiled = JsonbQueryCompiler::compile(&query, true);

        assert_eq!(
            compiled.where_clause,
            "WHERE jsonb_path_exists(data, $1::jsonpath, $2::jsonb, true)"
        );
        assert_eq!(compiled.order_clause, "ORDER BY data #> $3 DESC NULLS LAST");
        assert_eq!(compiled.window_clause, "OFFSET $4 LIMIT $5");
        assert_eq!(
            compiled.params,
            vec![
                SqlParam::Text("$.\"salary\" ? (@.double() >= $v)".to_string()),
                SqlParam::Json(serde_json::json!({ "v": 100.0 })),
                SqlParam::Path(vec!["postingDate".to_string()]),
                SqlParam::Int(20),
                SqlParam::Int(10),
            ]
        );
    }

    #[test]
    fn test_nested_path_reaches_into_arrays() {
        let query =
            DocumentQuery::new().filter(FilterCondition::eq("applicantsApplied.id", "user-1"));

        let compiled = JsonbQueryCompiler::compile(&query, false);

        assert_eq!(
            compiled.params[0],
            SqlParam::Text("$.\"applicantsApplied\".\"id\" ? (@ == $v)".to_string())
        );
        assert_eq!(
            compiled.params[1],
            SqlParam::Json(serde_json::json!({ "v": "user-1" }))
        );
    }

    #[test]
    fn test_compile_never_inlines_values() {
        let query = DocumentQuery::new()
            .filter(FilterCondition::eq("title", "x' OR 1=1 --"))
            .filter(FilterCondition::contains("title", "50%_off"));

        let compiled = JsonbQueryCompiler::compile(&query, false);

        assert!(!compiled.where_clause.contains("OR 1=1"));
        assert!(compiled.params.contains(&SqlParam::Text("%50\\%\\_off%".to_string())));
        assert_eq!(compiled.window_clause, "");
    }

    #[test]
    fn test_compile_geo_and_empty_in() {
        let query = DocumentQuery::new()
            .filter(FilterCondition::within_radius(
                "location",
                GeoCircle::new(-71.0, 42.0, 25.0),
            ))
            .filter(FilterCondition::in_list("jobType", vec![]));

        let compiled = JsonbQueryCompiler::compile(&query, false);

        assert!(compiled.where_clause.contains("asin"));
        assert!(compiled.where_clause.contains("3963"));
        assert!(compiled.where_clause.ends_with("AND FALSE"));
        assert!(compiled.params.contains(&SqlParam::Float(25.0)));
    }

    #[test]
    fn test_window_saturates_huge_page_and_limit() {
        let far_page =
            QueryParams::from_pairs([("page", "1000000000000000000"), ("limit", "100")]).unwrap();
        let query = translate(DocumentQuery::new(), far_page).unwrap();
        let compiled = JsonbQueryCompiler::compile(&query, true);
        assert_eq!(
            compiled.params,
            vec![SqlParam::Int(i64::MAX), SqlParam::Int(100)]
        );

        let huge_limit = QueryParams::from_pairs([("limit", "18446744073709551615")]).unwrap();
        let query = translate(DocumentQuery::new(), huge_limit).unwrap();
        let compiled = JsonbQueryCompiler::compile(&query, true);
        assert_eq!(compiled.params, vec![SqlParam::Int(0), SqlParam::Int(i64::MAX)]);

        for param in &compiled.params {
            assert!(matches!(param, SqlParam::Int(n) if *n >= 0));
        }
    }

    #[test]
    fn test_numeric_text_matches_like_in_memory() {
        let params = QueryParams::from_pairs([("location.zipcode", "02101")]).unwrap();
        let query = translate(DocumentQuery::new(), params).unwrap();
        let document = serde_json::json!({ "location": { "zipcode": "02101" } });

        assert!(evaluator::matches(&document, query.conditions()));

        let compiled = JsonbQueryCompiler::compile(&query, false);
        assert_eq!(
            compiled.params[0],
            SqlParam::Text("$.\"location\".\"zipcode\" ? (@.double() == $v)".to_string())
        );
        assert_eq!(compiled.params[1], SqlParam::Json(serde_json::json!({ "v": 2101.0 })));
    }

    #[test]
    fn test_boolean_matches_text_spelling() {
        let query = DocumentQuery::new().filter(FilterCondition::eq("active", true));
        let document = serde_json::json!({ "active": "true" });

        assert!(evaluator::matches(&document, query.conditions()));

        let compiled = JsonbQueryCompiler::compile(&query, false);
        assert_eq!(
            compiled.params[0],
            SqlParam::Text("$.\"active\" ? (@ == $v || @ == $s)".to_string())
        );
        assert_eq!(
            compiled.params[1],
            SqlParam::Json(serde_json::json!({ "v": true, "s": "true" }))
        );
    }
}
