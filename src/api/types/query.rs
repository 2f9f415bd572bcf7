//! Query-string extractor feeding the filter translator

use axum::{
    extract::{FromRequestParts, Query},
    http::request::Parts,
};

use super::error::ApiError;
use crate::domain::query::QueryParams;

/// Raw query-string pairs (bracketed keys such as `salary[gte]` kept intact)
#[derive(Debug, Clone, Default)]
pub struct ListParams(pub QueryParams);

impl ListParams {
    pub fn into_inner(self) -> QueryParams {
        self.0
    }
}

impl<S> FromRequestParts<S> for ListParams
where
    S: Send + Sync,
{
    type Rejection = ApiError;

    async fn from_request_parts(parts: &mut Parts, state: &S) -> Result<Self, Self::Rejection> {
        let Query(pairs) = Query::<Vec<(String, String)>>::from_request_parts(parts, state)
            .await
            .map_err(|e| ApiError::bad_request(e.body_text()))?;

        Ok(Self(QueryParams::from_pairs(pairs)?))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::http::Request;
    use crate::domain::query::QueryValue;

    async fn extract(uri: &str) -> QueryParams {
        let (mut parts, _) = Request::builder().uri(uri).body(()).unwrap().into_parts();
        ListParams::from_request_parts(&mut parts, &())
            .await
            .unwrap()
            .into_inner()
    }

    #[tokio::test]
    async fn test_bracketed_operators_are_nested() {
        let params = extract("/api/v1/jobs?salary%5Bgte%5D=50000&jobType=Internship&page=2").await;

        assert_eq!(params.get_scalar("jobType"), Some("Internship"));
        assert_eq!(params.get_scalar("page"), Some("2"));
        assert!(matches!(params.get("salary"), Some(QueryValue::Nested(_))));
    }

    #[tokio::test]
    async fn test_mixed_key_forms_are_rejected() {
        let (mut parts, _) = Request::builder()
            .uri("/api/v1/jobs?price=5&price%5Bgte%5D=100")
            .body(())
            .unwrap()
            .into_parts();

        let err = ListParams::from_request_parts(&mut parts, &())
            .await
            .unwrap_err();
        assert_eq!(err.status, axum::http::StatusCode::BAD_REQUEST);
        assert!(err.message().contains("price"));
    }

    #[tokio::test]
    async fn test_empty_query() {
        assert!(extract("/api/v1/jobs").await.is_empty());
    }
}
