//! Development-only exposure of the raw error behind a failed response

use axum::{
    body::{to_bytes, Body},
    extract::Request,
    http::header,
    middleware::Next,
    response::Response,
};
use serde_json::Value;
use tracing::debug;

use crate::api::types::ErrorReport;

/// Bodies larger than this are passed through untouched
const MAX_ERROR_BODY_BYTES: usize = 64 * 1024;

/// Append `error: {kind, detail}` to error envelopes
///
/// Only installed outside production.
pub async fn expose_error_details(request: Request, next: Next) -> Response {
    let response = next.run(request).await;

    let Some(report) = response.extensions().get::<ErrorReport>().cloned() else {
        return response;
    };

    let (mut parts, body) = response.into_parts();
    let bytes = match to_bytes(body, MAX_ERROR_BODY_BYTES).await {
        Ok(bytes) => bytes,
        Err(e) => {
            debug!(error = %e, "Error body not readable, sending it without details");
            return Response::from_parts(parts, Body::empty());
        }
    };

    let Ok(Value::Object(mut envelope)) = serde_json::from_slice::<Value>(&bytes) else {
        return Response::from_parts(parts, Body::from(bytes));
    };

    envelope.insert(
        "error".to_string(),
        serde_json::json!({"kind": report.kind, "detail": report.detail}),
    );

    let body = Value::Object(envelope).to_string();
    parts.headers.remove(header::CONTENT_LENGTH);
    Response::from_parts(parts, Body::from(body))
}
