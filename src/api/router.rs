//! Application router: health probes, the `/api/v1` surface and uploaded files

use std::path::PathBuf;

use axum::{extract::OriginalUri, middleware, routing::get, Router};
use tower_http::{cors::CorsLayer, services::ServeDir, trace::TraceLayer};

use super::health;
use super::middleware::{expose_error_details, logging_middleware};
use super::state::AppState;
use super::types::ApiError;
use super::v1;
use crate::config::AppConfig;

/// Router settings that do not belong in the per-request state
#[derive(Debug, Clone)]
pub struct RouterOptions {
    /// Directory served under `/uploads`
    pub uploads_dir: PathBuf,
    pub max_upload_bytes: usize,
    /// Append the raw error to error envelopes (never in production)
    pub expose_error_details: bool,
}

impl RouterOptions {
    pub fn from_config(config: &AppConfig) -> Self {
        Self {
            uploads_dir: PathBuf::from(&config.uploads.dir),
            max_upload_bytes: usize::try_from(config.uploads.max_resume_bytes)
                .unwrap_or(usize::MAX),
            expose_error_details: !config.environment.is_production(),
        }
    }
}

/// Create the full router with application state
pub fn create_router(state: AppState, options: RouterOptions) -> Router {
    let mut router = Router::new()
        .route("/health", get(health::health_check))
        .route("/live", get(health::live_check))
        .nest("/api/v1", v1::create_v1_router(options.max_upload_bytes))
        .nest_service("/uploads", ServeDir::new(&options.uploads_dir))
        .fallback(route_not_found)
        .with_state(state);

    if options.expose_error_details {
        router = router.layer(middleware::from_fn(expose_error_details));
    }

    router
        .layer(middleware::from_fn(logging_middleware))
        .layer(CorsLayer::permissive())
        .layer(TraceLayer::new_for_http())
}

async fn route_not_found(OriginalUri(uri): OriginalUri) -> ApiError {
    let target = uri
        .path_and_query()
        .map(|pq| pq.as_str())
        .unwrap_or_else(|| uri.path());

    ApiError::not_found(format!("{} route not found", target))
}
