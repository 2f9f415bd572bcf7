//! Versioned job board API under `/api/v1`

pub mod jobs;
pub mod users;

use axum::{
    extract::DefaultBodyLimit,
    routing::{delete, get, post, put},
    Router,
};

use super::auth;
use super::state::AppState;

/// Room for multipart boundaries and headers around the resume itself
const MULTIPART_OVERHEAD_BYTES: usize = 64 * 1024;

/// Create the v1 router
///
/// `max_upload_bytes` raises the body limit of the apply route so that
/// oversized resumes reach the size check instead of being cut off.
pub fn create_v1_router(max_upload_bytes: usize) -> Router<AppState> {
    Router::new()
        .merge(auth::create_auth_router())
        .route("/jobs", get(jobs::list_jobs))
        .route("/jobs/new", post(jobs::create_job))
        .route("/job/{id}/{slug}", get(jobs::get_job))
        .route("/jobs/{zipcode}/{distance}", get(jobs::jobs_in_radius))
        .route("/stats/{topic}", get(jobs::job_stats))
        .route("/job/{id}", put(jobs::update_job).delete(jobs::delete_job))
        .route(
            "/job/{id}/apply",
            put(jobs::apply_to_job).layer(DefaultBodyLimit::max(
                max_upload_bytes.saturating_mul(2) + MULTIPART_OVERHEAD_BYTES,
            )),
        )
        .route("/me", get(users::get_profile))
        .route("/me/update", put(users::update_profile))
        .route("/me/delete", delete(users::delete_account))
        .route("/password/update", put(users::update_password))
        .route("/jobs/applied", get(users::applied_jobs))
        .route("/jobs/published", get(users::published_jobs))
        .route("/users", get(users::list_users))
        .route("/user/{id}", delete(users::delete_user))
}
