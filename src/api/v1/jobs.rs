//! Job endpoints: public browsing and search, publishing, applications

use axum::extract::{
    multipart::{Multipart, MultipartRejection},
    Path, State,
};
use serde_json::Value;
use tracing::debug;

use crate::api::middleware::{EmployerOrAdmin, RequireRole, UserOnly};
use crate::api::state::AppState;
use crate::api::types::{
    job_details_view, job_view, job_views, render_page, ApiError, Envelope, Json, ListParams,
};
use crate::domain::job::JobInput;
use crate::infrastructure::job::{ExperienceStats, ResumeUpload};

/// Multipart field holding the resume
pub const RESUME_FIELD: &str = "file";

/// GET /api/v1/jobs
pub async fn list_jobs(
    State(state): State<AppState>,
    ListParams(params): ListParams,
) -> Result<Json<Envelope<Vec<Value>>>, ApiError> {
    let page = state.jobs.list(params).await?;
    let data = render_page(&page, job_view)?;

    Ok(Json(Envelope::list(data.len(), data)))
}

/// GET /api/v1/job/{id}/{slug}
pub async fn get_job(
    State(state): State<AppState>,
    Path((id, slug)): Path<(String, String)>,
) -> Result<Json<Envelope<Value>>, ApiError> {
    let details = state.jobs.get(&id, &slug).await?;
    Ok(Json(Envelope::data(job_details_view(&details)?)))
}

/// GET /api/v1/jobs/{zipcode}/{distance}
pub async fn jobs_in_radius(
    State(state): State<AppState>,
    Path((zipcode, distance)): Path<(String, String)>,
) -> Result<Json<Envelope<Vec<Value>>>, ApiError> {
    let jobs = state.jobs.in_radius(&zipcode, &distance).await?;
    let data = job_views(&jobs)?;

    Ok(Json(Envelope::list(data.len(), data)))
}

/// GET /api/v1/stats/{topic}
pub async fn job_stats(
    State(state): State<AppState>,
    Path(topic): Path<String>,
) -> Result<Json<Envelope<Vec<ExperienceStats>>>, ApiError> {
    let stats = state.jobs.stats(&topic).await?;
    Ok(Json(Envelope::data(stats)))
}

/// POST /api/v1/jobs/new
pub async fn create_job(
    State(state): State<AppState>,
    caller: RequireRole<EmployerOrAdmin>,
    Json(input): Json<JobInput>,
) -> Result<Json<Envelope<Value>>, ApiError> {
    let job = state.jobs.create(&caller.user, input).await?;
    Ok(Json(Envelope::data(job_view(&job)?).with_message("Job Created.")))
}

/// PUT /api/v1/job/{id}
pub async fn update_job(
    State(state): State<AppState>,
    caller: RequireRole<EmployerOrAdmin>,
    Path(id): Path<String>,
    Json(input): Json<JobInput>,
) -> Result<Json<Envelope<Value>>, ApiError> {
    let job = state.jobs.update(&caller.user, &id, input).await?;
    Ok(Json(Envelope::data(job_view(&job)?).with_message("Job is updated.")))
}

/// DELETE /api/v1/job/{id}
pub async fn delete_job(
    State(state): State<AppState>,
    caller: RequireRole<EmployerOrAdmin>,
    Path(id): Path<String>,
) -> Result<Json<Envelope>, ApiError> {
    state.jobs.delete(&caller.user, &id).await?;
    Ok(Json(Envelope::message("Job is deleted.")))
}

/// PUT /api/v1/job/{id}/apply
///
/// A request that is not multipart counts as a missing file.
pub async fn apply_to_job(
    State(state): State<AppState>,
    caller: RequireRole<UserOnly>,
    Path(id): Path<String>,
    multipart: Result<Multipart, MultipartRejection>,
) -> Result<Json<Envelope<String>>, ApiError> {
    let upload = match multipart {
        Ok(multipart) => read_resume(multipart).await?,
        Err(rejection) => {
            debug!(reason = %rejection.body_text(), "Apply request without multipart body");
            None
        }
    };

    let file_name = state.jobs.apply(&caller.user, &id, upload).await?;
    Ok(Json(
        Envelope::data(file_name).with_message("Applied to Job successfully."),
    ))
}

async fn read_resume(mut multipart: Multipart) -> Result<Option<ResumeUpload>, ApiError> {
    while let Some(field) = multipart
        .next_field()
        .await
        .map_err(|e| ApiError::bad_request(e.body_text()))?
    {
        if field.name() != Some(RESUME_FIELD) {
            continue;
        }

        let file_name = field.file_name().unwrap_or_default().to_string();
        let contents = field
            .bytes()
            .await
            .map_err(|e| ApiError::bad_request(e.body_text()))?;

        return Ok(Some(ResumeUpload {
            file_name,
            contents,
        }));
    }

    Ok(None)
}
