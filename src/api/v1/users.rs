//! Account endpoints for the signed-in user, plus admin user management

use axum::{
    extract::{Path, State},
    http::header,
    response::{AppendHeaders, IntoResponse, Response},
};
use serde::Deserialize;
use serde_json::Value;

use crate::api::auth::{expired_session_cookie, send_token};
use crate::api::middleware::{AdminOnly, EmployerOrAdmin, RequireRole, RequireUser, UserOnly};
use crate::api::state::AppState;
use crate::api::types::{
    job_views, job_with_applicants, render_page, user_value, ApiError, Envelope, Json,
    ListParams, ProfileView, UserView,
};
use crate::infrastructure::user::UpdateProfileRequest;

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UpdatePasswordBody {
    pub current_password: Option<String>,
    pub new_password: Option<String>,
}

#[derive(Debug, Default, Deserialize)]
pub struct UpdateProfileBody {
    pub name: Option<String>,
    pub email: Option<String>,
}

/// GET /api/v1/me
pub async fn get_profile(
    State(state): State<AppState>,
    RequireUser(user): RequireUser,
) -> Result<Json<Envelope<ProfileView>>, ApiError> {
    let profile = state.users.profile(user.id()).await?;
    Ok(Json(Envelope::data(ProfileView::from(&profile))))
}

/// PUT /api/v1/password/update
pub async fn update_password(
    State(state): State<AppState>,
    RequireUser(user): RequireUser,
    Json(body): Json<UpdatePasswordBody>,
) -> Result<Response, ApiError> {
    let session = state
        .users
        .update_password(
            user.id(),
            body.current_password.as_deref().unwrap_or_default(),
            body.new_password.as_deref().unwrap_or_default(),
        )
        .await?;

    Ok(send_token(session, &state.cookies))
}

/// PUT /api/v1/me/update
pub async fn update_profile(
    State(state): State<AppState>,
    RequireUser(user): RequireUser,
    Json(body): Json<UpdateProfileBody>,
) -> Result<Json<Envelope<UserView>>, ApiError> {
    let request = UpdateProfileRequest {
        name: body.name,
        email: body.email,
    };
    let updated = state.users.update_profile(user.id(), request).await?;

    Ok(Json(Envelope::data(UserView::from(&updated))))
}

/// DELETE /api/v1/me/delete
pub async fn delete_account(
    State(state): State<AppState>,
    RequireUser(user): RequireUser,
) -> Result<impl IntoResponse, ApiError> {
    state.users.delete_account(&user).await?;

    Ok((
        AppendHeaders([(header::SET_COOKIE, expired_session_cookie())]),
        Json(Envelope::message("Account deleted successfully")),
    ))
}

/// GET /api/v1/jobs/applied
pub async fn applied_jobs(
    State(state): State<AppState>,
    caller: RequireRole<UserOnly>,
) -> Result<Json<Envelope<Vec<Value>>>, ApiError> {
    let jobs = state.users.applied_jobs(caller.user.id()).await?;
    let data = jobs
        .iter()
        .map(job_with_applicants)
        .collect::<Result<Vec<_>, _>>()?;

    Ok(Json(Envelope::list(data.len(), data)))
}

/// GET /api/v1/jobs/published
pub async fn published_jobs(
    State(state): State<AppState>,
    caller: RequireRole<EmployerOrAdmin>,
) -> Result<Json<Envelope<Vec<Value>>>, ApiError> {
    let jobs = state.users.published_jobs(caller.user.id()).await?;
    let data = job_views(&jobs)?;

    Ok(Json(Envelope::list(data.len(), data)))
}

/// GET /api/v1/users
pub async fn list_users(
    State(state): State<AppState>,
    _admin: RequireRole<AdminOnly>,
    ListParams(params): ListParams,
) -> Result<Json<Envelope<Vec<Value>>>, ApiError> {
    let page = state.users.list(params).await?;
    let data = render_page(&page, user_value)?;

    Ok(Json(Envelope::list(data.len(), data)))
}

/// DELETE /api/v1/user/{id}
pub async fn delete_user(
    State(state): State<AppState>,
    _admin: RequireRole<AdminOnly>,
    Path(id): Path<String>,
) -> Result<Json<Envelope>, ApiError> {
    state.users.delete_user(&id).await?;
    Ok(Json(Envelope::message("user deleted by admin")))
}
