//! Authentication endpoints: registration, login, logout and password recovery
//!
//! Successful sign-ins answer `{success, token}` and set the http-only
//! `token` cookie.

use axum::{
    extract::{Path, State},
    http::{header, HeaderMap, StatusCode},
    response::{AppendHeaders, IntoResponse, Response},
    routing::{get, post, put},
    Router,
};
use serde::Deserialize;
use tracing::info;

use crate::api::middleware::{RequireUser, SESSION_COOKIE};
use crate::api::state::{AppState, CookieSettings};
use crate::api::types::{ApiError, Envelope, Json};
use crate::infrastructure::user::{AuthSession, RegisterRequest};

const SECONDS_PER_DAY: i64 = 24 * 60 * 60;

pub fn create_auth_router() -> Router<AppState> {
    Router::new()
        .route("/register", post(register))
        .route("/login", post(login))
        .route("/logout", get(logout))
        .route("/password/forgot", post(forgot_password))
        .route("/password/reset/{token}", put(reset_password))
}

/// `Set-Cookie` value carrying a session token
pub fn session_cookie(token: &str, settings: &CookieSettings) -> String {
    let mut cookie = format!(
        "{}={}; Path=/; Max-Age={}; HttpOnly",
        SESSION_COOKIE,
        token,
        settings.expires_days * SECONDS_PER_DAY
    );
    if settings.secure {
        cookie.push_str("; Secure");
    }
    cookie
}

/// `Set-Cookie` value that expires the session cookie immediately
pub fn expired_session_cookie() -> String {
    format!("{}=none; Path=/; Max-Age=0; HttpOnly", SESSION_COOKIE)
}

/// Answer a successful sign-in with the token in the body and a cookie
pub fn send_token(session: AuthSession, settings: &CookieSettings) -> Response {
    let cookie = session_cookie(&session.token, settings);

    (
        StatusCode::OK,
        AppendHeaders([(header::SET_COOKIE, cookie)]),
        Json(Envelope::token(session.token)),
    )
        .into_response()
}

/// Base of the reset link
///
/// The configured public URL wins; otherwise the scheme and host the client used.
fn reset_url_base(public_url: Option<&str>, headers: &HeaderMap) -> String {
    if let Some(base) = public_url {
        return format!("{}/api/v1/password/reset", base);
    }

    let protocol = headers
        .get("x-forwarded-proto")
        .and_then(|v| v.to_str().ok())
        .unwrap_or("http");
    let host = headers
        .get(header::HOST)
        .and_then(|v| v.to_str().ok())
        .unwrap_or("localhost");

    format!("{}://{}/api/v1/password/reset", protocol, host)
}

#[derive(Debug, Default, Deserialize)]
pub struct RegisterBody {
    pub name: Option<String>,
    pub email: Option<String>,
    pub password: Option<String>,
    pub role: Option<String>,
}

impl From<RegisterBody> for RegisterRequest {
    fn from(body: RegisterBody) -> Self {
        Self {
            name: body.name.unwrap_or_default(),
            email: body.email.unwrap_or_default(),
            password: body.password.unwrap_or_default(),
            role: body.role,
        }
    }
}

#[derive(Debug, Default, Deserialize)]
pub struct LoginBody {
    pub email: Option<String>,
    pub password: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct ForgotPasswordBody {
    pub email: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct ResetPasswordBody {
    pub password: Option<String>,
}

/// POST /api/v1/register
pub async fn register(
    State(state): State<AppState>,
    Json(body): Json<RegisterBody>,
) -> Result<Response, ApiError> {
    let session = state.users.register(body.into()).await?;
    Ok(send_token(session, &state.cookies))
}

/// POST /api/v1/login
pub async fn login(
    State(state): State<AppState>,
    Json(body): Json<LoginBody>,
) -> Result<Response, ApiError> {
    let session = state
        .users
        .login(body.email.as_deref(), body.password.as_deref())
        .await?;
    Ok(send_token(session, &state.cookies))
}

/// GET /api/v1/logout
pub async fn logout(RequireUser(user): RequireUser) -> impl IntoResponse {
    info!(user_id = %user.id(), "User logged out");

    (
        AppendHeaders([(header::SET_COOKIE, expired_session_cookie())]),
        Json(Envelope::message("Logged out successfully")),
    )
}

/// POST /api/v1/password/forgot
pub async fn forgot_password(
    State(state): State<AppState>,
    headers: HeaderMap,
    Json(body): Json<ForgotPasswordBody>,
) -> Result<Json<Envelope>, ApiError> {
    let email = body.email.unwrap_or_default();
    let sent_to = state
        .users
        .forgot_password(&email, &reset_url_base(state.public_url.as_deref(), &headers))
        .await?;

    Ok(Json(Envelope::message(format!("Email sent to: {}", sent_to))))
}

/// PUT /api/v1/password/reset/{token}
pub async fn reset_password(
    State(state): State<AppState>,
    Path(token): Path<String>,
    Json(body): Json<ResetPasswordBody>,
) -> Result<Response, ApiError> {
    let session = state
        .users
        .reset_password(&token, body.password.as_deref().unwrap_or_default())
        .await?;
    Ok(send_token(session, &state.cookies))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_session_cookie_attributes() {
        let dev = session_cookie("abc", &CookieSettings::new(7, false));
        assert_eq!(dev, "token=abc; Path=/; Max-Age=604800; HttpOnly");

        let prod = session_cookie("abc", &CookieSettings::new(1, true));
        assert!(prod.ends_with("HttpOnly; Secure"));
        assert!(prod.contains("Max-Age=86400"));
    }

    #[test]
    fn test_expired_cookie() {
        assert_eq!(
            expired_session_cookie(),
            "token=none; Path=/; Max-Age=0; HttpOnly"
        );
    }

    #[test]
    fn test_reset_url_base_uses_client_host() {
        let mut headers = HeaderMap::new();
        headers.insert(header::HOST, "jobs.example.com".parse().unwrap());
        assert_eq!(
            reset_url_base(None, &headers),
            "http://jobs.example.com/api/v1/password/reset"
        );

        headers.insert("x-forwarded-proto", "https".parse().unwrap());
        assert_eq!(
            reset_url_base(None, &headers),
            "https://jobs.example.com/api/v1/password/reset"
        );
    }

    #[test]
    fn test_reset_url_base_prefers_public_url() {
        let mut headers = HeaderMap::new();
        headers.insert(header::HOST, "attacker.example".parse().unwrap());
        headers.insert("x-forwarded-proto", "http".parse().unwrap());

        assert_eq!(
            reset_url_base(Some("https://jobee.example"), &headers),
            "https://jobee.example/api/v1/password/reset"
        );
    }
}
