//! Error normalizer: maps domain failures to the uniform error envelope

use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde::{Deserialize, Serialize};

use crate::domain::DomainError;

/// Body of every failed request
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ApiErrorResponse {
    pub success: bool,
    pub message: String,
}

/// Raw failure behind an error response
///
/// Attached to the response extensions so that a development-only layer can
/// expose it; never serialized by the error itself.
#[derive(Debug, Clone, Serialize)]
pub struct ErrorReport {
    pub kind: &'static str,
    pub detail: String,
}

/// API error with status code
#[derive(Debug)]
pub struct ApiError {
    pub status: StatusCode,
    pub response: ApiErrorResponse,
    pub report: Option<ErrorReport>,
}

impl ApiError {
    pub fn new(status: StatusCode, message: impl Into<String>) -> Self {
        Self {
            status,
            response: ApiErrorResponse {
                success: false,
                message: message.into(),
            },
            report: None,
        }
    }

    pub fn with_report(mut self, kind: &'static str, detail: impl Into<String>) -> Self {
        self.report = Some(ErrorReport {
            kind,
            detail: detail.into(),
        });
        self
    }

    pub fn message(&self) -> &str {
        &self.response.message
    }

    pub fn bad_request(message: impl Into<String>) -> Self {
        Self::new(StatusCode::BAD_REQUEST, message)
    }

    pub fn unauthorized(message: impl Into<String>) -> Self {
        Self::new(StatusCode::UNAUTHORIZED, message)
    }

    pub fn forbidden(message: impl Into<String>) -> Self {
        Self::new(StatusCode::FORBIDDEN, message)
    }

    pub fn not_found(message: impl Into<String>) -> Self {
        Self::new(StatusCode::NOT_FOUND, message)
    }

    pub fn internal(message: impl Into<String>) -> Self {
        Self::new(StatusCode::INTERNAL_SERVER_ERROR, message)
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let mut response = (self.status, Json(self.response)).into_response();
        if let Some(report) = self.report {
            response.extensions_mut().insert(report);
        }
        response
    }
}

impl From<DomainError> for ApiError {
    fn from(err: DomainError) -> Self {
        let detail = err.to_string();
        let kind = err.kind();

        let error = match err {
            DomainError::Validation { messages } => Self::bad_request(messages.join(", ")),
            DomainError::NotFound { message } => Self::not_found(message),
            DomainError::InvalidReference { field } => {
                Self::not_found(format!("Resource not found. Invalid: {}", field))
            }
            DomainError::DuplicateKey { field } => {
                Self::bad_request(format!("Duplicate {} entered", field))
            }
            DomainError::Unauthenticated { message } => Self::unauthorized(message),
            DomainError::Forbidden { message } => Self::forbidden(message),
            DomainError::InvalidOrExpiredToken => {
                Self::bad_request("Password Reset token is invalid.")
            }
            DomainError::EmailDeliveryFailed { .. } => Self::internal("Email is not sent"),
            DomainError::InvalidQuery { message } | DomainError::BadRequest { message } => {
                Self::bad_request(message)
            }
            DomainError::Provider { provider, message } => {
                Self::internal(format!("{}: {}", provider, message))
            }
            DomainError::Configuration { message }
            | DomainError::Storage { message }
            | DomainError::Internal { message } => Self::internal(message),
        };

        error.with_report(kind, detail)
    }
}

impl std::fmt::Display for ApiError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}: {}", self.status, self.response.message)
    }
}

impl std::error::Error for ApiError {}
