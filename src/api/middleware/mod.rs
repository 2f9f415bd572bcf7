//! API middleware and request extractors

pub mod error_details;
pub mod logging;
pub mod user_auth;

pub use error_details::expose_error_details;
pub use logging::logging_middleware;
pub use user_auth::{
    extract_session_token, AdminOnly, EmployerOrAdmin, RequireRole, RequireUser, RoleSet,
    UserOnly, SESSION_COOKIE,
};
