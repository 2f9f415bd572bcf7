//! Request and response types shared by the HTTP handlers

pub mod envelope;
pub mod error;
pub mod json;
pub mod query;
pub mod views;

pub use envelope::Envelope;
pub use error::{ApiError, ApiErrorResponse, ErrorReport};
pub use json::Json;
pub use query::ListParams;
pub use views::{
    job_details_view, job_view, job_views, job_with_applicants, render_page, user_value,
    ProfileView, UserView,
};
