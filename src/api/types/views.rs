//! Response views
//!
//! Stored entities carry fields that never leave the service (password and
//! reset hashes, applicant lists). Views render the public shape.

use chrono::{DateTime, Utc};
use serde::Serialize;
use serde_json::{json, Value};

use super::error::ApiError;
use crate::domain::job::Job;
use crate::domain::query::QueryPage;
use crate::domain::user::{Role, User};
use crate::infrastructure::job::JobDetails;
use crate::infrastructure::user::UserProfile;

const APPLICANTS_FIELD: &str = "applicantsApplied";

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct UserView {
    pub id: String,
    pub name: String,
    pub email: String,
    pub role: Role,
    pub created_at: DateTime<Utc>,
}

impl From<&User> for UserView {
    fn from(user: &User) -> Self {
        Self {
            id: user.id().to_string(),
            name: user.name().to_string(),
            email: user.email().to_string(),
            role: user.role(),
            created_at: user.created_at(),
        }
    }
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PublishedJobRef {
    pub id: String,
    pub title: String,
    pub posting_date: DateTime<Utc>,
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ProfileView {
    #[serde(flatten)]
    pub user: UserView,
    pub jobs_published: Vec<PublishedJobRef>,
}

impl From<&UserProfile> for ProfileView {
    fn from(profile: &UserProfile) -> Self {
        Self {
            user: UserView::from(&profile.user),
            jobs_published: profile
                .jobs_published
                .iter()
                .map(|job| PublishedJobRef {
                    id: job.id().to_string(),
                    title: job.title().to_string(),
                    posting_date: job.posting_date(),
                })
                .collect(),
        }
    }
}

fn to_value<T: Serialize>(value: &T) -> Result<Value, ApiError> {
    serde_json::to_value(value)
        .map_err(|e| ApiError::internal(format!("Failed to render response: {}", e)))
}

/// Job as shown publicly, without its applicants
pub fn job_view(job: &Job) -> Result<Value, ApiError> {
    let mut value = to_value(job)?;
    if let Some(object) = value.as_object_mut() {
        object.remove(APPLICANTS_FIELD);
    }
    Ok(value)
}

/// Job including `applicantsApplied`
pub fn job_with_applicants(job: &Job) -> Result<Value, ApiError> {
    to_value(job)
}

/// Job with its publisher populated as `{id, name}`
pub fn job_details_view(details: &JobDetails) -> Result<Value, ApiError> {
    let mut value = job_view(&details.job)?;

    if let (Some(name), Some(object)) = (&details.publisher_name, value.as_object_mut()) {
        object.insert(
            "user".to_string(),
            json!({"id": details.job.owner().as_str(), "name": name}),
        );
    }
    Ok(value)
}

pub fn job_views(jobs: &[Job]) -> Result<Vec<Value>, ApiError> {
    jobs.iter().map(job_view).collect()
}

/// Render every item of a page and apply its field projection
pub fn render_page<T, F>(page: &QueryPage<T>, render: F) -> Result<Vec<Value>, ApiError>
where
    F: Fn(&T) -> Result<Value, ApiError>,
{
    page.items
        .iter()
        .map(|item| render(item).map(|value| page.project(value)))
        .collect()
}

pub fn user_value(user: &User) -> Result<Value, ApiError> {
    to_value(&UserView::from(user))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::job::{fixtures, Application};
    use crate::domain::query::{DocumentQuery, Projection};
    use crate::domain::user::UserId;

    fn applied_job() -> Job {
        let mut job = fixtures::job("job-1", "emp-1", "Node Developer");
        job.add_application(Application {
            id: UserId::new("u-1").unwrap(),
            resume: "Ann_job-1.pdf".to_string(),
        });
        job
    }

    #[test]
    fn test_user_view_hides_secrets() {
        let mut user = User::new(
            UserId::new("u-1").unwrap(),
            "Ann",
            "ann@example.com",
            Role::User,
            "$argon2id$hash",
        );
        user.set_reset_token("hash", Utc::now());

        let value = user_value(&user).unwrap();
        let object = value.as_object().unwrap();

        assert_eq!(object["email"], "ann@example.com");
        assert_eq!(object["role"], "user");
        assert!(!object.contains_key("password"));
        assert!(!object.contains_key("resetPasswordToken"));
        assert!(!object.contains_key("resetPasswordExpire"));
    }

    #[test]
    fn test_job_view_hides_applicants() {
        let job = applied_job();

        assert!(job_view(&job).unwrap().get(APPLICANTS_FIELD).is_none());
        assert_eq!(
            job_with_applicants(&job).unwrap()[APPLICANTS_FIELD][0]["resume"],
            "Ann_job-1.pdf"
        );
    }

    #[test]
    fn test_details_populate_publisher() {
        let details = JobDetails {
            job: applied_job(),
            publisher_name: Some("Emma".to_string()),
        };

        let value = job_details_view(&details).unwrap();
        assert_eq!(value["user"], json!({"id": "emp-1", "name": "Emma"}));
    }

    #[test]
    fn test_render_page_applies_projection() {
        let query = DocumentQuery::new().select(Projection::new(vec!["title".to_string()]));
        let page = QueryPage::new(vec![applied_job()], &query);

        let rendered = render_page(&page, job_view).unwrap();
        let object = rendered[0].as_object().unwrap();

        assert_eq!(object["title"], "Node Developer");
        assert!(!object.contains_key("salary"));
    }
}
