//! Job input validation
//!
//! Request bodies arrive as loosely typed [`JobInput`]. Resolving an input
//! (optionally over an existing job's fields) yields typed [`JobFields`] or a
//! validation error carrying one message per bad field.

use chrono::{DateTime, Utc};
use serde::Deserialize;

use super::entity::{Education, Experience, Industry, JobFields, JobType};
use crate::domain::user::{is_valid_email, ValidationReport};
use crate::domain::DomainError;

pub const MAX_TITLE_LENGTH: usize = 100;
pub const MAX_DESCRIPTION_LENGTH: usize = 1000;

/// A single label or a list of labels
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(untagged)]
pub enum OneOrMany {
    One(String),
    Many(Vec<String>),
}

impl OneOrMany {
    fn into_vec(self) -> Vec<String> {
        match self {
            Self::One(value) => vec![value],
            Self::Many(values) => values,
        }
    }
}

/// Client-supplied job fields; everything optional until resolved
#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct JobInput {
    pub title: Option<String>,
    pub description: Option<String>,
    pub email: Option<String>,
    pub address: Option<String>,
    pub company: Option<String>,
    pub industry: Option<OneOrMany>,
    pub job_type: Option<String>,
    pub min_education: Option<String>,
    pub positions: Option<u32>,
    pub experience: Option<String>,
    pub salary: Option<f64>,
    pub last_date: Option<DateTime<Utc>>,
}

fn non_blank(value: Option<String>) -> Option<String> {
    value.filter(|v| !v.trim().is_empty())
}

fn labelled<T>(
    report: &mut ValidationReport,
    raw: Option<String>,
    current: Option<T>,
    parse: fn(&str) -> Option<T>,
    missing: &str,
    invalid: &str,
) -> Option<T> {
    match non_blank(raw) {
        Some(label) => {
            let parsed = parse(label.trim());
            if parsed.is_none() {
                report.push(invalid);
            }
            parsed
        }
        None => {
            if current.is_none() {
                report.push(missing);
            }
            current
        }
    }
}

impl JobInput {
    /// Merge over `base` (if any) and validate
    pub fn resolve(self, base: Option<JobFields>) -> Result<JobFields, DomainError> {
        let mut report = ValidationReport::new();
        let base = base.as_ref();

        let title = match non_blank(self.title).map(|t| t.trim().to_string()) {
            Some(title) if title.chars().count() > MAX_TITLE_LENGTH => {
                report.push(format!(
                    "job title cannot exceed {} characters",
                    MAX_TITLE_LENGTH
                ));
                None
            }
            Some(title) => Some(title),
            None => base.map(|b| b.title.clone()).or_else(|| {
                report.push("please enter Job title");
                None
            }),
        };

        let description = match non_blank(self.description) {
            Some(description) if description.chars().count() > MAX_DESCRIPTION_LENGTH => {
                report.push(format!(
                    "job description can not exceed {} characters",
                    MAX_DESCRIPTION_LENGTH
                ));
                None
            }
            Some(description) => Some(description),
            None => base.map(|b| b.description.clone()).or_else(|| {
                report.push("please enter the job description");
                None
            }),
        };

        let email = match non_blank(self.email) {
            Some(email) if !is_valid_email(email.trim()) => {
                report.push("please add a valid email address");
                None
            }
            Some(email) => Some(email.trim().to_string()),
            None => base.and_then(|b| b.email.clone()),
        };

        let address = non_blank(self.address)
            .or_else(|| base.map(|b| b.address.clone()))
            .or_else(|| {
                report.push("please add an address");
                None
            });

        let company = non_blank(self.company)
            .or_else(|| base.map(|b| b.company.clone()))
            .or_else(|| {
                report.push("please add the company name");
                None
            });

        let industry = match self.industry.map(OneOrMany::into_vec) {
            Some(labels) if !labels.is_empty() => {
                let parsed: Option<Vec<Industry>> =
                    labels.iter().map(|l| Industry::parse(l.trim())).collect();
                if parsed.is_none() {
                    report.push("please select the correct options for industry");
                }
                parsed
            }
            _ => base.map(|b| b.industry.clone()).or_else(|| {
                report.push("please enter industry for this job");
                None
            }),
        };

        let job_type = labelled(
            &mut report,
            self.job_type,
            base.map(|b| b.job_type),
            JobType::parse,
            "please enter job type.",
            "please select correct option for the job type",
        );

        let min_education = labelled(
            &mut report,
            self.min_education,
            base.map(|b| b.min_education),
            Education::parse,
            "please enter the minimum education for this job",
            "please select correct options for minEducation",
        );

        let experience = labelled(
            &mut report,
            self.experience,
            base.map(|b| b.experience),
            Experience::parse,
            "please enter the experience section required",
            "please select correct options for experience",
        );

        let salary = match self.salary {
            Some(salary) if !salary.is_finite() || salary < 0.0 => {
                report.push("please enter a valid salary for this job");
                None
            }
            Some(salary) => Some(salary),
            None => base.map(|b| b.salary).or_else(|| {
                report.push("please enter the expected salary for this job");
                None
            }),
        };

        let positions = self
            .positions
            .or_else(|| base.map(|b| b.positions))
            .unwrap_or(1);

        let last_date = self.last_date.or_else(|| base.and_then(|b| b.last_date));
        let posting_date = base.and_then(|b| b.posting_date);

        report.into_result()?;

        match (
            title,
            description,
            address,
            company,
            industry,
            job_type,
            min_education,
            experience,
            salary,
        ) {
            (
                Some(title),
                Some(description),
                Some(address),
                Some(company),
                Some(industry),
                Some(job_type),
                Some(min_education),
                Some(experience),
                Some(salary),
            ) => Ok(JobFields {
                title,
                description,
                email,
                address,
                company,
                industry,
                job_type,
                min_education,
                positions,
                experience,
                salary,
                posting_date,
                last_date,
            }),
            _ => Err(DomainError::internal("Job validation left a field unresolved")),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::job::entity::fixtures;

    fn complete() -> JobInput {
        JobInput {
            title: Some("  Rust Developer ".to_string()),
            description: Some("Write services".to_string()),
            email: Some("jobs@acme.io".to_string()),
            address: Some("1 Main St, Boston".to_string()),
            company: Some("Acme".to_string()),
            industry: Some(OneOrMany::Many(vec![
                "Banking".to_string(),
                "Others".to_string(),
            ])),
            job_type: Some("Permanent".to_string()),
            min_education: Some("Masters".to_string()),
            positions: None,
            experience: Some("2 Years - 5 Years".to_string()),
            salary: Some(120000.0),
            last_date: None,
        }
    }

    fn messages(result: Result<JobFields, DomainError>) -> Vec<String> {
        match result {
            Err(DomainError::Validation { messages }) => messages,
            other => panic!("expected validation error, got {:?}", other),
        }
    }

    #[test]
    fn test_complete_input_resolves() {
        let fields = complete().resolve(None).unwrap();

        assert_eq!(fields.title, "Rust Developer");
        assert_eq!(fields.industry, vec![Industry::Banking, Industry::Others]);
        assert_eq!(fields.experience, Experience::TwoToFiveYears);
        assert_eq!(fields.positions, 1);
        assert!(fields.last_date.is_none());
    }

    #[test]
    fn test_missing_fields_each_get_a_message() {
        let messages = messages(JobInput::default().resolve(None));

        assert!(messages.contains(&"please enter Job title".to_string()));
        assert!(messages.contains(&"please add an address".to_string()));
        assert!(messages.contains(&"please enter job type.".to_string()));
        assert!(messages.contains(&"please enter the expected salary for this job".to_string()));
        assert_eq!(messages.len(), 9);
    }

    #[test]
    fn test_unknown_enum_label_names_the_field() {
        let mut input = complete();
        input.job_type = Some("Contract".to_string());
        input.industry = Some(OneOrMany::One("Farming".to_string()));

        let messages = messages(input.resolve(None));
        assert_eq!(
            messages,
            vec![
                "please select the correct options for industry".to_string(),
                "please select correct option for the job type".to_string(),
            ]
        );
    }

    #[test]
    fn test_length_and_email_limits() {
        let mut input = complete();
        input.title = Some("x".repeat(MAX_TITLE_LENGTH + 1));
        input.email = Some("not-an-email".to_string());

        let messages = messages(input.resolve(None));
        assert_eq!(
            messages,
            vec![
                "job title cannot exceed 100 characters".to_string(),
                "please add a valid email address".to_string(),
            ]
        );
    }

    #[test]
    fn test_partial_update_keeps_existing_fields() {
        let base = fixtures::fields("Old Title");
        let input = JobInput {
            title: Some("New Title".to_string()),
            salary: Some(99.0),
            ..Default::default()
        };

        let fields = input.resolve(Some(base.clone())).unwrap();
        assert_eq!(fields.title, "New Title");
        assert_eq!(fields.salary, 99.0);
        assert_eq!(fields.company, base.company);
        assert_eq!(fields.job_type, base.job_type);
    }
}
