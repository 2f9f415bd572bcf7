//! Job entity and its closed value sets

use chrono::{DateTime, Duration, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::domain::storage::{StorageEntity, StorageKey};
use crate::domain::user::UserId;
use crate::domain::DomainError;

/// Days a posting stays open when no closing date is given
pub const DEFAULT_OPEN_DAYS: i64 = 7;

/// Job identifier (UUID string)
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct JobId(String);

impl JobId {
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    pub fn generate() -> Self {
        Self(Uuid::new_v4().to_string())
    }

    /// Parse an id received from a client
    pub fn parse(id: &str) -> Result<Self, DomainError> {
        Uuid::parse_str(id)
            .map(|_| Self(id.to_string()))
            .map_err(|_| DomainError::invalid_reference("id"))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl std::fmt::Display for JobId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl StorageKey for JobId {
    fn as_str(&self) -> &str {
        &self.0
    }
}

/// Defines an enum whose serialized form is a fixed display label
macro_rules! labelled_enum {
    ($(#[$meta:meta])* $name:ident { $($variant:ident => $label:literal),+ $(,)? }) => {
        $(#[$meta])*
        #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
        pub enum $name {
            $(#[serde(rename = $label)] $variant),+
        }

        impl $name {
            pub const ALL: &'static [$name] = &[$($name::$variant),+];

            pub fn label(&self) -> &'static str {
                match self {
                    $($name::$variant => $label),+
                }
            }

            pub fn parse(label: &str) -> Option<Self> {
                match label {
                    $($label => Some($name::$variant),)+
                    _ => None,
                }
            }
        }

        impl std::fmt::Display for $name {
            fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
                f.write_str(self.label())
            }
        }
    };
}

labelled_enum!(Industry {
    Business => "Business",
    InformationTechnology => "Information technology",
    Banking => "Banking",
    EducationTraining => "Education/Training",
    Telecommunication => "Telecommunication",
    Others => "Others",
});

labelled_enum!(JobType {
    Permanent => "Permanent",
    Temporary => "Temporary",
    Internship => "Internship",
});

labelled_enum!(Education {
    Bachelors => "Bachelors",
    Masters => "Masters",
    Phd => "Phd",
});

labelled_enum!(Experience {
    NoExperience => "No experience",
    OneToTwoYears => "1 Year - 2 Years",
    TwoToFiveYears => "2 Years - 5 Years",
    FivePlusYears => "5 Years+",
});

/// Geocoded GeoJSON point with address details
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Location {
    #[serde(rename = "type")]
    pub kind: String,
    /// `[longitude, latitude]`
    pub coordinates: [f64; 2],
    pub formatted_address: String,
    pub city: Option<String>,
    pub state: Option<String>,
    pub zipcode: Option<String>,
    pub country: Option<String>,
}

impl Location {
    pub fn longitude(&self) -> f64 {
        self.coordinates[0]
    }

    pub fn latitude(&self) -> f64 {
        self.coordinates[1]
    }
}

/// An applicant and their stored resume file name
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Application {
    pub id: UserId,
    pub resume: String,
}

/// Validated, client-controlled job fields
#[derive(Debug, Clone, PartialEq)]
pub struct JobFields {
    pub title: String,
    pub description: String,
    pub email: Option<String>,
    pub address: String,
    pub company: String,
    pub industry: Vec<Industry>,
    pub job_type: JobType,
    pub min_education: Education,
    pub positions: u32,
    pub experience: Experience,
    pub salary: f64,
    pub posting_date: Option<DateTime<Utc>>,
    pub last_date: Option<DateTime<Utc>>,
}

/// Job posting in its stored form
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Job {
    id: JobId,
    user: UserId,
    title: String,
    slug: String,
    description: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    email: Option<String>,
    address: String,
    location: Location,
    company: String,
    industry: Vec<Industry>,
    job_type: JobType,
    min_education: Education,
    positions: u32,
    experience: Experience,
    salary: f64,
    posting_date: DateTime<Utc>,
    last_date: DateTime<Utc>,
    #[serde(default)]
    applicants_applied: Vec<Application>,
}

impl Job {
    /// Build a job from validated fields and the derived slug and location
    pub fn new(
        id: JobId,
        owner: UserId,
        fields: JobFields,
        slug: String,
        location: Location,
    ) -> Self {
        let now = Utc::now();
        let posting_date = fields.posting_date.unwrap_or(now);
        let last_date = fields
            .last_date
            .unwrap_or_else(|| now + Duration::days(DEFAULT_OPEN_DAYS));

        Self {
            id,
            user: owner,
            title: fields.title,
            slug,
            description: fields.description,
            email: fields.email,
            address: fields.address,
            location,
            company: fields.company,
            industry: fields.industry,
            job_type: fields.job_type,
            min_education: fields.min_education,
            positions: fields.positions,
            experience: fields.experience,
            salary: fields.salary,
            posting_date,
            last_date,
            applicants_applied: Vec::new(),
        }
    }

    pub fn id(&self) -> &JobId {
        &self.id
    }

    pub fn owner(&self) -> &UserId {
        &self.user
    }

    pub fn title(&self) -> &str {
        &self.title
    }

    pub fn slug(&self) -> &str {
        &self.slug
    }

    pub fn description(&self) -> &str {
        &self.description
    }

    pub fn email(&self) -> Option<&str> {
        self.email.as_deref()
    }

    pub fn address(&self) -> &str {
        &self.address
    }

    pub fn location(&self) -> &Location {
        &self.location
    }

    pub fn company(&self) -> &str {
        &self.company
    }

    pub fn industry(&self) -> &[Industry] {
        &self.industry
    }

    pub fn job_type(&self) -> JobType {
        self.job_type
    }

    pub fn min_education(&self) -> Education {
        self.min_education
    }

    pub fn positions(&self) -> u32 {
        self.positions
    }

    pub fn experience(&self) -> Experience {
        self.experience
    }

    pub fn salary(&self) -> f64 {
        self.salary
    }

    pub fn posting_date(&self) -> DateTime<Utc> {
        self.posting_date
    }

    pub fn last_date(&self) -> DateTime<Utc> {
        self.last_date
    }

    pub fn applicants(&self) -> &[Application] {
        &self.applicants_applied
    }

    /// Current client-controlled fields, the starting point for updates
    pub fn fields(&self) -> JobFields {
        JobFields {
            title: self.title.clone(),
            description: self.description.clone(),
            email: self.email.clone(),
            address: self.address.clone(),
            company: self.company.clone(),
            industry: self.industry.clone(),
            job_type: self.job_type,
            min_education: self.min_education,
            positions: self.positions,
            experience: self.experience,
            salary: self.salary,
            posting_date: Some(self.posting_date),
            last_date: Some(self.last_date),
        }
    }

    /// Replace the client-controlled fields and the derived slug and location
    pub fn apply_fields(&mut self, fields: JobFields, slug: String, location: Location) {
        self.title = fields.title;
        self.description = fields.description;
        self.email = fields.email;
        self.address = fields.address;
        self.company = fields.company;
        self.industry = fields.industry;
        self.job_type = fields.job_type;
        self.min_education = fields.min_education;
        self.positions = fields.positions;
        self.experience = fields.experience;
        self.salary = fields.salary;
        if let Some(posting_date) = fields.posting_date {
            self.posting_date = posting_date;
        }
        if let Some(last_date) = fields.last_date {
            self.last_date = last_date;
        }
        self.slug = slug;
        self.location = location;
    }

    pub fn is_closed(&self, now: DateTime<Utc>) -> bool {
        self.last_date < now
    }

    pub fn has_applicant(&self, user: &UserId) -> bool {
        self.applicants_applied.iter().any(|a| &a.id == user)
    }

    pub fn add_application(&mut self, application: Application) {
        self.applicants_applied.push(application);
    }

    /// Remove the user's application, returning it if present
    pub fn remove_application(&mut self, user: &UserId) -> Option<Application> {
        let index = self.applicants_applied.iter().position(|a| &a.id == user)?;
        Some(self.applicants_applied.remove(index))
    }
}

impl StorageEntity for Job {
    type Key = JobId;

    fn key(&self) -> &Self::Key {
        &self.id
    }
}


#[cfg(test)]
mod tests {
    use super::fixtures::*;
    use super::*;

    #[test]
    fn test_labels_round_trip() {
        for industry in Industry::ALL {
            assert_eq!(Industry::parse(industry.label()), Some(*industry));
        }
        assert_eq!(Experience::parse("5 Years+"), Some(Experience::FivePlusYears));
        assert_eq!(JobType::parse("Contract"), None);
    }

    #[test]
    fn test_stored_form() {
        let job = job("job-1", "owner-1", "Rust Developer");
        let json = serde_json::to_value(&job).unwrap();

        assert_eq!(json["industry"], serde_json::json!(["Information technology"]));
        assert_eq!(json["jobType"], "Permanent");
        assert_eq!(json["location"]["type"], "Point");
        assert_eq!(json["user"], "owner-1");
        assert!(json.get("email").is_none());
    }

    #[test]
    fn test_default_dates() {
        let job = job("job-1", "owner-1", "Rust Developer");
        assert_eq!(
            (job.last_date() - job.posting_date()).num_days(),
            DEFAULT_OPEN_DAYS
        );
        assert!(!job.is_closed(Utc::now()));
    }

    #[test]
    fn test_applications() {
        let mut job = job("job-1", "owner-1", "Rust Developer");
        let applicant = UserId::new("user-1").unwrap();

        job.add_application(Application {
            id: applicant.clone(),
            resume: "ada_job-1.pdf".to_string(),
        });
        assert!(job.has_applicant(&applicant));

        let removed = job.remove_application(&applicant).unwrap();
        assert_eq!(removed.resume, "ada_job-1.pdf");
        assert!(!job.has_applicant(&applicant));
        assert!(job.remove_application(&applicant).is_none());
    }
}
