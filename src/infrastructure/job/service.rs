//! Job service: listing, geo search, statistics, publishing and applications

use std::collections::BTreeMap;
use std::path::Path;
use std::sync::Arc;

use bytes::Bytes;
use chrono::Utc;
use serde::Serialize;
use tracing::{info, warn};

use crate::domain::files::FileStorage;
use crate::domain::geocoding::{GeocodedAddress, Geocoder};
use crate::domain::job::{
    derive_job_fields, Application, Experience, Job, JobId, JobInput, JobRepository,
};
use crate::domain::query::{
    translate, DocumentQuery, FilterCondition, GeoCircle, QueryPage, QueryParams,
};
use crate::domain::user::{Role, User, UserRepository};
use crate::domain::DomainError;

pub const ALLOWED_RESUME_EXTENSIONS: [&str; 3] = [".pdf", ".doc", ".docx"];

const JOB_NOT_FOUND: &str = "Job not found";

/// An uploaded resume as received from the client
#[derive(Debug, Clone)]
pub struct ResumeUpload {
    pub file_name: String,
    pub contents: Bytes,
}

impl ResumeUpload {
    /// Lowercased extension including the dot, empty when there is none
    pub fn extension(&self) -> String {
        Path::new(&self.file_name)
            .extension()
            .and_then(|ext| ext.to_str())
            .map(|ext| format!(".{}", ext.to_lowercase()))
            .unwrap_or_default()
    }
}

/// A job with its publisher's name
#[derive(Debug, Clone)]
pub struct JobDetails {
    pub job: Job,
    pub publisher_name: Option<String>,
}

/// Salary and position statistics for one experience level
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ExperienceStats {
    #[serde(rename = "_id")]
    pub experience: String,
    pub total_jobs: usize,
    pub avg_position: f64,
    pub avg_salary: f64,
    pub min_salary: f64,
    pub max_salary: f64,
}

impl ExperienceStats {
    fn from_jobs(experience: Experience, jobs: &[&Job]) -> Self {
        let total = jobs.len() as f64;
        let salaries = jobs.iter().map(|job| job.salary());

        Self {
            experience: experience.label().to_uppercase(),
            total_jobs: jobs.len(),
            avg_position: jobs.iter().map(|job| f64::from(job.positions())).sum::<f64>() / total,
            avg_salary: salaries.clone().sum::<f64>() / total,
            min_salary: salaries.clone().fold(f64::INFINITY, f64::min),
            max_salary: salaries.fold(f64::NEG_INFINITY, f64::max),
        }
    }
}

fn can_manage(caller: &User, job: &Job) -> bool {
    job.owner() == caller.id() || caller.role() == Role::Admin
}

/// `name_with_underscores_{job id}{ext}`
///
/// Words keep only `[A-Za-z0-9_-]` so the result is always a flat file name.
fn resume_file_name(applicant: &User, job: &Job, extension: &str) -> String {
    let name = applicant
        .name()
        .split_whitespace()
        .map(|word| {
            word.chars()
                .filter(|c| c.is_ascii_alphanumeric() || *c == '_' || *c == '-')
                .collect::<String>()
        })
        .filter(|word| !word.is_empty())
        .collect::<Vec<_>>()
        .join("_");

    format!("{}_{}{}", name, job.id(), extension)
}

#[derive(Debug)]
pub struct JobService {
    jobs: Arc<dyn JobRepository>,
    users: Arc<dyn UserRepository>,
    geocoder: Arc<dyn Geocoder>,
    files: Arc<dyn FileStorage>,
    max_resume_bytes: u64,
}

impl JobService {
    pub fn new(
        jobs: Arc<dyn JobRepository>,
        users: Arc<dyn UserRepository>,
        geocoder: Arc<dyn Geocoder>,
        files: Arc<dyn FileStorage>,
        max_resume_bytes: u64,
    ) -> Self {
        Self {
            jobs,
            users,
            geocoder,
            files,
            max_resume_bytes,
        }
    }

    async fn require(&self, id: &str) -> Result<Job, DomainError> {
        self.jobs
            .get(&JobId::parse(id)?)
            .await?
            .ok_or_else(|| DomainError::not_found(JOB_NOT_FOUND))
    }

    async fn geocode_address(&self, address: &str) -> Result<GeocodedAddress, DomainError> {
        self.geocoder
            .geocode(address)
            .await?
            .ok_or_else(|| DomainError::validation("please add a valid address"))
    }

    /// Query-translated listing, newest first by default
    pub async fn list(&self, params: QueryParams) -> Result<QueryPage<Job>, DomainError> {
        let query = translate(DocumentQuery::new().with_default_sort("-postingDate"), params)?;
        let jobs = self.jobs.find(&query).await?;

        Ok(QueryPage::new(jobs, &query))
    }

    /// A job matching both id and slug
    pub async fn get(&self, id: &str, slug: &str) -> Result<JobDetails, DomainError> {
        let job = self
            .jobs
            .get(&JobId::parse(id)?)
            .await?
            .filter(|job| job.slug() == slug)
            .ok_or_else(|| DomainError::not_found(JOB_NOT_FOUND))?;

        let publisher_name = self
            .users
            .get(job.owner())
            .await?
            .map(|user| user.name().to_string());

        Ok(JobDetails {
            job,
            publisher_name,
        })
    }

    /// Jobs within `distance` miles of a zipcode
    pub async fn in_radius(&self, zipcode: &str, distance: &str) -> Result<Vec<Job>, DomainError> {
        let radius_miles = distance
            .trim()
            .parse::<f64>()
            .ok()
            .filter(|d| d.is_finite() && *d >= 0.0)
            .ok_or_else(|| {
                DomainError::bad_request(format!("Invalid distance: {}", distance))
            })?;

        let center = self.geocoder.geocode(zipcode).await?.ok_or_else(|| {
            DomainError::not_found(format!("No location found for zipcode: {}", zipcode))
        })?;

        let query = DocumentQuery::new().filter(FilterCondition::within_radius(
            "location",
            GeoCircle::new(center.longitude, center.latitude, radius_miles),
        ));

        self.jobs.find(&query).await
    }

    /// Statistics of jobs whose title mentions `topic`, grouped by experience
    pub async fn stats(&self, topic: &str) -> Result<Vec<ExperienceStats>, DomainError> {
        let query = DocumentQuery::new().filter(FilterCondition::contains("title", topic.trim()));
        let jobs = self.jobs.find(&query).await?;

        if jobs.is_empty() {
            return Err(DomainError::not_found(format!(
                "No stats found for - {}",
                topic
            )));
        }

        let mut groups: BTreeMap<&'static str, (Experience, Vec<&Job>)> = BTreeMap::new();
        for job in &jobs {
            groups
                .entry(job.experience().label())
                .or_insert_with(|| (job.experience(), Vec::new()))
                .1
                .push(job);
        }

        let mut stats: Vec<ExperienceStats> = groups
            .into_values()
            .map(|(experience, jobs)| ExperienceStats::from_jobs(experience, &jobs))
            .collect();
        stats.sort_by(|a, b| a.avg_salary.total_cmp(&b.avg_salary));

        Ok(stats)
    }

    /// Publish a job owned by the caller
    pub async fn create(&self, owner: &User, input: JobInput) -> Result<Job, DomainError> {
        let fields = input.resolve(None)?;
        let geocoded = self.geocode_address(&fields.address).await?;
        let (slug, location) = derive_job_fields(&fields.title, &geocoded);

        let job = Job::new(JobId::generate(), owner.id().clone(), fields, slug, location);
        let job = self.jobs.create(job).await?;

        info!(job_id = %job.id(), owner = %owner.id(), "Job created");
        Ok(job)
    }

    /// Update a job; only its owner or an admin may do so
    pub async fn update(&self, caller: &User, id: &str, input: JobInput) -> Result<Job, DomainError> {
        let mut job = self.require(id).await?;

        if !can_manage(caller, &job) {
            return Err(DomainError::bad_request(format!(
                "User({}) is not allowed to update this job.",
                caller.id()
            )));
        }

        let fields = input.resolve(Some(job.fields()))?;
        let geocoded = self.geocode_address(&fields.address).await?;
        let (slug, location) = derive_job_fields(&fields.title, &geocoded);
        job.apply_fields(fields, slug, location);

        let job = self.jobs.update(&job).await?;
        info!(job_id = %job.id(), "Job updated");
        Ok(job)
    }

    /// Delete a job and its applicants' resume files
    pub async fn delete(&self, caller: &User, id: &str) -> Result<(), DomainError> {
        let job = self.require(id).await?;

        if !can_manage(caller, &job) {
            return Err(DomainError::bad_request(format!(
                "User({}) is not allowed to delete this job.",
                caller.id()
            )));
        }

        for application in job.applicants() {
            if let Err(e) = self.files.remove(&application.resume).await {
                warn!(file = %application.resume, error = %e, "Failed to remove resume");
            }
        }

        self.jobs.delete(job.id()).await?;
        info!(job_id = %job.id(), "Job deleted");
        Ok(())
    }

    /// Apply to a job with a resume; returns the stored file name
    pub async fn apply(
        &self,
        applicant: &User,
        id: &str,
        upload: Option<ResumeUpload>,
    ) -> Result<String, DomainError> {
        let mut job = self.require(id).await?;

        if job.is_closed(Utc::now()) {
            return Err(DomainError::bad_request(
                "You can not apply to this job. Date is over.",
            ));
        }

        if job.has_applicant(applicant.id()) {
            return Err(DomainError::bad_request(
                "You have already applied for this job.",
            ));
        }

        let upload = upload.ok_or_else(|| DomainError::bad_request("Please upload file."))?;

        let extension = upload.extension();
        if !ALLOWED_RESUME_EXTENSIONS.contains(&extension.as_str()) {
            return Err(DomainError::bad_request("Please upload document file."));
        }

        if upload.contents.len() as u64 > self.max_resume_bytes {
            return Err(DomainError::bad_request(format!(
                "Please upload file less than {}MB.",
                (self.max_resume_bytes / (1024 * 1024)).max(1)
            )));
        }

        let file_name = resume_file_name(applicant, &job, &extension);
        self.files.save(&file_name, upload.contents).await.map_err(|e| {
            warn!(file = %file_name, error = %e, "Resume upload failed");
            DomainError::internal("Resume upload failed.")
        })?;

        job.add_application(Application {
            id: applicant.id().clone(),
            resume: file_name.clone(),
        });
        self.jobs.update(&job).await?;

        info!(job_id = %job.id(), applicant = %applicant.id(), "Application received");
        Ok(file_name)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::files::MockFileStorage;
    use crate::domain::geocoding::MockGeocoder;
    use crate::domain::job::{fixtures, Education, Industry, JobType, OneOrMany};
    use crate::domain::user::UserId;
    use crate::infrastructure::job::StorageJobRepository;
    use crate::infrastructure::storage::InMemoryStorage;
    use crate::infrastructure::user::StorageUserRepository;
    use chrono::Duration;

    const J1: &str = "0b7f4c1e-2f43-4c55-9a53-6d1c1f0a0001";
    const OPEN: &str = "0b7f4c1e-2f43-4c55-9a53-6d1c1f0a0002";
    const CLOSED: &str = "0b7f4c1e-2f43-4c55-9a53-6d1c1f0a0003";
    const MISSING: &str = "0b7f4c1e-2f43-4c55-9a53-6d1c1f0a00ff";

    const MAX_BYTES: u64 = 2 * 1024 * 1024;

    struct Harness {
        service: JobService,
        jobs: Arc<StorageJobRepository>,
        users: Arc<StorageUserRepository>,
    }

    fn boston() -> GeocodedAddress {
        GeocodedAddress {
            longitude: -71.0589,
            latitude: 42.3601,
            formatted_address: "Boston, MA 02101, US".to_string(),
            city: Some("Boston".to_string()),
            state_code: Some("MA".to_string()),
            zipcode: Some("02101".to_string()),
            country_code: Some("US".to_string()),
        }
    }

    fn geocoder_returning(address: Option<GeocodedAddress>) -> MockGeocoder {
        let mut geocoder = MockGeocoder::new();
        geocoder
            .expect_geocode()
            .returning(move |_| Ok(address.clone()));
        geocoder
    }

    fn harness(geocoder: MockGeocoder, files: MockFileStorage) -> Harness {
        let jobs = Arc::new(StorageJobRepository::new(Arc::new(InMemoryStorage::new())));
        let users = Arc::new(StorageUserRepository::new(Arc::new(InMemoryStorage::new())));

        let service = JobService::new(
            jobs.clone(),
            users.clone(),
            Arc::new(geocoder),
            Arc::new(files),
            MAX_BYTES,
        );

        Harness {
            service,
            jobs,
            users,
        }
    }

    fn person(id: &str, name: &str, role: Role) -> User {
        User::new(
            UserId::new(id).unwrap(),
            name,
            format!("{}@example.com", id),
            role,
            "hash",
        )
    }

    fn input(title: &str) -> JobInput {
        JobInput {
            title: Some(title.to_string()),
            description: Some("Build services".to_string()),
            address: Some("1 Main St, Boston".to_string()),
            company: Some("Acme".to_string()),
            industry: Some(OneOrMany::One("Banking".to_string())),
            job_type: Some(JobType::Permanent.label().to_string()),
            min_education: Some(Education::Masters.label().to_string()),
            experience: Some("No experience".to_string()),
            salary: Some(75000.0),
            ..Default::default()
        }
    }

    fn resume(name: &str) -> Option<ResumeUpload> {
        Some(ResumeUpload {
            file_name: name.to_string(),
            contents: Bytes::from_static(b"%PDF-1.4"),
        })
    }

    #[tokio::test]
    async fn test_create_derives_slug_and_location() {
        let h = harness(geocoder_returning(Some(boston())), MockFileStorage::new());
        let employer = person("emp-1", "Emma", Role::Employer);

        let job = h.service.create(&employer, input("Senior Rust Engineer")).await.unwrap();

        assert_eq!(job.slug(), "senior-rust-engineer");
        assert_eq!(job.owner(), employer.id());
        assert_eq!(job.industry(), &[Industry::Banking]);
        assert_eq!(job.location().zipcode.as_deref(), Some("02101"));
    }

    #[tokio::test]
    async fn test_create_with_unknown_address() {
        let h = harness(geocoder_returning(None), MockFileStorage::new());
        let employer = person("emp-1", "Emma", Role::Employer);

        let result = h.service.create(&employer, input("Engineer")).await;
        assert!(matches!(result, Err(DomainError::Validation { .. })));
    }

    #[tokio::test]
    async fn test_get_requires_matching_slug() {
        let h = harness(geocoder_returning(Some(boston())), MockFileStorage::new());
        let employer = person("emp-1", "Emma", Role::Employer);
        h.users.create(employer.clone()).await.unwrap();
        let job = h.service.create(&employer, input("Data Engineer")).await.unwrap();

        let details = h
            .service
            .get(job.id().as_str(), "data-engineer")
            .await
            .unwrap();
        assert_eq!(details.publisher_name.as_deref(), Some("Emma"));

        assert!(matches!(
            h.service.get(job.id().as_str(), "wrong-slug").await,
            Err(DomainError::NotFound { .. })
        ));
    }

    #[tokio::test]
    async fn test_update_ownership() {
        let h = harness(geocoder_returning(Some(boston())), MockFileStorage::new());
        let owner = person("emp-1", "Emma", Role::Employer);
        let rival = person("emp-2", "Rita", Role::Employer);
        let admin = person("adm-1", "Root", Role::Admin);
        let job = h.service.create(&owner, input("Engineer")).await.unwrap();

        let change = JobInput {
            title: Some("Staff Engineer".to_string()),
            ..Default::default()
        };

        assert!(matches!(
            h.service.update(&rival, job.id().as_str(), change.clone()).await,
            Err(DomainError::BadRequest { .. })
        ));

        let updated = h
            .service
            .update(&admin, job.id().as_str(), change)
            .await
            .unwrap();
        assert_eq!(updated.slug(), "staff-engineer");
        assert_eq!(updated.company(), "Acme");

        assert!(matches!(
            h.service.update(&owner, MISSING, JobInput::default()).await,
            Err(DomainError::NotFound { .. })
        ));
        assert!(matches!(
            h.service.update(&owner, "missing", JobInput::default()).await,
            Err(DomainError::InvalidReference { .. })
        ));
    }

    #[tokio::test]
    async fn test_delete_removes_resumes() {
        let mut files = MockFileStorage::new();
        files.expect_remove().times(2).returning(|_| Ok(()));

        let h = harness(geocoder_returning(Some(boston())), files);
        let owner = person("emp-1", "Emma", Role::Employer);

        let mut job = fixtures::job(J1, "emp-1", "Engineer");
        for applicant in ["u-1", "u-2"] {
            job.add_application(Application {
                id: UserId::new(applicant).unwrap(),
                resume: format!("{}_{}.pdf", applicant, J1),
            });
        }
        h.jobs.create(job).await.unwrap();

        h.service.delete(&owner, J1).await.unwrap();
        assert!(h.jobs.get(&JobId::new(J1)).await.unwrap().is_none());
    }

    #[tokio::test]
    async fn test_apply() {
        let mut files = MockFileStorage::new();
        files
            .expect_save()
            .withf(|name, _| name == format!("Ada_Love_{}.pdf", J1))
            .times(1)
            .returning(|_, _| Ok(()));

        let h = harness(geocoder_returning(Some(boston())), files);
        let applicant = person("u-1", "Ada Love", Role::User);
        h.jobs.create(fixtures::job(J1, "emp-1", "Engineer")).await.unwrap();

        let stored = h
            .service
            .apply(&applicant, J1, resume("cv.PDF"))
            .await
            .unwrap();
        assert_eq!(stored, format!("Ada_Love_{}.pdf", J1));

        let job = h.jobs.get(&JobId::new(J1)).await.unwrap().unwrap();
        assert!(job.has_applicant(applicant.id()));

        let again = h.service.apply(&applicant, J1, resume("cv.pdf")).await;
        match again {
            Err(DomainError::BadRequest { message }) => {
                assert_eq!(message, "You have already applied for this job.")
            }
            other => panic!("expected bad request, got {:?}", other),
        }
    }

    #[test]
    fn test_resume_file_name_is_flat() {
        let job = fixtures::job(J1, "emp-1", "Engineer");
        let name = |applicant: &str| {
            resume_file_name(&person("u-1", applicant, Role::User), &job, ".pdf")
        };

        assert_eq!(name("Ada  Love"), format!("Ada_Love_{}.pdf", J1));
        assert_eq!(name("../etc/passwd"), format!("etcpasswd_{}.pdf", J1));
        assert_eq!(name(".hidden"), format!("hidden_{}.pdf", J1));
        assert_eq!(name("A/B C\\D"), format!("AB_CD_{}.pdf", J1));
    }

    #[tokio::test]
    async fn test_apply_with_unsafe_name_is_stored() {
        let storage_dir = tempfile::tempdir().unwrap();
        let files = crate::infrastructure::files::LocalFileStorage::new(storage_dir.path());
        let jobs: Arc<dyn JobRepository> =
            Arc::new(StorageJobRepository::new(Arc::new(InMemoryStorage::new())));
        let users: Arc<dyn UserRepository> =
            Arc::new(StorageUserRepository::new(Arc::new(InMemoryStorage::new())));
        let service = JobService::new(
            jobs.clone(),
            users,
            Arc::new(geocoder_returning(Some(boston()))),
            Arc::new(files),
            MAX_BYTES,
        );
        jobs.create(fixtures::job(J1, "emp-1", "Engineer")).await.unwrap();

        let applicant = person("u-1", ".. / Eve", Role::User);
        let stored = service.apply(&applicant, J1, resume("cv.pdf")).await.unwrap();

        assert_eq!(stored, format!("Eve_{}.pdf", J1));
        assert!(storage_dir.path().join(&stored).exists());
    }

    #[tokio::test]
    async fn test_apply_rejections() {
        let h = harness(geocoder_returning(Some(boston())), MockFileStorage::new());
        let applicant = person("u-1", "Ada", Role::User);

        let mut closed = fixtures::job(CLOSED, "emp-1", "Engineer");
        let mut fields = closed.fields();
        fields.last_date = Some(Utc::now() - Duration::days(1));
        let location = closed.location().clone();
        closed.apply_fields(fields, "engineer".to_string(), location);
        h.jobs.create(closed).await.unwrap();
        h.jobs.create(fixtures::job(OPEN, "emp-1", "Engineer")).await.unwrap();

        let bad_request = |result: Result<String, DomainError>| match result {
            Err(DomainError::BadRequest { message }) => message,
            other => panic!("expected bad request, got {:?}", other),
        };

        assert_eq!(
            bad_request(h.service.apply(&applicant, CLOSED, resume("cv.pdf")).await),
            "You can not apply to this job. Date is over."
        );
        assert_eq!(
            bad_request(h.service.apply(&applicant, OPEN, resume("cv.exe")).await),
            "Please upload document file."
        );
        assert_eq!(
            bad_request(h.service.apply(&applicant, OPEN, None).await),
            "Please upload file."
        );

        let oversized = Some(ResumeUpload {
            file_name: "cv.docx".to_string(),
            contents: Bytes::from(vec![0u8; MAX_BYTES as usize + 1]),
        });
        assert_eq!(
            bad_request(h.service.apply(&applicant, OPEN, oversized).await),
            "Please upload file less than 2MB."
        );

        assert!(matches!(
            h.service.apply(&applicant, MISSING, resume("cv.pdf")).await,
            Err(DomainError::NotFound { .. })
        ));
        assert!(matches!(
            h.service.apply(&applicant, "missing", resume("cv.pdf")).await,
            Err(DomainError::InvalidReference { .. })
        ));
    }

    #[tokio::test]
    async fn test_in_radius() {
        let h = harness(
            geocoder_returning(Some(GeocodedAddress {
                longitude: -71.1097,
                latitude: 42.3736,
                ..boston()
            })),
            MockFileStorage::new(),
        );
        h.jobs.create(fixtures::job("near", "emp-1", "Engineer")).await.unwrap();

        assert_eq!(h.service.in_radius("02139", "10").await.unwrap().len(), 1);
        assert!(h.service.in_radius("02139", "1").await.unwrap().is_empty());
        assert!(matches!(
            h.service.in_radius("02139", "far").await,
            Err(DomainError::BadRequest { .. })
        ));
    }

    #[tokio::test]
    async fn test_stats_group_by_experience() {
        let h = harness(geocoder_returning(Some(boston())), MockFileStorage::new());

        for (id, title, salary, experience) in [
            ("j1", "Rust Developer", 100.0, Experience::NoExperience),
            ("j2", "Senior Rust Developer", 300.0, Experience::FivePlusYears),
            ("j3", "Rust Engineer", 200.0, Experience::NoExperience),
            ("j4", "Java Developer", 999.0, Experience::NoExperience),
        ] {
            let mut job = fixtures::job(id, "emp-1", title);
            let mut fields = job.fields();
            fields.salary = salary;
            fields.experience = experience;
            let location = job.location().clone();
            job.apply_fields(fields, id.to_string(), location);
            h.jobs.create(job).await.unwrap();
        }

        let stats = h.service.stats("rust").await.unwrap();
        assert_eq!(stats.len(), 2);
        assert_eq!(stats[0].experience, "NO EXPERIENCE");
        assert_eq!(stats[0].total_jobs, 2);
        assert_eq!(stats[0].avg_salary, 150.0);
        assert_eq!(stats[0].min_salary, 100.0);
        assert_eq!(stats[0].max_salary, 200.0);
        assert_eq!(stats[1].experience, "5 YEARS+");

        assert!(matches!(
            h.service.stats("cobol").await,
            Err(DomainError::NotFound { .. })
        ));
    }

    #[tokio::test]
    async fn test_list_defaults_to_newest_first() {
        let h = harness(geocoder_returning(Some(boston())), MockFileStorage::new());
        let employer = person("emp-1", "Emma", Role::Employer);
        for title in ["First", "Second", "Third"] {
            h.service.create(&employer, input(title)).await.unwrap();
            tokio::time::sleep(std::time::Duration::from_millis(5)).await;
        }

        let page = h.service.list(QueryParams::new()).await.unwrap();
        let titles: Vec<&str> = page.items.iter().map(|job| job.title()).collect();
        assert_eq!(titles, vec!["Third", "Second", "First"]);

        let params = QueryParams::from_pairs(vec![("limit", "1"), ("page", "2")]).unwrap();
        let page = h.service.list(params).await.unwrap();
        assert_eq!(page.len(), 1);
        assert_eq!(page.items[0].title(), "Second");
    }
}
