//! Jobee job board API
//!
//! Applicants and employers register and sign in with session tokens,
//! employers publish geocoded job postings, applicants apply with a resume
//! upload, and admins manage users. Listings accept a query language for
//! filtering, sorting, field selection and pagination.

pub mod api;
pub mod cli;
pub mod config;
pub mod domain;
pub mod infrastructure;

pub use config::AppConfig;

use std::sync::Arc;

use tracing::info;

use api::{AppState, CookieSettings};
use domain::{
    EmailSender, FileStorage, Geocoder, Job, JobRepository, User, UserRepository, DomainError,
};
use infrastructure::{
    auth::{AuthGate, JwtGenerator, JwtService, ResetTokenService},
    email::create_email_sender,
    files::LocalFileStorage,
    geocoding::create_geocoder,
    job::{JobService, StorageJobRepository},
    storage::{StorageConfig, StorageFactory},
    user::{Argon2Hasher, PasswordHasher, StorageUserRepository, UserService},
};

/// Services the application talks to outside its own storage
#[derive(Debug, Clone)]
pub struct Collaborators {
    pub geocoder: Arc<dyn Geocoder>,
    pub email: Arc<dyn EmailSender>,
    pub files: Arc<dyn FileStorage>,
    pub hasher: Arc<dyn PasswordHasher>,
}

impl Collaborators {
    /// Build the providers selected in the configuration
    pub fn from_config(config: &AppConfig) -> Result<Self, DomainError> {
        let geocoder = create_geocoder(
            &config.geocoder.provider,
            config.geocoder.api_key.as_deref(),
            config.geocoder.base_url.as_deref(),
        )?;
        let email = create_email_sender(&config.email.provider, &config.email.smtp())?;

        info!(
            geocoder = %config.geocoder.provider,
            email = %config.email.provider,
            uploads = %config.uploads.dir,
            "Collaborators configured"
        );

        Ok(Self {
            geocoder,
            email,
            files: Arc::new(LocalFileStorage::new(&config.uploads.dir)),
            hasher: Arc::new(Argon2Hasher::new()),
        })
    }
}

/// Repositories over the opened collections
#[derive(Debug, Clone)]
pub struct Repositories {
    pub users: Arc<dyn UserRepository>,
    pub jobs: Arc<dyn JobRepository>,
}

impl Repositories {
    /// Open the `users` (unique email) and `jobs` collections
    pub async fn open(storage: &StorageFactory) -> Result<Self, DomainError> {
        let user_storage = storage.collection::<User>("users", &["email"]).await?;
        let job_storage = storage.collection::<Job>("jobs", &[]).await?;

        Ok(Self {
            users: Arc::new(StorageUserRepository::new(user_storage)),
            jobs: Arc::new(StorageJobRepository::new(job_storage)),
        })
    }
}

/// Create the application state for a configuration
pub async fn create_app_state(config: &AppConfig) -> anyhow::Result<AppState> {
    let storage_config =
        StorageConfig::from_settings(&config.storage.backend, config.storage.database_url.as_deref())?;
    info!(backend = ?storage_config.storage_type(), "Opening storage");

    let storage = StorageFactory::connect(&storage_config).await?;
    let repositories = Repositories::open(&storage).await?;
    let collaborators = Collaborators::from_config(config)?;

    Ok(create_app_state_with(config, repositories, collaborators).await?)
}

/// Wire the services on top of repositories and collaborators
///
/// Creates the bootstrap admin when one is configured and missing.
pub async fn create_app_state_with(
    config: &AppConfig,
    repositories: Repositories,
    collaborators: Collaborators,
) -> Result<AppState, DomainError> {
    let Repositories { users, jobs } = repositories;
    let jwt: Arc<dyn JwtGenerator> = Arc::new(JwtService::new(config.auth.jwt()));

    let user_service = Arc::new(UserService::new(
        users.clone(),
        jobs.clone(),
        collaborators.files.clone(),
        collaborators.email,
        collaborators.hasher,
        jwt.clone(),
        ResetTokenService::new(config.auth.reset_token()),
    ));

    let job_service = Arc::new(JobService::new(
        jobs,
        users.clone(),
        collaborators.geocoder,
        collaborators.files,
        config.uploads.max_resume_bytes,
    ));

    if let Some((email, password)) = config.admin.credentials() {
        if user_service.ensure_admin(email, password).await? {
            info!(email = %email, "Bootstrap admin ready");
        }
    }

    Ok(AppState::new(
        user_service,
        job_service,
        AuthGate::new(jwt, users),
        CookieSettings::new(
            config.auth.cookie_expires_days,
            config.environment.is_production(),
        ),
    )
    .with_public_url(config.server.public_url.clone()))
}
