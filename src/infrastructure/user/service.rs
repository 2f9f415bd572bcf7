//! User service for authentication, credential recovery and account management

use std::sync::Arc;

use tracing::{debug, info, warn};

use crate::domain::email::{EmailMessage, EmailSender};
use crate::domain::files::FileStorage;
use crate::domain::job::{Job, JobRepository};
use crate::domain::query::{translate, DocumentQuery, FilterCondition, QueryPage, QueryParams};
use crate::domain::user::{
    parse_registration_role, validate_email, validate_name, validate_password, Role, User,
    UserId, UserRepository, ValidationReport,
};
use crate::domain::DomainError;
use crate::infrastructure::auth::{JwtGenerator, ResetTokenService};

use super::password::{hash_password, verify_password, PasswordHasher};

pub const RESET_EMAIL_SUBJECT: &str = "Jobee Password Recovery";

/// Request for self-registration
#[derive(Debug, Clone, Default)]
pub struct RegisterRequest {
    pub name: String,
    pub email: String,
    pub password: String,
    pub role: Option<String>,
}

/// Request for changing the caller's name and/or email
#[derive(Debug, Clone, Default)]
pub struct UpdateProfileRequest {
    pub name: Option<String>,
    pub email: Option<String>,
}

/// An authenticated user together with a freshly issued session token
#[derive(Debug, Clone)]
pub struct AuthSession {
    pub user: User,
    pub token: String,
}

/// A user and the jobs they published
#[derive(Debug, Clone)]
pub struct UserProfile {
    pub user: User,
    pub jobs_published: Vec<Job>,
}

fn normalize_email(email: &str) -> String {
    email.trim().to_lowercase()
}

fn applications_of(user_id: &UserId) -> DocumentQuery {
    DocumentQuery::new().filter(FilterCondition::eq("applicantsApplied.id", user_id.as_str()))
}

fn published_by(user_id: &UserId) -> DocumentQuery {
    DocumentQuery::new().filter(FilterCondition::eq("user", user_id.as_str()))
}

#[derive(Debug)]
pub struct UserService {
    users: Arc<dyn UserRepository>,
    jobs: Arc<dyn JobRepository>,
    files: Arc<dyn FileStorage>,
    email: Arc<dyn EmailSender>,
    hasher: Arc<dyn PasswordHasher>,
    jwt: Arc<dyn JwtGenerator>,
    reset_tokens: ResetTokenService,
}

impl UserService {
    pub fn new(
        users: Arc<dyn UserRepository>,
        jobs: Arc<dyn JobRepository>,
        files: Arc<dyn FileStorage>,
        email: Arc<dyn EmailSender>,
        hasher: Arc<dyn PasswordHasher>,
        jwt: Arc<dyn JwtGenerator>,
        reset_tokens: ResetTokenService,
    ) -> Self {
        Self {
            users,
            jobs,
            files,
            email,
            hasher,
            jwt,
            reset_tokens,
        }
    }

    fn session(&self, user: User) -> Result<AuthSession, DomainError> {
        let token = self.jwt.generate(&user)?;
        Ok(AuthSession { user, token })
    }

    async fn require(&self, id: &UserId) -> Result<User, DomainError> {
        self.users
            .get(id)
            .await?
            .ok_or_else(|| DomainError::not_found(format!("user not found with id: {}", id)))
    }

    /// Register a user or employer and sign them in
    pub async fn register(&self, request: RegisterRequest) -> Result<AuthSession, DomainError> {
        let mut report = ValidationReport::new();
        report.check(validate_name(&request.name));
        report.check(validate_email(&request.email));
        report.check(validate_password(&request.password));
        let role = report.check(parse_registration_role(request.role.as_deref()));
        report.into_result()?;

        let password_hash = hash_password(self.hasher.clone(), request.password).await?;
        let user = User::new(
            UserId::generate(),
            request.name.trim(),
            normalize_email(&request.email),
            role.unwrap_or_default(),
            password_hash,
        );

        let user = self.users.create(user).await?;
        info!(user_id = %user.id(), role = %user.role(), "User registered");

        self.session(user)
    }

    /// Check email and password and sign the user in
    pub async fn login(
        &self,
        email: Option<&str>,
        password: Option<&str>,
    ) -> Result<AuthSession, DomainError> {
        let (email, password) = match (email, password) {
            (Some(email), Some(password)) if !email.is_empty() && !password.is_empty() => {
                (email, password)
            }
            _ => return Err(DomainError::bad_request("Please enter email & password")),
        };

        let invalid = || DomainError::unauthenticated("Invalid Email or Password");

        let user = self.users.get_by_email(email).await?.ok_or_else(invalid)?;

        let matched = verify_password(
            self.hasher.clone(),
            password.to_string(),
            user.password_hash().to_string(),
        )
        .await;

        if !matched {
            debug!(user_id = %user.id(), "Login rejected: wrong password");
            return Err(invalid());
        }

        self.session(user)
    }

    /// Issue a reset token and email the link `{reset_url_base}/{token}`
    ///
    /// Returns the address the email was sent to. When delivery fails the
    /// reset fields are cleared again.
    pub async fn forgot_password(
        &self,
        email: &str,
        reset_url_base: &str,
    ) -> Result<String, DomainError> {
        let mut user = self
            .users
            .get_by_email(email)
            .await?
            .ok_or_else(|| DomainError::not_found("No user found with this email"))?;

        let issued = self.reset_tokens.issue()?;
        user.set_reset_token(issued.hash, issued.expires_at);
        let mut user = self.users.update(&user).await?;

        let reset_url = format!("{}/{}", reset_url_base.trim_end_matches('/'), issued.raw);
        let message = EmailMessage {
            to: user.email().to_string(),
            subject: RESET_EMAIL_SUBJECT.to_string(),
            body: format!(
                "your password reset link is as follow:\n\n{}\n\nIf you have not requested this email, then ignore it.",
                reset_url
            ),
        };

        if let Err(e) = self.email.send(message).await {
            warn!(user_id = %user.id(), error = %e, "Password reset email failed");
            user.clear_reset_token();
            self.users.update(&user).await?;
            return Err(DomainError::email_delivery(e.to_string()));
        }

        info!(user_id = %user.id(), "Password reset email sent");
        Ok(user.email().to_string())
    }

    /// Redeem a reset token and set a new password
    ///
    /// The token is cleared in the same write that stores the new password.
    pub async fn reset_password(
        &self,
        raw_token: &str,
        new_password: &str,
    ) -> Result<AuthSession, DomainError> {
        let token_hash = self.reset_tokens.hash(raw_token)?;

        let mut user = self
            .users
            .get_by_reset_token(&token_hash)
            .await?
            .ok_or(DomainError::InvalidOrExpiredToken)?;

        validate_password(new_password)?;

        let password_hash = hash_password(self.hasher.clone(), new_password.to_string()).await?;
        user.set_password_hash(password_hash);
        user.clear_reset_token();

        let user = self.users.update(&user).await?;
        info!(user_id = %user.id(), "Password reset");

        self.session(user)
    }

    /// Change the caller's password after checking the current one
    pub async fn update_password(
        &self,
        id: &UserId,
        current_password: &str,
        new_password: &str,
    ) -> Result<AuthSession, DomainError> {
        let mut user = self.require(id).await?;

        let matched = verify_password(
            self.hasher.clone(),
            current_password.to_string(),
            user.password_hash().to_string(),
        )
        .await;

        if !matched {
            return Err(DomainError::bad_request("password is incorrect"));
        }

        validate_password(new_password)?;

        let password_hash = hash_password(self.hasher.clone(), new_password.to_string()).await?;
        user.set_password_hash(password_hash);

        let user = self.users.update(&user).await?;
        self.session(user)
    }

    /// Change the caller's name and/or email
    pub async fn update_profile(
        &self,
        id: &UserId,
        request: UpdateProfileRequest,
    ) -> Result<User, DomainError> {
        let mut user = self.require(id).await?;

        let mut report = ValidationReport::new();
        if let Some(name) = &request.name {
            report.check(validate_name(name));
        }
        if let Some(email) = &request.email {
            report.check(validate_email(email));
        }
        report.into_result()?;

        if let Some(name) = request.name {
            user.set_name(name.trim());
        }
        if let Some(email) = request.email {
            user.set_email(normalize_email(&email));
        }

        self.users.update(&user).await
    }

    /// The user with the title and posting date of every job they published
    pub async fn profile(&self, id: &UserId) -> Result<UserProfile, DomainError> {
        let user = self.require(id).await?;
        let jobs_published = self.jobs.find(&published_by(user.id())).await?;

        Ok(UserProfile {
            user,
            jobs_published,
        })
    }

    /// Query-translated listing of all users
    pub async fn list(&self, params: QueryParams) -> Result<QueryPage<User>, DomainError> {
        let query = translate(DocumentQuery::new().with_default_sort("-createdAt"), params)?;
        let users = self.users.find(&query).await?;

        Ok(QueryPage::new(users, &query))
    }

    /// Jobs the user has applied to
    pub async fn applied_jobs(&self, id: &UserId) -> Result<Vec<Job>, DomainError> {
        self.jobs.find(&applications_of(id)).await
    }

    /// Jobs the user published
    pub async fn published_jobs(&self, id: &UserId) -> Result<Vec<Job>, DomainError> {
        self.jobs.find(&published_by(id)).await
    }

    /// Delete the caller's own account and everything hanging off it
    pub async fn delete_account(&self, user: &User) -> Result<(), DomainError> {
        self.delete_user_data(user).await?;
        self.users.delete(user.id()).await?;
        info!(user_id = %user.id(), "Account deleted");
        Ok(())
    }

    /// Admin deletion of any user by id
    pub async fn delete_user(&self, id: &str) -> Result<(), DomainError> {
        let user = self
            .users
            .get(&UserId::parse(id)?)
            .await?
            .ok_or_else(|| DomainError::not_found(format!("user not found with id: {}", id)))?;

        self.users.delete(user.id()).await?;
        self.delete_user_data(&user).await?;
        info!(user_id = %user.id(), "User deleted by admin");
        Ok(())
    }

    /// Cascade for a deleted user
    ///
    /// Employers lose their jobs. Applicants are removed from every job they
    /// applied to and their resume files are deleted; file errors are only
    /// logged. Not atomic: a failure midway leaves the rest in place.
    async fn delete_user_data(&self, user: &User) -> Result<(), DomainError> {
        match user.role() {
            Role::Employer => {
                let removed = self.jobs.delete_many(&published_by(user.id())).await?;
                debug!(user_id = %user.id(), removed, "Deleted published jobs");
            }
            Role::User => {
                for mut job in self.jobs.find(&applications_of(user.id())).await? {
                    if let Some(application) = job.remove_application(user.id()) {
                        if let Err(e) = self.files.remove(&application.resume).await {
                            warn!(
                                file = %application.resume,
                                error = %e,
                                "Failed to remove resume"
                            );
                        }
                    }
                    self.jobs.update(&job).await?;
                }
            }
            Role::Admin => {}
        }

        Ok(())
    }

    /// Create the configured admin unless a user with that email exists
    pub async fn ensure_admin(&self, email: &str, password: &str) -> Result<bool, DomainError> {
        if self.users.get_by_email(email).await?.is_some() {
            return Ok(false);
        }

        validate_email(email)?;
        validate_password(password)?;

        let password_hash = hash_password(self.hasher.clone(), password.to_string()).await?;
        let admin = User::new(
            UserId::generate(),
            "Admin",
            normalize_email(email),
            Role::Admin,
            password_hash,
        );

        let admin = self.users.create(admin).await?;
        info!(user_id = %admin.id(), "Bootstrap admin created");
        Ok(true)
    }
}
