//! User validation utilities

use once_cell::sync::Lazy;
use regex::Regex;
use thiserror::Error;

use super::entity::Role;
use crate::domain::DomainError;

#[derive(Debug, Error, Clone, PartialEq)]
pub enum UserValidationError {
    #[error("User ID cannot be empty")]
    EmptyId,

    #[error("please enter your name")]
    MissingName,

    #[error("please enter your email")]
    MissingEmail,

    #[error("please enter a valid email address")]
    InvalidEmail,

    #[error("please enter your password for your account")]
    MissingPassword,

    #[error("your password must be at least {0} characters long")]
    PasswordTooShort(usize),

    #[error("please select correct role")]
    InvalidRole,
}

impl From<UserValidationError> for DomainError {
    fn from(error: UserValidationError) -> Self {
        DomainError::validation(error.to_string())
    }
}

pub const MIN_PASSWORD_LENGTH: usize = 8;

static EMAIL_PATTERN: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"^[A-Za-z0-9.!#$%&'*+/=?^_`{|}~-]+@[A-Za-z0-9](?:[A-Za-z0-9-]{0,61}[A-Za-z0-9])?(?:\.[A-Za-z0-9](?:[A-Za-z0-9-]{0,61}[A-Za-z0-9])?)+$").unwrap()
});

pub fn is_valid_email(email: &str) -> bool {
    EMAIL_PATTERN.is_match(email)
}

pub fn validate_name(name: &str) -> Result<(), UserValidationError> {
    if name.trim().is_empty() {
        return Err(UserValidationError::MissingName);
    }
    Ok(())
}

pub fn validate_email(email: &str) -> Result<(), UserValidationError> {
    if email.trim().is_empty() {
        return Err(UserValidationError::MissingEmail);
    }

    if !is_valid_email(email.trim()) {
        return Err(UserValidationError::InvalidEmail);
    }

    Ok(())
}

pub fn validate_password(password: &str) -> Result<(), UserValidationError> {
    if password.is_empty() {
        return Err(UserValidationError::MissingPassword);
    }

    if password.chars().count() < MIN_PASSWORD_LENGTH {
        return Err(UserValidationError::PasswordTooShort(MIN_PASSWORD_LENGTH));
    }

    Ok(())
}

/// Parse a self-selected role; absent means `user`, `admin` is refused
pub fn parse_registration_role(role: Option<&str>) -> Result<Role, UserValidationError> {
    match role {
        None => Ok(Role::User),
        Some(raw) => {
            let role: Role = raw.parse()?;
            if role.is_self_assignable() {
                Ok(role)
            } else {
                Err(UserValidationError::InvalidRole)
            }
        }
    }
}

/// Collects one message per violated field
#[derive(Debug, Default)]
pub struct ValidationReport {
    messages: Vec<String>,
}

impl ValidationReport {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn check<T>(&mut self, result: Result<T, impl std::fmt::Display>) -> Option<T> {
        match result {
            Ok(value) => Some(value),
            Err(error) => {
                self.messages.push(error.to_string());
                None
            }
        }
    }

    pub fn push(&mut self, message: impl Into<String>) {
        self.messages.push(message.into());
    }

    pub fn is_empty(&self) -> bool {
        self.messages.is_empty()
    }

    pub fn into_result(self) -> Result<(), DomainError> {
        if self.messages.is_empty() {
            Ok(())
        } else {
            Err(DomainError::validation_messages(self.messages))
        }
    }
}
