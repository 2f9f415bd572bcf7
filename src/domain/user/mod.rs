//! User domain
//!
//! Identities, roles, validation and the repository trait.

mod entity;
mod repository;
mod validation;

pub use entity::{Role, User, UserId};
pub use repository::UserRepository;
pub use validation::{
    is_valid_email, parse_registration_role, validate_email, validate_name, validate_password,
    UserValidationError, ValidationReport, MIN_PASSWORD_LENGTH,
};
