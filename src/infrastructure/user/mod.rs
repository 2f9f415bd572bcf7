//! User infrastructure module
//!
//! Argon2 password hashing, the storage-backed repository and the user
//! service (registration, login, credential recovery, account management).

mod password;
mod repository;
mod service;

pub use password::{hash_password, verify_password, Argon2Hasher, PasswordHasher};
pub use repository::StorageUserRepository;
pub use service::{
    AuthSession, RegisterRequest, UpdateProfileRequest, UserProfile, UserService,
    RESET_EMAIL_SUBJECT,
};
