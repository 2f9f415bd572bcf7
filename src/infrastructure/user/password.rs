//! Password hashing with Argon2

use argon2::{
    password_hash::{
        rand_core::OsRng, PasswordHash, PasswordHasher as Argon2PasswordHasher, PasswordVerifier,
        SaltString,
    },
    Argon2,
};
use std::fmt::Debug;
use std::sync::Arc;

use crate::domain::DomainError;

pub trait PasswordHasher: Send + Sync + Debug {
    /// PHC string with a fresh random salt
    fn hash(&self, password: &str) -> Result<String, DomainError>;

    /// False on mismatch or on a malformed hash
    fn verify(&self, password: &str, hash: &str) -> bool;
}

/// Argon2id hasher with default parameters
#[derive(Debug, Clone, Default)]
pub struct Argon2Hasher;

impl Argon2Hasher {
    pub fn new() -> Self {
        Self
    }
}

impl PasswordHasher for Argon2Hasher {
    fn hash(&self, password: &str) -> Result<String, DomainError> {
        let salt = SaltString::generate(&mut OsRng);

        Argon2::default()
            .hash_password(password.as_bytes(), &salt)
            .map(|hash| hash.to_string())
            .map_err(|e| DomainError::internal(format!("Failed to hash password: {}", e)))
    }

    fn verify(&self, password: &str, hash: &str) -> bool {
        let Ok(parsed_hash) = PasswordHash::new(hash) else {
            return false;
        };

        Argon2::default()
            .verify_password(password.as_bytes(), &parsed_hash)
            .is_ok()
    }
}

/// Hash on the blocking pool so request tasks are not stalled
pub async fn hash_password(
    hasher: Arc<dyn PasswordHasher>,
    password: String,
) -> Result<String, DomainError> {
    tokio::task::spawn_blocking(move || hasher.hash(&password))
        .await
        .map_err(|e| DomainError::internal(format!("Password hashing task failed: {}", e)))?
}

/// Verify on the blocking pool; a failed task counts as a mismatch
pub async fn verify_password(
    hasher: Arc<dyn PasswordHasher>,
    password: String,
    hash: String,
) -> bool {
    tokio::task::spawn_blocking(move || hasher.verify(&password, &hash))
        .await
        .unwrap_or(false)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_hash_and_verify() {
        let hasher = Argon2Hasher::new();
        let hash = hasher.hash("correct horse").unwrap();

        assert!(hash.starts_with("$argon2id$"));
        assert!(hasher.verify("correct horse", &hash));
        assert!(!hasher.verify("wrong horse", &hash));
    }

    #[test]
    fn test_salts_differ() {
        let hasher = Argon2Hasher::new();
        let first = hasher.hash("same password").unwrap();
        let second = hasher.hash("same password").unwrap();

        assert_ne!(first, second);
        assert!(hasher.verify("same password", &second));
    }

    #[test]
    fn test_malformed_hash_is_mismatch() {
        let hasher = Argon2Hasher::new();
        assert!(!hasher.verify("password", "plaintext"));
        assert!(!hasher.verify("password", ""));
    }

    #[tokio::test]
    async fn test_blocking_helpers() {
        let hasher: Arc<dyn PasswordHasher> = Arc::new(Argon2Hasher::new());
        let hash = hash_password(hasher.clone(), "longenough".to_string())
            .await
            .unwrap();

        assert!(verify_password(hasher.clone(), "longenough".to_string(), hash.clone()).await);
        assert!(!verify_password(hasher, "other".to_string(), hash).await);
    }
}
