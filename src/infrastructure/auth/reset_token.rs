//! Password reset tokens
//!
//! The raw token goes to the user once; only its HMAC-SHA256 under the
//! configured secret is stored.

use chrono::{DateTime, Duration, Utc};
use hmac::{Hmac, Mac};
use rand::RngCore;
use sha2::Sha256;

use crate::domain::DomainError;

type HmacSha256 = Hmac<Sha256>;

/// Random bytes in a raw token
pub const RESET_TOKEN_BYTES: usize = 20;

#[derive(Debug, Clone)]
pub struct ResetTokenConfig {
    pub secret: String,
    pub ttl_minutes: i64,
}

impl ResetTokenConfig {
    pub fn new(secret: impl Into<String>, ttl_minutes: i64) -> Self {
        Self {
            secret: secret.into(),
            ttl_minutes,
        }
    }
}

/// A freshly issued token
#[derive(Debug, Clone)]
pub struct IssuedResetToken {
    /// Hex value handed to the user
    pub raw: String,
    /// Keyed hash to persist
    pub hash: String,
    pub expires_at: DateTime<Utc>,
}

#[derive(Debug, Clone)]
pub struct ResetTokenService {
    config: ResetTokenConfig,
}

impl ResetTokenService {
    pub fn new(config: ResetTokenConfig) -> Self {
        Self { config }
    }

    pub fn issue(&self) -> Result<IssuedResetToken, DomainError> {
        let mut bytes = [0u8; RESET_TOKEN_BYTES];
        rand::thread_rng().fill_bytes(&mut bytes);

        let raw = hex::encode(bytes);
        let hash = self.hash(&raw)?;

        Ok(IssuedResetToken {
            raw,
            hash,
            expires_at: Utc::now() + Duration::minutes(self.config.ttl_minutes),
        })
    }

    /// Keyed hash of a raw token, hex encoded
    pub fn hash(&self, raw: &str) -> Result<String, DomainError> {
        let mut mac = HmacSha256::new_from_slice(self.config.secret.as_bytes())
            .map_err(|e| DomainError::configuration(format!("Invalid reset token secret: {}", e)))?;
        mac.update(raw.as_bytes());

        Ok(hex::encode(mac.finalize().into_bytes()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn service() -> ResetTokenService {
        ResetTokenService::new(ResetTokenConfig::new("reset-secret", 30))
    }

    #[test]
    fn test_issue_shapes() {
        let before = Utc::now();
        let token = service().issue().unwrap();

        assert_eq!(token.raw.len(), RESET_TOKEN_BYTES * 2);
        assert!(token.raw.chars().all(|c| c.is_ascii_hexdigit()));
        assert_eq!(token.hash.len(), 64);
        assert_ne!(token.raw, token.hash);
        assert!(token.expires_at >= before + Duration::minutes(30));
        assert!(token.expires_at <= Utc::now() + Duration::minutes(30));
    }

    #[test]
    fn test_hash_is_deterministic_and_keyed() {
        let token = service().issue().unwrap();

        assert_eq!(service().hash(&token.raw).unwrap(), token.hash);

        let other = ResetTokenService::new(ResetTokenConfig::new("different", 30));
        assert_ne!(other.hash(&token.raw).unwrap(), token.hash);
    }

    #[test]
    fn test_tokens_are_unique() {
        assert_ne!(service().issue().unwrap().raw, service().issue().unwrap().raw);
    }
}
