//! Session token generation and validation

use chrono::{Duration, Utc};
use jsonwebtoken::{decode, encode, Algorithm, DecodingKey, EncodingKey, Header, Validation};
use serde::{Deserialize, Serialize};
use std::fmt::Debug;

use crate::domain::user::{User, UserId};
use crate::domain::DomainError;

/// Session token claims
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct JwtClaims {
    /// Subject (user ID)
    pub sub: String,
    /// Issued at (Unix epoch)
    pub iat: i64,
    /// Expiration (Unix epoch)
    pub exp: i64,
}

impl JwtClaims {
    pub fn new(user_id: &UserId, expiration_hours: u64) -> Self {
        let now = Utc::now();
        let exp = now + Duration::hours(expiration_hours as i64);

        Self {
            sub: user_id.as_str().to_string(),
            iat: now.timestamp(),
            exp: exp.timestamp(),
        }
    }

    pub fn user_id(&self) -> Result<UserId, DomainError> {
        UserId::new(self.sub.clone())
            .map_err(|_| DomainError::unauthenticated("Login first to access this resource"))
    }
}

#[derive(Debug, Clone)]
pub struct JwtConfig {
    pub secret: String,
    pub expiration_hours: u64,
}

impl JwtConfig {
    pub fn new(secret: impl Into<String>, expiration_hours: u64) -> Self {
        Self {
            secret: secret.into(),
            expiration_hours,
        }
    }
}

/// Issues and checks session tokens
pub trait JwtGenerator: Send + Sync + Debug {
    fn generate(&self, user: &User) -> Result<String, DomainError>;

    /// Signature and expiry check; failures are `Unauthenticated`
    fn validate(&self, token: &str) -> Result<JwtClaims, DomainError>;

    fn expiration_hours(&self) -> u64;
}

/// HS256 session tokens signed with a shared secret
#[derive(Clone)]
pub struct JwtService {
    config: JwtConfig,
    encoding_key: EncodingKey,
    decoding_key: DecodingKey,
}

impl Debug for JwtService {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("JwtService")
            .field("expiration_hours", &self.config.expiration_hours)
            .field("secret", &"[hidden]")
            .finish()
    }
}

impl JwtService {
    pub fn new(config: JwtConfig) -> Self {
        let encoding_key = EncodingKey::from_secret(config.secret.as_bytes());
        let decoding_key = DecodingKey::from_secret(config.secret.as_bytes());

        Self {
            config,
            encoding_key,
            decoding_key,
        }
    }
}

impl JwtGenerator for JwtService {
    fn generate(&self, user: &User) -> Result<String, DomainError> {
        let claims = JwtClaims::new(user.id(), self.config.expiration_hours);

        encode(&Header::new(Algorithm::HS256), &claims, &self.encoding_key)
            .map_err(|e| DomainError::internal(format!("Failed to generate JWT: {}", e)))
    }

    fn validate(&self, token: &str) -> Result<JwtClaims, DomainError> {
        let mut validation = Validation::new(Algorithm::HS256);
        validation.leeway = 0;

        decode::<JwtClaims>(token, &self.decoding_key, &validation)
            .map(|data| data.claims)
            .map_err(|e| match e.kind() {
                jsonwebtoken::errors::ErrorKind::ExpiredSignature => {
                    DomainError::unauthenticated("JSON Web Token is expired. Try Again!!!")
                }
                _ => DomainError::unauthenticated("JSON Web Token is invalid. Try Again!!!"),
            })
    }

    fn expiration_hours(&self) -> u64 {
        self.config.expiration_hours
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::user::Role;

    fn user() -> User {
        User::new(
            UserId::new("user-42").unwrap(),
            "Ada",
            "ada@example.com",
            Role::User,
            "hash",
        )
    }

    fn service(secret: &str) -> JwtService {
        JwtService::new(JwtConfig::new(secret, 24))
    }

    #[test]
    fn test_generate_and_validate() {
        let service = service("secret-a");
        let token = service.generate(&user()).unwrap();

        let claims = service.validate(&token).unwrap();
        assert_eq!(claims.sub, "user-42");
        assert_eq!(claims.exp - claims.iat, 24 * 3600);
        assert_eq!(claims.user_id().unwrap().as_str(), "user-42");
    }

    #[test]
    fn test_wrong_secret_is_unauthenticated() {
        let token = service("secret-a").generate(&user()).unwrap();
        let result = service("secret-b").validate(&token);

        assert!(matches!(result, Err(DomainError::Unauthenticated { .. })));
    }

    #[test]
    fn test_expired_token_is_unauthenticated() {
        let past = Utc::now() - Duration::hours(2);
        let claims = JwtClaims {
            sub: "user-42".to_string(),
            iat: past.timestamp(),
            exp: (past + Duration::hours(1)).timestamp(),
        };
        let token = encode(
            &Header::new(Algorithm::HS256),
            &claims,
            &EncodingKey::from_secret(b"secret-a"),
        )
        .unwrap();

        match service("secret-a").validate(&token) {
            Err(DomainError::Unauthenticated { message }) => assert!(message.contains("expired")),
            other => panic!("expected unauthenticated, got {:?}", other),
        }
    }

    #[test]
    fn test_garbage_token() {
        assert!(service("s").validate("not.a.jwt").is_err());
        assert_eq!(service("s").expiration_hours(), 24);
    }
}
