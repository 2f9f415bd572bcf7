//! Authorization gate: resolve a session token to a user, then check roles

use std::sync::Arc;

use tracing::debug;

use super::jwt::JwtGenerator;
use crate::domain::user::{Role, User, UserRepository};
use crate::domain::DomainError;

pub const LOGIN_REQUIRED: &str = "Login first to access this resource.";

#[derive(Debug, Clone)]
pub struct AuthGate {
    jwt: Arc<dyn JwtGenerator>,
    users: Arc<dyn UserRepository>,
}

impl AuthGate {
    pub fn new(jwt: Arc<dyn JwtGenerator>, users: Arc<dyn UserRepository>) -> Self {
        Self { jwt, users }
    }

    /// Resolve the caller behind a session token
    ///
    /// Every failure (no token, bad signature, expired, unknown user) is
    /// `Unauthenticated`.
    pub async fn authenticate(&self, token: Option<&str>) -> Result<User, DomainError> {
        let token = token
            .map(str::trim)
            .filter(|t| !t.is_empty() && *t != "none")
            .ok_or_else(|| DomainError::unauthenticated(LOGIN_REQUIRED))?;

        let claims = self.jwt.validate(token)?;
        let user_id = claims
            .user_id()
            .map_err(|_| DomainError::unauthenticated(LOGIN_REQUIRED))?;

        match self.users.get(&user_id).await? {
            Some(user) => Ok(user),
            None => {
                debug!(user_id = %user_id, "Token refers to a deleted user");
                Err(DomainError::unauthenticated(LOGIN_REQUIRED))
            }
        }
    }

    /// Check an authenticated user against an allow-list of roles
    pub fn authorize(user: &User, allowed: &[Role]) -> Result<(), DomainError> {
        if user.has_role(allowed) {
            Ok(())
        } else {
            Err(DomainError::forbidden(format!(
                "Role({}) is not allowed to access this resource.",
                user.role()
            )))
        }
    }
}
