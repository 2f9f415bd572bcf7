//! Application state shared by every handler

use std::sync::Arc;

use crate::infrastructure::auth::AuthGate;
use crate::infrastructure::job::JobService;
use crate::infrastructure::user::UserService;

/// Attributes of the `token` session cookie
#[derive(Debug, Clone, Copy)]
pub struct CookieSettings {
    pub expires_days: i64,
    /// Adds `Secure` (production only)
    pub secure: bool,
}

impl CookieSettings {
    pub fn new(expires_days: i64, secure: bool) -> Self {
        Self {
            expires_days,
            secure,
        }
    }
}

#[derive(Debug, Clone)]
pub struct AppState {
    pub users: Arc<UserService>,
    pub jobs: Arc<JobService>,
    pub gate: AuthGate,
    pub cookies: CookieSettings,
    /// Configured public base URL for emailed links
    pub public_url: Option<String>,
}

impl AppState {
    pub fn new(
        users: Arc<UserService>,
        jobs: Arc<JobService>,
        gate: AuthGate,
        cookies: CookieSettings,
    ) -> Self {
        Self {
            users,
            jobs,
            gate,
            cookies,
            public_url: None,
        }
    }

    pub fn with_public_url(mut self, public_url: Option<String>) -> Self {
        self.public_url = public_url
            .map(|url| url.trim_end_matches('/').to_string())
            .filter(|url| !url.is_empty());
        self
    }
}
