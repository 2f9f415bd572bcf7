use serde::Deserialize;

use crate::infrastructure::auth::{JwtConfig, ResetTokenConfig};
use crate::infrastructure::email::SmtpConfig;

/// Application configuration
#[derive(Debug, Clone, Deserialize, Default)]
#[serde(default)]
pub struct AppConfig {
    pub server: ServerConfig,
    pub logging: LoggingConfig,
    pub environment: Environment,
    pub auth: AuthSettings,
    pub storage: StorageSettings,
    pub geocoder: GeocoderSettings,
    pub email: EmailSettings,
    pub uploads: UploadSettings,
    pub admin: AdminConfig,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct ServerConfig {
    pub host: String,
    pub port: u16,
    /// Base of links sent by email (`https://jobee.example`); the request's
    /// `Host` header is used when unset
    pub public_url: Option<String>,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct LoggingConfig {
    pub level: String,
    pub format: LogFormat,
}

#[derive(Debug, Clone, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum LogFormat {
    #[default]
    Pretty,
    Json,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum Environment {
    #[default]
    Development,
    Production,
}

impl Environment {
    pub fn is_production(&self) -> bool {
        matches!(self, Self::Production)
    }
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct AuthSettings {
    pub jwt_secret: String,
    pub jwt_expiration_hours: u64,
    pub cookie_expires_days: i64,
    pub reset_token_secret: String,
    pub reset_token_ttl_minutes: i64,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct StorageSettings {
    pub backend: String,
    pub database_url: Option<String>,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct GeocoderSettings {
    pub provider: String,
    pub api_key: Option<String>,
    pub base_url: Option<String>,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct EmailSettings {
    pub provider: String,
    pub smtp_host: String,
    pub smtp_port: u16,
    pub smtp_user: String,
    pub smtp_pass: String,
    pub from_name: String,
    pub from_email: String,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct UploadSettings {
    pub dir: String,
    pub max_resume_bytes: u64,
}

/// Bootstrap admin; created at startup when both fields are set
#[derive(Debug, Clone, Deserialize, Default)]
#[serde(default)]
pub struct AdminConfig {
    pub email: Option<String>,
    pub password: Option<String>,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: "0.0.0.0".to_string(),
            port: 3000,
            public_url: None,
        }
    }
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: "info".to_string(),
            format: LogFormat::default(),
        }
    }
}

impl Default for AuthSettings {
    fn default() -> Self {
        Self {
            jwt_secret: "change-me-in-production".to_string(),
            jwt_expiration_hours: 24 * 7,
            cookie_expires_days: 7,
            reset_token_secret: "change-me-too".to_string(),
            reset_token_ttl_minutes: 30,
        }
    }
}

impl Default for StorageSettings {
    fn default() -> Self {
        Self {
            backend: "memory".to_string(),
            database_url: None,
        }
    }
}

impl Default for GeocoderSettings {
    fn default() -> Self {
        Self {
            provider: "static".to_string(),
            api_key: None,
            base_url: None,
        }
    }
}

impl Default for EmailSettings {
    fn default() -> Self {
        Self {
            provider: "log".to_string(),
            smtp_host: "localhost".to_string(),
            smtp_port: 2525,
            smtp_user: String::new(),
            smtp_pass: String::new(),
            from_name: "Jobee".to_string(),
            from_email: "noreply@jobee.com".to_string(),
        }
    }
}

impl Default for UploadSettings {
    fn default() -> Self {
        Self {
            dir: "public/uploads".to_string(),
            max_resume_bytes: 2 * 1024 * 1024,
        }
    }
}

impl AuthSettings {
    pub fn jwt(&self) -> JwtConfig {
        JwtConfig::new(self.jwt_secret.clone(), self.jwt_expiration_hours)
    }

    pub fn reset_token(&self) -> ResetTokenConfig {
        ResetTokenConfig::new(self.reset_token_secret.clone(), self.reset_token_ttl_minutes)
    }
}

impl EmailSettings {
    pub fn smtp(&self) -> SmtpConfig {
        SmtpConfig {
            host: self.smtp_host.clone(),
            port: self.smtp_port,
            user: self.smtp_user.clone(),
            pass: self.smtp_pass.clone(),
            from_name: self.from_name.clone(),
            from_email: self.from_email.clone(),
        }
    }
}

impl AdminConfig {
    /// Email and password when both are configured
    pub fn credentials(&self) -> Option<(&str, &str)> {
        match (self.email.as_deref(), self.password.as_deref()) {
            (Some(email), Some(password)) if !email.is_empty() && !password.is_empty() => {
                Some((email, password))
            }
            _ => None,
        }
    }
}

impl AppConfig {
    pub fn load() -> Result<Self, config::ConfigError> {
        let config = config::Config::builder()
            .add_source(config::File::with_name("config/default").required(false))
            .add_source(config::File::with_name("config/local").required(false))
            .add_source(
                config::Environment::with_prefix("APP")
                    .separator("__")
                    .try_parsing(true),
            )
            .build()?;

        config.try_deserialize()
    }
}
