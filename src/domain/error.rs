use thiserror::Error;

/// Core domain errors
#[derive(Debug, Error)]
pub enum DomainError {
    #[error("Validation error: {}", .messages.join(", "))]
    Validation { messages: Vec<String> },

    #[error("Not found: {message}")]
    NotFound { message: String },

    #[error("Unauthenticated: {message}")]
    Unauthenticated { message: String },

    #[error("Forbidden: {message}")]
    Forbidden { message: String },

    #[error("Duplicate key: {field}")]
    DuplicateKey { field: String },

    #[error("Invalid reference: {field}")]
    InvalidReference { field: String },

    #[error("Password reset token is invalid or has expired")]
    InvalidOrExpiredToken,

    #[error("Email delivery failed: {message}")]
    EmailDeliveryFailed { message: String },

    #[error("Invalid query: {message}")]
    InvalidQuery { message: String },

    #[error("Bad request: {message}")]
    BadRequest { message: String },

    #[error("Provider error: {provider} - {message}")]
    Provider { provider: String, message: String },

    #[error("Configuration error: {message}")]
    Configuration { message: String },

    #[error("Storage error: {message}")]
    Storage { message: String },

    #[error("Internal error: {message}")]
    Internal { message: String },
}

impl DomainError {
    pub fn validation(message: impl Into<String>) -> Self {
        Self::Validation {
            messages: vec![message.into()],
        }
    }

    /// Validation failure carrying one message per violated field
    pub fn validation_messages(messages: Vec<String>) -> Self {
        Self::Validation { messages }
    }

    pub fn not_found(message: impl Into<String>) -> Self {
        Self::NotFound {
            message: message.into(),
        }
    }

    pub fn unauthenticated(message: impl Into<String>) -> Self {
        Self::Unauthenticated {
            message: message.into(),
        }
    }

    pub fn forbidden(message: impl Into<String>) -> Self {
        Self::Forbidden {
            message: message.into(),
        }
    }

    pub fn duplicate_key(field: impl Into<String>) -> Self {
        Self::DuplicateKey {
            field: field.into(),
        }
    }

    pub fn invalid_reference(field: impl Into<String>) -> Self {
        Self::InvalidReference {
            field: field.into(),
        }
    }

    pub fn email_delivery(message: impl Into<String>) -> Self {
        Self::EmailDeliveryFailed {
            message: message.into(),
        }
    }

    pub fn invalid_query(message: impl Into<String>) -> Self {
        Self::InvalidQuery {
            message: message.into(),
        }
    }

    pub fn bad_request(message: impl Into<String>) -> Self {
        Self::BadRequest {
            message: message.into(),
        }
    }

    pub fn provider(provider: impl Into<String>, message: impl Into<String>) -> Self {
        Self::Provider {
            provider: provider.into(),
            message: message.into(),
        }
    }

    pub fn configuration(message: impl Into<String>) -> Self {
        Self::Configuration {
            message: message.into(),
        }
    }

    pub fn storage(message: impl Into<String>) -> Self {
        Self::Storage {
            message: message.into(),
        }
    }

    pub fn internal(message: impl Into<String>) -> Self {
        Self::Internal {
            message: message.into(),
        }
    }

    /// Stable machine-readable name of the error kind
    pub fn kind(&self) -> &'static str {
        match self {
            Self::Validation { .. } => "ValidationError",
            Self::NotFound { .. } => "NotFound",
            Self::Unauthenticated { .. } => "Unauthenticated",
            Self::Forbidden { .. } => "Forbidden",
            Self::DuplicateKey { .. } => "DuplicateKey",
            Self::InvalidReference { .. } => "InvalidReference",
            Self::InvalidOrExpiredToken => "InvalidOrExpiredToken",
            Self::EmailDeliveryFailed { .. } => "EmailDeliveryFailed",
            Self::InvalidQuery { .. } => "InvalidQuery",
            Self::BadRequest { .. } => "BadRequest",
            Self::Provider { .. }
            | Self::Configuration { .. }
            | Self::Storage { .. }
            | Self::Internal { .. } => "InternalError",
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_not_found_error() {
        let error = DomainError::not_found("Job '42' not found");
        assert_eq!(error.to_string(), "Not found: Job '42' not found");
    }

    #[test]
    fn test_validation_messages_are_joined() {
        let error = DomainError::validation_messages(vec![
            "please enter your name".to_string(),
            "please enter your email".to_string(),
        ]);
        assert_eq!(
            error.to_string(),
            "Validation error: please enter your name, please enter your email"
        );
    }

    #[test]
    fn test_error_kinds() {
        assert_eq!(DomainError::duplicate_key("email").kind(), "DuplicateKey");
        assert_eq!(DomainError::InvalidOrExpiredToken.kind(), "InvalidOrExpiredToken");
        assert_eq!(DomainError::storage("boom").kind(), "InternalError");
    }
}
