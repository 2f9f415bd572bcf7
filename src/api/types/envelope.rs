//! Success envelope shared by every endpoint

use serde::Serialize;

/// `{success: true, results?, data?, message?, token?}`
#[derive(Debug, Clone, Serialize)]
pub struct Envelope<T = ()> {
    pub success: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub results: Option<usize>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub data: Option<T>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub message: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub token: Option<String>,
}

impl<T> Envelope<T> {
    fn empty() -> Self {
        Self {
            success: true,
            results: None,
            data: None,
            message: None,
            token: None,
        }
    }

    pub fn data(data: T) -> Self {
        Self {
            data: Some(data),
            ..Self::empty()
        }
    }

    /// List payload with its item count
    pub fn list(results: usize, data: T) -> Self {
        Self {
            results: Some(results),
            data: Some(data),
            ..Self::empty()
        }
    }

    pub fn with_message(mut self, message: impl Into<String>) -> Self {
        self.message = Some(message.into());
        self
    }
}

impl Envelope<()> {
    pub fn message(message: impl Into<String>) -> Self {
        Self::empty().with_message(message)
    }

    pub fn token(token: impl Into<String>) -> Self {
        Self {
            token: Some(token.into()),
            ..Self::empty()
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_absent_fields_are_omitted() {
        assert_eq!(
            serde_json::to_value(Envelope::message("Job is deleted.")).unwrap(),
            json!({"success": true, "message": "Job is deleted."})
        );
        assert_eq!(
            serde_json::to_value(Envelope::list(2, vec![1, 2])).unwrap(),
            json!({"success": true, "results": 2, "data": [1, 2]})
        );
        assert_eq!(
            serde_json::to_value(Envelope::token("abc")).unwrap(),
            json!({"success": true, "token": "abc"})
        );
    }
}
