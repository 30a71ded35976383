use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

/// Error body returned by the backend. Both the validation shape
/// (`message`, `errors`, `errorCode`) and the plain shape (`message`,
/// `details`) decode into this.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ApiErrorBody {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub message: Option<String>,
    #[serde(default, skip_serializing_if = "BTreeMap::is_empty")]
    pub errors: BTreeMap<String, String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error_code: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub details: Option<String>,
}

impl ApiErrorBody {
    /// Lenient parse; bodies that are not JSON objects give `None`.
    pub fn parse(body: &str) -> Option<Self> {
        serde_json::from_str(body).ok()
    }

    /// The server's message, if it sent a non-empty one.
    pub fn message(&self) -> Option<&str> {
        self.message.as_deref().filter(|m| !m.trim().is_empty())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_validation_body() {
        let body = r#"{"timestamp":"2024-01-01T00:00:00","message":"Validation failed",
            "errors":{"email":"must be a well-formed email address"},"errorCode":"VALIDATION_ERROR"}"#;
        let parsed = ApiErrorBody::parse(body).unwrap();
        assert_eq!(parsed.message(), Some("Validation failed"));
        assert_eq!(parsed.errors["email"], "must be a well-formed email address");
        assert_eq!(parsed.error_code.as_deref(), Some("VALIDATION_ERROR"));
    }

    #[test]
    fn test_details_body_and_garbage() {
        let parsed = ApiErrorBody::parse(r#"{"message":"","details":"uri=/api/batches/9"}"#).unwrap();
        assert_eq!(parsed.message(), None);
        assert_eq!(parsed.details.as_deref(), Some("uri=/api/batches/9"));
        assert!(ApiErrorBody::parse("<html>502</html>").is_none());
    }
}
