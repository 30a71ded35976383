use harvest_common::api_error::ApiErrorBody;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum ClientError {
    #[error("request failed: {0}")]
    Transport(#[from] reqwest::Error),

    #[error("HTTP {status}: {}", .body.message().unwrap_or("no message"))]
    Api { status: u16, body: ApiErrorBody },

    #[error("could not decode response: {0}")]
    Decode(#[from] serde_json::Error),

    #[error("not signed in")]
    NotAuthenticated,

    #[error("storage error: {0}")]
    Storage(String),

    #[error("{0}")]
    Invalid(String),

    #[error("{0}")]
    NotFound(String),
}

pub type Result<T> = std::result::Result<T, ClientError>;

impl ClientError {
    pub fn status(&self) -> Option<u16> {
        match self {
            ClientError::Api { status, .. } => Some(*status),
            ClientError::Transport(e) => e.status().map(|s| s.as_u16()),
            _ => None,
        }
    }

    pub fn is_not_found(&self) -> bool {
        matches!(self, ClientError::NotFound(_)) || self.status() == Some(404)
    }

    /// The one line shown to the user: the server's message when it sent
    /// one, our own for local failures, otherwise `fallback`.
    pub fn user_message(&self, fallback: &str) -> String {
        match self {
            ClientError::Api { body, .. } => body.message().unwrap_or(fallback).to_string(),
            ClientError::Invalid(msg) | ClientError::NotFound(msg) => msg.clone(),
            _ => fallback.to_string(),
        }
    }

    /// Per-field messages from a backend validation failure.
    pub fn field_errors(&self) -> Option<&std::collections::BTreeMap<String, String>> {
        match self {
            ClientError::Api { body, .. } if !body.errors.is_empty() => Some(&body.errors),
            _ => None,
        }
    }
}
