//! Error types for the Jira adapter.

use reqwest::StatusCode;
use serde_json::Value;
use toolrelay_mcp::ConfigError;

/// Result type for Jira operations.
pub type JiraResult<T> = Result<T, JiraError>;

#[derive(Debug, thiserror::Error)]
pub enum JiraError {
    /// Required settings are absent or malformed.
    #[error(transparent)]
    Config(#[from] ConfigError),

    /// HTTP request failed before a response arrived.
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    /// Jira answered with a non-2xx status.
    #[error("Jira API {status} {reason}: {message}")]
    Api {
        status: u16,
        reason: String,
        message: String,
    },

    /// A `started` value that is neither offset-bearing nor a local date-time.
    #[error("invalid started value: {0}")]
    InvalidStarted(String),

    /// The configured base URL cannot carry API paths.
    #[error("invalid JIRA_BASE_URL: {0}")]
    InvalidBaseUrl(String),

    /// Response body did not have the expected shape.
    #[error("unexpected Jira response: {0}")]
    Decode(#[from] serde_json::Error),
}

impl JiraError {
    /// Build an API error from a status code and the raw response body.
    ///
    /// Prefers `errorMessages`, then `errors`, then the body text, then the
    /// status reason.
    pub fn from_response(status: StatusCode, body: &str) -> Self {
        let reason = status.canonical_reason().unwrap_or_default().to_string();
        let parsed: Option<Value> = serde_json::from_str(body).ok();

        let error_messages = parsed
            .as_ref()
            .and_then(|v| v.get("errorMessages"))
            .and_then(Value::as_array)
            .filter(|list| !list.is_empty());
        let errors = parsed
            .as_ref()
            .and_then(|v| v.get("errors"))
            .filter(|v| !v.is_null());

        let message = if let Some(list) = error_messages {
            list.iter()
                .map(|m| match m {
                    Value::String(s) => s.clone(),
                    other => other.to_string(),
                })
                .collect::<Vec<_>>()
                .join(" | ")
        } else if let Some(errors) = errors {
            match errors {
                Value::String(s) => s.clone(),
                other => other.to_string(),
            }
        } else if !body.is_empty() {
            body.to_string()
        } else {
            reason.clone()
        };

        Self::Api {
            status: status.as_u16(),
            reason,
            message,
        }
    }
}
