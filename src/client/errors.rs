use crate::types::FieldError;
use reqwest::StatusCode;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use thiserror::Error;

/// Uniform shape of every non-success response. `message` is always populated.
#[derive(Error, Serialize, Deserialize, Debug, Clone, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
#[error("{message} ({status})")]
pub struct NormalizedError {
    pub status: u16,
    pub message: String,
    pub field_errors: Vec<FieldError>,
}

impl NormalizedError {
    /// Build from a status and a raw body that may or may not be JSON.
    ///
    /// The body's `message` wins over the status reason phrase; `fieldErrors` is used only
    /// when it is a non-empty list of `{field, message}` entries.
    #[must_use]
    pub fn from_response(status: StatusCode, body: &[u8]) -> Self {
        let body: Value = serde_json::from_slice(body).unwrap_or(Value::Null);

        let message = body
            .get("message")
            .and_then(Value::as_str)
            .map_or_else(|| status_text(status), str::to_string);

        let field_errors = body
            .get("fieldErrors")
            .cloned()
            .and_then(|value| serde_json::from_value::<Vec<FieldError>>(value).ok())
            .unwrap_or_default();

        Self {
            status: status.as_u16(),
            message,
            field_errors,
        }
    }
}

/// Standard reason phrase, or the numeric code for statuses without one.
fn status_text(status: StatusCode) -> String {
    status
        .canonical_reason()
        .map_or_else(|| status.as_str().to_string(), str::to_string)
}

#[derive(Debug, Error)]
pub enum ClientError {
    #[error("Request failed ({}): {}", .0.status, .0.message)]
    Http(#[from] NormalizedError),
    #[error("Unable to reach the server: {0}")]
    Network(#[from] reqwest::Error),
    #[error("Request error: {0}")]
    Encode(#[source] serde_json::Error),
    #[error("Response error: {0}")]
    Decode(#[source] serde_json::Error),
    #[error("Invalid request URL: {0}")]
    Url(String),
}

impl ClientError {
    /// The normalized error when the server answered with a non-success status.
    #[must_use]
    pub const fn normalized(&self) -> Option<&NormalizedError> {
        match self {
            Self::Http(err) => Some(err),
            _ => None,
        }
    }
}
