//! Centralized error types for the Heimdall workspace.

use serde::{Deserialize, Serialize};
use serde_json::Value;
use thiserror::Error;

/// HTTP status the API uses for validation failures.
pub const VALIDATION_STATUS: u16 = 400;

/// Error payload returned by the Heimdall API on non-2xx responses.
///
/// Every field is optional: gateways and proxies in front of the API do not
/// always produce the full shape. `timestamp` is kept as raw JSON since the
/// backend serializes dates either as ISO strings or as component arrays.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ErrorBody {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub timestamp: Option<Value>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub code: Option<u16>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub exception: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub message: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub path: Option<String>,
}

impl ErrorBody {
    /// Parse a response body. When the payload is a JSON object that does not
    /// fit the typed shape, its string `message` is still recovered.
    pub fn parse(text: &str) -> Option<Self> {
        if let Ok(body) = serde_json::from_str::<Self>(text) {
            return Some(body);
        }
        match serde_json::from_str::<Value>(text).ok()? {
            Value::Object(fields) => Some(Self {
                message: fields.get("message").and_then(Value::as_str).map(str::to_string),
                ..Self::default()
            }),
            _ => None,
        }
    }
}

/// Top-level error enum. Variants map to failure sources.
#[derive(Debug, Error)]
#[non_exhaustive]
pub enum HeimdallError {
    /// The API answered with a non-success status.
    #[error("API error: HTTP {status}{}", body_suffix(.body))]
    Api {
        status: u16,
        body: Option<ErrorBody>,
    },

    /// No response was received (connect, TLS, or I/O failure).
    #[error("Transport error: {0}")]
    Transport(String),

    #[error("Decode error: {0}")]
    Decode(String),

    #[error("Invalid input: {0}")]
    InvalidInput(String),
}

impl HeimdallError {
    /// HTTP status carried by the failure, if a response was received.
    pub fn status(&self) -> Option<u16> {
        match self {
            Self::Api { status, .. } => Some(*status),
            _ => None,
        }
    }

    /// `true` for validation rejections (HTTP 400).
    pub fn is_validation(&self) -> bool {
        self.status() == Some(VALIDATION_STATUS)
    }

    /// Message from the structured error body, if there is one.
    pub fn body_message(&self) -> Option<&str> {
        match self {
            Self::Api {
                body: Some(body), ..
            } => body.message.as_deref(),
            _ => None,
        }
    }
}

impl From<serde_json::Error> for HeimdallError {
    fn from(e: serde_json::Error) -> Self {
        Self::Decode(e.to_string())
    }
}

fn body_suffix(body: &Option<ErrorBody>) -> String {
    match body.as_ref().and_then(|b| b.message.as_deref()) {
        Some(msg) => format!(": {msg}"),
        None => String::new(),
    }
}

pub type HeimdallResult<T> = Result<T, HeimdallError>;
