//! Error types for the OP3Nvoice client.

use serde_json::Value;
use std::fmt;
use thiserror::Error;

/// Errors that can occur when calling the OP3Nvoice API.
#[derive(Error, Debug)]
pub enum O3vError {
    /// The API answered with a status outside the accepted range
    #[error("{0}")]
    Api(ApiError),

    /// A response body could not be decoded
    #[error("{message}: {source}")]
    Data {
        message: String,
        payload: String,
        #[source]
        source: serde_json::Error,
    },

    /// A request was attempted before an API key was set
    #[error("No API key has been set on the connection")]
    MissingKey,

    /// The configured API URL is not usable
    #[error("Invalid API URL: {0}")]
    InvalidUrl(String),

    /// An argument failed validation before any request was sent
    #[error("Invalid argument: {0}")]
    InvalidArgument(String),

    /// The HTTP exchange itself failed
    #[error("HTTP request failed: {0}")]
    Transport(#[from] reqwest::Error),
}

impl O3vError {
    pub(crate) fn data(payload: &str, source: serde_json::Error) -> Self {
        O3vError::Data {
            message: "Unable to convert JSON response to a data structure".to_string(),
            payload: payload.to_string(),
            source,
        }
    }

    /// The raw body that failed to decode, for data errors.
    pub fn offending_data(&self) -> Option<&str> {
        match self {
            O3vError::Data { payload, .. } => Some(payload),
            _ => None,
        }
    }

    /// The API error details, for API errors.
    pub fn api_error(&self) -> Option<&ApiError> {
        match self {
            O3vError::Api(error) => Some(error),
            _ => None,
        }
    }
}

/// Result type for OP3Nvoice operations.
pub type Result<T> = std::result::Result<T, O3vError>;

/// Fields of a JSON error body. Each is read on its own so that one field of
/// an unexpected type does not hide the others.
#[derive(Debug, Clone, Default)]
struct ErrorBody {
    status: Option<String>,
    message: Option<String>,
    code: Option<i64>,
}

impl ErrorBody {
    fn parse(body: &str) -> Option<Self> {
        let object = match serde_json::from_str::<Value>(body).ok()? {
            Value::Object(object) => object,
            _ => return None,
        };

        Some(ErrorBody {
            status: object.get("status").and_then(text_field),
            message: object.get("message").and_then(text_field),
            code: object.get("code").and_then(code_field),
        })
    }
}

fn text_field(value: &Value) -> Option<String> {
    match value {
        Value::String(s) => Some(s.clone()),
        Value::Number(n) => Some(n.to_string()),
        Value::Bool(b) => Some(b.to_string()),
        _ => None,
    }
}

fn code_field(value: &Value) -> Option<i64> {
    match value {
        Value::Number(n) => n.as_i64(),
        Value::String(s) => s.trim().parse().ok(),
        _ => None,
    }
}

/// An unexpected HTTP status from the API, with the body that came with it.
#[derive(Debug, Clone)]
pub struct ApiError {
    http_status: u16,
    body: String,
    details: Option<ErrorBody>,
}

impl ApiError {
    pub fn new(http_status: u16, body: impl Into<String>) -> Self {
        let body = body.into();
        // Error bodies that are not JSON are kept raw
        let details = ErrorBody::parse(&body);

        ApiError {
            http_status,
            body,
            details,
        }
    }

    /// The HTTP status code of the response.
    pub fn http_status(&self) -> u16 {
        self.http_status
    }

    /// The raw response body.
    pub fn body(&self) -> &str {
        &self.body
    }

    /// The `status` field of the JSON error body.
    pub fn status(&self) -> Option<&str> {
        self.details.as_ref().and_then(|d| d.status.as_deref())
    }

    /// The `message` field of the JSON error body.
    pub fn message(&self) -> Option<&str> {
        self.details.as_ref().and_then(|d| d.message.as_deref())
    }

    /// The `code` field of the JSON error body. Should match the HTTP status.
    pub fn code(&self) -> Option<i64> {
        self.details.as_ref().and_then(|d| d.code)
    }

    /// True when the server rejected a stale version.
    pub fn is_conflict(&self) -> bool {
        self.http_status == 409
    }
}

impl fmt::Display for ApiError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.message() {
            Some(message) => write!(f, "API error ({}): {}", self.http_status, message),
            None if self.body.is_empty() => write!(f, "API error ({})", self.http_status),
            None => write!(f, "API error ({}): {}", self.http_status, self.body),
        }
    }
}

impl std::error::Error for ApiError {}
