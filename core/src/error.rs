//! Error types for the Findings and Notifications clients.
//!
//! # Design
//! Four failure kinds matter to callers and each gets its own variant:
//! client-side precondition failures that never reach the network
//! (`MissingParameter`, `InvalidParameter`), remote rejections with a status
//! code (`Http`), failures where no response was obtained (`Transport`), and
//! 2xx responses whose body does not match the declared shape
//! (`MalformedResponse`). Callers that do not branch on the kind can still read
//! a status through [`ApiError::status`].

use serde_json::Value;
use thiserror::Error;

pub type Result<T> = std::result::Result<T, ApiError>;

/// Errors returned by every client operation.
#[derive(Debug, Error)]
pub enum ApiError {
    /// A path parameter or declared-required field was absent or empty.
    #[error("missing required parameter `{0}`")]
    MissingParameter(&'static str),

    /// A parameter was present but violates the operation's shape rules.
    #[error("invalid parameter `{name}`: {reason}")]
    InvalidParameter { name: &'static str, reason: String },

    /// The service answered with a status outside 2xx.
    #[error("HTTP {status}: {}", .body.summary())]
    Http { status: u16, body: ErrorBody },

    /// No response was obtained (DNS, connection refused, TLS, timeout).
    #[error("transport error: {0}")]
    Transport(String),

    /// A 2xx response whose body could not be parsed as declared.
    #[error("malformed response: {0}")]
    MalformedResponse(String),

    /// The request payload could not be serialized to JSON.
    #[error("serialization failed: {0}")]
    Serialization(String),

    /// The authenticator could not produce an authorization header.
    #[error("authentication failed: {0}")]
    Authentication(String),

    /// Client configuration could not be loaded.
    #[error("configuration error: {0}")]
    Configuration(String),
}

impl ApiError {
    /// Remote HTTP status, when a response was received.
    pub fn status(&self) -> Option<u16> {
        match self {
            ApiError::Http { status, .. } => Some(*status),
            _ => None,
        }
    }

    pub fn is_not_found(&self) -> bool {
        self.status() == Some(404)
    }

    /// Structured error body of an `Http` error.
    pub fn body(&self) -> Option<&ErrorBody> {
        match self {
            ApiError::Http { body, .. } => Some(body),
            _ => None,
        }
    }
}

/// Body of a non-2xx response: the raw text and, when it parsed, the JSON.
#[derive(Debug, Clone, PartialEq)]
pub struct ErrorBody {
    pub raw: String,
    pub json: Option<Value>,
}

impl ErrorBody {
    pub fn from_raw(raw: String) -> Self {
        let json = serde_json::from_str(&raw).ok();
        Self { raw, json }
    }

    /// Error message reported by the service, if the body carries one.
    ///
    /// Looks at `message`, `error`, `errorMessage` and `errors[0].message`.
    pub fn message(&self) -> Option<&str> {
        let json = self.json.as_ref()?;
        ["message", "error", "errorMessage"]
            .iter()
            .find_map(|key| json.get(key).and_then(Value::as_str))
            .or_else(|| {
                json.get("errors")
                    .and_then(|errors| errors.get(0))
                    .and_then(|first| first.get("message"))
                    .and_then(Value::as_str)
            })
    }

    fn summary(&self) -> &str {
        match self.message() {
            Some(message) => message,
            None if self.raw.is_empty() => "<empty body>",
            None => &self.raw,
        }
    }
}
