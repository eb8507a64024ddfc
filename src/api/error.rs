//! Failure types raised by the user service and the normalizer that turns
//! them into one user-facing message.
//!
//! Every failure the service can produce ends up as exactly one
//! [`NormalizedError`]; [`normalize`] never fails.

use std::collections::BTreeMap;

use serde_json::Value;
use thiserror::Error;

/// Shown when nothing more specific can be said about a failure.
pub const FALLBACK_MESSAGE: &str = "Unable to connect to the server.";

const UNREACHABLE_MESSAGE: &str =
    "Can't reach the server. Check your internet or ensure the backend is running.";
const TIMEOUT_MESSAGE: &str = "The server did not respond in time. Please try again.";
const NOT_FOUND_MESSAGE: &str = "User not found.";
const CONFLICT_MESSAGE: &str = "This record already exists.";
const SERVER_ERROR_MESSAGE: &str = "An error occurred on the server.";
const INVALID_REQUEST_MESSAGE: &str = "Invalid request";
const SERVER_ERROR_PREFIX: &str = "Server error";

/// Why a request never produced an HTTP status.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum NetworkFailure {
    /// Connection refused, DNS failure, TLS handshake failure.
    Connect,
    /// The configured request timeout expired.
    Timeout,
    /// The server rejected this client's origin.
    CrossOrigin { origin: String },
    Other,
}

/// Failure raised by [`crate::api::UserApi`] operations.
#[derive(Debug, Error, Clone, PartialEq)]
pub enum ApiError {
    /// The server answered with a non-success status.
    #[error("{message}")]
    Status {
        status: u16,
        message: String,
        /// Parsed JSON error body, if the response declared one and it parsed.
        data: Option<Value>,
    },
    /// No response was received.
    #[error("network failure: {reason}")]
    Network { kind: NetworkFailure, reason: String },
    /// A success response whose body was not the expected JSON shape.
    #[error("unexpected response body: {reason}")]
    Decode { reason: String },
}

impl ApiError {
    pub fn status(&self) -> Option<u16> {
        match self {
            ApiError::Status { status, .. } => Some(*status),
            ApiError::Network { .. } | ApiError::Decode { .. } => None,
        }
    }

    /// Build the failure for a non-success response, deriving the message from the status.
    pub fn from_response(status: u16, data: Option<Value>) -> Self {
        ApiError::Status { status, message: status_message(status, data.as_ref()), data }
    }
}

impl From<reqwest::Error> for ApiError {
    fn from(err: reqwest::Error) -> Self {
        let kind = if err.is_timeout() {
            NetworkFailure::Timeout
        } else if err.is_connect() {
            NetworkFailure::Connect
        } else {
            NetworkFailure::Other
        };
        ApiError::Network { kind, reason: err.to_string() }
    }
}

/// Failure categories shown to the operator.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum ErrorCategory {
    Validation,
    NotFound,
    Conflict,
    ServerError,
    NetworkUnreachable,
    Unknown,
}

/// Uniform failure representation consumed by the controllers.
#[derive(Clone, Debug, Error, PartialEq, Eq)]
pub enum NormalizedError {
    /// 400. `field_errors` is empty when the body carried no per-field map.
    #[error("{message}")]
    Validation { message: String, field_errors: BTreeMap<String, Vec<String>> },
    /// 404, often a benign "no match".
    #[error("{message}")]
    NotFound { message: String },
    /// 409, duplicate entity.
    #[error("{message}")]
    Conflict { message: String },
    /// 500.
    #[error("{message}")]
    ServerError { message: String },
    /// No response, including timeouts and cross-origin rejections.
    #[error("{message}")]
    NetworkUnreachable { message: String },
    /// Any other status, or an undecodable success body.
    #[error("{message}")]
    Unknown { status: Option<u16>, message: String },
}

impl NormalizedError {
    pub fn category(&self) -> ErrorCategory {
        match self {
            NormalizedError::Validation { .. } => ErrorCategory::Validation,
            NormalizedError::NotFound { .. } => ErrorCategory::NotFound,
            NormalizedError::Conflict { .. } => ErrorCategory::Conflict,
            NormalizedError::ServerError { .. } => ErrorCategory::ServerError,
            NormalizedError::NetworkUnreachable { .. } => ErrorCategory::NetworkUnreachable,
            NormalizedError::Unknown { .. } => ErrorCategory::Unknown,
        }
    }

    pub fn message(&self) -> &str {
        match self {
            NormalizedError::Validation { message, .. }
            | NormalizedError::NotFound { message }
            | NormalizedError::Conflict { message }
            | NormalizedError::ServerError { message }
            | NormalizedError::NetworkUnreachable { message }
            | NormalizedError::Unknown { message, .. } => message,
        }
    }

    pub fn field_errors(&self) -> Option<&BTreeMap<String, Vec<String>>> {
        match self {
            NormalizedError::Validation { field_errors, .. } if !field_errors.is_empty() => {
                Some(field_errors)
            }
            _ => None,
        }
    }
}

/// Map any service failure to exactly one [`NormalizedError`].
pub fn normalize(err: &ApiError) -> NormalizedError {
    match err {
        ApiError::Status { status, message, data } => normalize_status(*status, message, data.as_ref()),
        ApiError::Network { kind, .. } => {
            let message = match kind {
                NetworkFailure::CrossOrigin { origin } => {
                    format!("Connection blocked (CORS). Please allow {origin} on the server.")
                }
                NetworkFailure::Timeout => TIMEOUT_MESSAGE.to_string(),
                NetworkFailure::Connect | NetworkFailure::Other => UNREACHABLE_MESSAGE.to_string(),
            };
            NormalizedError::NetworkUnreachable { message }
        }
        ApiError::Decode { reason } => {
            let message = if reason.trim().is_empty() {
                FALLBACK_MESSAGE.to_string()
            } else {
                format!("Unexpected response from the server: {reason}")
            };
            NormalizedError::Unknown { status: None, message }
        }
    }
}

fn normalize_status(status: u16, message: &str, data: Option<&Value>) -> NormalizedError {
    let message = message.trim();
    let or_default = |default: &str| {
        if message.is_empty() { default.to_string() } else { message.to_string() }
    };
    match status {
        400 => {
            let field_errors = field_errors(data);
            let message = if !field_errors.is_empty() {
                render_field_errors(&field_errors)
            } else if message.is_empty() {
                status_message(400, data)
            } else {
                message.to_string()
            };
            NormalizedError::Validation { message, field_errors }
        }
        404 => NormalizedError::NotFound { message: or_default(NOT_FOUND_MESSAGE) },
        409 => NormalizedError::Conflict { message: or_default(CONFLICT_MESSAGE) },
        500 => {
            let message = if message.starts_with(SERVER_ERROR_PREFIX) {
                message.to_string()
            } else if message.is_empty() {
                status_message(500, data)
            } else {
                format!("{SERVER_ERROR_PREFIX}: {message}")
            };
            NormalizedError::ServerError { message }
        }
        other => {
            let message = if message.is_empty() { format!("Error: {other}") } else { message.to_string() };
            NormalizedError::Unknown { status: Some(other), message }
        }
    }
}

/// Per-status message for a failed response, as carried by [`ApiError::Status`].
pub fn status_message(status: u16, data: Option<&Value>) -> String {
    let body_message = body_message(data);
    match status {
        400 => {
            let fields = field_errors(data);
            if fields.is_empty() {
                format!("Validation error: {}", body_message.unwrap_or(INVALID_REQUEST_MESSAGE))
            } else {
                render_field_errors(&fields)
            }
        }
        404 => body_message.unwrap_or(NOT_FOUND_MESSAGE).to_string(),
        409 => body_message.unwrap_or(CONFLICT_MESSAGE).to_string(),
        500 => format!("{SERVER_ERROR_PREFIX}: {}", body_message.unwrap_or(SERVER_ERROR_MESSAGE)),
        other => body_message.map_or_else(|| format!("Error: {other}"), str::to_string),
    }
}

fn render_field_errors(fields: &BTreeMap<String, Vec<String>>) -> String {
    let lines: Vec<String> =
        fields.iter().map(|(field, msgs)| format!("{field}: {}", msgs.join(", "))).collect();
    format!("Validation errors:\n{}", lines.join("\n"))
}

fn body_message(data: Option<&Value>) -> Option<&str> {
    let data = data?;
    data.get("message")
        .or_else(|| data.get("Message"))
        .and_then(Value::as_str)
        .filter(|m| !m.trim().is_empty())
}

/// Extract the `errors` map of a validation body. Values may be a list of strings or a single string.
fn field_errors(data: Option<&Value>) -> BTreeMap<String, Vec<String>> {
    let Some(errors) = data.and_then(|d| d.get("errors")).and_then(Value::as_object) else {
        return BTreeMap::new();
    };
    errors
        .iter()
        .map(|(field, msgs)| {
            let msgs = match msgs {
                Value::Array(items) => items
                    .iter()
                    .map(|m| m.as_str().map_or_else(|| m.to_string(), str::to_string))
                    .collect(),
                Value::String(s) => vec![s.clone()],
                other => vec![other.to_string()],
            };
            (field.clone(), msgs)
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn validation_with_field_map_renders_one_line_per_field() {
        let err = ApiError::from_response(
            400,
            Some(json!({"errors": {"email": ["already taken"], "age": ["too low", "not a number"]}})),
        );
        let n = normalize(&err);
        assert_eq!(n.category(), ErrorCategory::Validation);
        assert!(n.message().contains("email: already taken"));
        assert!(n.message().contains("age: too low, not a number"));
        assert_eq!(n.field_errors().map(|f| f.len()), Some(2));
    }

    #[test]
    fn validation_without_map_uses_body_message() {
        let err = ApiError::from_response(400, Some(json!({"message": "Email is required"})));
        let n = normalize(&err);
        assert_eq!(n.message(), "Validation error: Email is required");
        assert!(n.field_errors().is_none());
    }

    #[test]
    fn not_found_and_conflict_fall_back_to_defaults() {
        assert_eq!(normalize(&ApiError::from_response(404, None)).message(), "User not found.");
        let conflict = normalize(&ApiError::from_response(409, None));
        assert_eq!(conflict.category(), ErrorCategory::Conflict);
        assert_eq!(conflict.message(), "This record already exists.");
    }

    #[test]
    fn server_error_is_always_prefixed() {
        let err = ApiError::Status { status: 500, message: "db down".into(), data: None };
        assert_eq!(normalize(&err).message(), "Server error: db down");
        let built = normalize(&ApiError::from_response(500, Some(json!({"message": "boom"}))));
        assert_eq!(built.message(), "Server error: boom");
    }

    #[test]
    fn other_status_is_unknown_with_raw_code() {
        let n = normalize(&ApiError::from_response(418, None));
        assert_eq!(n, NormalizedError::Unknown { status: Some(418), message: "Error: 418".into() });
        let n = normalize(&ApiError::from_response(503, Some(json!({"Message": "maintenance"}))));
        assert_eq!(n.message(), "maintenance");
    }

    #[test]
    fn network_failures_are_unreachable() {
        let cors = ApiError::Network {
            kind: NetworkFailure::CrossOrigin { origin: "http://localhost:5173".into() },
            reason: "origin rejected".into(),
        };
        let n = normalize(&cors);
        assert_eq!(n.category(), ErrorCategory::NetworkUnreachable);
        assert!(n.message().contains("allow http://localhost:5173"));

        let refused = ApiError::Network { kind: NetworkFailure::Connect, reason: "refused".into() };
        assert!(normalize(&refused).message().starts_with("Can't reach the server"));
    }

    #[test]
    fn empty_decode_reason_uses_fallback() {
        let n = normalize(&ApiError::Decode { reason: String::new() });
        assert_eq!(n.message(), FALLBACK_MESSAGE);
    }
}
