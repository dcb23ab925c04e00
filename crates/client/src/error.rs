//! Error types for the API access layer
//!
//! Two layers of errors exist:
//!
//! - [`ApiException`] models the structured error body the ad API returns for
//!   a rejected call: a list of [`ApiError`] entries with a field path, a
//!   reason code, and the triggering value.
//! - [`ClientError`] is the crate-wide error enum covering everything that
//!   can go wrong on the way to and from the API: credentials, transport,
//!   timeouts, cancellation, and the API exceptions themselves.
//!
//! All of it implements [`ErrorClassification`] so the retry executor can
//! tell transient failures from permanent ones.

use std::fmt;
use std::time::Duration;

use adflux_common::auth::CredentialError;
use adflux_common::error::{ErrorClassification, ErrorSeverity};
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Result type using [`ClientError`]
pub type ClientResult<T> = Result<T, ClientError>;

/// Reason codes attached to individual API errors
///
/// The server vocabulary is open-ended; codes this client does not know
/// deserialize as [`ApiErrorReason::Unknown`] rather than failing the whole
/// response.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ApiErrorReason {
    /// A request field failed validation
    InvalidArgument,
    /// The authenticated principal may not perform this operation
    PermissionDenied,
    /// The access token was missing, expired, or revoked
    AuthenticationFailed,
    /// The referenced entity does not exist
    NotFound,
    /// Too many requests in a short window
    RateExceeded,
    /// A usage quota was exhausted
    QuotaExceeded,
    /// The server failed internally
    InternalError,
    /// Reason code not known to this client version
    #[serde(other)]
    Unknown,
}

impl ApiErrorReason {
    /// Whether a call failing with this reason is worth retrying
    pub fn is_retryable(self) -> bool {
        matches!(self, Self::RateExceeded | Self::QuotaExceeded | Self::InternalError)
    }
}

impl fmt::Display for ApiErrorReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            Self::InvalidArgument => "INVALID_ARGUMENT",
            Self::PermissionDenied => "PERMISSION_DENIED",
            Self::AuthenticationFailed => "AUTHENTICATION_FAILED",
            Self::NotFound => "NOT_FOUND",
            Self::RateExceeded => "RATE_EXCEEDED",
            Self::QuotaExceeded => "QUOTA_EXCEEDED",
            Self::InternalError => "INTERNAL_ERROR",
            Self::Unknown => "UNKNOWN",
        };
        write!(f, "{s}")
    }
}

/// A single error entry inside an API exception
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ApiError {
    /// Dotted path to the offending request field (e.g.
    /// `operations[2].operand.name`)
    #[serde(skip_serializing_if = "Option::is_none")]
    pub field_path: Option<String>,

    /// The value that triggered the error
    #[serde(skip_serializing_if = "Option::is_none")]
    pub trigger: Option<String>,

    /// Machine-readable reason code
    pub reason: ApiErrorReason,

    /// Human-readable description
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error_string: Option<String>,
}

impl ApiError {
    /// Create an error with just a reason and description
    pub fn new(reason: ApiErrorReason, error_string: impl Into<String>) -> Self {
        Self { field_path: None, trigger: None, reason, error_string: Some(error_string.into()) }
    }
}

impl fmt::Display for ApiError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.reason)?;
        if let Some(path) = &self.field_path {
            write!(f, " at {path}")?;
        }
        if let Some(msg) = &self.error_string {
            write!(f, ": {msg}")?;
        }
        Ok(())
    }
}

/// The structured error body returned for a rejected API call
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ApiException {
    pub errors: Vec<ApiError>,
}

impl ApiException {
    /// Whether the whole call may be retried
    ///
    /// A call is retryable only when every contained error is; mixing a
    /// transient rate error with a validation error means retrying would
    /// fail the same way on the validation half.
    pub fn is_retryable(&self) -> bool {
        !self.errors.is_empty() && self.errors.iter().all(|e| e.reason.is_retryable())
    }

    /// Whether the failure was the server rejecting the access token
    pub fn is_auth_failure(&self) -> bool {
        self.errors.iter().any(|e| e.reason == ApiErrorReason::AuthenticationFailed)
    }
}

impl fmt::Display for ApiException {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "API exception with {} error(s)", self.errors.len())?;
        for error in &self.errors {
            write!(f, "; {error}")?;
        }
        Ok(())
    }
}

impl std::error::Error for ApiException {}

/// Errors produced by the API access layer
#[derive(Debug, Error)]
pub enum ClientError {
    /// Obtaining or refreshing the access token failed
    #[error("Credential error: {0}")]
    Credential(#[from] CredentialError),

    /// The requested service/version pair is not in the registry
    #[error("Unsupported service: {descriptor}")]
    UnsupportedService { descriptor: String },

    /// The request never produced a usable HTTP response
    #[error("Transport error: {0}")]
    Transport(#[from] reqwest::Error),

    /// The API rejected the call with a structured error body
    #[error(transparent)]
    Api(ApiException),

    /// The call exceeded its deadline
    #[error("Operation '{operation}' timed out after {duration:?}")]
    Timeout { operation: String, duration: Duration },

    /// The call was cancelled before completion
    #[error("Operation '{operation}' was cancelled")]
    Cancelled { operation: String },

    /// Invalid client configuration
    #[error("Configuration error: {0}")]
    Config(String),

    /// Request or response body could not be (de)serialized
    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    /// The response violated the wire contract (e.g. result count mismatch)
    #[error("Invalid response from server: {0}")]
    InvalidResponse(String),
}

impl ErrorClassification for ClientError {
    fn is_retryable(&self) -> bool {
        match self {
            Self::Credential(e) => e.is_retryable(),
            Self::Transport(e) => {
                // 4xx statuses reached the server and were judged; repeating
                // the request would be judged the same way.
                match e.status() {
                    Some(status) => status.is_server_error(),
                    None => e.is_timeout() || e.is_connect() || e.is_request(),
                }
            }
            Self::Api(exception) => exception.is_retryable(),
            Self::Timeout { .. } => true,
            Self::UnsupportedService { .. }
            | Self::Cancelled { .. }
            | Self::Config(_)
            | Self::Serialization(_)
            | Self::InvalidResponse(_) => false,
        }
    }

    fn severity(&self) -> ErrorSeverity {
        match self {
            Self::Credential(e) => e.severity(),
            Self::Transport(_) | Self::Timeout { .. } => ErrorSeverity::Warning,
            Self::Cancelled { .. } => ErrorSeverity::Info,
            Self::Api(exception) if exception.is_retryable() => ErrorSeverity::Warning,
            Self::Api(_) => ErrorSeverity::Error,
            Self::UnsupportedService { .. } | Self::Config(_) | Self::Serialization(_) => {
                ErrorSeverity::Error
            }
            Self::InvalidResponse(_) => ErrorSeverity::Critical,
        }
    }

    fn is_critical(&self) -> bool {
        matches!(self, Self::InvalidResponse(_))
    }

    fn retry_after(&self) -> Option<Duration> {
        None
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn error_with(reason: ApiErrorReason) -> ApiError {
        ApiError::new(reason, "boom")
    }

    /// Validates reason code deserialization, including the open-ended
    /// fallback.
    ///
    /// Assertions:
    /// - Confirms `"RATE_EXCEEDED"` parses to `ApiErrorReason::RateExceeded`.
    /// - Confirms an unrecognized code parses to `ApiErrorReason::Unknown`.
    #[test]
    fn test_reason_deserialization() {
        let reason: ApiErrorReason = serde_json::from_str("\"RATE_EXCEEDED\"").unwrap();
        assert_eq!(reason, ApiErrorReason::RateExceeded);

        let reason: ApiErrorReason = serde_json::from_str("\"SOMETHING_NEW\"").unwrap();
        assert_eq!(reason, ApiErrorReason::Unknown);
    }

    /// Validates `ApiErrorReason::is_retryable` for each code.
    #[test]
    fn test_reason_retryability() {
        assert!(ApiErrorReason::RateExceeded.is_retryable());
        assert!(ApiErrorReason::QuotaExceeded.is_retryable());
        assert!(ApiErrorReason::InternalError.is_retryable());

        assert!(!ApiErrorReason::InvalidArgument.is_retryable());
        assert!(!ApiErrorReason::PermissionDenied.is_retryable());
        assert!(!ApiErrorReason::AuthenticationFailed.is_retryable());
        assert!(!ApiErrorReason::NotFound.is_retryable());
        assert!(!ApiErrorReason::Unknown.is_retryable());
    }

    /// Tests an exception is only retryable when every error in it is.
    #[test]
    fn test_exception_retryable_requires_all_errors_retryable() {
        let all_transient = ApiException {
            errors: vec![
                error_with(ApiErrorReason::RateExceeded),
                error_with(ApiErrorReason::InternalError),
            ],
        };
        assert!(all_transient.is_retryable());

        let mixed = ApiException {
            errors: vec![
                error_with(ApiErrorReason::RateExceeded),
                error_with(ApiErrorReason::InvalidArgument),
            ],
        };
        assert!(!mixed.is_retryable());

        let empty = ApiException { errors: vec![] };
        assert!(!empty.is_retryable());
    }

    /// Tests auth failure detection on an exception.
    #[test]
    fn test_exception_auth_failure_detection() {
        let auth = ApiException {
            errors: vec![error_with(ApiErrorReason::AuthenticationFailed)],
        };
        assert!(auth.is_auth_failure());
        assert!(!auth.is_retryable());

        let other = ApiException { errors: vec![error_with(ApiErrorReason::NotFound)] };
        assert!(!other.is_auth_failure());
    }

    /// Validates `ApiError` display formatting includes the field path and
    /// description.
    #[test]
    fn test_api_error_display() {
        let error = ApiError {
            field_path: Some("operations[2].operand.name".to_string()),
            trigger: Some("".to_string()),
            reason: ApiErrorReason::InvalidArgument,
            error_string: Some("name must not be empty".to_string()),
        };

        let s = error.to_string();
        assert!(s.contains("INVALID_ARGUMENT"));
        assert!(s.contains("operations[2].operand.name"));
        assert!(s.contains("name must not be empty"));
    }

    /// Tests `ApiError` round-trips through the camelCase wire form.
    #[test]
    fn test_api_error_wire_format() {
        let json = serde_json::json!({
            "fieldPath": "selector.fields",
            "reason": "INVALID_ARGUMENT",
            "errorString": "unknown field"
        });

        let error: ApiError = serde_json::from_value(json).unwrap();
        assert_eq!(error.field_path.as_deref(), Some("selector.fields"));
        assert_eq!(error.reason, ApiErrorReason::InvalidArgument);

        let value = serde_json::to_value(&error).unwrap();
        assert_eq!(value["fieldPath"], "selector.fields");
        assert!(value.get("trigger").is_none());
    }

    /// Validates `ClientError` classification for the main variants.
    #[test]
    fn test_client_error_classification() {
        let err = ClientError::UnsupportedService { descriptor: "FooService.v1".to_string() };
        assert!(!err.is_retryable());
        assert_eq!(err.severity(), ErrorSeverity::Error);

        let err = ClientError::Timeout {
            operation: "get".to_string(),
            duration: Duration::from_secs(30),
        };
        assert!(err.is_retryable());

        let err = ClientError::Cancelled { operation: "mutate".to_string() };
        assert!(!err.is_retryable());
        assert_eq!(err.severity(), ErrorSeverity::Info);

        let err = ClientError::Api(ApiException {
            errors: vec![error_with(ApiErrorReason::RateExceeded)],
        });
        assert!(err.is_retryable());

        let err = ClientError::Api(ApiException {
            errors: vec![error_with(ApiErrorReason::InvalidArgument)],
        });
        assert!(!err.is_retryable());
    }
}
