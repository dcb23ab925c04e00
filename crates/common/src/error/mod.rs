//! Error classification infrastructure shared by the adflux crates.
//!
//! Error types across the workspace implement [`ErrorClassification`] so that
//! retry logic and logging can treat them uniformly:
//!
//! - **`is_retryable()`**: may the failed operation be attempted again?
//! - **`severity()`**: how serious is this error?
//! - **`is_critical()`**: does it require immediate attention?
//! - **`retry_after()`**: server-suggested retry delay, if one was provided
//!
//! Module-specific error enums (credential errors, API call errors) implement
//! the trait themselves rather than funnelling through a shared catch-all
//! variant; the classification surface is the common denominator, not the
//! error type.

use std::fmt;
use std::time::Duration;

/// Error classification trait for consistent error handling across modules
///
/// # Example
///
/// ```rust,ignore
/// use adflux_common::error::{ErrorClassification, ErrorSeverity};
///
/// impl ErrorClassification for MyError {
///     fn is_retryable(&self) -> bool {
///         matches!(self, Self::Transient(_))
///     }
///
///     fn severity(&self) -> ErrorSeverity {
///         match self {
///             Self::Transient(_) => ErrorSeverity::Warning,
///             Self::Permanent(_) => ErrorSeverity::Error,
///         }
///     }
///
///     fn is_critical(&self) -> bool {
///         self.severity() == ErrorSeverity::Critical
///     }
///
///     fn retry_after(&self) -> Option<Duration> {
///         None
///     }
/// }
/// ```
pub trait ErrorClassification {
    /// Check if this error is retryable
    ///
    /// Retryable errors are transient issues that may succeed if attempted
    /// again, such as:
    /// - Network timeouts and connection failures
    /// - Rate limiting and quota exhaustion
    /// - Server-side 5xx responses
    ///
    /// Validation failures, permission errors, and malformed requests are not
    /// retryable: the same input will fail the same way.
    fn is_retryable(&self) -> bool;

    /// Get the error severity level
    ///
    /// Used for monitoring, alerting, and logging decisions.
    fn severity(&self) -> ErrorSeverity;

    /// Check if this is a critical error requiring immediate attention
    fn is_critical(&self) -> bool;

    /// Get the suggested retry delay if applicable
    ///
    /// Returns `Some(Duration)` when a specific delay was recommended (e.g.
    /// a rate-limit response carrying a retry-after hint), or `None` if the
    /// caller should use its own backoff schedule.
    fn retry_after(&self) -> Option<Duration>;
}

/// Error severity levels for monitoring and alerting
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub enum ErrorSeverity {
    /// Informational, typically for debugging
    Info,
    /// Warning, should be monitored but not critical
    Warning,
    /// Error, requires attention and action
    Error,
    /// Critical, immediate action required
    Critical,
}

impl fmt::Display for ErrorSeverity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Info => write!(f, "INFO"),
            Self::Warning => write!(f, "WARN"),
            Self::Error => write!(f, "ERROR"),
            Self::Critical => write!(f, "CRITICAL"),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    /// Validates `ErrorSeverity` ordering for the severity comparison
    /// scenario.
    ///
    /// Assertions:
    /// - Ensures `ErrorSeverity::Critical > ErrorSeverity::Error` evaluates to
    ///   true.
    /// - Ensures `ErrorSeverity::Error > ErrorSeverity::Warning` evaluates to
    ///   true.
    /// - Ensures `ErrorSeverity::Warning > ErrorSeverity::Info` evaluates to
    ///   true.
    #[test]
    fn test_error_severity_ordering() {
        assert!(ErrorSeverity::Critical > ErrorSeverity::Error);
        assert!(ErrorSeverity::Error > ErrorSeverity::Warning);
        assert!(ErrorSeverity::Warning > ErrorSeverity::Info);
    }

    /// Validates `ErrorSeverity` display formatting.
    ///
    /// Assertions:
    /// - Confirms `ErrorSeverity::Info.to_string()` equals `"INFO"`.
    /// - Confirms `ErrorSeverity::Warning.to_string()` equals `"WARN"`.
    /// - Confirms `ErrorSeverity::Error.to_string()` equals `"ERROR"`.
    /// - Confirms `ErrorSeverity::Critical.to_string()` equals `"CRITICAL"`.
    #[test]
    fn test_error_severity_display() {
        assert_eq!(ErrorSeverity::Info.to_string(), "INFO");
        assert_eq!(ErrorSeverity::Warning.to_string(), "WARN");
        assert_eq!(ErrorSeverity::Error.to_string(), "ERROR");
        assert_eq!(ErrorSeverity::Critical.to_string(), "CRITICAL");
    }
}
