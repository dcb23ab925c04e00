//! Shared foundation for the adflux client crates.
//!
//! Provides the building blocks the API access layer is assembled from:
//! - `error`: error classification trait and severity levels
//! - `resilience`: retry executor with backoff and jitter
//! - `auth`: OAuth 2.0 credential types and the refreshing credential provider

#![forbid(unsafe_code)]
#![warn(rust_2018_idioms)]
#![warn(clippy::all, clippy::perf, clippy::complexity, clippy::suspicious)]

pub mod auth;
pub mod error;
pub mod resilience;

// Re-export commonly used types and traits for convenience
pub use auth::{
    AccessTokenProvider, Credential, CredentialConfig, CredentialError, CredentialProvider,
    TokenClient, TokenEndpoint, TokenResponse,
};
pub use error::{ErrorClassification, ErrorSeverity};
pub use resilience::{
    retry_with_policy, BackoffStrategy, Jitter, RetryConfig, RetryConfigBuilder, RetryDecision,
    RetryError, RetryExecutor, RetryPolicy, RetryResult,
};
