//! Resilience primitives for API calls.
//!
//! Currently this is the retry executor: bounded attempts, configurable
//! backoff, jitter, and a pluggable policy that decides which errors are
//! worth retrying.

pub mod retry;

pub use retry::{
    policies, retry_with_policy, BackoffStrategy, Jitter, RetryConfig, RetryConfigBuilder,
    RetryDecision, RetryError, RetryExecutor, RetryPolicy, RetryResult,
};
