//! Generic retry executor with bounded backoff and jitter.
//!
//! The executor runs an async operation up to a configured number of
//! attempts, consulting a [`RetryPolicy`] after each failure. Delays grow
//! according to the configured [`BackoffStrategy`] and are randomized by the
//! configured [`Jitter`] so that concurrent clients do not retry in lockstep.
//!
//! When attempts run out, the last error is returned unchanged inside
//! [`RetryError::AttemptsExhausted`] so callers can still inspect it.

use std::fmt;
use std::future::Future;
use std::time::{Duration, Instant};

use thiserror::Error;
use tracing::{debug, instrument, warn};

/// Errors that can occur during retry operations
#[derive(Debug, Error)]
pub enum RetryError<E> {
    /// All retry attempts have been exhausted; carries the last error seen
    #[error("All retry attempts exhausted after {attempts} tries: {source}")]
    AttemptsExhausted {
        attempts: u32,
        #[source]
        source: E,
    },

    /// The operation failed with a non-retryable error
    #[error("Operation failed with non-retryable error: {source}")]
    NonRetryable {
        #[source]
        source: E,
    },

    /// The retry strategy configuration is invalid
    #[error("Invalid retry configuration: {message}")]
    InvalidConfiguration { message: String },

    /// The total retry time budget was exceeded
    #[error("Retry timeout exceeded after {elapsed:?}")]
    TimeoutExceeded { elapsed: Duration },
}

impl<E> RetryError<E> {
    /// Extract the underlying operation error, if one was captured.
    pub fn into_source(self) -> Option<E> {
        match self {
            Self::AttemptsExhausted { source, .. } | Self::NonRetryable { source } => Some(source),
            Self::InvalidConfiguration { .. } | Self::TimeoutExceeded { .. } => None,
        }
    }
}

/// Result type for retry operations
pub type RetryResult<T, E> = Result<T, RetryError<E>>;

/// Trait for determining whether an error should be retried
pub trait RetryPolicy<E> {
    /// Determine if the error should be retried and optionally provide a
    /// custom delay
    fn should_retry(&self, error: &E, attempt: u32) -> RetryDecision;
}

/// Decision for whether to retry an operation
#[derive(Debug, Clone, PartialEq)]
pub enum RetryDecision {
    /// Retry the operation with the default backoff delay
    Retry,
    /// Retry the operation with a custom delay
    RetryAfter(Duration),
    /// Don't retry the operation
    Stop,
}

/// Backoff strategy for calculating retry delays
#[derive(Debug, Clone, PartialEq)]
pub enum BackoffStrategy {
    /// Fixed delay between retries
    Fixed(Duration),
    /// Exponential backoff: initial_delay * base^attempt, capped at max_delay
    Exponential { initial_delay: Duration, base: f64, max_delay: Duration },
}

impl BackoffStrategy {
    /// Calculate the next delay for the given attempt
    pub fn calculate_delay(&self, attempt: u32) -> Duration {
        match self {
            BackoffStrategy::Fixed(delay) => *delay,
            BackoffStrategy::Exponential { initial_delay, base, max_delay } => {
                let delay = initial_delay.as_millis() as f64 * base.powi(attempt as i32);
                let delay_ms = delay.min(max_delay.as_millis() as f64) as u64;
                Duration::from_millis(delay_ms)
            }
        }
    }
}

/// Jitter type for adding randomness to retry delays
#[derive(Debug, Clone, PartialEq)]
pub enum Jitter {
    /// No jitter
    None,
    /// Full jitter: 0 to calculated_delay
    Full,
    /// Equal jitter: calculated_delay/2 to calculated_delay
    Equal,
}

impl Jitter {
    /// Apply jitter to the calculated delay
    pub fn apply(&self, delay: Duration) -> Duration {
        match self {
            Jitter::None => delay,
            Jitter::Full => {
                let jitter_ms = self.random_value(delay.as_millis() as u64);
                Duration::from_millis(jitter_ms)
            }
            Jitter::Equal => {
                let half_delay = delay.as_millis() / 2;
                let jitter_ms = half_delay + self.random_value(half_delay as u64) as u128;
                Duration::from_millis(jitter_ms as u64)
            }
        }
    }

    /// Generate a pseudo-random value using timing-based seed
    ///
    /// Good enough distribution for jitter without external dependencies.
    fn random_value(&self, max: u64) -> u64 {
        if max == 0 {
            return 0;
        }

        let nanos = Instant::now().elapsed().subsec_nanos() as u64;

        // Simple Linear Congruential Generator (LCG), constants from
        // Numerical Recipes
        let mut seed = nanos.wrapping_mul(1664525).wrapping_add(1013904223);
        seed = seed.wrapping_mul(1664525).wrapping_add(1013904223);
        seed % max
    }
}

/// Configuration for retry behavior
#[derive(Debug, Clone)]
pub struct RetryConfig {
    /// Maximum number of attempts (the initial attempt counts as one)
    pub max_attempts: u32,
    /// Backoff strategy for calculating delays
    pub backoff: BackoffStrategy,
    /// Jitter type for randomizing delays
    pub jitter: Jitter,
    /// Maximum total time to spend retrying
    pub max_total_time: Option<Duration>,
}

impl Default for RetryConfig {
    fn default() -> Self {
        Self {
            max_attempts: 3,
            backoff: BackoffStrategy::Exponential {
                initial_delay: Duration::from_millis(500),
                base: 2.0,
                max_delay: Duration::from_secs(30),
            },
            jitter: Jitter::Equal,
            max_total_time: Some(Duration::from_secs(120)),
        }
    }
}

impl RetryConfig {
    /// Create a configuration builder
    pub fn builder() -> RetryConfigBuilder {
        RetryConfigBuilder::new()
    }

    /// Validate the configuration
    pub fn validate(&self) -> Result<(), RetryError<()>> {
        if self.max_attempts == 0 {
            return Err(RetryError::InvalidConfiguration {
                message: "max_attempts must be greater than 0".to_string(),
            });
        }

        match &self.backoff {
            BackoffStrategy::Exponential { base, .. } if *base <= 0.0 => {
                return Err(RetryError::InvalidConfiguration {
                    message: "exponential base must be greater than 0".to_string(),
                });
            }
            _ => {}
        }

        Ok(())
    }
}

/// Builder for RetryConfig with fluent API
#[derive(Debug)]
pub struct RetryConfigBuilder {
    config: RetryConfig,
}

impl Default for RetryConfigBuilder {
    fn default() -> Self {
        Self::new()
    }
}

impl RetryConfigBuilder {
    pub fn new() -> Self {
        Self { config: RetryConfig::default() }
    }

    pub fn max_attempts(mut self, attempts: u32) -> Self {
        self.config.max_attempts = attempts;
        self
    }

    pub fn fixed_backoff(mut self, delay: Duration) -> Self {
        self.config.backoff = BackoffStrategy::Fixed(delay);
        self
    }

    pub fn exponential_backoff(
        mut self,
        initial_delay: Duration,
        base: f64,
        max_delay: Duration,
    ) -> Self {
        self.config.backoff = BackoffStrategy::Exponential { initial_delay, base, max_delay };
        self
    }

    pub fn no_jitter(mut self) -> Self {
        self.config.jitter = Jitter::None;
        self
    }

    pub fn full_jitter(mut self) -> Self {
        self.config.jitter = Jitter::Full;
        self
    }

    pub fn equal_jitter(mut self) -> Self {
        self.config.jitter = Jitter::Equal;
        self
    }

    pub fn max_total_time(mut self, duration: Duration) -> Self {
        self.config.max_total_time = Some(duration);
        self
    }

    pub fn unlimited_time(mut self) -> Self {
        self.config.max_total_time = None;
        self
    }

    pub fn build(self) -> Result<RetryConfig, RetryError<()>> {
        self.config.validate()?;
        Ok(self.config)
    }
}

/// The main retry executor
pub struct RetryExecutor<P> {
    config: RetryConfig,
    policy: P,
}

impl<P> RetryExecutor<P> {
    /// Create a new retry executor with the given configuration and policy
    pub fn new(config: RetryConfig, policy: P) -> Self {
        Self { config, policy }
    }

    /// Create with default configuration
    pub fn with_policy(policy: P) -> Self {
        Self::new(RetryConfig::default(), policy)
    }

    /// Execute an operation with retry logic
    #[instrument(skip(self, operation), fields(max_attempts = self.config.max_attempts))]
    pub async fn execute<F, Fut, T, E>(&self, mut operation: F) -> RetryResult<T, E>
    where
        P: RetryPolicy<E>,
        E: fmt::Debug,
        F: FnMut() -> Fut,
        Fut: Future<Output = Result<T, E>>,
    {
        let start_time = Instant::now();
        let mut attempt: u32 = 0;

        loop {
            let attempt_number = attempt + 1;

            if let Some(max_time) = self.config.max_total_time {
                let elapsed = start_time.elapsed();
                if elapsed >= max_time {
                    warn!(
                        "Retry timeout exceeded after {:?} (attempts: {})",
                        elapsed, attempt
                    );
                    return Err(RetryError::TimeoutExceeded { elapsed });
                }
            }

            debug!("Executing operation (attempt {}/{})", attempt_number, self.config.max_attempts);

            match operation().await {
                Ok(value) => {
                    if attempt > 0 {
                        debug!("Operation succeeded after {} retries", attempt);
                    }
                    return Ok(value);
                }
                Err(error) => {
                    if attempt >= self.config.max_attempts - 1 {
                        warn!(
                            "All retry attempts exhausted after {} tries, last error: {:?}",
                            attempt_number, error
                        );
                        return Err(RetryError::AttemptsExhausted {
                            attempts: attempt_number,
                            source: error,
                        });
                    }

                    match self.policy.should_retry(&error, attempt) {
                        RetryDecision::Stop => {
                            debug!("Retry policy determined not to retry: {:?}", error);
                            return Err(RetryError::NonRetryable { source: error });
                        }
                        RetryDecision::Retry => {
                            let delay = self.config.backoff.calculate_delay(attempt);
                            let jittered = self.config.jitter.apply(delay);
                            self.sleep_before_retry(attempt, jittered).await;
                        }
                        RetryDecision::RetryAfter(custom_delay) => {
                            self.sleep_before_retry(attempt, custom_delay).await;
                        }
                    }
                    attempt += 1;
                }
            }
        }
    }

    async fn sleep_before_retry(&self, attempt: u32, delay: Duration) {
        warn!("Operation failed (attempt {}), retrying after {:?}", attempt + 1, delay);
        tokio::time::sleep(delay).await;
    }
}

/// Convenience function to create a retry executor and execute an operation
pub async fn retry_with_policy<F, Fut, T, E, P>(
    config: RetryConfig,
    policy: P,
    operation: F,
) -> RetryResult<T, E>
where
    F: FnMut() -> Fut,
    Fut: Future<Output = Result<T, E>>,
    P: RetryPolicy<E>,
    E: fmt::Debug,
{
    let executor = RetryExecutor::new(config, policy);
    executor.execute(operation).await
}

/// Pre-defined retry policies for common scenarios
pub mod policies {
    use super::*;
    use crate::error::ErrorClassification;

    /// Always retry policy - retries on any error
    #[derive(Debug, Clone)]
    pub struct AlwaysRetry;

    impl<E> RetryPolicy<E> for AlwaysRetry {
        fn should_retry(&self, _error: &E, _attempt: u32) -> RetryDecision {
            RetryDecision::Retry
        }
    }

    /// Never retry policy - never retries
    #[derive(Debug, Clone)]
    pub struct NeverRetry;

    impl<E> RetryPolicy<E> for NeverRetry {
        fn should_retry(&self, _error: &E, _attempt: u32) -> RetryDecision {
            RetryDecision::Stop
        }
    }

    /// Policy that defers to the error's own classification.
    ///
    /// Retryable errors are retried, honoring a server-suggested delay when
    /// one is present; everything else stops immediately.
    #[derive(Debug, Clone)]
    pub struct ClassificationRetry;

    impl<E: ErrorClassification> RetryPolicy<E> for ClassificationRetry {
        fn should_retry(&self, error: &E, _attempt: u32) -> RetryDecision {
            if !error.is_retryable() {
                return RetryDecision::Stop;
            }
            match error.retry_after() {
                Some(delay) => RetryDecision::RetryAfter(delay),
                None => RetryDecision::Retry,
            }
        }
    }
}
