//! Caching credential provider with proactive refresh
//!
//! Wraps a [`TokenEndpoint`] and hands out access tokens to API callers. A
//! token is served from cache while it has more than the configured safety
//! margin of lifetime left; once inside the margin the provider refreshes it
//! before returning, so callers never receive a token about to expire
//! mid-request.
//!
//! Concurrent refreshes are collapsed: when several tasks hit an expired
//! cache at once, exactly one performs the network refresh and the rest
//! reuse its result. Transient endpoint failures are retried with backoff;
//! a rejected grant surfaces immediately as a fatal [`CredentialError`].

use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use tokio::sync::{Mutex, RwLock};
use tracing::{debug, info};

use super::client::CredentialError;
use super::traits::{AccessTokenProvider, TokenEndpoint};
use super::types::Credential;
use crate::resilience::{policies::ClassificationRetry, RetryConfig, RetryError, RetryExecutor};

/// Default safety margin before expiry at which a token is refreshed
pub const DEFAULT_REFRESH_MARGIN_SECS: i64 = 60;

/// Credential provider that caches and refreshes access tokens
pub struct CredentialProvider {
    endpoint: Arc<dyn TokenEndpoint>,
    cached: RwLock<Option<Credential>>,
    /// Serializes refreshes so concurrent callers trigger only one request
    refresh_gate: Mutex<()>,
    refresh_margin_seconds: i64,
    retry_config: RetryConfig,
}

impl CredentialProvider {
    /// Create a provider with the default refresh margin
    pub fn new(endpoint: Arc<dyn TokenEndpoint>) -> Self {
        Self::with_refresh_margin(endpoint, DEFAULT_REFRESH_MARGIN_SECS)
    }

    /// Create a provider with a custom refresh margin in seconds
    pub fn with_refresh_margin(endpoint: Arc<dyn TokenEndpoint>, margin_seconds: i64) -> Self {
        let retry_config = RetryConfig {
            max_attempts: 3,
            backoff: crate::resilience::BackoffStrategy::Exponential {
                initial_delay: Duration::from_millis(500),
                base: 2.0,
                max_delay: Duration::from_secs(10),
            },
            jitter: crate::resilience::Jitter::Equal,
            max_total_time: None,
        };

        Self {
            endpoint,
            cached: RwLock::new(None),
            refresh_gate: Mutex::new(()),
            refresh_margin_seconds: margin_seconds,
            retry_config,
        }
    }

    /// Get the currently cached credential, if any
    pub async fn cached_credential(&self) -> Option<Credential> {
        self.cached.read().await.clone()
    }

    async fn refresh(&self) -> Result<String, CredentialError> {
        // Only one caller refreshes; the rest queue here and then find a
        // fresh token in the cache on the double-check below.
        let _gate = self.refresh_gate.lock().await;

        if let Some(credential) = self.cached.read().await.as_ref() {
            if !credential.is_expired(self.refresh_margin_seconds) {
                debug!("Token was refreshed by a concurrent caller, reusing it");
                return Ok(credential.access_token.clone());
            }
        }

        // Transient endpoint failures (timeouts, connection resets) are
        // retried; a rejected grant is final.
        let executor = RetryExecutor::new(self.retry_config.clone(), ClassificationRetry);
        let response = executor
            .execute(|| self.endpoint.fetch_token())
            .await
            .map_err(|err| match err {
                RetryError::AttemptsExhausted { source, .. }
                | RetryError::NonRetryable { source } => source,
                RetryError::TimeoutExceeded { elapsed } => {
                    CredentialError::Config(format!("token refresh timed out after {elapsed:?}"))
                }
                RetryError::InvalidConfiguration { message } => CredentialError::Config(message),
            })?;

        let credential: Credential = response.into();
        info!(
            expires_in = credential.expires_in,
            "Access token refreshed"
        );

        let token = credential.access_token.clone();
        *self.cached.write().await = Some(credential);
        Ok(token)
    }
}

#[async_trait]
impl AccessTokenProvider for CredentialProvider {
    async fn access_token(&self) -> Result<String, CredentialError> {
        if let Some(credential) = self.cached.read().await.as_ref() {
            if !credential.is_expired(self.refresh_margin_seconds) {
                return Ok(credential.access_token.clone());
            }
        }

        self.refresh().await
    }

    async fn invalidate(&self) {
        debug!("Invalidating cached access token");
        *self.cached.write().await = None;
    }
}
