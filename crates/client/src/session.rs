//! Immutable API sessions
//!
//! A [`Session`] bundles everything a service call needs besides the call
//! itself: endpoint, API version, network scoping, identification headers,
//! and the token provider. Once built it never changes; pointing at another
//! network or endpoint means building another session, so concurrent callers
//! can share one session without coordination.

use std::fmt;
use std::sync::Arc;
use std::time::Duration;

use adflux_common::auth::{
    AccessTokenProvider, CredentialConfig, CredentialProvider, TokenClient,
};

use crate::config::ClientConfig;
use crate::error::{ClientError, ClientResult};

/// Immutable bundle of connection settings and credentials
#[derive(Clone)]
pub struct Session {
    endpoint: String,
    api_version: String,
    application_name: String,
    network_code: Option<String>,
    developer_token: Option<String>,
    token_provider: Arc<dyn AccessTokenProvider>,
    page_size: u32,
    max_retry_attempts: u32,
    mutate_chunk_size: usize,
    request_timeout: Duration,
}

impl fmt::Debug for Session {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Session")
            .field("endpoint", &self.endpoint)
            .field("api_version", &self.api_version)
            .field("application_name", &self.application_name)
            .field("network_code", &self.network_code)
            .finish_non_exhaustive()
    }
}

impl Session {
    /// Start building a session
    pub fn builder() -> SessionBuilder {
        SessionBuilder::default()
    }

    /// Build a session from a loaded [`ClientConfig`]
    ///
    /// Wires up the refresh-token credential provider from the config's
    /// OAuth fields.
    ///
    /// # Errors
    /// Returns `ClientError::Config` when the credential configuration is
    /// incomplete.
    pub fn from_config(config: &ClientConfig) -> ClientResult<Self> {
        let credentials = CredentialConfig::new(
            config.client_id.clone(),
            config.client_secret.clone(),
            config.refresh_token.clone(),
            config.token_url.clone(),
        );
        let token_client = TokenClient::new(credentials)?;
        let provider = Arc::new(CredentialProvider::new(Arc::new(token_client)));

        let mut builder = Session::builder()
            .endpoint(&config.endpoint)
            .api_version(&config.api_version)
            .application_name(&config.application_name)
            .token_provider(provider)
            .page_size(config.page_size)
            .max_retry_attempts(config.max_retry_attempts)
            .mutate_chunk_size(config.mutate_chunk_size)
            .request_timeout(Duration::from_secs(config.request_timeout_secs));

        if let Some(code) = &config.network_code {
            builder = builder.network_code(code);
        }
        if let Some(token) = &config.developer_token {
            builder = builder.developer_token(token);
        }

        builder.build()
    }

    /// API endpoint base URL, without a trailing slash
    pub fn endpoint(&self) -> &str {
        &self.endpoint
    }

    /// API version segment used in request paths
    pub fn api_version(&self) -> &str {
        &self.api_version
    }

    /// Application identifier sent in the User-Agent header
    pub fn application_name(&self) -> &str {
        &self.application_name
    }

    /// Network/account code calls are scoped to, if any
    pub fn network_code(&self) -> Option<&str> {
        self.network_code.as_deref()
    }

    /// Developer token header value, if any
    pub fn developer_token(&self) -> Option<&str> {
        self.developer_token.as_deref()
    }

    /// The session's token provider
    pub fn token_provider(&self) -> &Arc<dyn AccessTokenProvider> {
        &self.token_provider
    }

    /// Page size pagers request per round trip
    pub fn page_size(&self) -> u32 {
        self.page_size
    }

    /// Attempt budget for retryable calls
    pub fn max_retry_attempts(&self) -> u32 {
        self.max_retry_attempts
    }

    /// Maximum operations per mutate request
    pub fn mutate_chunk_size(&self) -> usize {
        self.mutate_chunk_size
    }

    /// Per-call deadline
    pub fn request_timeout(&self) -> Duration {
        self.request_timeout
    }
}

/// Builder for [`Session`]
#[derive(Default)]
pub struct SessionBuilder {
    endpoint: Option<String>,
    api_version: Option<String>,
    application_name: Option<String>,
    network_code: Option<String>,
    developer_token: Option<String>,
    token_provider: Option<Arc<dyn AccessTokenProvider>>,
    page_size: Option<u32>,
    max_retry_attempts: Option<u32>,
    mutate_chunk_size: Option<usize>,
    request_timeout: Option<Duration>,
}

impl SessionBuilder {
    pub fn endpoint(mut self, endpoint: impl Into<String>) -> Self {
        let endpoint = endpoint.into();
        self.endpoint = Some(endpoint.trim_end_matches('/').to_string());
        self
    }

    pub fn api_version(mut self, version: impl Into<String>) -> Self {
        self.api_version = Some(version.into());
        self
    }

    pub fn application_name(mut self, name: impl Into<String>) -> Self {
        self.application_name = Some(name.into());
        self
    }

    pub fn network_code(mut self, code: impl Into<String>) -> Self {
        self.network_code = Some(code.into());
        self
    }

    pub fn developer_token(mut self, token: impl Into<String>) -> Self {
        self.developer_token = Some(token.into());
        self
    }

    pub fn token_provider(mut self, provider: Arc<dyn AccessTokenProvider>) -> Self {
        self.token_provider = Some(provider);
        self
    }

    pub fn page_size(mut self, size: u32) -> Self {
        self.page_size = Some(size);
        self
    }

    pub fn max_retry_attempts(mut self, attempts: u32) -> Self {
        self.max_retry_attempts = Some(attempts);
        self
    }

    pub fn mutate_chunk_size(mut self, size: usize) -> Self {
        self.mutate_chunk_size = Some(size);
        self
    }

    pub fn request_timeout(mut self, timeout: Duration) -> Self {
        self.request_timeout = Some(timeout);
        self
    }

    /// Finalize the session
    ///
    /// # Errors
    /// Returns `ClientError::Config` when a required field is missing.
    pub fn build(self) -> ClientResult<Session> {
        let endpoint = self
            .endpoint
            .ok_or_else(|| ClientError::Config("session requires an endpoint".to_string()))?;
        let api_version = self
            .api_version
            .ok_or_else(|| ClientError::Config("session requires an API version".to_string()))?;
        let application_name = self.application_name.ok_or_else(|| {
            ClientError::Config("session requires an application name".to_string())
        })?;
        let token_provider = self.token_provider.ok_or_else(|| {
            ClientError::Config("session requires a token provider".to_string())
        })?;

        Ok(Session {
            endpoint,
            api_version,
            application_name,
            network_code: self.network_code,
            developer_token: self.developer_token,
            token_provider,
            page_size: self.page_size.unwrap_or(500),
            max_retry_attempts: self.max_retry_attempts.unwrap_or(3),
            mutate_chunk_size: self.mutate_chunk_size.unwrap_or(500),
            request_timeout: self.request_timeout.unwrap_or(Duration::from_secs(60)),
        })
    }
}
