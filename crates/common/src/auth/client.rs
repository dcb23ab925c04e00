//! Token endpoint client for the refresh-token grant
//!
//! Performs the form-encoded POST to the OAuth token endpoint and maps the
//! standard RFC 6749 error body into [`CredentialError`].

use std::time::Duration;

use async_trait::async_trait;
use reqwest::Client;
use thiserror::Error;
use tracing::{debug, warn};

use super::traits::TokenEndpoint;
use super::types::{CredentialConfig, TokenErrorBody, TokenResponse};
use crate::error::{ErrorClassification, ErrorSeverity};

/// Error type for credential operations
#[derive(Debug, Error)]
pub enum CredentialError {
    /// HTTP request to the token endpoint failed
    #[error("Token request failed: {0}")]
    RequestFailed(#[from] reqwest::Error),

    /// The authorization server rejected the grant
    #[error("Token grant rejected: {body}")]
    Rejected { body: TokenErrorBody },

    /// Failed to parse the token response
    #[error("Token response parse error: {0}")]
    Parse(String),

    /// Invalid credential configuration
    #[error("Credential configuration error: {0}")]
    Config(String),
}

impl ErrorClassification for CredentialError {
    fn is_retryable(&self) -> bool {
        match self {
            // Connection problems and timeouts may clear up; a rejected
            // grant or malformed config will fail the same way again.
            Self::RequestFailed(e) => e.is_timeout() || e.is_connect() || e.is_request(),
            Self::Rejected { .. } | Self::Parse(_) | Self::Config(_) => false,
        }
    }

    fn severity(&self) -> ErrorSeverity {
        match self {
            Self::RequestFailed(_) => ErrorSeverity::Warning,
            Self::Rejected { .. } | Self::Parse(_) | Self::Config(_) => ErrorSeverity::Error,
        }
    }

    fn is_critical(&self) -> bool {
        false
    }

    fn retry_after(&self) -> Option<Duration> {
        None
    }
}

/// Client for the OAuth 2.0 token endpoint
///
/// Stateless apart from its connection pool; the refresh token and client
/// secrets live in the [`CredentialConfig`] it is constructed with.
#[derive(Debug, Clone)]
pub struct TokenClient {
    config: CredentialConfig,
    http: Client,
}

impl TokenClient {
    /// Create a new token client with the given configuration
    ///
    /// # Errors
    /// Returns `CredentialError::Config` if required fields are empty or the
    /// HTTP client cannot be constructed.
    pub fn new(config: CredentialConfig) -> Result<Self, CredentialError> {
        if config.client_id.is_empty() {
            return Err(CredentialError::Config("client_id must not be empty".to_string()));
        }
        if config.refresh_token.is_empty() {
            return Err(CredentialError::Config("refresh_token must not be empty".to_string()));
        }
        if config.token_url.is_empty() {
            return Err(CredentialError::Config("token_url must not be empty".to_string()));
        }

        let http = Client::builder()
            .timeout(Duration::from_secs(30))
            .build()
            .map_err(|e| CredentialError::Config(format!("failed to build HTTP client: {e}")))?;

        Ok(Self { config, http })
    }

    /// Exchange the configured refresh token for a new access token
    ///
    /// # Errors
    /// Returns error if:
    /// - The HTTP request fails
    /// - The server rejects the grant (invalid_grant, invalid_client, ...)
    /// - The response body cannot be parsed
    pub async fn refresh_access_token(&self) -> Result<TokenResponse, CredentialError> {
        debug!(token_url = %self.config.token_url, "Requesting access token via refresh grant");

        let params = [
            ("grant_type", "refresh_token"),
            ("client_id", self.config.client_id.as_str()),
            ("client_secret", self.config.client_secret.as_str()),
            ("refresh_token", self.config.refresh_token.as_str()),
        ];

        let response = self.http.post(&self.config.token_url).form(&params).send().await?;

        if response.status().is_success() {
            let token: TokenResponse = response
                .json()
                .await
                .map_err(|e| CredentialError::Parse(format!("invalid token response: {e}")))?;
            debug!(expires_in = token.expires_in, "Access token refreshed");
            Ok(token)
        } else {
            let status = response.status();
            let body: TokenErrorBody = response.json().await.unwrap_or(TokenErrorBody {
                error: format!("http_{}", status.as_u16()),
                error_description: None,
            });
            warn!(%status, error = %body, "Token endpoint rejected refresh grant");
            Err(CredentialError::Rejected { body })
        }
    }
}

#[async_trait]
impl TokenEndpoint for TokenClient {
    async fn fetch_token(&self) -> Result<TokenResponse, CredentialError> {
        self.refresh_access_token().await
    }
}
