//! OAuth 2.0 types and structures
//!
//! Defines the credential, token response, and configuration types used by
//! the refresh-token grant flow.

use std::fmt;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// An OAuth 2.0 access token with expiry metadata
///
/// Holds a single short-lived access token obtained from the token endpoint.
/// The refresh token that produced it stays in [`CredentialConfig`]; it never
/// changes across refreshes.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Credential {
    /// Access token for API authentication
    pub access_token: String,

    /// Token type (always "Bearer" for OAuth 2.0)
    pub token_type: String,

    /// Access token lifetime in seconds
    pub expires_in: i64,

    /// Absolute expiration timestamp (UTC)
    /// Calculated from expires_in at token retrieval time
    #[serde(skip_serializing_if = "Option::is_none")]
    pub expires_at: Option<DateTime<Utc>>,

    /// Granted scopes (space-separated)
    #[serde(skip_serializing_if = "Option::is_none")]
    pub scope: Option<String>,
}

impl Credential {
    /// Create a new `Credential` with calculated expiration time
    ///
    /// The `expires_at` timestamp is automatically calculated from
    /// `expires_in`.
    #[must_use]
    pub fn new(access_token: String, expires_in: i64, scope: Option<String>) -> Self {
        let expires_at = if expires_in > 0 {
            Some(Utc::now() + chrono::Duration::seconds(expires_in))
        } else {
            None
        };

        Self {
            access_token,
            token_type: "Bearer".to_string(),
            expires_in,
            expires_at,
            scope,
        }
    }

    /// Check if the access token is expired or will expire within the given
    /// threshold
    ///
    /// # Arguments
    /// * `threshold_seconds` - Number of seconds before expiry to consider
    ///   expired
    ///
    /// # Returns
    /// `true` if the token is expired or will expire within the threshold,
    /// `false` if it's still valid beyond the threshold or if no expiry is set
    #[must_use]
    pub fn is_expired(&self, threshold_seconds: i64) -> bool {
        match self.expires_at {
            Some(expires_at) => {
                let threshold = chrono::Duration::seconds(threshold_seconds);
                Utc::now() + threshold >= expires_at
            }
            None => false, // If no expiry set, assume not expired
        }
    }

    /// Get seconds until token expiration
    ///
    /// # Returns
    /// `Some(seconds)` if expiry is set, `None` if no expiry timestamp exists
    #[must_use]
    pub fn seconds_until_expiry(&self) -> Option<i64> {
        self.expires_at.map(|expires_at| (expires_at - Utc::now()).num_seconds())
    }
}

/// OAuth token response from the authorization server
///
/// Standard OAuth 2.0 token response format (RFC 6749).
/// Deserializes responses from `/token` endpoints.
#[derive(Debug, Deserialize)]
pub struct TokenResponse {
    pub access_token: String,
    pub token_type: String,
    pub expires_in: i64,
    pub scope: Option<String>,
}

impl From<TokenResponse> for Credential {
    fn from(response: TokenResponse) -> Self {
        Self::new(response.access_token, response.expires_in, response.scope)
    }
}

/// Configuration for the refresh-token grant
///
/// The refresh token is obtained once out of band (an interactive consent
/// flow) and then reused indefinitely to mint access tokens.
#[derive(Debug, Clone)]
pub struct CredentialConfig {
    /// OAuth client ID
    pub client_id: String,

    /// OAuth client secret
    pub client_secret: String,

    /// Long-lived refresh token
    pub refresh_token: String,

    /// Token endpoint URL (e.g. "https://oauth2.example.com/token")
    pub token_url: String,
}

impl CredentialConfig {
    /// Create a new credential configuration
    #[must_use]
    pub fn new(
        client_id: String,
        client_secret: String,
        refresh_token: String,
        token_url: String,
    ) -> Self {
        Self { client_id, client_secret, refresh_token, token_url }
    }
}

/// OAuth error response from the authorization server
///
/// Standard OAuth 2.0 error response format (RFC 6749 §5.2).
#[derive(Debug, Deserialize)]
pub struct TokenErrorBody {
    pub error: String,
    pub error_description: Option<String>,
}

impl fmt::Display for TokenErrorBody {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match &self.error_description {
            Some(desc) => write!(f, "{}: {}", self.error, desc),
            None => write!(f, "{}", self.error),
        }
    }
}
