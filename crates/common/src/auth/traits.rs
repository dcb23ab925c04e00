//! Trait abstractions for credential handling
//!
//! These traits are the dependency-injection seams of the auth layer: the
//! provider talks to a [`TokenEndpoint`] rather than a concrete HTTP client,
//! and API callers depend on [`AccessTokenProvider`] rather than the
//! provider itself, so both sides can be mocked in tests.

use async_trait::async_trait;

use super::client::CredentialError;
use super::types::TokenResponse;

/// A token endpoint that exchanges a refresh token for a new access token
#[async_trait]
pub trait TokenEndpoint: Send + Sync {
    /// Perform one refresh-token grant against the authorization server
    async fn fetch_token(&self) -> Result<TokenResponse, CredentialError>;
}

/// Source of valid access tokens for API calls
///
/// Implementations are expected to cache tokens and refresh them ahead of
/// expiry; callers treat every returned token as immediately usable.
#[async_trait]
pub trait AccessTokenProvider: Send + Sync {
    /// Get a currently valid access token, refreshing if necessary
    async fn access_token(&self) -> Result<String, CredentialError>;

    /// Discard any cached token so the next call performs a fresh refresh
    ///
    /// Called after the API rejects a token that looked valid locally
    /// (revocation, clock skew).
    async fn invalidate(&self);
}
