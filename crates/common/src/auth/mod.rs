//! OAuth 2.0 credential management.
//!
//! Covers the offline (installed application) flow the ad APIs use: a
//! long-lived refresh token is exchanged for short-lived access tokens at
//! the provider's token endpoint. [`CredentialProvider`] caches the current
//! access token, refreshes it ahead of expiry, and collapses concurrent
//! refreshes into a single request.

pub mod client;
pub mod provider;
pub mod traits;
pub mod types;

pub use client::{CredentialError, TokenClient};
pub use provider::{CredentialProvider, DEFAULT_REFRESH_MARGIN_SECS};
pub use traits::{AccessTokenProvider, TokenEndpoint};
pub use types::{Credential, CredentialConfig, TokenErrorBody, TokenResponse};
