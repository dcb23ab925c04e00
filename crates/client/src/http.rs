//! Thin HTTP transport wrapper
//!
//! Owns the reqwest client with the crate's defaults (timeout, user agent,
//! shared headers) and exposes the one request shape the API uses: a JSON
//! POST. Retry and authentication live above this layer in the service
//! proxy, so a single proxy-level policy governs both.

use std::time::Duration;

use reqwest::header::HeaderMap;
use reqwest::{Client as ReqwestClient, Response};
use serde::Serialize;
use tracing::debug;

use crate::error::{ClientError, ClientResult};

/// HTTP client for JSON API calls
#[derive(Debug, Clone)]
pub struct HttpClient {
    client: ReqwestClient,
}

impl HttpClient {
    /// Start building a new HTTP client.
    pub fn builder() -> HttpClientBuilder {
        HttpClientBuilder::default()
    }

    /// POST a JSON body with per-request headers.
    ///
    /// Returns the raw response; status handling belongs to the caller, which
    /// knows how to decode the API's error bodies.
    pub async fn post_json<B: Serialize + ?Sized>(
        &self,
        url: &str,
        headers: HeaderMap,
        body: &B,
    ) -> ClientResult<Response> {
        debug!(%url, "sending API request");
        let response = self.client.post(url).headers(headers).json(body).send().await?;
        debug!(%url, status = %response.status(), "received API response");
        Ok(response)
    }
}

/// Builder for [`HttpClient`].
#[derive(Debug)]
pub struct HttpClientBuilder {
    timeout: Duration,
    user_agent: Option<String>,
    default_headers: Option<HeaderMap>,
}

impl Default for HttpClientBuilder {
    fn default() -> Self {
        Self { timeout: Duration::from_secs(60), user_agent: None, default_headers: None }
    }
}

impl HttpClientBuilder {
    pub fn timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    pub fn user_agent(mut self, agent: impl Into<String>) -> Self {
        self.user_agent = Some(agent.into());
        self
    }

    pub fn default_headers(mut self, headers: HeaderMap) -> Self {
        self.default_headers = Some(headers);
        self
    }

    pub fn build(self) -> ClientResult<HttpClient> {
        let mut builder = ReqwestClient::builder().timeout(self.timeout);

        if let Some(agent) = self.user_agent {
            builder = builder.user_agent(agent);
        }
        if let Some(headers) = self.default_headers {
            builder = builder.default_headers(headers);
        }

        let client = builder
            .build()
            .map_err(|e| ClientError::Config(format!("failed to build HTTP client: {e}")))?;
        Ok(HttpClient { client })
    }
}
