//! The service proxy: where requests actually go out
//!
//! A proxy is bound to one service URL and one [`Session`]. Every call
//! attaches the session's current bearer token and scoping headers, decodes
//! the API's structured error bodies, and applies the crate's resilience
//! rules:
//!
//! - A rejected access token triggers exactly one invalidate-and-retry, so a
//!   token that expired mid-flight heals transparently while a genuinely
//!   revoked credential fails on the second attempt instead of looping.
//! - Read calls (`get`, `query`) run under the retry executor with
//!   exponential backoff; only errors classified retryable are repeated.
//! - `mutate` is never backoff-retried. A mutate whose response was lost may
//!   already be applied server-side, and replaying it could double-apply
//!   writes. The pre-flight token retry is safe because it happens before
//!   the server processes any operations.

use std::future::Future;
use std::time::Duration;

use adflux_common::resilience::{policies::ClassificationRetry, RetryConfig, RetryError, RetryExecutor};
use reqwest::header::{HeaderMap, HeaderValue, AUTHORIZATION};
use serde::de::DeserializeOwned;
use serde::Serialize;
use tokio_util::sync::CancellationToken;
use tracing::{debug, instrument, warn};

use super::descriptor::ServiceDescriptor;
use crate::error::{ApiError, ApiErrorReason, ApiException, ClientError, ClientResult};
use crate::http::HttpClient;
use crate::mutate::{Operation, OperationResult};
use crate::selector::{Page, Selector};
use crate::session::Session;

/// Header carrying the network scope for session-bound calls
const NETWORK_CODE_HEADER: &str = "networkCode";
/// Header carrying the developer token, when the session has one
const DEVELOPER_TOKEN_HEADER: &str = "developerToken";

#[derive(serde::Deserialize)]
struct MutateResponse<T> {
    results: Vec<OperationResult<T>>,
}

/// A client for one remote service, bound to a session
pub struct ServiceProxy {
    session: Session,
    descriptor: ServiceDescriptor,
    url: String,
    http: HttpClient,
    retry_config: RetryConfig,
    deadline: Option<Duration>,
    cancellation: Option<CancellationToken>,
}

impl ServiceProxy {
    /// Create a proxy for the given resolved service URL
    ///
    /// Normally called through `ServiceFactory::service`, which is where the
    /// URL comes from.
    ///
    /// # Errors
    /// Returns `ClientError::Config` when the HTTP client or retry
    /// configuration cannot be built from the session's settings.
    pub fn new(
        session: Session,
        descriptor: ServiceDescriptor,
        url: String,
    ) -> ClientResult<Self> {
        let http = HttpClient::builder()
            .timeout(session.request_timeout())
            .user_agent(format!("{} (adflux-client)", session.application_name()))
            .build()?;

        let retry_config = RetryConfig::builder()
            .max_attempts(session.max_retry_attempts().max(1))
            .exponential_backoff(Duration::from_millis(500), 2.0, Duration::from_secs(30))
            .equal_jitter()
            .build()
            .map_err(|e| ClientError::Config(format!("invalid retry settings: {e:?}")))?;

        Ok(Self {
            session,
            descriptor,
            url,
            http,
            retry_config,
            deadline: None,
            cancellation: None,
        })
    }

    /// The fully resolved endpoint URL this proxy posts to
    pub fn url(&self) -> &str {
        &self.url
    }

    /// The descriptor this proxy was resolved from
    pub fn descriptor(&self) -> &ServiceDescriptor {
        &self.descriptor
    }

    /// The session this proxy is bound to
    pub fn session(&self) -> &Session {
        &self.session
    }

    /// Bound every call on this proxy by an overall deadline
    ///
    /// The deadline covers the whole operation including backoff sleeps and
    /// the token refresh, not just a single HTTP exchange.
    pub fn with_timeout(mut self, deadline: Duration) -> Self {
        self.deadline = Some(deadline);
        self
    }

    /// Tie every call on this proxy to a cancellation token
    pub fn with_cancellation(mut self, token: CancellationToken) -> Self {
        self.cancellation = Some(token);
        self
    }

    /// Fetch a page of entities matching a selector
    ///
    /// Retried under the session's retry policy when the failure is
    /// classified transient.
    ///
    /// # Errors
    /// Returns `ClientError::Api` for server-judged rejections, and the
    /// transport/credential/timeout variants for everything that failed on
    /// the way there.
    #[instrument(skip(self, selector), fields(service = %self.descriptor))]
    pub async fn get<T: DeserializeOwned>(&self, selector: &Selector) -> ClientResult<Page<T>> {
        let body = serde_json::json!({
            "method": "get",
            "selector": serde_json::to_value(selector)?,
        });
        let value = self.execute_read("get", &body).await?;
        Ok(serde_json::from_value(value)?)
    }

    /// Fetch a page of entities matching a query-language statement
    ///
    /// Same retry behavior as [`get`](Self::get); paging is expressed inside
    /// the statement itself via `LIMIT`/`OFFSET`.
    #[instrument(skip(self, query), fields(service = %self.descriptor))]
    pub async fn query<T: DeserializeOwned>(&self, query: &str) -> ClientResult<Page<T>> {
        let body = serde_json::json!({
            "method": "query",
            "query": query,
        });
        let value = self.execute_read("query", &body).await?;
        Ok(serde_json::from_value(value)?)
    }

    /// Apply a list of operations, returning one result per operation
    ///
    /// The response is positionally aligned with the input; a length mismatch
    /// is a wire-contract violation and surfaces as
    /// `ClientError::InvalidResponse`.
    #[instrument(skip(self, operations), fields(service = %self.descriptor, count = operations.len()))]
    pub async fn mutate<T>(
        &self,
        operations: &[Operation<T>],
    ) -> ClientResult<Vec<OperationResult<T>>>
    where
        T: Serialize + DeserializeOwned,
    {
        let body = serde_json::json!({
            "method": "mutate",
            "operations": serde_json::to_value(operations)?,
        });

        let value = self.run_guarded("mutate", self.call_with_reauth(&body)).await?;
        let response: MutateResponse<T> = serde_json::from_value(value)?;

        if response.results.len() != operations.len() {
            return Err(ClientError::InvalidResponse(format!(
                "mutate returned {} results for {} operations",
                response.results.len(),
                operations.len()
            )));
        }

        Ok(response.results)
    }

    /// Run a read call under the retry executor, then the deadline guard
    async fn execute_read(
        &self,
        operation: &str,
        body: &serde_json::Value,
    ) -> ClientResult<serde_json::Value> {
        let executor = RetryExecutor::new(self.retry_config.clone(), ClassificationRetry);
        self.run_guarded(operation, async {
            executor
                .execute(|| self.call_with_reauth(body))
                .await
                .map_err(|err| unwrap_retry_error(operation, err))
        })
        .await
    }

    /// One call, with a single token refresh when the server rejects it
    async fn call_with_reauth(&self, body: &serde_json::Value) -> ClientResult<serde_json::Value> {
        match self.call_raw(body).await {
            Err(ClientError::Api(exception)) if exception.is_auth_failure() => {
                warn!(service = %self.descriptor, "Access token rejected, refreshing once");
                self.session.token_provider().invalidate().await;
                self.call_raw(body).await
            }
            other => other,
        }
    }

    /// A single request/response exchange with no resilience applied
    async fn call_raw(&self, body: &serde_json::Value) -> ClientResult<serde_json::Value> {
        let token = self.session.token_provider().access_token().await?;
        let headers = self.request_headers(&token)?;

        let response = self.http.post_json(&self.url, headers, body).await?;
        let status = response.status();
        let text = response.text().await?;

        if status.is_success() {
            debug!(service = %self.descriptor, "API call succeeded");
            return Ok(serde_json::from_str(&text)?);
        }

        // Prefer the structured error body; fall back to mapping the HTTP
        // status when the body is opaque.
        let exception = match serde_json::from_str::<ApiException>(&text) {
            Ok(exception) if !exception.errors.is_empty() => exception,
            _ => exception_for_status(status),
        };

        warn!(service = %self.descriptor, %status, %exception, "API call rejected");
        Err(ClientError::Api(exception))
    }

    fn request_headers(&self, token: &str) -> ClientResult<HeaderMap> {
        let mut headers = HeaderMap::new();
        headers.insert(AUTHORIZATION, header_value(&format!("Bearer {token}"))?);

        if let Some(code) = self.session.network_code() {
            headers.insert(NETWORK_CODE_HEADER, header_value(code)?);
        }
        if let Some(dev_token) = self.session.developer_token() {
            headers.insert(DEVELOPER_TOKEN_HEADER, header_value(dev_token)?);
        }

        Ok(headers)
    }

    /// Apply the proxy's deadline and cancellation token around a call
    async fn run_guarded<F, T>(&self, operation: &str, fut: F) -> ClientResult<T>
    where
        F: Future<Output = ClientResult<T>>,
    {
        let deadline = self.deadline;
        let guarded = async move {
            match deadline {
                Some(limit) => match tokio::time::timeout(limit, fut).await {
                    Ok(result) => result,
                    Err(_) => Err(ClientError::Timeout {
                        operation: operation.to_string(),
                        duration: limit,
                    }),
                },
                None => fut.await,
            }
        };

        match &self.cancellation {
            Some(token) => tokio::select! {
                () = token.cancelled() => {
                    Err(ClientError::Cancelled { operation: operation.to_string() })
                }
                result = guarded => result,
            },
            None => guarded.await,
        }
    }
}

impl std::fmt::Debug for ServiceProxy {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ServiceProxy")
            .field("descriptor", &self.descriptor)
            .field("url", &self.url)
            .field("deadline", &self.deadline)
            .finish_non_exhaustive()
    }
}

fn header_value(value: &str) -> ClientResult<HeaderValue> {
    HeaderValue::from_str(value)
        .map_err(|e| ClientError::Config(format!("invalid header value: {e}")))
}

/// Collapse a retry-executor error back into the underlying call error
fn unwrap_retry_error(operation: &str, err: RetryError<ClientError>) -> ClientError {
    match err {
        RetryError::AttemptsExhausted { source, .. } | RetryError::NonRetryable { source } => {
            source
        }
        RetryError::TimeoutExceeded { elapsed } => {
            ClientError::Timeout { operation: operation.to_string(), duration: elapsed }
        }
        RetryError::InvalidConfiguration { message } => ClientError::Config(message),
    }
}

/// Map an HTTP status with no structured body onto a reason code
fn exception_for_status(status: reqwest::StatusCode) -> ApiException {
    let reason = match status.as_u16() {
        401 => ApiErrorReason::AuthenticationFailed,
        403 => ApiErrorReason::PermissionDenied,
        404 => ApiErrorReason::NotFound,
        429 => ApiErrorReason::RateExceeded,
        code if (500..600).contains(&code) => ApiErrorReason::InternalError,
        _ => ApiErrorReason::Unknown,
    };

    ApiException {
        errors: vec![ApiError::new(reason, format!("HTTP status {}", status.as_u16()))],
    }
}
