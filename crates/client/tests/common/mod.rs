//! Shared fixtures for the integration tests

use std::sync::atomic::{AtomicU32, Ordering};
use std::sync::Arc;

use adflux_client::{ServiceFactory, ServiceProxy, Session};
use adflux_common::auth::{AccessTokenProvider, CredentialError};
use async_trait::async_trait;

/// Token provider that issues `token-1`, then `token-2` after the first
/// invalidation, and so on
pub struct RotatingTokenProvider {
    invalidations: AtomicU32,
}

impl RotatingTokenProvider {
    pub fn new() -> Arc<Self> {
        Arc::new(Self { invalidations: AtomicU32::new(0) })
    }

    pub fn invalidation_count(&self) -> u32 {
        self.invalidations.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl AccessTokenProvider for RotatingTokenProvider {
    async fn access_token(&self) -> Result<String, CredentialError> {
        Ok(format!("token-{}", self.invalidations.load(Ordering::SeqCst) + 1))
    }

    async fn invalidate(&self) {
        self.invalidations.fetch_add(1, Ordering::SeqCst);
    }
}

/// Build a session pointed at a local mock server
pub fn test_session(server_uri: &str, provider: Arc<dyn AccessTokenProvider>) -> Session {
    Session::builder()
        .endpoint(server_uri)
        .api_version("v202408")
        .application_name("adflux-integration-tests")
        .network_code("777")
        .token_provider(provider)
        .page_size(500)
        .max_retry_attempts(3)
        .mutate_chunk_size(2)
        .build()
        .expect("test session should build")
}

/// Resolve an `OrderService` proxy against the mock server
pub fn order_service_proxy(server_uri: &str, provider: Arc<dyn AccessTokenProvider>) -> ServiceProxy {
    let factory = ServiceFactory::new(test_session(server_uri, provider));
    factory.service_named("OrderService").expect("OrderService should resolve")
}

/// Path the mock server sees for `OrderService` calls
pub const ORDER_SERVICE_PATH: &str = "/apis/ads/v202408/OrderService";

/// Build a page response body with `count` orders starting at id `start`
pub fn page_body(start: u32, count: u32, total: u32) -> serde_json::Value {
    let entries: Vec<serde_json::Value> =
        (start..start + count).map(|id| serde_json::json!({"id": id})).collect();
    serde_json::json!({
        "entries": entries,
        "totalResultSetSize": total,
        "startIndex": start,
    })
}

/// Structured error body with a single reason code
pub fn error_body(reason: &str, message: &str) -> serde_json::Value {
    serde_json::json!({
        "errors": [{"reason": reason, "errorString": message}]
    })
}
