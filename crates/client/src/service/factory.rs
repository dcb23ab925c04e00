//! Offline service resolution
//!
//! The factory turns descriptors into ready-to-call proxies. No network
//! traffic happens here, so resolving an unknown service fails fast and a
//! factory can be exercised entirely offline.

use super::descriptor::ServiceDescriptor;
use super::proxy::ServiceProxy;
use super::registry::ServiceRegistry;
use crate::error::ClientResult;
use crate::session::Session;

/// Creates service proxies bound to one session
#[derive(Debug, Clone)]
pub struct ServiceFactory {
    session: Session,
    registry: ServiceRegistry,
}

impl ServiceFactory {
    /// Create a factory using the built-in service catalog
    pub fn new(session: Session) -> Self {
        Self::with_registry(session, ServiceRegistry::global().clone())
    }

    /// Create a factory with a custom catalog
    pub fn with_registry(session: Session, registry: ServiceRegistry) -> Self {
        Self { session, registry }
    }

    /// The session this factory binds proxies to
    pub fn session(&self) -> &Session {
        &self.session
    }

    /// Resolve a descriptor into a service proxy
    ///
    /// Each call constructs a fresh proxy; proxies are cheap and carry no
    /// state worth caching.
    ///
    /// # Errors
    /// Returns `ClientError::UnsupportedService` when the descriptor is not
    /// in the catalog.
    pub fn service(&self, descriptor: &ServiceDescriptor) -> ClientResult<ServiceProxy> {
        let path = self.registry.resolve_path(descriptor)?;
        let url = format!("{}{}", self.session.endpoint(), path);
        ServiceProxy::new(self.session.clone(), descriptor.clone(), url)
    }

    /// Resolve a service by name under the session's configured API version
    ///
    /// Shorthand for [`service`](Self::service) with a descriptor built from
    /// the session's `api_version`, so version overrides in the session (or
    /// its config) flow into the request path.
    ///
    /// # Errors
    /// Returns `ClientError::UnsupportedService` when the name or the
    /// session's version is not in the catalog.
    pub fn service_named(&self, name: &str) -> ClientResult<ServiceProxy> {
        self.service(&ServiceDescriptor::new(name, self.session.api_version()))
    }
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use adflux_common::auth::{AccessTokenProvider, CredentialError};
    use async_trait::async_trait;

    use super::*;
    use crate::error::ClientError;

    struct StaticProvider;

    #[async_trait]
    impl AccessTokenProvider for StaticProvider {
        async fn access_token(&self) -> Result<String, CredentialError> {
            Ok("static-token".to_string())
        }

        async fn invalidate(&self) {}
    }

    fn session_at(version: &str) -> Session {
        Session::builder()
            .endpoint("https://ads.example.com")
            .api_version(version)
            .application_name("adflux-tests")
            .token_provider(Arc::new(StaticProvider))
            .build()
            .expect("session should build")
    }

    fn session() -> Session {
        session_at("v202408")
    }

    /// Tests resolving a known service produces a proxy with the versioned
    /// URL, without any network traffic.
    #[test]
    fn test_factory_resolves_known_service() {
        let factory = ServiceFactory::new(session());
        let proxy = factory
            .service(&ServiceDescriptor::new("OrderService", "v202405"))
            .expect("known service should resolve");

        assert_eq!(proxy.url(), "https://ads.example.com/apis/ads/v202405/OrderService");
    }

    /// Tests resolving by name uses the session's configured API version in
    /// the request path.
    #[test]
    fn test_factory_resolves_name_under_session_version() {
        let factory = ServiceFactory::new(session_at("v202402"));
        let proxy = factory
            .service_named("OrderService")
            .expect("OrderService should resolve under the session version");

        assert_eq!(proxy.url(), "https://ads.example.com/apis/ads/v202402/OrderService");
    }

    /// Tests resolving by name rejects a session version absent from the
    /// catalog.
    #[test]
    fn test_factory_rejects_name_under_unknown_version() {
        let factory = ServiceFactory::new(session_at("v209912"));
        let result = factory.service_named("OrderService");

        assert!(matches!(result, Err(ClientError::UnsupportedService { .. })));
    }

    /// Tests an unknown descriptor is rejected at resolution time.
    #[test]
    fn test_factory_rejects_unknown_service() {
        let factory = ServiceFactory::new(session());
        let result = factory.service(&ServiceDescriptor::new("NopeService", "v202408"));

        assert!(matches!(result, Err(ClientError::UnsupportedService { .. })));
    }
}
