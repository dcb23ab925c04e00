//! Static service catalog
//!
//! The registry is the fixed list of service/version pairs a given build of
//! this client knows how to call. Resolution is a pure lookup: nothing is
//! fetched, nothing is cached, and an unknown pair fails immediately with
//! [`ClientError::UnsupportedService`] instead of producing a proxy that
//! would 404 at call time.

use once_cell::sync::Lazy;

use super::descriptor::ServiceDescriptor;
use crate::error::{ClientError, ClientResult};

/// API versions this client build supports
pub const SUPPORTED_VERSIONS: &[&str] = &["v202402", "v202405", "v202408"];

/// Services available in every supported version
pub const SERVICES: &[&str] = &[
    "AdGroupService",
    "AdService",
    "BudgetService",
    "CampaignService",
    "CreativeService",
    "InventoryService",
    "LineItemService",
    "OrderService",
    "ReportService",
];

static GLOBAL: Lazy<ServiceRegistry> = Lazy::new(ServiceRegistry::default);

/// Catalog of supported service/version pairs
#[derive(Debug, Clone)]
pub struct ServiceRegistry {
    entries: Vec<(String, String)>,
}

impl Default for ServiceRegistry {
    fn default() -> Self {
        let mut entries = Vec::with_capacity(SERVICES.len() * SUPPORTED_VERSIONS.len());
        for version in SUPPORTED_VERSIONS {
            for service in SERVICES {
                entries.push((service.to_string(), version.to_string()));
            }
        }
        Self { entries }
    }
}

impl ServiceRegistry {
    /// The process-wide registry with the built-in catalog
    pub fn global() -> &'static ServiceRegistry {
        &GLOBAL
    }

    /// Build a registry from explicit (service, version) pairs
    pub fn with_entries(
        entries: impl IntoIterator<Item = (impl Into<String>, impl Into<String>)>,
    ) -> Self {
        Self { entries: entries.into_iter().map(|(n, v)| (n.into(), v.into())).collect() }
    }

    /// Whether the descriptor names a known pair
    pub fn contains(&self, descriptor: &ServiceDescriptor) -> bool {
        self.entries
            .iter()
            .any(|(name, version)| name == descriptor.name() && version == descriptor.version())
    }

    /// Resolve a descriptor to its request path
    ///
    /// # Errors
    /// Returns `ClientError::UnsupportedService` when the pair is not in the
    /// catalog.
    pub fn resolve_path(&self, descriptor: &ServiceDescriptor) -> ClientResult<String> {
        if !self.contains(descriptor) {
            return Err(ClientError::UnsupportedService { descriptor: descriptor.to_string() });
        }
        Ok(format!("/apis/ads/{}/{}", descriptor.version(), descriptor.name()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    /// Tests known pairs resolve to versioned request paths.
    #[test]
    fn test_resolve_known_service() {
        let registry = ServiceRegistry::default();
        let descriptor = ServiceDescriptor::new("CampaignService", "v202408");

        let path = registry.resolve_path(&descriptor).expect("pair should be known");
        assert_eq!(path, "/apis/ads/v202408/CampaignService");
    }

    /// Tests unknown names and unknown versions both fail resolution.
    #[test]
    fn test_resolve_unknown_service() {
        let registry = ServiceRegistry::default();

        let unknown_name = ServiceDescriptor::new("TimeMachineService", "v202408");
        let err = registry.resolve_path(&unknown_name).expect_err("unknown name should fail");
        match err {
            ClientError::UnsupportedService { descriptor } => {
                assert!(descriptor.contains("TimeMachineService"));
            }
            other => panic!("Expected UnsupportedService, got {other:?}"),
        }

        let unknown_version = ServiceDescriptor::new("CampaignService", "v199901");
        assert!(matches!(
            registry.resolve_path(&unknown_version),
            Err(ClientError::UnsupportedService { .. })
        ));
    }

    /// Tests a custom catalog only contains its own entries.
    #[test]
    fn test_custom_registry() {
        let registry = ServiceRegistry::with_entries([("FooService", "v1")]);

        assert!(registry.contains(&ServiceDescriptor::new("FooService", "v1")));
        assert!(!registry.contains(&ServiceDescriptor::new("CampaignService", "v202408")));
    }
}
