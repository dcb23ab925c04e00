//! Service descriptors

use std::fmt;

/// Identifies a service and the API version to call it under
///
/// Purely a name; whether the pair actually exists is the registry's call.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct ServiceDescriptor {
    name: String,
    version: String,
}

impl ServiceDescriptor {
    pub fn new(name: impl Into<String>, version: impl Into<String>) -> Self {
        Self { name: name.into(), version: version.into() }
    }

    /// Service name, e.g. `"CampaignService"`
    pub fn name(&self) -> &str {
        &self.name
    }

    /// API version segment, e.g. `"v202408"`
    pub fn version(&self) -> &str {
        &self.version
    }
}

impl fmt::Display for ServiceDescriptor {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} ({})", self.name, self.version)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_descriptor_display() {
        let descriptor = ServiceDescriptor::new("CampaignService", "v202408");
        assert_eq!(descriptor.to_string(), "CampaignService (v202408)");
    }
}
