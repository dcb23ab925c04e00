//! Service resolution and invocation
//!
//! - [`ServiceDescriptor`] names a service/version pair
//! - [`ServiceRegistry`] is the static catalog of pairs this client build
//!   supports
//! - [`ServiceFactory`] resolves descriptors into proxies, offline
//! - [`ServiceProxy`] executes `get`/`query`/`mutate` against the API

pub mod descriptor;
pub mod factory;
pub mod proxy;
pub mod registry;

pub use descriptor::ServiceDescriptor;
pub use factory::ServiceFactory;
pub use proxy::ServiceProxy;
pub use registry::ServiceRegistry;
